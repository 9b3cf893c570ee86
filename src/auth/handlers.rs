use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthData, LoginRequest, PublicUser, RegisterRequest, UserData},
        extractors::AuthUser,
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo_types::{Role, User},
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(get_me))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Normalizes the payload in place and returns the effective role.
fn validate_register(payload: &mut RegisterRequest) -> Result<Role, ApiError> {
    payload.name = payload.name.trim().to_string();
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if payload.name.is_empty() {
        errors.push("Name is required".to_string());
    }
    if !is_valid_email(&payload.email) {
        errors.push("Please provide a valid email".to_string());
    }
    if payload.password.len() < 6 {
        errors.push("Password must be at least 6 characters".to_string());
    }
    let role = match payload.role.as_deref() {
        None => Role::User,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            errors.push("Invalid role".to_string());
            Role::User
        }),
    };

    if errors.is_empty() {
        Ok(role)
    } else {
        Err(ApiError::Validation(errors))
    }
}

fn validate_login(payload: &mut LoginRequest) -> Result<(), ApiError> {
    payload.email = payload.email.trim().to_lowercase();

    let mut errors = Vec::new();
    if !is_valid_email(&payload.email) {
        errors.push("Please provide a valid email".to_string());
    }
    if payload.password.is_empty() {
        errors.push("Password is required".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<AuthData>>), ApiError> {
    let role = validate_register(&mut payload)?;

    if User::find_by_email(&state.db, &payload.email).await?.is_some() {
        warn!(email = %payload.email, "email already registered");
        return Err(ApiError::Conflict(
            "User with this email already exists".into(),
        ));
    }

    let hash = hash_password(&payload.password)?;
    let user = User::create(&state.db, &payload.name, &payload.email, &hash, role).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, email = %user.email, role = ?user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(AuthData {
            user: user.into(),
            token,
        })),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<ApiResponse<AuthData>>, ApiError> {
    validate_login(&mut payload)?;

    // Same message for unknown email and wrong password
    let user = User::find_by_email(&state.db, &payload.email)
        .await?
        .ok_or_else(|| {
            warn!(email = %payload.email, "login unknown email");
            ApiError::Unauthorized("Invalid credentials".into())
        })?;

    if !verify_password(&payload.password, &user.password_hash)? {
        warn!(email = %payload.email, user_id = %user.id, "login invalid password");
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, user.role)?;

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Json(ApiResponse::success(AuthData {
        user: user.into(),
        token,
    })))
}

#[instrument(skip_all)]
pub async fn get_me(AuthUser(user): AuthUser) -> Json<ApiResponse<UserData>> {
    Json(ApiResponse::success(UserData {
        user: PublicUser::from(user),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_payload() -> RegisterRequest {
        RegisterRequest {
            name: "Test User".into(),
            email: "User@Test.com ".into(),
            password: "password123".into(),
            role: None,
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("user@test.com"));
        assert!(is_valid_email("a.b+c@shop.co.uk"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("spaces in@mail.com"));
        assert!(!is_valid_email("missing@tld"));
    }

    #[test]
    fn register_normalizes_and_defaults_role() {
        let mut payload = register_payload();
        let role = validate_register(&mut payload).expect("valid payload");
        assert_eq!(role, Role::User);
        assert_eq!(payload.email, "user@test.com");
    }

    #[test]
    fn register_accepts_admin_role() {
        let mut payload = register_payload();
        payload.role = Some("admin".into());
        let role = validate_register(&mut payload).expect("valid payload");
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn register_collects_every_failing_field() {
        let mut payload = RegisterRequest {
            name: "  ".into(),
            email: "nope".into(),
            password: "short".into(),
            role: Some("root".into()),
        };
        let err = validate_register(&mut payload).unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 4);
                assert!(errors.iter().any(|e| e.contains("Name")));
                assert!(errors.iter().any(|e| e.contains("email")));
                assert!(errors.iter().any(|e| e.contains("6 characters")));
                assert!(errors.iter().any(|e| e.contains("role")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn login_requires_email_and_password() {
        let mut payload = LoginRequest {
            email: "user@test.com".into(),
            password: String::new(),
        };
        assert!(validate_login(&mut payload).is_err());

        let mut payload = LoginRequest {
            email: "user@test.com".into(),
            password: "password123".into(),
        };
        assert!(validate_login(&mut payload).is_ok());
    }
}
