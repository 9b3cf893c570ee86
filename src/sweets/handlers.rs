use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::{
    auth::extractors::{AdminUser, AuthUser},
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    sweets::{
        dto::{
            CreateSweetRequest, PurchaseData, QuantityRequest, RestockData, SearchQuery,
            SweetData, SweetListData, UpdateSweetRequest,
        },
        repo_types::Sweet,
    },
};

pub fn sweet_routes() -> Router<AppState> {
    Router::new()
        .route("/sweets", post(create_sweet).get(list_sweets))
        .route("/sweets/search", get(search_sweets))
        .route(
            "/sweets/:id",
            get(get_sweet).put(update_sweet).delete(delete_sweet),
        )
        .route("/sweets/:id/purchase", post(purchase_sweet))
        .route("/sweets/:id/restock", post(restock_sweet))
}

/// Ids come in as raw path segments; anything that is not a UUID cannot name
/// a sweet, so it reads as missing rather than malformed.
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Sweet not found".into()))
}

pub(crate) fn total_price(price: f64, quantity: i32) -> f64 {
    (price * quantity as f64 * 100.0).round() / 100.0
}

#[instrument(skip_all)]
pub async fn create_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Json(payload): Json<CreateSweetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SweetData>>), ApiError> {
    let fields = payload.validate()?;

    if Sweet::find_by_name(&state.db, &fields.name).await?.is_some() {
        warn!(name = %fields.name, "duplicate sweet name");
        return Err(ApiError::Conflict(
            "Sweet with this name already exists".into(),
        ));
    }

    let sweet = Sweet::create(&state.db, &fields).await?;
    info!(sweet_id = %sweet.id, name = %sweet.name, admin_id = %admin.id, "sweet created");

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SweetData { sweet })),
    ))
}

#[instrument(skip_all)]
pub async fn list_sweets(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<ApiResponse<SweetListData>>, ApiError> {
    let sweets = Sweet::list_all(&state.db).await?;
    Ok(Json(ApiResponse::success(SweetListData {
        count: sweets.len(),
        sweets,
    })))
}

#[instrument(skip(state, _auth))]
pub async fn search_sweets(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<SweetListData>>, ApiError> {
    let sweets = Sweet::search(&state.db, &query).await?;
    Ok(Json(ApiResponse::success(SweetListData {
        count: sweets.len(),
        sweets,
    })))
}

#[instrument(skip(state, _auth))]
pub async fn get_sweet(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SweetData>>, ApiError> {
    let id = parse_id(&id)?;
    let sweet = Sweet::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sweet not found".into()))?;
    Ok(Json(ApiResponse::success(SweetData { sweet })))
}

#[instrument(skip(state, admin, payload))]
pub async fn update_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<UpdateSweetRequest>,
) -> Result<Json<ApiResponse<SweetData>>, ApiError> {
    let id = parse_id(&id)?;
    let current = Sweet::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sweet not found".into()))?;

    let fields = payload.merge_into(&current)?;

    // Uniqueness only matters when the name actually changes
    if fields.name != current.name
        && Sweet::find_by_name(&state.db, &fields.name).await?.is_some()
    {
        warn!(name = %fields.name, "duplicate sweet name");
        return Err(ApiError::Conflict(
            "Sweet with this name already exists".into(),
        ));
    }

    let sweet = Sweet::update(&state.db, id, &fields)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sweet not found".into()))?;
    info!(sweet_id = %sweet.id, admin_id = %admin.id, "sweet updated");

    Ok(Json(ApiResponse::success(SweetData { sweet })))
}

#[instrument(skip(state, admin))]
pub async fn delete_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let id = parse_id(&id)?;
    if !Sweet::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("Sweet not found".into()));
    }
    info!(sweet_id = %id, admin_id = %admin.id, "sweet deleted");
    Ok(Json(ApiResponse::message_only("Sweet deleted successfully")))
}

#[instrument(skip(state, auth, payload))]
pub async fn purchase_sweet(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    Json(payload): Json<QuantityRequest>,
) -> Result<Json<ApiResponse<PurchaseData>>, ApiError> {
    let id = parse_id(&id)?;
    let quantity = payload.validate()?;

    match Sweet::purchase(&state.db, id, quantity).await? {
        Some(sweet) => {
            info!(sweet_id = %sweet.id, user_id = %auth.0.id, quantity, "sweet purchased");
            let total = total_price(sweet.price, quantity);
            Ok(Json(ApiResponse::success_with_message(
                "Purchase successful",
                PurchaseData {
                    purchased_quantity: quantity,
                    total_price: total,
                    sweet,
                },
            )))
        }
        // No row updated: either the sweet is gone or the stock ran short
        None => match Sweet::find_by_id(&state.db, id).await? {
            Some(sweet) => {
                warn!(
                    sweet_id = %sweet.id,
                    requested = quantity,
                    available = sweet.quantity,
                    "purchase rejected"
                );
                Err(ApiError::InsufficientStock {
                    available: sweet.quantity,
                })
            }
            None => Err(ApiError::NotFound("Sweet not found".into())),
        },
    }
}

#[instrument(skip(state, admin, payload))]
pub async fn restock_sweet(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(payload): Json<QuantityRequest>,
) -> Result<Json<ApiResponse<RestockData>>, ApiError> {
    let id = parse_id(&id)?;
    let quantity = payload.validate()?;

    let sweet = Sweet::restock(&state.db, id, quantity)
        .await?
        .ok_or_else(|| ApiError::NotFound("Sweet not found".into()))?;
    info!(sweet_id = %sweet.id, admin_id = %admin.id, quantity, "sweet restocked");

    Ok(Json(ApiResponse::success_with_message(
        "Restock successful",
        RestockData {
            restocked_quantity: quantity,
            sweet,
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_price_rounds_to_two_decimals() {
        assert_eq!(total_price(10.99, 5), 54.95);
        assert_eq!(total_price(25.99, 1), 25.99);
        assert_eq!(total_price(0.1, 3), 0.3);
        assert_eq!(total_price(1.005, 2), 2.01);
        assert_eq!(total_price(0.0, 10), 0.0);
    }

    #[test]
    fn parse_id_treats_non_uuid_as_missing() {
        assert!(parse_id("550e8400-e29b-41d4-a716-446655440000").is_ok());
        let err = parse_id("64a1f0c2d9e8b7a6c5d4e3f2").unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
