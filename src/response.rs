use serde::Serialize;

/// Success envelope: `{status: "success", message?, data?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            status: "success",
            message: None,
            data: Some(data),
        }
    }

    pub fn success_with_message(message: &'static str, data: T) -> Self {
        Self {
            status: "success",
            message: Some(message),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn message_only(message: &'static str) -> Self {
        Self {
            status: "success",
            message: Some(message),
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_envelope_omits_message() {
        let json = serde_json::to_string(&ApiResponse::success(42)).unwrap();
        assert_eq!(json, r#"{"status":"success","data":42}"#);
    }

    #[test]
    fn message_envelope_omits_data() {
        let json =
            serde_json::to_string(&ApiResponse::message_only("Sweet deleted successfully"))
                .unwrap();
        assert_eq!(
            json,
            r#"{"status":"success","message":"Sweet deleted successfully"}"#
        );
    }
}
