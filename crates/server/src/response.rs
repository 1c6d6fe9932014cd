//! JSON response envelope.
//!
//! Every endpoint answers with the same shape:
//! `{"success": bool, "message": string, "data": ...}`.

use axum::Json;
use serde::Serialize;

/// The uniform API envelope.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// A successful response carrying data.
    pub fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: "ok".to_string(),
            data: Some(data),
        })
    }

    /// A successful response with a custom message.
    pub fn ok_with(message: impl Into<String>, data: T) -> Json<Self> {
        Json(Self {
            success: true,
            message: message.into(),
            data: Some(data),
        })
    }
}

impl ApiResponse<()> {
    /// A failure envelope; status code is set by the caller.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ok_envelope_shape() {
        let Json(body) = ApiResponse::ok(vec![1, 2, 3]);
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "ok");
        assert_eq!(json["data"], serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn error_envelope_omits_data() {
        let body = ApiResponse::error("nope");
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "nope");
        assert!(json.get("data").is_none());
    }
}
