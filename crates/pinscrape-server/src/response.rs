//! JSON response envelope shared by every API endpoint.

use chrono::Utc;
use serde::Serialize;

/// Standard envelope: `data` on success, `error` on failure.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

/// Error payload carried by a failed response.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(code: &str, message: &str, details: Option<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
                details,
                timestamp: Utc::now().to_rfc3339(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope_omits_error() {
        let resp = ApiResponse::ok(serde_json::json!({"n": 1}));
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["success"], true);
        assert_eq!(v["data"]["n"], 1);
        assert!(v.get("error").is_none());
    }

    #[test]
    fn test_error_envelope_shape() {
        let resp: ApiResponse<()> =
            ApiResponse::error("LIMIT_EXCEEDED", "limit too large", Some("max is 100".into()));
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["success"], false);
        assert_eq!(v["error"]["code"], "LIMIT_EXCEEDED");
        assert_eq!(v["error"]["details"], "max is 100");
        assert!(v["error"]["timestamp"].as_str().is_some());
        assert!(v.get("data").is_none());
    }
}
