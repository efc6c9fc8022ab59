use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Envelope for every JSON response the server returns.
#[derive(Debug, Serialize, Deserialize, TS)]
pub struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn error(message: &str) -> Self {
        ApiResponse {
            success: false,
            data: None,
            message: Some(message.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_serializes_data() {
        let json = serde_json::to_value(ApiResponse::success(42)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "success": true, "data": 42, "message": null })
        );
    }

    #[test]
    fn test_error_has_no_data() {
        let response: ApiResponse<()> = ApiResponse::error("case not found");
        assert!(!response.is_success());
        assert_eq!(response.message(), Some("case not found"));
        assert!(response.into_data().is_none());
    }
}
