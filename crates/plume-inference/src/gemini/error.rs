//! Gemini-specific error handling.

use plume_core::Error;

/// Classified Gemini failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeminiErrorCode {
    /// Key missing, invalid, or not allowed to use the model.
    Authentication,
    /// Quota or rate limit on the service side.
    RateLimited,
    /// Malformed request (schema, payload size, ...).
    InvalidArgument,
    /// Model not found or not available.
    ModelNotFound,
    /// Server error.
    ServerError,
    /// Unknown error.
    Unknown,
}

impl GeminiErrorCode {
    /// Classify from HTTP status, the `error.status` string and the message.
    pub fn from_response(status: u16, error_status: &str, message: &str) -> Self {
        match (status, error_status) {
            (401 | 403, _) | (_, "UNAUTHENTICATED" | "PERMISSION_DENIED") => Self::Authentication,
            (429, _) | (_, "RESOURCE_EXHAUSTED") => Self::RateLimited,
            (500..=599, _) => Self::ServerError,
            (404, _) | (_, "NOT_FOUND") => Self::ModelNotFound,
            // An invalid key comes back as 400 INVALID_ARGUMENT.
            (400, _) if message.contains("API key") => Self::Authentication,
            (400, _) | (_, "INVALID_ARGUMENT" | "FAILED_PRECONDITION") => Self::InvalidArgument,
            _ => Self::Unknown,
        }
    }
}

/// Convert a classified Gemini failure into a plume error.
///
/// Credential problems are configuration errors; everything else is a
/// backend failure.
pub fn to_plume_error(code: GeminiErrorCode, status: u16, message: &str) -> Error {
    match code {
        GeminiErrorCode::Authentication => {
            Error::Config(format!("Authentication failed ({}): {}", status, message))
        }
        GeminiErrorCode::RateLimited => {
            Error::Backend(format!("Rate limited ({}): {}", status, message))
        }
        GeminiErrorCode::InvalidArgument => {
            Error::Backend(format!("Request rejected ({}): {}", status, message))
        }
        GeminiErrorCode::ModelNotFound => {
            Error::Backend(format!("Model not found ({}): {}", status, message))
        }
        GeminiErrorCode::ServerError => {
            Error::Backend(format!("Server error ({}): {}", status, message))
        }
        GeminiErrorCode::Unknown => {
            Error::Backend(format!("Gemini returned {}: {}", status, message))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_key_is_authentication() {
        let code = GeminiErrorCode::from_response(400, "INVALID_ARGUMENT", "API key not valid.");
        assert_eq!(code, GeminiErrorCode::Authentication);
    }

    #[test]
    fn test_quota_message_naming_api_key_is_rate_limited() {
        let code = GeminiErrorCode::from_response(
            429,
            "RESOURCE_EXHAUSTED",
            "You exceeded your current quota for this API key.",
        );
        assert_eq!(code, GeminiErrorCode::RateLimited);
        assert_eq!(to_plume_error(code, 429, "x").kind(), "backend");
    }

    #[test]
    fn test_server_error_naming_api_key_is_server_error() {
        let code =
            GeminiErrorCode::from_response(503, "UNAVAILABLE", "API key service unavailable");
        assert_eq!(code, GeminiErrorCode::ServerError);
    }

    #[test]
    fn test_403_is_authentication() {
        let code = GeminiErrorCode::from_response(403, "PERMISSION_DENIED", "denied");
        assert_eq!(code, GeminiErrorCode::Authentication);
    }

    #[test]
    fn test_429_is_rate_limited() {
        let code = GeminiErrorCode::from_response(429, "RESOURCE_EXHAUSTED", "quota");
        assert_eq!(code, GeminiErrorCode::RateLimited);
    }

    #[test]
    fn test_404_is_model_not_found() {
        let code = GeminiErrorCode::from_response(404, "NOT_FOUND", "models/x is not found");
        assert_eq!(code, GeminiErrorCode::ModelNotFound);
    }

    #[test]
    fn test_400_is_invalid_argument() {
        let code = GeminiErrorCode::from_response(400, "INVALID_ARGUMENT", "bad schema");
        assert_eq!(code, GeminiErrorCode::InvalidArgument);
    }

    #[test]
    fn test_5xx_is_server_error() {
        assert_eq!(
            GeminiErrorCode::from_response(503, "UNAVAILABLE", "overloaded"),
            GeminiErrorCode::ServerError
        );
        assert_eq!(
            GeminiErrorCode::from_response(500, "", ""),
            GeminiErrorCode::ServerError
        );
    }

    #[test]
    fn test_unknown() {
        assert_eq!(
            GeminiErrorCode::from_response(418, "", "teapot"),
            GeminiErrorCode::Unknown
        );
    }

    #[test]
    fn test_to_plume_error_kinds() {
        assert_eq!(
            to_plume_error(GeminiErrorCode::Authentication, 401, "x").kind(),
            "configuration"
        );
        for code in [
            GeminiErrorCode::RateLimited,
            GeminiErrorCode::InvalidArgument,
            GeminiErrorCode::ModelNotFound,
            GeminiErrorCode::ServerError,
            GeminiErrorCode::Unknown,
        ] {
            assert_eq!(to_plume_error(code, 500, "x").kind(), "backend");
        }
    }

    #[test]
    fn test_to_plume_error_keeps_message() {
        let err = to_plume_error(GeminiErrorCode::ServerError, 503, "overloaded");
        assert!(err.to_string().contains("503"));
        assert!(err.to_string().contains("overloaded"));
    }
}
