use serde_json::Value;
use thiserror::Error;

/// Every failure of an API call, normalized into one shape.
///
/// `Display` is the human-readable message front-ends show verbatim.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The request never completed
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// The body could not be parsed into the expected shape
    #[error("Invalid response from server: {0}")]
    Parse(String),

    /// A URL could not be built from the configured base
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A project-scoped call was attempted with no project selected
    #[error("No project selected")]
    NoProject,
}

impl ApiError {
    /// Build the error for a non-success response.
    ///
    /// The message is the payload's `error` field, else its `message` field,
    /// else `HTTP <status>`.
    pub fn from_status(status: u16, payload: Option<Value>) -> Self {
        let message = payload
            .as_ref()
            .and_then(|p| {
                p.get("error")
                    .and_then(Value::as_str)
                    .or_else(|| p.get("message").and_then(Value::as_str))
            })
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status));

        ApiError::Http {
            status,
            message,
            payload,
        }
    }

    /// HTTP status, when the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Parsed error payload, when there was one
    pub fn payload(&self) -> Option<&Value> {
        match self {
            ApiError::Http { payload, .. } => payload.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_prefers_error_field() {
        let err = ApiError::from_status(
            400,
            Some(json!({"error": "name required", "message": "ignored"})),
        );
        assert_eq!(err.to_string(), "name required");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_message_falls_back_to_message_field() {
        let err = ApiError::from_status(404, Some(json!({"message": "gone"})));
        assert_eq!(err.to_string(), "gone");
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn test_message_falls_back_to_status() {
        let err = ApiError::from_status(502, None);
        assert_eq!(err.to_string(), "HTTP 502");
        assert_eq!(err.payload(), None);

        let err = ApiError::from_status(500, Some(json!(["not", "an", "object"])));
        assert_eq!(err.to_string(), "HTTP 500");
        assert!(err.payload().is_some());
    }

    #[test]
    fn test_non_http_errors_have_no_status() {
        assert_eq!(ApiError::Network("refused".into()).status(), None);
        assert_eq!(ApiError::NoProject.payload(), None);
    }
}
