use std::path::PathBuf;

use thiserror::Error;

/// Remote calls the marketplace client makes. The name leads every error
/// message the user sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Login,
    Publish,
    Stats,
    List,
    Validate,
}

impl Operation {
    /// Message prefix, e.g. `Login failed`.
    pub const fn failure(self) -> &'static str {
        match self {
            Self::Login => "Login failed",
            Self::Publish => "Publish failed",
            Self::Stats => "Failed to fetch stats",
            Self::List => "Failed to list elements",
            Self::Validate => "Validation failed",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.failure())
    }
}

#[derive(Debug, Error)]
pub enum MarketplaceError {
    /// The request never produced a usable response.
    #[error("{operation}: {source}")]
    Request {
        operation: Operation,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a non-success status.
    #[error("{operation}: {message}")]
    Status {
        operation: Operation,
        status: u16,
        message: String,
    },

    #[error("{operation}: cannot read {path}: {source}")]
    Bundle {
        operation: Operation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot create the HTTP client: {source}")]
    Client {
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid marketplace URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl MarketplaceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Status { status: 401 | 403, .. } => vec![
                "Run 'defai-element login' to refresh your API key".into(),
            ],
            Self::Status { status: 404, .. } => {
                vec!["Check the element ID with 'defai-element list'".into()]
            }
            Self::Request { .. } => vec![
                "Check your network connection".into(),
                "Check 'apiUrl' with 'defai-element config --list'".into(),
            ],
            Self::Bundle { .. } => vec!["Run 'defai-element build' first".into()],
            Self::InvalidUrl { .. } => {
                vec!["Set a full URL: defai-element config --set apiUrl=https://api.defai.com".into()]
            }
            Self::Status { .. } | Self::Client { .. } => vec![],
        }
    }
}

/// Pull a human message out of an error body: `{"message": ...}`,
/// `{"error": ...}`, or the raw text.
pub(crate) fn error_message(status: u16, body: &str) -> String {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = parsed.as_ref().and_then(|v| {
        ["message", "error"]
            .iter()
            .find_map(|key| v.get(key).and_then(|m| m.as_str()))
            .map(str::to_string)
    });
    match field {
        Some(message) => message,
        None if body.trim().is_empty() => format!("HTTP {status}"),
        None => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_is_prefixed_with_operation() {
        let err = MarketplaceError::Status {
            operation: Operation::Stats,
            status: 500,
            message: "boom".into(),
        };
        assert_eq!(err.to_string(), "Failed to fetch stats: boom");
    }

    #[test]
    fn extracts_message_field() {
        assert_eq!(error_message(401, r#"{"message":"Invalid credentials"}"#), "Invalid credentials");
        assert_eq!(error_message(400, r#"{"error":"bad tier"}"#), "bad tier");
        assert_eq!(error_message(502, "Bad Gateway"), "Bad Gateway");
        assert_eq!(error_message(500, ""), "HTTP 500");
    }

    #[test]
    fn unauthorized_points_at_login() {
        let err = MarketplaceError::Status {
            operation: Operation::Publish,
            status: 401,
            message: "expired".into(),
        };
        assert!(err.is_unauthorized());
        assert!(err.suggestions()[0].contains("login"));
    }
}
