use thiserror::Error;

/// Error type for GitLab API operations.
///
/// - `Transport` — network/TLS/timeout errors and client construction (wraps `reqwest::Error`)
/// - `Response` — any HTTP status >= 400, with the raw body text
/// - `Decode` — the response body did not match the expected record shape
/// - `Encode` — a request body could not be serialized
/// - `InvalidOption` — query options rejected before the request was sent
/// - `UnresolvedPlaceholder` — a `:token` was left in a resource path
/// - `InvalidPathValue` — a path parameter is empty, `.` or `..`
#[derive(Debug, Error)]
pub enum GitlabError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitLab response error ({status}): {body}")]
    Response { status: u16, body: String },

    #[error("Decode response error: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Encode request error: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Invalid option: {0}")]
    InvalidOption(String),

    #[error("Unresolved placeholder '{token}' in '{template}'")]
    UnresolvedPlaceholder { template: String, token: String },

    #[error("Invalid value '{value}' for path parameter '{token}'")]
    InvalidPathValue { token: String, value: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid token header value: {0}")]
    InvalidToken(String),
}

impl GitlabError {
    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// HTTP status of a response error.
    pub fn status(&self) -> Option<u16> {
        match self {
            GitlabError::Response { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GitlabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_only_for_404() {
        let nf = GitlabError::Response {
            status: 404,
            body: "{\"message\":\"404 Not found\"}".into(),
        };
        assert!(nf.is_not_found());
        assert_eq!(nf.status(), Some(404));

        for status in [400u16, 401, 403, 500, 503] {
            let err = GitlabError::Response {
                status,
                body: String::new(),
            };
            assert!(!err.is_not_found());
            assert_eq!(err.status(), Some(status));
        }

        let opt = GitlabError::InvalidOption("Invalid page '-1'".into());
        assert!(!opt.is_not_found());
        assert_eq!(opt.status(), None);
    }

    #[test]
    fn response_error_message_carries_status_and_body() {
        let err = GitlabError::Response {
            status: 403,
            body: "forbidden".into(),
        };
        assert_eq!(err.to_string(), "GitLab response error (403): forbidden");
    }
}
