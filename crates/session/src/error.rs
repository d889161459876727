// crates/session/src/error.rs
use thiserror::Error;

/// Errors surfaced by the backend seam.
///
/// The stream core itself never fails; everything fallible in this layer is
/// a backend interaction (fetching the session record, fetching logs,
/// opening the push channel).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Session not found: {id}")]
    SessionNotFound { id: String },

    #[error("Backend request failed: {message}")]
    Request { message: String },

    #[error("Push channel unavailable: {message}")]
    Channel { message: String },
}

impl BackendError {
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::SessionNotFound { id: id.into() }
    }

    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    pub fn channel(message: impl Into<String>) -> Self {
        Self::Channel {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let error = BackendError::session_not_found("sess-9");
        assert!(error.to_string().contains("sess-9"));

        let error = BackendError::request("HTTP 502");
        assert!(error.to_string().contains("HTTP 502"));

        let error = BackendError::channel("socket closed");
        assert!(error.to_string().contains("socket closed"));
    }
}
