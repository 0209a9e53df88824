use thiserror::Error;

use crate::models::ConversationId;

/// Failure of a single source adapter call.
///
/// An empty fixture list is not an error; adapters return `Ok(vec![])` for it.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network failure, timeout, non-2xx status, or a browser that could not start.
    #[error("source unavailable: {0}")]
    SourceUnavailable(String),

    /// The source answered, but not in the shape we expect.
    #[error("unexpected source structure: {0}")]
    ParseFailure(String),
}

impl FetchError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::SourceUnavailable(msg.into())
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseFailure(msg.into())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::SourceUnavailable(_) => "source_unavailable",
            Self::ParseFailure(_) => "parse_failure",
        }
    }
}

/// Conversation-level input errors; always recovered into a prompt.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("conversation {0} picked a date before choosing a league")]
    InvalidUserState(ConversationId),

    #[error("malformed callback payload {0:?}")]
    MalformedCallback(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(FetchError::unavailable("x").label(), "source_unavailable");
        assert_eq!(FetchError::parse("x").label(), "parse_failure");
    }

    #[test]
    fn test_display_includes_cause() {
        let e = FetchError::unavailable("HTTP 503");
        assert_eq!(e.to_string(), "source unavailable: HTTP 503");
        let e = SessionError::InvalidUserState(ConversationId(42));
        assert!(e.to_string().contains("42"));
    }
}
