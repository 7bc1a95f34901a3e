//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// Inference service returned an error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Inference service unreachable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool arguments failed validation
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Response body could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AgentError {
    /// Check if error is transient. Nothing retries automatically; the shell
    /// tells the user to try again.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_))
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => "The AI service is currently unavailable.".into(),
            Self::ToolNotFound(name) => format!("The tool '{name}' is not available."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::Parse(_) => "The AI service sent a response I could not understand.".into(),
            Self::Config(msg) => format!("Configuration problem: {msg}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        assert!(AgentError::ProviderUnavailable("down".into()).is_retryable());
        assert!(!AgentError::Provider("500".into()).is_retryable());
        assert!(!AgentError::ToolValidation("missing".into()).is_retryable());
    }

    #[test]
    fn test_user_message() {
        let err = AgentError::Provider("model not found".into());
        assert_eq!(
            err.user_message(),
            "The AI service encountered an error: model not found"
        );
        let err = AgentError::ProviderUnavailable("connection refused".into());
        assert_eq!(err.user_message(), "The AI service is currently unavailable.");
    }
}
