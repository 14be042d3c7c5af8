//! Error types for the dashboard
//!
//! Uses thiserror for ergonomic error definitions.
//! Nothing here is fatal: the poll loop logs and carries on.

use thiserror::Error;

/// Custom Result type using our Error
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Dashboard errors
#[derive(Error, Debug)]
pub enum DashboardError {
    /// Request rejected, transport failure or non-success status
    #[error("Network error: {0}")]
    Network(String),

    /// Response body is not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Operator form is incomplete; the message is shown as-is
    #[error("{0}")]
    Validation(String),

    /// Missing element or a failing browser call
    #[error("DOM error: {0}")]
    Dom(String),

    /// Invalid dashboard configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl DashboardError {
    /// Poll failures are logged and swallowed at the tick boundary.
    pub fn is_transient(&self) -> bool {
        matches!(self, DashboardError::Network(_) | DashboardError::Parse(_))
    }
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = DashboardError::Network("HTTP 502: bad gateway".into());
        assert!(err.to_string().contains("Network error"));

        let err = DashboardError::Validation("Selecione pelo menos uma moeda.".into());
        assert_eq!(err.to_string(), "Selecione pelo menos uma moeda.");
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<i32>("invalid").unwrap_err();
        let err: DashboardError = json_err.into();
        assert!(matches!(err, DashboardError::Parse(_)));
        assert!(err.is_transient());
    }

    #[test]
    fn test_validation_is_not_transient() {
        assert!(!DashboardError::Validation("x".into()).is_transient());
        assert!(!DashboardError::Dom("#btnToggle".into()).is_transient());
    }
}
