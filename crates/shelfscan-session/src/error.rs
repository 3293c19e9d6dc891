//! # Session Error Types
//!
//! Error types for the scan session engine.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Session Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Preferences    │  │   Resolver      │  │     Session             │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  PrefsLoad…     │  │  Connection…    │  │  ShuttingDown           │ │
//! │  │  PrefsSave…     │  │  Timeout        │  │  ChannelClosed          │ │
//! │  │                 │  │  HttpStatus     │  │                         │ │
//! │  │                 │  │  Malformed…     │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  PROPAGATION POLICY: nothing above the session boundary ever sees a    │
//! │  raw resolver or preference failure. Resolver errors become the        │
//! │  ConnectionError outcome; preference errors are logged and absorbed.   │
//! │  SessionError only reaches callers for handle-level problems           │
//! │  (ShuttingDown) and for direct use of the store/resolver APIs.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

/// Result type alias for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Session error type covering preference, resolver, and session failures.
///
/// ## Design Principles
/// - Each variant includes enough context for debugging
/// - Errors are categorized for different handling strategies
/// - All errors are `Send + Sync` for async compatibility
#[derive(Debug, Error)]
pub enum SessionError {
    // =========================================================================
    // Preference Errors
    // =========================================================================
    /// Failed to load the preference file.
    #[error("Failed to load preferences: {0}")]
    PrefsLoadFailed(String),

    /// Failed to save the preference file.
    #[error("Failed to save preferences: {0}")]
    PrefsSaveFailed(String),

    /// No platform config directory could be determined.
    #[error("No config directory available for preference storage")]
    NoConfigDir,

    // =========================================================================
    // Resolver Errors
    // =========================================================================
    /// Transport-level failure reaching the product database.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// The lookup did not complete within the bounded timeout.
    #[error("Lookup timed out after {0} seconds")]
    Timeout(u64),

    /// The product database answered with an unexpected HTTP status.
    #[error("Unexpected HTTP status {status} from product database")]
    HttpStatus { status: u16 },

    /// The response body could not be understood.
    #[error("Malformed resolver response: {0}")]
    MalformedResponse(String),

    /// Invalid resolver base URL.
    #[error("Invalid resolver URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Session Errors
    // =========================================================================
    /// The session actor is gone; the operation was not accepted.
    #[error("Scan session is shutting down")]
    ShuttingDown,

    /// An internal channel closed unexpectedly.
    #[error("Session channel closed: {0}")]
    ChannelClosed(String),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<reqwest::Error> for SessionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // reqwest reports its own client-side timeout; seconds are not
            // recoverable from the error, so report the coarse class only.
            SessionError::ConnectionFailed("request timed out".to_string())
        } else if err.is_decode() {
            SessionError::MalformedResponse(err.to_string())
        } else {
            SessionError::ConnectionFailed(err.to_string())
        }
    }
}

impl From<url::ParseError> for SessionError {
    fn from(err: url::ParseError) -> Self {
        SessionError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        SessionError::MalformedResponse(err.to_string())
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        SessionError::PrefsLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for SessionError {
    fn from(err: toml::de::Error) -> Self {
        SessionError::PrefsLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for SessionError {
    fn from(err: toml::ser::Error) -> Self {
        SessionError::PrefsSaveFailed(err.to_string())
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl SessionError {
    /// Returns true if this error maps to the `ConnectionError` outcome.
    ///
    /// ## Classification
    /// Every resolver-side failure is coarse-grained into "connection error"
    /// at the session boundary; the detail stays in the logs.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            SessionError::ConnectionFailed(_)
                | SessionError::Timeout(_)
                | SessionError::HttpStatus { .. }
                | SessionError::MalformedResponse(_)
        )
    }

    /// Returns true if this error concerns preference persistence.
    ///
    /// Preference errors never fail a session; they are logged and the
    /// session continues on in-memory values.
    pub fn is_prefs_error(&self) -> bool {
        matches!(
            self,
            SessionError::PrefsLoadFailed(_)
                | SessionError::PrefsSaveFailed(_)
                | SessionError::NoConfigDir
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_error_classification() {
        assert!(SessionError::ConnectionFailed("dns".into()).is_connection_error());
        assert!(SessionError::Timeout(30).is_connection_error());
        assert!(SessionError::HttpStatus { status: 502 }.is_connection_error());
        assert!(SessionError::MalformedResponse("bad json".into()).is_connection_error());

        assert!(!SessionError::PrefsSaveFailed("disk full".into()).is_connection_error());
        assert!(!SessionError::ShuttingDown.is_connection_error());
    }

    #[test]
    fn test_prefs_error_classification() {
        assert!(SessionError::PrefsLoadFailed("corrupt".into()).is_prefs_error());
        assert!(SessionError::NoConfigDir.is_prefs_error());
        assert!(!SessionError::ConnectionFailed("dns".into()).is_prefs_error());
    }

    #[test]
    fn test_error_display() {
        let err = SessionError::Timeout(30);
        assert_eq!(err.to_string(), "Lookup timed out after 30 seconds");

        let err = SessionError::HttpStatus { status: 503 };
        assert!(err.to_string().contains("503"));
    }
}
