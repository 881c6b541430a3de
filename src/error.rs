//! Error types for the analytics backend

use thiserror::Error;

/// Maximum length of an embedded diagnostic before truncation
const DIAGNOSTIC_LIMIT: usize = 64;

/// Main error type for the analytics backend
#[derive(Error, Debug)]
pub enum Error {
    /// A log file with the same name is already present in the store.
    ///
    /// This is a domain condition with a user-facing message, not a system
    /// fault; the HTTP layer maps it to a 400 response.
    #[error("Log file already uploaded!")]
    DuplicateUpload {
        /// Name of the file that was already present
        file_name: String,
    },

    /// The external parser rejected the uploaded content
    #[error("Log parsing error: {0}")]
    Parse(String),

    /// A store call failed (search, bulk insert, or delete)
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// An operation was invoked before the backing index and pipeline exist
    #[error("log index not bootstrapped; call ensure_ready first")]
    NotBootstrapped,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Errors from the document store protocol layer
///
/// No distinction is drawn between transient and permanent causes; callers
/// see the failure as-is and decide how to surface it.
#[derive(Error, Debug)]
pub enum StoreError {
    /// HTTP transport failure (connection refused, DNS, protocol errors)
    #[error("HTTP transport error: {0}")]
    Http(String),

    /// The request timed out
    #[error("store request timed out")]
    Timeout,

    /// The store answered with a non-success status
    #[error("store returned status {status}: {body}")]
    BadStatus {
        /// HTTP status code
        status: u16,
        /// Response body, truncated to a short diagnostic
        body: String,
    },

    /// The store's response body did not have the expected shape
    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            StoreError::Timeout
        } else {
            StoreError::Http(truncate_diagnostic(&value.to_string()))
        }
    }
}

/// Truncate a diagnostic message so store payloads never flood error output
pub(crate) fn truncate_diagnostic(message: &str) -> String {
    if message.len() <= DIAGNOSTIC_LIMIT {
        return message.to_string();
    }
    let mut end = DIAGNOSTIC_LIMIT;
    while !message.is_char_boundary(end) {
        end -= 1;
    }
    message[..end].to_string()
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;
