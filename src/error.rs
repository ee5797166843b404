//! Error types for payload generation.

use thiserror::Error;

/// Result type alias for payload operations
pub type Result<T> = std::result::Result<T, PixError>;

/// Errors that can occur while building, parsing or rendering a PIX payload.
#[derive(Error, Debug)]
pub enum PixError {
    /// A field is empty, too long, or otherwise unacceptable
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A value cannot be represented with two-digit length prefixes
    #[error("Cannot encode {field}: {reason}")]
    Encoding { field: &'static str, reason: String },

    /// The external QR encoder failed; the text payload is still usable
    #[error("QR rendering failed: {0}")]
    Render(String),

    /// Input that does not parse as a PIX TLV payload
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    /// Trailing CRC16 does not match the payload contents
    #[error("Checksum mismatch: expected {expected}, found {found}")]
    ChecksumMismatch { expected: String, found: String },

    /// An I/O collaborator (storage, chat, OCR) failed
    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    /// Failed to open, read or write a file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error
    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    /// `PIX_*` environment settings could not be read
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Missing input file argument
    #[error("Missing input file argument. Usage: pix-payload <requests.csv> [qr_dir]")]
    MissingArgument,
}

impl PixError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        PixError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn encoding(field: &'static str, reason: impl Into<String>) -> Self {
        PixError::Encoding {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        PixError::MalformedPayload(reason.into())
    }

    /// Returns `true` for errors the caller can fix by re-supplying input.
    pub fn is_validation(&self) -> bool {
        matches!(self, PixError::Validation { .. })
    }
}
