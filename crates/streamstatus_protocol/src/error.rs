//! Error types for notification decoding.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while decoding a notification.
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// The body is not valid JSON or does not match the envelope shape.
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),

    /// A field required for the subscription type is missing or empty.
    #[error("missing field `{field}` in {subscription_type} event")]
    MissingField {
        /// The subscription type being decoded.
        subscription_type: String,
        /// Name of the missing field.
        field: &'static str,
    },
}

impl ProtocolError {
    pub(crate) fn missing(subscription_type: &str, field: &'static str) -> Self {
        Self::MissingField {
            subscription_type: subscription_type.to_string(),
            field,
        }
    }
}
