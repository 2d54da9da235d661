//! Error types for the protocol layer.
//!
//! Each crate in Lobbyforge defines its own error enum. A `ProtocolError`
//! always means the problem is in turning messages into bytes or back,
//! never in storage or lobby rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust type).
    ///
    /// Common causes: malformed JSON, missing required fields, or a
    /// status string outside `WAITING | IN_PROGRESS | FINISHED`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The message parsed but violates a protocol rule, e.g. an unknown
    /// status string coming out of a database column.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
