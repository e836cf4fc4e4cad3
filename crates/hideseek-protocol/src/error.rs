//! Error types for the protocol layer.

/// Errors that can occur while parsing, encoding, or decoding snapshots.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a snapshot into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed: malformed JSON, missing fields, wrong types.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A game code that isn't six characters of `A-Z0-9`.
    #[error("invalid game code: {0:?}")]
    InvalidCode(String),

    /// The snapshot deserialized fine but breaks a session invariant,
    /// e.g. a finder while still waiting, or the finder marked as found.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),
}
