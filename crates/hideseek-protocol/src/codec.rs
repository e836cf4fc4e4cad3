//! Codec trait and implementations for serializing snapshots.
//!
//! A codec converts between Rust values and raw bytes. The store and any
//! transport in front of it only need *some* [`Codec`]; [`JsonCodec`] is the
//! default because snapshots are small and JSON is easy to inspect.

use serde::{Serialize, de::DeserializeOwned};

use crate::{ProtocolError, Snapshot};

/// Encodes values to bytes and decodes them back.
///
/// `Send + Sync + 'static` so one codec can be shared by every task that
/// talks to the store.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;

    /// Decodes a snapshot and checks its invariants.
    ///
    /// Prefer this over `decode::<Snapshot>` for anything that arrived from
    /// outside the process.
    ///
    /// # Errors
    /// Any decode error, or `ProtocolError::InvalidSnapshot`.
    fn decode_snapshot(&self, data: &[u8]) -> Result<Snapshot, ProtocolError> {
        let snapshot: Snapshot = self.decode(data)?;
        snapshot.validate()?;
        Ok(snapshot)
    }
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use hideseek_protocol::{Codec, GameCode, JsonCodec, PlayerId, Snapshot};
///
/// let codec = JsonCodec;
/// let code = GameCode::parse("QWE123").unwrap();
/// let snapshot = Snapshot::new(code, PlayerId(1), "alice");
///
/// let bytes = codec.encode(&snapshot).unwrap();
/// let decoded = codec.decode_snapshot(&bytes).unwrap();
/// assert_eq!(snapshot, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{GameCode, Phase, Player, PlayerId, Timestamp, Winner};

    fn finished_snapshot() -> Snapshot {
        let code = GameCode::parse("ZX90AB").unwrap();
        let mut snap = Snapshot::new(code, PlayerId(1), "alice");
        snap.version = 12;
        snap.players.push(Player::new(PlayerId(2), "bob"));
        snap.players[1].x = 135.0;
        snap.state.phase = Phase::Finished;
        snap.state.finder_id = Some(PlayerId(1));
        snap.state.found_ids.insert(PlayerId(2));
        snap.state.started_at = Some(Timestamp(1_700_000_000_000));
        snap.state.time_limit_secs = 300;
        snap.state.winner = Some(Winner::Finder);
        snap
    }

    #[test]
    fn test_json_codec_snapshot_round_trip() {
        let codec = JsonCodec;
        let snap = finished_snapshot();
        let bytes = codec.encode(&snap).unwrap();
        let decoded = codec.decode_snapshot(&bytes).unwrap();
        assert_eq!(snap, decoded);
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result = JsonCodec.decode_snapshot(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_snapshot_rejects_broken_invariants() {
        let mut snap = finished_snapshot();
        snap.state.winner = None;
        let bytes = JsonCodec.encode(&snap).unwrap();

        let result = JsonCodec.decode_snapshot(&bytes);
        assert!(matches!(result, Err(ProtocolError::InvalidSnapshot(_))));
    }

    #[test]
    fn test_decode_snapshot_rejects_bad_code() {
        let snap = finished_snapshot();
        let mut json = serde_json::to_value(&snap).unwrap();
        json["code"] = serde_json::json!("lowercase-and-long");
        let bytes = serde_json::to_vec(&json).unwrap();

        assert!(JsonCodec.decode_snapshot(&bytes).is_err());
    }

    #[test]
    fn test_decode_missing_color_defaults_to_none() {
        let json = r#"{"id": 5, "username": "eve", "x": 0.0, "y": 15.0}"#;
        let player: Player = JsonCodec.decode(json.as_bytes()).unwrap();
        assert_eq!(player.color, None);
        assert_eq!(player.y, 15.0);
    }
}
