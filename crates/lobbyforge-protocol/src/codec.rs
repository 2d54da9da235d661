//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The RPC server and the gateway client never call `serde_json` directly;
//! they go through a [`Codec`]. This keeps the canonical JSON mapping in one
//! place and lets tests swap in a different encoding without touching the
//! HTTP plumbing.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` because a single codec instance is shared by
/// every request handler task for the lifetime of the server or client.
pub trait Codec: Send + Sync + 'static {
    /// The `Content-Type` header value for bodies produced by this codec.
    fn content_type(&self) -> &'static str;

    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses JSON (via `serde_json`).
///
/// This is the HTTP-mapped surface's wire format: every message is sent
/// as its lowerCamelCase JSON mapping with `Content-Type: application/json`.
///
/// ## Example
///
/// ```rust
/// use lobbyforge_protocol::{Codec, CreateLobbyRequest, JsonCodec};
///
/// let codec = JsonCodec;
/// let req = CreateLobbyRequest {
///     name: "Friendly Match".into(),
///     username: "alice".into(),
/// };
///
/// let bytes = codec.encode(&req).unwrap();
/// assert_eq!(
///     std::str::from_utf8(&bytes).unwrap(),
///     r#"{"name":"Friendly Match","username":"alice"}"#
/// );
///
/// let decoded: CreateLobbyRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(req, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn content_type(&self) -> &'static str {
        "application/json"
    }

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
    use crate::{ListAvailableLobbiesResponse, LobbyStatus};

    #[test]
    fn test_json_codec_content_type() {
        assert_eq!(JsonCodec.content_type(), "application/json");
    }

    #[test]
    fn test_decode_garbage_returns_decode_error() {
        let result: Result<LobbyStatus, _> = JsonCodec.decode(b"not json at all");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }

    #[test]
    fn test_decode_empty_object_as_empty_lobby_list() {
        // An empty repeated field is omitted on the wire, so `{}` is a
        // valid "no lobbies" response.
        let resp: ListAvailableLobbiesResponse = JsonCodec.decode(b"{}").unwrap();
        assert!(resp.lobbies.is_empty());
    }
}
