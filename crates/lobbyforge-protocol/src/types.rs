//! Identifiers and the lobby lifecycle state machine.
//!
//! These are shared by every layer: the store persists them, the engine
//! reasons about them, and the wire messages carry them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ProtocolError;

/// The number of seats in a lobby. Lobbies are strictly two-player.
pub const MAX_PLAYERS: usize = 2;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A stable user identifier, owned by the identity resolver.
///
/// Newtype over `u32` so a user id can never be confused with a seat index
/// or a count. `#[serde(transparent)]` keeps the JSON a plain number:
/// `UserId(7)` is `7` on the wire, not `{"0":7}`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

/// An opaque, globally unique lobby identifier (a UUID string in practice).
///
/// Assigned once at creation and never reused, even after deletion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(String);

impl LobbyId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the identifier is empty or only whitespace.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LobbyId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for LobbyId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// LobbyStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of a lobby.
///
/// Transitions only move forward:
///
/// ```text
/// Waiting ──(second player joins)──→ InProgress ──(finish)──→ Finished
///    └──────────────────(finish, single player)──────────────────┘
/// ```
///
/// - **Waiting**: exactly one player (the creator), accepting a joiner.
/// - **InProgress**: both seats taken, the match is being played.
/// - **Finished**: terminal. A winner has been recorded.
///
/// On the wire the variants are `"WAITING"`, `"IN_PROGRESS"` and
/// `"FINISHED"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LobbyStatus {
    #[default]
    Waiting,
    InProgress,
    Finished,
}

impl LobbyStatus {
    /// Returns `true` if the lobby is accepting a new player.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::Waiting)
    }

    /// Returns `true` if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }

    /// Returns `true` if moving from `self` to `target` is a valid,
    /// forward-only transition.
    pub fn can_transition_to(self, target: Self) -> bool {
        matches!(
            (self, target),
            (Self::Waiting, Self::InProgress)
                | (Self::Waiting, Self::Finished)
                | (Self::InProgress, Self::Finished)
        )
    }

    /// The wire/database representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "WAITING",
            Self::InProgress => "IN_PROGRESS",
            Self::Finished => "FINISHED",
        }
    }
}

impl fmt::Display for LobbyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LobbyStatus {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "WAITING" => Ok(Self::Waiting),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "FINISHED" => Ok(Self::Finished),
            other => Err(ProtocolError::InvalidMessage(format!(
                "unknown lobby status {other:?}"
            ))),
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&UserId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_lobby_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&LobbyId::new("abc-123")).unwrap();
        assert_eq!(json, r#""abc-123""#);
    }

    #[test]
    fn test_lobby_id_is_blank() {
        assert!(LobbyId::new("").is_blank());
        assert!(LobbyId::new("   ").is_blank());
        assert!(!LobbyId::new("x").is_blank());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&LobbyStatus::InProgress).unwrap(),
            r#""IN_PROGRESS""#
        );
        let parsed: LobbyStatus = serde_json::from_str(r#""FINISHED""#).unwrap();
        assert_eq!(parsed, LobbyStatus::Finished);
    }

    #[test]
    fn test_status_from_str_matches_display() {
        for status in [
            LobbyStatus::Waiting,
            LobbyStatus::InProgress,
            LobbyStatus::Finished,
        ] {
            assert_eq!(status.to_string().parse::<LobbyStatus>().unwrap(), status);
        }
        assert!("PAUSED".parse::<LobbyStatus>().is_err());
    }

    #[test]
    fn test_status_transitions_are_forward_only() {
        assert!(LobbyStatus::Waiting.can_transition_to(LobbyStatus::InProgress));
        assert!(LobbyStatus::Waiting.can_transition_to(LobbyStatus::Finished));
        assert!(LobbyStatus::InProgress.can_transition_to(LobbyStatus::Finished));

        assert!(!LobbyStatus::InProgress.can_transition_to(LobbyStatus::Waiting));
        assert!(!LobbyStatus::Finished.can_transition_to(LobbyStatus::Waiting));
        assert!(!LobbyStatus::Finished.can_transition_to(LobbyStatus::Finished));
        assert!(!LobbyStatus::Waiting.can_transition_to(LobbyStatus::Waiting));
    }

    #[test]
    fn test_status_joinable_and_terminal() {
        assert!(LobbyStatus::Waiting.is_joinable());
        assert!(!LobbyStatus::InProgress.is_joinable());
        assert!(!LobbyStatus::Finished.is_joinable());

        assert!(LobbyStatus::Finished.is_terminal());
        assert!(!LobbyStatus::Waiting.is_terminal());
    }
}
