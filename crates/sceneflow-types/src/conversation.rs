//! Conversation identity.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, platform-assigned identity of a chat peer.
///
/// Platforms hand out numeric ids (VK, Telegram) or strings (web sockets); the
/// engine never interprets the value, it only compares and hashes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PeerId(String);

impl PeerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PeerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for PeerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<i64> for PeerId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_and_string_ids_compare_equal() {
        assert_eq!(PeerId::from(2000000001_i64), PeerId::from("2000000001"));
    }

    #[test]
    fn test_peer_id_serializes_transparently() {
        let json = serde_json::to_string(&PeerId::from(17_i64)).unwrap();
        assert_eq!(json, "\"17\"");
    }
}
