use serde::{Deserialize, Serialize};

use crate::{api::error, utils::normalize_email};

/// Separator between the two participant emails in a channel id. `:` is not
/// part of the validated email alphabet, so a channel id parses back to its
/// participants unambiguously.
pub const CHANNEL_SEPARATOR: char = ':';

/// Canonical identifier of a two-party conversation: the two normalized
/// participant emails, sorted lexicographically. Commutative by
/// construction; both participants derive the same id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    pub fn between(a: &str, b: &str) -> Result<Self, error::SystemError> {
        let a = normalize_email(a);
        let b = normalize_email(b);

        if a.is_empty() || b.is_empty() {
            return Err(error::SystemError::bad_request("Email is required"));
        }
        if a == b {
            return Err(error::SystemError::bad_request("Cannot open a chat with yourself"));
        }

        let (first, second) = if a <= b { (a, b) } else { (b, a) };
        Ok(ChannelId(format!("{first}{CHANNEL_SEPARATOR}{second}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn participants(&self) -> (&str, &str) {
        self.0.split_once(CHANNEL_SEPARATOR).unwrap_or((self.0.as_str(), ""))
    }

    /// The participant that is not `user`, if `user` is in the channel.
    pub fn peer_of(&self, user: &str) -> Option<&str> {
        let (first, second) = self.participants();
        if user == first {
            Some(second)
        } else if user == second {
            Some(first)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_id_is_commutative() {
        let ab = ChannelId::between("a@example.com", "b@example.com").unwrap();
        let ba = ChannelId::between("b@example.com", "a@example.com").unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn channel_id_normalizes_case() {
        let lower = ChannelId::between("a@example.com", "b@example.com").unwrap();
        let mixed = ChannelId::between("A@Example.COM", "B@example.com").unwrap();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn distinct_pairs_get_distinct_ids() {
        let ab = ChannelId::between("a@example.com", "b@example.com").unwrap();
        let ac = ChannelId::between("a@example.com", "c@example.com").unwrap();
        let bc = ChannelId::between("b@example.com", "c@example.com").unwrap();
        assert_ne!(ab, ac);
        assert_ne!(ab, bc);
        assert_ne!(ac, bc);
    }

    #[test]
    fn self_chat_is_invalid() {
        let err = ChannelId::between("a@example.com", "a@example.com").unwrap_err();
        assert!(matches!(err, error::SystemError::BadRequest(_)));

        // Case-insensitive: still the same identity.
        assert!(ChannelId::between("a@example.com", "A@EXAMPLE.COM").is_err());
    }

    #[test]
    fn participants_roundtrip() {
        let ch = ChannelId::between("b@example.com", "a@example.com").unwrap();
        assert_eq!(ch.participants(), ("a@example.com", "b@example.com"));
        assert_eq!(ch.peer_of("a@example.com"), Some("b@example.com"));
        assert_eq!(ch.peer_of("b@example.com"), Some("a@example.com"));
        assert_eq!(ch.peer_of("c@example.com"), None);
    }
}
