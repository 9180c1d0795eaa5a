//! Publisher record and the external live-stream snapshot

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

const MAX_NAME_LEN: usize = 64;

/// A named stream source tracked across local and external live status.
///
/// Every field is a plain string where empty means "unset"; the record is
/// denormalized across independently stored field groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Publisher {
    pub name: String,
    pub key: String,
    pub local_live: String,
    pub external_channel: String,
    pub external_live: String,
    pub stream_info: String,
    pub pending_notification: String,
}

impl Publisher {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_external_channel(mut self, channel: impl Into<String>) -> Self {
        self.external_channel = channel.into();
        self
    }

    #[must_use]
    pub fn is_local_live(&self) -> bool {
        !self.local_live.is_empty()
    }

    #[must_use]
    pub fn is_external_live(&self) -> bool {
        !self.external_live.is_empty()
    }

    #[must_use]
    pub fn has_external_channel(&self) -> bool {
        !self.external_channel.is_empty()
    }

    #[must_use]
    pub fn has_pending_notification(&self) -> bool {
        !self.pending_notification.is_empty()
    }

    /// Case-insensitive match against an external channel identifier
    #[must_use]
    pub fn matches_channel(&self, channel: &str) -> bool {
        self.has_external_channel() && self.external_channel.eq_ignore_ascii_case(channel)
    }

    /// Validate the identity fields supplied through the management API
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::InvalidInput("publisher name is required".to_string()));
        }
        if self.name.len() > MAX_NAME_LEN {
            return Err(Error::InvalidInput(format!(
                "publisher name must be at most {MAX_NAME_LEN} characters"
            )));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidInput(
                "publisher name must not contain whitespace".to_string(),
            ));
        }
        if self.key.is_empty() {
            return Err(Error::InvalidInput("publisher key is required".to_string()));
        }
        if self.key.chars().any(char::is_whitespace) {
            return Err(Error::InvalidInput(
                "publisher key must not contain whitespace".to_string(),
            ));
        }
        if self.external_channel.chars().any(char::is_whitespace) {
            return Err(Error::InvalidInput(
                "external channel must not contain whitespace".to_string(),
            ));
        }
        Ok(())
    }
}

/// One live session reported by the external platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalStream {
    /// Channel login, matched against `Publisher::external_channel`
    pub channel: String,
    pub display_name: String,
    pub category_id: String,
    pub title: String,
    pub started_at: String,
    /// Stream type as reported upstream ("live")
    pub kind: String,
}

impl ExternalStream {
    /// Non-empty marker stored in `external_live`
    #[must_use]
    pub fn live_marker(&self) -> &str {
        if self.kind.is_empty() {
            "live"
        } else {
            &self.kind
        }
    }
}

/// Human-readable snapshot stored in `stream_info`
#[must_use]
pub fn format_stream_info(title: &str, category: &str) -> String {
    format!("title: {title}\ngame: {category}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_match_is_case_insensitive() {
        let publisher = Publisher::new("alice", "secret1").with_external_channel("Alice_TV");
        assert!(publisher.matches_channel("alice_tv"));
        assert!(publisher.matches_channel("ALICE_TV"));
        assert!(!publisher.matches_channel("bob_tv"));
    }

    #[test]
    fn test_unlinked_publisher_never_matches() {
        let publisher = Publisher::new("alice", "secret1");
        assert!(!publisher.matches_channel(""));
    }

    #[test]
    fn test_validate() {
        assert!(Publisher::new("alice", "secret1").validate().is_ok());
        assert!(Publisher::new("", "secret1").validate().is_err());
        assert!(Publisher::new("alice", "").validate().is_err());
        assert!(Publisher::new("al ice", "secret1").validate().is_err());
        assert!(Publisher::new("a".repeat(65), "secret1").validate().is_err());
        assert!(Publisher::new("alice", "secret1")
            .with_external_channel("alice tv")
            .validate()
            .is_err());
    }

    #[test]
    fn test_stream_info_format() {
        assert_eq!(
            format_stream_info("Just Chatting", "Just Chatting"),
            "title: Just Chatting\ngame: Just Chatting"
        );
    }

    #[test]
    fn test_live_marker_never_empty() {
        let mut stream = ExternalStream::default();
        assert_eq!(stream.live_marker(), "live");
        stream.kind = "rerun".to_string();
        assert_eq!(stream.live_marker(), "rerun");
    }
}
