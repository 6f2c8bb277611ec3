//! Record and sender definitions.
//!
//! The JSON shape of [`Record`] is the export contract: field names are
//! camelCase and `attachment` / `replyTo` serialize as `null` when absent.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of every record id.
const ID_PREFIX: &str = "msg_";

/// Build the id for the record at a 0-based position (`msg_1` for position 0).
pub fn record_id(position: u64) -> String {
    format!("{ID_PREFIX}{}", u128::from(position) + 1)
}

/// Parse the 1-based numeric suffix of a record id.
pub fn parse_record_id(id: &str) -> Option<u64> {
    id.strip_prefix(ID_PREFIX)?.parse().ok()
}

/// Sender role badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Verified,
    Mod,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Verified => write!(f, "VERIFIED"),
            Role::Mod => write!(f, "MOD"),
            Role::Admin => write!(f, "ADMIN"),
        }
    }
}

/// One entry of a sender directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sender {
    /// Handle, e.g. `kitty_star`
    pub name: String,
    /// Human readable name, e.g. `Kitty Star`
    pub display_name: String,
    /// Role badge
    pub role: Role,
    /// Avatar URL or asset reference (may be empty)
    pub avatar_ref: String,
}

impl Sender {
    /// Create a sender with no avatar.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            role,
            avatar_ref: String::new(),
        }
    }

    /// Set the avatar reference.
    pub fn with_avatar(mut self, avatar_ref: impl Into<String>) -> Self {
        self.avatar_ref = avatar_ref.into();
        self
    }

    /// First word of the display name, used in "posted" sentences.
    pub fn first_name(&self) -> &str {
        self.display_name
            .split_whitespace()
            .next()
            .unwrap_or(self.name.as_str())
    }
}

/// File attached to a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub filename: String,
    /// Asset URL; empty when the attachment has no preview.
    pub url: String,
}

/// A synthesized chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    /// `msg_{position + 1}`
    pub id: String,
    pub sender_name: String,
    pub sender_display_name: String,
    pub sender_role: Role,
    pub sender_avatar_ref: String,
    pub text: String,
    /// Epoch milliseconds
    pub timestamp: i64,
    /// Id of an earlier record in the same pool
    pub reply_to: Option<String>,
    pub pinned: bool,
    pub attachment: Option<Attachment>,
    /// Always false for generated content.
    pub is_outbound: bool,
}

impl Record {
    /// 0-based position encoded in the id.
    pub fn position(&self) -> Option<u64> {
        parse_record_id(&self.id).and_then(|n| n.checked_sub(1))
    }

    /// 0-based position of the record this one replies to.
    pub fn reply_position(&self) -> Option<u64> {
        self.reply_to
            .as_deref()
            .and_then(parse_record_id)
            .and_then(|n| n.checked_sub(1))
    }

    /// Sender fields as a [`Sender`].
    pub fn sender(&self) -> Sender {
        Sender {
            name: self.sender_name.clone(),
            display_name: self.sender_display_name.clone(),
            role: self.sender_role,
            avatar_ref: self.sender_avatar_ref.clone(),
        }
    }
}
