//! Forward record types.

use chrono::{DateTime, Utc};
use mirrorbot_core::types::BotKey;
use serde::{Deserialize, Serialize};

/// Which side of a forward a lookup keys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The message as it was received.
    Origin,
    /// The copy the bot delivered.
    Destination,
}

impl Side {
    /// The other side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Origin => Self::Destination,
            Self::Destination => Self::Origin,
        }
    }
}

/// A ledger row: one delivered destination message and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForwardRecord {
    /// Auto-assigned sequence id.
    pub id: i64,

    /// Origin message id.
    pub origin_message_id: String,

    /// Bot that received the origin message.
    pub origin_bot: BotKey,

    /// Channel of the origin message.
    pub origin_channel_id: String,

    /// Destination message id.
    pub dest_message_id: String,

    /// Bot that sent the destination message.
    pub dest_bot: BotKey,

    /// Channel of the destination message.
    pub dest_channel_id: String,

    /// When the send completed.
    pub created_at: DateTime<Utc>,
}

impl ForwardRecord {
    /// Message id, bot, and channel of one side.
    pub fn side(&self, side: Side) -> (&str, &BotKey, &str) {
        match side {
            Side::Origin => (
                &self.origin_message_id,
                &self.origin_bot,
                &self.origin_channel_id,
            ),
            Side::Destination => (
                &self.dest_message_id,
                &self.dest_bot,
                &self.dest_channel_id,
            ),
        }
    }

    /// Whether this row answers a lookup.
    pub fn matches(&self, lookup: &RecordLookup) -> bool {
        let (message_id, bot, channel_id) = self.side(lookup.side);
        message_id == lookup.message_id && *bot == lookup.bot && channel_id == lookup.channel_id
    }
}

/// A record about to be written; the store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewForwardRecord {
    pub origin_message_id: String,
    pub origin_bot: BotKey,
    pub origin_channel_id: String,
    pub dest_message_id: String,
    pub dest_bot: BotKey,
    pub dest_channel_id: String,
    pub created_at: DateTime<Utc>,
}

impl NewForwardRecord {
    /// Attach a sequence id.
    pub fn with_id(self, id: i64) -> ForwardRecord {
        ForwardRecord {
            id,
            origin_message_id: self.origin_message_id,
            origin_bot: self.origin_bot,
            origin_channel_id: self.origin_channel_id,
            dest_message_id: self.dest_message_id,
            dest_bot: self.dest_bot,
            dest_channel_id: self.dest_channel_id,
            created_at: self.created_at,
        }
    }
}

/// Key of a ledger read: (message id, bot, channel) on one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLookup {
    /// Side the key refers to.
    pub side: Side,

    /// Message id on that side.
    pub message_id: String,

    /// Bot on that side.
    pub bot: BotKey,

    /// Channel on that side.
    pub channel_id: String,
}

impl RecordLookup {
    /// Look up rows whose origin side matches.
    pub fn origin(
        message_id: impl Into<String>,
        bot: BotKey,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            side: Side::Origin,
            message_id: message_id.into(),
            bot,
            channel_id: channel_id.into(),
        }
    }

    /// Look up rows whose destination side matches.
    pub fn destination(
        message_id: impl Into<String>,
        bot: BotKey,
        channel_id: impl Into<String>,
    ) -> Self {
        Self {
            side: Side::Destination,
            message_id: message_id.into(),
            bot,
            channel_id: channel_id.into(),
        }
    }
}
