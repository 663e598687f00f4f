//! Inbound message events.

use super::{BotKey, Element};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A message created on a channel a bot is connected to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboundEvent {
    /// Platform name (discord, onebot, telegram, ...).
    pub platform: String,

    /// Identity of the receiving bot on that platform.
    pub self_id: String,

    /// Channel the message was created in.
    pub channel_id: String,

    /// Guild/server the channel belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,

    /// Platform message id.
    pub message_id: String,

    /// Platform-specific event sub-type, when the client reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,

    /// Message author.
    pub author: Author,

    /// Author's guild nickname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub member_nick: Option<String>,

    /// Ordered content elements.
    #[serde(default)]
    pub elements: Vec<Element>,

    /// Message this one replies to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<QuotedMessage>,

    /// Receive timestamp.
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl InboundEvent {
    /// Identity of the receiving bot.
    pub fn bot_key(&self) -> BotKey {
        BotKey::new(&self.platform, &self.self_id)
    }

    /// Name shown for the author on the target side.
    ///
    /// Guild nickname, then user nickname, then user name, then id.
    pub fn display_name(&self) -> &str {
        self.member_nick
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.author.display_name())
    }
}

impl Default for InboundEvent {
    fn default() -> Self {
        Self {
            platform: String::new(),
            self_id: String::new(),
            channel_id: String::new(),
            guild_id: None,
            message_id: String::new(),
            subtype: None,
            author: Author::default(),
            member_nick: None,
            elements: Vec::new(),
            quote: None,
            timestamp: Utc::now(),
        }
    }
}

/// A message author.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// User id.
    pub id: String,

    /// User name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// User nickname.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nick: Option<String>,

    /// Avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl Author {
    /// Nickname, then name, then id.
    pub fn display_name(&self) -> &str {
        [self.nick.as_deref(), self.name.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(&self.id)
    }
}

/// The message an inbound message quotes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuotedMessage {
    /// Platform message id of the quoted message.
    pub id: String,

    /// Author of the quoted message.
    pub author: Author,

    /// Content of the quoted message, when the client supplies it.
    #[serde(default)]
    pub elements: Vec<Element>,
}
