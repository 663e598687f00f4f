//! Core connection traits.

use crate::{ChannelError, Result};
use async_trait::async_trait;
use mirrorbot_core::types::{BotKey, Element};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Connection status reported by a platform client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BotStatus {
    Offline,
    Connecting,
    Online,
    Reconnecting,
    Disconnecting,
}

/// A guild member record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuildMember {
    /// User id.
    pub user_id: String,

    /// Guild nickname.
    pub nick: Option<String>,

    /// Account user name.
    pub username: Option<String>,
}

impl GuildMember {
    /// Nickname, then user name, then id; first non-empty.
    pub fn display_name(&self) -> &str {
        [self.nick.as_deref(), self.username.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .unwrap_or(&self.user_id)
    }
}

/// A guild role record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildRole {
    /// Role id.
    pub id: String,

    /// Role name.
    pub name: String,
}

/// Guild member and role lookups.
///
/// Platforms without lookups keep the default implementations, which fail
/// with [`ChannelError::Lookup`].
#[async_trait]
pub trait MemberDirectory: Send + Sync {
    /// Look up one member of a guild.
    async fn guild_member(&self, guild_id: &str, user_id: &str) -> Result<GuildMember> {
        let _ = (guild_id, user_id);
        Err(ChannelError::lookup("guild member lookup not supported"))
    }

    /// List the roles of a guild.
    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<GuildRole>> {
        let _ = guild_id;
        Err(ChannelError::lookup("guild role lookup not supported"))
    }
}

/// A live bot connection on one platform.
#[async_trait]
pub trait BotConnection: MemberDirectory + Send + Sync + Debug {
    /// Platform name.
    fn platform(&self) -> &str;

    /// The bot's own id on the platform.
    fn self_id(&self) -> &str;

    /// Current connection status.
    fn status(&self) -> BotStatus;

    /// Whether the connection reports itself online.
    fn is_online(&self) -> bool {
        self.status() == BotStatus::Online
    }

    /// Identity of this connection.
    fn bot_key(&self) -> BotKey {
        BotKey::new(self.platform(), self.self_id())
    }

    /// Send a composed payload to a channel.
    ///
    /// Returns every platform message id the send produced; platforms that
    /// split long or mixed-media payloads return more than one.
    async fn send_message(&self, channel_id: &str, payload: &[Element]) -> Result<Vec<String>>;
}
