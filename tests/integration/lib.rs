//! Shared fakes for the forwarding integration tests.

use async_trait::async_trait;
use mirrorbot_channels::{
    BotConnection, BotStatus, ChannelError, ConnectionRegistry, GuildMember, MemberDirectory,
};
use mirrorbot_core::types::{Author, Element, InboundEvent};
use mirrorbot_core::Config;
use mirrorbot_forward::Forwarder;
use mirrorbot_ledger::{RecordStore, SqliteRecordStore};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// One recorded send.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel_id: String,
    pub payload: Vec<Element>,
    pub ids: Vec<String>,
    pub at: Instant,
}

/// Bot connection that records every send.
///
/// Sends succeed with ids `<self_id>-<n>` unless the bot is set to fail.
/// Member lookups fail unless `with_members` was used.
#[derive(Debug)]
pub struct FakeBot {
    platform: String,
    self_id: String,
    status: BotStatus,
    members: Vec<GuildMember>,
    failing: AtomicBool,
    counter: AtomicUsize,
    sends: Mutex<Vec<SentMessage>>,
}

impl FakeBot {
    pub fn online(platform: &str, self_id: &str) -> Arc<Self> {
        Arc::new(Self::new(platform, self_id, BotStatus::Online))
    }

    pub fn offline(platform: &str, self_id: &str) -> Arc<Self> {
        Arc::new(Self::new(platform, self_id, BotStatus::Offline))
    }

    pub fn with_members(platform: &str, self_id: &str, members: Vec<GuildMember>) -> Arc<Self> {
        Arc::new(Self {
            members,
            ..Self::new(platform, self_id, BotStatus::Online)
        })
    }

    fn new(platform: &str, self_id: &str, status: BotStatus) -> Self {
        Self {
            platform: platform.to_string(),
            self_id: self_id.to_string(),
            status,
            members: Vec::new(),
            failing: AtomicBool::new(false),
            counter: AtomicUsize::new(0),
            sends: Mutex::new(Vec::new()),
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sends(&self) -> Vec<SentMessage> {
        self.sends.lock().unwrap().clone()
    }
}

#[async_trait]
impl MemberDirectory for FakeBot {
    async fn guild_member(
        &self,
        _guild_id: &str,
        user_id: &str,
    ) -> mirrorbot_channels::Result<GuildMember> {
        self.members
            .iter()
            .find(|m| m.user_id == user_id)
            .cloned()
            .ok_or_else(|| ChannelError::lookup(format!("no member {}", user_id)))
    }
}

#[async_trait]
impl BotConnection for FakeBot {
    fn platform(&self) -> &str {
        &self.platform
    }

    fn self_id(&self) -> &str {
        &self.self_id
    }

    fn status(&self) -> BotStatus {
        self.status
    }

    async fn send_message(
        &self,
        channel_id: &str,
        payload: &[Element],
    ) -> mirrorbot_channels::Result<Vec<String>> {
        let at = Instant::now();
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChannelError::platform(&self.platform, "send rejected"));
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let ids = vec![format!("{}-{}", self.self_id, n)];
        self.sends.lock().unwrap().push(SentMessage {
            channel_id: channel_id.to_string(),
            payload: payload.to_vec(),
            ids: ids.clone(),
            at,
        });
        Ok(ids)
    }
}

/// Forwarder wired to fake bots and a forward ledger.
pub struct Harness {
    pub forwarder: Arc<Forwarder>,
    pub store: Arc<dyn RecordStore>,
}

impl Harness {
    /// Harness backed by an in-memory SQLite ledger.
    pub async fn new(config: &str, bots: &[Arc<FakeBot>]) -> Self {
        let store = SqliteRecordStore::in_memory().await.unwrap();
        Self::with_store(config, bots, Arc::new(store)).await
    }

    /// Harness backed by the given ledger.
    pub async fn with_store(
        config: &str,
        bots: &[Arc<FakeBot>],
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let plan = Config::parse(config).unwrap().validate().unwrap();

        let registry = Arc::new(ConnectionRegistry::new());
        for bot in bots {
            registry.register(bot.clone()).await.unwrap();
        }

        let forwarder = Arc::new(Forwarder::new(plan, registry, store.clone()));
        Self { forwarder, store }
    }
}

/// A text message from a human user.
pub fn message(
    platform: &str,
    self_id: &str,
    channel_id: &str,
    id: &str,
    elements: Vec<Element>,
) -> InboundEvent {
    InboundEvent {
        platform: platform.to_string(),
        self_id: self_id.to_string(),
        channel_id: channel_id.to_string(),
        guild_id: Some("guild".to_string()),
        message_id: id.to_string(),
        author: Author {
            id: "user-1".to_string(),
            name: Some("alice".to_string()),
            nick: None,
            avatar: None,
        },
        elements,
        ..Default::default()
    }
}

/// Text elements of a payload, in order.
pub fn texts(payload: &[Element]) -> Vec<&str> {
    payload.iter().filter_map(Element::as_text).collect()
}
