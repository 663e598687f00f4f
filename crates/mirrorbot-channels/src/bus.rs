//! Inbound event bus.
//!
//! Platform clients publish every created message here; each active forward
//! rule holds its own filtered subscription.

use mirrorbot_core::config::SourceEndpoint;
use mirrorbot_core::types::InboundEvent;
use tokio::sync::broadcast;
use tracing::warn;

/// Default buffered events per subscriber.
const DEFAULT_CAPACITY: usize = 1000;

/// Broadcast bus for inbound message events.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<InboundEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    /// Create a bus with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a bus buffering `capacity` events per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event. Returns the number of subscriptions it reached.
    pub fn publish(&self, event: InboundEvent) -> usize {
        self.tx.send(event).unwrap_or(0)
    }

    /// Subscribe to events that pass a filter.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        Subscription {
            rx: self.tx.subscribe(),
            filter,
        }
    }
}

/// Platform / bot / channel selector for inbound events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    /// Required platform.
    pub platform: String,

    /// Required receiving bot, when not a wildcard.
    pub self_id: Option<String>,

    /// Required channel, when not a wildcard.
    pub channel_id: Option<String>,
}

impl EventFilter {
    /// Filter matching everything on a platform.
    pub fn platform(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            self_id: None,
            channel_id: None,
        }
    }

    /// Narrow to one receiving bot.
    pub fn bot(mut self, self_id: impl Into<String>) -> Self {
        self.self_id = Some(self_id.into());
        self
    }

    /// Narrow to one channel.
    pub fn channel(mut self, channel_id: impl Into<String>) -> Self {
        self.channel_id = Some(channel_id.into());
        self
    }

    /// Check whether an event passes the filter.
    pub fn matches(&self, event: &InboundEvent) -> bool {
        event.platform == self.platform
            && self.self_id.as_deref().map_or(true, |id| event.self_id == id)
            && self.channel_id.as_deref().map_or(true, |id| event.channel_id == id)
    }
}

impl From<&SourceEndpoint> for EventFilter {
    fn from(source: &SourceEndpoint) -> Self {
        Self {
            platform: source.platform.clone(),
            self_id: source.self_id.clone(),
            channel_id: source.channel_id.clone(),
        }
    }
}

/// A filtered view of the bus.
#[derive(Debug)]
pub struct Subscription {
    rx: broadcast::Receiver<InboundEvent>,
    filter: EventFilter,
}

impl Subscription {
    /// Wait for the next matching event. `None` once the bus is dropped.
    pub async fn next(&mut self) -> Option<InboundEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) if self.filter.matches(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(
                        "Subscription for {} lagged, {} events dropped",
                        self.filter.platform, skipped
                    );
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// The filter this subscription applies.
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}
