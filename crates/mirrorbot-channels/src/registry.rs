//! Registry of live bot connections.

use crate::error::ChannelError;
use crate::traits::BotConnection;
use crate::Result;
use async_trait::async_trait;
use mirrorbot_core::types::BotKey;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Read-only lookup of bot connections by identity.
///
/// The forwarder receives this capability instead of reaching into the
/// platform runtime. Each lookup is a point-in-time snapshot.
#[async_trait]
pub trait BotRegistry: Send + Sync {
    /// Find the connection for a bot identity.
    async fn get(&self, key: &BotKey) -> Option<Arc<dyn BotConnection>>;
}

/// Registry fed by the platform runtime as bots connect and disconnect.
#[derive(Default)]
pub struct ConnectionRegistry {
    bots: RwLock<HashMap<BotKey, Arc<dyn BotConnection>>>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection under its own bot identity.
    pub async fn register(&self, bot: Arc<dyn BotConnection>) -> Result<()> {
        let key = bot.bot_key();
        let mut bots = self.bots.write().await;

        if bots.contains_key(&key) {
            return Err(ChannelError::AlreadyExists(key.to_string()));
        }

        info!("Registered bot: {}", key);
        bots.insert(key, bot);
        Ok(())
    }

    /// Remove a connection.
    pub async fn unregister(&self, key: &BotKey) -> Result<()> {
        let mut bots = self.bots.write().await;
        match bots.remove(key) {
            Some(_) => {
                debug!("Unregistered bot: {}", key);
                Ok(())
            }
            None => Err(ChannelError::not_found(key.as_str())),
        }
    }
}

#[async_trait]
impl BotRegistry for ConnectionRegistry {
    async fn get(&self, key: &BotKey) -> Option<Arc<dyn BotConnection>> {
        let bots = self.bots.read().await;
        bots.get(key).cloned()
    }
}
