//! Chat platform connection abstractions for Mirrorbot.
//!
//! Platform client libraries live outside this workspace. This crate defines
//! the capabilities the forwarder needs from them: a live bot connection that
//! can send and look up guild members, a registry to find connections by bot
//! identity, and a bus that carries inbound message events.

pub mod bus;
pub mod error;
pub mod registry;
pub mod traits;

pub use bus::{EventBus, EventFilter, Subscription};
pub use error::ChannelError;
pub use registry::{BotRegistry, ConnectionRegistry};
pub use traits::{BotConnection, BotStatus, GuildMember, GuildRole, MemberDirectory};

/// Result type for channel operations.
pub type Result<T> = std::result::Result<T, ChannelError>;
