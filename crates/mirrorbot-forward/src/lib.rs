//! Message forwarding for Mirrorbot.
//!
//! This crate turns inbound events into cross-platform deliveries:
//!
//! - [`Forwarder`] subscribes each active rule to the event bus and drops
//!   filtered messages
//! - [`ElementTransformer`] rewrites content into elements every target can
//!   render, fetching platform-local media through [`FileApiClient`]
//! - [`QuoteResolver`] maps a quoted message onto each target using the
//!   forward ledger, or synthesizes a textual quote
//! - [`Dispatcher`] paces, composes, sends, and records deliveries

pub mod dispatch;
pub mod error;
pub mod file_api;
pub mod quote;
pub mod router;
pub mod transform;

pub use dispatch::{DispatchReport, Dispatcher};
pub use error::ForwardError;
pub use file_api::{FileApiClient, FileApiResponse};
pub use quote::{QuoteDirection, QuoteRef, QuoteResolver};
pub use router::{Forwarder, IgnoreReason, Outcome};
pub use transform::{ElementTransformer, TransformOptions};

/// Result type for forwarding operations.
pub type Result<T> = std::result::Result<T, ForwardError>;
