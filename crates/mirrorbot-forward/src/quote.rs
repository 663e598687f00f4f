//! Quote resolution across platforms.
//!
//! A quoted message has a different id on every platform it was mirrored
//! to. The forward ledger maps those ids: when the quoted message was sent by
//! the receiving bot, it is a copy this bot delivered, so its row is found by
//! the destination side; otherwise it is a message this bot received, found
//! by the origin side. The opposite side of a matching row names the quoted
//! message on the target.

use crate::transform::{ElementTransformer, TransformOptions};
use crate::Result;
use mirrorbot_core::config::TargetEndpoint;
use mirrorbot_core::types::{Element, InboundEvent, QuotedMessage};
use mirrorbot_ledger::{ForwardRecord, RecordLookup, RecordStore, Side};
use std::sync::Arc;
use tracing::{debug, warn};

/// Who originally posted the quoted message, seen from the receiving bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteDirection {
    /// The receiving bot sent it: it is a forwarded copy.
    Sent,
    /// The receiving bot received it: it may have been forwarded elsewhere.
    Received,
}

impl QuoteDirection {
    /// Classify a quote relative to the receiving bot.
    pub fn classify(event: &InboundEvent, quote: &QuotedMessage) -> Self {
        if quote.author.id == event.self_id {
            Self::Sent
        } else {
            Self::Received
        }
    }

    /// Ledger side that holds the quoted message on this platform.
    pub fn local_side(self) -> Side {
        match self {
            Self::Sent => Side::Destination,
            Self::Received => Side::Origin,
        }
    }
}

/// Quote reference for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteRef {
    /// Native quote of the target-local message id.
    Native(String),
    /// Synthesized quote text, prepended to the payload.
    Fallback(Vec<Element>),
}

/// Maps quoted messages onto targets using the forward ledger.
#[derive(Clone)]
pub struct QuoteResolver {
    store: Arc<dyn RecordStore>,
}

impl QuoteResolver {
    /// Create a resolver reading from a ledger.
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Ledger rows describing the quoted message on the receiving bot's side.
    ///
    /// A lookup failure yields no rows, so every target falls back to text.
    pub async fn candidates(
        &self,
        event: &InboundEvent,
        quote: &QuotedMessage,
    ) -> (QuoteDirection, Vec<ForwardRecord>) {
        let direction = QuoteDirection::classify(event, quote);
        let lookup = RecordLookup {
            side: direction.local_side(),
            message_id: quote.id.clone(),
            bot: event.bot_key(),
            channel_id: event.channel_id.clone(),
        };

        let rows = match self.store.find(&lookup).await {
            Ok(rows) => rows,
            Err(e) => {
                warn!("Quote lookup for {} failed: {}", quote.id, e);
                Vec::new()
            }
        };

        debug!(
            "Quote {} ({:?}): {} candidate records",
            quote.id,
            direction,
            rows.len()
        );
        (direction, rows)
    }

    /// Resolve a quote for every target, in target order.
    ///
    /// The candidate set is fetched once. The text fallback is built once,
    /// and only when some target has no mapping.
    pub async fn resolve(
        &self,
        event: &InboundEvent,
        quote: &QuotedMessage,
        targets: &[TargetEndpoint],
        transformer: &ElementTransformer<'_>,
    ) -> Result<Vec<QuoteRef>> {
        let (direction, rows) = self.candidates(event, quote).await;
        let remote_side = direction.local_side().opposite();

        let native: Vec<Option<String>> = targets
            .iter()
            .map(|target| {
                let key = target.bot_key();
                rows.iter()
                    .map(|row| row.side(remote_side))
                    .find(|(_, bot, channel)| **bot == key && *channel == target.channel_id)
                    .map(|(message_id, _, _)| message_id.to_string())
            })
            .collect();

        let fallback = if native.iter().any(Option::is_none) {
            Some(fallback_text(quote, transformer).await?)
        } else {
            None
        };

        Ok(targets
            .iter()
            .zip(native)
            .map(|(target, id)| match id {
                Some(id) => {
                    debug!("Quote {} -> {} on '{}'", quote.id, id, target.name);
                    QuoteRef::Native(id)
                }
                None => {
                    debug!("Quote {} has no copy on '{}'; using text", quote.id, target.name);
                    QuoteRef::Fallback(fallback.clone().unwrap_or_default())
                }
            })
            .collect())
    }
}

/// `Re <name> ⌈<content>⌋` with emoji rendered as text.
async fn fallback_text(
    quote: &QuotedMessage,
    transformer: &ElementTransformer<'_>,
) -> Result<Vec<Element>> {
    let mut elements = Vec::with_capacity(quote.elements.len() + 2);
    elements.push(Element::text(format!("Re {} ⌈", quote.author.display_name())));
    elements.extend(quote.elements.iter().cloned());
    elements.push(Element::text("⌋\n"));

    transformer
        .transform(&elements, TransformOptions::face_as_text())
        .await
}
