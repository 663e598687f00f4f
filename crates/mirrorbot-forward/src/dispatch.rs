//! Delivery to the targets of one rule.

use crate::quote::QuoteRef;
use chrono::Utc;
use mirrorbot_channels::BotRegistry;
use mirrorbot_core::config::{ForwardPlan, TargetEndpoint};
use mirrorbot_core::types::{Element, InboundEvent, PlatformCatalog, PlatformProfile};
use mirrorbot_ledger::{NewForwardRecord, RecordStore};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Outcome of delivering one message to a rule's targets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Targets a send was attempted on.
    pub attempted: usize,

    /// Targets skipped because their bot was missing or offline.
    pub skipped: usize,

    /// Attempted sends that failed.
    pub failed: usize,

    /// Failed sends the platform reported as transient.
    pub transient: usize,

    /// Forward records written.
    pub records: usize,

    /// Whether the record batch could not be written.
    pub ledger_failed: bool,
}

impl DispatchReport {
    /// Targets that received the message.
    pub fn delivered(&self) -> usize {
        self.attempted - self.failed
    }
}

/// Paces, composes, sends, and records deliveries.
#[derive(Clone)]
pub struct Dispatcher {
    plan: Arc<ForwardPlan>,
    catalog: Arc<PlatformCatalog>,
    registry: Arc<dyn BotRegistry>,
    store: Arc<dyn RecordStore>,
}

impl Dispatcher {
    /// Create a dispatcher.
    pub fn new(
        plan: Arc<ForwardPlan>,
        catalog: Arc<PlatformCatalog>,
        registry: Arc<dyn BotRegistry>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            plan,
            catalog,
            registry,
            store,
        }
    }

    /// Deliver transformed content to every target, in order.
    ///
    /// `quotes` is either empty or holds one reference per target. Failures
    /// on one target never affect the others. Records of all successful
    /// sends are written as one batch after the last target.
    pub async fn dispatch(
        &self,
        event: &InboundEvent,
        targets: &[TargetEndpoint],
        content: &[Element],
        quotes: &[QuoteRef],
    ) -> DispatchReport {
        let origin = self.catalog.get(&event.platform);
        let origin_bot = event.bot_key();
        let mut report = DispatchReport::default();
        let mut records = Vec::new();

        for (index, target) in targets.iter().enumerate() {
            let key = target.bot_key();

            let Some(bot) = self.registry.get(&key).await else {
                warn!("Bot {} is not connected; skipping target '{}'", key, target.name);
                report.skipped += 1;
                continue;
            };

            if !bot.is_online() {
                warn!(
                    "Bot {} is {:?}; skipping target '{}'",
                    key,
                    bot.status(),
                    target.name
                );
                report.skipped += 1;
                continue;
            }

            // Paced by list position, so a skipped first target still delays the next.
            if index > 0 {
                let delay = self.plan.delay_for(&target.platform);
                debug!("Waiting {:?} before sending to '{}'", delay, target.name);
                tokio::time::sleep(delay).await;
            }
            report.attempted += 1;

            let target_profile = self.catalog.get(&target.platform);
            let payload = compose(
                event,
                &origin,
                &target_profile,
                target,
                content,
                quotes.get(index),
            );

            match bot.send_message(&target.channel_id, &payload).await {
                Ok(ids) => {
                    debug!(
                        "Forwarded {} to '{}' as {:?}",
                        event.message_id, target.name, ids
                    );
                    let sent_at = Utc::now();
                    records.extend(ids.into_iter().map(|id| NewForwardRecord {
                        origin_message_id: event.message_id.clone(),
                        origin_bot: origin_bot.clone(),
                        origin_channel_id: event.channel_id.clone(),
                        dest_message_id: id,
                        dest_bot: key.clone(),
                        dest_channel_id: target.channel_id.clone(),
                        created_at: sent_at,
                    }));
                }
                Err(e) if e.is_transient() => {
                    warn!(
                        "Failed to forward {} to '{}' (transient): {}",
                        event.message_id, target.name, e
                    );
                    report.failed += 1;
                    report.transient += 1;
                }
                Err(e) => {
                    error!(
                        "Failed to forward {} to '{}': {}",
                        event.message_id, target.name, e
                    );
                    report.failed += 1;
                }
            }
        }

        if !records.is_empty() {
            match self.store.insert_batch(records).await {
                Ok(written) => report.records = written,
                Err(e) => {
                    error!(
                        "Failed to record forwards of {}: {}",
                        event.message_id, e
                    );
                    report.ledger_failed = true;
                }
            }
        }

        report
    }
}

/// Build the payload sent to one target.
///
/// The author is shown through an impersonation wrapper when the target
/// opts in and its platform supports it, otherwise through a text prefix.
/// A native quote goes right after the wrapper, or first; a text quote goes
/// in front of everything.
pub fn compose(
    event: &InboundEvent,
    origin: &PlatformProfile,
    target_profile: &PlatformProfile,
    target: &TargetEndpoint,
    content: &[Element],
    quote: Option<&QuoteRef>,
) -> Vec<Element> {
    let name = event.display_name();
    let mut payload = Vec::with_capacity(content.len() + 5);

    if target.impersonate && target_profile.impersonation {
        let avatar = if origin.public_avatars {
            event.author.avatar.clone()
        } else {
            target_profile.default_avatar.clone()
        };
        payload.push(Element::Author {
            name: format!("{}{}", origin.icon, name),
            avatar,
        });
    } else {
        payload.push(Element::text(format!("{} ", origin.icon)));
        payload.push(Element::bold(name));
        payload.push(Element::text(":"));
        payload.push(Element::Break);
    }

    payload.extend_from_slice(content);

    match quote {
        Some(QuoteRef::Native(id)) => {
            let at = usize::from(payload.first().is_some_and(Element::is_author));
            payload.insert(at, Element::quote(id));
        }
        Some(QuoteRef::Fallback(text)) => {
            payload.splice(0..0, text.iter().cloned());
        }
        None => {}
    }

    payload
}
