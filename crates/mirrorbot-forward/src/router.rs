//! Rule routing.
//!
//! The [`Forwarder`] owns the resolved rules. Each active rule listens on
//! the event bus for its source; every qualifying message runs through
//! filter, transform, quote resolution, and dispatch.

use crate::dispatch::{DispatchReport, Dispatcher};
use crate::file_api::FileApiClient;
use crate::quote::QuoteResolver;
use crate::transform::{ElementTransformer, TransformOptions};
use crate::Result;
use mirrorbot_channels::{BotRegistry, EventBus, EventFilter};
use mirrorbot_core::config::{ForwardPlan, ResolvedRule};
use mirrorbot_core::types::{Element, InboundEvent, PlatformCatalog};
use mirrorbot_ledger::RecordStore;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Why a message was not forwarded by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreReason {
    /// The event does not come from the rule's source.
    OutsideSource,

    /// The event is a known duplicate emitted by the platform client.
    Duplicate(String),

    /// A text element matched a blocking-word pattern.
    Blocked(String),
}

/// What a rule did with one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The message was dropped before transformation.
    Ignored(IgnoreReason),

    /// The message was dispatched to the rule's targets.
    Dispatched(DispatchReport),
}

/// Routes inbound messages through the configured forward rules.
pub struct Forwarder {
    rules: Vec<ResolvedRule>,
    catalog: Arc<PlatformCatalog>,
    registry: Arc<dyn BotRegistry>,
    quotes: QuoteResolver,
    dispatcher: Dispatcher,
    http: reqwest::Client,
}

impl Forwarder {
    /// Create a forwarder with the built-in platform catalog.
    pub fn new(
        plan: ForwardPlan,
        registry: Arc<dyn BotRegistry>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self::with_catalog(plan, PlatformCatalog::builtin(), registry, store)
    }

    /// Create a forwarder with a custom platform catalog.
    pub fn with_catalog(
        plan: ForwardPlan,
        catalog: PlatformCatalog,
        registry: Arc<dyn BotRegistry>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        let rules = plan.active_rules();
        let plan = Arc::new(plan);
        let catalog = Arc::new(catalog);

        Self {
            rules,
            dispatcher: Dispatcher::new(
                plan,
                catalog.clone(),
                registry.clone(),
                store.clone(),
            ),
            quotes: QuoteResolver::new(store),
            catalog,
            registry,
            http: reqwest::Client::new(),
        }
    }

    /// Active rules, in configured order.
    pub fn rules(&self) -> &[ResolvedRule] {
        &self.rules
    }

    /// Start one listener per active rule.
    ///
    /// Each qualifying message is handled in its own task, so messages are
    /// processed concurrently and their sends may interleave.
    pub fn spawn(self: Arc<Self>, bus: &EventBus) -> Vec<JoinHandle<()>> {
        (0..self.rules.len())
            .map(|index| {
                let rule = &self.rules[index];
                let mut subscription = bus.subscribe(EventFilter::from(&rule.source));
                info!(
                    "Rule {}: forwarding '{}' to {} targets",
                    rule.index,
                    rule.source.name,
                    rule.targets.len()
                );

                let forwarder = self.clone();
                tokio::spawn(async move {
                    while let Some(event) = subscription.next().await {
                        let forwarder = forwarder.clone();
                        tokio::spawn(async move {
                            // Failures are logged by `handle`.
                            let _ = forwarder.handle(&forwarder.rules[index], &event).await;
                        });
                    }
                    debug!("Rule {}: event bus closed", index);
                })
            })
            .collect()
    }

    /// Run one message through one rule.
    ///
    /// A transformation failure aborts delivery to every target and is
    /// returned as an error. Per-target failures are reported in the
    /// [`DispatchReport`].
    pub async fn handle(&self, rule: &ResolvedRule, event: &InboundEvent) -> Result<Outcome> {
        if !EventFilter::from(&rule.source).matches(event) {
            return Ok(Outcome::Ignored(IgnoreReason::OutsideSource));
        }

        let origin = self.catalog.get(&event.platform);
        if origin.ignores_subtype(event.subtype.as_deref()) {
            let subtype = event.subtype.clone().unwrap_or_default();
            debug!("Rule {}: ignoring {} event {}", rule.index, subtype, event.message_id);
            return Ok(Outcome::Ignored(IgnoreReason::Duplicate(subtype)));
        }

        let texts: Vec<&str> = event.elements.iter().filter_map(Element::as_text).collect();
        if let Some(pattern) = rule.source.blocked_by(&texts) {
            debug!(
                "Rule {}: message {} blocked by /{}/",
                rule.index,
                event.message_id,
                pattern.as_str()
            );
            return Ok(Outcome::Ignored(IgnoreReason::Blocked(
                pattern.as_str().to_string(),
            )));
        }

        let receiver = self.registry.get(&event.bot_key()).await;
        let file_api = rule
            .source
            .file_api
            .as_ref()
            .map(|api| FileApiClient::new(self.http.clone(), api));
        let transformer = ElementTransformer::new(&origin)
            .with_guild(event.guild_id.as_deref())
            .with_directory(receiver.as_deref())
            .with_file_api(file_api.as_ref());

        let content = match transformer
            .transform(&event.elements, TransformOptions::default())
            .await
        {
            Ok(content) => content,
            Err(e) => {
                error!(
                    "Rule {}: cannot transform message {}: {}",
                    rule.index, event.message_id, e
                );
                return Err(e);
            }
        };

        let quotes = match &event.quote {
            Some(quote) => match self
                .quotes
                .resolve(event, quote, &rule.targets, &transformer)
                .await
            {
                Ok(quotes) => quotes,
                Err(e) => {
                    error!(
                        "Rule {}: cannot quote {} in message {}: {}",
                        rule.index, quote.id, event.message_id, e
                    );
                    return Err(e);
                }
            },
            None => Vec::new(),
        };

        let report = self
            .dispatcher
            .dispatch(event, &rule.targets, &content, &quotes)
            .await;
        debug!("Rule {}: message {}: {:?}", rule.index, event.message_id, report);

        Ok(Outcome::Dispatched(report))
    }
}
