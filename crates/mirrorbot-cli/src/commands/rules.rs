//! Forward rule listing.

use mirrorbot_core::config::{ForwardPlan, RuleResolution};
use mirrorbot_core::Config;
use std::path::Path;

/// Run the rules command.
pub async fn run(path: &Path) -> anyhow::Result<()> {
    let plan = Config::load(path)?.validate()?;
    for line in describe(&plan) {
        println!("{}", line);
    }
    Ok(())
}

/// One line per rule: its source and targets in pacing order, or why it is inert.
pub fn describe(plan: &ForwardPlan) -> Vec<String> {
    plan.resolve()
        .into_iter()
        .map(|resolution| match resolution {
            RuleResolution::Active(rule) => {
                let targets: Vec<String> = rule
                    .targets
                    .iter()
                    .map(|t| {
                        format!(
                            "{} ({}:{} #{}, {}ms)",
                            t.name,
                            t.platform,
                            t.self_id,
                            t.channel_id,
                            plan.delay_for(&t.platform).as_millis()
                        )
                    })
                    .collect();
                format!(
                    "rule {}: {} [{}] -> {}",
                    rule.index,
                    rule.source.name,
                    rule.source.platform,
                    targets.join(", ")
                )
            }
            RuleResolution::Inert { index, reason } => {
                format!("rule {}: inert ({})", index, reason)
            }
        })
        .collect()
}
