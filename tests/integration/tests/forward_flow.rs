//! End-to-end forwarding tests: routing, filtering, pacing, and recording.

use mirrorbot_core::types::{BotKey, Element, Mention};
use mirrorbot_forward::{ForwardError, IgnoreReason, Outcome};
use mirrorbot_integration_tests::{message, texts, FakeBot, Harness};
use mirrorbot_ledger::{MemoryRecordStore, RecordLookup, RecordStore};
use std::sync::Arc;
use std::time::Duration;

const FAN_OUT: &str = r#"{
    endpoints: {
        qq: { type: "source", platform: "onebot", channel_id: "qq-chan", blocking_words: ["secret", "^/"] },
        dc: { type: "target", platform: "discord", self_id: "dcbot", channel_id: "dc-chan" },
        tg: { type: "target", platform: "telegram", self_id: "tgbot", channel_id: "tg-chan" },
        off: { type: "target", platform: "telegram", self_id: "tgbot", channel_id: "off-chan", disabled: true },
    },
    rules: [{ source: "qq", targets: ["dc", "off", "tg"] }],
    delay: { discord: 0, telegram: 0 },
}"#;

fn hello(id: &str) -> mirrorbot_core::types::InboundEvent {
    message("onebot", "qqbot", "qq-chan", id, vec![Element::text("hello")])
}

#[tokio::test]
async fn test_one_send_per_enabled_target_in_order() {
    let dc = FakeBot::online("discord", "dcbot");
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(FAN_OUT, &[dc.clone(), tg.clone()]).await;
    let rule = &harness.forwarder.rules()[0];

    let outcome = harness.forwarder.handle(rule, &hello("m1")).await.unwrap();
    let Outcome::Dispatched(report) = outcome else {
        panic!("Expected dispatch, got {:?}", outcome);
    };
    assert_eq!(report.attempted, 2);
    assert_eq!(report.records, 2);

    let dc_sends = dc.sends();
    let tg_sends = tg.sends();
    assert_eq!(dc_sends.len(), 1);
    assert_eq!(tg_sends.len(), 1);
    assert_eq!(tg_sends[0].channel_id, "tg-chan");
    assert!(dc_sends[0].at <= tg_sends[0].at);

    assert_eq!(
        dc_sends[0].payload,
        vec![
            Element::text("🐧 "),
            Element::bold("alice"),
            Element::text(":"),
            Element::Break,
            Element::text("hello"),
        ]
    );
}

#[tokio::test]
async fn test_blocking_word_suppresses_every_target() {
    let dc = FakeBot::online("discord", "dcbot");
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(FAN_OUT, &[dc.clone(), tg.clone()]).await;
    let rule = &harness.forwarder.rules()[0];

    let event = message(
        "onebot",
        "qqbot",
        "qq-chan",
        "m1",
        vec![Element::text("fine"), Element::text("a secret plan")],
    );
    let outcome = harness.forwarder.handle(rule, &event).await.unwrap();

    assert_eq!(
        outcome,
        Outcome::Ignored(IgnoreReason::Blocked("secret".to_string()))
    );
    assert!(dc.sends().is_empty());
    assert!(tg.sends().is_empty());
    assert_eq!(harness.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_redelivery_writes_two_batches() {
    let dc = FakeBot::online("discord", "dcbot");
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(FAN_OUT, &[dc.clone(), tg]).await;
    let rule = &harness.forwarder.rules()[0];

    harness.forwarder.handle(rule, &hello("m1")).await.unwrap();
    harness.forwarder.handle(rule, &hello("m1")).await.unwrap();

    let rows = harness
        .store
        .find(&RecordLookup::origin(
            "m1",
            BotKey::new("onebot", "qqbot"),
            "qq-chan",
        ))
        .await
        .unwrap();
    assert_eq!(rows.len(), 4);

    let dc_ids: Vec<&str> = rows
        .iter()
        .filter(|r| r.dest_bot.as_str() == "discord:dcbot")
        .map(|r| r.dest_message_id.as_str())
        .collect();
    assert_eq!(dc_ids, vec!["dcbot-1", "dcbot-2"]);
}

#[tokio::test]
async fn test_single_target_hello_writes_one_record() {
    let config = r#"{
        endpoints: {
            qq: { type: "source", platform: "onebot", channel_id: "qq-chan" },
            dc: { type: "target", platform: "discord", self_id: "dcbot", channel_id: "dc-chan" },
        },
        rules: [{ source: "qq", targets: ["dc"] }],
    }"#;
    let dc = FakeBot::online("discord", "dcbot");
    let harness = Harness::new(config, &[dc.clone()]).await;
    let rule = &harness.forwarder.rules()[0];

    harness.forwarder.handle(rule, &hello("m42")).await.unwrap();

    let rows = harness.store.recent(10).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].origin_message_id, "m42");
    assert_eq!(rows[0].dest_message_id, dc.sends()[0].ids[0]);

    // Discoverable from both sides.
    let by_dest = harness
        .store
        .find(&RecordLookup::destination(
            "dcbot-1",
            BotKey::new("discord", "dcbot"),
            "dc-chan",
        ))
        .await
        .unwrap();
    assert_eq!(by_dest[0].origin_message_id, "m42");
}

#[tokio::test(start_paused = true)]
async fn test_pacing_between_targets() {
    let config = r#"{
        endpoints: {
            qq: { type: "source", platform: "onebot", channel_id: "qq-chan" },
            a: { type: "target", platform: "discord", self_id: "dcbot", channel_id: "a" },
            b: { type: "target", platform: "discord", self_id: "dcbot", channel_id: "b" },
            c: { type: "target", platform: "telegram", self_id: "tgbot", channel_id: "c" },
        },
        rules: [{ source: "qq", targets: ["a", "b", "c"] }],
        delay: { discord: 300 },
    }"#;
    let dc = FakeBot::online("discord", "dcbot");
    let tg = FakeBot::online("telegram", "tgbot");
    // Paused time: keep the ledger off SQLite's worker thread.
    let store = Arc::new(MemoryRecordStore::new());
    let harness = Harness::with_store(config, &[dc.clone(), tg.clone()], store).await;
    let rule = &harness.forwarder.rules()[0];

    let start = tokio::time::Instant::now();
    harness.forwarder.handle(rule, &hello("m1")).await.unwrap();

    let dc_sends = dc.sends();
    let tg_sends = tg.sends();
    assert!(dc_sends[0].at - start < Duration::from_millis(300));
    assert!(dc_sends[1].at - dc_sends[0].at >= Duration::from_millis(300));
    // Telegram has no configured delay: the default applies.
    assert!(tg_sends[0].at - dc_sends[1].at >= Duration::from_millis(200));
}

#[tokio::test]
async fn test_offline_and_failing_targets_do_not_block_siblings() {
    let config = r#"{
        endpoints: {
            qq: { type: "source", platform: "onebot", channel_id: "qq-chan" },
            down: { type: "target", platform: "kook", self_id: "kbot", channel_id: "k" },
            bad: { type: "target", platform: "discord", self_id: "dcbot", channel_id: "d" },
            ok: { type: "target", platform: "telegram", self_id: "tgbot", channel_id: "t" },
        },
        rules: [{ source: "qq", targets: ["down", "bad", "ok"] }],
        delay: { discord: 0, telegram: 0 },
    }"#;
    let kook = FakeBot::offline("kook", "kbot");
    let dc = FakeBot::online("discord", "dcbot");
    dc.set_failing(true);
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(config, &[kook.clone(), dc, tg.clone()]).await;
    let rule = &harness.forwarder.rules()[0];

    let Outcome::Dispatched(report) = harness.forwarder.handle(rule, &hello("m1")).await.unwrap()
    else {
        panic!("Expected dispatch");
    };
    assert_eq!(report.skipped, 1);
    assert_eq!(report.attempted, 2);
    assert_eq!(report.failed, 1);
    assert_eq!(report.records, 1);
    assert!(kook.sends().is_empty());
    assert_eq!(tg.sends().len(), 1);
}

#[tokio::test]
async fn test_unconfigured_file_api_yields_placeholder() {
    let dc = FakeBot::online("discord", "dcbot");
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(FAN_OUT, &[dc.clone(), tg]).await;
    let rule = &harness.forwarder.rules()[0];

    let event = message(
        "onebot",
        "qqbot",
        "qq-chan",
        "m1",
        vec![Element::File {
            src: None,
            file: Some("report.pdf".into()),
            file_id: Some("fid-1".into()),
            title: None,
        }],
    );
    harness.forwarder.handle(rule, &event).await.unwrap();

    let payload = &dc.sends()[0].payload;
    assert_eq!(payload.last(), Some(&Element::text("[unsupported file]")));
}

#[tokio::test]
async fn test_duplicate_file_event_is_ignored() {
    let dc = FakeBot::online("discord", "dcbot");
    let harness = Harness::new(FAN_OUT, &[dc.clone()]).await;
    let rule = &harness.forwarder.rules()[0];

    let mut event = hello("m1");
    event.subtype = Some("guild-file-added".into());
    let outcome = harness.forwarder.handle(rule, &event).await.unwrap();

    assert!(matches!(outcome, Outcome::Ignored(IgnoreReason::Duplicate(_))));
    assert!(dc.sends().is_empty());
}

#[tokio::test]
async fn test_transform_failure_aborts_every_target() {
    let config = r#"{
        endpoints: {
            dc: { type: "source", platform: "discord", self_id: "dcbot", channel_id: "dc-chan" },
            tg: { type: "target", platform: "telegram", self_id: "tgbot", channel_id: "tg-chan" },
        },
        rules: [{ source: "dc", targets: ["tg"] }],
    }"#;
    // The receiving bot knows no members, so mention lookups fail.
    let dc = FakeBot::online("discord", "dcbot");
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(config, &[dc, tg.clone()]).await;
    let rule = &harness.forwarder.rules()[0];

    let event = message(
        "discord",
        "dcbot",
        "dc-chan",
        "d1",
        vec![
            Element::text("hey "),
            Element::Mention(Mention {
                id: Some("404".into()),
                ..Default::default()
            }),
        ],
    );
    let result = harness.forwarder.handle(rule, &event).await;

    assert!(matches!(result, Err(ForwardError::Channel(_))));
    assert!(tg.sends().is_empty());
    assert_eq!(harness.store.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_mentions_resolved_through_receiving_bot() {
    let config = r#"{
        endpoints: {
            dc: { type: "source", platform: "discord", self_id: "dcbot", channel_id: "dc-chan" },
            tg: { type: "target", platform: "telegram", self_id: "tgbot", channel_id: "tg-chan" },
        },
        rules: [{ source: "dc", targets: ["tg"] }],
    }"#;
    let dc = FakeBot::with_members(
        "discord",
        "dcbot",
        vec![mirrorbot_channels::GuildMember {
            user_id: "7".into(),
            nick: Some("Bobby".into()),
            username: Some("bob".into()),
        }],
    );
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(config, &[dc, tg.clone()]).await;
    let rule = &harness.forwarder.rules()[0];

    let event = message(
        "discord",
        "dcbot",
        "dc-chan",
        "d1",
        vec![
            Element::Mention(Mention {
                id: Some("7".into()),
                ..Default::default()
            }),
            Element::text("look"),
        ],
    );
    harness.forwarder.handle(rule, &event).await.unwrap();

    let sends = tg.sends();
    assert_eq!(texts(&sends[0].payload), vec!["🎮 ", ":", "@Bobby ", "look"]);
}

#[tokio::test]
async fn test_event_bus_drives_forwarding() {
    let dc = FakeBot::online("discord", "dcbot");
    let tg = FakeBot::online("telegram", "tgbot");
    let harness = Harness::new(FAN_OUT, &[dc.clone(), tg.clone()]).await;

    let bus = mirrorbot_channels::EventBus::new();
    let handles = harness.forwarder.clone().spawn(&bus);
    assert_eq!(handles.len(), 1);

    bus.publish(hello("m1"));
    // Wrong channel: no rule listens to it.
    bus.publish(message("onebot", "qqbot", "other", "m2", vec![Element::text("x")]));

    for _ in 0..100 {
        if harness.store.count().await.unwrap() >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    assert_eq!(harness.store.count().await.unwrap(), 2);
    assert_eq!(dc.sends().len(), 1);
    assert_eq!(tg.sends().len(), 1);

    for handle in handles {
        handle.abort();
    }
}
