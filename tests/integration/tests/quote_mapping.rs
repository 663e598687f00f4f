//! Cross-platform quote mapping through the forward ledger.

use mirrorbot_core::types::{Author, Element, QuotedMessage};
use mirrorbot_integration_tests::{message, texts, FakeBot, Harness};

/// QQ and Discord channels mirrored both ways.
const BRIDGE: &str = r#"{
    endpoints: {
        qq: { type: "full", platform: "onebot", self_id: "qqbot", channel_id: "qq-chan" },
        dc: { type: "full", platform: "discord", self_id: "dcbot", channel_id: "dc-chan", impersonate: true },
    },
    rules: [
        { source: "qq", targets: ["dc"] },
        { source: "dc", targets: ["qq"] },
    ],
    delay: { discord: 0, onebot: 0 },
}"#;

fn quote(id: &str, author_id: &str, name: &str, text: &str) -> QuotedMessage {
    QuotedMessage {
        id: id.to_string(),
        author: Author {
            id: author_id.to_string(),
            name: Some(name.to_string()),
            nick: None,
            avatar: None,
        },
        elements: vec![Element::text(text)],
    }
}

#[tokio::test]
async fn test_reply_to_forwarded_copy_quotes_original() {
    let qq = FakeBot::online("onebot", "qqbot");
    let dc = FakeBot::online("discord", "dcbot");
    let harness = Harness::new(BRIDGE, &[qq.clone(), dc.clone()]).await;
    let [qq_to_dc, dc_to_qq] = [&harness.forwarder.rules()[0], &harness.forwarder.rules()[1]];

    // q1 on QQ is mirrored to Discord as dcbot-1.
    let original = message("onebot", "qqbot", "qq-chan", "q1", vec![Element::text("hi")]);
    harness.forwarder.handle(qq_to_dc, &original).await.unwrap();
    assert_eq!(dc.sends()[0].ids, vec!["dcbot-1".to_string()]);

    // On Discord, someone replies to the copy the bridge bot posted.
    let mut reply = message("discord", "dcbot", "dc-chan", "d2", vec![Element::text("yo")]);
    reply.quote = Some(quote("dcbot-1", "dcbot", "bridge", "hi"));
    harness.forwarder.handle(dc_to_qq, &reply).await.unwrap();

    let payload = &qq.sends()[0].payload;
    assert_eq!(payload[0], Element::quote("q1"));
    assert!(!texts(payload).iter().any(|t| t.starts_with("Re ")));
}

#[tokio::test]
async fn test_reply_to_native_message_quotes_its_copy() {
    let qq = FakeBot::online("onebot", "qqbot");
    let dc = FakeBot::online("discord", "dcbot");
    let harness = Harness::new(BRIDGE, &[qq.clone(), dc.clone()]).await;
    let qq_to_dc = &harness.forwarder.rules()[0];

    let original = message("onebot", "qqbot", "qq-chan", "q1", vec![Element::text("hi")]);
    harness.forwarder.handle(qq_to_dc, &original).await.unwrap();

    // On QQ, someone replies to q1 itself.
    let mut reply = message("onebot", "qqbot", "qq-chan", "q2", vec![Element::text("agreed")]);
    reply.quote = Some(quote("q1", "user-1", "alice", "hi"));
    harness.forwarder.handle(qq_to_dc, &reply).await.unwrap();

    // Discord impersonates, so the quote follows the author wrapper.
    let payload = &dc.sends()[1].payload;
    assert!(payload[0].is_author());
    assert_eq!(payload[1], Element::quote("dcbot-1"));
    assert_eq!(payload[2], Element::text("agreed"));
}

#[tokio::test]
async fn test_unmapped_quote_falls_back_to_text() {
    let qq = FakeBot::online("onebot", "qqbot");
    let dc = FakeBot::online("discord", "dcbot");
    let harness = Harness::new(BRIDGE, &[qq.clone(), dc.clone()]).await;
    let dc_to_qq = &harness.forwarder.rules()[1];

    let mut reply = message("discord", "dcbot", "dc-chan", "d9", vec![Element::text("what?")]);
    let mut quoted = quote("d1", "user-5", "bob", "old news ");
    quoted.elements.push(Element::Face {
        id: "123".into(),
        name: Some("shrug".into()),
        animated: false,
    });
    reply.quote = Some(quoted);
    harness.forwarder.handle(dc_to_qq, &reply).await.unwrap();

    let payload = &qq.sends()[0].payload;
    assert_eq!(
        texts(payload),
        vec!["Re bob ⌈", "old news ", "[shrug]", "⌋\n", "🎮 ", ":", "what?"]
    );
    assert!(!payload.iter().any(|e| matches!(e, Element::Quote { .. })));
}
