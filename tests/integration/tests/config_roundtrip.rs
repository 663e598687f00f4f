//! Config persistence and rule resolution from disk.

use mirrorbot_core::config::EndpointConfig;
use mirrorbot_core::Config;

const BRIDGE: &str = r#"{
    // QQ guild relayed to Discord, with file pulls through the QQ client.
    endpoints: {
        qq: {
            type: "full",
            platform: "onebot",
            self_id: "qqbot",
            channel_id: "qq-chan",
            blocking_words: ["^/bot"],
            file_api: { endpoint: "http://127.0.0.1:5700", token: "s3cret" },
        },
        dc: { type: "target", platform: "discord", self_id: "dcbot", channel_id: "dc-chan", impersonate: true },
    },
    rules: [{ source: "qq", targets: ["dc"] }],
    delay: { discord: 500 },
    ledger: { path: "/var/lib/mirrorbot/ledger.db" },
}"#;

#[test]
fn test_save_and_reload_preserves_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("mirrorbot.json5");

    let config = Config::parse(BRIDGE).unwrap();
    config.save(&path).unwrap();
    assert!(!path.with_extension("tmp").exists());

    let reloaded = Config::load(&path).unwrap();
    assert_eq!(reloaded.rules, config.rules);
    assert_eq!(reloaded.delay.get("discord"), Some(&500));

    match reloaded.endpoints.get("qq") {
        Some(EndpointConfig::Full(qq)) => {
            assert_eq!(qq.blocking_words, vec!["^/bot".to_string()]);
            let file_api = qq.file_api.as_ref().unwrap();
            assert_eq!(file_api.token.expose_secret(), "s3cret");
        }
        other => panic!("Expected full endpoint, got {:?}", other),
    }
}

#[test]
fn test_reloaded_config_resolves_same_rules() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mirrorbot.json5");
    Config::parse(BRIDGE).unwrap().save(&path).unwrap();

    let plan = Config::load(&path).unwrap().validate().unwrap();
    let rules = plan.active_rules();
    assert_eq!(rules.len(), 1);

    let rule = &rules[0];
    assert_eq!(rule.source.self_id.as_deref(), Some("qqbot"));
    assert!(rule.source.blocked_by(&["/bot help"]).is_some());
    assert!(rule.source.blocked_by(&["hello /bot"]).is_none());
    assert_eq!(
        rule.source.file_api.as_ref().map(|f| f.endpoint.as_str()),
        Some("http://127.0.0.1:5700/")
    );

    assert_eq!(rule.targets[0].bot_key().to_string(), "discord:dcbot");
    assert!(rule.targets[0].impersonate);
    assert_eq!(
        plan.delay_for("discord"),
        std::time::Duration::from_millis(500)
    );
}

#[test]
fn test_load_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(Config::load(&dir.path().join("absent.json5")).is_err());
}
