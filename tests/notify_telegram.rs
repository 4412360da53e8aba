// tests/notify_telegram.rs
use httpmock::prelude::*;
use listing_watcher::config::TelegramConfig;
use listing_watcher::notify::{Notifier, TelegramNotifier};

fn config() -> TelegramConfig {
    TelegramConfig {
        bot_token: "testtoken".to_string(),
        chat_ids: vec!["1004156477".to_string(), "281633592".to_string()],
    }
}

#[tokio::test]
async fn fans_out_to_every_configured_chat() {
    let server = MockServer::start();
    let first = server.mock(|when, then| {
        when.method(POST)
            .path("/bottesttoken/sendMessage")
            .body_includes("chat_id=1004156477");
        then.status(200).body(r#"{"ok":true}"#);
    });
    let second = server.mock(|when, then| {
        when.method(POST)
            .path("/bottesttoken/sendMessage")
            .body_includes("chat_id=281633592");
        then.status(200).body(r#"{"ok":true}"#);
    });

    let notifier = TelegramNotifier::with_base_url(&config(), server.base_url());
    notifier.send("📢 New listing!\nBinance : FOO-USDT").await.unwrap();

    first.assert_hits(1);
    second.assert_hits(1);
}

#[tokio::test]
async fn one_rejected_chat_does_not_block_the_rest() {
    let server = MockServer::start();
    let rejected = server.mock(|when, then| {
        when.method(POST)
            .path("/bottesttoken/sendMessage")
            .body_includes("chat_id=1004156477");
        then.status(403).body(r#"{"ok":false}"#);
    });
    let delivered = server.mock(|when, then| {
        when.method(POST)
            .path("/bottesttoken/sendMessage")
            .body_includes("chat_id=281633592");
        then.status(200).body(r#"{"ok":true}"#);
    });

    let notifier = TelegramNotifier::with_base_url(&config(), server.base_url());
    // Delivery failures are logged, never surfaced to the cycle.
    notifier.send("hello").await.unwrap();

    rejected.assert_hits(1);
    delivered.assert_hits(1);
}
