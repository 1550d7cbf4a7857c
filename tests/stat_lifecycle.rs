use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use serde_json::{json, Value};

use character_stats::engine::host::SharedHost;
use character_stats::engine::injection::{OutboundRequest, STATS_MARKER};
use character_stats::engine::persistence::{MemoryStore, Partition};
use character_stats::engine::transport::{InboundResponse, StatsInterceptor, Transport};
use character_stats::engine::StatsContext;
use character_stats::model::preferences::{InjectRole, Preferences};

const CHAT_URL: &str = "http://localhost:1234/v1/chat/completions";

#[derive(Clone, Default)]
struct Capture {
    sent: Arc<Mutex<Vec<OutboundRequest>>>,
}

impl Capture {
    fn last(&self) -> OutboundRequest {
        self.sent.lock().unwrap().last().cloned().unwrap()
    }
}

impl Transport for Capture {
    fn send(&self, request: OutboundRequest) -> anyhow::Result<InboundResponse> {
        self.sent.lock().unwrap().push(request);
        Ok(InboundResponse {
            status: 200,
            body: "{}".to_string(),
        })
    }
}

fn context(storage: &MemoryStore, host: &SharedHost) -> StatsContext {
    StatsContext::load(Box::new(storage.clone()), Box::new(host.clone()))
}

fn chat_body() -> String {
    json!({
        "model": "local-model",
        "messages": [{ "role": "user", "content": "hello" }]
    })
    .to_string()
}

#[test]
fn chat_text_builds_up_the_global_sheet() {
    let storage = MemoryStore::new();
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);

    assert!(stats.observe_text("She has grown a tail."));
    assert!(stats.observe_text("Strength increased to 12."));

    assert_eq!(
        stats.summary().as_deref(),
        Some("[Character Stats: Tail: 1.00, Strength: 12.00]")
    );
    assert_eq!(storage.writes(Partition::Stats), 2);

    // same text again is a no-op and does not touch storage
    assert!(!stats.observe_text("Strength increased to 12."));
    assert!(!stats.observe_text("She has grown a tail."));
    assert_eq!(storage.writes(Partition::Stats), 2);

    assert!(!stats.observe_text("Nothing to see here."));
}

#[test]
fn each_character_keeps_its_own_sheet() {
    let storage = MemoryStore::new();
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);

    host.select("Alex", "");
    assert!(stats.observe_text("Height is now 180."));
    assert_eq!(stats.active_scope(), "char_Alex");

    let card = host.active_card().unwrap();
    assert_eq!(card.stats, "Height: 180.00\n");

    host.select("Bea", "bea.png");
    assert_eq!(stats.summary(), None);

    host.select("Alex", "");
    assert_eq!(
        stats.summary().as_deref(),
        Some("[Character Stats: Height: 180.00]")
    );

    host.select("", "");
    assert_eq!(stats.active_scope(), "global");
    assert_eq!(stats.summary(), None);
}

#[test]
fn stats_and_preferences_survive_a_reload() {
    let storage = MemoryStore::new();
    let host = SharedHost::new();

    {
        let mut stats = context(&storage, &host);
        stats.add_record("Height", "6", "ft").unwrap();
        stats.add_record("Mood", "calm", "").unwrap();
        stats.set_preferences(Preferences {
            inject_role: InjectRole::User,
            ..Preferences::default()
        });
    }

    let mut reloaded = context(&storage, &host);
    assert_eq!(reloaded.preferences().inject_role, InjectRole::User);
    assert_eq!(
        reloaded.summary().as_deref(),
        Some("[Character Stats: Height: 6.00 ft, Mood: calm]")
    );
}

#[test]
fn legacy_bare_values_are_upgraded_on_load() {
    let storage = MemoryStore::with(Partition::Stats, r#"{"global":{"luck":7,"eye_color":"green"}}"#);
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);

    assert_eq!(
        stats.summary().as_deref(),
        Some("[Character Stats: Luck: 7.00, Eye Color: green]")
    );
}

#[test]
fn oversized_numbers_never_cost_the_stored_sheets() {
    let storage = MemoryStore::new();
    let host = SharedHost::new();

    {
        let mut stats = context(&storage, &host);
        stats.add_record("Luck", "3", "").unwrap();
        host.select("Alex", "");
        stats.add_record("Height", "6", "ft").unwrap();

        let huge = "9".repeat(400);
        assert!(!stats.observe_text(&format!("power increased to {huge}")));
        stats.add_record("Mass", "1e300", "kg").unwrap();
        assert!(stats.grow("1e308").is_err());
        assert!(stats.delete_record("mass"));
    }

    let saved = storage.get(Partition::Stats).unwrap();
    assert!(!saved.contains("null"));

    let mut reloaded = context(&storage, &host);
    assert_eq!(
        reloaded.summary().as_deref(),
        Some("[Character Stats: Height: 6.00 ft]")
    );
    host.select("", "");
    assert_eq!(
        reloaded.summary().as_deref(),
        Some("[Character Stats: Luck: 3.00]")
    );
}

#[test]
fn one_unreadable_record_does_not_empty_the_store() {
    let storage = MemoryStore::with(
        Partition::Stats,
        r#"{"char_Alex":{"height":{"value":6.0,"unit":" ft","name":"Height"},"power":{"value":null,"unit":"","name":"Power"}},"global":{"luck":{"value":3.0,"unit":"","name":"Luck"}}}"#,
    );
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);

    assert_eq!(stats.summary().as_deref(), Some("[Character Stats: Luck: 3.00]"));
    host.select("Alex", "");
    assert_eq!(
        stats.summary().as_deref(),
        Some("[Character Stats: Height: 6.00 ft]")
    );
}

#[test]
fn broken_storage_starts_empty_and_keeps_working() {
    let storage = MemoryStore::with(Partition::Stats, "not json");
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);

    assert_eq!(stats.summary(), None);
    assert!(stats.observe_text("Speed is now 3."));
    assert_eq!(stats.summary().as_deref(), Some("[Character Stats: Speed: 3.00]"));

    storage.set_failing(true);
    assert!(stats.observe_text("Speed is now 4."));
    assert_eq!(stats.summary().as_deref(), Some("[Character Stats: Speed: 4.00]"));
}

#[test]
fn generation_requests_carry_the_sheet_once() {
    let storage = MemoryStore::new();
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);
    stats.observe_text("Height is now 7.");

    let capture = Capture::default();
    let interceptor = StatsInterceptor::new(capture.clone());
    let snapshot = stats.injection_snapshot();

    interceptor
        .send(OutboundRequest::post_json(CHAT_URL, chat_body()), &snapshot)
        .unwrap();
    let first = capture.last();
    let payload: Value = serde_json::from_str(first.body.as_deref().unwrap()).unwrap();
    let messages = payload["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["role"], "system");
    assert_eq!(
        messages[1]["content"],
        format!("{}\n[Character Stats: Height: 7.00]", STATS_MARKER)
    );

    // resending an already injected body leaves it alone
    let again = first.body.clone().unwrap();
    interceptor
        .send(OutboundRequest::post_json(CHAT_URL, again.clone()), &snapshot)
        .unwrap();
    assert_eq!(capture.last().body.as_deref(), Some(again.as_str()));
}

#[test]
fn other_traffic_and_disabled_injection_pass_through() {
    let storage = MemoryStore::new();
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);
    stats.observe_text("Height is now 7.");

    let capture = Capture::default();
    let interceptor = StatsInterceptor::new(capture.clone());

    let models = OutboundRequest::get("http://localhost:1234/v1/models");
    interceptor
        .send(models.clone(), &stats.injection_snapshot())
        .unwrap();
    assert_eq!(capture.last(), models);

    stats.set_preferences(Preferences {
        auto_inject: false,
        ..Preferences::default()
    });
    let chat = OutboundRequest::post_json(CHAT_URL, chat_body());
    interceptor
        .send(chat.clone(), &stats.injection_snapshot())
        .unwrap();
    assert_eq!(capture.last(), chat);
}

#[test]
fn comparison_uses_the_first_positive_numeric_stat() {
    let storage = MemoryStore::new();
    let host = SharedHost::new();
    let mut stats = context(&storage, &host);

    assert!(stats.compare().is_err());

    host.select("Alex", "");
    stats.add_record("Mood", "calm", "").unwrap();
    stats.add_record("Height", "6", "ft").unwrap();

    let report = stats.compare().unwrap();
    assert_eq!(report.stat_name, "Height");
    assert_eq!(report.matches.len(), 5);

    let text = report.render();
    assert!(text.starts_with("📏 Height Comparisons:\n\n"));
    assert!(text.lines().skip(2).all(|line| line.starts_with("Alex is ")));
}
