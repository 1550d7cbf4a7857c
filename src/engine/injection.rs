//! Merges the stat summary into outbound generation requests.
//!
//! The summary travels behind [`STATS_MARKER`]; a body that already carries
//! the marker is forwarded byte for byte, so resent requests never stack
//! duplicate stat blocks.

use serde_json::{json, Value};

use crate::engine::error::{Result, StatsError};
use crate::model::preferences::{InjectRole, Preferences};
use crate::model::scope::StatScope;

pub const STATS_MARKER: &str = "<!--STATS-->";

/// A request on its way to the transport.
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: String,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl OutboundRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: "GET".to_string(),
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post_json(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            method: "POST".to_string(),
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body.into()),
        }
    }
}

/// What the pipeline reads from the stat engine for one request.
#[derive(Debug, Clone, PartialEq)]
pub struct InjectionSnapshot {
    pub prefs: Preferences,
    pub summary: Option<String>,
}

/// `"[Character Stats: Height: 6.00 ft, Mood: calm]"`, or `None` for an
/// empty scope.
pub fn build_summary(scope: &StatScope) -> Option<String> {
    if scope.is_empty() {
        return None;
    }
    let parts: Vec<String> = scope
        .iter()
        .map(|(_, record)| format!("{}: {}", record.name, record.display_value()))
        .collect();
    Some(format!("[Character Stats: {}]", parts.join(", ")))
}

fn path_of(url: &str) -> String {
    reqwest::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.split(['?', '#']).next().unwrap_or(url).to_string())
}

/// Generation requests are POSTs to an API chat/generate/completion path
/// that is not a settings endpoint.
pub fn should_intercept(method: &str, url: &str) -> bool {
    if !method.eq_ignore_ascii_case("POST") {
        return false;
    }
    let path = path_of(url);
    let api = path.contains("/api/") || path.contains("/v1/");
    let generation = ["generate", "chat", "completion"]
        .iter()
        .any(|shape| path.contains(shape));
    api && generation && !path.contains("settings")
}

fn message_has_marker(message: &Value) -> bool {
    match message.get("content") {
        Some(Value::String(text)) => text.contains(STATS_MARKER),
        Some(Value::Array(parts)) => parts.iter().any(|part| {
            part.get("text")
                .and_then(Value::as_str)
                .is_some_and(|t| t.contains(STATS_MARKER))
        }),
        _ => false,
    }
}

/// Returns the rewritten body, or `Ok(None)` when the body must be
/// forwarded untouched (marker present, or no messages/prompt field).
pub fn inject_into_body(body: &str, summary: &str, role: InjectRole) -> Result<Option<String>> {
    let mut payload: Value = serde_json::from_str(body)?;
    let block = format!("{}\n{}", STATS_MARKER, summary);

    if let Some(messages) = payload.get_mut("messages").and_then(Value::as_array_mut) {
        if messages.iter().any(message_has_marker) {
            return Ok(None);
        }
        messages.push(json!({ "role": role.as_str(), "content": block }));
    } else if let Some(Value::String(prompt)) = payload.get_mut("prompt") {
        if prompt.contains(STATS_MARKER) {
            return Ok(None);
        }
        prompt.push_str("\n\n");
        prompt.push_str(&block);
    } else {
        return Ok(None);
    }

    Ok(Some(serde_json::to_string(&payload)?))
}

fn try_intercept(request: &OutboundRequest, snapshot: &InjectionSnapshot) -> Result<Option<String>> {
    if !should_intercept(&request.method, &request.url) || !snapshot.prefs.injection_active() {
        return Ok(None);
    }
    let Some(summary) = snapshot.summary.as_deref() else {
        return Ok(None);
    };
    let Some(body) = request.body.as_deref() else {
        return Ok(None);
    };
    if body.trim().is_empty() {
        return Err(StatsError::parse("empty request body"));
    }
    inject_into_body(body, summary, snapshot.prefs.inject_role)
}

/// Applies the stat summary to `request`. Only the body may change; on any
/// failure the original request is returned as-is.
pub fn intercept(request: OutboundRequest, snapshot: &InjectionSnapshot) -> OutboundRequest {
    match try_intercept(&request, snapshot) {
        Ok(Some(body)) => {
            log::info!("Injected stats into {}", request.url);
            OutboundRequest {
                body: Some(body),
                ..request
            }
        }
        Ok(None) => request,
        Err(e) => {
            log::warn!("Stat injection skipped for {}: {}", request.url, e);
            request
        }
    }
}
