use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::engine::injection::{InjectionSnapshot, OutboundRequest};
use crate::engine::transport::{StatsInterceptor, Transport};
use crate::model::message::Message;

#[derive(Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
}

#[derive(Serialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<Choice>,
}

#[derive(Deserialize)]
pub struct Choice {
    pub message: ChatMessageResponse,
}

#[derive(Deserialize)]
pub struct ChatMessageResponse {
    pub content: String,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    data: Vec<serde_json::Value>,
}

/// Chat-completion client whose requests pass through the stats interceptor.
pub struct LlmClient<T> {
    interceptor: StatsInterceptor<T>,
    endpoint: String,
    models_endpoint: String,
    model: String,
    temperature: f32,
}

impl<T: Transport> LlmClient<T> {
    pub fn new(transport: T, config: &AppConfig) -> Self {
        Self {
            interceptor: StatsInterceptor::new(transport),
            endpoint: config.endpoint.clone(),
            models_endpoint: config.models_endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        }
    }

    pub fn transport(&self) -> &T {
        self.interceptor.inner()
    }

    /// Sends the transcript and returns the reply text.
    pub fn chat(&self, history: &[Message], snapshot: &InjectionSnapshot) -> Result<String> {
        let req = ChatCompletionRequest {
            model: self.model.clone(),
            temperature: self.temperature,
            messages: history
                .iter()
                .filter_map(|m| {
                    m.chat_role().map(|role| ChatMessage {
                        role: role.into(),
                        content: m.text.clone(),
                    })
                })
                .collect(),
        };
        let body = serde_json::to_string(&req)?;

        let resp = self
            .interceptor
            .send(OutboundRequest::post_json(&self.endpoint, body), snapshot)?;
        if !(200..300).contains(&resp.status) {
            bail!("backend returned HTTP {}: {}", resp.status, resp.body);
        }

        let parsed: ChatCompletionResponse =
            serde_json::from_str(&resp.body).context("malformed chat completion response")?;
        let Some(choice) = parsed.choices.into_iter().next() else {
            bail!("chat completion response had no choices");
        };
        Ok(choice.message.content)
    }

    pub fn test_connection(&self, snapshot: &InjectionSnapshot) -> Result<String> {
        let resp = self
            .interceptor
            .send(OutboundRequest::get(&self.models_endpoint), snapshot)?;
        let models: ModelList =
            serde_json::from_str(&resp.body).context("malformed model list")?;
        Ok(format!("Connected ({} models available)", models.data.len()))
    }
}
