use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::Method;

use crate::engine::injection::{intercept, InjectionSnapshot, OutboundRequest};

#[derive(Debug, Clone, PartialEq)]
pub struct InboundResponse {
    pub status: u16,
    pub body: String,
}

/// The request-sending primitive the stats layer wraps.
pub trait Transport: Send {
    fn send(&self, request: OutboundRequest) -> Result<InboundResponse>;
}

/// Blocking HTTP transport.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: OutboundRequest) -> Result<InboundResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .with_context(|| format!("invalid method {}", request.method))?;

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let resp = builder
            .send()
            .with_context(|| format!("request to {} failed", request.url))?;
        let status = resp.status().as_u16();
        let body = resp.text().context("failed to read response body")?;

        Ok(InboundResponse { status, body })
    }
}

/// Wraps a transport and merges the stat summary into generation requests.
/// Every request, intercepted or not, goes through the inner transport.
pub struct StatsInterceptor<T> {
    inner: T,
}

impl<T: Transport> StatsInterceptor<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn send(
        &self,
        request: OutboundRequest,
        snapshot: &InjectionSnapshot,
    ) -> Result<InboundResponse> {
        self.inner.send(intercept(request, snapshot))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Records every request and answers with a fixed body.
    #[derive(Clone, Default)]
    pub struct RecordingTransport {
        pub sent: Arc<Mutex<Vec<OutboundRequest>>>,
        pub reply: String,
    }

    impl RecordingTransport {
        pub fn replying(reply: &str) -> Self {
            Self {
                sent: Arc::default(),
                reply: reply.to_string(),
            }
        }

        pub fn requests(&self) -> Vec<OutboundRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for RecordingTransport {
        fn send(&self, request: OutboundRequest) -> Result<InboundResponse> {
            self.sent.lock().unwrap().push(request);
            Ok(InboundResponse {
                status: 200,
                body: self.reply.clone(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::RecordingTransport;
    use super::*;
    use crate::model::preferences::Preferences;

    #[test]
    fn every_request_reaches_inner_transport() {
        let interceptor = StatsInterceptor::new(RecordingTransport::replying("{}"));
        let snapshot = InjectionSnapshot {
            prefs: Preferences::default(),
            summary: Some("[Character Stats: Luck: 3.00]".into()),
        };

        interceptor
            .send(OutboundRequest::get("http://localhost:1234/v1/models"), &snapshot)
            .unwrap();
        interceptor
            .send(
                OutboundRequest::post_json("http://localhost:1234/v1/chat/completions", r#"{"messages":[]}"#),
                &snapshot,
            )
            .unwrap();

        let sent = interceptor.inner().requests();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].body, None);
        assert!(sent[1].body.as_deref().unwrap().contains("<!--STATS-->"));
    }
}
