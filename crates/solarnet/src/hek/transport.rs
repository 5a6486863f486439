//! Network access for the HEK client.
//!
//! [`Transport`] is the only seam between the client and the network.
//! [`HttpTransport`] posts form-encoded requests with `reqwest`;
//! [`MemoryTransport`] replays canned responses and records what it was asked,
//! for tests and dry runs.

use crate::attr::Params;
use crate::error::{Result, SolarnetError};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub trait Transport {
    /// Send `params` to `url` and return the raw response body.
    fn fetch_raw(&self, url: &str, params: &Params) -> Result<String>;

    /// Send `params` to `url` and parse the response as JSON.
    fn fetch(&self, url: &str, params: &Params) -> Result<Value> {
        let body = self.fetch_raw(url, params)?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl<T: Transport + ?Sized> Transport for &T {
    fn fetch_raw(&self, url: &str, params: &Params) -> Result<String> {
        (**self).fetch_raw(url, params)
    }
}

/// Blocking HTTP transport.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("solarnet/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn fetch_raw(&self, url: &str, params: &Params) -> Result<String> {
        tracing::debug!(url, params = params.len(), "POST");
        let response = self
            .client
            .post(url)
            .form(params)
            .send()?
            .error_for_status()?;
        Ok(response.text()?)
    }
}

/// A request seen by [`MemoryTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Recorded {
    pub url: String,
    pub params: Params,
}

/// Replays queued responses in order.
#[derive(Debug, Default)]
pub struct MemoryTransport {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<Recorded>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one HEK search page.
    pub fn push_page(&self, rows: Vec<Value>, overmax: bool) -> &Self {
        self.push_raw(json!({ "result": rows, "overmax": overmax }).to_string())
    }

    /// Queue a raw response body.
    pub fn push_raw(&self, body: impl Into<String>) -> &Self {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(body.into());
        self
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<Recorded> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn pending(&self) -> usize {
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .len()
    }
}

impl Transport for MemoryTransport {
    fn fetch_raw(&self, url: &str, params: &Params) -> Result<String> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(Recorded {
                url: url.to_string(),
                params: params.clone(),
            });
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .ok_or_else(|| SolarnetError::Transport(format!("no response queued for {}", url)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_in_order_and_records() {
        let transport = MemoryTransport::new();
        transport.push_raw("{\"a\": 1}").push_raw("[]");
        assert_eq!(transport.pending(), 2);

        let params = Params::from([("page".to_string(), "1".to_string())]);
        assert_eq!(transport.fetch("u", &params).unwrap(), json!({"a": 1}));
        assert_eq!(transport.fetch("u", &params).unwrap(), json!([]));

        assert_eq!(transport.pending(), 0);
        let seen = transport.requests();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].params["page"], "1");
    }

    #[test]
    fn exhausted_queue_is_a_transport_error() {
        let transport = MemoryTransport::new();
        let err = transport.fetch_raw("u", &Params::new()).unwrap_err();
        assert!(matches!(err, SolarnetError::Transport(_)));
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        let transport = MemoryTransport::new();
        transport.push_raw("not json");
        let err = transport.fetch("u", &Params::new()).unwrap_err();
        assert!(matches!(err, SolarnetError::Json(_)));
    }
}
