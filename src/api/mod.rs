//! REST client for the PMS backend with sample-data fallback.
//!
//! Every call first tries the backend. Any failure (unreachable host,
//! timeout, non-2xx status, undecodable body) switches the client into mock
//! mode for the rest of its life and the call returns the fallback value.
//! Callers learn which one they got from [`Fetched::source`].

mod client;
pub mod mock;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use client::{ApiClient, ApiRequest};

/// Where a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Live,
    Mock,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::Live => "live",
            DataSource::Mock => "mock",
        }
    }

    pub fn is_mock(self) -> bool {
        self == DataSource::Mock
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response value tagged with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Fetched<T> {
    pub value: T,
    pub source: DataSource,
}

impl<T> Fetched<T> {
    pub fn live(value: T) -> Self {
        Self {
            value,
            source: DataSource::Live,
        }
    }

    pub fn mock(value: T) -> Self {
        Self {
            value,
            source: DataSource::Mock,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetched<U> {
        Fetched {
            value: f(self.value),
            source: self.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: String,
    pub content: String,
}

/// Body of `POST /chat/message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub message: String,
    pub context: Vec<ContextMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[serde(default)]
    pub session_id: String,
    pub reply: String,
}

/// Body of `PUT /tasks/{id}/move` and its echo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskMove {
    #[serde(default)]
    pub task_id: u64,
    pub to_column: String,
}

/// Acknowledgement returned by delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: String,
}

impl Ack {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health endpoint for a base URL: a trailing `/api` becomes `/health`.
pub fn health_url(base_url: &str) -> String {
    let base = base_url.trim_end_matches('/');
    match base.strip_suffix("/api") {
        Some(root) => format!("{root}/health"),
        None => format!("{base}/health"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_url_replaces_api_suffix() {
        assert_eq!(
            health_url("http://localhost:3001/api"),
            "http://localhost:3001/health"
        );
        assert_eq!(
            health_url("http://localhost:3001/api/"),
            "http://localhost:3001/health"
        );
        assert_eq!(
            health_url("https://pms.example.com"),
            "https://pms.example.com/health"
        );
    }

    #[test]
    fn chat_request_omits_missing_session() {
        let request = ChatRequest {
            session_id: None,
            message: "hi".to_string(),
            context: vec![ContextMessage {
                role: "user".to_string(),
                content: "hi".to_string(),
            }],
        };
        let json = serde_json::to_value(&request).expect("json");
        assert!(json.get("sessionId").is_none());
        assert_eq!(json["context"][0]["role"], "user");
    }

    #[test]
    fn fetched_map_keeps_source() {
        let fetched = Fetched::mock(2).map(|n| n * 21);
        assert_eq!(fetched.value, 42);
        assert!(fetched.source.is_mock());
    }
}
