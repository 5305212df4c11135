//! Response snapshot returned by the network or replayed from the cache.

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Classification of a response relative to the agent's origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Same-origin response.
    Basic,
    /// Cross-origin response.
    Cors,
    /// Synthesized locally, never touched the network.
    Default,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Basic => "basic",
            ResponseType::Cors => "cors",
            ResponseType::Default => "default",
        }
    }
}

impl fmt::Display for ResponseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "basic" => Ok(ResponseType::Basic),
            "cors" => Ok(ResponseType::Cors),
            "default" => Ok(ResponseType::Default),
            other => Err(Error::Serialization(format!("unknown response type: {other}"))),
        }
    }
}

/// A complete response: status line, headers and fully buffered body.
///
/// Cloning is cheap; the body is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentResponse {
    /// Final URL after redirects. `None` for synthesized responses.
    pub url: Option<String>,
    pub status: u16,
    pub status_text: String,
    /// Header pairs in received order.
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
    pub response_type: ResponseType,
}

impl AgentResponse {
    /// Synthesize the response served when neither network nor cache can answer.
    pub fn offline(message: &str) -> Self {
        Self {
            url: None,
            status: 503,
            status_text: "Service Unavailable".into(),
            headers: vec![("Content-Type".into(), "text/plain".into())],
            body: Bytes::copy_from_slice(message.as_bytes()),
            response_type: ResponseType::Default,
        }
    }

    /// Status in the 200-299 range.
    pub fn is_ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Only complete same-origin responses are written through to the cache.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200 && self.response_type == ResponseType::Basic
    }

    /// First value of a header, matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
