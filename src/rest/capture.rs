//! Diagnostic snapshot of one request/response exchange.
//!
//! A [`CaptureRecord`] is assembled once per call, after the network call has
//! returned or failed. `response` is `None` exactly when the call failed and
//! `window.end` is only set on success.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::{
    client::RestClient,
    request::{RequestBody, RestRequest},
    response::RestResponse,
};

/// Start and end of the network call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExecutionWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl ExecutionWindow {
    pub(crate) fn started() -> Self {
        Self {
            start: Some(Utc::now()),
            end: None,
        }
    }

    pub(crate) fn finish(&mut self) {
        self.end = Some(Utc::now());
    }

    pub fn duration_ms(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end - start).num_milliseconds()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientContext {
    pub base_url: String,
    pub timeout_ms: Option<u64>,
    pub connect_timeout_ms: Option<u64>,
    pub user_agent: Option<String>,
    pub default_headers: Vec<(String, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "encoding", content = "content", rename_all = "lowercase")]
pub enum CapturedBody {
    Text(String),
    Json(Value),
    Hex(String),
}

impl CapturedBody {
    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.is_empty() {
            return None;
        }
        Some(match std::str::from_utf8(bytes) {
            Ok(text) => CapturedBody::Text(text.to_string()),
            Err(_) => CapturedBody::Hex(hex::encode(bytes)),
        })
    }

    fn from_request(body: &RequestBody) -> Option<Self> {
        match body {
            RequestBody::Text(text) => Some(CapturedBody::Text(text.clone())),
            RequestBody::Bytes(bytes) => Self::from_bytes(bytes),
            RequestBody::Json(value) => Some(CapturedBody::Json(value.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedRequest {
    pub method: String,
    pub resource: String,
    /// Absolute URL, when it could be resolved against the base URL.
    pub url: Option<String>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<CapturedBody>,
    pub body_bytes: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapturedResponse {
    pub status: u16,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<CapturedBody>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureRecord {
    client: ClientContext,
    request: CapturedRequest,
    response: Option<CapturedResponse>,
    window: ExecutionWindow,
}

impl CaptureRecord {
    pub(crate) fn new(
        client: &RestClient,
        request: &RestRequest,
        response: Option<&RestResponse>,
        window: ExecutionWindow,
    ) -> Self {
        Self {
            client: client.context(),
            request: CapturedRequest {
                method: request.method().to_string(),
                resource: request.resource().to_string(),
                url: client.request_url(request).ok().map(String::from),
                query: request.query_params().to_vec(),
                headers: request.headers().to_vec(),
                body: request.body().and_then(CapturedBody::from_request),
                body_bytes: request.body().map(RequestBody::len),
            },
            response: response.map(|response| CapturedResponse {
                status: response.status,
                url: response.url.clone(),
                headers: response.headers.clone(),
                body: CapturedBody::from_bytes(&response.body),
            }),
            window,
        }
    }

    pub fn client(&self) -> &ClientContext {
        &self.client
    }

    pub fn request(&self) -> &CapturedRequest {
        &self.request
    }

    pub fn response(&self) -> Option<&CapturedResponse> {
        self.response.as_ref()
    }

    pub fn window(&self) -> &ExecutionWindow {
        &self.window
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
