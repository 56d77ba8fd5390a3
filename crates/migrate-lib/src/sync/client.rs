//! Authenticated management API client
//!
//! Every call carries the bearer token and the management content type,
//! merged with per-call headers, and is admitted through the shared
//! [`Throttle`]. Status codes are not judged here; protocol steps decide
//! what a non-2xx answer means for them.

use super::throttle::Throttle;
use super::transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport};
use crate::config::{Space, SyncConfig};
use crate::error::{Result, SyncError};
use crate::observability::{SyncLogger, SyncMetrics};
use serde_json::Value;
use std::sync::Arc;
use tokio::time::Instant;

/// Media type of every management API request body
pub const MANAGEMENT_MEDIA_TYPE: &str = "application/vnd.contentful.management.v1+json";

/// Optimistic concurrency header echoing `sys.version`
pub const VERSION_HEADER: &str = "X-Contentful-Version";

/// Content type of an entry being created
pub const CONTENT_TYPE_HEADER: &str = "X-Contentful-Content-Type";

/// Per-call method, extra headers and body
#[derive(Debug, Clone, PartialEq)]
pub struct CallOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl CallOptions {
    /// Options for a request with no extra headers or body
    pub fn new(method: Method) -> Self {
        Self {
            method,
            headers: Vec::new(),
            body: None,
        }
    }

    /// GET options
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    /// PUT options
    pub fn put() -> Self {
        Self::new(Method::Put)
    }

    /// POST options
    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    /// Add a header, overriding any default of the same name
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach `X-Contentful-Version`
    pub fn version(self, version: u64) -> Self {
        self.header(VERSION_HEADER, version.to_string())
    }

    /// JSON request body
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Client bound to one space
#[derive(Clone)]
pub struct ManagementClient {
    space: Space,
    transport: Arc<dyn Transport>,
    throttle: Throttle,
    metrics: SyncMetrics,
    logger: SyncLogger,
}

impl ManagementClient {
    /// Client for a space, dispatching through `throttle`
    pub fn new(space: Space, transport: Arc<dyn Transport>, throttle: Throttle) -> Self {
        let logger = SyncLogger::new(space.id());
        Self {
            space,
            transport,
            throttle,
            metrics: SyncMetrics::new(),
            logger,
        }
    }

    /// Client using the `reqwest` transport and the configured rate
    pub fn from_config(config: &SyncConfig) -> Result<Self> {
        let space = config.space()?;
        let transport = ReqwestTransport::new(config.request_timeout)?;
        Ok(Self::new(
            space,
            Arc::new(transport),
            Throttle::per_second(config.requests_per_second),
        ))
    }

    /// Space every URL is rooted at
    pub fn space(&self) -> &Space {
        &self.space
    }

    /// Shared rate limiter
    pub fn throttle(&self) -> &Throttle {
        &self.throttle
    }

    /// Structured logger scoped to the space
    pub fn logger(&self) -> &SyncLogger {
        &self.logger
    }

    /// Process-wide sync metrics
    pub fn metrics(&self) -> &SyncMetrics {
        &self.metrics
    }

    fn default_headers(&self) -> Vec<(String, String)> {
        vec![
            (
                "Authorization".to_string(),
                format!("Bearer {}", self.space.token()),
            ),
            ("Content-Type".to_string(), MANAGEMENT_MEDIA_TYPE.to_string()),
        ]
    }

    /// Issue an authenticated call through the throttle
    pub async fn call(&self, url: &str, options: CallOptions) -> Result<ApiResponse> {
        let request = ApiRequest {
            method: options.method,
            url: url.to_string(),
            headers: merge_headers(self.default_headers(), options.headers),
            body: options.body,
        };

        let queued_at = Instant::now();
        self.throttle
            .run(|| {
                let waited = queued_at.elapsed();
                self.metrics.observe_throttle_wait(waited);
                self.metrics.inc_requests(request.method.as_str());
                self.logger
                    .log_request(request.method.as_str(), &request.url, waited);
                self.transport.send(request)
            })
            .await
    }
}

/// Overlay `overrides` on `defaults`; names compare case-insensitively
pub fn merge_headers(
    defaults: Vec<(String, String)>,
    overrides: Vec<(String, String)>,
) -> Vec<(String, String)> {
    let mut merged = defaults;
    for (name, value) in overrides {
        match merged
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(&name))
        {
            Some(slot) => slot.1 = value,
            None => merged.push((name, value)),
        }
    }
    merged
}

/// `sys.version` of a resource body
pub fn sys_version(body: &Value) -> Option<u64> {
    body.pointer("/sys/version").and_then(Value::as_u64)
}

/// `sys.id` of a resource body
pub fn sys_id(body: &Value) -> Option<&str> {
    body.pointer("/sys/id").and_then(Value::as_str)
}

/// Body of a 2xx response, or a `Remote` error
pub fn expect_success(method: Method, url: &str, response: ApiResponse) -> Result<Value> {
    if response.is_success() {
        return Ok(response.body);
    }
    Err(SyncError::Remote {
        method: method.to_string(),
        url: url.to_string(),
        status: response.status,
        body: match response.body {
            Value::String(text) => text,
            other => other.to_string(),
        },
    })
}

/// Version of a probed resource; a 404 means it does not exist yet
pub fn probe_version(url: &str, response: ApiResponse) -> Result<Option<u64>> {
    if response.status == 404 {
        return Ok(None);
    }
    let body = expect_success(Method::Get, url, response)?;
    Ok(sys_version(&body))
}

/// Version a follow-up write must carry
pub fn require_version(url: &str, body: &Value) -> Result<u64> {
    sys_version(body).ok_or_else(|| SyncError::MalformedResponse {
        url: url.to_string(),
        message: "response has no sys.version".to_string(),
    })
}
