//! # One-attempt exchange seam.
//!
//! [`Exchange`] performs **exactly one** request/response round trip and never retries
//! on its own; retrying is layered on top by [`RetryingTransport`](crate::RetryingTransport).
//! The orchestrator receives an `Arc<dyn Exchange>` through its constructor, so the HTTP
//! client (and any auth decoration) is injected rather than looked up globally.

use std::fmt;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::transport::response::Reply;

/// HTTP method of an [`ApiRequest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Method {
    /// `GET`: progress and result fetches.
    Get,
    /// `POST`: starting a job.
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// Transport-agnostic request: a method and raw (unencoded) path segments.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: Method,
    /// Path segments relative to the exchange's base; encoded by the exchange.
    pub segments: Vec<String>,
}

impl ApiRequest {
    /// `GET` request for the given segments.
    pub fn get<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::Get,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// `POST` request (empty body) for the given segments.
    pub fn post<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            method: Method::Post,
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Segments joined with `/` (unencoded), for logs.
    pub fn path(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for ApiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /{}", self.method, self.path())
    }
}

/// Performs one attempt of a request.
///
/// Implementations must map I/O-level failures (connect, timeout, reset, truncated
/// body) to [`TransportError::Io`] so they are retried, and must return error statuses
/// as an `Ok(Reply)` so the transport can classify them.
#[async_trait]
pub trait Exchange: Send + Sync + 'static {
    /// Sends `request` once and buffers the reply.
    async fn send(&self, request: &ApiRequest) -> Result<Reply, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_method_and_path() {
        let req = ApiRequest::post(["jobs", "doc-1", "start"]);
        assert_eq!(req.to_string(), "POST /jobs/doc-1/start");
        assert_eq!(ApiRequest::get(["jobs"]).method, Method::Get);
    }
}
