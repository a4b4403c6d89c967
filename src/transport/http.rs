//! # reqwest-backed [`Exchange`].
//!
//! [`HttpExchange`] resolves an [`ApiRequest`] against a base URL, runs every
//! [`RequestDecorator`] (auth headers, tracing headers) and buffers the reply body.
//!
//! ## Error mapping
//! ```text
//! reqwest builder error          → TransportError::Request  (terminal)
//! connect / timeout / body error → TransportError::Io       (retryable)
//! any HTTP status                → Ok(Reply)                (classified by the transport)
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Url};

use crate::error::TransportError;
use crate::transport::exchange::{ApiRequest, Exchange, Method};
use crate::transport::response::Reply;

/// Hook invoked on every outgoing request before it is sent.
pub trait RequestDecorator: Send + Sync + 'static {
    /// Returns the decorated builder.
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder;
}

impl<F> RequestDecorator for F
where
    F: Fn(RequestBuilder) -> RequestBuilder + Send + Sync + 'static,
{
    fn decorate(&self, request: RequestBuilder) -> RequestBuilder {
        self(request)
    }
}

/// Decorator adding a fixed set of headers.
#[derive(Clone, Debug, Default)]
pub struct StaticHeaders {
    headers: Vec<(String, String)>,
}

impl StaticHeaders {
    /// Empty header set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one header.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

impl RequestDecorator for StaticHeaders {
    fn decorate(&self, mut request: RequestBuilder) -> RequestBuilder {
        for (name, value) in &self.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        request
    }
}

/// HTTP implementation of [`Exchange`].
#[derive(Clone)]
pub struct HttpExchange {
    client: Client,
    base: Url,
    decorators: Vec<Arc<dyn RequestDecorator>>,
}

impl HttpExchange {
    /// Creates an exchange rooted at `base_url` with a default [`Client`].
    pub fn new(base_url: &str) -> Result<Self, TransportError> {
        let base = Url::parse(base_url).map_err(TransportError::request)?;
        if base.cannot_be_a_base() {
            return Err(TransportError::request(format!(
                "{base_url} cannot be used as a base url"
            )));
        }
        Ok(Self {
            client: Client::new(),
            base,
            decorators: Vec::new(),
        })
    }

    /// Replaces the HTTP client (timeouts, proxies, pools).
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Appends a decorator; decorators run in insertion order.
    pub fn with_decorator(mut self, decorator: Arc<dyn RequestDecorator>) -> Self {
        self.decorators.push(decorator);
        self
    }

    /// Base URL every request is resolved against.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Resolves `request` to an absolute URL, percent-encoding each segment.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| TransportError::request("base url cannot be a base"))?;
            segments.pop_if_empty();
            for segment in &request.segments {
                segments.push(segment);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl Exchange for HttpExchange {
    async fn send(&self, request: &ApiRequest) -> Result<Reply, TransportError> {
        let url = self.url_for(request)?;
        let mut builder = match request.method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
        };
        for decorator in &self.decorators {
            builder = decorator.decorate(builder);
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        tracing::trace!(%request, status, bytes = body.len(), "exchange completed");
        Ok(Reply::new(status, body.to_vec()))
    }
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_builder() {
        TransportError::request(err)
    } else {
        TransportError::io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_are_encoded_and_appended() {
        let ex = HttpExchange::new("http://localhost:8080/api/").unwrap();
        let url = ex
            .url_for(&ApiRequest::get(["jobs", "a b/c", "progress"]))
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/jobs/a%20b%2Fc/progress"
        );
    }

    #[test]
    fn base_without_trailing_slash() {
        let ex = HttpExchange::new("http://localhost:8080/api").unwrap();
        let url = ex.url_for(&ApiRequest::post(["jobs", "7", "start"])).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/jobs/7/start");
    }

    #[test]
    fn rejects_non_base_urls() {
        assert!(matches!(
            HttpExchange::new("mailto:ops@example.com"),
            Err(TransportError::Request { .. })
        ));
        assert!(matches!(
            HttpExchange::new("not a url"),
            Err(TransportError::Request { .. })
        ));
    }
}
