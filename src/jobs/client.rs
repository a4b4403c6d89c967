//! # Job endpoints over the retrying transport.
//!
//! [`JobClient`] knows the three endpoints of the job API and nothing about sessions:
//!
//! | call       | request                          | outcome                                   |
//! |------------|----------------------------------|-------------------------------------------|
//! | `start`    | `POST jobs/{subject}/start`      | raw reply (status only consulted)         |
//! | `progress` | `GET  jobs/{subject}/progress`   | decoded [`JobProgress`] or [`PollError`]  |
//! | `result`   | `GET  jobs/{subject}/result`     | opaque [`JobResult`] or [`PollError`]     |
//!
//! Every call goes through [`RetryingTransport::execute`], so each one individually
//! retries retryable statuses and I/O failures before returning.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::PollError;
use crate::jobs::progress::{JobProgress, JobResult};
use crate::jobs::subject::JobSubject;
use crate::transport::{ApiRequest, Exchange, Reply, RetryOutcome, RetryingTransport};

const JOBS: &str = "jobs";

/// Client for the start/progress/result endpoints.
#[derive(Clone)]
pub struct JobClient {
    exchange: Arc<dyn Exchange>,
    transport: RetryingTransport,
}

impl JobClient {
    /// Creates a client sending through `exchange`, retrying per `transport`.
    pub fn new(exchange: Arc<dyn Exchange>, transport: RetryingTransport) -> Self {
        Self {
            exchange,
            transport,
        }
    }

    /// Returns the retry layer.
    pub fn transport(&self) -> &RetryingTransport {
        &self.transport
    }

    /// Issues the start-job call.
    pub async fn start(
        &self,
        subject: &JobSubject,
        token: &CancellationToken,
    ) -> RetryOutcome<Reply> {
        self.send(ApiRequest::post([JOBS, subject.as_str(), "start"]), token)
            .await
    }

    /// Fetches and decodes the current progress.
    ///
    /// A non-2xx reply or an undecodable body is a [`PollError`], the same as a transport failure.
    pub async fn progress(
        &self,
        subject: &JobSubject,
        token: &CancellationToken,
    ) -> Result<JobProgress, PollError> {
        let reply = self
            .send(ApiRequest::get([JOBS, subject.as_str(), "progress"]), token)
            .await?;
        if !reply.is_success() {
            return Err(PollError::Status {
                status: reply.status,
            });
        }
        JobProgress::from_json(&reply.body)
    }

    /// Fetches the final result payload.
    pub async fn result(
        &self,
        subject: &JobSubject,
        token: &CancellationToken,
    ) -> Result<JobResult, PollError> {
        let reply = self
            .send(ApiRequest::get([JOBS, subject.as_str(), "result"]), token)
            .await?;
        if !reply.is_success() {
            return Err(PollError::Status {
                status: reply.status,
            });
        }
        Ok(JobResult::new(reply.body))
    }

    async fn send(&self, request: ApiRequest, token: &CancellationToken) -> RetryOutcome<Reply> {
        let exchange = &self.exchange;
        let request = &request;
        self.transport
            .execute(token, || exchange.send(request))
            .await
    }
}
