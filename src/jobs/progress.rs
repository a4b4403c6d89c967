//! # Progress and result payloads.
//!
//! The progress endpoint answers with
//! `{ "status": "PENDING|FAILED|COMPLETED|NOT_FOUND", "percent": 42, "message": "...", "error": "..." }`.
//! [`JobProgress::from_json`] decodes it leniently: missing or `null` fields take defaults
//! and `percent` is clamped into `0..=100`. An unknown `status` is a decode error.
//!
//! The result endpoint's body is opaque; [`JobResult`] carries it untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PollError;

/// Server-side job status as reported by the progress endpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    /// Still running.
    Pending,
    /// Terminal failure; `message` / `error` describe it.
    Failed,
    /// Terminal success; the result can be fetched.
    Completed,
    /// The server has no in-flight job for the subject.
    NotFound,
}

impl JobStatus {
    /// Returns a short stable label (snake_case) for use in logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Failed => "failed",
            JobStatus::Completed => "completed",
            JobStatus::NotFound => "not_found",
        }
    }

    /// True for everything except [`JobStatus::Pending`].
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

/// One decoded progress report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JobProgress {
    /// Reported status.
    pub status: JobStatus,
    /// Percent complete, `0..=100`.
    pub percent: u8,
    /// Human-readable status message (may be empty).
    pub message: String,
    /// Error detail for `FAILED`, if the server sent one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Deserialize)]
struct WireProgress {
    status: JobStatus,
    #[serde(default)]
    percent: Option<f64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl JobProgress {
    /// Creates a progress report; `percent` is clamped to 100.
    pub fn new(status: JobStatus, percent: u8, message: impl Into<String>) -> Self {
        Self {
            status,
            percent: percent.min(100),
            message: message.into(),
            error: None,
        }
    }

    /// `PENDING` report.
    pub fn pending(percent: u8, message: impl Into<String>) -> Self {
        Self::new(JobStatus::Pending, percent, message)
    }

    /// `FAILED` report carrying `error`.
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::new(JobStatus::Failed, 0, "")
        }
    }

    /// `COMPLETED` report.
    pub fn completed() -> Self {
        Self::new(JobStatus::Completed, 100, "")
    }

    /// `NOT_FOUND` report.
    pub fn not_found() -> Self {
        Self::new(JobStatus::NotFound, 0, "")
    }

    /// Decodes a progress body.
    pub fn from_json(body: &[u8]) -> Result<Self, PollError> {
        let wire: WireProgress =
            serde_json::from_slice(body).map_err(|e| PollError::Decode {
                reason: e.to_string(),
            })?;

        let percent = match wire.percent {
            Some(p) if p.is_finite() => p.round().clamp(0.0, 100.0) as u8,
            _ => 0,
        };
        Ok(Self {
            status: wire.status,
            percent,
            message: wire.message.unwrap_or_default(),
            error: wire.error,
        })
    }

    /// Message handed to `on_error` for a `FAILED` report.
    ///
    /// `error` when present and non-empty, `message` otherwise.
    pub fn failure_message(&self) -> &str {
        match self.error.as_deref() {
            Some(e) if !e.is_empty() => e,
            _ => &self.message,
        }
    }
}

/// Final result payload, forwarded unmodified to `on_complete`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobResult {
    body: Vec<u8>,
}

impl JobResult {
    /// Wraps raw result bytes.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        Self { body: body.into() }
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.body
    }

    /// Takes ownership of the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.body
    }

    /// True when the server returned an empty body.
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Decodes the payload as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pending() {
        let p = JobProgress::from_json(br#"{"status":"PENDING","percent":40,"message":"ocr"}"#)
            .unwrap();
        assert_eq!(p, JobProgress::pending(40, "ocr"));
    }

    #[test]
    fn missing_and_null_fields_take_defaults() {
        let p = JobProgress::from_json(br#"{"status":"COMPLETED","message":null}"#).unwrap();
        assert_eq!(p.status, JobStatus::Completed);
        assert_eq!(p.percent, 0);
        assert_eq!(p.message, "");
        assert_eq!(p.error, None);
    }

    #[test]
    fn percent_is_clamped() {
        let high = JobProgress::from_json(br#"{"status":"PENDING","percent":250}"#).unwrap();
        let low = JobProgress::from_json(br#"{"status":"PENDING","percent":-3}"#).unwrap();
        let frac = JobProgress::from_json(br#"{"status":"PENDING","percent":49.6}"#).unwrap();
        assert_eq!((high.percent, low.percent, frac.percent), (100, 0, 50));
    }

    #[test]
    fn not_found_status_decodes() {
        let p = JobProgress::from_json(br#"{"status":"NOT_FOUND"}"#).unwrap();
        assert_eq!(p.status, JobStatus::NotFound);
        assert!(p.status.is_terminal());
    }

    #[test]
    fn unknown_status_is_decode_error() {
        let err = JobProgress::from_json(br#"{"status":"RUNNING"}"#).unwrap_err();
        assert_eq!(err.as_label(), "poll_decode");
        assert!(JobProgress::from_json(b"<html>").is_err());
    }

    #[test]
    fn failure_message_prefers_error() {
        let p = JobProgress::from_json(
            br#"{"status":"FAILED","message":"conversion failed","error":"disk full"}"#,
        )
        .unwrap();
        assert_eq!(p.failure_message(), "disk full");

        let p = JobProgress::from_json(br#"{"status":"FAILED","message":"disk full","error":""}"#)
            .unwrap();
        assert_eq!(p.failure_message(), "disk full");
    }

    #[test]
    fn result_json_helper() {
        let r = JobResult::new(br#"{"pages":3}"#.to_vec());
        let v: serde_json::Value = r.json().unwrap();
        assert_eq!(v["pages"], 3);
        assert!(!r.is_empty());
    }
}
