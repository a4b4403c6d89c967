//! # Example: poll a document conversion job
//!
//! Drives one job from start to completion and logs every runtime event.
//!
//! Without arguments the job is served by an in-memory simulation that answers
//! `503` once, reports progress in 25% steps and then completes. With a base URL the
//! real HTTP exchange is used instead:
//!
//! ```text
//! cargo run --example poll_document --features logging
//! cargo run --example poll_document --features logging -- https://api.example.com/v1/ doc-42
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use jobvisor::{
    ApiRequest, Exchange, HttpExchange, JobOrchestrator, JobResult, LogWriter, Method,
    OrchestratorConfig, Reply, RetryConfig, StaticHeaders, Subscribe, TransportError,
};
use tracing_subscriber::EnvFilter;

/// Simulated job server: one transient failure, then progress in four steps.
#[derive(Default)]
struct SimulatedJobs {
    polls: AtomicU32,
}

#[async_trait]
impl Exchange for SimulatedJobs {
    async fn send(&self, request: &ApiRequest) -> Result<Reply, TransportError> {
        let endpoint = request.segments.last().map(String::as_str);
        match (request.method, endpoint) {
            (Method::Post, Some("start")) => Ok(Reply::new(202, "")),
            (Method::Get, Some("progress")) => {
                let n = self.polls.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    return Ok(Reply::new(503, ""));
                }
                let percent = (n * 25).min(100);
                let body = if percent < 100 {
                    format!(r#"{{"status":"PENDING","percent":{percent},"message":"converting page {n}"}}"#)
                } else {
                    r#"{"status":"COMPLETED","percent":100,"message":"done"}"#.to_string()
                };
                Ok(Reply::new(200, body))
            }
            (Method::Get, Some("result")) => Ok(Reply::new(200, r#"{"pages":4,"format":"pdf"}"#)),
            _ => Ok(Reply::new(404, "")),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,jobvisor=debug")),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let exchange: Arc<dyn Exchange> = match args.next() {
        Some(base) => {
            let mut http = HttpExchange::new(&base)?;
            if let Ok(token) = std::env::var("JOBVISOR_TOKEN") {
                http = http.with_decorator(Arc::new(
                    StaticHeaders::new().with("authorization", format!("Bearer {token}")),
                ));
            }
            Arc::new(http)
        }
        None => Arc::new(SimulatedJobs::default()),
    };
    let subject = args.next().unwrap_or_else(|| "doc-42".to_string());

    let cfg = OrchestratorConfig {
        retry: RetryConfig {
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            ..RetryConfig::default()
        },
        poll_interval: Duration::from_millis(300),
        ..OrchestratorConfig::default()
    };
    cfg.validate()?;

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
    let orchestrator = JobOrchestrator::builder(cfg, exchange)
        .with_subscribers(subs)
        .build();

    let handle = orchestrator.start_with(
        subject.as_str(),
        |percent: u8, message: &str| println!("[progress] {percent:>3}% {message}"),
        |result: JobResult| match result.json::<serde_json::Value>() {
            Ok(value) => println!("[complete] {value}"),
            Err(_) => println!("[complete] {} bytes", result.as_bytes().len()),
        },
        |error: &str| eprintln!("[error] {error}"),
    )?;

    tokio::select! {
        state = handle.wait() => println!("session finished: {state:?}"),
        _ = tokio::signal::ctrl_c() => {
            orchestrator.cancel(&handle);
            println!("session finished: {:?}", handle.wait().await);
        }
    }

    // Let subscriber workers flush queued events.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(())
}
