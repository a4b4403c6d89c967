//! Request transport: one-attempt exchanges and the retry layer over them.
//!
//! ## Contents
//! - [`Exchange`], [`ApiRequest`], [`Method`] the single-attempt seam
//! - [`RetryingTransport`], [`RetryOutcome`] retry with backoff + jitter around any attempt closure
//! - [`Response`], [`Reply`] what the retry loop can classify and release
//! - [`Sleeper`], [`TokioSleeper`] injectable waits
//! - [`HttpExchange`], [`RequestDecorator`], [`StaticHeaders`] the reqwest implementation
//!
//! ## Layering
//! ```text
//! JobClient ──► RetryingTransport::execute(token, || exchange.send(&req))
//!                        │
//!                        └─► Exchange::send  (exactly one round trip)
//!                                 └─► HttpExchange: decorators → reqwest → Reply
//! ```

mod exchange;
mod http;
mod response;
mod retrying;
mod sleeper;

pub use exchange::{ApiRequest, Exchange, Method};
pub use http::{HttpExchange, RequestDecorator, StaticHeaders};
pub use response::{Reply, Response};
pub use retrying::{RetryOutcome, RetryingTransport};
pub use sleeper::{Sleeper, TokioSleeper, wait_or_cancel};
