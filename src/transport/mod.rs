//! Transport core: timeout-bounded HTTP calls with retry and backoff.
//!
//! # Features
//!
//! - Per-attempt timeout (default 5 minutes) covering send and body read
//! - Retry eligibility by method, explicit override, status, and error message
//! - Deterministic backoff: 400ms, 900ms, 1800ms, then capped at 1800ms
//! - Distinct exhaustion error once the attempt budget is spent
//! - Bearer credential on every request when configured

mod client;
pub mod constants;
mod retry;
mod sleep;

pub use client::{RequestOptions, Transport};
pub use retry::{
    FailureType, RetryDecision, RetryPolicy, backoff_delay, classify_failure, is_idempotent,
    is_retryable_status,
};
pub use sleep::{Sleeper, TokioSleeper};
