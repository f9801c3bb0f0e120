//! Per-request retry policy with deterministic backoff.
//!
//! This module provides [`RetryPolicy`] and [`FailureType`] for deciding,
//! attempt by attempt, whether a failed call should be repeated.
//!
//! # Overview
//!
//! A failed attempt is classified into a [`FailureType`]:
//! - [`FailureType::RetryableStatus`] - HTTP 408, 429, or 500-504
//! - [`FailureType::Transient`] - error message names a network condition
//! - [`FailureType::Permanent`] - anything else
//!
//! The policy then checks eligibility (which failure kinds this call may
//! retry) before checking the attempt budget, so a call with retry disabled
//! surfaces its original error instead of an exhaustion error.
//!
//! # Example
//!
//! ```
//! use murasaki_remote::transport::{RetryDecision, RetryPolicy, FailureType};
//! use reqwest::Method;
//!
//! let policy = RetryPolicy::for_method(&Method::GET, None);
//! match policy.should_retry(FailureType::RetryableStatus, 1) {
//!     RetryDecision::Retry { delay, attempt } => {
//!         assert_eq!(delay.as_millis(), 400);
//!         assert_eq!(attempt, 2);
//!     }
//!     other => panic!("unexpected decision: {other:?}"),
//! }
//! ```

use std::time::Duration;

use reqwest::Method;
use tracing::debug;

use super::constants::{
    BACKOFF_BASE, BACKOFF_CAP, BACKOFF_STEP, DEFAULT_MAX_ATTEMPTS, DOWNLOAD_MAX_ATTEMPTS,
    UPLOAD_MAX_ATTEMPTS,
};
use crate::error::RemoteError;

/// Classification of a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureType {
    /// The server answered with a status worth repeating (408, 429, 500-504).
    RetryableStatus,

    /// The error message names a transient network condition.
    Transient,

    /// Repeating the call would not help.
    Permanent,
}

/// Decision on whether to repeat a failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Repeat after `delay`.
    Retry {
        /// How long to wait before the next attempt.
        delay: Duration,
        /// The attempt number about to be made (1-indexed).
        attempt: u32,
    },

    /// The failure is not eligible for retry under this policy.
    GiveUp {
        /// Human-readable reason.
        reason: String,
    },

    /// The failure was eligible but the attempt budget is spent.
    Exhausted {
        /// Attempts made.
        attempts: u32,
    },
}

/// Which failure kinds a call may retry, and how many attempts it gets.
///
/// Policies are recomputed for every call; nothing is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    retry_on_status: bool,
    retry_on_error: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_on_status: true,
            retry_on_error: true,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with explicit settings. `max_attempts` is clamped to at least 1.
    #[must_use]
    pub fn new(max_attempts: u32, retry_on_status: bool, retry_on_error: bool) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            retry_on_status,
            retry_on_error,
        }
    }

    /// A single attempt; every failure surfaces as-is.
    #[must_use]
    pub fn none() -> Self {
        Self::new(1, false, false)
    }

    /// Policy for a general JSON call.
    ///
    /// An explicit `override_retry` wins. Otherwise only idempotent methods
    /// (GET, HEAD, OPTIONS, DELETE) are retried.
    #[must_use]
    pub fn for_method(method: &Method, override_retry: Option<bool>) -> Self {
        if override_retry.unwrap_or_else(|| is_idempotent(method)) {
            Self::default()
        } else {
            Self::none()
        }
    }

    /// Policy for multipart uploads: two attempts, error-classification only.
    #[must_use]
    pub fn upload() -> Self {
        Self::new(UPLOAD_MAX_ATTEMPTS, false, true)
    }

    /// Policy for raw downloads: three attempts, status and error based.
    #[must_use]
    pub fn download() -> Self {
        Self::new(DOWNLOAD_MAX_ATTEMPTS, true, true)
    }

    /// Returns the attempt budget.
    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns true if this policy can ever repeat a call.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.max_attempts > 1 && (self.retry_on_status || self.retry_on_error)
    }

    /// Decides what to do after `attempt` (1-indexed) failed with `failure_type`.
    pub fn should_retry(&self, failure_type: FailureType, attempt: u32) -> RetryDecision {
        let eligible = match failure_type {
            FailureType::RetryableStatus => self.retry_on_status,
            FailureType::Transient => self.retry_on_error,
            FailureType::Permanent => false,
        };
        if !eligible {
            return RetryDecision::GiveUp {
                reason: format!("{failure_type:?} failure is not retryable under this policy"),
            };
        }

        if attempt >= self.max_attempts {
            debug!(attempt, max = self.max_attempts, "max attempts reached");
            return RetryDecision::Exhausted { attempts: attempt };
        }

        RetryDecision::Retry {
            delay: backoff_delay(attempt),
            attempt: attempt + 1,
        }
    }
}

/// Backoff before retrying after failed attempt `attempt` (1-indexed).
///
/// `min(1800ms, 400ms * 2^(n-1) + 100ms * (n-1))`, giving 400, 900, 1800,
/// 1800, ... milliseconds.
#[must_use]
pub fn backoff_delay(attempt: u32) -> Duration {
    let n = attempt.max(1) - 1;
    // 2^n overflows long before the cap matters; clamp the exponent.
    let exponential = BACKOFF_BASE.saturating_mul(1u32 << n.min(16));
    let linear = BACKOFF_STEP.saturating_mul(n);
    exponential.saturating_add(linear).min(BACKOFF_CAP)
}

/// Returns true for methods that are safe to repeat by default.
#[must_use]
pub fn is_idempotent(method: &Method) -> bool {
    [Method::GET, Method::HEAD, Method::OPTIONS, Method::DELETE].contains(method)
}

/// Returns true for status codes worth repeating: 408, 429, 500-504.
#[must_use]
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=504)
}

/// Classifies a failed attempt for retry decisions.
///
/// | Error | Type |
/// |-------|------|
/// | HTTP 408, 429, 500-504 | RetryableStatus |
/// | Other HTTP status | Permanent |
/// | Timeout, network failure | Transient |
/// | Stream error whose message has a network marker | Transient |
/// | Anything else | Permanent |
#[must_use]
pub fn classify_failure(error: &RemoteError) -> FailureType {
    match error {
        RemoteError::HttpStatus { status, .. } if is_retryable_status(*status) => {
            FailureType::RetryableStatus
        }
        RemoteError::HttpStatus { .. } => FailureType::Permanent,
        other if other.is_transient() => FailureType::Transient,
        _ => FailureType::Permanent,
    }
}
