//! Constants for the transport core (timeouts, attempt budgets, backoff).

use std::time::Duration;

/// Default per-attempt timeout in milliseconds (5 minutes).
pub const DEFAULT_TIMEOUT_MS: u64 = 300_000;

/// Attempt budget for general idempotent calls.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Attempt budget for multipart uploads.
pub const UPLOAD_MAX_ATTEMPTS: u32 = 2;

/// Attempt budget for raw result downloads.
pub const DOWNLOAD_MAX_ATTEMPTS: u32 = 3;

/// Backoff delay before the first retry.
pub const BACKOFF_BASE: Duration = Duration::from_millis(400);

/// Linear increment added per retry on top of the exponential term.
pub const BACKOFF_STEP: Duration = Duration::from_millis(100);

/// Backoff ceiling.
pub const BACKOFF_CAP: Duration = Duration::from_millis(1800);

/// Interval between task status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);
