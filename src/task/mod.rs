//! Task polling orchestrator.
//!
//! The server offers no push notifications over REST, so [`TaskPoller`]
//! drives the task lifecycle from the outside:
//!
//! ```text
//! create ──▶ fetch status ──▶ completed ─▶ Ok(result)
//!               ▲    │
//!               │    ├──────▶ failed ────▶ Err(TaskFailed)
//!      sleep ───┘    └──────▶ cancelled ─▶ Err(TaskCancelled)
//!  (pending/running)
//! ```

mod poller;

pub use poller::{ProgressCallback, TaskPoller};
