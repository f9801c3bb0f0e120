//! Murasaki Remote Client Library
//!
//! This library lets a local workflow hand long-running translation jobs to a
//! remote Murasaki server and treat them as local asynchronous tasks.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`transport`] - HTTP calls with timeout enforcement, retry, and backoff
//! - [`api`] - Typed resource operations and the snake_case wire mapping
//! - [`task`] - Create-then-poll orchestration to a terminal status
//! - [`stream`] - WebSocket event stream bridged to a typed channel
//! - [`config`] - Connection profile
//! - [`error`] - Error type shared by all of the above

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod error;
pub mod stream;
pub mod task;
pub mod transport;
mod user_agent;

// Re-export commonly used types
pub use api::{
    ConnectionCheck, GlossaryInfo, HealthStatus, ModelInfo, RemoteClient, RemoteSession,
    ServerStatus, TaskCreated, TaskSnapshot, TaskStatus, TranslationMode, TranslationRequest,
    UploadedFile,
};
pub use config::ConnectionProfile;
pub use error::RemoteError;
pub use stream::{TaskEvent, TaskEventHandler, TaskEventStream};
pub use task::{ProgressCallback, TaskPoller};
pub use transport::{RetryDecision, RetryPolicy, Sleeper, TokioSleeper, backoff_delay};
