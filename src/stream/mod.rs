//! Event stream bridge for live task updates.
//!
//! One WebSocket connection per task id, credential passed as a `token`
//! query parameter. Frames are JSON objects discriminated by `type`:
//!
//! | `type` | Event |
//! |--------|-------|
//! | `log` | [`TaskEvent::Log`] |
//! | `progress` | [`TaskEvent::Progress`] |
//! | `complete` | [`TaskEvent::Complete`], then the client closes the connection |
//!
//! Malformed frames surface as [`TaskEvent::Error`] without closing the
//! connection. Consume events from the channel with
//! [`TaskEventStream::next_event`], or hand a [`TaskEventHandler`] to
//! [`TaskEventStream::dispatch`].

mod bridge;
mod frame;

pub use bridge::{TaskEventHandler, TaskEventStream};
pub use frame::{TaskEvent, decode_frame};
