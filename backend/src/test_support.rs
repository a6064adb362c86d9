//! Test utilities for the gateway crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

mod clock;
mod dispatcher;

pub use clock::MutableClock;
pub use dispatcher::RecordingDispatcher;
