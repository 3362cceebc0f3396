//! Recording session controller
//!
//! A `Recorder` task owns the session, the capture stream and the tick
//! timer. Callers drive it through a cloneable `RecorderHandle`:
//! - `start()` acquires capture and begins accumulating fragments
//! - `stop()` flushes the pipe, releases the stream and returns the artifact
//! - `snapshot()` reports state and elapsed time
//! - `subscribe()` streams `RecorderEvent`s (ticks, stops)

mod config;
mod events;
mod recorder;

pub use config::RecorderConfig;
pub use events::{RecorderEvent, StopReason};
pub use recorder::{Recorder, RecorderError, RecorderHandle};
