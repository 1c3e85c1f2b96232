//! Tracing subscriber setup and timing helpers.

mod subscriber;
mod timer;

pub use subscriber::init_tracing;
pub use timer::SpanTimer;
