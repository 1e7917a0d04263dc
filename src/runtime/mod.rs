//! Timer runtime
//!
//! [`countdown`] holds the pure state machine, [`controller`] drives it on a tokio
//! task and carries out its effects, [`progress`] and [`view`] derive what gets
//! displayed.

pub mod controller;
pub mod countdown;
pub mod progress;
pub mod view;

pub use controller::{TimerRuntime, DEFAULT_TICK_PERIOD, FULLSCREEN_DELAY};
pub use countdown::{Completion, Countdown, IntervalAlert, TickOutcome};
pub use view::{CompletionVideo, PresentationSignal, TimerView};
