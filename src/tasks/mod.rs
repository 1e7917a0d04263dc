//! Background tasks module
//!
//! This module contains the tasks that run alongside the HTTP server.

pub mod resume;
pub mod tick_driver;

pub use resume::resume_persisted_timer;
pub(crate) use tick_driver::tick_driver_task;
