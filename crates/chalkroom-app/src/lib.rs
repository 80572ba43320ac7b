//! Chalkroom Application
//!
//! Headless shell around a chalkroom session: talks to the room service,
//! drives the polling timer and writes SVG snapshots.

mod app;
pub mod cli;

pub use app::{App, AppError};
