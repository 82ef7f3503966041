//! Terminal User Interface module.
//!
//! - `loop_runner` - Main event loop, terminal and mouse capture management
//! - `input` - Keyboard and mouse wheel handling, scroll-triggered loading
//! - `events` - Background task result processing
//! - `helpers` - Spawning of loads and submissions
//! - `render` - Layout and view dispatch
//! - `messages` - Message list widget
//! - `compose` - Compose form widget
//! - `status` - Status bar widget

mod compose;
mod events;
mod helpers;
mod input;
mod loop_runner;
mod messages;
mod render;
mod status;

pub use loop_runner::{run, Action};
