//! Guest book feed: the remote source contract and the loading controller.
//!
//! - [`types`] - `Message`, the `FeedSource` trait and error types
//! - [`controller`] - `FeedController`, newest-first feed with single-flight
//!   scroll loading and full-replace refresh
//! - [`scroll`] - `ScrollProximity`, the "near the bottom" trigger condition
//!
//! # Example
//!
//! ```ignore
//! use guestbook::feed::{FeedController, LoadOutcome};
//!
//! let controller = FeedController::new(source, 50);
//! controller.load_latest().await?;
//!
//! // On every scroll event near the bottom:
//! if let LoadOutcome::Loaded { added } = controller.load_next_page().await {
//!     tracing::debug!(added, "older messages appended");
//! }
//! ```

mod controller;
mod scroll;
mod types;

pub use controller::{FeedController, DEFAULT_PAGE_SIZE};
pub use scroll::{ScrollProximity, DEFAULT_SCROLL_THRESHOLD};
pub use types::{FeedSource, LoadOutcome, Message, SourceError, SubmitError};
