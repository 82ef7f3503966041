//! Terminal guest book for a NEAR contract.
//!
//! The library half holds everything that does not touch the terminal:
//! the feed controller, the contract clients, configuration and text helpers.

pub mod config;
pub mod feed;
pub mod near;
pub mod util;
