//! Utility functions shared by the clients and the terminal UI.
//!
//! - **Endpoint validation**: HTTPS-only RPC and signer URLs (localhost excepted)
//! - **Text processing**: width-aware truncation and sanitizing of remote text

mod text;
mod url_validator;

pub use text::{display_width, sanitize_line, truncate_to_width};
pub use url_validator::{validate_endpoint, UrlValidationError};

/// Maximum accepted length of a message typed into the compose form.
pub const MAX_MESSAGE_LENGTH: usize = 512;
