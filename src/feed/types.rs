use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors returned by a [`FeedSource`].
///
/// Covers transport failures, JSON-RPC level errors returned by the node,
/// and rejections of the state-changing append call.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Request exceeded the configured timeout
    #[error("Request timed out")]
    Timeout,
    /// The node answered with a JSON-RPC error
    #[error("RPC error: {0}")]
    Rpc(String),
    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    /// Response body exceeded the size limit
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    /// No signer is configured, so state-changing calls are unavailable
    #[error("Not signed in: configure account_id and signer_url to post messages")]
    NotSignedIn,
    /// The signer refused or failed the transaction
    #[error("Transaction rejected: {0}")]
    Rejected(String),
}

/// Failure of a submission, split by the step that failed.
#[derive(Debug, Error)]
pub enum SubmitError {
    /// The append call itself failed; nothing was posted.
    #[error("Failed to post message: {0}")]
    Append(#[source] SourceError),
    /// The message was posted but reloading the latest page failed.
    #[error("Message posted, but reloading failed: {0}")]
    Refresh(#[source] SourceError),
}

// ============================================================================
// Records
// ============================================================================

/// One entry of the remote guest book.
///
/// `index` is the global position in the append-only sequence (0 = oldest).
/// Text fields use `Arc<str>` so feed snapshots clone cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub index: u64,
    pub sender: Arc<str>,
    pub text: Arc<str>,
    /// Posted with a non-zero attached deposit.
    pub premium: bool,
}

// ============================================================================
// Remote Source
// ============================================================================

/// Read and append access to an append-only message sequence.
///
/// `range` returns records in ascending index order and may return fewer
/// than `limit` records when the window runs past the end of the sequence.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Total number of records currently stored.
    async fn count(&self) -> Result<u64, SourceError>;

    /// Up to `limit` records starting at global index `from`.
    async fn range(&self, from: u64, limit: u64) -> Result<Vec<Message>, SourceError>;

    /// Append a record, attaching `deposit` in the source's native unit.
    async fn append(&self, text: &str, deposit: u128) -> Result<(), SourceError>;
}

#[async_trait]
impl<S: FeedSource + ?Sized> FeedSource for Arc<S> {
    async fn count(&self) -> Result<u64, SourceError> {
        (**self).count().await
    }

    async fn range(&self, from: u64, limit: u64) -> Result<Vec<Message>, SourceError> {
        (**self).range(from, limit).await
    }

    async fn append(&self, text: &str, deposit: u128) -> Result<(), SourceError> {
        (**self).append(text, deposit).await
    }
}

// ============================================================================
// Load Outcomes
// ============================================================================

/// What a scroll-triggered load did.
///
/// Failures are reported here for logging and tests only; they never
/// surface as errors to the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Another load was in flight (or the controller is inactive); trigger dropped.
    Dropped,
    /// Everything up to the oldest record is loaded; no window was fetched.
    CaughtUp,
    /// `added` older records were appended to the tail of the feed.
    Loaded { added: usize },
    /// The fetched window no longer fits the feed (replaced meanwhile,
    /// torn down, or short) and was thrown away.
    Discarded,
    /// A remote call failed; the feed is unchanged.
    Failed,
}
