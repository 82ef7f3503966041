//! Incremental feed loading.
//!
//! [`FeedController`] owns the newest-first list of loaded messages and the
//! single-flight flag for scroll-triggered loads. All state changes go through
//! [`FeedController::load_latest`], [`FeedController::load_next_page`] and
//! [`FeedController::submit`]; readers only ever see complete snapshots.

use super::types::{FeedSource, LoadOutcome, Message, SourceError, SubmitError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Default number of messages requested per fetch.
pub const DEFAULT_PAGE_SIZE: u64 = 50;

struct FeedState {
    messages: Arc<Vec<Message>>,
    /// Bumped on every full replace so in-flight scroll loads can detect
    /// that the feed they extend is gone.
    generation: u64,
    /// Last ticket handed to a full-page load.
    issued: u64,
    /// Ticket of the full-page load the feed currently holds. A load that
    /// started before it never overwrites it.
    applied: u64,
}

/// Holds the load flag for the duration of one scroll-triggered load.
///
/// Dropping the guard returns the controller to idle, so every exit path
/// (early return, error, cancelled future, panic) releases it.
struct LoadGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Controller for one page session of the guest book feed.
///
/// Share it behind an `Arc`; each operation takes `&self` so triggers from
/// several tasks can race, and the load flag decides which one runs.
pub struct FeedController<S> {
    source: S,
    page_size: u64,
    state: Mutex<FeedState>,
    loading: AtomicBool,
    active: AtomicBool,
}

impl<S: FeedSource> FeedController<S> {
    /// Create an active controller with an empty feed.
    ///
    /// A `page_size` of zero is raised to one.
    pub fn new(source: S, page_size: u64) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            state: Mutex::new(FeedState {
                messages: Arc::new(Vec::new()),
                generation: 0,
                issued: 0,
                applied: 0,
            }),
            loading: AtomicBool::new(false),
            active: AtomicBool::new(true),
        }
    }

    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Current feed, newest first. O(1): returns the shared snapshot.
    pub fn messages(&self) -> Arc<Vec<Message>> {
        Arc::clone(&self.lock_state().messages)
    }

    pub fn len(&self) -> usize {
        self.lock_state().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True while a scroll-triggered load is in flight.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Tear down the session. Loads still in flight finish against the
    /// remote but their results are dropped.
    pub fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
        tracing::debug!("Feed controller deactivated");
    }

    /// Fetch the most recent page and replace the whole feed with it.
    ///
    /// Used for the initial load, manual refresh and after a submission.
    /// Returns the number of messages now in the feed.
    ///
    /// Concurrent calls are ordered by when they started: a page fetched by
    /// an older call is dropped once a newer call has replaced the feed.
    pub async fn load_latest(&self) -> Result<usize, SourceError> {
        let ticket = {
            let mut state = self.lock_state();
            state.issued += 1;
            state.issued
        };

        let total = self.source.count().await?;
        let from = total.saturating_sub(self.page_size);
        let mut window = self.source.range(from, self.page_size).await?;
        window.reverse();

        let mut state = self.lock_state();
        if !self.is_active() {
            tracing::debug!(total, "Discarding latest page after teardown");
            return Ok(state.messages.len());
        }
        if ticket < state.applied {
            tracing::debug!(
                ticket,
                applied = state.applied,
                "Newer latest page already shown, discarding"
            );
            return Ok(state.messages.len());
        }
        let len = window.len();
        state.messages = Arc::new(window);
        state.applied = ticket;
        state.generation = state.generation.wrapping_add(1);
        tracing::info!(total, from, loaded = len, "Loaded latest page");
        Ok(len)
    }

    /// Extend the feed by at most one page of older messages.
    ///
    /// Triggers arriving while another load is in flight are dropped. Remote
    /// failures are logged and swallowed; the feed is left as it was and the
    /// next trigger retries.
    pub async fn load_next_page(&self) -> LoadOutcome {
        if !self.is_active() {
            return LoadOutcome::Dropped;
        }
        // Must be taken before the first await.
        let Some(_guard) = LoadGuard::acquire(&self.loading) else {
            tracing::trace!("Load already in flight, dropping trigger");
            return LoadOutcome::Dropped;
        };

        let (loaded, oldest, generation) = {
            let state = self.lock_state();
            let oldest = state.messages.last().map(|m| m.index);
            (state.messages.len() as u64, oldest, state.generation)
        };

        let total = match self.source.count().await {
            Ok(total) => total,
            Err(e) => {
                tracing::debug!(error = %e, "Count query failed, next scroll will retry");
                return LoadOutcome::Failed;
            }
        };

        // A shrinking count is outside the append-only contract; treat it
        // like being caught up rather than computing a bogus window.
        if total <= loaded {
            if total < loaded {
                tracing::warn!(total, loaded, "Remote count below loaded length");
            }
            return LoadOutcome::CaughtUp;
        }

        // Records strictly older than the oldest loaded one. Without
        // appends by others since the last full load this is total - loaded.
        let older = oldest.map_or(total, |index| index.min(total - loaded));
        if older == 0 {
            return LoadOutcome::CaughtUp;
        }
        let limit = older.min(self.page_size);
        let from = older - limit;

        let mut window = match self.source.range(from, limit).await {
            Ok(window) => window,
            Err(e) => {
                tracing::debug!(error = %e, from, limit, "Range query failed, next scroll will retry");
                return LoadOutcome::Failed;
            }
        };

        if window.len() as u64 != limit {
            tracing::warn!(
                from,
                limit,
                received = window.len(),
                "Short window would leave a gap, discarding"
            );
            return LoadOutcome::Discarded;
        }

        let mut state = self.lock_state();
        if !self.is_active()
            || state.generation != generation
            || state.messages.len() as u64 != loaded
        {
            tracing::debug!(from, limit, "Feed changed during load, discarding window");
            return LoadOutcome::Discarded;
        }

        window.reverse();
        let added = window.len();
        let mut messages = Vec::with_capacity(state.messages.len() + added);
        messages.extend(state.messages.iter().cloned());
        messages.extend(window);
        state.messages = Arc::new(messages);
        tracing::info!(from, limit, total, feed_len = loaded as usize + added, "Loaded older page");
        LoadOutcome::Loaded { added }
    }

    /// Post a message and resynchronize the feed from scratch.
    ///
    /// `deposit` is in the source's native unit. Empty text is passed
    /// through unchecked. On success the feed holds the freshly fetched
    /// latest page.
    pub async fn submit(&self, text: &str, deposit: u128) -> Result<usize, SubmitError> {
        tracing::info!(len = text.len(), deposit = %deposit, "Submitting message");
        self.source
            .append(text, deposit)
            .await
            .map_err(SubmitError::Append)?;
        self.load_latest().await.map_err(SubmitError::Refresh)
    }

    fn lock_state(&self) -> MutexGuard<'_, FeedState> {
        // The lock is never held across an await or a user callback, so a
        // poisoned lock still holds a consistent snapshot.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
