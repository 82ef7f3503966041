//! Scripted in-memory guest book shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use guestbook::feed::{FeedSource, Message, SourceError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Append-only message store with call counters and failure switches.
///
/// `count` and `range` yield once before answering so concurrent callers
/// interleave at their await points.
#[derive(Default)]
pub struct ScriptedSource {
    records: Mutex<Vec<Message>>,
    ranges: Mutex<Vec<(u64, u64)>>,
    range_gate: Mutex<Option<(u64, Arc<Notify>)>>,
    pub count_calls: AtomicUsize,
    pub range_calls: AtomicUsize,
    pub append_calls: AtomicUsize,
    pub fail_count: AtomicBool,
    pub fail_range: AtomicBool,
    pub fail_append: AtomicBool,
    pub short_ranges: AtomicBool,
}

pub fn message(index: u64, text: &str) -> Message {
    Message {
        index,
        sender: Arc::from(format!("user{}.testnet", index % 7)),
        text: Arc::from(text),
        premium: index % 5 == 0,
    }
}

impl ScriptedSource {
    pub fn with_messages(total: u64) -> Arc<Self> {
        let source = Self::default();
        source.push_many(total);
        Arc::new(source)
    }

    /// Simulate other users appending `n` records.
    pub fn push_many(&self, n: u64) {
        let mut records = self.records.lock().unwrap();
        for _ in 0..n {
            let index = records.len() as u64;
            records.push(message(index, &format!("message {index}")));
        }
    }

    pub fn truncate(&self, len: usize) {
        self.records.lock().unwrap().truncate(len);
    }

    pub fn total(&self) -> u64 {
        self.records.lock().unwrap().len() as u64
    }

    /// `(from, limit)` of every `range` call so far.
    pub fn ranges(&self) -> Vec<(u64, u64)> {
        self.ranges.lock().unwrap().clone()
    }

    pub fn reset_calls(&self) {
        self.count_calls.store(0, Ordering::SeqCst);
        self.range_calls.store(0, Ordering::SeqCst);
        self.append_calls.store(0, Ordering::SeqCst);
        self.ranges.lock().unwrap().clear();
    }

    /// Make the next `range` call starting at `from` wait until the
    /// returned gate is notified.
    pub fn gate_range(&self, from: u64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.range_gate.lock().unwrap() = Some((from, Arc::clone(&gate)));
        gate
    }
}

#[async_trait]
impl FeedSource for ScriptedSource {
    async fn count(&self) -> Result<u64, SourceError> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_count.load(Ordering::SeqCst) {
            return Err(SourceError::Timeout);
        }
        Ok(self.total())
    }

    async fn range(&self, from: u64, limit: u64) -> Result<Vec<Message>, SourceError> {
        self.range_calls.fetch_add(1, Ordering::SeqCst);
        self.ranges.lock().unwrap().push((from, limit));

        let gate = {
            let mut slot = self.range_gate.lock().unwrap();
            match slot.take() {
                Some((gated, gate)) if gated == from => Some(gate),
                other => {
                    *slot = other;
                    None
                }
            }
        };
        match gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }

        if self.fail_range.load(Ordering::SeqCst) {
            return Err(SourceError::HttpStatus(503));
        }
        let records = self.records.lock().unwrap();
        let start = (from as usize).min(records.len());
        let end = (from.saturating_add(limit) as usize).min(records.len());
        let mut window = records[start..end].to_vec();
        if self.short_ranges.load(Ordering::SeqCst) {
            window.pop();
        }
        Ok(window)
    }

    async fn append(&self, text: &str, deposit: u128) -> Result<(), SourceError> {
        self.append_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.fail_append.load(Ordering::SeqCst) {
            return Err(SourceError::Rejected("NotEnoughBalance".to_string()));
        }
        let mut records = self.records.lock().unwrap();
        let index = records.len() as u64;
        records.push(Message {
            index,
            sender: Arc::from("me.testnet"),
            text: Arc::from(text),
            premium: deposit > 0,
        });
        Ok(())
    }
}

/// Global indices of the feed, newest first.
pub fn indices(messages: &[Message]) -> Vec<u64> {
    messages.iter().map(|m| m.index).collect()
}

/// Indices a feed of `len` most recent records out of `total` must hold.
pub fn expected_suffix(total: u64, len: u64) -> Vec<u64> {
    (total - len..total).rev().collect()
}
