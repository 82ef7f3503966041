//! Background task spawning for the UI.
//!
//! Every remote call runs in a spawned task and reports back through an
//! `AppEvent`, so the event loop never waits on the network.

use crate::app::{App, AppEvent};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Lets a task report its own panic through the event channel instead of
/// silently disappearing, which matters for tasks whose completion event
/// unlocks UI state.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

async fn send_event(tx: &mpsc::Sender<AppEvent>, event: AppEvent, name: &'static str) {
    if let Err(e) = tx.send(event).await {
        tracing::warn!(error = %e, event = name, "Channel send failed (receiver dropped)");
    }
}

/// Reload the most recent page, replacing the feed.
///
/// Refused while a reload or a submission (which reloads when done) is
/// already running.
pub(super) fn spawn_load_latest(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if app.refreshing || app.compose.submitting {
        return;
    }
    app.refreshing = true;
    let controller = Arc::clone(&app.controller);
    let tx = tx.clone();

    tokio::spawn(async move {
        let event = match catch_task_panic(controller.load_latest()).await {
            Ok(result) => AppEvent::LatestLoaded(result.map_err(|e| e.to_string())),
            Err(panic_msg) => {
                tracing::error!(task = "load_latest", error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task: "load_latest",
                    error: panic_msg,
                }
            }
        };
        send_event(&tx, event, "LatestLoaded").await;
    });
}

/// Scroll trigger: fetch one page of older messages if the viewport is
/// near the bottom.
///
/// The controller drops the load itself when one is already in flight; the
/// `is_loading` check here only saves spawning a task that would be dropped.
pub(super) fn maybe_load_next_page(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    if !app.is_near_bottom() || app.controller.is_loading() {
        return;
    }
    let controller = Arc::clone(&app.controller);
    let tx = tx.clone();
    app.needs_redraw = true;

    tokio::spawn(async move {
        let event = match catch_task_panic(controller.load_next_page()).await {
            Ok(outcome) => AppEvent::PageLoaded(outcome),
            Err(panic_msg) => {
                tracing::error!(task = "load_next_page", error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task: "load_next_page",
                    error: panic_msg,
                }
            }
        };
        send_event(&tx, event, "PageLoaded").await;
    });
}

/// Post the compose form and reload the latest page.
///
/// The form stays locked until the task's completion event arrives, which
/// is sent on success, failure and panic alike.
pub(super) fn spawn_submit(app: &mut App, tx: &mpsc::Sender<AppEvent>) {
    let (text, deposit) = match app.compose.begin_submit() {
        Ok(Some(submission)) => submission,
        Ok(None) => return,
        Err(e) => {
            app.set_status(format!("Invalid donation: {}", e));
            return;
        }
    };
    app.set_status("Posting message...");
    let controller = Arc::clone(&app.controller);
    let tx = tx.clone();

    tokio::spawn(async move {
        let event = match catch_task_panic(controller.submit(&text, deposit)).await {
            Ok(result) => AppEvent::Submitted(result),
            Err(panic_msg) => {
                tracing::error!(task = "submit", error = %panic_msg, "Background task panicked");
                AppEvent::TaskPanicked {
                    task: "submit",
                    error: panic_msg,
                }
            }
        };
        send_event(&tx, event, "Submitted").await;
    });
}
