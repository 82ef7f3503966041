//! Application event handling.
//!
//! Applies the results of background loads and submissions to the app state.

use crate::app::{App, AppEvent};
use guestbook::feed::{LoadOutcome, SubmitError};

pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    app.needs_redraw = true;
    match event {
        AppEvent::LatestLoaded(result) => {
            app.refreshing = false;
            match result {
                Ok(count) => {
                    tracing::debug!(count, "Latest page shown");
                    app.sync_feed();
                    app.scroll_to_top();
                }
                Err(e) => app.set_status(format!("Failed to load messages: {}", e)),
            }
        }
        AppEvent::PageLoaded(outcome) => {
            if let LoadOutcome::Loaded { added } = outcome {
                tracing::debug!(added, "Older messages shown");
            }
            app.sync_feed();
        }
        AppEvent::Submitted(result) => match result {
            Ok(_) => {
                app.compose.finish_submit(true);
                app.sync_feed();
                app.scroll_to_top();
                app.set_status("Message posted");
            }
            Err(e) => {
                let posted = matches!(e, SubmitError::Refresh(_));
                tracing::warn!(error = %e, posted, "Submission failed");
                app.compose.finish_submit(posted);
                app.set_status(e.to_string());
            }
        },
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            match task {
                "submit" => app.compose.finish_submit(false),
                "load_latest" => app.refreshing = false,
                _ => {}
            }
            app.sync_feed();
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}
