use guestbook::feed::{FeedController, LoadOutcome, Message, ScrollProximity, SubmitError};
use guestbook::near::{parse_near_amount, AmountError, Guestbook};
use guestbook::util::MAX_MESSAGE_LENGTH;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::time::Instant;

/// How long a status message stays in the status bar.
const STATUS_TTL_SECS: u64 = 4;

pub type Controller = FeedController<Guestbook>;

// ============================================================================
// Focus and Compose Form
// ============================================================================

/// Which panel receives key presses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Messages,
    Compose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeField {
    Text,
    Donation,
}

/// The "sign the guest book" form.
///
/// `submitting` is the form-level guard: while set, input is ignored and a
/// second submit cannot start. It is independent of the feed's load flag.
///
/// The fields are not cleared when a submission starts. They are cleared
/// once the message is known to be on chain (the submission succeeded, or
/// only the reload after it failed); a rejected post keeps the typed text
/// and donation so it can be sent again.
#[derive(Debug)]
pub struct ComposeState {
    pub text: String,
    pub donation: String,
    pub field: ComposeField,
    pub submitting: bool,
}

impl Default for ComposeState {
    fn default() -> Self {
        Self {
            text: String::new(),
            donation: "0".to_string(),
            field: ComposeField::Text,
            submitting: false,
        }
    }
}

impl ComposeState {
    pub fn push_char(&mut self, c: char) {
        if self.submitting {
            return;
        }
        match self.field {
            ComposeField::Text => {
                if self.text.chars().count() < MAX_MESSAGE_LENGTH {
                    self.text.push(c);
                }
            }
            ComposeField::Donation => {
                if c.is_ascii_digit() || c == '.' || c == ',' {
                    self.donation.push(c);
                }
            }
        }
    }

    pub fn pop_char(&mut self) {
        if self.submitting {
            return;
        }
        match self.field {
            ComposeField::Text => self.text.pop(),
            ComposeField::Donation => self.donation.pop(),
        };
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            ComposeField::Text => ComposeField::Donation,
            ComposeField::Donation => ComposeField::Text,
        };
    }

    /// Lock the form and hand out what to submit: the text and the donation
    /// in yoctoNEAR. Returns `Ok(None)` if a submission is already running.
    pub fn begin_submit(&mut self) -> Result<Option<(String, u128)>, AmountError> {
        if self.submitting {
            return Ok(None);
        }
        let deposit = parse_near_amount(&self.donation)?;
        self.submitting = true;
        Ok(Some((self.text.clone(), deposit)))
    }

    /// Unlock the form. Fields are cleared only after a successful post so a
    /// failed one can be retried as typed.
    pub fn finish_submit(&mut self, posted: bool) {
        self.submitting = false;
        if posted {
            self.text.clear();
            self.donation = "0".to_string();
            self.field = ComposeField::Text;
        }
    }
}

// ============================================================================
// Events
// ============================================================================

/// Results of background tasks, delivered to the UI loop.
pub enum AppEvent {
    /// Latest page (initial load or manual refresh) finished.
    LatestLoaded(Result<usize, String>),
    /// A scroll-triggered load finished.
    PageLoaded(LoadOutcome),
    /// A submission finished; always sent so the form unlocks.
    Submitted(Result<usize, SubmitError>),
    /// A background task panicked.
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    pub controller: Arc<Controller>,
    /// Snapshot of the controller's feed as last drawn.
    pub messages: Arc<Vec<Message>>,
    /// Index of the first visible message.
    pub scroll: usize,
    /// Rows available to the message list, updated on every draw.
    pub viewport_rows: usize,
    pub proximity: ScrollProximity,
    pub focus: Focus,
    pub compose: ComposeState,
    /// True while a full-page load (initial or refresh) is running.
    pub refreshing: bool,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(controller: Arc<Controller>, proximity: ScrollProximity) -> Self {
        let messages = controller.messages();
        Self {
            controller,
            messages,
            scroll: 0,
            viewport_rows: 0,
            proximity,
            focus: Focus::Messages,
            compose: ComposeState::default(),
            refreshing: false,
            status_message: None,
            needs_redraw: true,
        }
    }

    /// Signed-in account, if posting is possible.
    pub fn account_id(&self) -> Option<&str> {
        self.controller.source().account_id()
    }

    pub fn contract_id(&self) -> &str {
        self.controller.source().contract_id()
    }

    /// "Loading..." indicator: a scroll load, a full reload or a submission
    /// (which ends in a full reload) is running.
    pub fn is_loading(&self) -> bool {
        self.refreshing || self.compose.submitting || self.controller.is_loading()
    }

    /// Pick up the controller's current feed and keep the scroll in range.
    pub fn sync_feed(&mut self) {
        let messages = self.controller.messages();
        self.show_feed(messages);
    }

    /// Show `messages`, clamping the scroll to the new length.
    pub fn show_feed(&mut self, messages: Arc<Vec<Message>>) {
        self.messages = messages;
        self.scroll = self.scroll.min(self.max_scroll());
        self.needs_redraw = true;
    }

    pub fn max_scroll(&self) -> usize {
        self.messages.len().saturating_sub(self.viewport_rows.max(1))
    }

    /// Move the viewport by `delta` rows, clamped to the content.
    pub fn scroll_by(&mut self, delta: isize) {
        let target = if delta.is_negative() {
            self.scroll.saturating_sub(delta.unsigned_abs())
        } else {
            self.scroll.saturating_add(delta as usize)
        };
        self.scroll = target.min(self.max_scroll());
    }

    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = self.max_scroll();
    }

    pub fn is_near_bottom(&self) -> bool {
        self.proximity
            .is_near_bottom(self.scroll, self.viewport_rows, self.messages.len())
    }

    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear the status message once it has expired.
    /// Returns true if a message was actually cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}
