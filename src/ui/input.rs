//! Input handling for the TUI.
//!
//! Keys and mouse wheel events are dispatched by focus. Every scroll
//! movement re-evaluates the bottom proximity, which is what drives loading
//! of older messages.

use crate::app::{App, AppEvent, Focus};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use tokio::sync::mpsc;

use super::helpers::{maybe_load_next_page, spawn_load_latest, spawn_submit};
use super::Action;

/// Rows moved per mouse wheel notch.
const WHEEL_STEP: isize = 3;

pub(super) fn handle_key(app: &mut App, key: KeyEvent, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match app.focus {
        Focus::Messages => handle_messages_key(app, key, event_tx),
        Focus::Compose => {
            handle_compose_key(app, key, event_tx);
            Action::Continue
        }
    }
}

pub(super) fn handle_mouse(app: &mut App, mouse: MouseEvent, event_tx: &mpsc::Sender<AppEvent>) {
    let delta = match mouse.kind {
        MouseEventKind::ScrollDown => WHEEL_STEP,
        MouseEventKind::ScrollUp => -WHEEL_STEP,
        _ => return,
    };
    scroll(app, delta, event_tx);
}

fn scroll(app: &mut App, delta: isize, event_tx: &mpsc::Sender<AppEvent>) {
    app.scroll_by(delta);
    app.needs_redraw = true;
    maybe_load_next_page(app, event_tx);
}

fn page_rows(app: &App) -> isize {
    app.viewport_rows.max(1) as isize
}

fn handle_messages_key(app: &mut App, key: KeyEvent, event_tx: &mpsc::Sender<AppEvent>) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('j') | KeyCode::Down => scroll(app, 1, event_tx),
        KeyCode::Char('k') | KeyCode::Up => scroll(app, -1, event_tx),
        KeyCode::Char('d') if ctrl => scroll(app, page_rows(app) / 2, event_tx),
        KeyCode::Char('u') if ctrl => scroll(app, -(page_rows(app) / 2), event_tx),
        KeyCode::PageDown | KeyCode::Char(' ') => scroll(app, page_rows(app), event_tx),
        KeyCode::PageUp => scroll(app, -page_rows(app), event_tx),
        KeyCode::Char('g') | KeyCode::Home => {
            app.scroll_to_top();
            scroll(app, 0, event_tx);
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.scroll_to_bottom();
            scroll(app, 0, event_tx);
        }
        KeyCode::Char('r') => {
            spawn_load_latest(app, event_tx);
            app.needs_redraw = true;
        }
        KeyCode::Char('i') | KeyCode::Char('c') | KeyCode::Tab => {
            if app.account_id().is_some() {
                app.focus = Focus::Compose;
            } else {
                app.set_status("Not signed in: set account_id and signer_url in config.toml");
            }
        }
        _ => {}
    }
    Action::Continue
}

fn handle_compose_key(app: &mut App, key: KeyEvent, event_tx: &mpsc::Sender<AppEvent>) {
    match key.code {
        KeyCode::Esc => app.focus = Focus::Messages,
        KeyCode::Tab | KeyCode::BackTab => app.compose.next_field(),
        KeyCode::Enter => spawn_submit(app, event_tx),
        KeyCode::Backspace => app.compose.pop_char(),
        KeyCode::Char(c) => app.compose.push_char(c),
        _ => {}
    }
}
