//! Render dispatch for the TUI.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use super::compose::COMPOSE_HEIGHT;
use super::{compose, messages, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let compose_height = if app.account_id().is_some() {
        COMPOSE_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(compose_height),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(area);

    let header = Line::from(vec![
        Span::styled(
            "NEAR Guest Book",
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}  ", app.contract_id())),
        Span::styled(
            app.account_id().unwrap_or("not signed in").to_string(),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    if compose_height > 0 {
        compose::render(f, app, chunks[1]);
    }
    messages::render(f, app, chunks[2]);
    status::render(f, app, chunks[3]);
}
