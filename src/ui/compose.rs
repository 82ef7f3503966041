use crate::app::{App, ComposeField, Focus};
use guestbook::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by the compose panel, borders included.
pub const COMPOSE_HEIGHT: u16 = 4;

fn field_line(label: &'static str, value: &str, active: bool, width: usize) -> Line<'static> {
    let label_style = if active {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor = if active { "_" } else { "" };
    let budget = width.saturating_sub(label.len() + cursor.len());
    // Keep the end of the input visible while typing
    let shown: String = if value.chars().count() > budget {
        let skip = value.chars().count() - budget;
        value.chars().skip(skip).collect()
    } else {
        value.to_string()
    };

    Line::from(vec![
        Span::styled(label, label_style),
        Span::raw(truncate_to_width(&shown, budget).into_owned()),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ])
}

/// Render the "sign the guest book" form.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let compose = &app.compose;
    let focused = app.focus == Focus::Compose && !compose.submitting;
    let width = area.width.saturating_sub(2) as usize;

    let lines = vec![
        field_line(
            "Message: ",
            &compose.text,
            focused && compose.field == ComposeField::Text,
            width,
        ),
        field_line(
            "Donation (NEAR): ",
            &compose.donation,
            focused && compose.field == ComposeField::Donation,
            width,
        ),
    ];

    let account = app.account_id().unwrap_or_default();
    let (title, border_style) = if compose.submitting {
        (
            format!("Posting as {}...", account),
            Style::default().fg(Color::DarkGray),
        )
    } else if app.focus == Focus::Compose {
        (
            format!("Sign the guest book as {}", account),
            Style::default().fg(Color::Cyan),
        )
    } else {
        (
            format!("Sign the guest book as {} [i]", account),
            Style::default(),
        )
    };

    let text_style = if compose.submitting {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let paragraph = Paragraph::new(lines).style(text_style).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );
    f.render_widget(paragraph, area);
}
