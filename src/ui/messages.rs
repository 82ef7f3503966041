use crate::app::{App, Focus};
use guestbook::feed::Message;
use guestbook::util::{display_width, sanitize_line, truncate_to_width};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

const PREMIUM_BADGE: &str = "★ ";

/// One row per message: optional badge, sender, text.
fn message_line(message: &Message, width: usize) -> Line<'static> {
    let mut spans = Vec::with_capacity(3);
    let mut remaining = width;

    let sender_style = if message.premium {
        spans.push(Span::styled(PREMIUM_BADGE, Style::default().fg(Color::Yellow)));
        remaining = remaining.saturating_sub(display_width(PREMIUM_BADGE));
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let sender = format!("{}: ", sanitize_line(&message.sender));
    let sender = truncate_to_width(&sender, remaining).into_owned();
    remaining = remaining.saturating_sub(display_width(&sender));
    spans.push(Span::styled(sender, sender_style));

    let text = sanitize_line(&message.text);
    spans.push(Span::raw(truncate_to_width(&text, remaining).into_owned()));

    Line::from(spans)
}

/// Render the message list and record how many rows it can show.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    let inner_rows = area.height.saturating_sub(2) as usize;
    let inner_width = area.width.saturating_sub(2) as usize;
    app.viewport_rows = inner_rows;
    app.scroll = app.scroll.min(app.max_scroll());

    let items: Vec<ListItem> = if app.messages.is_empty() {
        let placeholder = if app.is_loading() {
            "Loading..."
        } else {
            "No messages yet"
        };
        vec![ListItem::new(placeholder)]
    } else {
        app.messages
            .iter()
            .skip(app.scroll)
            .take(inner_rows)
            .map(|m| ListItem::new(message_line(m, inner_width)))
            .collect()
    };

    let border_style = if app.focus == Focus::Messages {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    };

    let title = if app.messages.is_empty() {
        "Messages".to_string()
    } else {
        let last_visible = (app.scroll + inner_rows).min(app.messages.len());
        format!(
            "Messages {}-{} of {} loaded",
            app.scroll + 1,
            last_visible,
            app.messages.len()
        )
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title),
    );

    f.render_widget(list, area);
}
