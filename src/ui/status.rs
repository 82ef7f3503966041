use crate::app::{App, Focus};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};
use std::borrow::Cow;

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if app.is_loading() {
        Cow::Borrowed("Loading...")
    } else {
        match app.focus {
            Focus::Messages if app.account_id().is_some() => {
                Cow::Borrowed("[j/k]scroll [PgUp/PgDn]page [g/G]top/bottom [r]efresh [i]write [q]uit")
            }
            Focus::Messages => {
                Cow::Borrowed("[j/k]scroll [PgUp/PgDn]page [g/G]top/bottom [r]efresh [q]uit")
            }
            Focus::Compose => Cow::Borrowed("Type to write | TAB next field | ENTER post | ESC back"),
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(text).style(style), area);
}
