use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::util::time_fmt::format_elapsed;
use crate::util::unicode::{display_width, truncate_to_width};

const HINT: &str = "m menu  d theme  q quit ";

/// Render the status row (bottom of screen): what is being timed or dragged
/// on the left, key hints on the right
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (text, style) = if let Some(task_id) = app.drag.dragged_task() {
        let title = app.state.task(task_id).map_or("", |t| t.title.as_str());
        (
            format!(" Moving \u{201c}{}\u{201d}", title),
            Style::default().fg(app.theme.text_bright).bg(bg),
        )
    } else if let Some(timer) = app.state.active_timer() {
        let task = app.state.task(timer.key.task_id).map_or("", |t| t.title.as_str());
        let (subtask, ms) = app
            .state
            .subtask(timer.key)
            .map_or(("", 0), |st| (st.title.as_str(), st.elapsed_ms));
        (
            format!(" \u{25CF} {} / {}  {}", task, subtask, format_elapsed(ms)),
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        (
            " No timer running".to_string(),
            Style::default().fg(app.theme.dim).bg(bg),
        )
    };

    let hint_w = display_width(HINT);
    let mut spans = Vec::new();
    if width > hint_w + 1 {
        let left = truncate_to_width(&text, width - hint_w - 1);
        let padding = width - display_width(&left) - hint_w;
        spans.push(Span::styled(left, style));
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(HINT, Style::default().fg(app.theme.dim).bg(bg)));
    } else {
        spans.push(Span::styled(truncate_to_width(&text, width), style));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}
