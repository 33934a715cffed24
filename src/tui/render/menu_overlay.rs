use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::tui::app::App;

use super::confirm_popup::centered_rect_fixed;

const BINDINGS: &[(&str, &str)] = &[
    ("drag \u{2261} header", "Reorder tasks"),
    ("swipe right", "Start / stop timer"),
    ("swipe left", "Delete subtask"),
    ("wheel", "Scroll"),
    ("Esc", "Cancel gesture"),
    ("d", "Dark / light mode"),
    ("m", "Close this menu"),
    ("q", "Quit"),
];

/// Render the menu overlay (toggled with m)
pub fn render_menu_overlay(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let key_style = Style::default()
        .fg(app.theme.highlight)
        .bg(bg)
        .add_modifier(Modifier::BOLD);
    let desc_style = Style::default().fg(app.theme.text).bg(bg);
    let header_style = Style::default()
        .fg(app.theme.text_bright)
        .bg(bg)
        .add_modifier(Modifier::BOLD);

    let mut lines: Vec<Line> = vec![
        Line::from(Span::styled(" Menu", header_style)),
        Line::from(""),
    ];
    for (keys, desc) in BINDINGS {
        lines.push(Line::from(vec![
            Span::styled(format!(" {:<18}", keys), key_style),
            Span::styled(*desc, desc_style),
        ]));
    }
    lines.push(Line::from(""));
    let mode = if app.state.dark_mode { "dark" } else { "light" };
    lines.push(Line::from(Span::styled(
        format!(" Theme: {}", mode),
        desc_style,
    )));

    let popup_w: u16 = 44.min(area.width.saturating_sub(2));
    let popup_h = ((lines.len() as u16) + 2).min(area.height.saturating_sub(2));
    let overlay_area = centered_rect_fixed(popup_w, popup_h, area);
    frame.render_widget(Clear, overlay_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.popup_border).bg(bg))
        .style(Style::default().bg(bg));

    frame.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().bg(bg)),
        overlay_area,
    );
}
