pub mod card_list;
pub mod confirm_popup;
pub mod menu_overlay;
pub mod status_row;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph};

use super::app::App;

/// Main render function: paints the retained list and overlays. The only
/// state it touches is the list area, so pointer events map to what was
/// drawn.
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: title bar | list | status row
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(area);

    render_title_bar(frame, app, chunks[0]);

    app.set_list_area(chunks[1]);
    card_list::render_card_list(frame, app, chunks[1]);

    status_row::render_status_row(frame, app, chunks[2]);

    if app.show_menu {
        menu_overlay::render_menu_overlay(frame, app, area);
    }

    // Confirmation popup (rendered on top of everything)
    if app.confirm.is_open() {
        confirm_popup::render_confirm_popup(frame, app, area);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let line = Line::from(vec![
        Span::styled(
            " ticklist",
            Style::default()
                .fg(app.theme.highlight)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} tasks", app.state.task_count()),
            Style::default().fg(app.theme.dim).bg(bg),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(bg)), area);
}
