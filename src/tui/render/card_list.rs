use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::App;
use crate::tui::geometry::CellMetrics;
use crate::tui::list_view::{CardView, HEADER_ROWS, ListNode, RowView};
use crate::util::unicode::{display_width, skip_columns, spread, take_columns, truncate_to_width};

/// Grab handle drawn at the start of each card header
const GRIP: &str = "\u{2261}";

/// Paint the retained list: in-flow cards and placeholder, then the drag
/// proxy on top. Reads the view; never changes it.
pub fn render_card_list(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.view;
    for b in view.layout() {
        match &view.nodes()[b.index] {
            ListNode::Card(card) => paint_card(frame, app, area, card, b.rect.y, false),
            ListNode::Placeholder { height, .. } => {
                paint_placeholder(frame, app, area, b.rect.y, *height)
            }
        }
    }
    if let Some(proxy) = view.proxy() {
        paint_card(frame, app, area, &proxy.card, proxy.rect().y, true);
    }
}

/// Draw `line` on the terminal row holding `y_px`, if that row is visible
fn line_at(frame: &mut Frame, area: Rect, m: CellMetrics, y_px: f32, line: Line) {
    let row = m.row_of(y_px);
    if row < 0 || row >= i32::from(area.height) {
        return;
    }
    let rect = Rect::new(area.x, area.y + row as u16, area.width, 1);
    frame.render_widget(Paragraph::new(line), rect);
}

fn pad_right(s: String, width: usize) -> String {
    let w = display_width(&s);
    if w >= width {
        return s;
    }
    format!("{}{}", s, " ".repeat(width - w))
}

fn pad_left(s: String, width: usize) -> String {
    let w = display_width(&s);
    if w >= width {
        return s;
    }
    format!("{}{}", " ".repeat(width - w), s)
}

fn paint_card(frame: &mut Frame, app: &App, area: Rect, card: &CardView, top: f32, lifted: bool) {
    let m = app.view.metrics();
    let width = area.width as usize;
    let theme = &app.theme;

    let header_bg = if lifted { theme.proxy_bg } else { theme.header_bg };
    let title = truncate_to_width(&card.title, width.saturating_sub(4));
    let header = pad_right(format!(" {} {}", GRIP, title), width);
    line_at(
        frame,
        area,
        m,
        top,
        Line::from(Span::styled(
            header,
            Style::default()
                .fg(theme.text_bright)
                .bg(header_bg)
                .add_modifier(Modifier::BOLD),
        )),
    );

    let mut y = top + m.rows_px(HEADER_ROWS);
    for row in &card.rows {
        line_at(frame, area, m, y, row_line(app, row, width, lifted));
        y += row.pinned_height.unwrap_or(m.cell_h);
    }
}

/// A subtask row. A swiped row shows its foreground shifted by the row's
/// offset, with the action it would commit revealed in the gap.
fn row_line(app: &App, row: &RowView, width: usize, lifted: bool) -> Line<'static> {
    let theme = &app.theme;
    let running = app.state.is_running(row.key);
    let bg = if lifted { theme.proxy_bg } else { theme.card_bg };
    let fg = if running { theme.highlight } else { theme.text };
    let fg_style = Style::default().fg(fg).bg(bg);
    let content = spread(
        &format!("   {}", row.title),
        &format!("{} ", row.time_text),
        width,
    );

    let shift = app.view.metrics().cols(row.offset_x);
    let n = (shift.unsigned_abs() as usize).min(width);
    if shift > 0 {
        let label = if running { " Stop" } else { " Start" };
        let reveal = pad_right(truncate_to_width(label, n), n);
        Line::from(vec![
            Span::styled(
                reveal,
                Style::default()
                    .fg(theme.background)
                    .bg(theme.toggle_bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(take_columns(&content, width - n), fg_style),
        ])
    } else if shift < 0 {
        let reveal = pad_left(truncate_to_width("Delete ", n), n);
        Line::from(vec![
            Span::styled(skip_columns(&content, n), fg_style),
            Span::styled(
                reveal,
                Style::default()
                    .fg(theme.background)
                    .bg(theme.delete_bg)
                    .add_modifier(Modifier::BOLD),
            ),
        ])
    } else {
        let style = if running {
            fg_style.add_modifier(Modifier::BOLD)
        } else {
            fg_style
        };
        Line::from(Span::styled(content, style))
    }
}

fn paint_placeholder(frame: &mut Frame, app: &App, area: Rect, top: f32, height: f32) {
    let m = app.view.metrics();
    let rows = (height / m.cell_h).round().max(1.0) as usize;
    let fill = "\u{254C}".repeat(area.width as usize);
    let style = Style::default()
        .fg(app.theme.dim)
        .bg(app.theme.placeholder);
    for i in 0..rows {
        line_at(
            frame,
            area,
            m,
            top + m.rows_px(i),
            Line::from(Span::styled(fill.clone(), style)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::SubtaskKey;
    use crate::tui::geometry::Point;
    use crate::tui::render::test_helpers::*;

    fn paint(app: &App) -> String {
        render_to_string(40, 8, |frame, area| render_card_list(frame, app, area))
    }

    #[test]
    fn cards_show_grip_titles_and_times() {
        let app = two_card_app();
        let out = paint(&app);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], " \u{2261} One");
        assert!(lines[1].starts_with("   a"));
        assert!(lines[1].ends_with("00:00"));
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], " \u{2261} Two");
    }

    #[test]
    fn right_swipe_reveals_start() {
        let mut app = two_card_app();
        let key = SubtaskKey::new(1, 1);
        app.view.set_row_offset(key, 56.0);
        let out = paint(&app);
        let row = out.lines().nth(1).unwrap();
        // 56px is 7 columns
        assert!(row.starts_with(" Start    a"));
    }

    #[test]
    fn left_swipe_reveals_delete() {
        let mut app = two_card_app();
        app.view.set_row_offset(SubtaskKey::new(2, 1), -80.0);
        let out = paint(&app);
        let row = out.lines().nth(4).unwrap();
        // Ten columns shifted out on the left, "Delete" in the gap on the right
        assert!(row.ends_with("00:00    Delete"));
        assert_eq!(display_width(row), 39);
    }

    #[test]
    fn drag_draws_placeholder_and_proxy() {
        let mut app = two_card_app();
        app.drag.pointer_down(
            1,
            Point::new(4.0, 8.0),
            &app.state,
            &mut app.scheduler,
            &mut app.view,
        );
        app.drag.pointer_move(Point::new(4.0, 24.0), &mut app.view);
        let out = paint(&app);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("\u{254C}\u{254C}"));
        // Proxy sits one row down, over the placeholder
        assert_eq!(lines[1], " \u{2261} One");
        assert_eq!(lines[3], " \u{2261} Two");
    }
}
