// Timeline rendering module
//
// Renders the playback bar: LIVE/PAUSED badge, position in the history,
// a slider over the buffer capacity, and the buffer fill count.

use crate::app::AppState;
use crate::theme::{ACCENT_BLUE, LIVE_RED, OK_GREEN, SLATE, SLATE_DIM};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

/// Text slider of `width` cells over `capacity` slots
///
/// Filled slots (`len`) are drawn as '━', empty as '─', and the displayed
/// position as '●'.
pub fn slider_bar(width: usize, len: usize, capacity: usize, position: Option<usize>) -> String {
    if width == 0 {
        return String::new();
    }
    let capacity = capacity.max(1);
    let cell_of = |slot: usize| (slot * width / capacity).min(width - 1);
    let filled_cells = (len.min(capacity) * width).div_ceil(capacity);
    let marker = position.map(cell_of);

    (0..width)
        .map(|cell| {
            if Some(cell) == marker {
                '●'
            } else if cell < filled_cells {
                '━'
            } else {
                '─'
            }
        })
        .collect()
}

pub fn render_timeline(f: &mut Frame, area: Rect, app: &AppState) {
    let session = &app.session;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(SLATE_DIM));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(10), // Mode badge
            Constraint::Length(12), // Position
            Constraint::Min(4),     // Slider
            Constraint::Length(16), // Buffer count
        ])
        .split(inner);

    let badge = if session.is_live() {
        Span::styled(
            " ◉ LIVE ",
            Style::default().fg(LIVE_RED).add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            " ‖ PAUSED",
            Style::default().fg(SLATE).add_modifier(Modifier::BOLD),
        )
    };
    f.render_widget(Paragraph::new(Line::from(badge)), cols[0]);

    let total = session.frame_count();
    let shown = session.display_index().map_or(0, |i| i + 1);
    f.render_widget(
        Paragraph::new(Span::styled(
            format!("{} / {}", shown, total),
            Style::default().fg(SLATE),
        )),
        cols[1],
    );

    let bar = slider_bar(
        cols[2].width.saturating_sub(1) as usize,
        total,
        session.capacity(),
        session.display_index(),
    );
    let bar_color = if session.is_live() { ACCENT_BLUE } else { OK_GREEN };
    f.render_widget(
        Paragraph::new(Span::styled(bar, Style::default().fg(bar_color))),
        cols[2],
    );

    f.render_widget(
        Paragraph::new(Span::styled(
            format!(" Buffer: {}/{}", total, session.capacity()),
            Style::default().fg(SLATE_DIM),
        )),
        cols[3],
    );
}
