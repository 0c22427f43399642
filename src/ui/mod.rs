// UI rendering module
//
// This module contains all UI rendering components for framewatch.
// The main draw() function orchestrates rendering of all UI panels.

mod frame_view;
mod header;
mod status_bar;
mod timeline;

use crate::app::AppState;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use frame_view::render_frame_view;
use header::render_header;
use status_bar::render_status_bar;
use timeline::render_timeline;

/// Main UI drawing function
pub fn draw(f: &mut Frame, app: &AppState) {
    let size = f.area();

    // Main layout: header, body, timeline, status bar
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Body
            Constraint::Length(3), // Timeline
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(f, chunks[0], app);
    render_frame_view(f, chunks[1], app);
    render_timeline(f, chunks[2], app);
    render_status_bar(f, chunks[3], app);
}

/// Cut `text` to at most `max_width` terminal columns, marking the cut with '…'
pub(crate) fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut width = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > budget {
            break;
        }
        width += w;
        out.push(c);
    }
    out.push('…');
    out
}
