// Status Bar rendering module
//
// Renders the bottom line with keyboard shortcuts, a transient notice, and
// the age of the newest frame.

use crate::app::AppState;
use crate::theme::{ACCENT_BLUE, SLATE_DIM, WARN_AMBER};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::Duration;

struct Hint {
    priority: u8,
    key: &'static str,
    desc: &'static str,
}

const HINTS: [Hint; 6] = [
    Hint { priority: 1, key: "Q", desc: "Quit" },
    Hint { priority: 1, key: "Space", desc: "Live/Pause" },
    Hint { priority: 1, key: "←→", desc: "Step" },
    Hint { priority: 2, key: "Home/End", desc: "Oldest/Newest" },
    Hint { priority: 2, key: "L", desc: "Go live" },
    Hint { priority: 3, key: "C", desc: "Clear" },
];

/// "3.2s ago" style age
pub fn format_age(age: Duration) -> String {
    let secs = age.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s ago", secs)
    } else {
        format!("{}m ago", age.as_secs() / 60)
    }
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mut right = String::new();
    let dropped = app.session.stats().decode_failures;
    if dropped > 0 {
        right.push_str(&format!("{} dropped  ", dropped));
    }
    if let Some(notice) = app.notice() {
        right.push_str(notice);
        right.push_str("  ");
    }
    if let Some(age) = app.last_frame_age() {
        right.push_str("last frame ");
        right.push_str(&format_age(age));
    }

    let available = (area.width as usize).saturating_sub(right.chars().count() + 2);
    let mut spans = vec![Span::raw(" ")];
    let mut used = 1;

    // Add hints by priority until we run out of space
    for priority in 1..=3 {
        for hint in HINTS.iter().filter(|h| h.priority == priority) {
            let len = hint.key.chars().count() + hint.desc.len() + 4;
            if used + len > available {
                continue;
            }
            spans.push(Span::styled(
                hint.key,
                Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled(
                format!(" {}  ", hint.desc),
                Style::default().fg(SLATE_DIM),
            ));
            used += len;
        }
    }

    let pad = (area.width as usize).saturating_sub(used + right.chars().count() + 1);
    spans.push(Span::raw(" ".repeat(pad)));
    spans.push(Span::styled(right, Style::default().fg(WARN_AMBER)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}
