// Header rendering module
//
// Renders the title line with the mock-mode badge and the connection status.

use crate::app::AppState;
use crate::theme::{status_color, status_icon, ACCENT_BLUE, SLATE_DIM, SLATE_LIGHT, WARN_AMBER};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

pub fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(SLATE_DIM));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(inner);

    let mut title = vec![
        Span::styled(
            " framewatch ",
            Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD),
        ),
        Span::styled("live model input monitoring", Style::default().fg(SLATE_DIM)),
    ];
    if app.session.is_mock() {
        title.push(Span::raw(" "));
        title.push(Span::styled(
            "[MOCK]",
            Style::default().fg(WARN_AMBER).add_modifier(Modifier::BOLD),
        ));
    }
    f.render_widget(Paragraph::new(Line::from(title)), halves[0]);

    let status = app.session.status();
    let source = if app.session.is_mock() {
        "synthetic".to_string()
    } else {
        app.session.config().endpoint.clone()
    };
    let right = Line::from(vec![
        Span::styled(source, Style::default().fg(SLATE_DIM)),
        Span::raw("  "),
        Span::styled(
            format!("{} {} ", status_icon(status), status.label()),
            Style::default()
                .fg(status_color(status))
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(
        Paragraph::new(right)
            .alignment(Alignment::Right)
            .style(Style::default().fg(SLATE_LIGHT)),
        halves[1],
    );
}
