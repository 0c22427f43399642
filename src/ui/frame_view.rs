// Frame view rendering module
//
// Renders the body: metadata and query image on the left, observation
// images and in-context examples on the right. When no frame is available
// it shows an empty-state message matching the connection status.

use super::truncate_to_width;
use crate::app::AppState;
use crate::frame::{summarize_image, Frame, ImageSet, ImageSummary};
use crate::theme::{
    empty_state_text, ACCENT_BLUE, IMAGE_PURPLE, SLATE, SLATE_DIM, SLATE_LIGHT, WARN_AMBER,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame as TermFrame,
};
use serde_json::Value;

// ============================================================================
// View model
// ============================================================================

/// Everything the body panels show, extracted from a Frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameView {
    pub timestamp: i64,
    pub image_count: usize,
    pub prompt: Option<String>,
    /// Remaining metadata as (key, rendered value)
    pub metadata: Vec<(String, String)>,
    pub query: Option<ImageSummary>,
    pub observations: Vec<(String, ImageSummary)>,
    pub examples: Vec<ExampleView>,
    /// Example count announced by the producer, if any
    pub declared_examples: Option<u64>,
}

/// One in-context example: its prompt (if any) and images
#[derive(Debug, Clone, PartialEq)]
pub struct ExampleView {
    pub prompt: Option<String>,
    pub images: Vec<(String, ImageSummary)>,
}

fn summarize_set(set: &ImageSet) -> Vec<(String, ImageSummary)> {
    set.iter()
        .map(|(name, image)| (name.to_string(), summarize_image(image)))
        .collect()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn build_frame_view(frame: &Frame) -> FrameView {
    let icl_prompts = frame.icl_prompts();
    let icl_sets = frame.icl_images.as_deref().unwrap_or_default();

    // Examples may come with prompts, images, or both
    let example_count = icl_prompts.len().max(icl_sets.len());
    let examples = (0..example_count)
        .map(|i| ExampleView {
            prompt: icl_prompts.get(i).map(|p| p.to_string()),
            images: icl_sets.get(i).map(summarize_set).unwrap_or_default(),
        })
        .collect();

    FrameView {
        timestamp: frame.timestamp,
        image_count: frame.image_count(),
        prompt: frame.prompt().map(str::to_string),
        metadata: frame
            .extra_metadata()
            .map(|(key, value)| (key.clone(), render_value(value)))
            .collect(),
        query: frame.query_image.as_deref().map(summarize_image),
        observations: frame
            .observation_images
            .as_ref()
            .map(summarize_set)
            .unwrap_or_default(),
        examples,
        declared_examples: frame.num_icl_examples(),
    }
}

/// "12.3 KiB" style size
pub fn format_bytes(bytes: usize) -> String {
    const KIB: f64 = 1024.0;
    let b = bytes as f64;
    if b < KIB {
        format!("{} B", bytes)
    } else if b < KIB * KIB {
        format!("{:.1} KiB", b / KIB)
    } else {
        format!("{:.1} MiB", b / (KIB * KIB))
    }
}

// ============================================================================
// Rendering
// ============================================================================

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .title(Span::styled(
            format!(" {} ", title),
            Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(SLATE_DIM))
}

fn image_line(name: &str, summary: &ImageSummary, width: usize) -> Line<'static> {
    let detail = format!("{}  {}", summary.media_type, format_bytes(summary.bytes));
    let name_width = width.saturating_sub(detail.len() + 4).max(1);
    Line::from(vec![
        Span::styled("▣ ", Style::default().fg(IMAGE_PURPLE)),
        Span::styled(
            format!("{:<w$}", truncate_to_width(name, name_width), w = name_width),
            Style::default().fg(SLATE_LIGHT),
        ),
        Span::raw(" "),
        Span::styled(detail, Style::default().fg(SLATE_DIM)),
    ])
}

/// Bordered panel height for `rows` lines of content
fn panel_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

pub fn render_frame_view(f: &mut TermFrame, area: Rect, app: &AppState) {
    let Some(frame) = app.session.current_frame() else {
        render_empty_state(f, area, app);
        return;
    };
    let view = build_frame_view(frame);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(4)])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(panel_height(view.observations.len())),
            Constraint::Min(0),
        ])
        .split(columns[1]);

    render_metadata(f, left[0], &view);
    render_query(f, left[1], &view);
    render_observations(f, right[0], &view);
    render_examples(f, right[1], &view);
}

fn render_empty_state(f: &mut TermFrame, area: Rect, app: &AppState) {
    let status = app.session.status();
    let (headline, detail) = empty_state_text(status, &app.session.config().endpoint);

    let top_pad = area.height.saturating_sub(4) / 2;
    let mut lines: Vec<Line> = (0..top_pad).map(|_| Line::from("")).collect();
    lines.push(Line::from(Span::styled(
        headline,
        Style::default().fg(SLATE_LIGHT).add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(detail, Style::default().fg(SLATE_DIM))));

    f.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(panel("Frame")),
        area,
    );
}

fn render_metadata(f: &mut TermFrame, area: Rect, view: &FrameView) {
    let mut lines = vec![Line::from(vec![
        Span::styled("timestamp ", Style::default().fg(SLATE_DIM)),
        Span::styled(view.timestamp.to_string(), Style::default().fg(SLATE)),
    ])];
    lines.push(Line::from(vec![
        Span::styled("images    ", Style::default().fg(SLATE_DIM)),
        Span::styled(view.image_count.to_string(), Style::default().fg(SLATE)),
    ]));

    if let Some(prompt) = &view.prompt {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Prompt", Style::default().fg(SLATE_DIM))));
        lines.push(Line::from(Span::styled(
            prompt.clone(),
            Style::default().fg(WARN_AMBER).add_modifier(Modifier::BOLD),
        )));
    }

    if !view.metadata.is_empty() {
        lines.push(Line::from(""));
        for (key, value) in &view.metadata {
            lines.push(Line::from(vec![
                Span::styled(format!("{}: ", key), Style::default().fg(SLATE_DIM)),
                Span::styled(value.clone(), Style::default().fg(SLATE_LIGHT)),
            ]));
        }
    }

    f.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(panel("Metadata")),
        area,
    );
}

fn render_query(f: &mut TermFrame, area: Rect, view: &FrameView) {
    let width = area.width.saturating_sub(2) as usize;
    let line = match &view.query {
        Some(summary) => image_line("query", summary, width),
        None => Line::from(Span::styled("none", Style::default().fg(SLATE_DIM))),
    };
    f.render_widget(Paragraph::new(line).block(panel("Query Image")), area);
}

fn render_observations(f: &mut TermFrame, area: Rect, view: &FrameView) {
    let width = area.width.saturating_sub(2) as usize;
    let lines: Vec<Line> = if view.observations.is_empty() {
        vec![Line::from(Span::styled("none", Style::default().fg(SLATE_DIM)))]
    } else {
        view.observations
            .iter()
            .map(|(name, summary)| image_line(name, summary, width))
            .collect()
    };
    let title = format!("Observations ({})", view.observations.len());
    f.render_widget(Paragraph::new(lines).block(panel(&title)), area);
}

fn render_examples(f: &mut TermFrame, area: Rect, view: &FrameView) {
    let width = area.width.saturating_sub(2) as usize;
    let mut lines = Vec::new();
    for (i, example) in view.examples.iter().enumerate() {
        let prompt = example.prompt.as_deref().unwrap_or("(no prompt)");
        lines.push(Line::from(vec![
            Span::styled(
                format!("#{} ", i + 1),
                Style::default().fg(ACCENT_BLUE).add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                truncate_to_width(prompt, width.saturating_sub(4)),
                Style::default().fg(SLATE_LIGHT),
            ),
        ]));
        for (name, summary) in &example.images {
            let mut line = image_line(name, summary, width.saturating_sub(3));
            line.spans.insert(0, Span::raw("   "));
            lines.push(line);
        }
    }
    if lines.is_empty() {
        lines.push(Line::from(Span::styled("none", Style::default().fg(SLATE_DIM))));
    }

    let title = match view.declared_examples {
        Some(declared) if declared != view.examples.len() as u64 => {
            format!("In-Context Examples ({} of {})", view.examples.len(), declared)
        }
        _ => format!("In-Context Examples ({})", view.examples.len()),
    };
    f.render_widget(Paragraph::new(lines).block(panel(&title)), area);
}
