// Theme module - Color palette and status styling
//
// Dark slate background with a blue accent; red is reserved for the LIVE
// indicator and errors, amber for mock mode and transitional states.

use crate::net::ConnectionStatus;
use ratatui::style::Color;

/// Primary accent - borders, titles, focused values
pub const ACCENT_BLUE: Color = Color::Rgb(96, 165, 250);

/// Secondary text and inactive borders
pub const SLATE: Color = Color::Rgb(148, 163, 184);

/// Dim text (labels, hints)
pub const SLATE_DIM: Color = Color::Rgb(100, 116, 139);

/// Main text
pub const SLATE_LIGHT: Color = Color::Rgb(226, 232, 240);

/// Healthy / connected
pub const OK_GREEN: Color = Color::Rgb(74, 222, 128);

/// Mock badge, connecting, warnings
pub const WARN_AMBER: Color = Color::Rgb(251, 191, 36);

/// LIVE indicator and errors
pub const LIVE_RED: Color = Color::Rgb(248, 113, 113);

/// Image entries
pub const IMAGE_PURPLE: Color = Color::Rgb(167, 139, 250);

/// Color used for a connection status badge
pub fn status_color(status: ConnectionStatus) -> Color {
    match status {
        ConnectionStatus::Connected => OK_GREEN,
        ConnectionStatus::Connecting => WARN_AMBER,
        ConnectionStatus::Disconnected => SLATE,
        ConnectionStatus::Error => LIVE_RED,
    }
}

/// Status badge glyph
pub fn status_icon(status: ConnectionStatus) -> &'static str {
    match status {
        ConnectionStatus::Connected => "●",
        ConnectionStatus::Connecting => "◌",
        ConnectionStatus::Disconnected => "○",
        ConnectionStatus::Error => "✖",
    }
}

/// Headline and detail shown when there is no frame to display
pub fn empty_state_text(status: ConnectionStatus, endpoint: &str) -> (&'static str, String) {
    match status {
        ConnectionStatus::Connected => (
            "Waiting for data...",
            "Start training with visualization enabled to see model inputs.".to_string(),
        ),
        ConnectionStatus::Connecting => (
            "Not connected",
            "Connecting to visualization server...".to_string(),
        ),
        ConnectionStatus::Disconnected => (
            "Not connected",
            "Connection lost. Attempting to reconnect...".to_string(),
        ),
        ConnectionStatus::Error => (
            "Not connected",
            format!("Failed to connect. Ensure the server is running on {}", endpoint),
        ),
    }
}
