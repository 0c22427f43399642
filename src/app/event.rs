// Keyboard event handling
//
// This module maps key presses onto the session's playback controls.

use super::AppState;
use crossterm::event::KeyCode;

/// Handle keyboard events and update application state
///
/// Returns `true` if the application should continue running,
/// `false` if it should exit.
///
/// # Key Bindings
/// - `q`, `Q`, `Esc` - Quit the application
/// - `Space` - Toggle live / paused
/// - `Left`, `h` - Previous frame (pauses)
/// - `Right`, `l` - Next frame (pauses)
/// - `Home` - Oldest buffered frame
/// - `End` - Newest buffered frame (stays paused)
/// - `L` - Return to live
/// - `c`, `C` - Clear history
pub fn handle_key_event(app: &mut AppState, key: KeyCode) -> bool {
    match key {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
            app.quit();
            false
        }
        KeyCode::Char(' ') => {
            app.session.toggle_live();
            true
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.session.step_back();
            true
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.session.step_forward();
            true
        }
        KeyCode::Home => {
            app.session.jump_to_oldest();
            true
        }
        KeyCode::End => {
            app.session.jump_to_newest();
            true
        }
        KeyCode::Char('L') => {
            app.session.go_live();
            true
        }
        KeyCode::Char('c') | KeyCode::Char('C') => {
            app.clear_history();
            true
        }
        _ => true,
    }
}
