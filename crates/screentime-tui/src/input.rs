//! Keyboard input handling for the screentime TUI.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use screentime_tracker::TrackerEvent;

use crate::app::{App, DialogButton};

// ============================================================================
// Event Types
// ============================================================================

/// Events that drive the main loop.
#[derive(Debug, Clone)]
pub enum Event {
    /// Keyboard input from the user.
    Key(KeyEvent),

    /// Terminal window resize event.
    Resize(u16, u16),

    /// Something happened in the tracker.
    Tracker(Box<TrackerEvent>),

    /// The tracker's event channel closed.
    TrackerClosed,
}

// ============================================================================
// Action Types
// ============================================================================

/// What the main loop should do in response to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// No action required.
    None,

    /// Leave the app; the session stays saved and resumes next time.
    Quit,

    /// End the session, then leave.
    Logout,

    /// "I'll take a break" (or a manual break with no dialog open).
    TakeBreak,

    /// "Remind me later".
    RemindLater,
}

// ============================================================================
// Input Handler
// ============================================================================

/// Handles a keyboard event and returns the resulting action.
///
/// # Key Bindings
///
/// | Key                 | Dialog open          | Dialog closed      |
/// |---------------------|----------------------|--------------------|
/// | `b`                 | Take a break         | Take a break now   |
/// | `l`, `Esc`          | Remind me later      | `Esc` quits        |
/// | `Enter`             | Activate focused     | -                  |
/// | `Tab`, `Left/Right` | Move focus           | -                  |
/// | `x`                 | Log out and quit     | Log out and quit   |
/// | `q`, `Ctrl+C`       | Quit                 | Quit               |
#[must_use]
pub fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    // Release events (Windows, kitty protocol) are ignored
    if key.kind == KeyEventKind::Release {
        return Action::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Action::Quit;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => {
            app.quit();
            Action::Quit
        }
        KeyCode::Char('x') | KeyCode::Char('X') => {
            app.quit();
            Action::Logout
        }
        _ if app.reminder_visible() => handle_dialog_key(key, app),
        KeyCode::Esc => {
            app.quit();
            Action::Quit
        }
        KeyCode::Char('b') | KeyCode::Char('B') if app.is_tracking() => Action::TakeBreak,
        _ => Action::None,
    }
}

fn handle_dialog_key(key: KeyEvent, app: &mut App) -> Action {
    match key.code {
        KeyCode::Char('b') | KeyCode::Char('B') => Action::TakeBreak,
        KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Esc => Action::RemindLater,
        KeyCode::Enter | KeyCode::Char(' ') => match app.focus {
            DialogButton::TakeBreak => Action::TakeBreak,
            DialogButton::RemindLater => Action::RemindLater,
        },
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Left | KeyCode::Right => {
            app.toggle_focus();
            Action::None
        }
        _ => Action::None,
    }
}

// ============================================================================
// Tests
// ============================================================================
