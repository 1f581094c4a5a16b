//! Shared theme utilities for the screentime TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::app::AppState;

/// Colour of the usage gauge and counter.
///
/// Traffic light against the break threshold:
/// - Green below 75 %
/// - Yellow from 75 % until the threshold
/// - Red once the threshold is reached
pub fn progress_color(progress: f64) -> Color {
    if progress >= 1.0 {
        Color::Red
    } else if progress >= 0.75 {
        Color::Yellow
    } else {
        Color::Green
    }
}

/// Border and status colour for the app state.
pub fn state_color(state: AppState) -> Color {
    match state {
        AppState::Tracking => Color::Green,
        AppState::Starting => Color::DarkGray,
        AppState::LoggedOut => Color::Yellow,
        AppState::Disconnected => Color::Red,
    }
}

/// Style of a dialog button.
pub fn button_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Black)
            .bg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Yellow)
    }
}

pub fn key_style() -> Style {
    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_color() {
        assert_eq!(progress_color(0.0), Color::Green);
        assert_eq!(progress_color(0.74), Color::Green);
        assert_eq!(progress_color(0.75), Color::Yellow);
        assert_eq!(progress_color(0.99), Color::Yellow);
        assert_eq!(progress_color(1.0), Color::Red);
    }

    #[test]
    fn test_state_color() {
        assert_eq!(state_color(AppState::Tracking), Color::Green);
        assert_eq!(state_color(AppState::Disconnected), Color::Red);
    }

    #[test]
    fn test_button_style_focus() {
        assert_eq!(button_style(true).bg, Some(Color::Yellow));
        assert_eq!(button_style(false).bg, None);
    }
}
