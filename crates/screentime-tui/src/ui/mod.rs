//! UI rendering module for the screentime TUI.
//!
//! # Layout Structure
//!
//! ```text
//! +--------------------------------------------------+
//! |  Header: title, user, tracking state             |  <- 3 lines
//! +--------------------------------------------------+
//! |  Screen Time                                     |
//! |                 00:42:17                         |  <- fills remaining
//! |  Started at / last break / threshold             |
//! |  [=============            ] 70%                 |
//! +--------------------------------------------------+
//! |  Notice (break taken, session resumed)           |  <- 1 line
//! +--------------------------------------------------+
//! |  Footer: keybinding hints                        |  <- 3 lines
//! +--------------------------------------------------+
//! ```
//!
//! While the break reminder is visible it is drawn as a modal dialog on
//! top of everything else.

pub mod counter;
pub mod layout;
pub mod reminder;
pub mod status_bar;
pub mod theme;

use crate::app::App;
use layout::AppLayout;
use ratatui::Frame;

pub use counter::render_counter;
pub use reminder::render_reminder;
pub use status_bar::{render_footer, render_header, render_notice};

/// Renders the complete TUI interface.
///
/// ```ignore
/// terminal.draw(|frame| {
///     ui::render(frame, &app);
/// })?;
/// ```
pub fn render(frame: &mut Frame, app: &App) {
    let layout = AppLayout::new(frame.area());

    render_header(frame, layout.header, app);
    render_counter(frame, layout.counter, app);
    render_notice(frame, layout.notice, app);
    render_footer(frame, layout.footer, app);

    if let Some(view) = app.view.as_ref().filter(|v| v.reminder_visible) {
        render_reminder(frame, frame.area(), view, app.focus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{DialogButton, BREAK_NOTICE};
    use chrono::{TimeZone, Utc};
    use ratatui::{backend::TestBackend, style::Color, Terminal};
    use screentime_core::{BreakPolicy, SessionClock, SessionView, UserProfile};
    use screentime_tracker::TrackerEvent;

    fn view(elapsed_secs: i64, reminder: bool) -> SessionView {
        let t0 = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let mut clock = SessionClock::new();
        clock.start(t0);
        clock.tick(t0 + chrono::Duration::seconds(elapsed_secs));
        if reminder {
            clock.open_reminder();
        }
        SessionView::project(
            &clock,
            &BreakPolicy::default(),
            Some(&UserProfile::new("pat")),
            t0,
        )
    }

    fn draw(app: &App) -> Terminal<TestBackend> {
        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        terminal
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = usize::from(buffer.area.width);
        buffer
            .content()
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Position of the first cell where `needle` starts.
    fn find_text(terminal: &Terminal<TestBackend>, needle: &str) -> Option<(u16, u16)> {
        let buffer = terminal.backend().buffer();
        let area = buffer.area;
        (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .find(|&(x, y)| {
                needle.chars().enumerate().all(|(i, c)| {
                    u16::try_from(i)
                        .ok()
                        .and_then(|i| buffer.cell((x + i, y)))
                        .is_some_and(|cell| cell.symbol() == c.to_string())
                })
            })
    }

    #[test]
    fn test_render_starting_state() {
        let app = App::new("pat");
        let text = buffer_text(&draw(&app));

        assert!(text.contains("screentime"));
        assert!(text.contains("starting"));
        assert!(text.contains("Not tracking"));
        assert!(!text.contains("Time for a break!"));
    }

    #[test]
    fn test_render_tracking_counter() {
        let mut app = App::new("pat");
        app.set_view(view(3723, false));
        let text = buffer_text(&draw(&app));

        assert!(text.contains("tracking pat"));
        assert!(text.contains("01:02:03"));
        assert!(text.contains("No breaks taken yet"));
        assert!(text.contains("Break reminder after 6 hours (adult)"));
        assert!(text.contains("take a break"));
        assert!(!text.contains("Time for a break!"));
    }

    #[test]
    fn test_render_reminder_dialog() {
        let mut app = App::new("pat");
        app.set_view(view(6 * 3600, true));
        let text = buffer_text(&draw(&app));

        assert!(text.contains("Time for a break!"));
        assert!(text.contains("I'll take a break"));
        assert!(text.contains("Remind me later"));
        assert!(text.contains("remind me later"));
    }

    #[test]
    fn test_reminder_highlights_focused_button() {
        let mut app = App::new("pat");
        app.set_view(view(6 * 3600, true));
        app.focus = DialogButton::RemindLater;
        let terminal = draw(&app);

        let (x, y) = find_text(&terminal, "Remind me later").unwrap();
        let cell = terminal.backend().buffer().cell((x, y)).unwrap();
        assert_eq!(cell.bg, Color::Yellow);
    }

    #[test]
    fn test_render_break_notice() {
        let mut app = App::new("pat");
        app.apply_event(&TrackerEvent::BreakTaken {
            view: Box::new(view(0, false)),
            from_reminder: true,
        });
        let text = buffer_text(&draw(&app));

        assert!(text.contains(BREAK_NOTICE));
        assert!(text.contains("00:00:00"));
    }

    #[test]
    fn test_render_disconnected_state() {
        let mut app = App::new("pat");
        app.mark_disconnected();
        let text = buffer_text(&draw(&app));

        assert!(text.contains("tracker stopped"));
    }

    #[test]
    fn test_render_small_terminal() {
        let mut app = App::new("pat");
        app.set_view(view(6 * 3600, true));

        let mut terminal = Terminal::new(TestBackend::new(20, 5)).unwrap();
        terminal.draw(|frame| render(frame, &app)).unwrap();
    }
}
