//! Header, footer and notice line.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::theme;
use crate::app::{App, AppState};

/// Renders the header: title, user and tracking status.
pub fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let state_color = theme::state_color(app.state);
    let status = match app.state {
        AppState::Starting => "starting".to_string(),
        AppState::Tracking => format!("tracking {}", app.user_id),
        AppState::LoggedOut => "logged out".to_string(),
        AppState::Disconnected => "tracker stopped".to_string(),
    };

    let mut spans = vec![
        Span::styled(
            "screentime",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" - Break reminders | "),
        Span::styled(status, Style::default().fg(state_color)),
    ];
    if let Some(view) = app.view.as_ref().filter(|v| v.active) {
        spans.push(Span::styled(
            format!(" | {} bracket", view.bracket),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(state_color)),
    );
    frame.render_widget(header, area);
}

/// Renders the keybinding hints; they change while the dialog is open.
pub fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let key = theme::key_style();
    let hints = if app.reminder_visible() {
        vec![
            Span::styled(" b", key),
            Span::raw(" take a break  "),
            Span::styled("l/Esc", key),
            Span::raw(" remind me later  "),
            Span::styled("Tab", key),
            Span::raw(" switch  "),
            Span::styled("Enter", key),
            Span::raw(" choose"),
        ]
    } else {
        let mut hints = Vec::new();
        if app.is_tracking() {
            hints.push(Span::styled(" b", key));
            hints.push(Span::raw(" take a break  "));
            hints.push(Span::styled("x", key));
            hints.push(Span::raw(" log out  "));
        }
        hints.push(Span::styled(" q", key));
        hints.push(Span::raw(" quit"));
        hints
    };

    let footer = Paragraph::new(Line::from(hints)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(footer, area);
}

/// Renders the transient notice, if any.
pub fn render_notice(frame: &mut Frame, area: Rect, app: &App) {
    let Some(notice) = &app.notice else {
        return;
    };
    let line = Line::styled(
        notice.text.clone(),
        Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
    );
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
