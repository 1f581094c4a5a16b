//! Screen-time counter card.
//!
//! ```text
//! ┌ Screen Time ─────────────────────────────┐
//! │                 01:02:03                 │
//! │                                          │
//! │           Started at 09:00:00            │
//! │            No breaks taken yet           │
//! │   Break reminder after 3 hours (teenage) │
//! │ ██████████████░░░░░░░░░░░░░░░░░░░░░  34% │
//! └──────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Local, Utc};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use screentime_core::{describe_duration, SessionView};
use std::time::Duration;

use super::theme;
use crate::app::App;

/// Renders the counter card, or a placeholder when nothing is tracked.
pub fn render_counter(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(" Screen Time ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::state_color(app.state)));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match app.view.as_ref().filter(|v| v.active) {
        Some(view) => render_active(frame, inner, view, app.blink_visible),
        None => {
            let idle = Paragraph::new(vec![
                Line::raw(""),
                Line::styled("Not tracking", Style::default().fg(Color::DarkGray)),
                Line::raw(""),
                Line::raw("Screen time is counted while you are logged in."),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(idle, inner);
        }
    }
}

fn render_active(frame: &mut Frame, area: Rect, view: &SessionView, blink_visible: bool) {
    let [text_area, gauge_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(5), Constraint::Length(1)])
        .areas(area);

    let progress = view.progress();
    let color = theme::progress_color(progress);
    // Over the limit the counter blinks until the break is taken
    let counter_color = if view.is_over_limit() && !blink_visible {
        Color::DarkGray
    } else {
        color
    };

    let last_break = match view.last_break_at {
        Some(at) => format!("Last break at {}", format_clock_time(at)),
        None => "No breaks taken yet".to_string(),
    };
    let threshold = describe_duration(Duration::from_millis(view.threshold_ms));

    let lines = vec![
        Line::from(Span::styled(
            view.elapsed_display.clone(),
            Style::default()
                .fg(counter_color)
                .add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::raw(match view.started_at {
            Some(at) => format!("Started at {}", format_clock_time(at)),
            None => String::new(),
        }),
        Line::raw(last_break),
        Line::styled(
            format!("Break reminder after {threshold} ({})", view.bracket),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center),
        text_area,
    );

    let percent = (progress * 100.0).round() as u16;
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color).bg(Color::Black))
        .ratio(progress)
        .label(format!("{percent}%"));
    frame.render_widget(gauge, gauge_area);
}

/// Formats a timestamp as local wall-clock time, `HH:MM:SS`.
pub fn format_clock_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}
