//! Break reminder dialog.
//!
//! Drawn over the rest of the UI while the reminder is visible. It stays
//! until the user picks a button; nothing closes it on a timer.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use screentime_core::SessionView;

use super::layout::centered_rect;
use super::theme;
use crate::app::DialogButton;

pub const DIALOG_TITLE: &str = " Time for a break! ";

const DIALOG_WIDTH_PERCENT: u16 = 70;
const DIALOG_HEIGHT: u16 = 14;

/// Renders the modal reminder dialog centred in `area`.
pub fn render_reminder(frame: &mut Frame, area: Rect, view: &SessionView, focus: DialogButton) {
    let popup = centered_rect(DIALOG_WIDTH_PERCENT, DIALOG_HEIGHT, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(DIALOG_TITLE)
        .title_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(Style::default().fg(Color::Yellow));

    let lines = vec![
        Line::raw(view.message.clone()),
        Line::raw(""),
        Line::styled(
            format!("Health tip: {}", view.health_tip),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::ITALIC),
        ),
        Line::raw(""),
        buttons_line(focus),
    ];

    let paragraph = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, popup);
}

fn buttons_line(focus: DialogButton) -> Line<'static> {
    let button = |b: DialogButton| {
        Span::styled(
            format!(" [{}] {} ", b.shortcut(), b.label()),
            theme::button_style(focus == b),
        )
    };
    Line::from(vec![
        button(DialogButton::TakeBreak),
        Span::raw("   "),
        button(DialogButton::RemindLater),
    ])
}
