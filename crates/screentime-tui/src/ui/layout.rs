//! Layout helpers for the screentime TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main application layout areas.
///
/// ```text
/// header   (3 lines)
/// counter  (fills remaining, at least 9 lines)
/// notice   (1 line)
/// footer   (3 lines)
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AppLayout {
    pub header: Rect,
    pub counter: Rect,
    pub notice: Rect,
    pub footer: Rect,
}

impl AppLayout {
    pub fn new(area: Rect) -> Self {
        let [header, counter, notice, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(1),
                Constraint::Length(3),
            ])
            .areas(area);

        Self {
            header,
            counter,
            notice,
            footer,
        }
    }
}

/// A rectangle centred in `area`, `percent_x` of its width and `height`
/// rows tall, both clamped to fit.
pub fn centered_rect(percent_x: u16, height: u16, area: Rect) -> Rect {
    let width = (u32::from(area.width) * u32::from(percent_x.min(100)) / 100) as u16;
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_layout_creation() {
        let layout = AppLayout::new(Rect::new(0, 0, 80, 24));

        assert_eq!(layout.header.y, 0);
        assert_eq!(layout.header.height, 3);

        assert_eq!(layout.footer.height, 3);
        assert_eq!(layout.footer.y + layout.footer.height, 24);

        assert_eq!(layout.notice.height, 1);
        assert_eq!(layout.notice.y, layout.footer.y - 1);

        assert_eq!(layout.counter.y, 3);
        assert_eq!(layout.counter.height, 24 - 3 - 1 - 3);
    }

    #[test]
    fn test_centered_rect() {
        let popup = centered_rect(50, 10, Rect::new(0, 0, 80, 24));
        assert_eq!(popup, Rect::new(20, 7, 40, 10));
    }

    #[test]
    fn test_centered_rect_clamps_to_area() {
        let area = Rect::new(5, 5, 20, 6);
        let popup = centered_rect(150, 40, area);
        assert_eq!(popup, area);
    }
}
