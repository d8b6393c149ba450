//! Modal dialog widgets.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap};

use crate::app::ConfirmationRequest;

/// Confirmation dialog for an action held by the dispatcher.
pub struct ConfirmModal<'a> {
    request: &'a ConfirmationRequest,
}

impl<'a> ConfirmModal<'a> {
    /// Dialog for `request`, centered in the area it is rendered into.
    pub fn new(request: &'a ConfirmationRequest) -> Self {
        Self { request }
    }
}

impl Widget for ConfirmModal<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let popup_width = 60.min(area.width.saturating_sub(4));
        let popup_height = 7.min(area.height.saturating_sub(2));
        let popup_x = (area.width.saturating_sub(popup_width)) / 2 + area.x;
        let popup_y = (area.height.saturating_sub(popup_height)) / 2 + area.y;
        let popup_area = Rect::new(popup_x, popup_y, popup_width, popup_height);

        Clear.render(popup_area, buf);

        let block = Block::default()
            .title(format!(" {} ", self.request.title))
            .title_style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));
        let inner = block.inner(popup_area);
        block.render(popup_area, buf);

        let key = Style::default().fg(Color::Black).bg(Color::Yellow);
        let lines = vec![
            Line::styled(
                self.request.content.clone(),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            ),
            Line::raw(""),
            Line::from(vec![
                Span::styled(" y ", key),
                Span::raw(" Confirm  "),
                Span::styled(" n ", key),
                Span::raw(" Cancel"),
            ]),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
