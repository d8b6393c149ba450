//! Process list widget.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Widget};

use orbitfile_core::{Operation, OperationState};

use super::gauge::ProgressGauge;
use crate::app::{LINES_PER_PROCESS, ProcessRegistry};

/// Draws the registry's visible window: a name line and a gauge per entry.
pub struct ProcessBar<'a> {
    registry: &'a ProcessRegistry,
    focused: bool,
}

impl<'a> ProcessBar<'a> {
    pub fn new(registry: &'a ProcessRegistry) -> Self {
        Self {
            registry,
            focused: false,
        }
    }

    /// Highlight the cursor entry.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }
}

fn state_style(state: OperationState) -> (&'static str, Color) {
    match state {
        OperationState::Queued => ("◌", Color::DarkGray),
        OperationState::InProgress => ("●", Color::Cyan),
        OperationState::Successful => ("✓", Color::Green),
        OperationState::Failed => ("✗", Color::Red),
    }
}

fn name_line(op: &Operation, selected: bool) -> Line<'static> {
    let (icon, color) = state_style(op.state);
    let mut label_style = Style::default();
    if op.state == OperationState::Failed {
        label_style = label_style.fg(Color::Red);
    }
    if selected {
        label_style = label_style.add_modifier(Modifier::REVERSED);
    }
    Line::from(vec![
        Span::styled(format!("{icon} "), Style::default().fg(color)),
        Span::styled(op.label(), label_style),
    ])
}

impl Widget for ProcessBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_color = if self.focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .title(" Processes ")
            .title_bottom(Line::from(format!(" {} ", self.registry.cursor_label())).right_aligned())
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }
        if self.registry.is_empty() {
            Line::styled("No operations", Style::default().fg(Color::DarkGray))
                .render(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let cursor = self.registry.cursor();
        for (slot, (index, op)) in self.registry.visible(height).enumerate() {
            let y = inner.y + (slot * LINES_PER_PROCESS) as u16;
            if y >= inner.bottom() {
                break;
            }
            let selected = self.focused && index == cursor;
            name_line(op, selected).render(Rect::new(inner.x, y, inner.width, 1), buf);

            if y + 1 < inner.bottom() {
                let (_, color) = state_style(op.state);
                ProgressGauge::new(op.ratio())
                    .filled_style(Style::default().fg(color))
                    .empty_style(Style::default().fg(Color::DarkGray))
                    .render(Rect::new(inner.x, y + 1, inner.width, 1), buf);
            }
        }
    }
}
