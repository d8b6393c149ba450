//! One-line progress gauge.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::Widget;

/// A horizontal bar filled up to `ratio`, followed by a percentage.
pub struct ProgressGauge {
    ratio: f64,
    filled_style: Style,
    empty_style: Style,
}

impl ProgressGauge {
    pub fn new(ratio: f64) -> Self {
        Self {
            ratio: ratio.clamp(0.0, 1.0),
            filled_style: Style::default(),
            empty_style: Style::default(),
        }
    }

    pub fn filled_style(mut self, style: Style) -> Self {
        self.filled_style = style;
        self
    }

    pub fn empty_style(mut self, style: Style) -> Self {
        self.empty_style = style;
        self
    }
}

impl Widget for ProgressGauge {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let percent = format!(" {:>3}%", (self.ratio * 100.0).round() as u16);
        let label_width = (percent.len() as u16).min(area.width);
        let bar_width = area.width - label_width;
        let filled_width = (bar_width as f64 * self.ratio).round() as u16;

        for x in 0..bar_width {
            let (ch, style) = if x < filled_width {
                ('█', self.filled_style)
            } else {
                ('░', self.empty_style)
            };
            buf[(area.x + x, area.y)].set_char(ch).set_style(style);
        }

        buf.set_stringn(
            area.x + bar_width,
            area.y,
            &percent,
            label_width as usize,
            Style::default(),
        );
    }
}
