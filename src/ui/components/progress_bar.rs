use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Widget};

use crate::ui::theme::Theme;

/// Countdown bar for the current question. Draws "untimed" when the
/// countdown is unavailable.
pub struct CountdownBar<'a> {
    pub remaining: Option<u32>,
    pub limit: u32,
    pub paused: bool,
    pub theme: &'a Theme,
}

impl<'a> CountdownBar<'a> {
    pub fn new(remaining: Option<u32>, limit: u32, theme: &'a Theme) -> Self {
        Self {
            remaining,
            limit: limit.max(1),
            paused: false,
            theme,
        }
    }

    pub fn paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn ratio(&self) -> f64 {
        match self.remaining {
            Some(r) => (r as f64 / self.limit as f64).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

impl Widget for CountdownBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let colors = &self.theme.colors;

        let block = Block::bordered()
            .title(" Time left ")
            .border_style(Style::default().fg(colors.border()));
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let ratio = self.ratio();
        let filled_width = (ratio * inner.width as f64) as u16;
        let fill = if ratio <= 0.3 {
            colors.bar_low()
        } else {
            colors.bar_filled()
        };

        for x in inner.x..inner.x + inner.width {
            let style = if x < inner.x + filled_width {
                Style::default().fg(colors.bg()).bg(fill)
            } else {
                Style::default().fg(colors.fg()).bg(colors.bar_empty())
            };
            buf[(x, inner.y)].set_style(style);
        }

        let label = match (self.remaining, self.paused) {
            (None, _) => "untimed".to_string(),
            (Some(r), true) => format!("{r} sec (paused)"),
            (Some(r), false) => format!("{r} sec"),
        };
        let label_x = inner.x + (inner.width.saturating_sub(label.len() as u16)) / 2;
        buf.set_string(label_x, inner.y, &label, Style::default().fg(colors.fg()));
    }
}
