//! TextBlock Widget
//!
//! A borderless, scrollable region of pre-laid-out styled lines.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::text::Line;
use ratatui::widgets::StatefulWidget;

/// State for a scrollable text block
#[derive(Debug, Default)]
pub struct TextBlockState {
    /// Scroll offset (lines from top)
    pub scroll_offset: usize,
    /// Total content lines
    pub total_lines: usize,
    /// Lines visible at the last render
    pub viewport_height: usize,
}

impl TextBlockState {
    /// Scroll by delta (positive = down)
    pub fn scroll(&mut self, delta: i32) {
        let magnitude = delta.unsigned_abs() as usize;
        self.scroll_offset = if delta < 0 {
            self.scroll_offset.saturating_sub(magnitude)
        } else {
            self.scroll_offset.saturating_add(magnitude).min(self.max_scroll())
        };
    }

    /// Scroll so `line` is the first visible line
    pub fn scroll_to(&mut self, line: usize) {
        self.scroll_offset = line.min(self.max_scroll());
    }

    /// Scroll the least amount that makes `line` visible
    pub fn reveal(&mut self, line: usize) {
        if line < self.scroll_offset {
            self.scroll_offset = line;
        } else if self.viewport_height > 0 && line >= self.scroll_offset + self.viewport_height {
            self.scroll_offset = line + 1 - self.viewport_height;
        }
    }

    /// Scroll to top
    pub fn scroll_to_top(&mut self) {
        self.scroll_offset = 0;
    }

    fn max_scroll(&self) -> usize {
        self.total_lines.saturating_sub(self.viewport_height.max(1))
    }
}

/// A borderless, scrollable block of styled lines
pub struct TextBlock<'a> {
    lines: &'a [Line<'a>],
}

impl<'a> TextBlock<'a> {
    /// Create a block over already styled lines
    #[must_use]
    pub fn new(lines: &'a [Line<'a>]) -> Self {
        Self { lines }
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        state.total_lines = self.lines.len();
        state.viewport_height = area.height as usize;

        // Clamp scroll
        let max_scroll = state.total_lines.saturating_sub(area.height as usize);
        state.scroll_offset = state.scroll_offset.min(max_scroll);

        for (i, line) in self
            .lines
            .iter()
            .skip(state.scroll_offset)
            .take(area.height as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            buf.set_line(area.x, y, line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(total: usize, height: usize) -> TextBlockState {
        TextBlockState {
            scroll_offset: 0,
            total_lines: total,
            viewport_height: height,
        }
    }

    #[test]
    fn test_scroll_is_bounded() {
        let mut s = state(30, 10);
        s.scroll(100);
        assert_eq!(s.scroll_offset, 20);
        s.scroll(-5);
        assert_eq!(s.scroll_offset, 15);
        s.scroll(-100);
        assert_eq!(s.scroll_offset, 0);
    }

    #[test]
    fn test_reveal_moves_minimally() {
        let mut s = state(30, 10);
        s.reveal(5);
        assert_eq!(s.scroll_offset, 0);
        s.reveal(12);
        assert_eq!(s.scroll_offset, 3);
        s.reveal(1);
        assert_eq!(s.scroll_offset, 1);
    }

    #[test]
    fn test_render_clamps_offset() {
        let lines = vec![Line::from("a"), Line::from("b"), Line::from("c")];
        let area = Rect::new(0, 0, 5, 2);
        let mut buf = Buffer::empty(area);
        let mut s = TextBlockState {
            scroll_offset: 9,
            ..TextBlockState::default()
        };
        TextBlock::new(&lines).render(area, &mut buf, &mut s);
        assert_eq!(s.scroll_offset, 1);
        assert_eq!(buf[(0, 0)].symbol(), "b");
        assert_eq!(buf[(0, 1)].symbol(), "c");
    }
}
