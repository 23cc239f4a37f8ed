use super::constants::CARD_ROWS;
use super::input::ScrollMove;

/// Window over the rendered card list, measured in terminal rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    offset: u32,
    height: u32,
}

impl Viewport {
    pub fn new(height: u32) -> Self {
        Self {
            offset: 0,
            height: height.max(1),
        }
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    /// Moves the window and returns `(viewport_bottom, document_height)`.
    pub fn scroll(&mut self, movement: &ScrollMove, card_count: usize) -> (u32, u32) {
        let document_height = document_height(card_count);
        let max_offset = document_height.saturating_sub(self.height);
        self.offset = match movement {
            ScrollMove::Down => self.offset.saturating_add(self.height).min(max_offset),
            ScrollMove::Up => self.offset.saturating_sub(self.height),
            ScrollMove::Top => 0,
            ScrollMove::End => max_offset,
        };
        (self.offset + self.height, document_height)
    }

    /// Card indices currently on screen.
    pub fn visible_range(&self, card_count: usize) -> std::ops::Range<usize> {
        let first = (self.offset / CARD_ROWS) as usize;
        let last = ((self.offset + self.height) / CARD_ROWS) as usize;
        first.min(card_count)..last.min(card_count)
    }
}

fn document_height(card_count: usize) -> u32 {
    u32::try_from(card_count)
        .unwrap_or(u32::MAX)
        .saturating_mul(CARD_ROWS)
}
