//! Offset to row/column conversion.

use super::Point;
use text_size::TextSize;

/// Line start table for one source buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    line_starts: Vec<TextSize>,
    len: TextSize,
}

impl LineIndex {
    pub fn new(text: &[u8]) -> Self {
        let mut line_starts = vec![TextSize::new(0)];
        for (offset, &byte) in text.iter().enumerate() {
            if byte == b'\n' {
                line_starts.push(TextSize::new(offset as u32 + 1));
            }
        }
        Self {
            line_starts,
            len: TextSize::new(text.len() as u32),
        }
    }

    /// Point for a byte offset. Offsets past the end clamp to the end.
    pub fn point(&self, offset: TextSize) -> Point {
        let offset = offset.min(self.len);
        let row = match self.line_starts.binary_search(&offset) {
            Ok(row) => row,
            Err(next) => next - 1,
        };
        let column = offset - self.line_starts[row];
        Point::new(row as u32, column.into())
    }

    /// Byte offset for a point, if the point lies inside the text
    pub fn offset(&self, point: Point) -> Option<TextSize> {
        let start = *self.line_starts.get(point.row as usize)?;
        let line_end = self
            .line_starts
            .get(point.row as usize + 1)
            .copied()
            .unwrap_or(self.len);
        let offset = start + TextSize::new(point.column);
        (offset <= line_end).then_some(offset)
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }
}
