//! Edit descriptors.
//!
//! An [`Edit`] records one textual replacement: bytes `start..old_end` of the
//! old text became bytes `start..new_end` of the new text. Positions outside
//! the replaced span map one-to-one between the two texts.

use crate::base::{LineIndex, Point, TextRange, TextSize};
use thiserror::Error;

/// A single replacement between two versions of a text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Edit {
    pub start: TextSize,
    pub old_end: TextSize,
    pub new_end: TextSize,
    pub start_point: Point,
    pub old_end_point: Point,
    pub new_end_point: Point,
}

/// Reasons an edit cannot describe the transition between two texts
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("edit ends before it starts ({start:?} > {end:?})")]
    Inverted { start: TextSize, end: TextSize },

    #[error("edit end {end:?} is past the end of the text ({len:?})")]
    OutOfBounds { end: TextSize, len: TextSize },

    #[error("text after the edit has {new_tail:?} bytes, but {old_tail:?} before it")]
    TailMismatch { old_tail: TextSize, new_tail: TextSize },
}

impl Edit {
    /// Byte-only edit; points are left at the origin.
    pub fn new(start: TextSize, old_end: TextSize, new_end: TextSize) -> Self {
        Self {
            start,
            old_end,
            new_end,
            ..Self::default()
        }
    }

    pub fn with_points(mut self, start: Point, old_end: Point, new_end: Point) -> Self {
        self.start_point = start;
        self.old_end_point = old_end;
        self.new_end_point = new_end;
        self
    }

    /// Replace `range` of `old` with `text`, returning the edit and new text.
    pub fn replace(old: &[u8], range: TextRange, text: &[u8]) -> (Edit, Vec<u8>) {
        let start = usize::from(range.start()).min(old.len());
        let end = usize::from(range.end()).clamp(start, old.len());

        let mut new = Vec::with_capacity(old.len() - (end - start) + text.len());
        new.extend_from_slice(&old[..start]);
        new.extend_from_slice(text);
        new.extend_from_slice(&old[end..]);

        let start_point = Point::default().advance(&old[..start]);
        let edit = Edit::new(
            TextSize::from(start as u32),
            TextSize::from(end as u32),
            TextSize::from((start + text.len()) as u32),
        )
        .with_points(
            start_point,
            start_point.advance(&old[start..end]),
            start_point.advance(text),
        );
        (edit, new)
    }

    /// Smallest edit turning `old` into `new`: everything between their
    /// common prefix and common suffix.
    pub fn diff(old: &[u8], new: &[u8]) -> Edit {
        let prefix = old.iter().zip(new).take_while(|(a, b)| a == b).count();
        let suffix = old[prefix..]
            .iter()
            .rev()
            .zip(new[prefix..].iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        let old_index = LineIndex::new(old);
        let new_index = LineIndex::new(new);
        let start = TextSize::from(prefix as u32);
        let old_end = TextSize::from((old.len() - suffix) as u32);
        let new_end = TextSize::from((new.len() - suffix) as u32);
        Edit::new(start, old_end, new_end).with_points(
            old_index.point(start),
            old_index.point(old_end),
            new_index.point(new_end),
        )
    }

    /// Check the edit against the lengths of the texts it connects.
    pub fn validate(&self, old_len: TextSize, new_len: TextSize) -> Result<(), EditError> {
        for end in [self.old_end, self.new_end] {
            if end < self.start {
                return Err(EditError::Inverted {
                    start: self.start,
                    end,
                });
            }
        }
        if self.old_end > old_len {
            return Err(EditError::OutOfBounds {
                end: self.old_end,
                len: old_len,
            });
        }
        if self.new_end > new_len {
            return Err(EditError::OutOfBounds {
                end: self.new_end,
                len: new_len,
            });
        }
        let old_tail = old_len - self.old_end;
        let new_tail = new_len - self.new_end;
        if old_tail != new_tail {
            return Err(EditError::TailMismatch { old_tail, new_tail });
        }
        Ok(())
    }

    pub fn old_range(&self) -> TextRange {
        TextRange::new(self.start, self.old_end)
    }

    pub fn new_range(&self) -> TextRange {
        TextRange::new(self.start, self.new_end)
    }

    /// Change in text length
    pub fn delta(&self) -> i64 {
        i64::from(u32::from(self.new_end)) - i64::from(u32::from(self.old_end))
    }

    /// New-text position of old offset `offset`, `None` inside the
    /// replaced span
    pub fn old_to_new(&self, offset: TextSize) -> Option<TextSize> {
        if offset < self.start {
            Some(offset)
        } else if offset >= self.old_end {
            Some(offset - self.old_end + self.new_end)
        } else {
            None
        }
    }

    /// Old-text position of new offset `offset`, `None` inside the
    /// inserted span
    pub fn new_to_old(&self, offset: TextSize) -> Option<TextSize> {
        if offset < self.start {
            Some(offset)
        } else if offset >= self.new_end {
            Some(offset - self.new_end + self.old_end)
        } else {
            None
        }
    }

    /// One edit equivalent to applying `self` and then `next`
    pub fn compose(&self, next: &Edit) -> Edit {
        let (start, start_point) = if self.start <= next.start {
            (self.start, self.start_point)
        } else {
            (next.start, next.start_point)
        };

        // Old end: whichever reaches further back into the original text.
        let mut old_end = (self.old_end, self.old_end_point);
        if next.old_end >= self.new_end {
            let mapped = next.old_end - self.new_end + self.old_end;
            if mapped > old_end.0 {
                old_end = (
                    mapped,
                    shift_point(next.old_end_point, self.new_end_point, self.old_end_point),
                );
            }
        }

        // New end: whichever reaches further into the final text.
        let mut new_end = (next.new_end, next.new_end_point);
        if self.new_end >= next.old_end {
            let mapped = self.new_end - next.old_end + next.new_end;
            if mapped > new_end.0 {
                new_end = (
                    mapped,
                    shift_point(self.new_end_point, next.old_end_point, next.new_end_point),
                );
            }
        }

        Edit::new(start, old_end.0, new_end.0).with_points(start_point, old_end.1, new_end.1)
    }
}

/// Move `point`, which lies at or after `from`, as if `from` became `to`.
fn shift_point(point: Point, from: Point, to: Point) -> Point {
    if point.row == from.row {
        Point::new(to.row, to.column + point.column.saturating_sub(from.column))
    } else {
        Point::new(to.row + point.row.saturating_sub(from.row), point.column)
    }
}
