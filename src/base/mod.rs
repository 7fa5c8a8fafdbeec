//! Foundation types for the sylva runtime.
//!
//! This module provides the position primitives used throughout the crate:
//! - [`TextRange`], [`TextSize`] - Byte offsets into the parsed source
//! - [`Point`] - Zero-based row/column positions
//! - [`LineIndex`] - Offset to point conversion
//!
//! This module has NO dependencies on other sylva modules.

mod line_index;
mod position;

pub use line_index::LineIndex;
pub use position::Point;

// Re-export text-size types for convenience
pub use text_size;
pub use text_size::{TextRange, TextSize};
