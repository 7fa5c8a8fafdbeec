//! Concrete syntax trees.
//!
//! Storage and views are separate:
//! - [`Subtree`] - shared, immutable nodes holding lengths and reuse metadata
//! - [`SyntaxTree`] - a root plus the source, language and version it belongs to
//! - [`SyntaxNode`] / [`TreeCursor`] - positioned, borrowed views for tooling
//! - [`Edit`] - the textual change between two tree versions
//! - [`SyntaxError`] - diagnostics derived from error-marked regions

mod compare;
mod cursor;
mod diagnostics;
mod edit;
mod green;
mod node;
mod sexp;
mod subtree;
mod syntax_tree;

pub use cursor::TreeCursor;
pub use diagnostics::{ErrorCode, RelatedInfo, Severity, SyntaxError};
pub use edit::{Edit, EditError};
pub use green::{RowanNode, RowanToken, TableLanguage};
pub use node::SyntaxNode;
pub use subtree::Subtree;
pub use syntax_tree::SyntaxTree;
