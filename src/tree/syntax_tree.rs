//! The immutable, versioned result of a parse.

use super::cursor::TreeCursor;
use super::diagnostics::{ErrorCode, RelatedInfo, SyntaxError};
use super::node::SyntaxNode;
use super::subtree::Subtree;
use crate::base::{LineIndex, TextSize};
use crate::grammar::Language;
use std::fmt;
use std::sync::Arc;

/// A complete concrete syntax tree over one version of a source text
///
/// The root always spans the whole source. Trees are never mutated; a
/// reparse returns a new tree that shares unchanged subtrees with this one.
#[derive(Clone)]
pub struct SyntaxTree {
    root: Subtree,
    source: Arc<[u8]>,
    language: Language,
    version: u64,
    line_index: Arc<LineIndex>,
}

impl SyntaxTree {
    pub(crate) fn new(root: Subtree, source: Arc<[u8]>, language: Language, version: u64) -> Self {
        let line_index = Arc::new(LineIndex::new(&source));
        Self {
            root,
            source,
            language,
            version,
            line_index,
        }
    }

    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self, &self.root, TextSize::from(0))
    }

    pub fn root_subtree(&self) -> &Subtree {
        &self.root
    }

    pub fn source(&self) -> &[u8] {
        &self.source
    }

    pub fn len(&self) -> TextSize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_empty()
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    /// 0 for a fresh parse, one more than the previous tree for a reparse
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    pub fn has_error(&self) -> bool {
        self.root.has_error()
    }

    pub fn walk(&self) -> TreeCursor<'_> {
        TreeCursor::new(self.root())
    }

    /// All nodes, parents before children, in source order
    pub fn preorder(&self) -> impl Iterator<Item = SyntaxNode<'_>> {
        let mut stack = vec![self.root()];
        std::iter::from_fn(move || {
            let node = stack.pop()?;
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev());
            Some(node)
        })
    }

    /// Smallest node containing the byte at `offset`
    pub fn node_at(&self, offset: TextSize) -> SyntaxNode<'_> {
        let end = (offset + TextSize::from(1)).min(self.len());
        let range = crate::base::TextRange::new(offset.min(end), end);
        self.root().descendant_for_range(range)
    }

    /// Parent of `node`, found by descending from the root
    pub fn parent_of<'t>(&'t self, node: &SyntaxNode<'t>) -> Option<SyntaxNode<'t>> {
        let mut candidates = vec![self.root()];
        while let Some(candidate) = candidates.pop() {
            for child in candidate.children() {
                if child == *node {
                    return Some(candidate);
                }
                if child.child_count() > 0 && child.range().contains_range(node.range()) {
                    candidates.push(child);
                }
            }
        }
        None
    }

    /// Diagnostics for every error-marked region, in source order
    pub fn errors(&self) -> Vec<SyntaxError> {
        let mut errors = Vec::new();
        let mut stack: Vec<(SyntaxNode<'_>, Option<SyntaxNode<'_>>)> = vec![(self.root(), None)];
        while let Some((node, context)) = stack.pop() {
            if !node.has_error() {
                continue;
            }
            if node.is_missing() || node.is_error() {
                let mut error = describe_error(node);
                if let Some(context) = context {
                    error = error.with_related(RelatedInfo::new(
                        format!("in this {}", context.kind()),
                        context.range(),
                    ));
                }
                errors.push(error);
                continue;
            }
            let context = if node.is_named() && node != self.root() {
                Some(node)
            } else {
                context
            };
            let children: Vec<_> = node.children().collect();
            stack.extend(children.into_iter().rev().map(|child| (child, context)));
        }
        errors
    }
}

fn snippet(node: SyntaxNode<'_>) -> String {
    const MAX: usize = 40;
    let text = String::from_utf8_lossy(node.bytes());
    let text = text.trim();
    match text.char_indices().nth(MAX) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

fn describe_error(node: SyntaxNode<'_>) -> SyntaxError {
    if node.is_missing() {
        let name = node.kind();
        let error = SyntaxError::new(format!("missing {}", quoted(node, name)), node.range(), ErrorCode::E0201);
        return if node.is_named() {
            error
        } else {
            error.with_hint(format!("insert `{}`", name))
        };
    }

    let subtree = node.subtree();
    if subtree.is_leaf() {
        return if subtree.is_unrecognized() {
            SyntaxError::new(
                format!("unrecognized input `{}`", snippet(node)),
                node.range(),
                ErrorCode::E0101,
            )
        } else {
            SyntaxError::new("input could not be parsed", node.range(), ErrorCode::E0203)
        };
    }

    let mut lexical = true;
    let mut leaves = vec![subtree];
    while let Some(leaf) = leaves.pop() {
        if leaf.is_leaf() {
            lexical &= leaf.is_unrecognized() || (leaf.is_extra() && !leaf.is_error());
        } else {
            leaves.extend(leaf.children());
        }
    }
    if lexical {
        SyntaxError::new(
            format!("unrecognized input `{}`", snippet(node)),
            node.range(),
            ErrorCode::E0101,
        )
    } else {
        SyntaxError::new(format!("unexpected `{}`", snippet(node)), node.range(), ErrorCode::E0202)
    }
}

fn quoted(node: SyntaxNode<'_>, name: &str) -> String {
    if node.is_named() {
        name.to_string()
    } else {
        format!("`{}`", name)
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("language", &self.language.name())
            .field("version", &self.version)
            .field("len", &self.len())
            .field("root", &self.to_sexp())
            .finish()
    }
}
