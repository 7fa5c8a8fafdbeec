//! Positioned node views.

use super::cursor::TreeCursor;
use super::subtree::Subtree;
use super::syntax_tree::SyntaxTree;
use crate::base::{Point, TextRange, TextSize};
use crate::grammar::{GrammarTable, Symbol};
use std::fmt;

/// A [`Subtree`] placed at an absolute offset inside a [`SyntaxTree`]
///
/// Views are cheap copies. Parent and sibling queries are answered by
/// searching down from the root ([`SyntaxTree::parent_of`]) or by the
/// ancestor stack of a [`TreeCursor`]; nodes store no back-pointers.
#[derive(Clone, Copy)]
pub struct SyntaxNode<'tree> {
    tree: &'tree SyntaxTree,
    subtree: &'tree Subtree,
    start: TextSize,
}

impl<'tree> SyntaxNode<'tree> {
    pub(crate) fn new(tree: &'tree SyntaxTree, subtree: &'tree Subtree, start: TextSize) -> Self {
        Self {
            tree,
            subtree,
            start,
        }
    }

    fn table(&self) -> &'tree GrammarTable {
        self.tree.language().table()
    }

    pub fn tree(&self) -> &'tree SyntaxTree {
        self.tree
    }

    pub fn subtree(&self) -> &'tree Subtree {
        self.subtree
    }

    pub fn symbol(&self) -> Symbol {
        self.subtree.symbol()
    }

    /// Grammar name of the node's symbol
    pub fn kind(&self) -> &'tree str {
        self.table().symbol_name(self.symbol())
    }

    pub fn start(&self) -> TextSize {
        self.start
    }

    pub fn end(&self) -> TextSize {
        self.start + self.subtree.len()
    }

    pub fn range(&self) -> TextRange {
        TextRange::at(self.start, self.subtree.len())
    }

    pub fn start_point(&self) -> Point {
        self.tree.line_index().point(self.start)
    }

    pub fn end_point(&self) -> Point {
        self.tree.line_index().point(self.end())
    }

    pub fn bytes(&self) -> &'tree [u8] {
        &self.tree.source()[usize::from(self.start)..usize::from(self.end())]
    }

    /// Source text, if it is valid UTF-8
    pub fn text(&self) -> Option<&'tree str> {
        std::str::from_utf8(self.bytes()).ok()
    }

    pub fn is_named(&self) -> bool {
        self.table().is_named(self.symbol())
    }

    pub fn is_extra(&self) -> bool {
        self.subtree.is_extra()
    }

    pub fn is_error(&self) -> bool {
        self.subtree.is_error()
    }

    pub fn is_missing(&self) -> bool {
        self.subtree.is_missing()
    }

    pub fn has_error(&self) -> bool {
        self.subtree.has_error()
    }

    // =========================================================================
    // Children
    // =========================================================================

    pub fn child_count(&self) -> usize {
        self.subtree.child_count()
    }

    pub fn children(&self) -> impl Iterator<Item = SyntaxNode<'tree>> + 'tree {
        let tree = self.tree;
        let mut offset = self.start;
        self.subtree.children().iter().map(move |child| {
            let node = SyntaxNode::new(tree, child, offset);
            offset += child.len();
            node
        })
    }

    pub fn child(&self, index: usize) -> Option<SyntaxNode<'tree>> {
        self.children().nth(index)
    }

    pub fn named_children(&self) -> impl Iterator<Item = SyntaxNode<'tree>> + 'tree {
        self.children().filter(|child| child.is_named())
    }

    pub fn named_child_count(&self) -> usize {
        self.named_children().count()
    }

    /// Field name of the child at `index`, per the rule that built this node
    pub fn field_name_for_child(&self, index: usize) -> Option<&'tree str> {
        let rule = self.subtree.rule()?;
        let children = self.subtree.children();
        if children.get(index)?.is_extra() {
            return None;
        }
        let position = children[..index]
            .iter()
            .filter(|child| !child.is_extra())
            .count();
        let field = self.table().rule(rule).field_of(position)?;
        self.table().field_name(field)
    }

    pub fn child_by_field_name(&self, name: &str) -> Option<SyntaxNode<'tree>> {
        let field = self.table().field_id(name)?;
        let rule = self.table().rule(self.subtree.rule()?);
        let mut position = 0;
        for child in self.children() {
            if child.is_extra() {
                continue;
            }
            if rule.field_of(position) == Some(field) {
                return Some(child);
            }
            position += 1;
        }
        None
    }

    /// Smallest descendant (or self) whose range contains `range`
    pub fn descendant_for_range(&self, range: TextRange) -> SyntaxNode<'tree> {
        let mut node = *self;
        'descend: loop {
            for child in node.children() {
                if child.range().contains_range(range) && (range.is_empty() || !child.range().is_empty()) {
                    node = child;
                    continue 'descend;
                }
            }
            return node;
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    pub fn parent(&self) -> Option<SyntaxNode<'tree>> {
        self.tree.parent_of(self)
    }

    pub fn next_sibling(&self) -> Option<SyntaxNode<'tree>> {
        let parent = self.parent()?;
        let mut children = parent.children();
        children.find(|child| child == self)?;
        children.next()
    }

    pub fn prev_sibling(&self) -> Option<SyntaxNode<'tree>> {
        let parent = self.parent()?;
        let mut previous = None;
        for child in parent.children() {
            if child == *self {
                return previous;
            }
            previous = Some(child);
        }
        None
    }

    pub fn walk(&self) -> TreeCursor<'tree> {
        TreeCursor::new(*self)
    }
}

impl PartialEq for SyntaxNode<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.start == other.start && self.subtree.ptr_eq(other.subtree)
    }
}

impl Eq for SyntaxNode<'_> {}

impl fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.range())?;
        if self.is_missing() {
            f.write_str(" (missing)")?;
        }
        Ok(())
    }
}
