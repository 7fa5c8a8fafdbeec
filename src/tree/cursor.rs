//! Stateful tree traversal.

use super::node::SyntaxNode;
use crate::base::TextSize;

/// Walks a tree while keeping the path from its starting node
///
/// Each stack entry remembers the node's index in its parent, so sibling
/// moves are constant time and the parent is always the previous entry.
#[derive(Clone)]
pub struct TreeCursor<'tree> {
    stack: Vec<(SyntaxNode<'tree>, usize)>,
}

impl<'tree> TreeCursor<'tree> {
    pub fn new(node: SyntaxNode<'tree>) -> Self {
        Self {
            stack: vec![(node, 0)],
        }
    }

    pub fn node(&self) -> SyntaxNode<'tree> {
        self.stack[self.stack.len() - 1].0
    }

    /// Distance from the node the cursor started at
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn reset(&mut self, node: SyntaxNode<'tree>) {
        self.stack.clear();
        self.stack.push((node, 0));
    }

    /// Field of the current node within its parent
    pub fn field_name(&self) -> Option<&'tree str> {
        let [.., (parent, _), (_, index)] = self.stack.as_slice() else {
            return None;
        };
        parent.field_name_for_child(*index)
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.node().children().next() {
            Some(child) => {
                self.stack.push((child, 0));
                true
            }
            None => false,
        }
    }

    pub fn goto_last_child(&mut self) -> bool {
        let node = self.node();
        let count = node.child_count();
        if count == 0 {
            return false;
        }
        let last = &node.subtree().children()[count - 1];
        let child = SyntaxNode::new(node.tree(), last, node.end() - last.len());
        self.stack.push((child, count - 1));
        true
    }

    /// Move to the first child that ends after `offset`, returning its index
    pub fn goto_first_child_for_offset(&mut self, offset: TextSize) -> Option<usize> {
        let (index, child) = self
            .node()
            .children()
            .enumerate()
            .find(|(_, child)| child.end() > offset)?;
        self.stack.push((child, index));
        Some(index)
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let [.., (parent, _), (node, index)] = self.stack.as_mut_slice() else {
            return false;
        };
        let Some(next) = parent.subtree().children().get(*index + 1) else {
            return false;
        };
        *node = SyntaxNode::new(node.tree(), next, node.end());
        *index += 1;
        true
    }

    pub fn goto_prev_sibling(&mut self) -> bool {
        let [.., (parent, _), (node, index)] = self.stack.as_mut_slice() else {
            return false;
        };
        let Some(prev) = index
            .checked_sub(1)
            .and_then(|i| parent.subtree().children().get(i))
        else {
            return false;
        };
        *node = SyntaxNode::new(node.tree(), prev, node.start() - prev.len());
        *index -= 1;
        true
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.stack.len() > 1 {
            self.stack.pop();
            true
        } else {
            false
        }
    }
}
