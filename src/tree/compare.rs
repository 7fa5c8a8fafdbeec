//! Structural comparison between trees.

use super::edit::Edit;
use super::node::SyntaxNode;
use super::syntax_tree::SyntaxTree;
use crate::base::TextRange;
use crate::grammar::Symbol;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct NodeKey {
    symbol: Symbol,
    range: TextRange,
    depth: usize,
    missing: bool,
    extra: bool,
}

fn preorder_with_depth(tree: &SyntaxTree) -> Vec<(SyntaxNode<'_>, usize)> {
    let mut nodes = Vec::new();
    let mut stack = vec![(tree.root(), 0)];
    while let Some((node, depth)) = stack.pop() {
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|child| (child, depth + 1)));
        nodes.push((node, depth));
    }
    nodes
}

fn key(node: SyntaxNode<'_>, range: TextRange, depth: usize) -> NodeKey {
    NodeKey {
        symbol: node.symbol(),
        range,
        depth,
        missing: node.is_missing(),
        extra: node.is_extra(),
    }
}

/// Old range in new coordinates, `None` when an end falls inside the edit
fn map_range(edit: &Edit, range: TextRange) -> Option<TextRange> {
    let start = edit.old_to_new(range.start())?;
    let end = if range.end() <= edit.start {
        range.end()
    } else {
        edit.old_to_new(range.end())?
    };
    Some(TextRange::new(start, end.max(start)))
}

impl SyntaxTree {
    /// Same symbols, ranges, error and missing markers, in the same shape
    pub fn structurally_eq(&self, other: &SyntaxTree) -> bool {
        fn signature(node: SyntaxNode<'_>) -> (Symbol, TextRange, bool, bool, usize) {
            (
                node.symbol(),
                node.range(),
                node.is_error(),
                node.is_missing(),
                node.child_count(),
            )
        }
        self.len() == other.len() && self.preorder().map(signature).eq(other.preorder().map(signature))
    }

    /// Ranges of `new` whose syntactic structure differs from this tree,
    /// with this tree's nodes moved through `edit`. Sorted and merged.
    pub fn changed_ranges(&self, new: &SyntaxTree, edit: &Edit) -> Vec<TextRange> {
        let mut changed = Vec::new();

        let mut old_keys = FxHashSet::default();
        let mut old_mapped = Vec::new();
        for (node, depth) in preorder_with_depth(self) {
            match map_range(edit, node.range()) {
                Some(range) => {
                    old_keys.insert(key(node, range, depth));
                    old_mapped.push(key(node, range, depth));
                }
                None => changed.push(edit.new_range()),
            }
        }

        let mut new_keys = FxHashSet::default();
        for (node, depth) in preorder_with_depth(new) {
            let node_key = key(node, node.range(), depth);
            if !old_keys.contains(&node_key) {
                changed.push(node.range());
            }
            new_keys.insert(node_key);
        }
        changed.extend(
            old_mapped
                .into_iter()
                .filter(|old_key| !new_keys.contains(old_key))
                .map(|old_key| old_key.range),
        );

        merge_ranges(changed)
    }
}

/// Sort and coalesce overlapping or touching ranges
fn merge_ranges(mut ranges: Vec<TextRange>) -> Vec<TextRange> {
    ranges.sort_by_key(|range| (range.start(), range.end()));
    let mut merged: Vec<TextRange> = Vec::with_capacity(ranges.len());
    for range in ranges {
        match merged.last_mut() {
            Some(last) if range.start() <= last.end() => {
                *last = TextRange::new(last.start(), last.end().max(range.end()));
            }
            _ => merged.push(range),
        }
    }
    merged
}
