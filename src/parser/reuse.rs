//! Subtree reuse for incremental reparsing.
//!
//! [`ReusableNodes`] walks the previous tree in old-text coordinates. At
//! each parse position the automaton asks for the old node starting at the
//! mapped offset; nodes that cannot be reused are broken down into their
//! children until a reusable one (or a gap) is found.

use super::automaton::{Lookahead, MAX_REDUCTIONS_PER_TOKEN, ParseRun};
use super::stack;
use crate::base::{TextRange, TextSize};
use crate::grammar::Action;
use crate::lexer::Token;
use crate::tree::{Edit, Subtree};
use tracing::{debug, trace};

struct Entry<'a> {
    node: &'a Subtree,
    /// Old-text offset of the node
    start: TextSize,
    /// Index within the parent entry's node
    index: usize,
}

/// Cursor over the reusable parts of an old tree
pub(crate) struct ReusableNodes<'a> {
    /// The current candidate on top, its ancestors beneath it
    stack: Vec<Entry<'a>>,
    edit: Edit,
}

impl<'a> ReusableNodes<'a> {
    pub(crate) fn new(root: &'a Subtree, edit: Edit) -> Self {
        Self {
            stack: vec![Entry {
                node: root,
                start: TextSize::from(0),
                index: 0,
            }],
            edit,
        }
    }

    pub(crate) fn edit(&self) -> &Edit {
        &self.edit
    }

    /// The old node starting exactly at `target`, skipping past or
    /// descending into nodes that end at or straddle it
    pub(crate) fn node_at(&mut self, target: TextSize) -> Option<(&'a Subtree, TextSize)> {
        loop {
            let entry = self.stack.last()?;
            let (node, start) = (entry.node, entry.start);
            if start + node.len() <= target {
                self.advance();
            } else if start > target {
                return None;
            } else if start < target {
                self.descend_or_advance();
            } else {
                return Some((node, start));
            }
        }
    }

    /// Move past the current candidate to the next node in document order
    pub(crate) fn advance(&mut self) {
        let Some(mut finished) = self.stack.pop() else {
            return;
        };
        loop {
            let Some(parent) = self.stack.last().map(|entry| entry.node) else {
                return;
            };
            let next_index = finished.index + 1;
            if let Some(sibling) = parent.children().get(next_index) {
                self.stack.push(Entry {
                    node: sibling,
                    start: finished.start + finished.node.len(),
                    index: next_index,
                });
                return;
            }
            match self.stack.pop() {
                Some(entry) => finished = entry,
                None => return,
            }
        }
    }

    /// Replace the current candidate by its first child, or move past it
    /// when it has none
    pub(crate) fn descend_or_advance(&mut self) {
        let Some(entry) = self.stack.last() else {
            return;
        };
        match entry.node.children().first() {
            Some(first) => {
                let start = entry.start;
                self.stack.push(Entry {
                    node: first,
                    start,
                    index: 0,
                });
            }
            None => self.advance(),
        }
    }
}

pub(super) enum Reuse {
    /// A non-terminal was pushed onto the stack
    Node,
    /// An old leaf to use as the next token
    Leaf(Lookahead),
    Nothing,
}

/// First token-level leaf, skipping empty non-terminals
fn first_token(node: &Subtree) -> Option<&Subtree> {
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        if current.is_leaf() {
            return Some(current);
        }
        stack.extend(current.children().iter().rev());
    }
    None
}

impl<'a> ParseRun<'a> {
    pub(super) fn try_reuse(&mut self) -> Reuse {
        let Some(mut reusable) = self.reuse.take() else {
            return Reuse::Nothing;
        };
        let result = self.reuse_from(&mut reusable);
        self.reuse = Some(reusable);
        result
    }

    fn reuse_from(&mut self, reusable: &mut ReusableNodes<'a>) -> Reuse {
        let Some(old_position) = reusable.edit().new_to_old(self.position) else {
            return Reuse::Nothing;
        };
        while let Some((node, old_start)) = reusable.node_at(old_position) {
            match self.check_reusable(node, old_start, reusable.edit()) {
                Ok(()) if node.is_leaf() => {
                    reusable.advance();
                    self.stats.subtrees_reused += 1;
                    trace!(
                        "[REUSE] token {} at {}",
                        self.table.symbol_name(node.symbol()),
                        u32::from(self.position)
                    );
                    let token = self.reused_token(node);
                    return Reuse::Leaf(Lookahead {
                        token,
                        reused: Some(node.clone()),
                        missing: false,
                    });
                }
                Ok(()) => {
                    if self.push_reused(node) {
                        reusable.advance();
                        return Reuse::Node;
                    }
                    reusable.descend_or_advance();
                }
                Err(reason) => {
                    trace!(
                        "[REUSE] cannot reuse {} at old offset {}: {}",
                        self.table.symbol_name(node.symbol()),
                        u32::from(old_start),
                        reason
                    );
                    reusable.descend_or_advance();
                }
            }
        }
        Reuse::Nothing
    }

    fn check_reusable(&self, node: &Subtree, old_start: TextSize, edit: &Edit) -> Result<(), &'static str> {
        let table = self.table;
        let version = &self.versions[0];
        if node.is_empty() {
            return Err("empty");
        }
        if node.has_error() {
            return Err("contains an error");
        }
        if !node.is_leaf() && node.is_fragile() {
            return Err("built while the parse was ambiguous");
        }
        let reach = old_start + node.len() + node.lookahead();
        if reach > edit.start && old_start <= edit.old_end {
            return Err("depends on edited text");
        }
        if node.lex_state() != version.lex_state() {
            return Err("lexed in another state");
        }
        if node.scanner_before() != &version.scanner_state {
            return Err("external scanner state differs");
        }
        if node.is_leaf() {
            // Whether a word is a keyword depends on the parse state it was
            // lexed in
            if node.is_keyword() || table.word_token() == Some(node.symbol()) {
                return Err("keyword extraction depends on the parse state");
            }
            return Ok(());
        }

        // Reductions the first token forces may have to happen before the
        // node can be pushed
        if node.parse_state() != version.top_state() {
            let first = first_token(node).ok_or("has no tokens")?;
            let mut states = version.states();
            stack::simulate(table, &mut states, first.symbol(), true).ok_or("first token is not valid here")?;
            if states.last() != Some(&node.parse_state()) {
                return Err("reached through another parse state");
            }
        }
        if table.goto(node.parse_state(), node.symbol()).is_none() {
            return Err("no goto");
        }
        Ok(())
    }

    /// Perform the reductions the node's first token triggers, then push the
    /// node itself. The stack is left untouched on failure.
    fn push_reused(&mut self, node: &Subtree) -> bool {
        let table = self.table;
        let Some(first) = first_token(node) else {
            return false;
        };
        let token = self.reused_token(first);
        let mut version = self.versions[0].clone();
        let mut reductions = 0;
        while version.top_state() != node.parse_state() {
            let [Action::Reduce(rule)] = table.actions(version.top_state(), first.symbol()) else {
                return false;
            };
            reductions += 1;
            if reductions > MAX_REDUCTIONS_PER_TOKEN || !version.reduce(table, *rule, &token, false) {
                return false;
            }
        }
        let Some(goto) = table.goto(version.top_state(), node.symbol()) else {
            return false;
        };
        version.push(goto, node.clone());
        version.lex_override = Some(node.follow_state());
        version.scanner_state = node.scanner_after().clone();
        self.versions[0] = version;

        debug!(
            "[REUSE] {} ({} bytes) at {}",
            table.symbol_name(node.symbol()),
            u32::from(node.len()),
            u32::from(self.position)
        );
        self.position += node.len();
        self.stats.subtrees_reused += 1;
        true
    }

    /// `leaf` as a token at the current position
    fn reused_token(&self, leaf: &Subtree) -> Token {
        let start = self.position;
        Token {
            symbol: leaf.symbol(),
            range: TextRange::at(start, leaf.len()),
            point: self.line_index.point(start),
            lookahead_end: start + leaf.len() + leaf.lookahead(),
            lex_state: leaf.lex_state(),
            keyword: leaf.is_keyword(),
            external: leaf.has_external(),
            scanner_before: leaf.scanner_before().clone(),
            scanner_after: leaf.scanner_after().clone(),
        }
    }
}
