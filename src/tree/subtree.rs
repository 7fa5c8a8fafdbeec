//! Shared, immutable tree nodes.
//!
//! A [`Subtree`] stores lengths, never absolute offsets, so a node that sits
//! after an edit is still valid as-is in the new tree; reuse is a pointer
//! copy. Absolute ranges are reconstructed by the positioned views in
//! [`super::node`].

use crate::base::TextSize;
use crate::grammar::{RuleId, StateId, Symbol};
use crate::lexer::{ScannerState, Token};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub(crate) struct NodeFlags(u8);

impl NodeFlags {
    pub(crate) const MISSING: NodeFlags = NodeFlags(1);
    pub(crate) const EXTRA: NodeFlags = NodeFlags(1 << 1);
    pub(crate) const HAS_ERROR: NodeFlags = NodeFlags(1 << 2);
    pub(crate) const FRAGILE: NodeFlags = NodeFlags(1 << 3);
    pub(crate) const KEYWORD: NodeFlags = NodeFlags(1 << 4);
    pub(crate) const EXTERNAL: NodeFlags = NodeFlags(1 << 5);
    pub(crate) const UNRECOGNIZED: NodeFlags = NodeFlags(1 << 6);

    fn contains(self, other: NodeFlags) -> bool {
        self.0 & other.0 == other.0
    }

    fn set(&mut self, other: NodeFlags, on: bool) {
        if on {
            self.0 |= other.0;
        }
    }
}

/// A reference-counted, immutable syntax node
#[derive(Clone)]
pub struct Subtree(Arc<SubtreeData>);

struct SubtreeData {
    symbol: Symbol,
    len: TextSize,
    /// Bytes past the end that were inspected while building this node
    lookahead: TextSize,
    flags: NodeFlags,
    rule: Option<RuleId>,
    /// State the node was pushed onto
    parse_state: StateId,
    /// State the first token was lexed in
    lex_state: StateId,
    /// State the token after the node was lexed in
    follow_state: StateId,
    scanner_before: ScannerState,
    scanner_after: ScannerState,
    children: Vec<Subtree>,
}

impl Drop for SubtreeData {
    // Deep left-recursive lists would otherwise overflow the stack.
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(child) = stack.pop() {
            if let Some(mut data) = Arc::into_inner(child.0) {
                stack.append(&mut data.children);
            }
        }
    }
}

fn gap(end: TextSize, start: TextSize) -> TextSize {
    TextSize::from(u32::from(end).saturating_sub(u32::from(start)))
}

impl Subtree {
    /// A leaf for `token`, shifted onto `parse_state`
    pub(crate) fn leaf(token: &Token, parse_state: StateId, follow_state: StateId, extra: bool) -> Self {
        let mut flags = NodeFlags::default();
        flags.set(NodeFlags::EXTRA, extra || token.is_error());
        flags.set(NodeFlags::KEYWORD, token.keyword);
        flags.set(NodeFlags::EXTERNAL, token.external);
        flags.set(NodeFlags::HAS_ERROR, token.is_error());
        flags.set(NodeFlags::UNRECOGNIZED, token.is_error());
        Self(Arc::new(SubtreeData {
            symbol: token.symbol,
            len: token.len(),
            lookahead: gap(token.lookahead_end, token.end()),
            flags,
            rule: None,
            parse_state,
            lex_state: token.lex_state,
            follow_state,
            scanner_before: token.scanner_before.clone(),
            scanner_after: token.scanner_after.clone(),
            children: Vec::new(),
        }))
    }

    /// A zero-width token synthesized by error recovery at `position`
    pub(crate) fn missing(
        symbol: Symbol,
        position: TextSize,
        parse_state: StateId,
        follow_state: StateId,
        next: &Token,
    ) -> Self {
        let mut flags = NodeFlags::MISSING;
        flags.set(NodeFlags::HAS_ERROR, true);
        Self(Arc::new(SubtreeData {
            symbol,
            len: TextSize::from(0),
            lookahead: gap(next.lookahead_end, position),
            flags,
            rule: None,
            parse_state,
            lex_state: next.lex_state,
            follow_state,
            scanner_before: next.scanner_before.clone(),
            scanner_after: next.scanner_before.clone(),
            children: Vec::new(),
        }))
    }

    /// A non-terminal built by a reduction starting at `start`, with `next`
    /// as the lookahead that triggered it.
    pub(crate) fn node(
        symbol: Symbol,
        rule: Option<RuleId>,
        children: Vec<Subtree>,
        parse_state: StateId,
        fragile: bool,
        start: TextSize,
        next: &Token,
    ) -> Self {
        let mut flags = NodeFlags::default();
        flags.set(NodeFlags::FRAGILE, fragile);
        flags.set(NodeFlags::HAS_ERROR, symbol.is_error());
        flags.set(NodeFlags::EXTRA, symbol.is_error());

        let mut len = TextSize::from(0);
        let mut lookahead_end = gap(next.lookahead_end, start);
        for child in &children {
            flags.set(NodeFlags::HAS_ERROR, child.has_error());
            flags.set(NodeFlags::FRAGILE, child.is_fragile());
            flags.set(NodeFlags::EXTERNAL, child.has_external());
            len += child.len();
            lookahead_end = lookahead_end.max(len + child.lookahead());
        }

        let (lex_state, scanner_before) = match children.first() {
            Some(first) => (first.lex_state(), first.scanner_before().clone()),
            None => (next.lex_state, next.scanner_before.clone()),
        };
        let (follow_state, scanner_after) = match children.last() {
            Some(last) => (last.follow_state(), last.scanner_after().clone()),
            None => (next.lex_state, next.scanner_before.clone()),
        };

        Self(Arc::new(SubtreeData {
            symbol,
            len,
            lookahead: gap(lookahead_end, len),
            flags,
            rule,
            parse_state,
            lex_state,
            follow_state,
            scanner_before,
            scanner_after,
            children,
        }))
    }

    /// An error node holding skipped input and abandoned partial nodes
    pub(crate) fn error(children: Vec<Subtree>, parse_state: StateId, start: TextSize, next: &Token) -> Self {
        Self::node(Symbol::ERROR, None, children, parse_state, false, start, next)
    }

    /// A childless error node covering `len` unparsed bytes
    pub(crate) fn error_leaf(len: TextSize, parse_state: StateId, next: &Token) -> Self {
        let mut flags = NodeFlags::HAS_ERROR;
        flags.set(NodeFlags::EXTRA, true);
        Self(Arc::new(SubtreeData {
            symbol: Symbol::ERROR,
            len,
            lookahead: TextSize::from(1),
            flags,
            rule: None,
            parse_state,
            lex_state: StateId::RECOVERY,
            follow_state: StateId::RECOVERY,
            scanner_before: next.scanner_before.clone(),
            scanner_after: next.scanner_before.clone(),
            children: Vec::new(),
        }))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn symbol(&self) -> Symbol {
        self.0.symbol
    }

    pub fn len(&self) -> TextSize {
        self.0.len
    }

    pub fn is_empty(&self) -> bool {
        self.0.len == TextSize::from(0)
    }

    /// Bytes beyond the node's end that influenced how it was built
    pub fn lookahead(&self) -> TextSize {
        self.0.lookahead
    }

    pub fn children(&self) -> &[Subtree] {
        &self.0.children
    }

    pub fn child_count(&self) -> usize {
        self.0.children.len()
    }

    /// Tokens, missing tokens and childless error nodes
    pub fn is_leaf(&self) -> bool {
        self.0.children.is_empty() && self.0.rule.is_none()
    }

    pub fn rule(&self) -> Option<RuleId> {
        self.0.rule
    }

    pub fn is_error(&self) -> bool {
        self.0.symbol.is_error()
    }

    pub fn is_missing(&self) -> bool {
        self.0.flags.contains(NodeFlags::MISSING)
    }

    pub fn is_extra(&self) -> bool {
        self.0.flags.contains(NodeFlags::EXTRA)
    }

    /// Whether this node is, or contains, an error or missing node
    pub fn has_error(&self) -> bool {
        self.0.flags.contains(NodeFlags::HAS_ERROR)
    }

    /// Built while more than one parse version was alive, so its shape may
    /// depend on context outside its own bytes
    pub fn is_fragile(&self) -> bool {
        self.0.flags.contains(NodeFlags::FRAGILE)
    }

    pub fn is_keyword(&self) -> bool {
        self.0.flags.contains(NodeFlags::KEYWORD)
    }

    /// Contains a token produced by the external scanner
    pub fn has_external(&self) -> bool {
        self.0.flags.contains(NodeFlags::EXTERNAL)
    }

    /// A byte no lex state recognised
    pub fn is_unrecognized(&self) -> bool {
        self.0.flags.contains(NodeFlags::UNRECOGNIZED)
    }

    pub fn parse_state(&self) -> StateId {
        self.0.parse_state
    }

    pub fn lex_state(&self) -> StateId {
        self.0.lex_state
    }

    pub fn follow_state(&self) -> StateId {
        self.0.follow_state
    }

    pub fn scanner_before(&self) -> &ScannerState {
        &self.0.scanner_before
    }

    pub fn scanner_after(&self) -> &ScannerState {
        &self.0.scanner_after
    }

    pub fn ptr_eq(&self, other: &Subtree) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Number of nodes in this subtree, itself included
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children());
        }
        count
    }

    /// First token-level descendant, or `self` for leaves
    pub fn first_leaf(&self) -> &Subtree {
        let mut node = self;
        while let Some(first) = node.children().first() {
            node = first;
        }
        node
    }
}

impl fmt::Debug for Subtree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Subtree");
        debug
            .field("symbol", &self.symbol())
            .field("len", &self.len());
        if self.is_missing() {
            debug.field("missing", &true);
        }
        if self.is_extra() {
            debug.field("extra", &true);
        }
        if !self.children().is_empty() {
            debug.field("children", &self.children());
        }
        debug.finish()
    }
}
