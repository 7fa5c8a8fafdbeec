//! Error recovery.
//!
//! Entered when no version has an action for its lookahead. In order:
//! 1. insert one missing terminal if exactly one candidate makes the
//!    lookahead valid;
//! 2. pop stack frames until some state accepts the lookahead;
//! 3. skip tokens into an error node until one is accepted by some state on
//!    the stack;
//! 4. at end of input, wrap everything left into a single error root.
//!
//! Every path produces a tree that covers the whole input.

use super::automaton::{Finish, Lookahead, ParseRun};
use super::ranking::best_index;
use super::stack::{self, StackVersion};
use crate::base::TextSize;
use crate::grammar::{Action, StateId, Symbol};
use crate::lexer::Token;
use crate::tree::Subtree;
use tracing::{debug, trace};

/// Attempts at one offset before recovery stops inserting tokens there
const MAX_RECOVERIES_PER_POSITION: usize = 8;

/// Parser health
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum RecoveryState {
    Normal,
    /// No version can consume the lookahead
    Panicking,
    /// Recovery found a token the stack accepts; back to normal once it is
    /// consumed
    Resynchronized,
}

impl<'a> ParseRun<'a> {
    pub(super) fn recover(&mut self, mut version: StackVersion, lookahead: Lookahead) -> Option<Finish> {
        let table = self.table;
        let token = lookahead.token.clone();
        if self.recovery == RecoveryState::Normal {
            self.stats.recoveries += 1;
        }
        self.recovery = RecoveryState::Panicking;
        debug!(
            "[RECOVER] unexpected {} at {} in state {}",
            table.symbol_name(token.symbol),
            token.point,
            version.top_state()
        );

        let attempts = if self.recoveries_here.0 == token.start() {
            self.recoveries_here.1 + 1
        } else {
            1
        };
        self.recoveries_here = (token.start(), attempts);
        if attempts > MAX_RECOVERIES_PER_POSITION && token.is_end() {
            return Some(Finish::Root(self.collapse(version, token.start(), &token)));
        }

        if attempts <= MAX_RECOVERIES_PER_POSITION && !token.is_error() && !lookahead.missing {
            if let Some(symbol) = self.single_insertion(&version, token.symbol) {
                let missing = Lookahead::missing(symbol, &token);
                let (mut advanced, _) = self.advance(version.clone(), &missing, false);
                if let Some(index) = best_index(table, self.options.conflict_policy, &advanced) {
                    debug!(
                        "[RECOVER] inserting missing {} before {}",
                        table.symbol_name(symbol),
                        table.symbol_name(token.symbol)
                    );
                    return self.resume(advanced.swap_remove(index), lookahead);
                }
            }
        }

        let states = version.states();
        if !token.is_error() {
            for depth in 1..states.len() {
                if stack::accepts(table, &states[..states.len() - depth], token.symbol) {
                    debug!("[RECOVER] popping {} states to accept {}", depth, table.symbol_name(token.symbol));
                    self.cut(&mut version, depth, Vec::new(), &token);
                    self.recovery = RecoveryState::Resynchronized;
                    return self.resume(version, lookahead);
                }
            }
        }

        if token.is_end() {
            return Some(Finish::Root(self.collapse(version, token.start(), &token)));
        }
        self.skip(version, &states, token)
    }

    /// Consume tokens into an error node until one is accepted somewhere on
    /// the stack
    fn skip(&mut self, mut version: StackVersion, states: &[StateId], first: Token) -> Option<Finish> {
        let table = self.table;
        let error_start = first.start();
        let mut position = first.end();
        let mut scanner = first.scanner_after.clone();
        let mut skipped = vec![Subtree::leaf(&first, StateId::RECOVERY, StateId::RECOVERY, false)];
        // Extras seen since the last skipped token; they stay outside the
        // error node if the next token resynchronizes
        let mut extras: Vec<Subtree> = Vec::new();

        loop {
            if let Some(status) = self.interrupted() {
                skipped.append(&mut extras);
                let end = self.end_token();
                self.cut(&mut version, 0, skipped, &end);
                self.versions = vec![version];
                self.position = position;
                return Some(Finish::Interrupted(status));
            }

            let next = self.lexer.lex(position, StateId::RECOVERY, &scanner, false);
            self.stats.tokens_lexed += 1;
            trace!(
                "[RECOVER] lexed {} at {:?}",
                table.symbol_name(next.symbol),
                next.range
            );

            if !next.is_end() && table.is_extra(next.symbol) {
                extras.push(Subtree::leaf(&next, StateId::RECOVERY, StateId::RECOVERY, true));
                position = next.end();
                scanner = next.scanner_after.clone();
                continue;
            }

            if !next.is_error() {
                let depth = (0..states.len())
                    .find(|&depth| stack::accepts(table, &states[..states.len() - depth], next.symbol));
                if let Some(depth) = depth {
                    debug!(
                        "[RECOVER] skipped {} bytes, resuming at {} with {} states popped",
                        u32::from(next.start() - error_start),
                        table.symbol_name(next.symbol),
                        depth
                    );
                    self.cut(&mut version, depth, skipped, &next);
                    for extra in extras {
                        let state = version.top_state();
                        version.push(state, extra);
                    }
                    version.scanner_state = next.scanner_before.clone();
                    self.recovery = RecoveryState::Resynchronized;
                    return self.resume(version, Lookahead::lexed(next));
                }
            }

            if next.is_end() {
                return Some(Finish::Root(self.collapse(version, error_start, &next)));
            }
            skipped.append(&mut extras);
            skipped.push(Subtree::leaf(&next, StateId::RECOVERY, StateId::RECOVERY, false));
            position = next.end();
            scanner = next.scanner_after.clone();
        }
    }

    /// The one terminal whose insertion lets `symbol` be consumed, if there
    /// is exactly one
    fn single_insertion(&self, version: &StackVersion, symbol: Symbol) -> Option<Symbol> {
        let table = self.table;
        let states = version.states();
        let top = version.top_state();
        let mut found = None;
        for candidate in table.terminals() {
            if candidate == Symbol::END || table.is_extra(candidate) || !table.has_actions(top, candidate) {
                continue;
            }
            let mut simulated = states.clone();
            match stack::simulate(table, &mut simulated, candidate, false) {
                Some(Action::Shift(target)) => simulated.push(target),
                _ => continue,
            }
            if stack::simulate(table, &mut simulated, symbol, false).is_some() {
                if found.is_some() {
                    trace!("[RECOVER] more than one insertion fits before {}", table.symbol_name(symbol));
                    return None;
                }
                found = Some(candidate);
            }
        }
        found
    }

    /// Pop `depth` non-extra frames and push them, followed by `skipped`, as
    /// one error node
    fn cut(&mut self, version: &mut StackVersion, depth: usize, skipped: Vec<Subtree>, next: &Token) {
        let mut children = Vec::new();
        let mut removed = 0;
        while removed < depth && version.frames.len() > 1 {
            if let Some(node) = version.frames.pop().and_then(|frame| frame.node) {
                if !node.is_extra() {
                    removed += 1;
                }
                children.push(node);
            }
        }
        children.reverse();
        children.extend(skipped);
        version.lex_override = None;
        if children.is_empty() {
            return;
        }
        let state = version.top_state();
        let node = Subtree::error(children, state, version.end(), next);
        version.push(state, node);
    }

    /// End the parse with an error root holding the stack and a leaf over
    /// everything from `error_start` on
    pub(super) fn collapse(&mut self, version: StackVersion, error_start: TextSize, end: &Token) -> Subtree {
        debug!(
            "[RECOVER] no resynchronization before end of input, {} bytes left unparsed",
            u32::from(end.start() - error_start.min(end.start()))
        );
        let mut nodes = version.into_nodes();
        let len = end.start() - error_start.min(end.start());
        if len > TextSize::from(0) {
            nodes.push(Subtree::error_leaf(len, StateId::RECOVERY, end));
        }
        Subtree::error(nodes, self.table.start_state(), TextSize::from(0), end)
    }

    fn resume(&mut self, version: StackVersion, lookahead: Lookahead) -> Option<Finish> {
        self.position = lookahead.token.start();
        self.versions = vec![version];
        self.pending = Some(lookahead);
        None
    }

    /// A token was consumed normally
    pub(super) fn recovery_succeeded(&mut self) {
        if self.recovery != RecoveryState::Normal {
            trace!("[RECOVER] {:?} -> Normal", self.recovery);
            self.recovery = RecoveryState::Normal;
        }
    }
}
