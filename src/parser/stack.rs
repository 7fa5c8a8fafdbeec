//! Parse stack versions.
//!
//! Each live interpretation of the input owns a [`StackVersion`]. Forking
//! clones the frame vector; the frames hold `Arc`-shared subtrees, so a
//! fork costs one pointer copy per frame.

use crate::base::TextSize;
use crate::grammar::{Action, GrammarTable, RuleId, StateId, Symbol};
use crate::lexer::{ScannerState, Token};
use crate::tree::Subtree;

/// Upper bound on reductions replayed for a single lookahead symbol
const MAX_SIMULATED_REDUCTIONS: usize = 4096;

#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) state: StateId,
    /// `None` only for the bottom frame
    pub(crate) node: Option<Subtree>,
    /// Absolute offset where this frame's node ends
    pub(crate) end: TextSize,
}

impl Frame {
    fn is_extra(&self) -> bool {
        self.node.as_ref().is_some_and(Subtree::is_extra)
    }
}

/// One action taken from a conflicting cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Choice {
    pub(crate) fork: u32,
    pub(crate) action: Action,
    pub(crate) lookahead: Symbol,
}

#[derive(Debug, Clone)]
pub(crate) struct StackVersion {
    pub(crate) frames: Vec<Frame>,
    /// Conflict resolutions since the last time this was the only version
    pub(crate) choices: Vec<Choice>,
    /// Lex the next token in this state instead of the top state. Set after
    /// pushing a reused subtree, whose follower was lexed in a state the
    /// reused stack never enters.
    pub(crate) lex_override: Option<StateId>,
    pub(crate) scanner_state: ScannerState,
    pub(crate) accepted: bool,
}

impl StackVersion {
    pub(crate) fn new(start: StateId) -> Self {
        Self {
            frames: vec![Frame {
                state: start,
                node: None,
                end: TextSize::from(0),
            }],
            choices: Vec::new(),
            lex_override: None,
            scanner_state: ScannerState::EMPTY,
            accepted: false,
        }
    }

    pub(crate) fn top_state(&self) -> StateId {
        self.frames[self.frames.len() - 1].state
    }

    /// State the next token is lexed in
    pub(crate) fn lex_state(&self) -> StateId {
        self.lex_override.unwrap_or(self.top_state())
    }

    pub(crate) fn end(&self) -> TextSize {
        self.frames[self.frames.len() - 1].end
    }

    pub(crate) fn push(&mut self, state: StateId, node: Subtree) {
        let end = self.end() + node.len();
        self.frames.push(Frame {
            state,
            node: Some(node),
            end,
        });
    }

    /// Pop the extras on top of the stack, bottom-most first
    pub(crate) fn pop_trailing_extras(&mut self) -> Vec<Subtree> {
        let mut extras = Vec::new();
        while self.frames.len() > 1 && self.frames[self.frames.len() - 1].is_extra() {
            if let Some(node) = self.frames.pop().and_then(|frame| frame.node) {
                extras.push(node);
            }
        }
        extras.reverse();
        extras
    }

    /// Push `node` beneath any trailing extras, which move onto `state`
    pub(crate) fn push_under_extras(&mut self, state: StateId, node: Subtree) {
        let extras = self.pop_trailing_extras();
        self.push(state, node);
        for extra in extras {
            self.push(state, extra);
        }
    }

    /// States of the bottom frame and every non-extra frame
    pub(crate) fn states(&self) -> Vec<StateId> {
        self.frames
            .iter()
            .filter(|frame| !frame.is_extra())
            .map(|frame| frame.state)
            .collect()
    }

    /// All nodes on the stack, bottom first
    pub(crate) fn into_nodes(self) -> Vec<Subtree> {
        self.frames.into_iter().filter_map(|frame| frame.node).collect()
    }

    /// Versions that will behave identically from here on
    pub(crate) fn same_stack(&self, other: &StackVersion) -> bool {
        self.accepted == other.accepted
            && self.lex_override == other.lex_override
            && self.scanner_state == other.scanner_state
            && self
                .frames
                .iter()
                .filter(|frame| !frame.is_extra())
                .map(|frame| frame.state)
                .eq(other
                    .frames
                    .iter()
                    .filter(|frame| !frame.is_extra())
                    .map(|frame| frame.state))
    }

    /// Offset where the trailing extras begin
    pub(crate) fn end_before_extras(&self) -> TextSize {
        self.frames
            .iter()
            .rev()
            .find(|frame| !frame.is_extra())
            .map_or(TextSize::from(0), |frame| frame.end)
    }

    /// Reduce by `rule` with `next` as lookahead. Returns false, leaving the
    /// stack untouched, when it is too shallow or has no goto for the rule;
    /// only a corrupt table gets there.
    pub(crate) fn reduce(&mut self, table: &GrammarTable, rule_id: RuleId, next: &Token, fragile: bool) -> bool {
        let rule = table.rule(rule_id);

        // Index of the frame the reduced node is pushed onto
        let mut base = self.frames.len() - 1;
        let mut remaining = rule.len as usize;
        while base > 0 && self.frames[base].is_extra() {
            base -= 1;
        }
        let trailing_from = base + 1;
        while remaining > 0 && base > 0 {
            if !self.frames[base].is_extra() {
                remaining -= 1;
            }
            base -= 1;
        }
        if remaining > 0 {
            return false;
        }
        let Some(goto) = table.goto(self.frames[base].state, rule.lhs) else {
            return false;
        };

        let trailing: Vec<Subtree> = self
            .frames
            .drain(trailing_from..)
            .filter_map(|frame| frame.node)
            .collect();
        let children: Vec<Subtree> = self
            .frames
            .drain(base + 1..)
            .filter_map(|frame| frame.node)
            .collect();

        let node = Subtree::node(rule.lhs, Some(rule_id), children, self.frames[base].state, fragile, self.end(), next);
        self.push(goto, node);
        for extra in trailing {
            self.push(goto, extra);
        }
        true
    }
}

/// Replay on a bare state stack the reductions `symbol` triggers, returning
/// the shift or accept that finally consumes it.
///
/// Conflicting cells follow their first action, or fail when `strict`.
/// `states` is left as it stands after the reductions.
pub(crate) fn simulate(
    table: &GrammarTable,
    states: &mut Vec<StateId>,
    symbol: Symbol,
    strict: bool,
) -> Option<Action> {
    for _ in 0..MAX_SIMULATED_REDUCTIONS {
        let state = *states.last()?;
        let actions = table.actions(state, symbol);
        if strict && actions.len() > 1 {
            return None;
        }
        match *actions.first()? {
            Action::Reduce(rule_id) => {
                let rule = table.rule(rule_id);
                let keep = states.len().checked_sub(rule.len as usize).filter(|keep| *keep > 0)?;
                states.truncate(keep);
                let goto = table.goto(states[keep - 1], rule.lhs)?;
                states.push(goto);
            }
            action => return Some(action),
        }
    }
    None
}

/// Whether `symbol` can be consumed on top of `states`
pub(crate) fn accepts(table: &GrammarTable, states: &[StateId], symbol: Symbol) -> bool {
    let mut states = states.to_vec();
    simulate(table, &mut states, symbol, false).is_some()
}
