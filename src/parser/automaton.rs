//! The table-driven GLR automaton.
//!
//! One [`ParseRun`] drives every live [`StackVersion`] over a shared token
//! stream. Each step lexes (or reuses) the next token for each version,
//! applies the table actions, forks on conflicting cells and merges versions
//! that reconverge. When no version can continue, error recovery takes over
//! with the best failed version (see `recovery.rs`).

use super::options::ParseOptions;
use super::ranking::{best_index, compare_versions};
use super::recovery::RecoveryState;
use super::reuse::{Reuse, ReusableNodes};
use super::stack::{Choice, StackVersion};
use super::{ParseStats, ParseStatus};
use crate::base::{LineIndex, TextRange, TextSize};
use crate::grammar::{Action, GrammarTable, StateId, Symbol};
use crate::lexer::{ExternalScanner, Lexer, ScannerState, Token};
use crate::tree::Subtree;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Consecutive zero-width tokens allowed before external scanners are told
/// to consume input
const MAX_EMPTY_TOKENS: usize = 32;

/// Reductions allowed across all versions for a single token
pub(super) const MAX_REDUCTIONS_PER_TOKEN: usize = 16_384;

/// The next token as seen by one version
#[derive(Debug, Clone)]
pub(super) struct Lookahead {
    pub(super) token: Token,
    /// Old-tree leaf standing in for a lexed token
    pub(super) reused: Option<Subtree>,
    /// Zero-width token inserted by recovery
    pub(super) missing: bool,
}

impl Lookahead {
    pub(super) fn lexed(token: Token) -> Self {
        Self {
            token,
            reused: None,
            missing: false,
        }
    }

    /// A zero-width `symbol` placed just before `next`
    pub(super) fn missing(symbol: Symbol, next: &Token) -> Self {
        Self {
            token: Token {
                symbol,
                range: TextRange::empty(next.start()),
                point: next.point,
                lookahead_end: next.lookahead_end,
                lex_state: next.lex_state,
                keyword: false,
                external: false,
                scanner_before: next.scanner_before.clone(),
                scanner_after: next.scanner_before.clone(),
            },
            reused: None,
            missing: true,
        }
    }
}

pub(super) enum Finish {
    Root(Subtree),
    Interrupted(ParseStatus),
}

pub(super) struct RunOutput {
    pub(super) root: Subtree,
    pub(super) status: ParseStatus,
    pub(super) stats: ParseStats,
}

pub(super) struct ParseRun<'a> {
    pub(super) table: &'a GrammarTable,
    pub(super) source: &'a [u8],
    pub(super) line_index: &'a LineIndex,
    pub(super) lexer: Lexer<'a>,
    pub(super) options: &'a ParseOptions,
    pub(super) reuse: Option<ReusableNodes<'a>>,
    pub(super) versions: Vec<StackVersion>,
    /// Token to process next instead of lexing, left by recovery
    pub(super) pending: Option<Lookahead>,
    /// Where the next token starts
    pub(super) position: TextSize,
    pub(super) stats: ParseStats,
    pub(super) status: ParseStatus,
    pub(super) recovery: RecoveryState,
    /// Recovery attempts at one offset
    pub(super) recoveries_here: (TextSize, usize),
    next_fork: u32,
    /// Token count when more than one version became alive
    forked_at: Option<usize>,
    tokens_seen: usize,
    empty_streak: usize,
    deadline: Option<Instant>,
}

impl<'a> ParseRun<'a> {
    pub(super) fn new(
        table: &'a GrammarTable,
        source: &'a [u8],
        line_index: &'a LineIndex,
        scanner: Option<&'a mut (dyn ExternalScanner + 'static)>,
        options: &'a ParseOptions,
        reuse: Option<ReusableNodes<'a>>,
    ) -> Self {
        let deadline = options
            .timeout
            .and_then(|timeout| Instant::now().checked_add(timeout));
        Self {
            table,
            source,
            line_index,
            lexer: Lexer::new(table, source, line_index).with_scanner(scanner),
            options,
            reuse,
            versions: vec![StackVersion::new(table.start_state())],
            pending: None,
            position: TextSize::from(0),
            stats: ParseStats::default(),
            status: ParseStatus::Complete,
            recovery: RecoveryState::Normal,
            recoveries_here: (TextSize::from(0), 0),
            next_fork: 0,
            forked_at: None,
            tokens_seen: 0,
            empty_streak: 0,
            deadline,
        }
    }

    pub(super) fn run(mut self) -> RunOutput {
        debug!(
            "[PARSE] {} bytes with {}{}",
            self.source.len(),
            self.table.name(),
            if self.reuse.is_some() { " (incremental)" } else { "" }
        );
        loop {
            if let Some(status) = self.interrupted() {
                return self.interrupt(status);
            }

            let lookaheads = match self.pending.take() {
                Some(lookahead) => vec![lookahead],
                None if self.versions.len() == 1 => match self.try_reuse() {
                    Reuse::Node => continue,
                    Reuse::Leaf(lookahead) => vec![lookahead],
                    Reuse::Nothing => self.lex_all(),
                },
                None => self.lex_all(),
            };
            self.tokens_seen += 1;

            match self.step(lookaheads) {
                None => {}
                Some(Finish::Root(root)) => return self.output(root),
                Some(Finish::Interrupted(status)) => return self.interrupt(status),
            }
        }
    }

    fn output(self, root: Subtree) -> RunOutput {
        debug!(
            "[PARSE] done: {} tokens lexed, {} subtrees reused, {} recoveries",
            self.stats.tokens_lexed, self.stats.subtrees_reused, self.stats.recoveries
        );
        RunOutput {
            root,
            status: self.status,
            stats: self.stats,
        }
    }

    pub(super) fn interrupted(&self) -> Option<ParseStatus> {
        if self
            .options
            .cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
        {
            return Some(ParseStatus::Cancelled);
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Some(ParseStatus::TimedOut);
        }
        None
    }

    /// Close the parse early. Whatever the best version built is kept and
    /// the unread remainder becomes one error leaf.
    fn interrupt(mut self, status: ParseStatus) -> RunOutput {
        warn!("[PARSE] stopped at byte {}: {:?}", u32::from(self.position), status);
        self.status = status;
        let end = self.end_token();
        let mut nodes = match best_index(self.table, self.options.conflict_policy, &self.versions) {
            Some(index) => self.versions.swap_remove(index).into_nodes(),
            None => Vec::new(),
        };
        let consumed: TextSize = nodes.iter().map(Subtree::len).sum();
        let remainder = end.start() - consumed.min(end.start());
        if remainder > TextSize::from(0) {
            nodes.push(Subtree::error_leaf(remainder, StateId::RECOVERY, &end));
        }
        let root = Subtree::error(nodes, self.table.start_state(), TextSize::from(0), &end);
        self.output(root)
    }

    /// A synthetic end-of-input token
    pub(super) fn end_token(&self) -> Token {
        let end = TextSize::from(self.source.len() as u32);
        Token {
            symbol: Symbol::END,
            range: TextRange::empty(end),
            point: self.line_index.point(end),
            lookahead_end: end + TextSize::from(1),
            lex_state: StateId::RECOVERY,
            keyword: false,
            external: false,
            scanner_before: ScannerState::EMPTY,
            scanner_after: ScannerState::EMPTY,
        }
    }

    // =========================================================================
    // Lexing
    // =========================================================================

    /// Lex the next token for every version. Versions whose token would end
    /// somewhere else than the lead version's are dropped.
    fn lex_all(&mut self) -> Vec<Lookahead> {
        let allow_empty = self.empty_streak < MAX_EMPTY_TOKENS;
        let mut lexed: Vec<(StateId, ScannerState, Token)> = Vec::new();
        let mut tokens = Vec::with_capacity(self.versions.len());
        for version in &self.versions {
            let state = version.lex_state();
            let cached = lexed
                .iter()
                .find(|(s, scanner, _)| *s == state && *scanner == version.scanner_state);
            let token = match cached {
                Some((_, _, token)) => token.clone(),
                None => {
                    let token = self
                        .lexer
                        .lex(self.position, state, &version.scanner_state, allow_empty);
                    self.stats.tokens_lexed += 1;
                    trace!(
                        "[PARSE] lexed {} at {:?} in state {}",
                        self.table.symbol_name(token.symbol),
                        token.range,
                        state
                    );
                    lexed.push((state, version.scanner_state.clone(), token.clone()));
                    token
                }
            };
            tokens.push(token);
        }

        let Some(lead_end) = tokens.first().map(Token::end) else {
            return Vec::new();
        };
        let versions = std::mem::take(&mut self.versions);
        let mut lookaheads = Vec::with_capacity(tokens.len());
        for (version, token) in versions.into_iter().zip(tokens) {
            if token.end() == lead_end {
                self.versions.push(version);
                lookaheads.push(Lookahead::lexed(token));
            } else {
                debug!(
                    "[PARSE] dropping a version whose token ends at {} instead of {}",
                    u32::from(token.end()),
                    u32::from(lead_end)
                );
                self.stats.versions_pruned += 1;
            }
        }
        lookaheads
    }

    // =========================================================================
    // Actions
    // =========================================================================

    /// Feed one lookahead (per version) through every version
    fn step(&mut self, lookaheads: Vec<Lookahead>) -> Option<Finish> {
        let multiple = self.versions.len() > 1;
        let versions = std::mem::take(&mut self.versions);
        let mut advanced = Vec::new();
        let mut failed = Vec::new();
        for (version, lookahead) in versions.into_iter().zip(&lookaheads) {
            let (ok, errored) = self.advance(version, lookahead, multiple);
            advanced.extend(ok);
            failed.extend(errored.into_iter().map(|version| (version, lookahead)));
        }

        if advanced.is_empty() {
            let policy = self.options.conflict_policy;
            let Some(index) = best_index(self.table, policy, failed.iter().map(|(version, _)| version)) else {
                let end = self.end_token();
                let empty = StackVersion::new(self.table.start_state());
                return Some(Finish::Root(self.collapse(empty, TextSize::from(0), &end)));
            };
            self.stats.versions_pruned += failed.len() - 1;
            let (version, lookahead) = failed.swap_remove(index);
            let lookahead = lookahead.clone();
            return self.recover(version, lookahead);
        }
        if !failed.is_empty() {
            trace!("[PARSE] {} versions failed on this token", failed.len());
            self.stats.versions_pruned += failed.len();
        }
        self.recovery_succeeded();

        let lead = &lookaheads[0].token;
        if lead.is_empty() && !lead.is_end() {
            self.empty_streak += 1;
        } else {
            self.empty_streak = 0;
        }

        let mut advanced = self.merge(advanced);
        if advanced.iter().any(|version| version.accepted) {
            advanced.retain(|version| version.accepted);
            let index = best_index(self.table, self.options.conflict_policy, &advanced).unwrap_or(0);
            let version = advanced.swap_remove(index);
            return Some(Finish::Root(self.accept(version, lead)));
        }

        self.position = lead.end();
        self.versions = advanced;
        self.limit_versions();
        None
    }

    /// Apply every action for `lookahead` to `version`, following reductions
    /// until each branch shifts, accepts or fails.
    pub(super) fn advance(
        &mut self,
        version: StackVersion,
        lookahead: &Lookahead,
        multiple: bool,
    ) -> (Vec<StackVersion>, Vec<StackVersion>) {
        let table = self.table;
        let symbol = lookahead.token.symbol;
        let mut pending = vec![(version, false)];
        let mut advanced = Vec::new();
        let mut failed = Vec::new();
        let mut reductions = 0;

        while let Some((mut version, conflicted)) = pending.pop() {
            let state = version.top_state();
            let actions = table.actions(state, symbol);
            if actions.is_empty() {
                if table.is_extra(symbol) && !lookahead.missing {
                    self.shift_extra(&mut version, lookahead);
                    advanced.push(version);
                } else {
                    failed.push(version);
                }
                continue;
            }

            let fork = if actions.len() > 1 {
                let id = self.next_fork;
                self.next_fork += 1;
                self.stats.forks_created += actions.len() - 1;
                debug!(
                    "[PARSE] {} actions for {} in state {}, forking",
                    actions.len(),
                    table.symbol_name(symbol),
                    state
                );
                Some(id)
            } else {
                None
            };

            let mut branches = Vec::with_capacity(actions.len());
            for _ in 1..actions.len() {
                branches.push(version.clone());
            }
            branches.push(version);

            for (mut branch, &action) in branches.into_iter().zip(actions) {
                if let Some(fork) = fork {
                    branch.choices.push(Choice {
                        fork,
                        action,
                        lookahead: symbol,
                    });
                }
                match action {
                    Action::Shift(target) => {
                        self.shift(&mut branch, state, target, lookahead);
                        advanced.push(branch);
                    }
                    Action::Reduce(rule) => {
                        reductions += 1;
                        let in_conflict = conflicted || fork.is_some();
                        if reductions > MAX_REDUCTIONS_PER_TOKEN {
                            warn!("[PARSE] reduction limit reached in state {}", state);
                            failed.push(branch);
                        } else if branch.reduce(table, rule, &lookahead.token, multiple || in_conflict) {
                            pending.push((branch, in_conflict));
                        } else {
                            failed.push(branch);
                        }
                    }
                    Action::Accept => {
                        branch.accepted = true;
                        advanced.push(branch);
                    }
                }
            }
        }
        (advanced, failed)
    }

    fn shift(&mut self, version: &mut StackVersion, state: StateId, target: StateId, lookahead: &Lookahead) {
        let token = &lookahead.token;
        if lookahead.missing {
            trace!("[RECOVER] shifting missing {}", self.table.symbol_name(token.symbol));
            let node = Subtree::missing(token.symbol, version.end_before_extras(), state, target, token);
            version.push_under_extras(target, node);
        } else {
            let node = match &lookahead.reused {
                Some(leaf) if leaf.parse_state() == state && leaf.follow_state() == target => leaf.clone(),
                _ => Subtree::leaf(token, state, target, false),
            };
            version.push(target, node);
            version.scanner_state = token.scanner_after.clone();
        }
        version.lex_override = None;
    }

    /// Extras keep the parse state; the next token is lexed where this one was
    fn shift_extra(&mut self, version: &mut StackVersion, lookahead: &Lookahead) {
        let state = version.top_state();
        let follow = version.lex_state();
        let token = &lookahead.token;
        let node = match &lookahead.reused {
            Some(leaf) if leaf.is_extra() && leaf.parse_state() == state && leaf.follow_state() == follow => {
                leaf.clone()
            }
            _ => Subtree::leaf(token, state, follow, true),
        };
        version.push(state, node);
        version.scanner_state = token.scanner_after.clone();
    }

    /// Collapse versions with identical futures into the better-ranked one
    fn merge(&mut self, versions: Vec<StackVersion>) -> Vec<StackVersion> {
        let policy = self.options.conflict_policy;
        let mut merged: Vec<StackVersion> = Vec::with_capacity(versions.len());
        for version in versions {
            match merged.iter_mut().find(|existing| existing.same_stack(&version)) {
                Some(existing) => {
                    trace!("[PARSE] merging versions in state {}", version.top_state());
                    self.stats.versions_merged += 1;
                    if compare_versions(self.table, policy, &version, existing).is_gt() {
                        *existing = version;
                    }
                }
                None => merged.push(version),
            }
        }
        merged
    }

    fn limit_versions(&mut self) {
        if self.versions.len() <= 1 {
            self.settle();
            return;
        }
        let forked_at = *self.forked_at.get_or_insert(self.tokens_seen);
        if self.tokens_seen - forked_at >= self.options.fork_window {
            debug!(
                "[PARSE] {} versions did not reconverge within {} tokens, keeping the best",
                self.versions.len(),
                self.options.fork_window
            );
            self.keep_best(1);
            return;
        }
        let limit = self.options.max_forks.max(1);
        if self.versions.len() > limit {
            warn!(
                "[PARSE] {} parse versions exceed the limit of {}, pruning the worst",
                self.versions.len(),
                limit
            );
            self.keep_best(limit);
            if self.status == ParseStatus::Complete {
                self.status = ParseStatus::ForksPruned { limit };
            }
        }
    }

    /// Keep the `count` best versions, chosen one at a time since ranking
    /// only orders versions that share a fork
    fn keep_best(&mut self, count: usize) {
        let policy = self.options.conflict_policy;
        let mut remaining = std::mem::take(&mut self.versions);
        while self.versions.len() < count {
            let Some(index) = best_index(self.table, policy, &remaining) else {
                break;
            };
            self.versions.push(remaining.swap_remove(index));
        }
        self.stats.versions_pruned += remaining.len();
        if self.versions.len() <= 1 {
            self.settle();
        }
    }

    /// Back to a single version: its past choices no longer compete
    fn settle(&mut self) {
        self.forked_at = None;
        if let Some(version) = self.versions.first_mut() {
            version.choices.clear();
        }
    }

    /// Build the root from an accepted version. Extras before and after the
    /// start symbol's node become its first and last children.
    fn accept(&mut self, version: StackVersion, end: &Token) -> Subtree {
        let mut nodes = version.into_nodes();
        let main: Vec<usize> = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| !node.is_extra())
            .map(|(index, _)| index)
            .collect();
        trace!("[PARSE] accepted with {} top-level nodes", nodes.len());

        match main.as_slice() {
            [index] if nodes.len() == 1 => nodes.swap_remove(*index),
            [index] => {
                let root = nodes[*index].clone();
                let mut children = Vec::with_capacity(nodes.len() + root.child_count());
                for (position, node) in nodes.into_iter().enumerate() {
                    if position == *index {
                        children.extend(root.children().iter().cloned());
                    } else {
                        children.push(node);
                    }
                }
                Subtree::node(
                    root.symbol(),
                    root.rule(),
                    children,
                    self.table.start_state(),
                    root.is_fragile(),
                    TextSize::from(0),
                    end,
                )
            }
            _ => Subtree::error(nodes, self.table.start_state(), TextSize::from(0), end),
        }
    }
}
