//! The validated, immutable grammar table.
//!
//! [`TableData`] is the raw layout a table compiler emits; [`GrammarTable`]
//! wraps it after validation together with lookups derived at load time.
//! Once built, a table is never mutated and may be shared by any number of
//! concurrent parses.

use super::action::{Action, Rule, RuleId, StateId};
use super::error::{ABI_VERSION, MIN_ABI_VERSION, TableError};
use super::lex_table::{LexState, LexStateId};
use super::symbol::{FieldId, Symbol, SymbolInfo, SymbolKind};
use rustc_hash::FxHashMap;
use smol_str::SmolStr;

/// One row of the parse table
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateData {
    /// DFA start state used to lex tokens in this parse state
    pub lex_state: LexStateId,
    /// One cell per terminal. Empty cells are errors; cells with more than
    /// one action are declared conflicts.
    pub actions: Vec<Vec<Action>>,
    /// One entry per non-terminal
    pub gotos: Vec<Option<StateId>>,
}

/// Raw grammar table as produced by a table compiler
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableData {
    pub name: SmolStr,
    pub abi_version: u32,
    pub symbols: Vec<SymbolInfo>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub fields: Vec<SmolStr>,
    pub rules: Vec<Rule>,
    pub states: Vec<StateData>,
    pub lex_states: Vec<LexState>,
    pub start_state: StateId,
    pub start_symbol: Symbol,
    #[cfg_attr(feature = "serde", serde(default))]
    pub error_lex_state: Option<LexStateId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub word_token: Option<Symbol>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub keyword_lex_state: Option<LexStateId>,
}

/// A validated grammar table
#[derive(Debug)]
pub struct GrammarTable {
    data: TableData,
    terminal_count: usize,
    valid_externals: Vec<Box<[Symbol]>>,
    all_externals: Box<[Symbol]>,
    symbols_by_name: FxHashMap<(SmolStr, bool), Symbol>,
    fields_by_name: FxHashMap<SmolStr, FieldId>,
}

impl GrammarTable {
    /// Validate raw table data.
    pub fn new(data: TableData) -> Result<Self, TableError> {
        let terminal_count = validate(&data)?;

        let valid_externals = data
            .states
            .iter()
            .map(|state| {
                data.symbols[..terminal_count]
                    .iter()
                    .enumerate()
                    .filter(|(index, info)| {
                        info.kind == SymbolKind::External
                            && (info.extra || !state.actions[*index].is_empty())
                    })
                    .map(|(index, _)| Symbol::new(index as u16))
                    .collect()
            })
            .collect();

        let all_externals = data
            .symbols
            .iter()
            .enumerate()
            .filter(|(_, info)| info.kind == SymbolKind::External)
            .map(|(index, _)| Symbol::new(index as u16))
            .collect();

        let mut symbols_by_name = FxHashMap::default();
        for (index, info) in data.symbols.iter().enumerate() {
            symbols_by_name
                .entry((info.name.clone(), info.named))
                .or_insert(Symbol::new(index as u16));
        }

        let fields_by_name = data
            .fields
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), FieldId::new(index as u16)))
            .collect();

        Ok(Self {
            data,
            terminal_count,
            valid_externals,
            all_externals,
            symbols_by_name,
            fields_by_name,
        })
    }

    pub fn data(&self) -> &TableData {
        &self.data
    }

    pub fn name(&self) -> &str {
        &self.data.name
    }

    pub fn abi_version(&self) -> u32 {
        self.data.abi_version
    }

    // =========================================================================
    // Symbols
    // =========================================================================

    pub fn symbol_count(&self) -> usize {
        self.data.symbols.len()
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    /// Terminal symbols in id order, END first
    pub fn terminals(&self) -> impl Iterator<Item = Symbol> + '_ {
        (0..self.terminal_count).map(|index| Symbol::new(index as u16))
    }

    pub fn symbol_info(&self, symbol: Symbol) -> Option<&SymbolInfo> {
        self.data.symbols.get(symbol.index())
    }

    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match self.symbol_info(symbol) {
            Some(info) => &info.name,
            None => "ERROR",
        }
    }

    /// Look up a symbol by name; `named` tells `number` apart from `"number"`.
    pub fn symbol_for_name(&self, name: &str, named: bool) -> Option<Symbol> {
        self.symbols_by_name
            .get(&(SmolStr::new(name), named))
            .copied()
    }

    pub fn is_terminal(&self, symbol: Symbol) -> bool {
        symbol.is_error() || symbol.index() < self.terminal_count
    }

    pub fn is_named(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol).is_none_or(|info| info.named)
    }

    pub fn is_extra(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol).is_some_and(|info| info.extra)
    }

    pub fn is_external(&self, symbol: Symbol) -> bool {
        self.symbol_info(symbol)
            .is_some_and(|info| info.kind == SymbolKind::External)
    }

    pub fn precedence(&self, symbol: Symbol) -> i32 {
        self.symbol_info(symbol).map_or(0, |info| info.precedence)
    }

    pub fn start_symbol(&self) -> Symbol {
        self.data.start_symbol
    }

    // =========================================================================
    // Fields
    // =========================================================================

    pub fn field_name(&self, field: FieldId) -> Option<&str> {
        self.data.fields.get(field.index()).map(SmolStr::as_str)
    }

    pub fn field_id(&self, name: &str) -> Option<FieldId> {
        self.fields_by_name.get(name).copied()
    }

    // =========================================================================
    // Parse table
    // =========================================================================

    pub fn state_count(&self) -> usize {
        self.data.states.len()
    }

    pub fn start_state(&self) -> StateId {
        self.data.start_state
    }

    /// Action cell for `(state, terminal)`. Empty for non-terminals, the
    /// error symbol, and the recovery pseudo-state.
    pub fn actions(&self, state: StateId, symbol: Symbol) -> &[Action] {
        if symbol.index() >= self.terminal_count {
            return &[];
        }
        self.data
            .states
            .get(state.index())
            .map_or(&[], |row| row.actions[symbol.index()].as_slice())
    }

    pub fn has_actions(&self, state: StateId, symbol: Symbol) -> bool {
        !self.actions(state, symbol).is_empty()
    }

    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        let column = symbol.index().checked_sub(self.terminal_count)?;
        self.data.states.get(state.index())?.gotos.get(column).copied()?
    }

    pub fn rule(&self, rule: RuleId) -> &Rule {
        &self.data.rules[rule.index()]
    }

    pub fn rule_count(&self) -> usize {
        self.data.rules.len()
    }

    // =========================================================================
    // Lexing
    // =========================================================================

    /// DFA start state for lexing in `state`. The recovery pseudo-state
    /// lexes with the error lex state when the grammar provides one.
    pub fn lex_mode(&self, state: StateId) -> LexStateId {
        match self.data.states.get(state.index()) {
            Some(row) => row.lex_state,
            None => self
                .data
                .error_lex_state
                .unwrap_or(self.data.states[self.data.start_state.index()].lex_state),
        }
    }

    pub fn lex_state(&self, id: LexStateId) -> &LexState {
        &self.data.lex_states[id.index()]
    }

    pub fn error_lex_state(&self) -> Option<LexStateId> {
        self.data.error_lex_state
    }

    pub fn word_token(&self) -> Option<Symbol> {
        self.data.word_token
    }

    pub fn keyword_lex_state(&self) -> Option<LexStateId> {
        self.data.keyword_lex_state
    }

    /// External tokens the scanner may return in `state`. Every external
    /// token is valid in the recovery pseudo-state.
    pub fn valid_externals(&self, state: StateId) -> &[Symbol] {
        match self.valid_externals.get(state.index()) {
            Some(valid) => valid,
            None => &self.all_externals,
        }
    }

    pub fn has_externals(&self) -> bool {
        !self.all_externals.is_empty()
    }
}

/// Check every structural invariant; returns the terminal count.
fn validate(data: &TableData) -> Result<usize, TableError> {
    if !(MIN_ABI_VERSION..=ABI_VERSION).contains(&data.abi_version) {
        return Err(TableError::UnsupportedAbi {
            found: data.abi_version,
        });
    }

    // Symbols
    let Some(first) = data.symbols.first() else {
        return Err(TableError::NoSymbols);
    };
    if data.symbols.len() >= u16::MAX as usize {
        return Err(TableError::TooManySymbols {
            count: data.symbols.len(),
        });
    }
    if first.kind != SymbolKind::Terminal {
        return Err(TableError::EndNotFirst {
            symbol: Symbol::END,
        });
    }
    let terminal_count = data
        .symbols
        .iter()
        .position(|info| info.kind == SymbolKind::NonTerminal)
        .unwrap_or(data.symbols.len());
    for (index, info) in data.symbols.iter().enumerate() {
        let symbol = Symbol::new(index as u16);
        if index > terminal_count && info.kind.is_terminal() {
            return Err(TableError::SymbolOrder { symbol });
        }
        if info.extra && !info.kind.is_terminal() {
            return Err(TableError::NonTerminalExtra { symbol });
        }
    }
    let nonterminal_count = data.symbols.len() - terminal_count;
    let is_nonterminal = |symbol: Symbol| {
        symbol.index() >= terminal_count && symbol.index() < data.symbols.len()
    };
    let is_lexical = |symbol: Symbol| {
        data.symbols
            .get(symbol.index())
            .is_some_and(|info| info.kind == SymbolKind::Terminal)
            && symbol != Symbol::END
    };

    // Rules
    for (index, rule) in data.rules.iter().enumerate() {
        let id = RuleId::new(index as u16);
        if !is_nonterminal(rule.lhs) {
            return Err(TableError::RuleLhs {
                rule: id,
                symbol: rule.lhs,
            });
        }
        for &(child, field) in &rule.fields {
            if child >= rule.len || field.index() >= data.fields.len() {
                return Err(TableError::RuleField {
                    rule: id,
                    child,
                    field: field.index() as u16,
                    len: rule.len,
                });
            }
        }
    }

    // Parse states
    if data.states.is_empty() {
        return Err(TableError::NoStates);
    }
    if data.start_state.index() >= data.states.len() {
        return Err(TableError::StartState(data.start_state));
    }
    if !is_nonterminal(data.start_symbol) {
        return Err(TableError::StartSymbol(data.start_symbol));
    }
    for (index, row) in data.states.iter().enumerate() {
        let state = StateId::new(index as u16);
        if row.actions.len() != terminal_count {
            return Err(TableError::ActionRowWidth {
                state,
                found: row.actions.len(),
                expected: terminal_count,
            });
        }
        if row.gotos.len() != nonterminal_count {
            return Err(TableError::GotoRowWidth {
                state,
                found: row.gotos.len(),
                expected: nonterminal_count,
            });
        }
        if row.lex_state.index() >= data.lex_states.len() {
            return Err(TableError::LexMode {
                state,
                lex_state: row.lex_state,
            });
        }
        for (column, cell) in row.actions.iter().enumerate() {
            let symbol = Symbol::new(column as u16);
            for action in cell {
                match *action {
                    Action::Shift(target) if target.index() >= data.states.len() => {
                        return Err(TableError::ShiftTarget {
                            state,
                            symbol,
                            target,
                        });
                    }
                    Action::Reduce(rule) if rule.index() >= data.rules.len() => {
                        return Err(TableError::ReduceRule {
                            state,
                            symbol,
                            rule,
                        });
                    }
                    Action::Accept if symbol != Symbol::END => {
                        return Err(TableError::AcceptSymbol { state, symbol });
                    }
                    _ => {}
                }
            }
        }
        for (column, target) in row.gotos.iter().enumerate() {
            match *target {
                Some(target) if target.index() >= data.states.len() => {
                    return Err(TableError::ShiftTarget {
                        state,
                        symbol: Symbol::new((terminal_count + column) as u16),
                        target,
                    });
                }
                _ => {}
            }
        }
    }

    // Lex states
    for (index, lex_state) in data.lex_states.iter().enumerate() {
        let id = LexStateId::new(index as u16);
        for transition in &lex_state.transitions {
            if transition.target.index() >= data.lex_states.len() {
                return Err(TableError::LexTarget {
                    lex_state: id,
                    target: transition.target,
                });
            }
        }
        if let Some(byte) = lex_state.overlapping_byte() {
            return Err(TableError::LexOverlap { lex_state: id, byte });
        }
        match lex_state.accept {
            Some(symbol) if !is_lexical(symbol) => {
                return Err(TableError::LexAccept {
                    lex_state: id,
                    symbol,
                });
            }
            _ => {}
        }
    }
    for id in [data.error_lex_state, data.keyword_lex_state]
        .into_iter()
        .flatten()
    {
        if id.index() >= data.lex_states.len() {
            return Err(TableError::UnknownLexState(id));
        }
    }
    match data.word_token {
        Some(word) if !is_lexical(word) => return Err(TableError::WordToken(word)),
        None if data.keyword_lex_state.is_some() => {
            return Err(TableError::KeywordsWithoutWord);
        }
        _ => {}
    }

    // Every reachable state must be able to act on something
    let mut reachable = vec![false; data.states.len()];
    let mut queue = vec![data.start_state];
    reachable[data.start_state.index()] = true;
    while let Some(state) = queue.pop() {
        let row = &data.states[state.index()];
        if row.actions.iter().all(Vec::is_empty) {
            return Err(TableError::DeadState { state });
        }
        let shifts = row.actions.iter().flatten().filter_map(|action| match action {
            Action::Shift(target) => Some(*target),
            _ => None,
        });
        for target in shifts.chain(row.gotos.iter().flatten().copied()) {
            if !reachable[target.index()] {
                reachable[target.index()] = true;
                queue.push(target);
            }
        }
    }

    Ok(terminal_count)
}
