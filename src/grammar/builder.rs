//! Programmatic table assembly.
//!
//! Table compilers normally emit [`TableData`] directly. The builder exists
//! for hosts that generate small tables at runtime and for tests, where
//! writing dense action rows by hand would be unreadable.

use super::action::{Action, Rule, RuleId, StateId};
use super::error::{ABI_VERSION, TableError};
use super::lex_table::{LexState, LexStateId, LexTransition};
use super::symbol::{FieldId, Symbol, SymbolInfo, SymbolKind};
use super::table::{GrammarTable, StateData, TableData};
use smol_str::SmolStr;

/// Incrementally assembles a [`GrammarTable`]
///
/// Symbols must be declared terminals first, then non-terminals; the
/// validator rejects any other order. Action and goto rows are sized when
/// [`build`](Self::build) runs, so states may be declared before all
/// symbols are known.
#[derive(Debug, Clone)]
pub struct GrammarTableBuilder {
    name: SmolStr,
    symbols: Vec<SymbolInfo>,
    fields: Vec<SmolStr>,
    rules: Vec<Rule>,
    states: Vec<PendingState>,
    lex_states: Vec<LexState>,
    start_state: StateId,
    start_symbol: Option<Symbol>,
    error_lex_state: Option<LexStateId>,
    word_token: Option<Symbol>,
    keyword_lex_state: Option<LexStateId>,
}

#[derive(Debug, Clone)]
struct PendingState {
    lex_state: LexStateId,
    actions: Vec<(Symbol, Action)>,
    gotos: Vec<(Symbol, StateId)>,
}

impl GrammarTableBuilder {
    /// Start a table; symbol 0 is the end-of-input terminal.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            symbols: vec![SymbolInfo::new("end", SymbolKind::Terminal).anonymous()],
            fields: Vec::new(),
            rules: Vec::new(),
            states: Vec::new(),
            lex_states: Vec::new(),
            start_state: StateId::new(0),
            start_symbol: None,
            error_lex_state: None,
            word_token: None,
            keyword_lex_state: None,
        }
    }

    // =========================================================================
    // Symbols and fields
    // =========================================================================

    pub fn symbol(&mut self, info: SymbolInfo) -> Symbol {
        self.symbols.push(info);
        Symbol::new((self.symbols.len() - 1) as u16)
    }

    /// Named terminal such as `identifier`
    pub fn terminal(&mut self, name: &str) -> Symbol {
        self.symbol(SymbolInfo::new(name, SymbolKind::Terminal))
    }

    /// Anonymous terminal such as `"+"`
    pub fn token(&mut self, literal: &str) -> Symbol {
        self.symbol(SymbolInfo::new(literal, SymbolKind::Terminal).anonymous())
    }

    pub fn external(&mut self, name: &str) -> Symbol {
        self.symbol(SymbolInfo::new(name, SymbolKind::External))
    }

    pub fn non_terminal(&mut self, name: &str) -> Symbol {
        self.symbol(SymbolInfo::new(name, SymbolKind::NonTerminal))
    }

    pub fn field(&mut self, name: &str) -> FieldId {
        if let Some(index) = self.fields.iter().position(|field| field == name) {
            return FieldId::new(index as u16);
        }
        self.fields.push(SmolStr::new(name));
        FieldId::new((self.fields.len() - 1) as u16)
    }

    pub fn rule(&mut self, rule: Rule) -> RuleId {
        self.rules.push(rule);
        RuleId::new((self.rules.len() - 1) as u16)
    }

    // =========================================================================
    // Parse states
    // =========================================================================

    /// Declare a parse state that lexes with `lex_state`
    pub fn state(&mut self, lex_state: LexStateId) -> StateId {
        self.states.push(PendingState {
            lex_state,
            actions: Vec::new(),
            gotos: Vec::new(),
        });
        StateId::new((self.states.len() - 1) as u16)
    }

    /// Append an action to a cell; a second action declares a conflict.
    pub fn action(&mut self, state: StateId, symbol: Symbol, action: Action) -> &mut Self {
        self.states[state.index()].actions.push((symbol, action));
        self
    }

    pub fn shift(&mut self, state: StateId, symbol: Symbol, target: StateId) -> &mut Self {
        self.action(state, symbol, Action::Shift(target))
    }

    pub fn reduce(&mut self, state: StateId, symbols: &[Symbol], rule: RuleId) -> &mut Self {
        for &symbol in symbols {
            self.action(state, symbol, Action::Reduce(rule));
        }
        self
    }

    pub fn accept(&mut self, state: StateId) -> &mut Self {
        self.action(state, Symbol::END, Action::Accept)
    }

    pub fn goto(&mut self, state: StateId, symbol: Symbol, target: StateId) -> &mut Self {
        self.states[state.index()].gotos.push((symbol, target));
        self
    }

    pub fn start(&mut self, state: StateId, symbol: Symbol) -> &mut Self {
        self.start_state = state;
        self.start_symbol = Some(symbol);
        self
    }

    // =========================================================================
    // Lexing
    // =========================================================================

    pub fn lex_state(&mut self) -> LexStateId {
        self.lex_states.push(LexState::default());
        LexStateId::new((self.lex_states.len() - 1) as u16)
    }

    pub fn lex_transition(
        &mut self,
        from: LexStateId,
        min: u8,
        max: u8,
        target: LexStateId,
    ) -> &mut Self {
        self.lex_states[from.index()]
            .transitions
            .push(LexTransition { min, max, target });
        self
    }

    pub fn lex_accept(&mut self, state: LexStateId, symbol: Symbol) -> &mut Self {
        self.lex_states[state.index()].accept = Some(symbol);
        self
    }

    /// Recognise `literal` from `start`, sharing single-byte transitions
    /// that already exist. Returns the accepting state.
    pub fn lex_literal(&mut self, start: LexStateId, literal: &[u8], accept: Symbol) -> LexStateId {
        let mut current = start;
        for &byte in literal {
            let existing = self.lex_states[current.index()]
                .transitions
                .iter()
                .find(|transition| transition.min == byte && transition.max == byte)
                .map(|transition| transition.target);
            current = match existing {
                Some(next) => next,
                None => {
                    let next = self.lex_state();
                    self.lex_transition(current, byte, byte, next);
                    next
                }
            };
        }
        self.lex_accept(current, accept);
        current
    }

    /// Recognise one or more bytes drawn from `ranges`. Returns the looping
    /// accepting state so callers can attach further transitions.
    pub fn lex_repeat(&mut self, start: LexStateId, ranges: &[(u8, u8)], accept: Symbol) -> LexStateId {
        let looping = self.lex_state();
        for &(min, max) in ranges {
            self.lex_transition(start, min, max, looping);
            self.lex_transition(looping, min, max, looping);
        }
        self.lex_accept(looping, accept);
        looping
    }

    pub fn error_lex_state(&mut self, state: LexStateId) -> &mut Self {
        self.error_lex_state = Some(state);
        self
    }

    /// Enable keyword extraction: words matched as `word` are re-lexed with
    /// `keywords` to find reserved words.
    pub fn keywords(&mut self, word: Symbol, keywords: LexStateId) -> &mut Self {
        self.word_token = Some(word);
        self.keyword_lex_state = Some(keywords);
        self
    }

    // =========================================================================
    // Output
    // =========================================================================

    /// Lay out dense rows without validating
    pub fn into_data(self) -> TableData {
        let terminal_count = self
            .symbols
            .iter()
            .position(|info| info.kind == SymbolKind::NonTerminal)
            .unwrap_or(self.symbols.len());
        let nonterminal_count = self.symbols.len() - terminal_count;

        let states = self
            .states
            .into_iter()
            .map(|pending| {
                let mut actions = vec![Vec::new(); terminal_count];
                for (symbol, action) in pending.actions {
                    if let Some(cell) = actions.get_mut(symbol.index()) {
                        cell.push(action);
                    }
                }
                let mut gotos = vec![None; nonterminal_count];
                for (symbol, target) in pending.gotos {
                    if let Some(entry) = symbol
                        .index()
                        .checked_sub(terminal_count)
                        .and_then(|column| gotos.get_mut(column))
                    {
                        *entry = Some(target);
                    }
                }
                StateData {
                    lex_state: pending.lex_state,
                    actions,
                    gotos,
                }
            })
            .collect();

        TableData {
            name: self.name,
            abi_version: ABI_VERSION,
            start_symbol: self
                .start_symbol
                .unwrap_or(Symbol::new(terminal_count as u16)),
            symbols: self.symbols,
            fields: self.fields,
            rules: self.rules,
            states,
            lex_states: self.lex_states,
            start_state: self.start_state,
            error_lex_state: self.error_lex_state,
            word_token: self.word_token,
            keyword_lex_state: self.keyword_lex_state,
        }
    }

    pub fn build(self) -> Result<GrammarTable, TableError> {
        GrammarTable::new(self.into_data())
    }
}
