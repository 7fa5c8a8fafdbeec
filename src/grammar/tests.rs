use super::*;
use crate::testing;
use rstest::rstest;

fn tiny() -> GrammarTableBuilder {
    let mut b = GrammarTableBuilder::new("tiny");
    let lex = b.lex_state();
    let word = b.terminal("word");
    let root = b.non_terminal("root");
    b.lex_repeat(lex, &[(b'a', b'z')], word);
    let rule = b.rule(Rule::new(root, 1));
    let s0 = b.state(lex);
    let s1 = b.state(lex);
    let s2 = b.state(lex);
    b.shift(s0, word, s2).goto(s0, root, s1);
    b.accept(s1);
    b.reduce(s2, &[Symbol::END], rule);
    b.start(s0, root);
    b
}

// =============================================================================
// Symbols
// =============================================================================

#[test]
fn test_reserved_symbols() {
    assert_eq!(Symbol::END.index(), 0);
    assert!(Symbol::ERROR.is_error());
    assert!(!Symbol::END.is_error());
    assert_eq!(StateId::RECOVERY.index(), u16::MAX as usize);
}

#[test]
fn test_symbol_metadata() {
    let language = testing::sum().unwrap();
    let table = language.table();

    let plus = table.symbol_for_name("+", false).unwrap();
    let number = table.symbol_for_name("number", true).unwrap();
    let sum = table.symbol_for_name("sum", true).unwrap();

    assert!(table.is_terminal(plus));
    assert!(!table.is_named(plus));
    assert!(table.is_named(number));
    assert!(!table.is_terminal(sum));
    assert_eq!(table.symbol_name(Symbol::ERROR), "ERROR");
    assert!(table.is_named(Symbol::ERROR));
    assert_eq!(table.start_symbol(), sum);

    let whitespace = table.symbol_for_name("whitespace", false).unwrap();
    assert!(table.is_extra(whitespace));
    assert!(!table.is_extra(number));
}

#[test]
fn test_terminals_precede_non_terminals() {
    let language = testing::arithmetic().unwrap();
    let table = language.table();
    let terminals: Vec<Symbol> = table.terminals().collect();
    assert_eq!(terminals.len(), table.terminal_count());
    assert_eq!(terminals[0], Symbol::END);
    assert!(terminals.iter().all(|symbol| table.is_terminal(*symbol)));
    assert_eq!(table.symbol_count(), table.terminal_count() + 1);
}

#[test]
fn test_precedence_lookup() {
    let language = testing::arithmetic().unwrap();
    let table = language.table();
    let plus = table.symbol_for_name("+", false).unwrap();
    let times = table.symbol_for_name("*", false).unwrap();
    assert!(table.precedence(times) > table.precedence(plus));
}

// =============================================================================
// Actions
// =============================================================================

#[test]
fn test_action_lookup() {
    let language = testing::sum().unwrap();
    let table = language.table();
    let number = table.symbol_for_name("number", true).unwrap();
    let start = table.start_state();

    assert!(matches!(table.actions(start, number), [Action::Shift(_)]));
    assert!(table.actions(start, Symbol::ERROR).is_empty());
    assert!(table.actions(StateId::RECOVERY, number).is_empty());
    assert!(table.has_actions(start, number));
}

#[test]
fn test_non_terminals_have_no_actions() {
    let language = testing::sum().unwrap();
    let table = language.table();
    let sum = table.symbol_for_name("sum", true).unwrap();
    assert!(table.actions(table.start_state(), sum).is_empty());
    assert!(table.goto(table.start_state(), sum).is_some());
}

#[test]
fn test_conflicting_cells_keep_declaration_order() {
    let language = testing::arithmetic().unwrap();
    let table = language.table();
    let plus = table.symbol_for_name("+", false).unwrap();
    let conflicted = (0..table.state_count())
        .map(|index| table.actions(StateId::new(index as u16), plus))
        .find(|cell| cell.len() > 1)
        .unwrap();
    assert!(matches!(conflicted, [Action::Shift(_), Action::Reduce(_)]));
}

#[test]
fn test_rule_fields() {
    let language = testing::arithmetic().unwrap();
    let table = language.table();
    let left = table.field_id("left").unwrap();
    let rule = table.rule(RuleId::new(0));
    assert_eq!(rule.len, 3);
    assert_eq!(rule.field_of(0), Some(left));
    assert_eq!(table.field_name(left), Some("left"));
    assert_eq!(rule.associativity, Associativity::Left);
    assert_eq!(table.field_id("nope"), None);
}

#[test]
fn test_lex_mode_for_recovery() {
    let language = testing::statements().unwrap();
    let table = language.table();
    let fallback = table.error_lex_state().unwrap();
    assert_eq!(table.lex_mode(StateId::RECOVERY), fallback);
    assert!(table.word_token().is_some());
    assert!(table.keyword_lex_state().is_some());
}

#[test]
fn test_valid_externals() {
    let language = testing::nested_comments().unwrap();
    let table = language.table();
    assert!(table.has_externals());
    assert!(language.has_scanner());
    let valid = table.valid_externals(table.start_state());
    assert_eq!(valid, &[testing::NestedCommentScanner::COMMENT]);
    assert_eq!(table.valid_externals(StateId::RECOVERY).len(), 1);
    assert!(table.is_external(testing::NestedCommentScanner::COMMENT));
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_builder_output_validates() {
    assert!(tiny().build().is_ok());
}

#[test]
fn test_rejects_unsupported_abi() {
    let mut data = tiny().into_data();
    data.abi_version = ABI_VERSION + 1;
    assert!(matches!(
        GrammarTable::new(data),
        Err(TableError::UnsupportedAbi { .. })
    ));
}

#[test]
fn test_rejects_shift_to_missing_state() {
    let mut data = tiny().into_data();
    data.states[0].actions[1] = vec![Action::Shift(StateId::new(99))];
    assert!(matches!(
        GrammarTable::new(data),
        Err(TableError::ShiftTarget { .. })
    ));
}

#[test]
fn test_rejects_reduce_by_missing_rule() {
    let mut data = tiny().into_data();
    data.states[2].actions[0] = vec![Action::Reduce(RuleId::new(7))];
    assert!(matches!(
        GrammarTable::new(data),
        Err(TableError::ReduceRule { .. })
    ));
}

#[test]
fn test_rejects_accept_on_terminal() {
    let mut data = tiny().into_data();
    data.states[1].actions[1] = vec![Action::Accept];
    assert!(matches!(
        GrammarTable::new(data),
        Err(TableError::AcceptSymbol { .. })
    ));
}

#[test]
fn test_rejects_ragged_rows() {
    let mut data = tiny().into_data();
    data.states[0].actions.pop();
    assert!(matches!(
        GrammarTable::new(data),
        Err(TableError::ActionRowWidth { .. })
    ));
}

#[test]
fn test_rejects_dead_state() {
    let mut data = tiny().into_data();
    data.states[2].actions[0].clear();
    assert!(matches!(
        GrammarTable::new(data),
        Err(TableError::DeadState { .. })
    ));

    // Unreachable states are never entered, so they may be empty
    let mut b = tiny();
    b.state(LexStateId::new(0));
    assert!(b.build().is_ok());
}

#[test]
fn test_rejects_extra_non_terminal() {
    let mut data = tiny().into_data();
    data.symbols[2].extra = true;
    assert!(matches!(
        GrammarTable::new(data),
        Err(TableError::NonTerminalExtra { .. })
    ));
}

#[test]
fn test_rejects_overlapping_lex_transitions() {
    let mut b = tiny();
    let lex = LexStateId::new(0);
    let other = b.lex_state();
    b.lex_transition(lex, b'm', b'm', other);
    assert!(matches!(b.build(), Err(TableError::LexOverlap { .. })));
}

#[rstest]
#[case::sum(testing::sum())]
#[case::arithmetic(testing::arithmetic())]
#[case::statements(testing::statements())]
#[case::nested_comments(testing::nested_comments())]
fn test_reference_grammars_validate(#[case] language: Result<Language, TableError>) {
    let language = language.unwrap();
    assert!(language.table().state_count() > 0);
}

// =============================================================================
// Languages
// =============================================================================

#[test]
fn test_language_handles_share_tables() {
    let language = testing::sum().unwrap();
    let clone = language.clone();
    assert!(language.ptr_eq(&clone));
    assert!(!language.ptr_eq(&testing::sum().unwrap()));
    assert_eq!(language.name(), "sum");
}

#[test]
fn test_registry() {
    let registry = LanguageRegistry::new();
    assert!(registry.is_empty());
    registry.register(testing::sum().unwrap());
    registry.register(testing::statements().unwrap());
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.names(), vec!["sum", "statements"]);

    let replaced = registry.register(testing::sum().unwrap());
    assert!(replaced.is_some());
    assert_eq!(registry.len(), 2);

    assert!(registry.get("statements").is_some());
    assert!(registry.remove("sum").is_some());
    assert!(registry.get("sum").is_none());
    assert_eq!(registry.names(), vec!["statements"]);
}

#[test]
fn test_language_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Language>();
    assert_send_sync::<LanguageRegistry>();
}

#[cfg(feature = "serde")]
#[test]
fn test_json_round_trip() {
    let language = testing::statements().unwrap();
    let json = language.table().to_json().unwrap();
    let table = GrammarTable::from_json(&json).unwrap();
    assert_eq!(table.name(), "statements");
    assert_eq!(table.state_count(), language.table().state_count());
    assert_eq!(table.symbol_for_name("let", false), language.table().symbol_for_name("let", false));
}
