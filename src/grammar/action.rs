//! Parse actions, rules, and the ids that index the parse table.

use super::symbol::{FieldId, Symbol};
use std::fmt;

/// A parse state id
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct StateId(u16);

impl StateId {
    /// Pseudo-state recorded on tokens lexed while recovering from an error
    pub const RECOVERY: StateId = StateId(u16::MAX);

    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::RECOVERY {
            f.write_str("recovery")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Index into the grammar's rule list
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct RuleId(u16);

impl RuleId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// One entry of an action cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Action {
    Shift(StateId),
    Reduce(RuleId),
    Accept,
}

/// Grouping direction for rules of equal precedence
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Associativity {
    #[default]
    None,
    Left,
    Right,
}

/// A production `lhs -> child_0 .. child_{len-1}`
///
/// `len` counts non-extra children only; extras and error nodes between them
/// are absorbed into the reduced node without being counted.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub lhs: Symbol,
    pub len: u16,
    #[cfg_attr(feature = "serde", serde(default))]
    pub precedence: i32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub associativity: Associativity,
    /// `(child index, field)` pairs, child indices counting non-extra children
    #[cfg_attr(feature = "serde", serde(default))]
    pub fields: Vec<(u16, FieldId)>,
}

impl Rule {
    pub fn new(lhs: Symbol, len: u16) -> Self {
        Self {
            lhs,
            len,
            precedence: 0,
            associativity: Associativity::None,
            fields: Vec::new(),
        }
    }

    pub fn with_precedence(mut self, precedence: i32) -> Self {
        self.precedence = precedence;
        self
    }

    pub fn left(mut self) -> Self {
        self.associativity = Associativity::Left;
        self
    }

    pub fn right(mut self) -> Self {
        self.associativity = Associativity::Right;
        self
    }

    pub fn with_field(mut self, child: u16, field: FieldId) -> Self {
        self.fields.push((child, field));
        self
    }

    /// Field attached to the `child`-th non-extra child
    pub fn field_of(&self, child: usize) -> Option<FieldId> {
        self.fields
            .iter()
            .find(|(index, _)| *index as usize == child)
            .map(|(_, field)| *field)
    }
}
