//! Lexer state machine tables.

use super::symbol::Symbol;

/// Index into the grammar's lex states
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct LexStateId(u16);

impl LexStateId {
    pub const fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Transition taken on any byte in `min..=max`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LexTransition {
    pub min: u8,
    pub max: u8,
    pub target: LexStateId,
}

impl LexTransition {
    pub fn contains(&self, byte: u8) -> bool {
        self.min <= byte && byte <= self.max
    }

    fn overlaps(&self, other: &LexTransition) -> bool {
        self.min <= other.max && other.min <= self.max
    }
}

/// One DFA state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LexState {
    /// Token recognised when the match ends in this state
    #[cfg_attr(feature = "serde", serde(default))]
    pub accept: Option<Symbol>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub transitions: Vec<LexTransition>,
}

impl LexState {
    pub fn next(&self, byte: u8) -> Option<LexStateId> {
        self.transitions
            .iter()
            .find(|transition| transition.contains(byte))
            .map(|transition| transition.target)
    }

    pub fn is_final(&self) -> bool {
        self.transitions.is_empty()
    }

    /// First pair of transitions that claim the same byte
    pub(crate) fn overlapping_byte(&self) -> Option<u8> {
        for (i, a) in self.transitions.iter().enumerate() {
            for b in &self.transitions[i + 1..] {
                if a.overlaps(b) {
                    return Some(a.min.max(b.min));
                }
            }
        }
        None
    }
}
