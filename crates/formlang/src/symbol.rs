//! Input symbols and first-seen-order alphabets.

use indexmap::IndexSet;

/// An input symbol. How symbols map to characters or token kinds is up to
/// the caller; the automata only compare them for equality.
pub type SymbolId = u32;

/// Reserved marker for epsilon (non-consuming) transitions.
pub const EPSILON: SymbolId = u32::MAX;

/// Whether a symbol is the epsilon marker.
#[inline]
pub fn is_epsilon(symbol: SymbolId) -> bool {
    symbol == EPSILON
}

/// The set of symbols labelling at least one non-epsilon transition.
///
/// Insertion order is preserved, so iterating an alphabet always yields
/// symbols in the order they were first seen. Epsilon is never a member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Alphabet {
    symbols: IndexSet<SymbolId>,
}

impl Alphabet {
    /// Create an empty alphabet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a symbol. The epsilon marker is ignored.
    ///
    /// Returns `true` if the symbol was not already present.
    pub fn insert(&mut self, symbol: SymbolId) -> bool {
        if is_epsilon(symbol) {
            return false;
        }
        self.symbols.insert(symbol)
    }

    /// Whether the alphabet contains `symbol`.
    pub fn contains(&self, symbol: SymbolId) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Iterate over the symbols in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.symbols.iter().copied()
    }

    /// Number of distinct symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether no symbol has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
