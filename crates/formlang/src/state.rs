//! State identifiers and bit-set state collections.

use fixedbitset::FixedBitSet;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Dense identifier of a registered state, assigned in registration order.
pub type StateId = u32;

/// A set of states backed by a bit set.
///
/// Iteration is always in ascending [`StateId`] order, which equals the
/// order the states were registered in. Two sets compare equal iff they
/// contain the same states, independent of how they were built up and of
/// the capacity their backing storage grew to.
#[derive(Clone, Default)]
pub struct StateSet {
    bits: FixedBitSet,
}

impl PartialEq for StateSet {
    fn eq(&self, other: &Self) -> bool {
        // Member-wise, not bitwise: the backing bit sets may differ in
        // capacity while holding the same states.
        self.bits.ones().eq(other.bits.ones())
    }
}

impl Eq for StateSet {}

impl Hash for StateSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for idx in self.bits.ones() {
            idx.hash(state);
        }
    }
}

impl StateSet {
    /// Create an empty set sized for automata with `capacity` states.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: FixedBitSet::with_capacity(capacity),
        }
    }

    /// Create a set holding exactly one state.
    pub fn singleton(state: StateId, capacity: usize) -> Self {
        let mut set = Self::with_capacity(capacity);
        set.insert(state);
        set
    }

    /// Insert a state, growing the backing storage if needed.
    pub fn insert(&mut self, state: StateId) {
        let idx = state as usize;
        if idx >= self.bits.len() {
            self.bits.grow(idx + 1);
        }
        self.bits.insert(idx);
    }

    /// Whether the set contains `state`.
    pub fn contains(&self, state: StateId) -> bool {
        let idx = state as usize;
        idx < self.bits.len() && self.bits.contains(idx)
    }

    /// Whether the set holds no states.
    pub fn is_empty(&self) -> bool {
        self.bits.is_clear()
    }

    /// Number of states in the set.
    pub fn len(&self) -> usize {
        self.bits.count_ones(..)
    }

    /// Iterate over the members in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = StateId> + '_ {
        self.bits.ones().map(|i| i as StateId)
    }

    /// Add every state of `other` to this set.
    pub fn union_with(&mut self, other: &StateSet) {
        if other.bits.len() > self.bits.len() {
            self.bits.grow(other.bits.len());
        }
        self.bits.union_with(&other.bits);
    }

    /// Whether this set shares at least one state with `other`.
    pub fn intersects(&self, other: &StateSet) -> bool {
        self.bits.intersection(&other.bits).next().is_some()
    }

    /// The members as an ascending vector, usable as a canonical map key.
    pub fn to_vec(&self) -> Vec<StateId> {
        self.iter().collect()
    }
}

impl fmt::Debug for StateSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<StateId> for StateSet {
    fn from_iter<I: IntoIterator<Item = StateId>>(iter: I) -> Self {
        let mut set = Self::with_capacity(0);
        for state in iter {
            set.insert(state);
        }
        set
    }
}
