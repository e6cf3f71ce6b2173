//! Non-deterministic finite automaton with epsilon moves.

use crate::error::{AutomatonError, Result};
use crate::state::{StateId, StateSet};
use crate::symbol::{Alphabet, EPSILON, SymbolId, is_epsilon};
use indexmap::IndexSet;
use std::collections::HashMap;
use tracing::warn;

/// A non-deterministic finite automaton with epsilon moves.
///
/// States are registered by name and interned to dense ids in
/// registration order. Transitions on [`EPSILON`] are non-consuming moves
/// and never contribute to the alphabet.
#[derive(Debug, Clone, Default)]
pub struct Nfa {
    /// State names; a state's id is its insertion index.
    names: IndexSet<String>,
    start: Option<StateId>,
    final_states: StateSet,
    /// Transition relation: (source, symbol) -> set of destinations.
    transitions: HashMap<(StateId, SymbolId), StateSet>,
    alphabet: Alphabet,
}

impl Nfa {
    /// Create an empty NFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name, or warn and return `None` if it is taken.
    fn intern(&mut self, name: &str) -> Option<StateId> {
        if self.names.contains(name) {
            warn!(name, "a state with this name already exists in the NFA");
            return None;
        }
        let (idx, _) = self.names.insert_full(name.to_owned());
        Some(idx as StateId)
    }

    /// Register a non-final state. Duplicate names warn and are ignored.
    pub fn add_state(&mut self, name: &str) {
        self.intern(name);
    }

    /// Register a state and designate it as the start state.
    ///
    /// Duplicate names warn and are ignored; the start designation is
    /// then left unchanged.
    pub fn add_start_state(&mut self, name: &str) {
        if let Some(id) = self.intern(name) {
            self.start = Some(id);
        }
    }

    /// Register a final (accepting) state. Duplicate names warn and are
    /// ignored.
    pub fn add_final_state(&mut self, name: &str) {
        if let Some(id) = self.intern(name) {
            self.final_states.insert(id);
        }
    }

    /// Add a transition between two registered states.
    ///
    /// Non-epsilon symbols are recorded into the alphabet in first-seen
    /// order. Unregistered endpoint names are an error.
    pub fn add_transition(&mut self, from: &str, symbol: SymbolId, to: &str) -> Result<()> {
        let from_id = self
            .state_id(from)
            .ok_or_else(|| AutomatonError::UnknownState(from.to_owned()))?;
        let to_id = self
            .state_id(to)
            .ok_or_else(|| AutomatonError::UnknownState(to.to_owned()))?;

        self.alphabet.insert(symbol);
        self.transitions
            .entry((from_id, symbol))
            .or_insert_with(|| StateSet::with_capacity(self.names.len()))
            .insert(to_id);
        Ok(())
    }

    /// Add an epsilon (non-consuming) transition.
    pub fn add_epsilon_transition(&mut self, from: &str, to: &str) -> Result<()> {
        self.add_transition(from, EPSILON, to)
    }

    /// Number of registered states.
    pub fn num_states(&self) -> StateId {
        self.names.len() as StateId
    }

    /// Look up a state's id by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.names.get_index_of(name).map(|idx| idx as StateId)
    }

    /// Look up a state's name by id.
    pub fn state_name(&self, state: StateId) -> Option<&str> {
        self.names.get_index(state as usize).map(String::as_str)
    }

    /// Iterate over state names in registration order.
    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// The designated start state, if one was registered.
    pub fn start_state(&self) -> Option<StateId> {
        self.start
    }

    /// The final (accepting) states.
    pub fn final_states(&self) -> &StateSet {
        &self.final_states
    }

    /// Whether `state` is final.
    pub fn is_final(&self, state: StateId) -> bool {
        self.final_states.contains(state)
    }

    /// The alphabet, in first-seen order and excluding epsilon.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The direct successors of `from` on `symbol`, if any.
    pub fn to_states(&self, from: StateId, symbol: SymbolId) -> Option<&StateSet> {
        self.transitions.get(&(from, symbol))
    }

    /// The epsilon closure of one state: every state reachable through
    /// zero or more epsilon moves, including the state itself.
    pub fn epsilon_closure(&self, state: StateId) -> StateSet {
        self.epsilon_closure_set(&StateSet::singleton(state, self.names.len()))
    }

    /// The union of the epsilon closures of every state in `states`.
    ///
    /// The closure bitset doubles as the visited set, so epsilon cycles
    /// terminate and membership checks stay constant-time.
    pub fn epsilon_closure_set(&self, states: &StateSet) -> StateSet {
        let mut closure = StateSet::with_capacity(self.names.len());
        let mut stack: Vec<StateId> = states.iter().collect();

        while let Some(s) = stack.pop() {
            if closure.contains(s) {
                continue;
            }
            closure.insert(s);

            if let Some(dests) = self.transitions.get(&(s, EPSILON)) {
                stack.extend(dests.iter().filter(|&d| !closure.contains(d)));
            }
        }

        closure
    }

    /// The raw image of `states` under `symbol`: the union of every
    /// member's direct successors, without epsilon closure.
    ///
    /// The epsilon marker labels no consuming transition, so it always
    /// yields the empty set.
    pub fn move_on_symbol(&self, states: &StateSet, symbol: SymbolId) -> StateSet {
        let mut reached = StateSet::with_capacity(self.names.len());
        if is_epsilon(symbol) {
            return reached;
        }
        for state in states.iter() {
            if let Some(dests) = self.transitions.get(&(state, symbol)) {
                reached.union_with(dests);
            }
        }
        reached
    }

    /// Simulate the NFA on `input` via subset tracking.
    ///
    /// Returns `false` when no start state is registered. No string
    /// contains the epsilon marker, so an input holding it is rejected.
    pub fn accepts(&self, input: &[SymbolId]) -> bool {
        let Some(start) = self.start else {
            return false;
        };

        let mut current = self.epsilon_closure(start);
        for &symbol in input {
            let moved = self.move_on_symbol(&current, symbol);
            current = self.epsilon_closure_set(&moved);
            if current.is_empty() {
                return false;
            }
        }
        current.intersects(&self.final_states)
    }
}
