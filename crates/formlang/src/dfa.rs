//! Deterministic finite automaton with named states.

use crate::error::{AutomatonError, Result};
use crate::state::{StateId, StateSet};
use crate::symbol::{Alphabet, SymbolId};
use indexmap::IndexSet;
use std::collections::{HashMap, VecDeque};
use tracing::warn;

/// A deterministic finite automaton.
///
/// Built append-only: states are registered by name, then wired up with
/// at most one transition per (state, symbol) pair. The construction in
/// [`subset_construction`](crate::subset_construction()) always produces
/// a total transition function; a hand-built `Dfa` may be partial, in
/// which case a missing transition rejects the input.
#[derive(Debug, Clone, Default)]
pub struct Dfa {
    /// State names; a state's id is its insertion index.
    names: IndexSet<String>,
    start: Option<StateId>,
    final_states: StateSet,
    /// Transition function: (source, symbol) -> destination.
    transitions: HashMap<(StateId, SymbolId), StateId>,
    alphabet: Alphabet,
}

impl Dfa {
    /// Create an empty DFA.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a name, or warn and return `None` if it is taken.
    fn intern(&mut self, name: &str) -> Option<StateId> {
        if self.names.contains(name) {
            warn!(name, "a state with this name already exists in the DFA");
            return None;
        }
        let (idx, _) = self.names.insert_full(name.to_owned());
        Some(idx as StateId)
    }

    /// Register a non-final state. Duplicate names warn and are ignored.
    pub fn add_state(&mut self, name: &str) {
        self.intern(name);
    }

    /// Register a final (accepting) state. Duplicate names warn and are
    /// ignored; in particular this never changes the finality of an
    /// existing state.
    pub fn add_final_state(&mut self, name: &str) {
        if let Some(id) = self.intern(name) {
            self.final_states.insert(id);
        }
    }

    /// Designate a registered state as the start state.
    pub fn set_start_state(&mut self, name: &str) -> Result<()> {
        let id = self
            .state_id(name)
            .ok_or_else(|| AutomatonError::UnknownState(name.to_owned()))?;
        self.start = Some(id);
        Ok(())
    }

    /// Add a transition between two registered states.
    ///
    /// A second transition for the same (state, symbol) pair replaces the
    /// first; determinism admits only one destination.
    pub fn add_transition(&mut self, from: &str, symbol: SymbolId, to: &str) -> Result<()> {
        let from_id = self
            .state_id(from)
            .ok_or_else(|| AutomatonError::UnknownState(from.to_owned()))?;
        let to_id = self
            .state_id(to)
            .ok_or_else(|| AutomatonError::UnknownState(to.to_owned()))?;

        self.alphabet.insert(symbol);
        self.transitions.insert((from_id, symbol), to_id);
        Ok(())
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

    /// The designated start state, if one was set.
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

    /// The alphabet, in first-seen order.
    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    /// The destination of `from` on `symbol`, if a transition exists.
    pub fn transition(&self, from: StateId, symbol: SymbolId) -> Option<StateId> {
        self.transitions.get(&(from, symbol)).copied()
    }

    /// Run the DFA on `input`.
    ///
    /// Rejects when no start state is set or when a transition is
    /// missing for the current state and symbol.
    pub fn accepts(&self, input: &[SymbolId]) -> bool {
        let Some(mut current) = self.start else {
            return false;
        };

        for &symbol in input {
            match self.transition(current, symbol) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.final_states.contains(current)
    }

    /// Whether the DFA accepts no string at all.
    ///
    /// Breadth-first reachability from the start state, looking for any
    /// final state.
    pub fn is_empty(&self) -> bool {
        let Some(start) = self.start else {
            return true;
        };
        if self.final_states.is_empty() {
            return true;
        }

        let mut visited = StateSet::with_capacity(self.names.len());
        let mut queue = VecDeque::from([start]);

        while let Some(state) = queue.pop_front() {
            if visited.contains(state) {
                continue;
            }
            visited.insert(state);

            if self.final_states.contains(state) {
                return false;
            }

            for symbol in self.alphabet.iter() {
                if let Some(next) = self.transition(state, symbol) {
                    if !visited.contains(next) {
                        queue.push_back(next);
                    }
                }
            }
        }

        true
    }
}
