//! Finite automata with epsilon moves and NFA-to-DFA conversion.
//!
//! This crate provides:
//! - [`Nfa`]: a non-deterministic automaton with named states, epsilon
//!   transitions, and epsilon-closure computation
//! - [`Dfa`]: a deterministic automaton built through an append-only
//!   registration protocol
//! - [`subset_construction`]: the powerset construction producing a DFA
//!   with a total transition function, dead state included
//!
//! States are interned to dense [`StateId`]s and subsets of states are
//! bit sets, so closure and subset arithmetic stay cheap. Conversion
//! never mutates its input and reports all failures as
//! [`AutomatonError`] values.

mod dfa;
mod error;
mod nfa;
mod state;
mod subset_construction;
mod symbol;

pub use dfa::Dfa;
pub use error::{AutomatonError, Result};
pub use nfa::Nfa;
pub use state::{StateId, StateSet};
pub use subset_construction::{DEAD_STATE, subset_construction};
pub use symbol::{Alphabet, EPSILON, SymbolId, is_epsilon};
