//! Subset (powerset) construction: ε-NFA to DFA conversion.

use crate::dfa::Dfa;
use crate::error::{AutomatonError, Result};
use crate::nfa::Nfa;
use crate::state::{StateId, StateSet};
use indexmap::IndexMap;
use std::collections::VecDeque;

/// Name of the dead state: the canonical key of the empty subset. Every
/// (state, symbol) pair with no NFA counterpart transitions here, and the
/// dead state self-loops on the whole alphabet.
pub const DEAD_STATE: &str = "{}";

/// The canonical name of a subset of NFA states: member names joined in
/// ascending id order, which is the NFA's registration order. Equal
/// subsets get equal keys no matter how they were discovered.
///
/// Commas and backslashes inside member names are backslash-escaped, so
/// a state literally named `a,b` keys as `{a\,b}` and can never collide
/// with the two-member subset `{a,b}`.
fn composite_key(nfa: &Nfa, subset: &StateSet) -> String {
    let mut key = String::from("{");
    for (i, state) in subset.iter().enumerate() {
        if i > 0 {
            key.push(',');
        }
        let Some(name) = nfa.state_name(state) else {
            continue;
        };
        for c in name.chars() {
            if matches!(c, ',' | '\\') {
                key.push('\\');
            }
            key.push(c);
        }
    }
    key.push('}');
    key
}

/// Register a fresh composite state, final iff `is_final`.
///
/// Escaping makes equal keys imply equal subsets for any non-empty
/// member names; the one remaining clash is a state whose name is empty,
/// whose singleton subset reads `{}` like the dead state. Registering
/// over an existing key would silently merge two distinct composite
/// states, so it aborts the conversion instead.
fn register_composite(dfa: &mut Dfa, key: &str, is_final: bool) -> Result<()> {
    if dfa.state_id(key).is_some() {
        return Err(AutomatonError::CompositeKeyCollision(key.to_owned()));
    }
    if is_final {
        dfa.add_final_state(key);
    } else {
        dfa.add_state(key);
    }
    Ok(())
}

/// Convert an ε-NFA to an equivalent DFA via the subset construction.
///
/// Each DFA state is an epsilon-closed subset of NFA states, named by its
/// canonical key; a subset is final iff it contains an NFA final state.
/// The resulting transition function is total over the NFA's alphabet:
/// subsets with no move on a symbol transition to the shared [`DEAD_STATE`],
/// which is created on first need and self-loops on every symbol.
///
/// The NFA is not mutated. Conversion fails on an NFA without a start
/// state, or when two distinct subsets canonicalize to the same key
/// (possible only through an empty state name); an empty alphabet or
/// unreachable final states just yield a trivial DFA.
pub fn subset_construction(nfa: &Nfa) -> Result<Dfa> {
    let start = nfa.start_state().ok_or(AutomatonError::MissingStartState)?;
    let num_states = nfa.num_states() as usize;

    // One closure per NFA state, computed up front and reused for every
    // successor computation.
    let closures: Vec<StateSet> = (0..nfa.num_states())
        .map(|s| nfa.epsilon_closure(s))
        .collect();

    let mut dfa = Dfa::new();
    // Canonical members -> DFA state name, for every subset already in
    // the output.
    let mut included: IndexMap<Vec<StateId>, String> = IndexMap::new();
    // Frontier of subsets awaiting transition expansion, paired with
    // their names. Each subset is enqueued exactly once.
    let mut queue: VecDeque<(StateSet, String)> = VecDeque::new();
    let mut dead_state_added = false;

    let start_subset = closures[start as usize].clone();
    let start_key = composite_key(nfa, &start_subset);
    register_composite(
        &mut dfa,
        &start_key,
        start_subset.intersects(nfa.final_states()),
    )?;
    dfa.set_start_state(&start_key)?;
    included.insert(start_subset.to_vec(), start_key.clone());
    queue.push_back((start_subset, start_key));

    while let Some((current, current_key)) = queue.pop_front() {
        for symbol in nfa.alphabet().iter() {
            // Image under the symbol, then epsilon-close it.
            let moved = nfa.move_on_symbol(&current, symbol);
            let mut successor = StateSet::with_capacity(num_states);
            for s in moved.iter() {
                successor.union_with(&closures[s as usize]);
            }

            if successor.is_empty() {
                // No NFA path consumes this symbol from here. The dead
                // state is closed under the alphabet at creation and is
                // never expanded again.
                if !dead_state_added {
                    register_composite(&mut dfa, DEAD_STATE, false)?;
                    for sym in nfa.alphabet().iter() {
                        dfa.add_transition(DEAD_STATE, sym, DEAD_STATE)?;
                    }
                    dead_state_added = true;
                }
                dfa.add_transition(&current_key, symbol, DEAD_STATE)?;
                continue;
            }

            let members = successor.to_vec();
            let successor_key = match included.get(&members) {
                Some(existing) => existing.clone(),
                None => {
                    let key = composite_key(nfa, &successor);
                    register_composite(&mut dfa, &key, successor.intersects(nfa.final_states()))?;
                    included.insert(members, key.clone());
                    queue.push_back((successor, key.clone()));
                    key
                }
            };

            dfa.add_transition(&current_key, symbol, &successor_key)?;
        }
    }

    Ok(dfa)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolId;

    const A: SymbolId = 0; // 'a'
    const B: SymbolId = 1; // 'b'

    /// Every reachable DFA state must have exactly one transition per
    /// alphabet symbol.
    fn assert_total(dfa: &Dfa) {
        for state in 0..dfa.num_states() {
            for symbol in dfa.alphabet().iter() {
                assert!(
                    dfa.transition(state, symbol).is_some(),
                    "state {:?} has no transition on symbol {symbol}",
                    dfa.state_name(state)
                );
            }
        }
    }

    /// Compare NFA simulation against the converted DFA on every string
    /// over `symbols` up to length `max_len`.
    fn assert_language_equivalent(nfa: &Nfa, dfa: &Dfa, symbols: &[SymbolId], max_len: usize) {
        let mut inputs: Vec<Vec<SymbolId>> = vec![Vec::new()];
        let mut frontier = vec![Vec::new()];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for input in &frontier {
                for &sym in symbols {
                    let mut longer = input.clone();
                    longer.push(sym);
                    next.push(longer);
                }
            }
            inputs.extend(next.iter().cloned());
            frontier = next;
        }

        for input in &inputs {
            assert_eq!(
                nfa.accepts(input),
                dfa.accepts(input),
                "NFA and DFA disagree on {input:?}"
            );
        }
    }

    #[test]
    fn single_symbol_transition() {
        // q0 -a-> q1(final), no epsilon moves.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_final_state("q1");
        nfa.add_transition("q0", A, "q1").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        let start = dfa.start_state().unwrap();
        assert_eq!(dfa.state_name(start), Some("{q0}"));
        assert!(!dfa.is_final(start));

        let q1 = dfa.transition(start, A).unwrap();
        assert_eq!(dfa.state_name(q1), Some("{q1}"));
        assert!(dfa.is_final(q1));

        // q1 has no outgoing 'a', so it falls into the dead state, which
        // self-loops.
        let dead = dfa.transition(q1, A).unwrap();
        assert_eq!(dfa.state_name(dead), Some(DEAD_STATE));
        assert_eq!(dfa.transition(dead, A), Some(dead));

        assert_total(&dfa);
        assert_language_equivalent(&nfa, &dfa, &[A], 4);
    }

    #[test]
    fn epsilon_closed_start_is_final() {
        // q0 -ε-> q1(final); alphabet {a} with no 'a' transitions.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_final_state("q1");
        nfa.add_state("q2");
        nfa.add_epsilon_transition("q0", "q1").unwrap();
        nfa.add_transition("q2", A, "q2").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        let start = dfa.start_state().unwrap();
        assert_eq!(dfa.state_name(start), Some("{q0,q1}"));
        assert!(dfa.is_final(start));

        let dead = dfa.transition(start, A).unwrap();
        assert_eq!(dfa.state_name(dead), Some(DEAD_STATE));
        assert!(!dfa.is_final(dead));
        assert_eq!(dfa.transition(dead, A), Some(dead));

        assert_total(&dfa);
        assert_language_equivalent(&nfa, &dfa, &[A], 4);
    }

    #[test]
    fn dead_state_is_created_once_and_shared() {
        // No transitions from the start at all; alphabet {a,b} comes from
        // a state the start never reaches.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_state("q1");
        nfa.add_state("q2");
        nfa.add_transition("q1", A, "q2").unwrap();
        nfa.add_transition("q1", B, "q2").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        let start = dfa.start_state().unwrap();
        let on_a = dfa.transition(start, A).unwrap();
        let on_b = dfa.transition(start, B).unwrap();
        assert_eq!(on_a, on_b);
        assert_eq!(dfa.state_name(on_a), Some(DEAD_STATE));

        // Start and the single shared dead state.
        assert_eq!(dfa.num_states(), 2);
        assert_eq!(dfa.transition(on_a, A), Some(on_a));
        assert_eq!(dfa.transition(on_a, B), Some(on_a));
        assert!(!dfa.is_final(on_a));

        assert_total(&dfa);
    }

    #[test]
    fn converging_subsets_are_not_duplicated() {
        // Both q1 and q2 step to {q3} on 'b': the DFA must hold exactly
        // one {q3} state with two incoming transitions.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_state("q1");
        nfa.add_state("q2");
        nfa.add_final_state("q3");
        nfa.add_transition("q0", A, "q1").unwrap();
        nfa.add_transition("q0", B, "q2").unwrap();
        nfa.add_transition("q1", B, "q3").unwrap();
        nfa.add_transition("q2", B, "q3").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        assert_eq!(dfa.states().filter(|&n| n == "{q3}").count(), 1);

        let start = dfa.start_state().unwrap();
        let via_q1 = dfa.transition(start, A).unwrap();
        let via_q2 = dfa.transition(start, B).unwrap();
        assert_ne!(via_q1, via_q2);
        assert_eq!(dfa.transition(via_q1, B), dfa.transition(via_q2, B));

        assert_total(&dfa);
        assert_language_equivalent(&nfa, &dfa, &[A, B], 4);
    }

    #[test]
    fn canonical_keys_ignore_discovery_order() {
        // The subset {q1,q2} is reached with its members discovered in
        // both orders; registration order still fixes the key.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_state("q1");
        nfa.add_state("q2");
        nfa.add_transition("q0", A, "q1").unwrap();
        nfa.add_transition("q0", A, "q2").unwrap();
        nfa.add_transition("q1", B, "q2").unwrap();
        nfa.add_transition("q2", B, "q1").unwrap();
        nfa.add_transition("q1", A, "q2").unwrap();
        nfa.add_transition("q2", A, "q1").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        assert_eq!(dfa.states().filter(|&n| n == "{q1,q2}").count(), 1);
        assert!(dfa.state_id("{q2,q1}").is_none());
        assert_total(&dfa);
    }

    #[test]
    fn nondeterministic_branching() {
        // (a|b)*ab: the classic two-state lookahead NFA.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_state("q1");
        nfa.add_final_state("q2");
        nfa.add_transition("q0", A, "q0").unwrap();
        nfa.add_transition("q0", B, "q0").unwrap();
        nfa.add_transition("q0", A, "q1").unwrap();
        nfa.add_transition("q1", B, "q2").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        assert!(dfa.accepts(&[A, B]));
        assert!(dfa.accepts(&[B, B, A, A, B]));
        assert!(!dfa.accepts(&[A]));
        assert!(!dfa.accepts(&[B, A]));

        assert_total(&dfa);
        assert_language_equivalent(&nfa, &dfa, &[A, B], 5);
    }

    #[test]
    fn epsilon_cycle_converts() {
        // ε-cycle q0 -ε-> q1 -ε-> q0 with an 'a' edge out of q1.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_state("q1");
        nfa.add_final_state("q2");
        nfa.add_epsilon_transition("q0", "q1").unwrap();
        nfa.add_epsilon_transition("q1", "q0").unwrap();
        nfa.add_transition("q1", A, "q2").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        let start = dfa.start_state().unwrap();
        assert_eq!(dfa.state_name(start), Some("{q0,q1}"));
        assert!(dfa.accepts(&[A]));
        assert!(!dfa.accepts(&[A, A]));

        assert_total(&dfa);
        assert_language_equivalent(&nfa, &dfa, &[A], 4);
    }

    #[test]
    fn empty_alphabet_yields_trivial_dfa() {
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_final_state("q1");
        nfa.add_epsilon_transition("q0", "q1").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        // Just the start subset; no symbols, no dead state.
        assert_eq!(dfa.num_states(), 1);
        assert!(dfa.alphabet().is_empty());
        assert!(dfa.accepts(&[]));
    }

    #[test]
    fn unreachable_finals_yield_empty_language() {
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_final_state("q1");
        nfa.add_transition("q0", A, "q0").unwrap();
        nfa.add_transition("q1", A, "q1").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        assert!(dfa.is_empty());
        assert_total(&dfa);
        assert_language_equivalent(&nfa, &dfa, &[A], 4);
    }

    #[test]
    fn missing_start_state_is_an_error() {
        let mut nfa = Nfa::new();
        nfa.add_state("q0");
        nfa.add_final_state("q1");
        nfa.add_transition("q0", A, "q1").unwrap();

        assert_eq!(
            subset_construction(&nfa).unwrap_err(),
            AutomatonError::MissingStartState
        );
    }

    #[test]
    fn state_count_stays_within_powerset_bound() {
        // Worst-case-ish automaton: (a|b)*a(a|b)(a|b) needs 2^3 subsets.
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_state("q1");
        nfa.add_state("q2");
        nfa.add_final_state("q3");
        for sym in [A, B] {
            nfa.add_transition("q0", sym, "q0").unwrap();
            nfa.add_transition("q1", sym, "q2").unwrap();
            nfa.add_transition("q2", sym, "q3").unwrap();
        }
        nfa.add_transition("q0", A, "q1").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        // At most 2^4 subsets plus the dead state (here, no dead state:
        // q0 loops on both symbols, so no subset is ever empty).
        assert!(dfa.num_states() <= 16 + 1);
        assert!(dfa.state_id(DEAD_STATE).is_none());

        assert_total(&dfa);
        assert_language_equivalent(&nfa, &dfa, &[A, B], 6);
    }

    #[test]
    fn member_names_with_commas_do_not_collide() {
        // The singleton subset of a state literally named "a,b" must not
        // share a DFA state with the two-member subset {a,b}.
        let mut nfa = Nfa::new();
        nfa.add_start_state("s");
        nfa.add_state("a,b");
        nfa.add_state("a");
        nfa.add_state("b");
        nfa.add_transition("s", A, "a,b").unwrap();
        nfa.add_transition("s", B, "a").unwrap();
        nfa.add_transition("s", B, "b").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        let start = dfa.start_state().unwrap();
        let on_a = dfa.transition(start, A).unwrap();
        let on_b = dfa.transition(start, B).unwrap();
        assert_ne!(on_a, on_b);
        assert_eq!(dfa.state_name(on_a), Some(r"{a\,b}"));
        assert_eq!(dfa.state_name(on_b), Some("{a,b}"));

        assert_total(&dfa);
    }

    #[test]
    fn colliding_canonical_keys_abort_conversion() {
        // An empty state name makes its singleton subset read like the
        // dead state's key; conversion must fail, not merge the two.
        let mut nfa = Nfa::new();
        nfa.add_start_state("s");
        nfa.add_state("");
        nfa.add_transition("s", A, "").unwrap();

        assert_eq!(
            subset_construction(&nfa).unwrap_err(),
            AutomatonError::CompositeKeyCollision("{}".into())
        );
    }

    #[test]
    fn symbols_follow_first_seen_order() {
        let mut nfa = Nfa::new();
        nfa.add_start_state("q0");
        nfa.add_state("q1");
        nfa.add_transition("q0", B, "q1").unwrap();
        nfa.add_transition("q0", A, "q1").unwrap();

        let dfa = subset_construction(&nfa).unwrap();

        assert_eq!(dfa.alphabet().iter().collect::<Vec<_>>(), vec![B, A]);
        assert_total(&dfa);
    }
}
