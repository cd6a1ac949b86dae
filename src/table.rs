//! The canonical, immutable transition table both notations are compiled into.

use crate::types::{BlankWrites, Program, State, Symbol, TransitionRule, TuringMachineError};
use serde::{Deserialize, Serialize};

/// An ordered set of transition rules answering `(state, symbol)` lookups.
///
/// The table is built once from a parsed `Program` and never changes afterwards. Rule order
/// is preserved because it decides which rule wins when several match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitionTable {
    rules: Vec<TransitionRule>,
    states: Vec<State>,
    blank: Symbol,
    blank_writes: BlankWrites,
}

impl TransitionTable {
    /// Builds a table from the rules of `program`.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::EmptyTransitionSet)` if the program has no rules, since
    ///   there would be nothing to run.
    pub fn new(program: &Program) -> Result<Self, TuringMachineError> {
        Self::from_rules(program.rules.clone(), program.blank.clone())
    }

    /// Builds a table from bare rules and a blank symbol.
    pub fn from_rules(
        rules: Vec<TransitionRule>,
        blank: impl Into<Symbol>,
    ) -> Result<Self, TuringMachineError> {
        if rules.is_empty() {
            return Err(TuringMachineError::EmptyTransitionSet);
        }

        let mut states: Vec<State> = Vec::new();
        for rule in &rules {
            if !states.contains(&rule.current_state) {
                states.push(rule.current_state.clone());
            }
        }

        Ok(Self {
            rules,
            states,
            blank: blank.into(),
            blank_writes: BlankWrites::default(),
        })
    }

    /// Returns a copy of this table using the given blank write policy.
    pub fn with_blank_writes(mut self, blank_writes: BlankWrites) -> Self {
        self.blank_writes = blank_writes;
        self
    }

    /// Finds the rule to apply in `state` when the head reads `symbol`.
    ///
    /// The first rule matching `(state, symbol)` exactly wins. If there is none, the first
    /// rule of `state` that reads the blank symbol acts as a wildcard. `None` means the
    /// machine cannot proceed.
    pub fn lookup(&self, state: &str, symbol: &str) -> Option<&TransitionRule> {
        let find = |read: &str| {
            self.rules
                .iter()
                .find(|rule| rule.current_state == state && rule.read_symbol == read)
        };

        find(symbol).or_else(|| find(&self.blank))
    }

    /// Returns the rules of `state` in source order.
    pub fn rules_for<'a>(&'a self, state: &'a str) -> impl Iterator<Item = &'a TransitionRule> {
        self.rules
            .iter()
            .filter(move |rule| rule.current_state == state)
    }

    /// Returns every rule in source order.
    pub fn rules(&self) -> &[TransitionRule] {
        &self.rules
    }

    /// Returns the states that have at least one rule, in order of first definition.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    /// Returns the blank symbol.
    pub fn blank(&self) -> &str {
        &self.blank
    }

    pub fn blank_writes(&self) -> BlankWrites {
        self.blank_writes
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classic::parse_classic;
    use crate::types::Direction;

    fn table(source: &str) -> TransitionTable {
        TransitionTable::new(&parse_classic(source)).unwrap()
    }

    #[test]
    fn test_exact_match() {
        let table = table("q0, 0 -> q1, 1, R\nq0, 1 -> q2, 0, L");

        let rule = table.lookup("q0", "1").unwrap();
        assert_eq!(rule.next_state, "q2");
        assert_eq!(rule.direction, Direction::Left);
    }

    #[test]
    fn test_first_definition_wins() {
        let table = table("q0, 0 -> first, 0, R\nq0, 0 -> second, 0, R");

        assert_eq!(table.lookup("q0", "0").unwrap().next_state, "first");
    }

    #[test]
    fn test_blank_rule_is_a_wildcard() {
        let table = table("q0, _ -> any, _, R\nq0, 1 -> one, 1, R");

        // Exact matches are preferred even when the wildcard comes first.
        assert_eq!(table.lookup("q0", "1").unwrap().next_state, "one");
        assert_eq!(table.lookup("q0", "x").unwrap().next_state, "any");
        assert_eq!(table.lookup("q0", "_").unwrap().next_state, "any");
    }

    #[test]
    fn test_wildcard_uses_declared_blank() {
        let rules = vec![TransitionRule::new("q", ".", "dot", ".", Direction::Right)];
        let table = TransitionTable::from_rules(rules, ".").unwrap();

        assert_eq!(table.lookup("q", "z").unwrap().next_state, "dot");
    }

    #[test]
    fn test_not_found() {
        let table = table("q0, 0 -> q1, 1, R");

        assert!(table.lookup("q0", "1").is_none());
        assert!(table.lookup("q1", "0").is_none());
    }

    #[test]
    fn test_empty_program_is_rejected() {
        let result = TransitionTable::new(&parse_classic("# nothing here"));

        assert_eq!(result, Err(TuringMachineError::EmptyTransitionSet));
    }

    #[test]
    fn test_states_and_grouping() {
        let table = table("a, 0 -> b, 0, R\nb, 0 -> a, 0, L\na, 1 -> a, 1, N");

        assert_eq!(table.states(), &["a".to_string(), "b".to_string()]);
        assert_eq!(table.rules_for("a").count(), 2);
        assert_eq!(table.len(), 3);
        assert_eq!(table.blank(), "_");
        assert_eq!(table.blank_writes(), BlankWrites::Skip);
    }
}
