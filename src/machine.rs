//! This module defines the execution engine: the machine configuration, the pure `step`
//! function that advances it by one transition, and `TuringMachine`, a small driver that
//! threads configurations through `step` for callers that want a stateful handle.

use crate::table::TransitionTable;
use crate::types::{
    BlankWrites, Direction, Program, Rejection, State, Status, Symbol, TuringMachineError,
};
use serde::{Deserialize, Serialize};

/// A snapshot of a running machine.
///
/// Configurations are values: `step` never modifies its input and always returns a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    /// The current state.
    pub state: State,
    /// Tape cells from index 0. Always at least `head + 1` cells long.
    pub tape: Vec<Symbol>,
    /// The head position.
    pub head: usize,
    /// Number of transitions applied so far.
    pub step_count: usize,
    pub status: Status,
}

impl Configuration {
    /// Creates a running configuration with the head on the first cell.
    ///
    /// An empty tape is replaced by a single blank cell so the head always has something
    /// to read.
    pub fn new(state: impl Into<State>, tape: Vec<Symbol>, blank: &str) -> Self {
        let tape = if tape.is_empty() {
            vec![blank.to_string()]
        } else {
            tape
        };

        Self {
            state: state.into(),
            tape,
            head: 0,
            step_count: 0,
            status: Status::Running,
        }
    }

    /// Returns the symbol under the head, if the head is on the tape.
    pub fn symbol(&self) -> Option<&str> {
        self.tape.get(self.head).map(String::as_str)
    }

    /// Returns the tape content with trailing blank cells removed.
    ///
    /// | 0 | 0 | 1 | 0 | _ |  ->  "0010"
    pub fn tape_string(&self, blank: &str) -> String {
        let end = self
            .tape
            .iter()
            .rposition(|cell| cell != blank)
            .map_or(0, |last| last + 1);

        self.tape[..end].concat()
    }
}

/// Creates the starting configuration of `program`.
pub fn initialize(program: &Program) -> Configuration {
    Configuration::new(
        program.initial_state.clone(),
        program.tape.clone(),
        &program.blank,
    )
}

/// Advances `config` by one transition.
///
/// 1. A halted or errored configuration is returned unchanged.
/// 2. The rule for the current state and symbol is looked up; if there is none the result
///    is `Errored` and nothing else changes.
/// 3. The rule's symbol is written, unless the rule keeps the cell as it is, or the symbol
///    is the blank and the table skips blank writes.
/// 4. The state changes and the head moves. Moving left from the first cell keeps the head
///    there; moving right past the last cell appends one blank. A `None` move halts.
pub fn step(config: &Configuration, table: &TransitionTable) -> Configuration {
    if config.status.is_terminal() {
        return config.clone();
    }

    let mut next = config.clone();
    if next.head >= next.tape.len() {
        next.tape.resize(next.head + 1, table.blank().to_string());
    }

    let symbol = next.tape[next.head].clone();
    let Some(rule) = table.lookup(&next.state, &symbol) else {
        log::trace!("no transition for ({}, {})", next.state, symbol);
        next.status = Status::Errored(Rejection {
            state: next.state.clone(),
            symbol,
        });
        return next;
    };

    let write = match table.blank_writes() {
        _ if rule.keeps_symbol => false,
        BlankWrites::Skip => rule.write_symbol != table.blank(),
        BlankWrites::Overwrite => true,
    };
    if write {
        next.tape[next.head] = rule.write_symbol.clone();
    }

    next.state = rule.next_state.clone();

    match rule.direction {
        Direction::Left => next.head = next.head.saturating_sub(1),
        Direction::Right => {
            next.head += 1;
            if next.head >= next.tape.len() {
                next.tape.push(table.blank().to_string());
            }
        }
        Direction::None => next.status = Status::Halted,
    }

    next.step_count += 1;
    log::trace!("step {}: {} -> {}", next.step_count, rule, next.state);

    next
}

/// How a call to [`TuringMachine::run`] ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// The machine applied a halting rule.
    Halted,
    /// No rule matched.
    Errored(Rejection),
    /// The step budget ran out while the machine was still running.
    StepLimit(usize),
}

/// A stateful driver around [`step`].
///
/// It owns the table and the initial configuration so a caller can step, run and reset
/// without threading values around itself. All transitions still go through `step`.
pub struct TuringMachine {
    table: TransitionTable,
    initial: Configuration,
    current: Configuration,
}

impl TuringMachine {
    /// Creates a machine from a parsed `Program`.
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::EmptyTransitionSet)` if the program has no rules.
    pub fn new(program: &Program) -> Result<Self, TuringMachineError> {
        let table = TransitionTable::new(program)?;

        Ok(Self::with_table(table, initialize(program)))
    }

    /// Creates a machine from an existing table and starting configuration.
    pub fn with_table(table: TransitionTable, initial: Configuration) -> Self {
        Self {
            table,
            current: initial.clone(),
            initial,
        }
    }

    /// Executes a single step and returns the resulting status.
    pub fn step(&mut self) -> &Status {
        self.current = step(&self.current, &self.table);
        &self.current.status
    }

    /// Steps until the machine halts, errors, or `max_steps` steps have been taken.
    pub fn run(&mut self, max_steps: usize) -> Outcome {
        self.run_with(max_steps, |_| {})
    }

    /// Like [`TuringMachine::run`], calling `on_step` with every configuration produced.
    pub fn run_with<F>(&mut self, max_steps: usize, mut on_step: F) -> Outcome
    where
        F: FnMut(&Configuration),
    {
        for _ in 0..max_steps {
            if self.current.status.is_terminal() {
                break;
            }
            self.step();
            on_step(&self.current);
        }

        match &self.current.status {
            Status::Running => Outcome::StepLimit(max_steps),
            Status::Halted => Outcome::Halted,
            Status::Errored(rejection) => Outcome::Errored(rejection.clone()),
        }
    }

    /// Resets the machine to its initial configuration.
    pub fn reset(&mut self) {
        self.current = self.initial.clone();
    }

    /// Replaces the initial tape and resets the machine.
    pub fn set_tape(&mut self, tape: Vec<Symbol>) {
        self.initial = Configuration::new(self.initial.state.clone(), tape, self.table.blank());
        self.reset();
    }

    /// Returns the current configuration.
    pub fn configuration(&self) -> &Configuration {
        &self.current
    }

    /// Returns the transition table.
    pub fn table(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns `true` once the machine has halted or errored.
    pub fn is_terminal(&self) -> bool {
        self.current.status.is_terminal()
    }

    /// Returns the current tape without trailing blanks.
    pub fn tape_string(&self) -> String {
        self.current.tape_string(self.table.blank())
    }
}
