//! This module defines the core data structures and types used throughout the simulator,
//! including the canonical transition rule, the parse result, execution status and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A tape symbol. Usually a single character, but any token without separators is accepted.
pub type Symbol = String;
/// An opaque state identifier.
pub type State = String;

/// The blank symbol used when a source does not declare one.
pub const DEFAULT_BLANK_SYMBOL: &str = "_";
/// The start state of every classic-syntax program.
pub const DEFAULT_CLASSIC_START_STATE: &str = "q0";
/// The start state of a structured program that declares neither `start state:` nor any state block.
pub const DEFAULT_STRUCTURED_START_STATE: &str = "right";
/// The tape used when a source does not declare any input.
pub const DEFAULT_TAPE: [&str; 3] = ["0", "0", "0"];
/// The maximum allowed size for a program source in bytes.
pub const MAX_PROGRAM_SIZE: usize = 65536; // 64KB
/// The step cap applied by [`crate::TuringMachine::run`] callers that don't choose their own.
pub const DEFAULT_MAX_STEPS: usize = 10000;

/// The notation a source is written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Format {
    /// Line-oriented `state, symbol -> state, symbol, direction` rules.
    Classic,
    /// Declarative `input:`/`blank:`/`start state:`/`table:` blocks.
    Structured,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::Classic => write!(f, "classic"),
            Format::Structured => write!(f, "structured"),
        }
    }
}

/// The result of parsing a source in either notation.
///
/// Every default (start state, blank, tape) is resolved by the parser that produced it,
/// so consumers never have to apply defaults of their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    /// The notation the source was parsed with.
    pub format: Format,
    /// The state the machine starts in.
    pub initial_state: State,
    /// The blank symbol used for tape growth and wildcard matching.
    pub blank: Symbol,
    /// The initial tape content.
    pub tape: Vec<Symbol>,
    /// Transition rules in source order.
    pub rules: Vec<TransitionRule>,
    /// Every state mentioned by the source, in order of first appearance.
    pub states: Vec<State>,
    /// Lines that were skipped because they matched no recognized form.
    pub warnings: Vec<ParseWarning>,
}

impl Program {
    /// Returns `true` if the source produced no transition rules at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Returns the number of parsed rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the initial tape content as a `String`.
    pub fn initial_tape(&self) -> String {
        self.tape.concat()
    }

    /// Records `state` unless it has been seen before.
    pub(crate) fn add_state(&mut self, state: &str) {
        if !self.states.iter().any(|s| s == state) {
            self.states.push(state.to_string());
        }
    }
}

/// A single canonical transition rule.
///
/// Both parsers produce these, so the engine never needs to know which notation a
/// program was written in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRule {
    /// The state this rule applies in.
    pub current_state: State,
    /// The symbol that must be under the head.
    pub read_symbol: Symbol,
    /// The state the machine moves to.
    pub next_state: State,
    /// The symbol written into the current cell.
    pub write_symbol: Symbol,
    /// The head movement applied after writing.
    pub direction: Direction,
    /// Set when the source gave no write symbol. The cell then keeps whatever was read,
    /// even when the rule matched as a blank wildcard.
    #[serde(default)]
    pub keeps_symbol: bool,
}

impl TransitionRule {
    pub fn new(
        current_state: impl Into<State>,
        read_symbol: impl Into<Symbol>,
        next_state: impl Into<State>,
        write_symbol: impl Into<Symbol>,
        direction: Direction,
    ) -> Self {
        Self {
            current_state: current_state.into(),
            read_symbol: read_symbol.into(),
            next_state: next_state.into(),
            write_symbol: write_symbol.into(),
            direction,
            keeps_symbol: false,
        }
    }

    /// Marks the rule as leaving the cell untouched.
    pub fn keeping_symbol(mut self) -> Self {
        self.keeps_symbol = true;
        self
    }
}

impl fmt::Display for TransitionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, {} -> {}, {}, {}",
            self.current_state, self.read_symbol, self.next_state, self.write_symbol, self.direction
        )
    }
}

/// Represents the possible head movements of a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left, never past the first cell.
    Left,
    /// Move the head one position to the right, growing the tape if needed.
    Right,
    /// Keep the head in place and halt the machine.
    None,
}

impl Direction {
    /// Parses a direction letter (`L`, `R` or `N`).
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "L" => Some(Direction::Left),
            "R" => Some(Direction::Right),
            "N" => Some(Direction::None),
            _ => None,
        }
    }

    /// Returns the letter used for this direction in both notations.
    pub fn letter(&self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
            Direction::None => 'N',
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// How the engine treats rules that write the blank symbol.
///
/// - `Skip` (default): a blank write leaves the cell untouched, so a rule can never
///   erase a cell. This is the behavior the notations were written against.
/// - `Overwrite`: a blank write stores the blank like any other symbol.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlankWrites {
    #[default]
    Skip,
    Overwrite,
}

/// The lifecycle status of a machine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    /// The machine can take another step.
    Running,
    /// A rule with a `None` move was applied.
    Halted,
    /// No rule matched the current state and symbol.
    Errored(Rejection),
}

impl Status {
    /// Returns `true` for `Halted` and `Errored`, from which no further step is possible.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Status::Running)
    }
}

/// Details of a missing transition.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("No transition defined for state '{state}' reading symbol '{symbol}'")]
pub struct Rejection {
    pub state: State,
    pub symbol: Symbol,
}

/// A line skipped by one of the parsers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseWarning {
    /// 1-based line number.
    pub line: usize,
    /// The trimmed line content.
    pub content: String,
    /// Why the line was skipped.
    pub message: String,
}

impl fmt::Display for ParseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {} ({})", self.line, self.message, self.content)
    }
}

/// Represents various errors that can occur while preparing or running a machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// The source parsed into zero transition rules, so there is nothing to run.
    #[error("No transition rules found")]
    EmptyTransitionSet,
    /// No rule is defined for the current state and symbol.
    #[error(transparent)]
    UndefinedTransition(#[from] Rejection),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// Indicates a program that cannot be used as given.
    #[error("Program validation error: {0}")]
    ValidationError(String),
}
