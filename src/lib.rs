//! This crate provides the core logic for a Turing machine simulator.
//! It parses machine descriptions written in a classic rule-list notation or a structured
//! block notation into one canonical transition table, and advances machine
//! configurations one transition at a time with a pure step function.
//!
//! ```
//! use tmsim::{parse, Status, TuringMachine};
//!
//! let program = parse("Initial tape: 01\nq0, 0 -> q0, 1, R\nq0, 1 -> q0, 0, R\nq0, _ -> q0, _, N");
//! let mut machine = TuringMachine::new(&program).unwrap();
//!
//! while machine.step() == &Status::Running {}
//! assert_eq!(machine.tape_string(), "10");
//! ```

pub mod classic;
pub mod encoder;
pub mod format;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod structured;
pub mod table;
pub mod types;

/// Re-exports the classic-notation encoder.
pub use encoder::encode_classic;
/// Re-exports the format classifier.
pub use format::classify;
/// Re-exports the `ProgramLoader` struct from the loader module.
pub use loader::ProgramLoader;
/// Re-exports the execution engine.
pub use machine::{initialize, step, Configuration, Outcome, TuringMachine};
/// Re-exports the parsing entry points.
pub use parser::{parse, parse_as};
/// Re-exports `NamedProgram`, `ProgramInfo`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{NamedProgram, ProgramInfo, ProgramManager, PROGRAMS};
/// Re-exports the transition table.
pub use table::TransitionTable;
/// Re-exports the data model and error types.
pub use types::{
    BlankWrites, Direction, Format, ParseWarning, Program, Rejection, State, Status, Symbol,
    TransitionRule, TuringMachineError, DEFAULT_MAX_STEPS, MAX_PROGRAM_SIZE,
};
