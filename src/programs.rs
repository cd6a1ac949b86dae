//! Built-in example machines, embedded at compile time and parsed on first use.

use crate::parser::parse;
use crate::types::{Format, Program, TuringMachineError};

use std::sync::RwLock;

// Default embedded programs
const PROGRAM_TEXTS: [&str; 4] = [
    include_str!("../programs/binary-increment.tm"),
    include_str!("../programs/palindrome.tm"),
    include_str!("../programs/binary-increment-structured.tm"),
    include_str!("../programs/bit-flipper.tm"),
];

/// Marker of the comment line that names a gallery program.
const NAME_MARKER: &str = "# name:";

/// A gallery program together with its display name and source text.
#[derive(Debug, Clone)]
pub struct NamedProgram {
    pub name: String,
    pub source: &'static str,
    pub program: Program,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: RwLock<Vec<NamedProgram>> = RwLock::new(Vec::new());
}

pub struct ProgramManager;

impl ProgramManager {
    /// Parses the embedded programs into `PROGRAMS` unless that has already happened.
    pub fn load() -> Result<(), TuringMachineError> {
        let mut programs = PROGRAMS.write().map_err(|_| {
            TuringMachineError::FileError("Failed to acquire write lock".to_string())
        })?;

        if !programs.is_empty() {
            return Ok(());
        }

        for (index, source) in PROGRAM_TEXTS.into_iter().enumerate() {
            let program = parse(source);
            if program.is_empty() {
                log::warn!("Embedded program {} has no rules", index);
                continue;
            }

            programs.push(NamedProgram {
                name: program_name(source).unwrap_or_else(|| format!("Program {}", index + 1)),
                source,
                program,
            });
        }

        Ok(())
    }

    /// Get the number of available programs
    pub fn get_program_count() -> usize {
        let _ = Self::load();

        PROGRAMS.read().map(|programs| programs.len()).unwrap_or(0)
    }

    /// Get a program by its index
    pub fn get_program_by_index(index: usize) -> Result<NamedProgram, TuringMachineError> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map_err(|_| TuringMachineError::FileError("Failed to acquire read lock".to_string()))?
            .get(index)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program index {} out of range", index))
            })
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<NamedProgram, TuringMachineError> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map_err(|_| TuringMachineError::FileError("Failed to acquire read lock".to_string()))?
            .iter()
            .find(|entry| entry.name == name)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        let _ = Self::load();

        PROGRAMS
            .read()
            .map(|programs| programs.iter().map(|entry| entry.name.clone()).collect())
            .unwrap_or_default()
    }

    /// Get summary information about a program by its index
    pub fn get_program_info(index: usize) -> Result<ProgramInfo, TuringMachineError> {
        let entry = Self::get_program_by_index(index)?;
        let program = &entry.program;

        Ok(ProgramInfo {
            index,
            name: entry.name.clone(),
            format: program.format,
            initial_state: program.initial_state.clone(),
            initial_tape: program.initial_tape(),
            state_count: program.states.len(),
            rule_count: program.rule_count(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProgramInfo {
    pub index: usize,
    pub name: String,
    pub format: Format,
    pub initial_state: String,
    pub initial_tape: String,
    pub state_count: usize,
    pub rule_count: usize,
}

/// Returns the value of the first `# name:` comment line in `source`.
fn program_name(source: &str) -> Option<String> {
    source
        .lines()
        .filter_map(|line| line.trim().strip_prefix(NAME_MARKER))
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
}
