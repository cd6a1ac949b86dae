//! This module provides the `ProgramLoader` struct, responsible for loading machine
//! sources from files, directories and strings.

use crate::parser::parse;
use crate::types::{Program, TuringMachineError, MAX_PROGRAM_SIZE};
use std::fs;
use std::path::{Path, PathBuf};

/// File extension of machine sources discovered by [`ProgramLoader::load_programs`].
pub const PROGRAM_EXTENSION: &str = "tm";

/// `ProgramLoader` is a utility struct for loading machine sources.
/// It provides methods to load a program from a file or from string content,
/// and to discover and load all `.tm` files within a directory.
pub struct ProgramLoader;

impl ProgramLoader {
    /// Loads a single program from the specified file path.
    ///
    /// # Arguments
    ///
    /// * `path` - A reference to the `Path` of the source file to load.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the file is read successfully. The program may still contain
    ///   warnings or no rules at all.
    /// * `Err(TuringMachineError::FileError)` if the file cannot be read.
    /// * `Err(TuringMachineError::ValidationError)` if the file exceeds `MAX_PROGRAM_SIZE`.
    pub fn load_program(path: &Path) -> Result<Program, TuringMachineError> {
        let content = fs::read_to_string(path).map_err(|e| {
            TuringMachineError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        Self::load_program_from_string(&content)
    }

    /// Loads a single program from the provided string content.
    ///
    /// This is useful for parsing programs that are not stored in files, e.g., from user input.
    ///
    /// # Returns
    ///
    /// * `Ok(Program)` if the content is within `MAX_PROGRAM_SIZE`.
    /// * `Err(TuringMachineError::ValidationError)` otherwise.
    pub fn load_program_from_string(content: &str) -> Result<Program, TuringMachineError> {
        if content.len() > MAX_PROGRAM_SIZE {
            return Err(TuringMachineError::ValidationError(format!(
                "Program is {} bytes, the limit is {}",
                content.len(),
                MAX_PROGRAM_SIZE
            )));
        }

        Ok(parse(content))
    }

    /// Loads all program files (`.tm` extension) from a given directory.
    ///
    /// Directories and files with other extensions are skipped.
    ///
    /// # Returns
    ///
    /// * `Vec<Result<(PathBuf, Program), TuringMachineError>>` - one entry per `.tm` file,
    ///   or a single error if the directory itself cannot be read.
    pub fn load_programs(directory: &Path) -> Vec<Result<(PathBuf, Program), TuringMachineError>> {
        if !directory.exists() {
            return vec![Err(TuringMachineError::FileError(format!(
                "Directory {} does not exist",
                directory.display()
            )))];
        }

        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(TuringMachineError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results: Vec<_> = entries
            .filter_map(|entry| {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        return Some(Err(TuringMachineError::FileError(format!(
                            "Failed to read directory entry: {}",
                            e
                        ))))
                    }
                };

                let path = entry.path();

                if path.is_dir() || path.extension().map_or(true, |ext| ext != PROGRAM_EXTENSION) {
                    return None;
                }

                Some(Self::load_program(&path).map(|program| (path, program)))
            })
            .collect();

        // read_dir order is platform dependent
        results.sort_by(|a, b| match (a, b) {
            (Ok((a, _)), Ok((b, _))) => a.cmp(b),
            (Ok(_), Err(_)) => std::cmp::Ordering::Less,
            (Err(_), Ok(_)) => std::cmp::Ordering::Greater,
            (Err(_), Err(_)) => std::cmp::Ordering::Equal,
        });

        results
    }
}
