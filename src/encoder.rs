//! This module renders a parsed program back into the classic notation, which is how a
//! structured source is converted into a flat rule list.

use crate::types::{
    Program, State, TuringMachineError, DEFAULT_BLANK_SYMBOL, DEFAULT_CLASSIC_START_STATE,
};

/// Encodes `program` as classic-notation source.
///
/// Output layout:
/// - a `# Converted from <format> format` header
/// - an `Initial tape:` directive
/// - one `state, read -> next, write, D` line per rule, in rule order
///
/// The classic notation always starts in `q0` and always uses `_` as blank, so the
/// program's start state is swapped with `q0` and its blank is written as `_`. Parsing
/// the output with the classic parser therefore yields a machine that behaves the same.
/// The classic notation always spells out a write, so a rule that keeps its cell is
/// written as writing back its read symbol. The two only differ under
/// [`crate::BlankWrites::Overwrite`] when such a rule matches as a blank wildcard.
///
/// # Returns
///
/// * `Err(TuringMachineError::ValidationError)` if a symbol or state can't be written in
///   the classic notation (it contains a separator or whitespace, or a tape cell holds more
///   than one character).
pub fn encode_classic(program: &Program) -> Result<String, TuringMachineError> {
    let mut lines = vec![format!("# Converted from {} format", program.format)];

    let tape = program
        .tape
        .iter()
        .map(|cell| {
            let symbol = encode_symbol(cell, &program.blank)?;
            if symbol.chars().count() != 1 {
                return Err(unencodable("tape cell", cell));
            }
            Ok(symbol)
        })
        .collect::<Result<String, _>>()?;
    lines.push(format!("Initial tape: {}", tape));

    for rule in &program.rules {
        lines.push(format!(
            "{}, {} -> {}, {}, {}",
            encode_state(&rule.current_state, &program.initial_state)?,
            encode_symbol(&rule.read_symbol, &program.blank)?,
            encode_state(&rule.next_state, &program.initial_state)?,
            encode_symbol(&rule.write_symbol, &program.blank)?,
            rule.direction
        ));
    }

    let mut source = lines.join("\n");
    source.push('\n');

    Ok(source)
}

/// Maps the start state to `q0` and `q0` to the start state.
fn encode_state(state: &str, initial_state: &str) -> Result<State, TuringMachineError> {
    let encoded = if state == initial_state {
        DEFAULT_CLASSIC_START_STATE
    } else if state == DEFAULT_CLASSIC_START_STATE {
        initial_state
    } else {
        state
    };

    check_token("state", encoded)
}

fn encode_symbol(symbol: &str, blank: &str) -> Result<String, TuringMachineError> {
    if symbol == blank {
        return Ok(DEFAULT_BLANK_SYMBOL.to_string());
    }
    if symbol == DEFAULT_BLANK_SYMBOL {
        // `_` is a regular symbol here but would read back as the blank.
        return Err(unencodable("symbol", symbol));
    }

    check_token("symbol", symbol)
}

fn check_token(kind: &str, token: &str) -> Result<String, TuringMachineError> {
    let valid = !token.is_empty()
        && !token.contains("->")
        && !token.chars().any(|c| c == ',' || c == '#' || c.is_whitespace());

    if valid {
        Ok(token.to_string())
    } else {
        Err(unencodable(kind, token))
    }
}

fn unencodable(kind: &str, token: &str) -> TuringMachineError {
    TuringMachineError::ValidationError(format!(
        "Cannot encode {} '{}' in classic format",
        kind, token
    ))
}
