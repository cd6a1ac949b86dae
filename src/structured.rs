//! This module provides the parser for the structured notation, utilizing the `pest` crate.
//! A structured source declares its input, blank symbol and start state as metadata and
//! groups transitions under per-state blocks:
//!
//! ```text
//! input: '101'
//! blank: '_'
//! start state: right
//! table:
//!   right:
//!     [0,1]: {R: right}
//!     _    : {L: carry}
//! ```
//!
//! Lines are scanned one at a time and indentation carries no meaning; a state header
//! simply sets the state that following transition lines belong to.

use crate::types::{
    Direction, Format, ParseWarning, Program, State, Symbol, TransitionRule,
    DEFAULT_BLANK_SYMBOL, DEFAULT_STRUCTURED_START_STATE, DEFAULT_TAPE,
};
use pest::{iterators::Pair, Parser as PestParser};
use pest_derive::Parser as PestParser;
use serde::{Deserialize, Serialize};

/// Derives a `PestParser` for a single line of the structured notation defined in `structured.pest`.
#[derive(PestParser)]
#[grammar = "structured.pest"]
pub struct StructuredParser;

/// A structured source before it is flattened into canonical rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuringMachineConfig {
    /// The resolved start state.
    pub initial_state: State,
    /// The declared blank symbol, `_` if none.
    pub blank: Symbol,
    /// The declared input, empty if none.
    pub input: String,
    /// State blocks in declaration order.
    pub blocks: Vec<StateBlock>,
}

/// The transitions listed under one state header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateBlock {
    pub state: State,
    /// `(read symbol, action)` pairs in order of first appearance. A symbol listed again
    /// keeps its position and takes the later action.
    pub transitions: Vec<(Symbol, Action)>,
}

/// The right-hand side of a structured transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// The symbol to write; `None` writes back the symbol that was read.
    pub write: Option<Symbol>,
    pub direction: Direction,
    pub next_state: State,
}

/// What a single non-empty, non-comment line turned out to be.
enum StructuredLine {
    Input(String),
    Blank(Symbol),
    Start(State),
    Table,
    Header(State),
    Transition(Vec<Symbol>, ParsedAction),
}

/// An action as written, before the current state is known and before validation.
struct ParsedAction {
    writes: Vec<Symbol>,
    /// `(direction, explicit next state)`; a bare direction has no next state.
    moves: Vec<(Direction, Option<State>)>,
}

/// Parses a structured source into its block form.
///
/// Metadata may appear anywhere and in any order. Transition lines that appear before any
/// state header, that carry no direction or more than one, or that match no form at all
/// are skipped and reported in the returned warnings.
///
/// The start state is the `start state:` value if present, otherwise the first state block,
/// otherwise `right`.
pub fn parse_structured_config(source: &str) -> (TuringMachineConfig, Vec<ParseWarning>) {
    let mut declared_start: Option<State> = None;
    let mut blank: Option<Symbol> = None;
    let mut input = String::new();
    let mut blocks: Vec<StateBlock> = Vec::new();
    let mut current: Option<usize> = None;
    let mut warnings = Vec::new();

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut warn = |message: String| {
            let warning = ParseWarning {
                line: index + 1,
                content: line.to_string(),
                message,
            };
            log::warn!("Skipping structured line {}", warning);
            warnings.push(warning);
        };

        match parse_line(line) {
            Ok(StructuredLine::Input(value)) => input = value,
            Ok(StructuredLine::Blank(value)) if value.is_empty() => {
                warn("blank symbol must not be empty".to_string())
            }
            Ok(StructuredLine::Blank(value)) => blank = Some(value),
            Ok(StructuredLine::Start(state)) => declared_start = Some(state),
            Ok(StructuredLine::Table) => {}
            Ok(StructuredLine::Header(state)) => {
                // Repeated headers continue the existing block
                let position = match blocks.iter().position(|b| b.state == state) {
                    Some(position) => position,
                    None => {
                        blocks.push(StateBlock {
                            state,
                            transitions: Vec::new(),
                        });
                        blocks.len() - 1
                    }
                };
                current = Some(position);
            }
            Ok(StructuredLine::Transition(symbols, parsed)) => {
                let Some(position) = current else {
                    warn("transition outside of a state block".to_string());
                    continue;
                };
                let block = &mut blocks[position];

                match resolve_action(parsed, &block.state) {
                    Ok(action) => {
                        for symbol in symbols {
                            // A symbol already in the block takes the later action
                            match block.transitions.iter_mut().find(|(s, _)| *s == symbol) {
                                Some(existing) => existing.1 = action.clone(),
                                None => block.transitions.push((symbol, action.clone())),
                            }
                        }
                    }
                    Err(message) => warn(message),
                }
            }
            Err(message) => warn(message),
        }
    }

    let initial_state = declared_start
        .or_else(|| blocks.first().map(|b| b.state.clone()))
        .unwrap_or_else(|| DEFAULT_STRUCTURED_START_STATE.to_string());

    let config = TuringMachineConfig {
        initial_state,
        blank: blank.unwrap_or_else(|| DEFAULT_BLANK_SYMBOL.to_string()),
        input,
        blocks,
    };

    (config, warnings)
}

/// Parses a structured source into a `Program`.
///
/// # Arguments
///
/// * `source` - A string slice containing the structured program.
///
/// # Returns
///
/// * A `Program` with the rules of every block flattened in source order. Its `rules` may
///   be empty; the caller decides whether that is an error.
pub fn parse_structured(source: &str) -> Program {
    let (config, warnings) = parse_structured_config(source);
    let program = flatten(config, warnings);

    log::debug!(
        "{} rules parsed ({} lines skipped)",
        program.rules.len(),
        program.warnings.len()
    );

    program
}

/// Flattens block form into canonical rules.
///
/// An empty read symbol stands for the blank. A missing write symbol leaves the cell as
/// it is, so the rule is marked with [`TransitionRule::keeps_symbol`].
pub fn flatten(config: TuringMachineConfig, warnings: Vec<ParseWarning>) -> Program {
    let tape = if config.input.is_empty() {
        DEFAULT_TAPE.iter().map(|s| s.to_string()).collect()
    } else {
        config.input.chars().map(String::from).collect()
    };

    let mut program = Program {
        format: Format::Structured,
        initial_state: config.initial_state,
        blank: config.blank,
        tape,
        rules: Vec::new(),
        states: Vec::new(),
        warnings,
    };

    for block in &config.blocks {
        program.add_state(&block.state);
    }

    for block in config.blocks {
        for (symbol, action) in block.transitions {
            let read_symbol = if symbol.is_empty() {
                program.blank.clone()
            } else {
                symbol
            };
            let keeps_symbol = action.write.is_none();
            let write_symbol = match action.write {
                Some(write) if write.is_empty() => program.blank.clone(),
                Some(write) => write,
                None => read_symbol.clone(),
            };

            program.add_state(&action.next_state);
            program.rules.push(TransitionRule {
                current_state: block.state.clone(),
                read_symbol,
                next_state: action.next_state,
                write_symbol,
                direction: action.direction,
                keeps_symbol,
            });
        }
    }

    program
}

/// Checks the entries of an action and fills in the next state of a bare direction.
fn resolve_action(parsed: ParsedAction, state: &str) -> Result<Action, String> {
    if parsed.writes.len() > 1 {
        return Err("more than one write entry".to_string());
    }

    let mut moves = parsed.moves.into_iter();
    let (direction, next_state) = match (moves.next(), moves.next()) {
        (Some(only), None) => only,
        (None, _) => return Err("missing direction".to_string()),
        (Some(_), Some(_)) => return Err("more than one direction".to_string()),
    };

    Ok(Action {
        write: parsed.writes.into_iter().next(),
        direction,
        next_state: next_state.unwrap_or_else(|| state.to_string()),
    })
}

/// Parses one trimmed line, returning the pest error message on failure.
fn parse_line(line: &str) -> Result<StructuredLine, String> {
    let root = StructuredParser::parse(Rule::line, line)
        .map_err(|e| e.variant.message().to_string())?
        .next()
        .and_then(|line| line.into_inner().next())
        .ok_or_else(|| "empty line".to_string())?;

    let parsed = match root.as_rule() {
        Rule::input_decl => StructuredLine::Input(first_symbol(root)),
        Rule::blank_decl => StructuredLine::Blank(first_symbol(root)),
        Rule::start_decl => StructuredLine::Start(first_str(root)),
        Rule::table_marker => StructuredLine::Table,
        Rule::state_header => StructuredLine::Header(first_str(root)),
        Rule::transition => parse_transition(root),
        rule => return Err(format!("unexpected {rule:?}")),
    };

    Ok(parsed)
}

/// Rule: transition > (symbol_list | symbol), action
fn parse_transition(pair: Pair<Rule>) -> StructuredLine {
    let mut symbols = Vec::new();
    let mut action = ParsedAction {
        writes: Vec::new(),
        moves: Vec::new(),
    };

    for inner in pair.into_inner() {
        match inner.as_rule() {
            Rule::symbol_list => symbols.extend(inner.into_inner().map(parse_symbol)),
            Rule::symbol => symbols.push(parse_symbol(inner)),
            Rule::action => parse_action(inner, &mut action),
            _ => {}
        }
    }

    StructuredLine::Transition(symbols, action)
}

/// Rule: action > (write_entry | move_entry | bare_move)*
fn parse_action(pair: Pair<Rule>, action: &mut ParsedAction) {
    for entry in pair.into_inner() {
        match entry.as_rule() {
            Rule::write_entry => action.writes.push(first_symbol(entry)),
            Rule::move_entry => {
                let mut pairs = entry.into_inner();
                let direction = pairs.next().and_then(|p| Direction::from_letter(p.as_str()));
                let next_state = pairs.next().map(|p| p.as_str().to_string());
                if let Some(direction) = direction {
                    action.moves.push((direction, next_state));
                }
            }
            Rule::bare_move => {
                if let Some(direction) = entry
                    .into_inner()
                    .next()
                    .and_then(|p| Direction::from_letter(p.as_str()))
                {
                    action.moves.push((direction, None));
                }
            }
            _ => {}
        }
    }
}

/// Rule: symbol > (quoted > (single_inner | double_inner) | bare_symbol)
///
/// Quotes are stripped, so `' '` is a single space.
fn parse_symbol(pair: Pair<Rule>) -> Symbol {
    let Some(inner) = pair.into_inner().next() else {
        return Symbol::new();
    };

    match inner.as_rule() {
        Rule::quoted => inner
            .into_inner()
            .next()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
        _ => inner.as_str().to_string(),
    }
}

/// Returns the first `symbol` or `quoted` child of `pair`, unquoted.
fn first_symbol(pair: Pair<Rule>) -> Symbol {
    match pair.into_inner().next() {
        Some(inner) if inner.as_rule() == Rule::symbol => parse_symbol(inner),
        Some(inner) => inner
            .into_inner()
            .next()
            .map(|p| p.as_str().to_string())
            .unwrap_or_default(),
        None => Symbol::new(),
    }
}

/// Returns the text of the first child of `pair`.
fn first_str(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    const INCREMENT: &str = r#"
# Adds 1 to a binary number.
input: '1011'
blank: '_'
start state: right
table:
  # scan to the rightmost digit
  right:
    [1,0]: {R: right}
    _    : {L: carry}
  carry:
    1      : {write: 0, L}
    [0,_]  : {write: 1, L: done}
  done:
"#;

    #[test]
    fn test_parse_metadata() {
        let (config, warnings) = parse_structured_config(INCREMENT);

        assert!(warnings.is_empty(), "unexpected warnings: {warnings:?}");
        assert_eq!(config.input, "1011");
        assert_eq!(config.blank, "_");
        assert_eq!(config.initial_state, "right");
        let states: Vec<_> = config.blocks.iter().map(|b| b.state.as_str()).collect();
        assert_eq!(states, vec!["right", "carry", "done"]);
        assert!(config.blocks[2].transitions.is_empty());
    }

    #[test]
    fn test_flatten_increment() {
        let program = parse_structured(INCREMENT);

        assert_eq!(program.format, Format::Structured);
        assert_eq!(program.initial_tape(), "1011");
        assert_eq!(program.rule_count(), 6);
        assert_eq!(
            program.rules,
            vec![
                TransitionRule::new("right", "1", "right", "1", Direction::Right).keeping_symbol(),
                TransitionRule::new("right", "0", "right", "0", Direction::Right).keeping_symbol(),
                TransitionRule::new("right", "_", "carry", "_", Direction::Left).keeping_symbol(),
                TransitionRule::new("carry", "1", "carry", "0", Direction::Left),
                TransitionRule::new("carry", "0", "done", "1", Direction::Left),
                TransitionRule::new("carry", "_", "done", "1", Direction::Left),
            ]
        );
        assert_eq!(program.states, vec!["right", "carry", "done"]);
    }

    #[test]
    fn test_scenario_bracketed_list_and_blank_fallback() {
        let source = r#"
input: '101'
blank: '_'
start state: right
table:
  right:
    [0,1]: {R: right}
    _: {L: carry}
  carry:
"#;
        let program = parse_structured(source);
        let right: Vec<_> = program
            .rules
            .iter()
            .filter(|r| r.current_state == "right")
            .collect();

        assert_eq!(right.len(), 3);
        assert!(right[..2]
            .iter()
            .all(|r| r.next_state == "right" && r.direction == Direction::Right));
        assert_eq!(right[0].write_symbol, "0");
        assert_eq!(right[1].write_symbol, "1");
        assert_eq!(right[2].read_symbol, program.blank);
        assert_eq!(right[2].next_state, "carry");
        assert_eq!(right[2].direction, Direction::Left);
    }

    #[test]
    fn test_direction_takes_precedence_over_write() {
        let program = parse_structured("table:\n s:\n  a: {write: R, L: N}\n  b: {N: R}");

        assert_eq!(
            program.rules,
            vec![
                TransitionRule::new("s", "a", "N", "R", Direction::Left),
                TransitionRule::new("s", "b", "R", "b", Direction::None).keeping_symbol(),
            ]
        );
    }

    #[test]
    fn test_entries_in_any_order() {
        let program = parse_structured("table:\n s:\n  a: {L: t, write: x}");

        assert_eq!(
            program.rules,
            vec![TransitionRule::new("s", "a", "t", "x", Direction::Left)]
        );
    }

    #[test]
    fn test_quoted_symbols() {
        let source = "input: \"ab\"\nblank: ' '\ntable:\n q:\n  ' ': {write: '#', N: q}\n  ['a', b]: R";
        let program = parse_structured(source);

        assert_eq!(program.blank, " ");
        assert_eq!(program.initial_tape(), "ab");
        assert_eq!(program.rule_count(), 3);
        assert_eq!(program.rules[0].read_symbol, " ");
        assert_eq!(program.rules[0].write_symbol, "#");
        assert_eq!(program.rules[1].read_symbol, "a");
        assert_eq!(program.rules[2].read_symbol, "b");
        assert_eq!(program.rules[2].next_state, "q");
    }

    #[test]
    fn test_empty_quoted_symbol_is_blank() {
        let program = parse_structured("blank: '.'\ntable:\n q:\n  '': {write: '', R: q}");

        assert_eq!(program.rules[0].read_symbol, ".");
        assert_eq!(program.rules[0].write_symbol, ".");
    }

    #[test]
    fn test_default_start_state_is_first_block() {
        let (config, _) = parse_structured_config("table:\n  scan:\n    0: {R: scan}\n  done:\n");

        assert_eq!(config.initial_state, "scan");
    }

    #[test]
    fn test_fallback_start_state_without_blocks() {
        let program = parse_structured("input: '11'");

        assert_eq!(program.initial_state, DEFAULT_STRUCTURED_START_STATE);
        assert!(program.is_empty());
    }

    #[test]
    fn test_default_tape_and_blank() {
        let program = parse_structured("table:\n q:\n  0: {R: q}");

        assert_eq!(program.tape, vec!["0", "0", "0"]);
        assert_eq!(program.blank, DEFAULT_BLANK_SYMBOL);
    }

    #[test]
    fn test_invalid_lines_are_reported() {
        let source = r#"
table:
  0: {R: orphan}
  s:
    a: {write: b}
    b: {L: x, R: y}
    c: {write: 1, write: 2, R: s}
    d: {R: s}
    ??? nonsense
"#;
        let program = parse_structured(source);

        assert_eq!(program.rule_count(), 1);
        assert_eq!(program.rules[0].read_symbol, "d");
        let lines: Vec<_> = program.warnings.iter().map(|w| w.line).collect();
        assert_eq!(lines, vec![3, 5, 6, 7, 9]);
        assert_eq!(program.warnings[0].message, "transition outside of a state block");
        assert_eq!(program.warnings[1].message, "missing direction");
    }

    #[test]
    fn test_repeated_header_merges_block() {
        let source = "table:\n a:\n  0: {R: b}\n b:\n  0: {L: a}\n a:\n  1: {N: a}";
        let (config, _) = parse_structured_config(source);

        assert_eq!(config.blocks.len(), 2);
        assert_eq!(config.blocks[0].transitions.len(), 2);
    }

    #[test]
    fn test_repeated_symbol_takes_last_action() {
        let source = "table:\n s:\n  0: {write: 1, N: a}\n  1: {R: s}\n  0: {write: 2, N: b}";
        let (config, _) = parse_structured_config(source);

        let symbols: Vec<_> = config.blocks[0].transitions.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(symbols, vec!["0", "1"]);

        let program = parse_structured(source);
        assert_eq!(program.rule_count(), 2);
        assert_eq!(
            program.rules[0],
            TransitionRule::new("s", "0", "b", "2", Direction::None)
        );
    }

    #[test]
    fn test_repeated_symbol_across_headers() {
        let source = "input: '0'\ntable:\n a:\n  [0,1]: {write: 1, N: a}\n b:\n  0: {L: a}\n a:\n  0: {write: 2, N: b}";
        let program = parse_structured(source);

        let rules: Vec<_> = program.rules.iter().filter(|r| r.current_state == "a").collect();
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].read_symbol, "0");
        assert_eq!(rules[0].next_state, "b");
        assert_eq!(rules[0].write_symbol, "2");
        assert_eq!(rules[1].read_symbol, "1");
        assert_eq!(rules[1].next_state, "a");
    }

    #[test]
    fn test_next_state_names() {
        let program = parse_structured("table:\n s:\n  0: {R: q'}\n  1: {L: état}\n  2: {write: x, N: done!}");

        assert!(program.warnings.is_empty(), "{:?}", program.warnings);
        let next: Vec<_> = program.rules.iter().map(|r| r.next_state.as_str()).collect();
        assert_eq!(next, vec!["q'", "état", "done!"]);
    }

    #[test]
    fn test_missing_write_keeps_symbol() {
        let program = parse_structured("table:\n s:\n  _: {R: s}\n  0: {write: 1, R: s}");

        assert!(program.rules[0].keeps_symbol);
        assert!(!program.rules[1].keeps_symbol);
    }

    #[test]
    fn test_trailing_comments() {
        let program = parse_structured("start state: s # begin here\ntable:\n s: # scanning\n  0: {R: s} # keep going");

        assert!(program.warnings.is_empty(), "{:?}", program.warnings);
        assert_eq!(program.initial_state, "s");
        assert_eq!(program.rule_count(), 1);
    }
}
