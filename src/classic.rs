//! This module provides the parser for the classic, line-oriented notation, utilizing the
//! `pest` crate. Each line is parsed on its own so one malformed line never prevents the
//! rest of the source from being used.

use crate::types::{
    Direction, Format, ParseWarning, Program, Symbol, TransitionRule, DEFAULT_BLANK_SYMBOL,
    DEFAULT_CLASSIC_START_STATE, DEFAULT_TAPE,
};
use pest::{
    iterators::{Pair, Pairs},
    Parser as PestParser,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for a single line of the classic notation defined in `classic.pest`.
#[derive(PestParser)]
#[grammar = "classic.pest"]
pub struct ClassicParser;

/// What a single non-empty, non-comment line turned out to be.
#[derive(Debug, PartialEq)]
enum ClassicLine {
    Rule(TransitionRule),
    Tape(Vec<Symbol>),
}

/// Parses a classic-notation source into a `Program`.
///
/// Blank lines and `#` comments are ignored. Every other line must be either a rule
/// (`q0, 0 -> q1, 1, R`), a halt shorthand (`qa, _, _, N`) or an `Initial tape:` directive.
/// Lines that match none of these are skipped and recorded in `Program::warnings`.
///
/// The start state is always `q0`. Without a tape directive the tape defaults to `000`.
///
/// # Arguments
///
/// * `source` - A string slice containing the classic program.
///
/// # Returns
///
/// * A `Program` whose `rules` may be empty; the caller decides whether that is an error.
pub fn parse_classic(source: &str) -> Program {
    let mut program = Program {
        format: Format::Classic,
        initial_state: DEFAULT_CLASSIC_START_STATE.to_string(),
        blank: DEFAULT_BLANK_SYMBOL.to_string(),
        tape: Vec::new(),
        rules: Vec::new(),
        states: Vec::new(),
        warnings: Vec::new(),
    };

    for (index, raw) in source.lines().enumerate() {
        let line = raw.trim();

        // Skip comments and empty lines
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match parse_line(line) {
            Ok(ClassicLine::Rule(rule)) => {
                program.add_state(&rule.current_state);
                program.add_state(&rule.next_state);
                program.rules.push(rule);
            }
            Ok(ClassicLine::Tape(symbols)) => program.tape = symbols,
            Err(message) => {
                let warning = ParseWarning {
                    line: index + 1,
                    content: line.to_string(),
                    message,
                };
                log::warn!("Skipping classic line {}", warning);
                program.warnings.push(warning);
            }
        }
    }

    if program.tape.is_empty() {
        program.tape = DEFAULT_TAPE.iter().map(|s| s.to_string()).collect();
    }

    log::debug!(
        "{} rules parsed ({} lines skipped)",
        program.rules.len(),
        program.warnings.len()
    );

    program
}

/// Parses one trimmed line, returning the pest error message on failure.
fn parse_line(line: &str) -> Result<ClassicLine, String> {
    let root = ClassicParser::parse(Rule::line, line)
        .map_err(|e| e.variant.message().to_string())?
        .next()
        .and_then(|line| line.into_inner().next())
        .ok_or_else(|| "empty line".to_string())?;

    match root.as_rule() {
        Rule::arrow_rule => Ok(ClassicLine::Rule(parse_arrow_rule(root))),
        Rule::halt_rule => Ok(ClassicLine::Rule(parse_halt_rule(root))),
        Rule::tape_directive => Ok(ClassicLine::Tape(parse_tape_directive(root))),
        rule => Err(format!("unexpected {rule:?}")),
    }
}

/// Rule: arrow_rule > token, token, token, token, direction
fn parse_arrow_rule(pair: Pair<Rule>) -> TransitionRule {
    let mut pairs = pair.into_inner();
    let current_state = parse_string(&mut pairs);
    let read_symbol = parse_string(&mut pairs);
    let next_state = parse_string(&mut pairs);
    let write_symbol = parse_string(&mut pairs);
    let direction = parse_direction(&mut pairs);

    TransitionRule {
        current_state,
        read_symbol,
        next_state,
        write_symbol,
        direction,
        keeps_symbol: false,
    }
}

/// Rule: halt_rule > token, token, token, direction
///
/// The shorthand has no next state; the machine stays in the current one.
fn parse_halt_rule(pair: Pair<Rule>) -> TransitionRule {
    let mut pairs = pair.into_inner();
    let current_state = parse_string(&mut pairs);
    let read_symbol = parse_string(&mut pairs);
    let write_symbol = parse_string(&mut pairs);
    let direction = parse_direction(&mut pairs);

    TransitionRule {
        next_state: current_state.clone(),
        current_state,
        read_symbol,
        write_symbol,
        direction,
        keeps_symbol: false,
    }
}

/// Rule: tape_directive > tape_symbols
fn parse_tape_directive(pair: Pair<Rule>) -> Vec<Symbol> {
    pair.into_inner()
        .next()
        .map(|symbols| {
            symbols
                .as_str()
                .chars()
                .filter(|c| !c.is_whitespace())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// The grammar only admits `L`, `R` and `N`; anything else can't reach this point.
fn parse_direction(pairs: &mut Pairs<Rule>) -> Direction {
    pairs
        .next()
        .and_then(|p| Direction::from_letter(p.as_str()))
        .unwrap_or(Direction::None)
}

/// Extracts the string content from the current `Pair` in a `Pairs` iterator.
fn parse_string(pairs: &mut Pairs<Rule>) -> String {
    pairs
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}
