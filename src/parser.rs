//! Entry point for parsing a source in either notation.

use crate::classic::parse_classic;
use crate::format::classify;
use crate::structured::parse_structured;
use crate::types::{Format, Program};

/// Parses `source` with the grammar chosen by [`classify`].
///
/// Parsing never fails as a whole: unreadable lines are skipped and listed in
/// `Program::warnings`, and a source without any usable rule yields a `Program` with no
/// rules. Building a [`crate::TransitionTable`] from such a program reports
/// `EmptyTransitionSet`.
///
/// # Arguments
///
/// * `source` - The program text in classic or structured notation.
pub fn parse(source: &str) -> Program {
    let format = classify(source);
    log::debug!("Parsing source as {} notation", format);

    parse_as(source, format)
}

/// Parses `source` with an explicitly chosen grammar.
pub fn parse_as(source: &str, format: Format) -> Program {
    match format {
        Format::Classic => parse_classic(source),
        Format::Structured => parse_structured(source),
    }
}
