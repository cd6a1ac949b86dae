//! Content-based detection of the notation a source is written in.

use crate::types::Format;

/// Markers that only appear in the structured notation.
const STRUCTURED_MARKERS: [&str; 3] = ["start state:", "table:", "input:"];

/// Decides which grammar `source` should be parsed with.
///
/// Any structured marker anywhere in the text selects [`Format::Structured`]; everything
/// else, including terse rule lists with no metadata at all, is [`Format::Classic`].
pub fn classify(source: &str) -> Format {
    if STRUCTURED_MARKERS
        .iter()
        .any(|marker| source.contains(marker))
    {
        Format::Structured
    } else {
        Format::Classic
    }
}
