//! Per-line field extraction.

use crate::schema::TypeTag;
use serde_json::Value;

/// One top-level key of a parsed line.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub name: String,
    pub tag: TypeTag,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LineOutcome {
    /// Empty or whitespace-only; contributes nothing and is not a failure.
    Blank,
    /// Not a single JSON object.
    Unparsed,
    /// Top-level keys in the order they appear in the line.
    Fields(Vec<Extracted>),
}

/// Parse one line as a JSON object and tag each top-level value.
///
/// Anything else (scalars, arrays, trailing garbage, truncated input) is
/// `Unparsed`. Nested values are kept whole and tagged `array`/`object`.
pub fn extract_line(line: &str) -> LineOutcome {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return LineOutcome::Blank;
    }
    if !trimmed.starts_with('{') {
        return LineOutcome::Unparsed;
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => LineOutcome::Fields(
            map.into_iter()
                .map(|(name, value)| Extracted {
                    tag: TypeTag::of(&value),
                    name,
                    value,
                })
                .collect(),
        ),
        _ => LineOutcome::Unparsed,
    }
}
