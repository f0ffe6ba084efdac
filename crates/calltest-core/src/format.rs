//! Display rendering for argument and result sequences.

use crate::value::Value;

/// Placeholder for an empty sequence.
pub const NOTHING: &str = "nothing";

/// Serialize one value to compact JSON.
///
/// Formatting is cosmetic: a serialization failure yields an empty string
/// rather than aborting the comparison.
#[must_use]
pub fn format_value(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

/// Render a sequence as comma-separated JSON values, or [`NOTHING`].
#[must_use]
pub fn format_values(values: &[Value]) -> String {
    if values.is_empty() {
        return NOTHING.to_owned();
    }
    values
        .iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(", ")
}
