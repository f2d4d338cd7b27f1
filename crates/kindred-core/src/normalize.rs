//! Coercion of loosely-typed request values into canonical codes.
//!
//! Every function here is total: empty or malformed input yields `None`
//! (or `false`), which callers treat as "filter absent".

/// Parse a single integer code. Surrounding whitespace is ignored.
pub fn to_num(value: &str) -> Option<i64> { value.trim().parse().ok() }

/// Parse a comma-separated list of integer codes.
///
/// Order and duplicates are preserved. Entries that do not parse are
/// dropped; if nothing survives the list is absent.
pub fn to_num_arr(values: &str) -> Option<Vec<i64>> {
  let codes: Vec<i64> = values.split(',').filter_map(to_num).collect();
  (!codes.is_empty()).then_some(codes)
}

/// Trimmed, non-empty text.
pub fn to_text(value: &str) -> Option<String> {
  let trimmed = value.trim();
  (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Interpret a query-string flag. Any present value counts as set except
/// the conventional negatives.
pub fn to_flag(value: &str) -> bool {
  !matches!(
    value.trim().to_ascii_lowercase().as_str(),
    "" | "0" | "false" | "off" | "no"
  )
}
