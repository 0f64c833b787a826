//! Test data generators for inline range payloads.
//!
//! These generators create predictable, verifiable value patterns so a test
//! can recompute the expected value at any grid position.

use serde_json::Value;

/// Value stored for `field` at flat cell offset `cell`.
///
/// Each value is `cell * 10 + field`, so both parts can be read back from a
/// lookup result.
pub fn indexed_value(cell: usize, field: usize) -> f64 {
    (cell * 10 + field) as f64
}

/// Row-major flat offset of a grid index.
pub fn row_major_cell(shape: &[usize], index: &[usize]) -> usize {
    shape
        .iter()
        .zip(index)
        .fold(0, |acc, (&n, &i)| acc * n + i)
}

/// Creates a payload in field-fastest, row-major order.
///
/// # Example
///
/// ```
/// use test_utils::indexed_payload;
///
/// let values = indexed_payload(&[2, 3], 2);
/// assert_eq!(values.len(), 12);
/// assert_eq!(values[0], 0.0);   // cell 0, field 0
/// assert_eq!(values[1], 1.0);   // cell 0, field 1
/// assert_eq!(values[2], 10.0);  // cell 1, field 0
/// ```
pub fn indexed_payload(shape: &[usize], fields: usize) -> Vec<f64> {
    let cells: usize = shape.iter().product();
    let mut data = Vec::with_capacity(cells * fields);
    for cell in 0..cells {
        for field in 0..fields {
            data.push(indexed_value(cell, field));
        }
    }
    data
}

/// Same as [`indexed_payload`] but as JSON, with every `gap_every`-th value
/// replaced by `null`. A `gap_every` of zero leaves no gaps.
pub fn indexed_payload_json(shape: &[usize], fields: usize, gap_every: usize) -> Vec<Value> {
    indexed_payload(shape, fields)
        .into_iter()
        .enumerate()
        .map(|(i, v)| {
            if gap_every > 0 && i % gap_every == gap_every - 1 {
                Value::Null
            } else {
                Value::from(v)
            }
        })
        .collect()
}

/// Encodes values as little-endian float64, NaN standing in for `None`.
pub fn to_octet_stream(values: &[Option<f64>]) -> Vec<u8> {
    values
        .iter()
        .flat_map(|v| v.unwrap_or(f64::NAN).to_le_bytes())
        .collect()
}
