//! Batch padding.

/// Right-pad id sequences with zero ids so every row has the width of the
/// longest sequence in the batch. Returns the rectangular rows and that
/// width.
pub(crate) fn pad_batch(mut ids: Vec<Vec<u32>>) -> (Vec<Vec<u32>>, usize) {
    let max_len = ids.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut ids {
        row.resize(max_len, 0);
    }
    (ids, max_len)
}
