//! Weight normalization and even splitting.

use crate::state::finite_or_zero;

/// An item paired with its share of the sibling weight total, in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalized<'a, T> {
    pub item: &'a T,
    pub percent: f64,
}

/// Scale every weight so the set sums to 100.
///
/// Non-finite weights count as zero. When the total is zero every share is
/// zero: callers treat that as an undefined distribution. No rounding here.
pub fn normalize_weights<T, F>(items: &[T], weight_of: F) -> Vec<Normalized<'_, T>>
where
    F: Fn(&T) -> f64,
{
    let sum: f64 = items.iter().map(|it| finite_or_zero(weight_of(it))).sum();
    items
        .iter()
        .map(|item| {
            let percent = if sum == 0.0 {
                0.0
            } else {
                finite_or_zero(weight_of(item)) / sum * 100.0
            };
            Normalized { item, percent }
        })
        .collect()
}

/// `n` two-decimal weights that add up to exactly 100.00.
///
/// Every slot gets `floor(10000 / n) / 100`; whatever is left over goes to the
/// first slot, so `n = 3` yields `[33.34, 33.33, 33.33]`.
pub fn even_split(n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    // Work in hundredths so the sum is exact.
    let base = 10_000 / n as u64;
    let remainder = 10_000 - base * n as u64;
    let mut weights = vec![base as f64 / 100.0; n];
    weights[0] = (base + remainder) as f64 / 100.0;
    weights
}
