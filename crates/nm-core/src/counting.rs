//! Frequency, marginal and PMI counting over fixed-arity tuples.
//!
//! Tuples are slices of hashable components. Outputs are insertion-ordered
//! maps so that the ranking survives into the caller: ties keep the order in
//! which each distinct tuple was first seen.

use std::hash::Hash;

use indexmap::IndexMap;

/// Count the distinct tuples of `tuples`.
///
/// With `descending`, entries are stably sorted by decreasing count.
pub fn unique_counts<T>(tuples: &[T], descending: bool) -> IndexMap<T, usize>
where
    T: Eq + Hash + Clone,
{
    let mut counts: IndexMap<T, usize> = IndexMap::new();
    for t in tuples {
        *counts.entry(t.clone()).or_insert(0) += 1;
    }
    if descending {
        counts.sort_by(|_, a, _, b| b.cmp(a));
    }
    counts
}

/// Count the distinct values at each tuple position independently.
///
/// The arity is taken from the first tuple; an empty input or zero-arity
/// tuples yield no positions.
pub fn unique_tuple_values_counts<V>(tuples: &[Vec<V>]) -> Vec<IndexMap<V, usize>>
where
    V: Eq + Hash + Clone,
{
    let Some(first) = tuples.first() else {
        return Vec::new();
    };

    (0..first.len())
        .map(|i| {
            let mut counts: IndexMap<V, usize> = IndexMap::new();
            for value in tuples.iter().filter_map(|t| t.get(i)) {
                *counts.entry(value.clone()).or_insert(0) += 1;
            }
            counts
        })
        .collect()
}

/// PMI of every distinct tuple: `ln(f(t) / Π m_i(t_i))`.
///
/// Neither the joint nor the marginal counts are divided by the sample size,
/// so scores are offset by a run-dependent constant. They rank tuples within
/// one computation and must not be compared across inputs of different size.
pub fn compute_pmi<V>(tuples: &[Vec<V>], descending: bool) -> IndexMap<Vec<V>, f64>
where
    V: Eq + Hash + Clone,
{
    if tuples.is_empty() {
        return IndexMap::new();
    }
    let joint = unique_counts(tuples, true);
    let marginals = unique_tuple_values_counts(tuples);

    let mut scores: IndexMap<Vec<V>, f64> = joint
        .into_iter()
        .map(|(t, frequency)| {
            let product: f64 = marginals
                .iter()
                .zip(&t)
                .map(|(counts, value)| counts.get(value).copied().unwrap_or(1) as f64)
                .product();
            let pmi = (frequency as f64 / product).ln();
            (t, pmi)
        })
        .collect();

    if descending {
        scores.sort_by(|_, a, _, b| b.total_cmp(a));
    }
    scores
}
