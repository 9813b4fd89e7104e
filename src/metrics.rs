//! Retrieval-quality metrics
//!
//! All functions operate on parallel sequences: `results[i]` holds the
//! ranked chunk ids retrieved for query i, `ground_truth[i]` the set of
//! chunk ids considered correct for that query. The two sequences must have
//! equal length. An empty query set evaluates to 0.0, not an error.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

fn check_lengths<R, G>(results: &[R], ground_truth: &[G]) -> Result<()> {
    if results.len() != ground_truth.len() {
        return Err(Error::LengthMismatch {
            results: results.len(),
            ground_truth: ground_truth.len(),
        });
    }
    Ok(())
}

/// Recall@k: the fraction of queries where at least one of the top-k
/// results is in that query's ground-truth set.
pub fn recall_at_k<T: Eq + Hash>(
    results: &[Vec<T>],
    ground_truth: &[HashSet<T>],
    k: usize,
) -> Result<f32> {
    check_lengths(results, ground_truth)?;
    if results.is_empty() {
        return Ok(0.0);
    }

    let hits = results
        .iter()
        .zip(ground_truth.iter())
        .filter(|(ranked, relevant)| ranked.iter().take(k).any(|r| relevant.contains(r)))
        .count();

    Ok(hits as f32 / results.len() as f32)
}

/// Precision@k: the mean, over queries, of the fraction of top-k results
/// that are relevant. A query with no results contributes 0.0.
pub fn precision_at_k<T: Eq + Hash>(
    results: &[Vec<T>],
    ground_truth: &[HashSet<T>],
    k: usize,
) -> Result<f32> {
    check_lengths(results, ground_truth)?;
    if results.is_empty() {
        return Ok(0.0);
    }

    let sum: f32 = results
        .iter()
        .zip(ground_truth.iter())
        .map(|(ranked, relevant)| {
            let top_k = ranked.len().min(k);
            if top_k == 0 {
                return 0.0;
            }
            let hits = ranked
                .iter()
                .take(k)
                .filter(|r| relevant.contains(*r))
                .count();
            hits as f32 / top_k as f32
        })
        .sum();

    Ok(sum / results.len() as f32)
}

/// Mean reciprocal rank: the mean, over queries, of 1/rank of the first
/// relevant result (1-indexed), or 0.0 when no relevant result appears.
pub fn mean_reciprocal_rank<T: Eq + Hash>(
    results: &[Vec<T>],
    ground_truth: &[HashSet<T>],
) -> Result<f32> {
    check_lengths(results, ground_truth)?;
    if results.is_empty() {
        return Ok(0.0);
    }

    let sum: f32 = results
        .iter()
        .zip(ground_truth.iter())
        .map(|(ranked, relevant)| {
            ranked
                .iter()
                .position(|r| relevant.contains(r))
                .map_or(0.0, |rank| 1.0 / (rank + 1) as f32)
        })
        .sum();

    Ok(sum / results.len() as f32)
}

/// Metrics for a query set across a range of cutoffs
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EvalSummary {
    /// Recall@k per cutoff
    pub recall: BTreeMap<usize, f32>,
    /// Precision@k per cutoff
    pub precision: BTreeMap<usize, f32>,
    /// Mean reciprocal rank
    pub mrr: f32,
    /// Number of evaluated queries
    pub query_count: usize,
}

/// Compute recall, precision, and MRR over a set of cutoffs in one pass
pub fn evaluate<T: Eq + Hash>(
    results: &[Vec<T>],
    ground_truth: &[HashSet<T>],
    k_values: &[usize],
) -> Result<EvalSummary> {
    check_lengths(results, ground_truth)?;

    let mut summary = EvalSummary {
        query_count: results.len(),
        mrr: mean_reciprocal_rank(results, ground_truth)?,
        ..Default::default()
    };

    for &k in k_values {
        summary
            .recall
            .insert(k, recall_at_k(results, ground_truth, k)?);
        summary
            .precision
            .insert(k, precision_at_k(results, ground_truth, k)?);
    }

    Ok(summary)
}
