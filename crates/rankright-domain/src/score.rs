//! Aggregation over criterion results
//!
//! The overall score is the arithmetic mean of the six criterion scores,
//! rounded to the nearest integer with halves rounding up. It is only defined
//! when every criterion has exactly one result.

use crate::criterion::{Criterion, CriterionResult, Ranking};

/// Maximum Red-ranked recommendations surfaced by [`prioritized_recommendations`]
pub const MAX_RED_RECOMMENDATIONS: usize = 3;

/// Maximum Amber-ranked recommendations surfaced by [`prioritized_recommendations`]
pub const MAX_AMBER_RECOMMENDATIONS: usize = 2;

/// Compute the overall score for a complete set of results
///
/// Returns `None` unless `results` holds exactly one entry per criterion.
///
/// # Examples
///
/// ```
/// use rankright_domain::{overall_score, Criterion, CriterionResult};
///
/// let scores = [80, 90, 70, 60, 100, 50];
/// let results: Vec<_> = Criterion::ALL
///     .iter()
///     .zip(scores)
///     .map(|(c, s)| CriterionResult::new(*c, s, "", "").unwrap())
///     .collect();
///
/// assert_eq!(overall_score(&results), Some(75));
/// ```
pub fn overall_score(results: &[CriterionResult]) -> Option<u8> {
    if results.len() != Criterion::ALL.len() {
        return None;
    }

    let mut seen = [false; Criterion::ALL.len()];
    for result in results {
        let slot = &mut seen[result.criterion.index()];
        if *slot {
            return None;
        }
        *slot = true;
    }

    let scores: Vec<u8> = results.iter().map(|r| r.score).collect();
    Some(rounded_mean(&scores))
}

/// Arithmetic mean rounded to the nearest integer, halves up
fn rounded_mean(scores: &[u8]) -> u8 {
    let n = scores.len() as u32;
    if n == 0 {
        return 0;
    }
    let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    // (2 * sum + n) / (2 * n) == floor(sum / n + 0.5)
    ((2 * sum + n) / (2 * n)) as u8
}

/// Pick the recommendations most worth acting on
///
/// Red criteria come first (at most three), then Amber (at most two); Green
/// criteria contribute nothing. Each line is prefixed with the criterion name.
pub fn prioritized_recommendations(results: &[CriterionResult]) -> Vec<String> {
    let lines_for = |ranking: Ranking| {
        results
            .iter()
            .filter(move |r| r.ranking == ranking)
            .flat_map(|r| {
                r.recommendation
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(move |line| format!("[{}] {}", r.criterion.name(), line))
            })
    };

    lines_for(Ranking::Red)
        .take(MAX_RED_RECOMMENDATIONS)
        .chain(lines_for(Ranking::Amber).take(MAX_AMBER_RECOMMENDATIONS))
        .collect()
}
