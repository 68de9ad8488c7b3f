use crate::scoring::ScoredCandidate;

/// Divide every score by the maximum score, so that the best candidate scores
/// 1.0. Nothing happens for an empty list, or if the maximum is not positive.
///
/// Returns whether the scores were rescaled
pub fn normalize(candidates: &mut [ScoredCandidate]) -> bool {
    let max = candidates
        .iter()
        .map(|candidate| candidate.score)
        .fold(f64::NEG_INFINITY, f64::max);

    if candidates.is_empty() || !(max > 0.0) {
        return false;
    }
    for candidate in candidates.iter_mut() {
        candidate.score /= max;
    }
    true
}
