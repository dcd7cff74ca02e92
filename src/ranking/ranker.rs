use serde::{Deserialize, Serialize};

use crate::{
    candidates::model::{AcceptedCandidate, RankedCandidate},
    foundation::error::{QuoteframeError, QuoteframeResult},
};

/// Relative importance of each normalized feature in the composite score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingWeights {
    /// Weight of normalized sharpness.
    pub sharpness: f64,
    /// Weight of normalized saturation.
    pub saturation: f64,
    /// Weight of normalized size score.
    pub size: f64,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            sharpness: 0.55,
            saturation: 0.30,
            size: 0.15,
        }
    }
}

impl RankingWeights {
    /// Require finite, non-negative weights with a positive sum.
    pub fn validate(&self) -> QuoteframeResult<()> {
        let all = [self.sharpness, self.saturation, self.size];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(QuoteframeError::validation(
                "ranking weights must be finite and >= 0",
            ));
        }
        if self.total() <= 0.0 {
            return Err(QuoteframeError::validation(
                "ranking weights must have a positive sum",
            ));
        }
        Ok(())
    }

    /// Sum of the three weights; scores are divided by it so they stay in `[0, 1]`.
    pub fn total(&self) -> f64 {
        self.sharpness + self.saturation + self.size
    }
}

/// Ranking stage configuration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingConfig {
    /// Feature weights.
    pub weights: RankingWeights,
    /// Number of top candidates to keep.
    pub limit: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            weights: RankingWeights::default(),
            limit: 3,
        }
    }
}

impl RankingConfig {
    /// Validate weights and limit.
    pub fn validate(&self) -> QuoteframeResult<()> {
        self.weights.validate()?;
        if self.limit == 0 {
            return Err(QuoteframeError::validation("ranking limit must be >= 1"));
        }
        Ok(())
    }
}

/// Rank with the default weights.
pub fn rank(accepted: &[AcceptedCandidate], limit: usize) -> QuoteframeResult<Vec<RankedCandidate>> {
    rank_with_weights(accepted, limit, &RankingWeights::default())
}

/// Score every candidate, sort best first and keep the top `limit`.
///
/// Each feature is min-max normalized over the batch; a feature that is identical for every
/// candidate normalizes to `0.5`. The sort is stable, so equal scores keep discovery order.
#[tracing::instrument(skip(accepted, weights), fields(candidates = accepted.len()))]
pub fn rank_with_weights(
    accepted: &[AcceptedCandidate],
    limit: usize,
    weights: &RankingWeights,
) -> QuoteframeResult<Vec<RankedCandidate>> {
    if limit == 0 {
        return Err(QuoteframeError::validation("ranking limit must be >= 1"));
    }
    weights.validate()?;
    if accepted.is_empty() {
        return Ok(Vec::new());
    }

    let total = weights.total();
    let sharp = min_max_normalize(accepted.iter().map(|c| c.sharpness));
    let sat = min_max_normalize(accepted.iter().map(|c| c.saturation));
    let size = min_max_normalize(accepted.iter().map(|c| c.size_score));

    let mut ranked: Vec<RankedCandidate> = accepted
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let weighted = weights.sharpness * sharp[i]
                + weights.saturation * sat[i]
                + weights.size * size[i];
            let score = weighted / total;
            RankedCandidate {
                candidate: c.clone(),
                score: score.clamp(0.0, 1.0),
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked.truncate(limit);

    if let Some(best) = ranked.first() {
        tracing::debug!(url = %best.url(), score = best.score, kept = ranked.len(), "ranked candidates");
    }
    Ok(ranked)
}

/// Min-max normalize into `[0, 1]`; a degenerate range maps every value to `0.5`.
pub fn min_max_normalize(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let values: Vec<f64> = values.collect();
    let (min, max) = values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;
    if !(range.is_finite() && range > 0.0) {
        return vec![0.5; values.len()];
    }
    values
        .iter()
        .map(|v| ((v - min) / range).clamp(0.0, 1.0))
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/ranking/ranker.rs"]
mod tests;
