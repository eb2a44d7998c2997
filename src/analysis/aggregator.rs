//! Cross-platform score aggregation.
//!
//! Platform metrics are combined in two independent weighting stages:
//! first across platforms (per dimension, using renormalized and
//! confidence-adjusted platform weights), then across dimensions (for
//! the composite score). Contribution percentages are derived from each
//! platform's own raw scores so a report can show which platform drove
//! the result.
//!
//! Every function here is pure. Invalid records are dropped, degenerate
//! inputs produce the zero result, nothing returns an error.

use crate::models::{
    AggregatedResult, Dimension, DimensionScores, PlatformContribution, PlatformMetric,
};
use crate::weights::{DimensionWeights, PlatformWeights, Weights, WeightsError};
use tracing::{debug, trace};

/// Aggregator bound to a validated set of weight tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator {
    weights: Weights,
}

impl Aggregator {
    /// Create an aggregator, validating both weight tables once.
    pub fn new(weights: Weights) -> Result<Self, WeightsError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Aggregate per-platform metrics into a composite result.
    pub fn aggregate(&self, records: &[PlatformMetric]) -> AggregatedResult {
        let valid = filter_valid(records);

        if valid.len() < records.len() {
            debug!(
                dropped = records.len() - valid.len(),
                kept = valid.len(),
                "Dropped invalid platform records"
            );
        }

        if valid.is_empty() {
            return AggregatedResult::empty();
        }

        let weights = effective_weights(&valid, &self.weights.platforms);

        let dimensions =
            DimensionScores::from_fn(|d| aggregate_dimension(&valid, &weights, d));

        let composite_score = composite_score(&dimensions, &self.weights.dimensions);

        let platform_contributions =
            platform_contributions(&valid, &weights, &self.weights.dimensions);

        AggregatedResult {
            composite_score,
            dimensions,
            platform_contributions,
        }
    }
}

/// Aggregate with the default weight tables.
pub fn aggregate(records: &[PlatformMetric]) -> AggregatedResult {
    Aggregator::default().aggregate(records)
}

/// Keep only valid records, preserving their relative order.
pub fn filter_valid(records: &[PlatformMetric]) -> Vec<PlatformMetric> {
    records.iter().filter(|r| r.is_valid()).copied().collect()
}

/// Compute each record's effective weight, positionally aligned with `platforms`.
///
/// Base weights are renormalized over the platforms present, scaled by
/// confidence, then renormalized again so the result sums to 1.0. If every
/// confidence is zero (or every present base weight is zero) all weights
/// stay at zero.
pub fn effective_weights(platforms: &[PlatformMetric], base: &PlatformWeights) -> Vec<f64> {
    let base_weight_sum: f64 = platforms.iter().map(|p| base.get(p.platform)).sum();

    if base_weight_sum <= 0.0 {
        trace!("Present platforms carry no base weight");
        return vec![0.0; platforms.len()];
    }

    let mut weights: Vec<f64> = platforms
        .iter()
        .map(|p| base.get(p.platform) / base_weight_sum * p.confidence)
        .collect();

    let effective_sum: f64 = weights.iter().sum();

    if effective_sum > 0.0 {
        for w in &mut weights {
            *w /= effective_sum;
        }
    } else {
        trace!("All confidences are zero; no signal");
    }

    weights
}

/// Weighted mean of one dimension across platforms, rounded to one decimal.
pub fn aggregate_dimension(
    platforms: &[PlatformMetric],
    weights: &[f64],
    dimension: Dimension,
) -> f64 {
    let weighted_sum: f64 = platforms
        .iter()
        .zip(weights)
        .map(|(p, w)| p.scores.get(dimension) * w)
        .sum();

    clamp_score(round_to(weighted_sum, 1))
}

/// Combine already aggregated dimensions into the composite score.
pub fn composite_score(dimensions: &DimensionScores, weights: &DimensionWeights) -> f64 {
    clamp_score(round_to(weighted_dimension_sum(dimensions, weights), 1))
}

/// Attribute the composite back to each platform using its raw scores.
pub fn platform_contributions(
    platforms: &[PlatformMetric],
    weights: &[f64],
    dimension_weights: &DimensionWeights,
) -> Vec<PlatformContribution> {
    let raw: Vec<f64> = platforms
        .iter()
        .zip(weights)
        .map(|(p, w)| weighted_dimension_sum(&p.scores, dimension_weights) * w)
        .collect();

    let total: f64 = raw.iter().sum();

    let percents = if total > 0.0 {
        let exact: Vec<f64> = raw.iter().map(|r| r / total * 100.0).collect();
        closed_percentages(&exact)
    } else {
        vec![0.0; raw.len()]
    };

    platforms
        .iter()
        .zip(weights)
        .zip(percents)
        .map(|((p, w), contribution_percent)| PlatformContribution {
            platform: p.platform,
            effective_weight: round_to(*w, 3),
            confidence: p.confidence,
            contribution_percent,
        })
        .collect()
}

/// Round percentages to one decimal, keeping their sum within 0.1 of 100.
///
/// Independently rounded values are returned untouched when they already
/// close. Otherwise the drift is removed in 0.1 steps, largest remainder
/// first, until the sum is exactly 100.
fn closed_percentages(exact: &[f64]) -> Vec<f64> {
    let mut tenths: Vec<i64> = exact.iter().map(|p| (p * 10.0).round() as i64).collect();
    let drift = 1000 - tenths.iter().sum::<i64>();

    if drift.abs() > 1 {
        trace!(drift, "Correcting contribution rounding drift");

        // Remainder of each entry: positive if it was rounded down.
        let mut order: Vec<usize> = (0..exact.len()).collect();
        let remainder = |i: usize| exact[i] * 10.0 - tenths[i] as f64;

        if drift > 0 {
            order.sort_by(|&a, &b| remainder(b).total_cmp(&remainder(a)));
        } else {
            order.sort_by(|&a, &b| remainder(a).total_cmp(&remainder(b)));
        }

        let step = drift.signum();
        let candidates: Vec<usize> = order
            .into_iter()
            .filter(|&i| step > 0 || tenths[i] > 0)
            .take(drift.unsigned_abs() as usize)
            .collect();

        for i in candidates {
            tenths[i] += step;
        }
    }

    tenths.into_iter().map(|t| t as f64 / 10.0).collect()
}

fn weighted_dimension_sum(scores: &DimensionScores, weights: &DimensionWeights) -> f64 {
    scores.iter().map(|(d, s)| s * weights.get(d)).sum()
}

/// Round to `decimals` places, halves away from zero.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}
