//! Data models for the score aggregator.
//!
//! This module contains the core data structures shared by the engine,
//! the input loader and the report generator: the closed set of platforms
//! with their static profiles, the five quality dimensions, per-platform
//! input records and the aggregated result.

use crate::weights::DimensionWeights;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Static profile of a platform: prior weight and display metadata.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlatformProfile {
    /// Prior weight used before renormalization. All profiles sum to 1.0.
    pub base_weight: f64,
    /// Human readable name.
    pub display_name: &'static str,
    /// Brand color used by report front-ends.
    pub color: &'static str,
}

const TWITCH: PlatformProfile = PlatformProfile {
    base_weight: 0.35,
    display_name: "Twitch",
    color: "#9146FF",
};

const YOUTUBE: PlatformProfile = PlatformProfile {
    base_weight: 0.40,
    display_name: "YouTube",
    color: "#FF0000",
};

const TIKTOK: PlatformProfile = PlatformProfile {
    base_weight: 0.20,
    display_name: "TikTok",
    color: "#000000",
};

const KICK: PlatformProfile = PlatformProfile {
    base_weight: 0.05,
    display_name: "Kick",
    color: "#53FC18",
};

/// A platform the engine knows how to weigh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Twitch,
    Youtube,
    Tiktok,
    Kick,
}

impl Platform {
    /// Every known platform, in profile-table order.
    pub const ALL: [Platform; 4] = [
        Platform::Twitch,
        Platform::Youtube,
        Platform::Tiktok,
        Platform::Kick,
    ];

    /// Returns the static profile for this platform.
    pub fn profile(self) -> &'static PlatformProfile {
        match self {
            Platform::Twitch => &TWITCH,
            Platform::Youtube => &YOUTUBE,
            Platform::Tiktok => &TIKTOK,
            Platform::Kick => &KICK,
        }
    }

    pub fn base_weight(self) -> f64 {
        self.profile().base_weight
    }

    pub fn display_name(self) -> &'static str {
        self.profile().display_name
    }

    pub fn color(self) -> &'static str {
        self.profile().color
    }

    /// The lowercase tag used in input documents.
    pub fn tag(self) -> &'static str {
        match self {
            Platform::Twitch => "twitch",
            Platform::Youtube => "youtube",
            Platform::Tiktok => "tiktok",
            Platform::Kick => "kick",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One of the five independently scored quality axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    AudienceQuality,
    EngagementEfficiency,
    MonetizationReadiness,
    GrowthSignal,
    /// Safety score: higher means lower brand risk.
    BrandRisk,
}

impl Dimension {
    pub const ALL: [Dimension; 5] = [
        Dimension::AudienceQuality,
        Dimension::EngagementEfficiency,
        Dimension::MonetizationReadiness,
        Dimension::GrowthSignal,
        Dimension::BrandRisk,
    ];

    /// Returns a human readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::AudienceQuality => "Audience Quality",
            Dimension::EngagementEfficiency => "Engagement Efficiency",
            Dimension::MonetizationReadiness => "Monetization Readiness",
            Dimension::GrowthSignal => "Growth Signal",
            Dimension::BrandRisk => "Brand Safety",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Scores for the five dimensions, each expected in `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionScores {
    pub audience_quality: f64,
    pub engagement_efficiency: f64,
    pub monetization_readiness: f64,
    pub growth_signal: f64,
    pub brand_risk: f64,
}

impl DimensionScores {
    /// Builds scores from a closure evaluated once per dimension.
    pub fn from_fn(mut f: impl FnMut(Dimension) -> f64) -> Self {
        Self {
            audience_quality: f(Dimension::AudienceQuality),
            engagement_efficiency: f(Dimension::EngagementEfficiency),
            monetization_readiness: f(Dimension::MonetizationReadiness),
            growth_signal: f(Dimension::GrowthSignal),
            brand_risk: f(Dimension::BrandRisk),
        }
    }

    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::AudienceQuality => self.audience_quality,
            Dimension::EngagementEfficiency => self.engagement_efficiency,
            Dimension::MonetizationReadiness => self.monetization_readiness,
            Dimension::GrowthSignal => self.growth_signal,
            Dimension::BrandRisk => self.brand_risk,
        }
    }

    /// Iterates `(dimension, score)` pairs in `Dimension::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Dimension, f64)> + '_ {
        Dimension::ALL.into_iter().map(move |d| (d, self.get(d)))
    }
}

/// Quality metrics observed for one creator on one platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformMetric {
    /// Platform the metrics were collected on.
    pub platform: Platform,
    /// Raw dimension scores for this platform.
    #[serde(flatten)]
    pub scores: DimensionScores,
    /// Reliability of this platform's data, in `[0, 1]`.
    pub confidence: f64,
}

impl PlatformMetric {
    /// Returns true if every score is a finite number in `[0, 100]` and the
    /// confidence is a finite number in `[0, 1]`.
    pub fn is_valid(&self) -> bool {
        self.invalid_reason().is_none()
    }

    /// Describes the first value that makes this record invalid, if any.
    pub fn invalid_reason(&self) -> Option<String> {
        for (dimension, score) in self.scores.iter() {
            if !(score.is_finite() && (0.0..=100.0).contains(&score)) {
                return Some(format!("{} out of range: {}", dimension, score));
            }
        }

        if !(self.confidence.is_finite() && (0.0..=1.0).contains(&self.confidence)) {
            return Some(format!("confidence out of range: {}", self.confidence));
        }

        None
    }
}

/// How much one platform is responsible for the composite score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformContribution {
    pub platform: Platform,
    /// Renormalized, confidence-adjusted weight (3 decimals).
    pub effective_weight: f64,
    /// Confidence echoed from the input record.
    pub confidence: f64,
    /// Share of the composite attributed to this platform (1 decimal).
    pub contribution_percent: f64,
}

impl PlatformContribution {
    /// The entry with the largest contribution percent. The first one wins ties.
    pub fn dominant(contributions: &[PlatformContribution]) -> Option<&PlatformContribution> {
        contributions.iter().fold(None, |best, c| match best {
            Some(b) if b.contribution_percent >= c.contribution_percent => Some(b),
            _ => Some(c),
        })
    }
}

/// Output of one aggregation call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedResult {
    /// Composite score in `[0, 100]` (1 decimal).
    pub composite_score: f64,
    /// Aggregated dimension scores, each in `[0, 100]` (1 decimal).
    pub dimensions: DimensionScores,
    /// One entry per valid input record, in input order.
    pub platform_contributions: Vec<PlatformContribution>,
}

impl AggregatedResult {
    /// The zero result returned when no valid platform was supplied.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns true if no platform contributed to this result.
    pub fn is_empty(&self) -> bool {
        self.platform_contributions.is_empty()
    }

    /// The platform with the largest contribution percent.
    pub fn dominant_contribution(&self) -> Option<&PlatformContribution> {
        PlatformContribution::dominant(&self.platform_contributions)
    }
}

/// How much of the result a report consumer may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// Composite score, dimensions and per-platform contributions.
    #[default]
    Full,
    /// Composite score and dimensions only.
    Summary,
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessLevel::Full => write!(f, "Full"),
            AccessLevel::Summary => write!(f, "Summary"),
        }
    }
}

/// A record left out of the aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRecord {
    /// Position of the record in the input document (0-indexed).
    pub index: usize,
    /// Why the record was dropped.
    pub reason: String,
}

/// Metadata about one creator report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportMetadata {
    /// Creator the metrics belong to.
    pub creator: String,
    /// Input document the metrics were read from.
    pub source: String,
    /// Date and time the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Number of records in the input document.
    pub records_supplied: usize,
    /// Records that could not be decoded into a platform metric.
    pub records_rejected: usize,
    /// Decoded records with a score or confidence outside its range.
    pub records_out_of_range: usize,
    /// Number of records that contributed to the result.
    pub platforms_used: usize,
    /// Sections the reader is allowed to see.
    pub access: AccessLevel,
}

/// The complete report for one creator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Metadata about the report.
    pub metadata: ReportMetadata,
    /// Composite score in `[0, 100]`.
    pub composite_score: f64,
    /// Aggregated dimension scores.
    pub dimensions: DimensionScores,
    /// Dimension weights the composite was computed with.
    pub dimension_weights: DimensionWeights,
    /// Per-platform breakdown; absent when access is `Summary`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_contributions: Option<Vec<PlatformContribution>>,
    /// Records left out of the aggregation.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_records: Vec<DroppedRecord>,
}

impl Report {
    /// Returns true if no platform data contributed to the score.
    pub fn has_data(&self) -> bool {
        self.metadata.platforms_used > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(platform: Platform, score: f64, confidence: f64) -> PlatformMetric {
        PlatformMetric {
            platform,
            scores: DimensionScores::from_fn(|_| score),
            confidence,
        }
    }

    #[test]
    fn test_base_weights_sum_to_one() {
        let sum: f64 = Platform::ALL.iter().map(|p| p.base_weight()).sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_platform_profile() {
        assert_eq!(Platform::Twitch.display_name(), "Twitch");
        assert_eq!(Platform::Twitch.color(), "#9146FF");
        assert_eq!(Platform::Youtube.to_string(), "YouTube");
        assert_eq!(Platform::Kick.tag(), "kick");
    }

    #[test]
    fn test_metric_deserializes_camel_case() {
        let json = r#"{
            "platform": "tiktok",
            "audienceQuality": 60,
            "engagementEfficiency": 70.5,
            "monetizationReadiness": 40,
            "growthSignal": 90,
            "brandRisk": 75,
            "confidence": 0.6
        }"#;

        let m: PlatformMetric = serde_json::from_str(json).unwrap();
        assert_eq!(m.platform, Platform::Tiktok);
        assert_eq!(m.scores.engagement_efficiency, 70.5);
        assert_eq!(m.scores.get(Dimension::GrowthSignal), 90.0);
        assert_eq!(m.confidence, 0.6);
    }

    #[test]
    fn test_unknown_platform_rejected() {
        let json = r#"{"platform":"myspace","audienceQuality":1,"engagementEfficiency":1,
            "monetizationReadiness":1,"growthSignal":1,"brandRisk":1,"confidence":1}"#;
        assert!(serde_json::from_str::<PlatformMetric>(json).is_err());
    }

    #[test]
    fn test_validity() {
        assert!(metric(Platform::Twitch, 0.0, 0.0).is_valid());
        assert!(metric(Platform::Twitch, 100.0, 1.0).is_valid());
        assert!(!metric(Platform::Twitch, 150.0, 0.5).is_valid());
        assert!(!metric(Platform::Twitch, -1.0, 0.5).is_valid());
        assert!(!metric(Platform::Twitch, 50.0, -0.2).is_valid());
        assert!(!metric(Platform::Twitch, 50.0, 1.01).is_valid());
        assert!(!metric(Platform::Twitch, f64::NAN, 0.5).is_valid());
        assert!(!metric(Platform::Twitch, 50.0, f64::INFINITY).is_valid());

        let mut one_bad = metric(Platform::Kick, 50.0, 0.5);
        one_bad.scores.brand_risk = 100.5;
        assert!(!one_bad.is_valid());
    }

    #[test]
    fn test_invalid_reason_names_first_problem() {
        let mut m = metric(Platform::Youtube, 50.0, 0.5);
        assert_eq!(m.invalid_reason(), None);

        m.scores.growth_signal = 150.0;
        m.confidence = -0.2;
        assert_eq!(
            m.invalid_reason().as_deref(),
            Some("Growth Signal out of range: 150")
        );

        m.scores.growth_signal = 10.0;
        assert_eq!(
            m.invalid_reason().as_deref(),
            Some("confidence out of range: -0.2")
        );
    }

    #[test]
    fn test_dominant_contribution_first_wins_ties() {
        let result = AggregatedResult {
            composite_score: 50.0,
            dimensions: DimensionScores::default(),
            platform_contributions: vec![
                PlatformContribution {
                    platform: Platform::Twitch,
                    effective_weight: 0.5,
                    confidence: 1.0,
                    contribution_percent: 50.0,
                },
                PlatformContribution {
                    platform: Platform::Youtube,
                    effective_weight: 0.5,
                    confidence: 1.0,
                    contribution_percent: 50.0,
                },
            ],
        };

        let dominant = result.dominant_contribution().unwrap();
        assert_eq!(dominant.platform, Platform::Twitch);
        assert!(AggregatedResult::empty().dominant_contribution().is_none());
    }
}
