//! Weight tables used by the aggregation engine.
//!
//! Two independent tables exist: platform base weights (applied across
//! platforms, per dimension) and dimension weights (applied across
//! dimensions, for the composite). Both must be non-negative and sum
//! to 1.0. Tables are validated once when an aggregator is built.

use crate::models::{Dimension, Platform};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed distance between a table's sum and 1.0.
pub const SUM_TOLERANCE: f64 = 1e-6;

/// Reasons a weight table is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("{table} weight for {key} is not a finite number")]
    NotFinite { table: &'static str, key: String },

    #[error("{table} weight for {key} is negative ({value})")]
    Negative {
        table: &'static str,
        key: String,
        value: f64,
    },

    #[error("{table} weights must sum to 1.0, got {sum}")]
    BadSum { table: &'static str, sum: f64 },
}

/// Base weight per platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlatformWeights {
    #[serde(default = "default_twitch")]
    pub twitch: f64,
    #[serde(default = "default_youtube")]
    pub youtube: f64,
    #[serde(default = "default_tiktok")]
    pub tiktok: f64,
    #[serde(default = "default_kick")]
    pub kick: f64,
}

impl Default for PlatformWeights {
    fn default() -> Self {
        Self {
            twitch: default_twitch(),
            youtube: default_youtube(),
            tiktok: default_tiktok(),
            kick: default_kick(),
        }
    }
}

fn default_twitch() -> f64 {
    Platform::Twitch.base_weight()
}

fn default_youtube() -> f64 {
    Platform::Youtube.base_weight()
}

fn default_tiktok() -> f64 {
    Platform::Tiktok.base_weight()
}

fn default_kick() -> f64 {
    Platform::Kick.base_weight()
}

impl PlatformWeights {
    pub fn get(&self, platform: Platform) -> f64 {
        match platform {
            Platform::Twitch => self.twitch,
            Platform::Youtube => self.youtube,
            Platform::Tiktok => self.tiktok,
            Platform::Kick => self.kick,
        }
    }

    /// Check that every weight is a non-negative finite number and the table sums to 1.0.
    pub fn validate(&self) -> Result<(), WeightsError> {
        validate_table(
            "platform",
            Platform::ALL.iter().map(|p| (p.tag().to_string(), self.get(*p))),
        )
    }
}

/// Weight per dimension for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DimensionWeights {
    #[serde(default = "default_audience_quality")]
    pub audience_quality: f64,
    #[serde(default = "default_engagement_efficiency")]
    pub engagement_efficiency: f64,
    #[serde(default = "default_monetization_readiness")]
    pub monetization_readiness: f64,
    #[serde(default = "default_growth_signal")]
    pub growth_signal: f64,
    #[serde(default = "default_brand_risk")]
    pub brand_risk: f64,
}

impl Default for DimensionWeights {
    fn default() -> Self {
        Self {
            audience_quality: default_audience_quality(),
            engagement_efficiency: default_engagement_efficiency(),
            monetization_readiness: default_monetization_readiness(),
            growth_signal: default_growth_signal(),
            brand_risk: default_brand_risk(),
        }
    }
}

fn default_audience_quality() -> f64 {
    0.25
}

fn default_engagement_efficiency() -> f64 {
    0.25
}

fn default_monetization_readiness() -> f64 {
    0.20
}

fn default_growth_signal() -> f64 {
    0.15
}

fn default_brand_risk() -> f64 {
    0.15
}

impl DimensionWeights {
    pub fn get(&self, dimension: Dimension) -> f64 {
        match dimension {
            Dimension::AudienceQuality => self.audience_quality,
            Dimension::EngagementEfficiency => self.engagement_efficiency,
            Dimension::MonetizationReadiness => self.monetization_readiness,
            Dimension::GrowthSignal => self.growth_signal,
            Dimension::BrandRisk => self.brand_risk,
        }
    }

    /// Check that every weight is a non-negative finite number and the table sums to 1.0.
    pub fn validate(&self) -> Result<(), WeightsError> {
        validate_table(
            "dimension",
            Dimension::ALL
                .iter()
                .map(|d| (d.label().to_string(), self.get(*d))),
        )
    }
}

/// Both weight tables together.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    #[serde(default)]
    pub platforms: PlatformWeights,
    #[serde(default)]
    pub dimensions: DimensionWeights,
}

impl Weights {
    pub fn validate(&self) -> Result<(), WeightsError> {
        self.platforms.validate()?;
        self.dimensions.validate()
    }
}

fn validate_table(
    table: &'static str,
    entries: impl Iterator<Item = (String, f64)>,
) -> Result<(), WeightsError> {
    let mut sum = 0.0;

    for (key, value) in entries {
        if !value.is_finite() {
            return Err(WeightsError::NotFinite { table, key });
        }
        if value < 0.0 {
            return Err(WeightsError::Negative { table, key, value });
        }
        sum += value;
    }

    if (sum - 1.0).abs() > SUM_TOLERANCE {
        return Err(WeightsError::BadSum { table, sum });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_valid() {
        assert_eq!(Weights::default().validate(), Ok(()));
    }

    #[test]
    fn test_default_platform_weights_match_profiles() {
        let w = PlatformWeights::default();
        for p in Platform::ALL {
            assert_eq!(w.get(p), p.base_weight());
        }
    }

    #[test]
    fn test_bad_sum_rejected() {
        let mut w = Weights::default();
        w.dimensions.brand_risk = 0.30;

        match w.validate() {
            Err(WeightsError::BadSum { table, sum }) => {
                assert_eq!(table, "dimension");
                assert!((sum - 1.15).abs() < 1e-9);
            }
            other => panic!("expected BadSum, got {:?}", other),
        }
    }

    #[test]
    fn test_negative_rejected() {
        let mut w = PlatformWeights::default();
        w.kick = -0.05;
        w.tiktok = 0.30;

        let err = w.validate().unwrap_err();
        assert!(matches!(err, WeightsError::Negative { ref key, .. } if key == "kick"));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_not_finite_rejected() {
        let mut w = PlatformWeights::default();
        w.youtube = f64::NAN;
        assert!(matches!(
            w.validate(),
            Err(WeightsError::NotFinite { .. })
        ));
    }

    #[test]
    fn test_partial_toml_override_keeps_defaults() {
        let toml_content = r#"
[platforms]
youtube = 0.45
kick = 0.0

[dimensions]
growth_signal = 0.15
"#;

        let w: Weights = toml::from_str(toml_content).unwrap();
        assert_eq!(w.platforms.youtube, 0.45);
        assert_eq!(w.platforms.kick, 0.0);
        assert_eq!(w.platforms.twitch, 0.35);
        assert_eq!(w.dimensions, DimensionWeights::default());
        assert!(w.validate().is_ok());
    }
}
