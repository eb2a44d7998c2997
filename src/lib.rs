//! AQV - cross-platform creator score aggregation.
//!
//! The engine in [`analysis`] turns per-platform quality metrics into a
//! composite score and a per-platform contribution breakdown. The other
//! modules load metric documents, read configuration and render reports
//! around it.
//!
//! ```
//! use aqv::analysis::aggregate;
//! use aqv::models::{DimensionScores, Platform, PlatformMetric};
//!
//! let records = [PlatformMetric {
//!     platform: Platform::Twitch,
//!     scores: DimensionScores::from_fn(|_| 70.0),
//!     confidence: 0.9,
//! }];
//!
//! let result = aggregate(&records);
//! assert_eq!(result.composite_score, 70.0);
//! assert_eq!(result.platform_contributions[0].contribution_percent, 100.0);
//! ```

pub mod analysis;
pub mod cli;
pub mod config;
pub mod input;
pub mod models;
pub mod report;
pub mod weights;

pub use analysis::{aggregate, Aggregator};
pub use models::{AggregatedResult, Platform, PlatformContribution, PlatformMetric};
