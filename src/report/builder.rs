//! Report assembly.
//!
//! Runs the aggregator over a loaded document and packages the result
//! with its metadata. Access gating happens here: the engine always
//! computes the full breakdown and this layer decides what to keep.

use crate::analysis::Aggregator;
use crate::input::MetricsDocument;
use crate::models::{AccessLevel, DroppedRecord, PlatformMetric, Report, ReportMetadata};
use chrono::Utc;
use tracing::{debug, info};

/// What happened to one record of an input document.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordStatus {
    /// Takes part in the aggregation.
    Used(PlatformMetric),
    /// Left out of the aggregation.
    Dropped(String),
}

/// The status of the record at `index` in its document.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordDecision {
    pub index: usize,
    pub status: RecordStatus,
}

/// Aggregate a document and build its report.
pub fn build_report(
    doc: &MetricsDocument,
    aggregator: &Aggregator,
    access: AccessLevel,
) -> Report {
    let result = aggregator.aggregate(&doc.records);

    let dropped_records = dropped_records(doc);
    let records_rejected = doc.rejected.len();
    let records_out_of_range = dropped_records.len() - records_rejected;

    info!(
        "{}: composite {:.1} from {} platform(s)",
        doc.creator,
        result.composite_score,
        result.platform_contributions.len()
    );
    if !dropped_records.is_empty() {
        debug!(
            "{}: {} record(s) rejected, {} out of range",
            doc.creator, records_rejected, records_out_of_range
        );
    }

    let metadata = ReportMetadata {
        creator: doc.creator.clone(),
        source: doc.source.display().to_string(),
        generated_at: Utc::now(),
        records_supplied: doc.supplied(),
        records_rejected,
        records_out_of_range,
        platforms_used: result.platform_contributions.len(),
        access,
    };

    let platform_contributions = match access {
        AccessLevel::Full => Some(result.platform_contributions),
        AccessLevel::Summary => None,
    };

    Report {
        metadata,
        composite_score: result.composite_score,
        dimensions: result.dimensions,
        dimension_weights: aggregator.weights().dimensions,
        platform_contributions,
        dropped_records,
    }
}

/// Decide, in document order, whether each record is used or dropped.
pub fn record_decisions(doc: &MetricsDocument) -> Vec<RecordDecision> {
    let mut decisions: Vec<RecordDecision> = doc
        .rejected
        .iter()
        .map(|r| RecordDecision {
            index: r.index,
            status: RecordStatus::Dropped(format!("could not decode: {}", r.reason)),
        })
        .collect();

    for (record, index) in doc.records.iter().zip(doc.record_positions()) {
        let status = match record.invalid_reason() {
            Some(reason) => RecordStatus::Dropped(reason),
            None => RecordStatus::Used(*record),
        };
        decisions.push(RecordDecision { index, status });
    }

    decisions.sort_by_key(|d| d.index);
    decisions
}

/// Every record left out of the aggregation, in document order.
pub fn dropped_records(doc: &MetricsDocument) -> Vec<DroppedRecord> {
    record_decisions(doc)
        .into_iter()
        .filter_map(|d| match d.status {
            RecordStatus::Dropped(reason) => Some(DroppedRecord {
                index: d.index,
                reason,
            }),
            RecordStatus::Used(_) => None,
        })
        .collect()
}

/// Reports whose composite score is strictly below `min_score`.
pub fn reports_below(reports: &[Report], min_score: f64) -> Vec<&Report> {
    reports
        .iter()
        .filter(|r| r.composite_score < min_score)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::parse_document;
    use crate::models::Platform;
    use std::path::Path;

    const DOC: &str = r#"{
        "creator": "StreamerPro",
        "platforms": [
            {"platform":"twitch","audienceQuality":80,"engagementEfficiency":85,
             "monetizationReadiness":72,"growthSignal":68,"brandRisk":88,"confidence":0.95},
            {"platform":"vine"},
            {"platform":"kick","audienceQuality":50,"engagementEfficiency":50,
             "monetizationReadiness":50,"growthSignal":50,"brandRisk":50,"confidence":-0.2},
            {"platform":"youtube","audienceQuality":75,"engagementEfficiency":70,
             "monetizationReadiness":82,"growthSignal":72,"brandRisk":90,"confidence":0.85}
        ]
    }"#;

    fn doc() -> MetricsDocument {
        parse_document(DOC, Path::new("streamer_pro.json")).unwrap()
    }

    #[test]
    fn test_build_full_report() {
        let report = build_report(&doc(), &Aggregator::default(), AccessLevel::Full);

        assert_eq!(report.metadata.creator, "StreamerPro");
        assert_eq!(report.metadata.records_supplied, 4);
        assert_eq!(report.metadata.records_rejected, 1);
        assert_eq!(report.metadata.records_out_of_range, 1);
        assert_eq!(report.metadata.platforms_used, 2);
        assert_eq!(report.composite_score, 78.0);
        assert_eq!(report.platform_contributions.as_ref().map(Vec::len), Some(2));
        assert!(report.has_data());
    }

    #[test]
    fn test_summary_access_hides_contributions() {
        let report = build_report(&doc(), &Aggregator::default(), AccessLevel::Summary);

        assert!(report.platform_contributions.is_none());
        assert_eq!(report.metadata.platforms_used, 2);
        assert_eq!(report.composite_score, 78.0);
    }

    #[test]
    fn test_dropped_records_in_document_order() {
        let dropped = dropped_records(&doc());

        assert_eq!(dropped.len(), 2);
        assert_eq!(dropped[0].index, 1);
        assert!(dropped[0].reason.starts_with("could not decode"));
        assert_eq!(dropped[1].index, 2);
        assert_eq!(dropped[1].reason, "confidence out of range: -0.2");
    }

    #[test]
    fn test_record_decisions_cover_every_record() {
        let decisions = record_decisions(&doc());

        let indexes: Vec<_> = decisions.iter().map(|d| d.index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);

        match &decisions[0].status {
            RecordStatus::Used(m) => assert_eq!(m.platform, Platform::Twitch),
            other => panic!("expected record 0 to be used, got {:?}", other),
        }
        assert!(matches!(decisions[1].status, RecordStatus::Dropped(_)));
        assert!(matches!(decisions[2].status, RecordStatus::Dropped(_)));
        assert!(matches!(decisions[3].status, RecordStatus::Used(_)));
    }

    #[test]
    fn test_reports_below_threshold() {
        let aggregator = Aggregator::default();
        let reports = vec![
            build_report(&doc(), &aggregator, AccessLevel::Full),
            build_report(
                &parse_document("[]", Path::new("empty.json")).unwrap(),
                &aggregator,
                AccessLevel::Full,
            ),
        ];

        let below = reports_below(&reports, 60.0);
        assert_eq!(below.len(), 1);
        assert_eq!(below[0].metadata.creator, "empty");

        // The threshold itself passes.
        assert_eq!(reports_below(&reports, 78.0).len(), 1);
        assert!(reports_below(&reports, 0.0).is_empty());
    }
}
