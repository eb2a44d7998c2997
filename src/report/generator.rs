//! Markdown and JSON report generation.
//!
//! This module renders reports built from aggregation results. It only
//! formats numbers the engine produced; nothing is recomputed here.

use crate::config::ReportConfig;
use crate::models::{DroppedRecord, PlatformContribution, Report, ReportMetadata};
use anyhow::Result;

/// Generate a Markdown document for one or more reports.
///
/// Several reports get a leading overview table before the per-creator sections.
pub fn generate_markdown(reports: &[Report], options: &ReportConfig) -> String {
    if let [report] = reports {
        return generate_markdown_report(report, options);
    }

    let mut output = String::new();

    output.push_str("# AQV Batch Report\n\n");
    output.push_str(&generate_overview_section(reports));

    for report in reports {
        output.push_str(&generate_creator_body(report, options, "##"));
    }

    output.push_str(&generate_footer());
    output
}

/// Generate a complete Markdown report for one creator.
pub fn generate_markdown_report(report: &Report, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str(&generate_creator_body(report, options, "#"));
    output.push_str(&generate_footer());

    output
}

fn generate_creator_body(report: &Report, options: &ReportConfig, heading: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{} AQV Report: {}\n\n",
        heading, report.metadata.creator
    ));

    output.push_str(&generate_metadata_section(&report.metadata));

    if !report.has_data() {
        output.push_str("**No usable platform data.** Every supplied record was dropped, ");
        output.push_str("so no score could be computed.\n\n");
    } else {
        output.push_str(&generate_score_section(report));
        output.push_str(&generate_dimensions_section(report));
        output.push_str(&generate_contribution_section(report, options.bar_width));
    }

    if options.show_dropped {
        output.push_str(&generate_dropped_section(&report.dropped_records));
    }

    output
}

/// Generate the overview table for a batch.
fn generate_overview_section(reports: &[Report]) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");

    if reports.is_empty() {
        section.push_str("No input documents were found.\n\n");
        return section;
    }

    section.push_str("| Creator | Composite | Platforms |\n");
    section.push_str("|:---|:---:|:---:|\n");

    let mut sorted: Vec<&Report> = reports.iter().collect();
    sorted.sort_by(|a, b| b.composite_score.total_cmp(&a.composite_score));

    for report in sorted {
        section.push_str(&format!(
            "| {} | {:.1} | {} |\n",
            report.metadata.creator, report.composite_score, report.metadata.platforms_used
        ));
    }
    section.push('\n');

    section
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str(&format!("- **Source:** `{}`\n", metadata.source));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records Supplied:** {}\n",
        metadata.records_supplied
    ));
    if metadata.records_rejected > 0 {
        section.push_str(&format!(
            "- **Records Rejected:** {} (could not be decoded)\n",
            metadata.records_rejected
        ));
    }
    if metadata.records_out_of_range > 0 {
        section.push_str(&format!(
            "- **Records Out of Range:** {}\n",
            metadata.records_out_of_range
        ));
    }
    section.push_str(&format!(
        "- **Platforms Used:** {}\n",
        metadata.platforms_used
    ));
    section.push_str(&format!("- **Access:** {}\n", metadata.access));
    section.push('\n');

    section
}

fn generate_score_section(report: &Report) -> String {
    format!(
        "**Composite Score:** {:.1} / 100\n\n",
        report.composite_score
    )
}

/// Generate the dimension breakdown table.
fn generate_dimensions_section(report: &Report) -> String {
    let mut section = String::new();

    section.push_str("**Dimensions**\n\n");
    section.push_str("| Dimension | Score | Weight |\n");
    section.push_str("|:---|:---:|:---:|\n");

    for (dimension, score) in report.dimensions.iter() {
        section.push_str(&format!(
            "| {} | {:.1} | {:.0}% |\n",
            dimension,
            score,
            report.dimension_weights.get(dimension) * 100.0
        ));
    }
    section.push('\n');

    section
}

/// Generate the per-platform contribution section.
fn generate_contribution_section(report: &Report, bar_width: usize) -> String {
    let mut section = String::new();

    let contributions = match report.platform_contributions {
        Some(ref c) => c,
        None => {
            section.push_str("**Platform Contribution** (locked)\n\n");
            section.push_str(
                "> The per-platform breakdown is not included at this access level.\n\n",
            );
            return section;
        }
    };

    // A single platform trivially contributes everything.
    if contributions.len() < 2 {
        return section;
    }

    section.push_str("**Platform Contribution**\n\n");
    section.push_str("| Platform | Color | Weight | Confidence | Contribution | |\n");
    section.push_str("|:---|:---:|:---:|:---:|:---:|:---|\n");

    for c in contributions {
        section.push_str(&format!(
            "| {} | `{}` | {:.1}% | {:.0}% | {:.1}% | {} |\n",
            c.platform,
            c.platform.color(),
            c.effective_weight * 100.0,
            c.confidence * 100.0,
            c.contribution_percent,
            contribution_bar(c, bar_width)
        ));
    }
    section.push('\n');

    // No sentence when every contribution is zero.
    if let Some(dominant) = PlatformContribution::dominant(contributions)
        .filter(|d| d.contribution_percent > 0.0)
    {
        section.push_str(&format!(
            "**{}** contributes **{:.1}%** to the composite score, making it the dominant platform.\n\n",
            dominant.platform, dominant.contribution_percent
        ));
    }

    section
}

/// Text bar proportional to the contribution percent.
fn contribution_bar(contribution: &PlatformContribution, width: usize) -> String {
    let filled = (contribution.contribution_percent / 100.0 * width as f64).round() as usize;
    "█".repeat(filled.min(width))
}

/// Generate the dropped records section.
fn generate_dropped_section(dropped: &[DroppedRecord]) -> String {
    if dropped.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("**Dropped Records**\n\n");
    for d in dropped {
        section.push_str(&format!("- Record {}: {}\n", d.index, d.reason));
    }
    section.push('\n');

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Report generated by aqv v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

/// Generate a JSON report. A single report is an object, several are an array.
pub fn generate_json(reports: &[Report]) -> Result<String> {
    match reports {
        [report] => serde_json::to_string_pretty(report).map_err(Into::into),
        _ => serde_json::to_string_pretty(reports).map_err(Into::into),
    }
}
