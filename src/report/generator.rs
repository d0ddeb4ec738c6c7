//! Markdown and JSON report generation.
//!
//! This module renders a screening report from a classified analysis
//! result.

use crate::config::ReportConfig;
use crate::models::{AnalysisReport, AnalysisResult, RecommendationItem, ReportMetadata, TierPresentation};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &AnalysisReport, options: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# LungScan Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_result_section(&report.result));

    if options.include_recommendations {
        output.push_str(&generate_recommendations_section(report.result.recommendations));
    }

    if options.include_presentation {
        output.push_str(&generate_presentation_section(&report.presentation));
    }

    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Image:** `{}`\n", metadata.image_name));
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    if let Some(seed) = metadata.seed {
        section.push_str(&format!("- **Seed:** {}\n", seed));
    }
    section.push_str(&format!(
        "- **Analysis Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the prediction, risk badge and metrics.
fn generate_result_section(result: &AnalysisResult) -> String {
    let mut section = String::new();
    let tier = result.risk_tier;

    section.push_str("## Analysis Results\n\n");
    section.push_str(&format!(
        "> {} {}\n\n",
        tier.status_icon().emoji(),
        result.prediction_text
    ));

    section.push_str("### Risk Level Assessment\n\n");
    section.push_str(&format!("**⚠ {} ⚠** {}\n\n", tier.badge_label(), tier.emoji()));

    section.push_str("| Metric | Value |\n");
    section.push_str("|:---|:---:|\n");
    section.push_str(&format!("| Model Accuracy | {:.2}% |\n", result.accuracy_pct));
    section.push_str(&format!(
        "| Prediction Confidence | {:.2}% |\n\n",
        result.confidence_pct
    ));

    section
}

/// Generate the recommended precautions.
fn generate_recommendations_section(recommendations: &[RecommendationItem]) -> String {
    if recommendations.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Recommended Precautions\n\n");
    section.push_str("Follow these guidelines to reduce risk:\n\n");

    for (i, rec) in recommendations.iter().enumerate() {
        section.push_str(&format!("{}. {} {}\n", i + 1, rec.category.emoji(), rec.text));
    }
    section.push('\n');

    section
}

/// Generate the styling classes for front ends that render the result.
fn generate_presentation_section(presentation: &TierPresentation) -> String {
    let mut section = String::new();

    section.push_str("## Presentation\n\n");
    section.push_str("| Element | Classes |\n");
    section.push_str("|:---|:---|\n");
    section.push_str(&format!("| Text | `{}` |\n", presentation.text_class));
    section.push_str(&format!("| Alert | `{}` |\n", presentation.background_class));
    section.push_str(&format!("| Badge | `{}` |\n", presentation.badge_class));
    section.push_str(&format!("| Panel | `{}` |\n", presentation.gradient_class));
    section.push_str(&format!("| Precautions card | `{}` |\n", presentation.card_class));
    section.push_str(&format!("| Card header | `{}` |\n", presentation.header_class));
    section.push_str(&format!(
        "| Icon bubble | `{}` |\n",
        presentation.icon_bubble_class
    ));
    section.push_str(&format!("| List row | `{}` |\n", presentation.list_row_class));
    section.push_str(&format!("| Icon | `{}` |\n\n", presentation.status_icon));

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(
        "*Simulated screening result generated by LungScan. Not a medical diagnosis.*\n",
    );

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &AnalysisReport, options: &ReportConfig) -> Result<String> {
    let mut value = serde_json::to_value(report)?;

    if let Some(object) = value.as_object_mut() {
        if !options.include_presentation {
            object.remove("presentation");
        }
        if !options.include_recommendations {
            if let Some(result) = object.get_mut("result").and_then(|r| r.as_object_mut()) {
                result.remove("recommendations");
            }
        }
    }

    serde_json::to_string_pretty(&value).map_err(Into::into)
}
