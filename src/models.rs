//! Data models for the screening workflow.
//!
//! This module contains the core data structures shared by the session,
//! the simulator, the classifier and the report generator.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// Opaque handle to a user-selected image.
///
/// Holds the image encoded as a `data:` URI, the way a browser file reader
/// would hand it over. The simulator never looks inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    name: String,
    data_uri: String,
}

impl ImageRef {
    /// Wrap an already-encoded data URI.
    pub fn new(name: impl Into<String>, data_uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_uri: data_uri.into(),
        }
    }

    /// Encode raw bytes as a base64 data URI.
    pub fn from_bytes(name: impl Into<String>, mime: &str, bytes: &[u8]) -> Self {
        let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(bytes));
        Self::new(name, data_uri)
    }

    /// Display name of the image (usually the file name).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The encoded image.
    pub fn data_uri(&self) -> &str {
        &self.data_uri
    }

    /// MIME type declared in the data URI, if any.
    pub fn mime_type(&self) -> Option<&str> {
        self.data_uri
            .strip_prefix("data:")
            .and_then(|rest| rest.split(';').next())
            .filter(|mime| !mime.is_empty())
    }
}

/// Raw output of one completed simulated run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RawAnalysisOutput {
    /// Model accuracy in `[85, 100)`.
    pub accuracy_pct: f64,
    /// Prediction confidence in `[75, 95)`.
    pub confidence_pct: f64,
    /// Whether an abnormality was "found".
    pub is_positive: bool,
}

/// Coarse risk classification presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskTier::Low => write!(f, "Low"),
            RiskTier::Medium => write!(f, "Medium"),
            RiskTier::High => write!(f, "High"),
        }
    }
}

impl RiskTier {
    /// All tiers, lowest first.
    pub const ALL: [RiskTier; 3] = [RiskTier::Low, RiskTier::Medium, RiskTier::High];

    /// Position in the static lookup tables.
    pub(crate) fn index(self) -> usize {
        match self {
            RiskTier::Low => 0,
            RiskTier::Medium => 1,
            RiskTier::High => 2,
        }
    }

    /// Returns an emoji representation of the tier.
    pub fn emoji(&self) -> &'static str {
        match self {
            RiskTier::Low => "🟢",
            RiskTier::Medium => "🟡",
            RiskTier::High => "🔴",
        }
    }

    /// Uppercase label shown on the risk badge.
    pub fn badge_label(&self) -> &'static str {
        match self {
            RiskTier::Low => "LOW",
            RiskTier::Medium => "MEDIUM",
            RiskTier::High => "HIGH",
        }
    }

    /// Text color class for the prediction and icons.
    pub fn text_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "text-green-600",
            RiskTier::Medium => "text-yellow-600",
            RiskTier::High => "text-red-600",
        }
    }

    /// Background and border classes for the alert box.
    pub fn background_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "bg-green-50 border-green-200",
            RiskTier::Medium => "bg-yellow-50 border-yellow-200",
            RiskTier::High => "bg-red-50 border-red-200",
        }
    }

    /// Badge fill classes.
    pub fn badge_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "bg-green-500 hover:bg-green-600",
            RiskTier::Medium => "bg-yellow-500 hover:bg-yellow-600",
            RiskTier::High => "bg-red-500 hover:bg-red-600",
        }
    }

    /// Gradient behind the risk assessment panel.
    pub fn gradient_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "from-green-100 to-emerald-200",
            RiskTier::Medium => "from-yellow-100 to-amber-200",
            RiskTier::High => "from-red-100 to-rose-200",
        }
    }

    /// Precautions card fill and border.
    pub fn card_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "bg-gradient-to-br from-green-50 to-emerald-100 border-green-300",
            RiskTier::Medium => "bg-gradient-to-br from-yellow-50 to-amber-100 border-yellow-300",
            RiskTier::High => "bg-gradient-to-br from-red-50 to-rose-100 border-red-300",
        }
    }

    /// Precautions card header gradient.
    pub fn header_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "bg-gradient-to-r from-green-400 to-emerald-500",
            RiskTier::Medium => "bg-gradient-to-r from-yellow-400 to-amber-500",
            RiskTier::High => "bg-gradient-to-r from-red-400 to-rose-500",
        }
    }

    /// Circle behind each recommendation icon.
    pub fn icon_bubble_class(&self) -> &'static str {
        match self {
            RiskTier::Low => "bg-green-200",
            RiskTier::Medium => "bg-yellow-200",
            RiskTier::High => "bg-red-200",
        }
    }

    /// Recommendation row fill; high risk rows are slightly more opaque.
    pub fn list_row_class(&self) -> &'static str {
        match self {
            RiskTier::Low | RiskTier::Medium => "bg-white/50",
            RiskTier::High => "bg-white/60",
        }
    }

    /// Status icon next to the prediction text.
    pub fn status_icon(&self) -> RecommendationCategory {
        match self {
            RiskTier::Low => RecommendationCategory::CheckCircle,
            RiskTier::Medium | RiskTier::High => RecommendationCategory::AlertCircle,
        }
    }

    /// Bundle of all presentation data for this tier.
    pub fn presentation(&self) -> TierPresentation {
        TierPresentation {
            badge_label: self.badge_label(),
            text_class: self.text_class(),
            background_class: self.background_class(),
            badge_class: self.badge_class(),
            gradient_class: self.gradient_class(),
            card_class: self.card_class(),
            header_class: self.header_class(),
            icon_bubble_class: self.icon_bubble_class(),
            list_row_class: self.list_row_class(),
            status_icon: self.status_icon(),
        }
    }
}

/// Icon tag attached to a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Heart,
    Apple,
    Cigarette,
    Stethoscope,
    Wind,
    Dumbbell,
    AlertCircle,
    CheckCircle,
    Activity,
}

impl fmt::Display for RecommendationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecommendationCategory::Heart => "heart",
            RecommendationCategory::Apple => "apple",
            RecommendationCategory::Cigarette => "cigarette",
            RecommendationCategory::Stethoscope => "stethoscope",
            RecommendationCategory::Wind => "wind",
            RecommendationCategory::Dumbbell => "dumbbell",
            RecommendationCategory::AlertCircle => "alert",
            RecommendationCategory::CheckCircle => "check",
            RecommendationCategory::Activity => "activity",
        };
        write!(f, "{}", name)
    }
}

impl RecommendationCategory {
    /// Returns an emoji used in terminal and Markdown output.
    pub fn emoji(&self) -> &'static str {
        match self {
            RecommendationCategory::Heart => "❤️",
            RecommendationCategory::Apple => "🍎",
            RecommendationCategory::Cigarette => "🚭",
            RecommendationCategory::Stethoscope => "🩺",
            RecommendationCategory::Wind => "🌬️",
            RecommendationCategory::Dumbbell => "🏋️",
            RecommendationCategory::AlertCircle => "⚠️",
            RecommendationCategory::CheckCircle => "✅",
            RecommendationCategory::Activity => "📈",
        }
    }
}

/// One recommended precaution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RecommendationItem {
    pub category: RecommendationCategory,
    pub text: &'static str,
}

/// Presentation data derived from a risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierPresentation {
    pub badge_label: &'static str,
    pub text_class: &'static str,
    pub background_class: &'static str,
    pub badge_class: &'static str,
    pub gradient_class: &'static str,
    pub card_class: &'static str,
    pub header_class: &'static str,
    pub icon_bubble_class: &'static str,
    pub list_row_class: &'static str,
    pub status_icon: RecommendationCategory,
}

/// Classified result of a run, as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub accuracy_pct: f64,
    pub confidence_pct: f64,
    pub prediction_text: &'static str,
    pub risk_tier: RiskTier,
    pub recommendations: &'static [RecommendationItem],
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// Name of the analyzed image.
    pub image_name: String,
    /// Date and time the result was produced.
    pub analysis_date: DateTime<Utc>,
    /// Seed used for the simulated run, if reproducible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Wall-clock duration of the run in seconds.
    pub duration_seconds: f64,
}

/// A complete screening report.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub metadata: ReportMetadata,
    pub result: AnalysisResult,
    pub presentation: TierPresentation,
}

impl AnalysisReport {
    /// Creates a report for a result, deriving the tier presentation.
    pub fn new(metadata: ReportMetadata, result: AnalysisResult) -> Self {
        let presentation = result.risk_tier.presentation();
        Self {
            metadata,
            result,
            presentation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_risk_tier_ordering() {
        assert!(RiskTier::Low < RiskTier::Medium);
        assert!(RiskTier::Medium < RiskTier::High);
    }

    #[test]
    fn test_risk_tier_classes() {
        assert_eq!(RiskTier::Low.text_class(), "text-green-600");
        assert_eq!(RiskTier::Medium.background_class(), "bg-yellow-50 border-yellow-200");
        assert_eq!(RiskTier::High.badge_class(), "bg-red-500 hover:bg-red-600");
        assert_eq!(RiskTier::High.badge_label(), "HIGH");
    }

    #[test]
    fn test_status_icon() {
        assert_eq!(RiskTier::Low.status_icon(), RecommendationCategory::CheckCircle);
        assert_eq!(RiskTier::Medium.status_icon(), RecommendationCategory::AlertCircle);
        assert_eq!(RiskTier::High.status_icon(), RecommendationCategory::AlertCircle);
    }

    #[test]
    fn test_low_tier_precautions_classes() {
        let p = RiskTier::Low.presentation();
        assert_eq!(
            p.card_class,
            "bg-gradient-to-br from-green-50 to-emerald-100 border-green-300"
        );
        assert_eq!(p.header_class, "bg-gradient-to-r from-green-400 to-emerald-500");
        assert_eq!(p.icon_bubble_class, "bg-green-200");
        assert_eq!(p.list_row_class, "bg-white/50");
    }

    #[test]
    fn test_medium_tier_precautions_classes() {
        let p = RiskTier::Medium.presentation();
        assert_eq!(
            p.card_class,
            "bg-gradient-to-br from-yellow-50 to-amber-100 border-yellow-300"
        );
        assert_eq!(p.header_class, "bg-gradient-to-r from-yellow-400 to-amber-500");
        assert_eq!(p.icon_bubble_class, "bg-yellow-200");
        assert_eq!(p.list_row_class, "bg-white/50");
    }

    #[test]
    fn test_high_tier_precautions_classes() {
        let p = RiskTier::High.presentation();
        assert_eq!(
            p.card_class,
            "bg-gradient-to-br from-red-50 to-rose-100 border-red-300"
        );
        assert_eq!(p.header_class, "bg-gradient-to-r from-red-400 to-rose-500");
        assert_eq!(p.icon_bubble_class, "bg-red-200");
        assert_eq!(p.list_row_class, "bg-white/60");
    }

    #[test]
    fn test_image_ref_from_bytes() {
        let image = ImageRef::from_bytes("scan.png", "image/png", b"abc");
        assert_eq!(image.name(), "scan.png");
        assert_eq!(image.data_uri(), "data:image/png;base64,YWJj");
        assert_eq!(image.mime_type(), Some("image/png"));
    }

    #[test]
    fn test_image_ref_opaque_uri() {
        let image = ImageRef::new("remote", "https://example.com/xray.jpg");
        assert_eq!(image.mime_type(), None);
    }

    #[test]
    fn test_risk_tier_serializes_lowercase() {
        let json = serde_json::to_string(&RiskTier::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
    }
}
