//! Risk classification and recommendation lookup.
//!
//! Maps a raw simulated output to a risk tier, a prediction text and the
//! fixed list of precautions for that tier. The lists live in a static table
//! indexed by tier, so every classification into the same tier hands back
//! the very same slice.

use crate::models::{
    AnalysisResult, RawAnalysisOutput, RecommendationCategory as Icon, RecommendationItem,
    RiskTier,
};

/// Confidence above which a positive finding is rated high risk.
pub const HIGH_CONFIDENCE_THRESHOLD: f64 = 85.0;

pub const NEGATIVE_PREDICTION: &str = "No significant abnormalities detected";
pub const POSITIVE_PREDICTION: &str = "Potential abnormality detected";

const fn item(category: Icon, text: &'static str) -> RecommendationItem {
    RecommendationItem { category, text }
}

const LOW_RISK: [RecommendationItem; 5] = [
    item(Icon::Heart, "Maintain a healthy lifestyle with regular exercise"),
    item(Icon::Apple, "Eat a balanced diet rich in fruits and vegetables"),
    item(Icon::Cigarette, "Avoid smoking and secondhand smoke exposure"),
    item(Icon::Stethoscope, "Schedule annual health checkups"),
    item(Icon::Wind, "Practice breathing exercises for lung health"),
];

const MEDIUM_RISK: [RecommendationItem; 6] = [
    item(Icon::Stethoscope, "Consult with a healthcare professional immediately"),
    item(
        Icon::Cigarette,
        "Quit smoking if you are a smoker - seek cessation programs",
    ),
    item(
        Icon::Wind,
        "Avoid exposure to air pollution and harmful chemicals",
    ),
    item(Icon::Dumbbell, "Engage in moderate physical activity daily"),
    item(Icon::Apple, "Increase intake of antioxidant-rich foods"),
    item(Icon::Heart, "Monitor symptoms and schedule follow-up tests"),
];

const HIGH_RISK: [RecommendationItem; 7] = [
    item(
        Icon::Stethoscope,
        "URGENT: Schedule an appointment with an oncologist immediately",
    ),
    item(
        Icon::AlertCircle,
        "Get a comprehensive medical evaluation and biopsy",
    ),
    item(
        Icon::Cigarette,
        "Stop smoking immediately and avoid all tobacco products",
    ),
    item(
        Icon::Heart,
        "Inform family members about potential genetic risk factors",
    ),
    item(Icon::Wind, "Avoid all environmental pollutants and carcinogens"),
    item(
        Icon::Apple,
        "Follow a cancer-prevention diet as recommended by your doctor",
    ),
    item(
        Icon::Activity,
        "Stay physically active as advised by your healthcare team",
    ),
];

/// Tier-indexed recommendation table, lowest tier first.
static RECOMMENDATIONS: [&[RecommendationItem]; 3] = [&LOW_RISK, &MEDIUM_RISK, &HIGH_RISK];

/// Output of [`classify`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub risk_tier: RiskTier,
    pub prediction_text: &'static str,
    pub recommendations: &'static [RecommendationItem],
}

/// Derive the risk tier from a raw output.
///
/// Negative findings are always low risk. Positive findings are high risk
/// only when confidence is strictly above the threshold.
pub fn risk_tier(raw: &RawAnalysisOutput) -> RiskTier {
    if !raw.is_positive {
        RiskTier::Low
    } else if raw.confidence_pct > HIGH_CONFIDENCE_THRESHOLD {
        RiskTier::High
    } else {
        RiskTier::Medium
    }
}

/// Recommended precautions for a tier.
pub fn recommendations_for(tier: RiskTier) -> &'static [RecommendationItem] {
    RECOMMENDATIONS[tier.index()]
}

/// Classify a raw output. Total and pure.
pub fn classify(raw: &RawAnalysisOutput) -> Classification {
    let risk_tier = risk_tier(raw);
    let prediction_text = if raw.is_positive {
        POSITIVE_PREDICTION
    } else {
        NEGATIVE_PREDICTION
    };

    Classification {
        risk_tier,
        prediction_text,
        recommendations: recommendations_for(risk_tier),
    }
}

/// Combine a raw output with its classification into the view model.
pub fn build_result(raw: &RawAnalysisOutput) -> AnalysisResult {
    let classification = classify(raw);
    AnalysisResult {
        accuracy_pct: raw.accuracy_pct,
        confidence_pct: raw.confidence_pct,
        prediction_text: classification.prediction_text,
        risk_tier: classification.risk_tier,
        recommendations: classification.recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(confidence_pct: f64, is_positive: bool) -> RawAnalysisOutput {
        RawAnalysisOutput {
            accuracy_pct: 92.0,
            confidence_pct,
            is_positive,
        }
    }

    #[test]
    fn test_negative_is_low_regardless_of_confidence() {
        for confidence in [75.0, 85.0, 90.0, 94.99] {
            let c = classify(&raw(confidence, false));
            assert_eq!(c.risk_tier, RiskTier::Low);
            assert_eq!(c.prediction_text, NEGATIVE_PREDICTION);
        }
    }

    #[test]
    fn test_positive_high_confidence_is_high() {
        let c = classify(&raw(90.0, true));
        assert_eq!(c.risk_tier, RiskTier::High);
        assert_eq!(c.prediction_text, POSITIVE_PREDICTION);
    }

    #[test]
    fn test_positive_low_confidence_is_medium() {
        let c = classify(&raw(80.0, true));
        assert_eq!(c.risk_tier, RiskTier::Medium);
        assert_eq!(c.prediction_text, POSITIVE_PREDICTION);
    }

    #[test]
    fn test_threshold_tie_is_medium() {
        assert_eq!(risk_tier(&raw(85.0, true)), RiskTier::Medium);
        assert_eq!(risk_tier(&raw(85.000001, true)), RiskTier::High);
    }

    #[test]
    fn test_recommendation_lengths() {
        assert_eq!(recommendations_for(RiskTier::Low).len(), 5);
        assert_eq!(recommendations_for(RiskTier::Medium).len(), 6);
        assert_eq!(recommendations_for(RiskTier::High).len(), 7);
    }

    #[test]
    fn test_same_tier_shares_table_entry() {
        let a = classify(&raw(76.0, true));
        let b = classify(&raw(84.5, true));
        assert_eq!(a.recommendations, b.recommendations);
        assert!(std::ptr::eq(a.recommendations, b.recommendations));

        let c = classify(&raw(75.0, false));
        let d = classify(&raw(94.0, false));
        assert!(std::ptr::eq(c.recommendations, d.recommendations));
    }

    #[test]
    fn test_recommendation_order() {
        let high = recommendations_for(RiskTier::High);
        assert!(high[0].text.starts_with("URGENT"));
        assert_eq!(high[0].category, Icon::Stethoscope);
        assert_eq!(high[6].category, Icon::Activity);

        let low = recommendations_for(RiskTier::Low);
        assert_eq!(low[0].category, Icon::Heart);
        assert_eq!(low[4].text, "Practice breathing exercises for lung health");
    }

    #[test]
    fn test_build_result_copies_metrics() {
        let output = RawAnalysisOutput {
            accuracy_pct: 97.25,
            confidence_pct: 88.5,
            is_positive: true,
        };
        let result = build_result(&output);
        assert_eq!(result.accuracy_pct, 97.25);
        assert_eq!(result.confidence_pct, 88.5);
        assert_eq!(result.risk_tier, RiskTier::High);
        assert_eq!(result.recommendations.len(), 7);
    }
}
