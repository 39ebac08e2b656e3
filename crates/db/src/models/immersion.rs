//! Structured immersion research report produced by the generation service
//! and stored wholesale on a client record.
//!
//! The JSON field names are contractual: they are the exact keys the model is
//! instructed to emit and the keys the frontend reads, so every struct here
//! renames to camelCase.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Bounds on how many user typologies a valid report carries.
pub const MIN_TYPOLOGIES: usize = 9;
pub const MAX_TYPOLOGIES: usize = 12;

/// The full research report for one client offer. Generated in a single call
/// and replaced wholesale on regeneration; there is no partial-update path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct ImmersionData {
    pub avatar_profile: AvatarProfile,
    pub user_typologies: Vec<UserTypology>,
    pub offer_analysis: OfferAnalysis,
    pub marketing_insights: MarketingInsights,
    pub recommendations: Recommendations,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AvatarProfile {
    pub demographics: String,
    pub psychographics: String,
    pub pain_points: Vec<String>,
    pub desires: Vec<String>,
    pub fears: Vec<String>,
    pub objections: Vec<String>,
}

/// One behavioral buyer segment. Immutable once generated; the user selects
/// (never edits) a typology while creating a script, and saved scripts refer
/// to it by name only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct UserTypology {
    pub typology_name: String,
    pub mindset: String,
    pub core_pain: String,
    pub core_desire: String,
    pub buying_trigger: String,
    pub best_content_angle: String,
    pub cta_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct OfferAnalysis {
    pub core_value: String,
    pub emotional_triggers: Vec<String>,
    pub logical_benefits: Vec<String>,
    pub unique_selling_points: Vec<String>,
    pub guarantee_strength: String,
    pub promotion_impact: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct MarketingInsights {
    pub buying_motivation: String,
    pub decision_factors: Vec<String>,
    pub messaging_angle: String,
    pub call_to_action: String,
    pub competitive_advantage: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub content_strategy: String,
    pub channel_strategy: String,
    pub timing_strategy: String,
    pub follow_up_strategy: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typology_round_trips_with_camel_case_keys() {
        let json = r#"{
            "typologyName": "The Skeptical Saver",
            "mindset": "scrolls fast, trusts slowly",
            "corePain": "afraid of wasting money",
            "coreDesire": "peace of mind",
            "buyingTrigger": "a believable guarantee",
            "bestContentAngle": "Objection Handling",
            "ctaStyle": "reassurance"
        }"#;
        let t: UserTypology = serde_json::from_str(json).unwrap();
        assert_eq!(t.typology_name, "The Skeptical Saver");
        assert_eq!(t.cta_style, "reassurance");

        let back = serde_json::to_value(&t).unwrap();
        assert!(back.get("typologyName").is_some());
        assert!(back.get("buyingTrigger").is_some());
        assert!(back.get("typology_name").is_none());
    }

    #[test]
    fn report_requires_all_five_sections() {
        let missing_recommendations = r#"{
            "avatarProfile": {
                "demographics": "d", "psychographics": "p",
                "painPoints": [], "desires": [], "fears": [], "objections": []
            },
            "userTypologies": [],
            "offerAnalysis": {
                "coreValue": "c", "emotionalTriggers": [], "logicalBenefits": [],
                "uniqueSellingPoints": [], "guaranteeStrength": "g", "promotionImpact": "p"
            },
            "marketingInsights": {
                "buyingMotivation": "b", "decisionFactors": [], "messagingAngle": "m",
                "callToAction": "c", "competitiveAdvantage": "a"
            }
        }"#;
        assert!(serde_json::from_str::<ImmersionData>(missing_recommendations).is_err());
    }
}
