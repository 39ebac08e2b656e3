//! Generation, replacement, and export of the immersion research report.

use chrono::Utc;
use db::models::client::Client;
use db::models::immersion::ImmersionData;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::info;
use ts_rs::TS;
use uuid::Uuid;

use super::gemini_api::GeminiApiError;
use super::generation::ScriptGenerator;

#[derive(Debug, Error)]
pub enum ImmersionError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("generation error: {0}")]
    Generation(#[from] GeminiApiError),
    #[error("client not found")]
    ClientNotFound,
    #[error("no immersion research for this client")]
    ImmersionMissing,
}

/// A report rendered as a downloadable flat text file.
#[derive(Debug, Clone, Serialize, TS)]
pub struct ExportedReport {
    pub filename: String,
    pub body: String,
}

pub struct ImmersionService {
    pool: SqlitePool,
    generator: ScriptGenerator,
}

impl ImmersionService {
    pub fn new(pool: SqlitePool, generator: ScriptGenerator) -> Self {
        Self { pool, generator }
    }

    /// Generate a fresh report and store it on the client, replacing any
    /// previous one wholesale. On failure the stored report is untouched.
    pub async fn generate_and_store(
        &self,
        client_id: Uuid,
    ) -> Result<ImmersionData, ImmersionError> {
        let client = Client::find_by_id(&self.pool, client_id)
            .await?
            .ok_or(ImmersionError::ClientNotFound)?;

        let report = self.generator.generate_immersion(&client).await?;
        Client::set_immersion(&self.pool, client_id, Some(&report)).await?;

        info!(
            client_id = %client_id,
            typology_count = report.user_typologies.len(),
            "Stored immersion research report"
        );
        Ok(report)
    }

    pub async fn get(&self, client_id: Uuid) -> Result<ImmersionData, ImmersionError> {
        let client = Client::find_by_id(&self.pool, client_id)
            .await?
            .ok_or(ImmersionError::ClientNotFound)?;
        client
            .parsed_immersion()
            .ok_or(ImmersionError::ImmersionMissing)
    }

    /// Clear the stored report. Saved scripts that reference typology names
    /// from it are deliberately left alone.
    pub async fn delete(&self, client_id: Uuid) -> Result<(), ImmersionError> {
        Client::find_by_id(&self.pool, client_id)
            .await?
            .ok_or(ImmersionError::ClientNotFound)?;
        Client::set_immersion(&self.pool, client_id, None).await?;
        info!(client_id = %client_id, "Deleted immersion research report");
        Ok(())
    }

    /// Render the stored report as a downloadable text file.
    pub async fn export(&self, client_id: Uuid) -> Result<ExportedReport, ImmersionError> {
        let client = Client::find_by_id(&self.pool, client_id)
            .await?
            .ok_or(ImmersionError::ClientNotFound)?;
        let report = client
            .parsed_immersion()
            .ok_or(ImmersionError::ImmersionMissing)?;

        let date = Utc::now().format("%-m/%-d/%Y").to_string();
        Ok(ExportedReport {
            filename: export_filename(&client.product_name),
            body: export_body(&client, &report, &date),
        })
    }
}

pub(crate) fn export_filename(product_name: &str) -> String {
    let mut sanitized = String::with_capacity(product_name.len());
    let mut in_whitespace = false;
    for ch in product_name.chars() {
        if ch.is_whitespace() {
            if !in_whitespace {
                sanitized.push('_');
                in_whitespace = true;
            }
        } else {
            sanitized.push(ch);
            in_whitespace = false;
        }
    }
    format!("Avatar_Immersion_{sanitized}.txt")
}

pub(crate) fn export_body(client: &Client, report: &ImmersionData, date: &str) -> String {
    let mut lines: Vec<String> = vec![
        "CUSTOMER AVATAR IMMERSION REPORT".to_string(),
        "================================".to_string(),
        format!("Product: {}", client.product_name),
        format!("Country: {}", client.country),
        format!("Price: {}", client.price),
        format!("Date: {date}"),
        "\n".to_string(),
        "I. AVATAR PROFILE (ប្រវត្តិរូប AVATAR)".to_string(),
        "------------------------------------".to_string(),
        format!(
            "Demographics (ប្រជាសាស្ត្រ): {}",
            report.avatar_profile.demographics
        ),
        format!(
            "Psychographics (ចិត្តសាស្ត្រ): {}",
            report.avatar_profile.psychographics
        ),
        "Pain Points (ចំណុចឈឺចាប់):".to_string(),
    ];
    lines.extend(report.avatar_profile.pain_points.iter().map(|p| format!("- {p}")));
    lines.push("Desires (បំណងប្រាថ្នា):".to_string());
    lines.extend(report.avatar_profile.desires.iter().map(|d| format!("- {d}")));
    lines.push("Fears (ការភ័យខ្លាច):".to_string());
    lines.extend(report.avatar_profile.fears.iter().map(|f| format!("- {f}")));
    lines.push("Objections (ការជំទាស់):".to_string());
    lines.extend(report.avatar_profile.objections.iter().map(|o| format!("- {o}")));

    lines.push("\n".to_string());
    lines.push("II. OFFER ANALYSIS (ការវិភាគការផ្តល់ជូន)".to_string());
    lines.push("---------------------------------------".to_string());
    lines.push(format!(
        "Core Value (តម្លៃស្នូល): {}",
        report.offer_analysis.core_value
    ));
    lines.push("Emotional Triggers (កត្តាអារម្មណ៍):".to_string());
    lines.extend(report.offer_analysis.emotional_triggers.iter().map(|t| format!("- {t}")));
    lines.push("Logical Benefits (អត្ថប្រយោជន៍តក្កវិជ្ជា):".to_string());
    lines.extend(report.offer_analysis.logical_benefits.iter().map(|b| format!("- {b}")));
    lines.push("Unique Selling Points (ចំណុចលក់តែមួយគត់):".to_string());
    lines.extend(report.offer_analysis.unique_selling_points.iter().map(|u| format!("- {u}")));
    lines.push(format!(
        "Guarantee Strength (កម្លាំងធានា): {}",
        report.offer_analysis.guarantee_strength
    ));
    lines.push(format!(
        "Promotion Impact (ផលប៉ះពាល់ប្រម៉ូសិន): {}",
        report.offer_analysis.promotion_impact
    ));

    lines.push("\n".to_string());
    lines.push("III. MARKETING INSIGHTS (ការយល់ដឹងទីផ្សារ)".to_string());
    lines.push("----------------------------------------".to_string());
    lines.push(format!(
        "Buying Motivation (ការលើកទឹកចិត្តទិញ): {}",
        report.marketing_insights.buying_motivation
    ));
    lines.push("Decision Factors (កត្តាសម្រេចចិត្ត):".to_string());
    lines.extend(report.marketing_insights.decision_factors.iter().map(|f| format!("- {f}")));
    lines.push(format!(
        "Messaging Angle (មុំសារ): {}",
        report.marketing_insights.messaging_angle
    ));
    lines.push(format!(
        "Call to Action (ការអំពាវនាវឱ្យធ្វើសកម្មភាព): {}",
        report.marketing_insights.call_to_action
    ));
    lines.push(format!(
        "Competitive Advantage (អត្ថប្រយោជន៍ប្រកួតប្រជែង): {}",
        report.marketing_insights.competitive_advantage
    ));

    lines.push("\n".to_string());
    lines.push("IV. RECOMMENDATIONS (អនុសាសន៍)".to_string());
    lines.push("----------------------------".to_string());
    lines.push(format!(
        "Content Strategy (យុទ្ធសាស្ត្រមាតិកា): {}",
        report.recommendations.content_strategy
    ));
    lines.push(format!(
        "Channel Strategy (យុទ្ធសាស្ត្រឆានែល): {}",
        report.recommendations.channel_strategy
    ));
    lines.push(format!(
        "Timing Strategy (យុទ្ធសាស្ត្រពេលវេលា): {}",
        report.recommendations.timing_strategy
    ));
    lines.push(format!(
        "Follow-up Strategy (យុទ្ធសាស្ត្រតាមដាន): {}",
        report.recommendations.follow_up_strategy
    ));

    if !report.user_typologies.is_empty() {
        lines.push("\n".to_string());
        lines.push("V. USER TYPOLOGIES (អ្នកប្រើប្រាស់)".to_string());
        lines.push("-----------------------------------".to_string());
        for (index, typology) in report.user_typologies.iter().enumerate() {
            lines.push(format!("\n{}. {}", index + 1, typology.typology_name));
            lines.push(format!("   Mindset (របៀបគិត): {}", typology.mindset));
            lines.push(format!(
                "   Core Pain (ចំណុចឈឺចាប់ស្នូល): {}",
                typology.core_pain
            ));
            lines.push(format!(
                "   Core Desire (បំណងប្រាថ្នាស្នូល): {}",
                typology.core_desire
            ));
            lines.push(format!(
                "   Buying Trigger (កត្តាទិញ): {}",
                typology.buying_trigger
            ));
            lines.push(format!(
                "   Best Content Angle (មុំមាតិកាល្អបំផុត): {}",
                typology.best_content_angle
            ));
            lines.push(format!("   CTA Style (ស្ទីល CTA): {}", typology.cta_style));
        }
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use db::models::immersion::{
        AvatarProfile, MarketingInsights, OfferAnalysis, Recommendations, UserTypology,
    };
    use uuid::Uuid;

    use super::*;

    fn test_client(product_name: &str) -> Client {
        Client {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_name: product_name.to_string(),
            country: "Cambodia".to_string(),
            price: "$12".to_string(),
            status: Default::default(),
            problems: r#"["a","b","c"]"#.to_string(),
            target_customers: "t".to_string(),
            warranty: "w".to_string(),
            promotion: "p".to_string(),
            uniqueness: "u".to_string(),
            immersion_data: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_report() -> ImmersionData {
        ImmersionData {
            avatar_profile: AvatarProfile {
                demographics: "women 25-40 in Phnom Penh".to_string(),
                psychographics: "values convenience".to_string(),
                pain_points: vec!["hair loss".to_string(), "dry scalp".to_string()],
                desires: vec!["confidence".to_string()],
                fears: vec!["wasting money".to_string()],
                objections: vec!["too expensive".to_string()],
            },
            user_typologies: vec![UserTypology {
                typology_name: "The Skeptical Saver".to_string(),
                mindset: "m".to_string(),
                core_pain: "p".to_string(),
                core_desire: "d".to_string(),
                buying_trigger: "t".to_string(),
                best_content_angle: "a".to_string(),
                cta_style: "c".to_string(),
            }],
            offer_analysis: OfferAnalysis {
                core_value: "v".to_string(),
                emotional_triggers: vec!["relief".to_string()],
                logical_benefits: vec!["saves time".to_string()],
                unique_selling_points: vec!["natural".to_string()],
                guarantee_strength: "strong".to_string(),
                promotion_impact: "high".to_string(),
            },
            marketing_insights: MarketingInsights {
                buying_motivation: "b".to_string(),
                decision_factors: vec!["price".to_string()],
                messaging_angle: "m".to_string(),
                call_to_action: "c".to_string(),
                competitive_advantage: "a".to_string(),
            },
            recommendations: Recommendations {
                content_strategy: "c".to_string(),
                channel_strategy: "h".to_string(),
                timing_strategy: "t".to_string(),
                follow_up_strategy: "f".to_string(),
            },
        }
    }

    #[test]
    fn filename_replaces_whitespace_runs_with_underscores() {
        assert_eq!(
            export_filename("Herbal  Shampoo Pro"),
            "Avatar_Immersion_Herbal_Shampoo_Pro.txt"
        );
        assert_eq!(export_filename("Solo"), "Avatar_Immersion_Solo.txt");
    }

    #[test]
    fn export_body_has_header_and_sections_in_order() {
        let body = export_body(&test_client("Herbal Shampoo"), &test_report(), "7/1/2025");
        assert!(body.starts_with("CUSTOMER AVATAR IMMERSION REPORT"));
        assert!(body.contains("Product: Herbal Shampoo"));
        assert!(body.contains("Date: 7/1/2025"));

        let sections = [
            "I. AVATAR PROFILE",
            "II. OFFER ANALYSIS",
            "III. MARKETING INSIGHTS",
            "IV. RECOMMENDATIONS",
            "V. USER TYPOLOGIES",
        ];
        let mut last = 0;
        for section in sections {
            let at = body.find(section).unwrap_or_else(|| panic!("missing {section}"));
            assert!(at > last, "{section} out of order");
            last = at;
        }

        assert!(body.contains("- hair loss"));
        assert!(body.contains("1. The Skeptical Saver"));
        assert!(body.contains("   CTA Style (ស្ទីល CTA): c"));
    }
}
