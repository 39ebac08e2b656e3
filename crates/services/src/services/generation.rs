//! Prompt construction and response handling for AI content generation.
//!
//! The prompt wording is a versioned contract: the model is steered entirely
//! by this text, and the JSON field names it is told to emit are the same
//! names the rest of the system reads. Change them and generation quietly
//! degrades, so edits here should be deliberate.

use db::models::client::Client;
use db::models::immersion::{ImmersionData, MAX_TYPOLOGIES, MIN_TYPOLOGIES, UserTypology};

use super::angles::MarketingAngle;
use super::gemini_api::{GeminiApiClient, GeminiApiError, extract_json};

/// Branding topic suggestions always come in batches of exactly five.
pub const BRANDING_TOPIC_COUNT: usize = 5;

/// Renders one of the prompt templates, performs the single model call, and
/// parses structured responses. Plain-text operations return the model's
/// output verbatim.
#[derive(Debug, Clone)]
pub struct ScriptGenerator {
    gemini: GeminiApiClient,
}

impl ScriptGenerator {
    pub fn new(gemini: GeminiApiClient) -> Self {
        Self { gemini }
    }

    pub fn from_env() -> Result<Self, GeminiApiError> {
        Ok(Self::new(GeminiApiClient::from_env()?))
    }

    /// Produce the full immersion research report for a client offer.
    ///
    /// Fails with [`GeminiApiError::Parse`] when the response is not the
    /// expected JSON object or carries an out-of-range typology count; the
    /// transport variants pass through unmodified. Never retried.
    pub async fn generate_immersion(
        &self,
        client: &Client,
    ) -> Result<ImmersionData, GeminiApiError> {
        let text = self.gemini.generate(&immersion_prompt(client)).await?;
        immersion_from_response(&text)
    }

    /// Soft-sell storytelling script. Returns the raw response text; no JSON
    /// parsing is attempted regardless of what the model sends back.
    pub async fn generate_content_script(
        &self,
        client: &Client,
        angle: &MarketingAngle,
        typology: Option<&UserTypology>,
        guidance: &str,
    ) -> Result<String, GeminiApiError> {
        self.gemini
            .generate(&content_script_prompt(client, angle, typology, guidance))
            .await
    }

    /// Direct-sale UGC script with a longer target duration. Raw text.
    pub async fn generate_sale_script(
        &self,
        client: &Client,
        angle: &MarketingAngle,
        typology: Option<&UserTypology>,
        guidance: &str,
    ) -> Result<String, GeminiApiError> {
        self.gemini
            .generate(&sale_script_prompt(client, angle, typology, guidance))
            .await
    }

    /// Exactly five short branding topic suggestions, or a parse error.
    /// Never a silently shorter or longer list.
    pub async fn generate_branding_topics(
        &self,
        client: &Client,
    ) -> Result<Vec<String>, GeminiApiError> {
        let text = self.gemini.generate(&branding_topics_prompt(client)).await?;
        topics_from_response(&text)
    }

    /// Listicle-style branding script for a free-text topic. Raw text.
    pub async fn generate_branding_script(
        &self,
        topic: &str,
        angle: Option<&MarketingAngle>,
    ) -> Result<String, GeminiApiError> {
        self.gemini
            .generate(&branding_script_prompt(topic, angle))
            .await
    }
}

pub(crate) fn immersion_from_response(text: &str) -> Result<ImmersionData, GeminiApiError> {
    let json = extract_json(text);
    let report: ImmersionData = serde_json::from_str(json)
        .map_err(|e| GeminiApiError::Parse(format!("immersion report: {e}")))?;

    let count = report.user_typologies.len();
    if !(MIN_TYPOLOGIES..=MAX_TYPOLOGIES).contains(&count) {
        return Err(GeminiApiError::Parse(format!(
            "expected {MIN_TYPOLOGIES}-{MAX_TYPOLOGIES} user typologies, got {count}"
        )));
    }
    Ok(report)
}

pub(crate) fn topics_from_response(text: &str) -> Result<Vec<String>, GeminiApiError> {
    let topics: Vec<String> = serde_json::from_str(extract_json(text))
        .map_err(|e| GeminiApiError::Parse(format!("branding topics: {e}")))?;

    if topics.len() != BRANDING_TOPIC_COUNT {
        return Err(GeminiApiError::Parse(format!(
            "expected exactly {BRANDING_TOPIC_COUNT} branding topics, got {}",
            topics.len()
        )));
    }
    Ok(topics)
}

fn immersion_prompt(client: &Client) -> String {
    let product_info = format!(
        "{} / {} / {}",
        client.product_name, client.country, client.price
    );
    let problems = client.problems().join(", ");

    let mut prompt = format!(
        r#"Act as a world-class Direct Response Marketing Strategist and Consumer Psychologist.

Transform the following raw product data (provided in Khmer) into a comprehensive "Offer, Avatar & User Typology Immersion Research" report.

IMPORTANT:
- The entire response MUST be returned as a valid JSON object.
- ALL string values in the JSON MUST be written in high-quality, professional Khmer language.
- Be realistic, behavior-based, and conversion-focused.
- Avoid generic or theoretical explanations.

RAW DATA (KHMER):
1. Product Name / Country / Price: {product_info}
2. Problems Solved: {problems}
3. Target Audience: {target_audience}
4. Warranty: {warranty}
5. Promotion: {promotion}
6. Differentiation: {differentiation}
7. Competitors: N/A

Your goal is to deeply understand how different types of users THINK, FEEL, and DECIDE to buy.
Focus on psychological drivers, objections, and emotional triggers—especially in short-form video and social media contexts.

Return a JSON object with the following structure (ALL CONTENT IN KHMER):

"#,
        target_audience = client.target_customers,
        warranty = client.warranty,
        promotion = client.promotion,
        differentiation = client.uniqueness,
    );
    prompt.push_str(IMMERSION_SCHEMA);
    prompt
}

/// The response schema the model is instructed to fill in. The repeated
/// typology stubs pin the expected list length; the field names are read
/// verbatim by the parser.
const IMMERSION_SCHEMA: &str = r#"{
  "avatarProfile": {
    "demographics": "string (age range, gender, location, income level, lifestyle context)",
    "psychographics": "string (beliefs, values, attitudes, habits, digital behavior)",
    "painPoints": ["string", "string", "string"],
    "desires": ["string", "string", "string"],
    "fears": ["string", "string", "string"],
    "objections": ["string", "string", "string"]
  },

  "userTypologies": [
    {
      "typologyName": "string (clear behavioral name)",
      "mindset": "string (how this user thinks when scrolling)",
      "corePain": "string (main problem or frustration)",
      "coreDesire": "string (main emotional or practical desire)",
      "buyingTrigger": "string (what finally pushes them to buy)",
      "bestContentAngle": "string (most effective marketing angle)",
      "ctaStyle": "string (best CTA tone: urgency, reassurance, soft, direct, etc.)"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    },
    {
      "typologyName": "string",
      "mindset": "string",
      "corePain": "string",
      "coreDesire": "string",
      "buyingTrigger": "string",
      "bestContentAngle": "string",
      "ctaStyle": "string"
    }
  ],

  "offerAnalysis": {
    "coreValue": "string",
    "emotionalTriggers": ["string", "string", "string"],
    "logicalBenefits": ["string", "string", "string"],
    "uniqueSellingPoints": ["string", "string", "string"],
    "guaranteeStrength": "string",
    "promotionImpact": "string"
  },

  "marketingInsights": {
    "buyingMotivation": "string",
    "decisionFactors": ["string", "string", "string"],
    "messagingAngle": "string",
    "callToAction": "string",
    "competitiveAdvantage": "string"
  },

  "recommendations": {
    "contentStrategy": "string",
    "channelStrategy": "string",
    "timingStrategy": "string",
    "followUpStrategy": "string"
  }
}"#;

fn typology_context(typology: Option<&UserTypology>, sale: bool) -> String {
    let Some(t) = typology else {
        return String::new();
    };
    let closing = if sale {
        "IMPORTANT: You MUST craft this sale script specifically for this typology. Use their exact mindset, pain point, and desire. Follow their preferred CTA style to maximize conversion."
    } else {
        "IMPORTANT: You MUST craft this script specifically for this typology. Use their exact mindset, pain point, and desire. Follow their preferred CTA style."
    };
    format!(
        r#"

TARGET USER TYPOLOGY (FOCUS ON THIS SPECIFIC AUDIENCE):
Typology Name: {}
Mindset: {}
Core Pain: {}
Core Desire: {}
Buying Trigger: {}
Best Content Angle: {}
CTA Style: {}

{closing}
"#,
        t.typology_name, t.mindset, t.core_pain, t.core_desire, t.buying_trigger,
        t.best_content_angle, t.cta_style,
    )
}

fn guidance_context(guidance: &str) -> String {
    if guidance.trim().is_empty() {
        return String::new();
    }
    format!(
        r#"

USER'S CONTENT GUIDANCE (MUST FOLLOW):
{guidance}

⚠️ CRITICAL: Respect the user's guidance above. If they want something included, include it naturally. If they want something excluded, do NOT mention it at all.
"#
    )
}

fn immersion_context(client: &Client) -> String {
    client
        .parsed_immersion()
        .and_then(|report| serde_json::to_string(&report).ok())
        .unwrap_or_else(|| "{}".to_string())
}

fn content_script_prompt(
    client: &Client,
    angle: &MarketingAngle,
    typology: Option<&UserTypology>,
    guidance: &str,
) -> String {
    let audience = typology.map_or("the viewer", |t| t.typology_name.as_str());
    let story_focus = typology.map_or_else(String::new, |t| {
        format!(
            "\n⚠️ FOCUS: The story MUST revolve around the typology's CORE PAIN: \"{}\"\nMake them feel seen, understood, and like you're inside their head.",
            t.core_pain
        )
    });
    let trigger_moment = typology.map_or_else(String::new, |t| {
        format!(
            "\n⚠️ TRIGGER MOMENT: Address their BUYING TRIGGER: \"{}\"\nThis is what pushes them over the edge—use it wisely.",
            t.buying_trigger
        )
    });

    format!(
        r#"Role:
You are a Khmer product or service content creator and social media storyteller who deeply understands Cambodian buying psychology, especially fear, peace of mind, convenience, modern lifestyle, social status, and daily-life stress. You think like a real Cambodian buyer, not a marketer.

Task:
Create a Khmer script for a Facebook Reel or TikTok (20–35 seconds) that feels real, raw, and authentic, like a casual video filmed during real daily life at home, borey, condo, shop, office, or outside, and later added with voice-over.
The goal is to softly sell [PRODUCT NAME: {product_name}] without sounding like selling at all.
The video must feel like sharing a real personal experience with a close friend.

Marketing Angle Context (VERY IMPORTANT):
Angle Title: {angle_title}
Angle Description: {angle_description}

You MUST follow the angle description when deciding:
1.  **Colloquial & Conversational:** Use spoken Khmer slang (ហាស, ហ្មង, អត់, ម៉ោ, ណ៎ា,បងៗ,បងប្អូនយើង, មិនចឹងអី). Do NOT use formal/news-reporter Khmer.
2.  **High Energy & Enthusiastic:** Sound like a best friend sharing a secret tip.
3.  **Persuasive:** Focus on speed of results (e.g., "in 3 days") and sensory details (texture, feeling).
4.  **Script angles** : {angle_title} ({angle_description})
{typology_block}{guidance_block}
Client/Product Data:
Product: {product_name}
Target Customers: {target_customers}
Problem Solved: {problems}
Uniqueness: {uniqueness}
Warranty/Guarantee: {warranty}
Promotion: {promotion}

Immersion Research Context:
{immersion_json}

STYLE & TONE:
• Storytelling flow (beginning → problem → moment → product/service → result)
• Relatable, slightly funny, real-life stress
• Natural spoken Khmer (street Khmer, not formal)
• Sounds spontaneous, human, slightly imperfect
• Short, punchy sentences
• Conversational rhythm with natural pauses
• Emotional, believable, and grounded

STRUCTURE (ANGLE-DRIVEN):

1. 🔥 HOOK (First 2–3 seconds)
Create the hook STRICTLY based on the selected marketing angle:
- focus on the result of {audience} may get after using product.

2. 💚 PRODUCT / SERVICE MOMENT (Soft Sell)
Introduce {product_name} naturally according to the angle.
No technical specs.
Mention only ONE simple benefit.
Focus on relief, ease, or peace of mind.

3. 🎬 STORY / PAIN POINT
Develop the story according to the angle logic.{story_focus}
Stay natural and conversational.
Use real Cambodian habits, stress, or situations.
Light humor or exaggeration is allowed.


4. 🤔 DOUBT → TURNING POINT → MICRO PROOF
Show hesitation first (price, trust, complexity, fear).{trigger_moment}
Flip softly using one believable moment:
• First-time use
• Family reaction
• Daily-life convenience
• Feeling calmer or more confident

5. A strong recommendation to comment or share or buy now (soft CTA, not hard selling)
IMPORTANT RULES:
.Hook->Product/Service Momoment
• Write fully in Khmer language only
• No emojis, no hashtags, no explanations
• No obvious sales language
• No long sentences
• Must sound like real voice-over (filmed first, scripted later)
• Must feel filmed first, scripted later
• Avoid technical specs and over-claiming

Final Output:
Generate ONE high-retention Khmer Reel (20-30s) or TikTok script that strictly follows the selected marketing angle and feels real, human, and trustworthy.
"#,
        product_name = client.product_name,
        angle_title = angle.title,
        angle_description = angle.description,
        typology_block = typology_context(typology, false),
        guidance_block = guidance_context(guidance),
        target_customers = client.target_customers,
        problems = client.problems().join(", "),
        uniqueness = client.uniqueness,
        warranty = client.warranty,
        promotion = client.promotion,
        immersion_json = immersion_context(client),
        audience = audience,
        story_focus = story_focus,
        trigger_moment = trigger_moment,
    )
}

fn sale_script_prompt(
    client: &Client,
    angle: &MarketingAngle,
    typology: Option<&UserTypology>,
    guidance: &str,
) -> String {
    let audience = typology.map_or("the viewer", |t| t.typology_name.as_str());
    let desire_position = typology.map_or_else(String::new, |t| {
        format!(
            "\n  ⚠️ Position as the answer to their core desire: \"{}\"",
            t.core_desire
        )
    });
    let trigger_line = typology.map_or_else(String::new, |t| {
        format!(
            "\n  ⚠️ Trigger their buying decision with: \"{}\"",
            t.buying_trigger
        )
    });

    format!(
        r#"
ROLE:
Act as an expert Khmer Content Creator and Copywriter for TikTok and Facebook Reels. You specialize in "User Generated Content" (UGC) scripts that go viral in Cambodia.
TASK:
Create ONE viral video script (20-30 seconds) designed to hook viewers instantly and drive sales through "friend-to-friend" persuasion.
INPUT DATA:
Product Name: {product_name}
Target Problems: {problems}
Key Features/Origin: {uniqueness}
Promise/Guarantee: {warranty}
Current Promotion: {promotion}

Your writing style must be:
1.  **Colloquial & Conversational:** Use spoken Khmer slang (ហាស, មែនទែន, ហ្មង, អត់, ម៉ោ, ណ៎ា,បងៗ,បងប្អូនយើង, មិនចឹងអី). Do NOT use formal/news-reporter Khmer.
2.  **High Energy & Enthusiastic:** Sound like a best friend sharing a secret tip.
3.  **Persuasive:** Focus on speed of results (e.g., "in 3 days") and sensory details (texture, feeling).
4. Script angles : {angle_title} ({angle_description})
{typology_block}{guidance_block}
You will generate a 40-55 second video script following this structure:
* **Hook:** Create the hook STRICTLY based on the selected marketing angle:
- focus on the result of {audience} may get after using product.
* **Solution:** Introduce the product{desire_position}. Mention its texture, color, or origin (e.g., Korean, Natural).
* **Agitation:** Describe the pain point vividly (3 second only)
* **Promise/Proof:** How fast does it work? How does it feel?{trigger_line}
* **CTA:** A strong recommendation to comment or share or buy now

FINAL OUTPUT RULES:
• Write in Khmer language (Unicode) ONLY.
• Do NOT use emojis.
• Do NOT include timestamps or scene descriptions.
• Return ONLY the spoken dialogue text.
"#,
        product_name = client.product_name,
        problems = client.problems().join(", "),
        uniqueness = client.uniqueness,
        warranty = client.warranty,
        promotion = client.promotion,
        angle_title = angle.title,
        angle_description = angle.description,
        typology_block = typology_context(typology, true),
        guidance_block = guidance_context(guidance),
        audience = audience,
        desire_position = desire_position,
        trigger_line = trigger_line,
    )
}

fn branding_topics_prompt(client: &Client) -> String {
    format!(
        r#"
Based on the following product or industry information, generate 5 creative and engaging BRANDING video script topics in Khmer language for TikTok, Facebook Reels, or YouTube Shorts.

Content Purpose:
- Focus on education, advice, awareness, or useful insights related to the product, its usage, or the broader industry.
- The content should NOT feel like direct selling.
- The product can appear naturally as context, example, or experience — not as a hard promotion.

Tone & Style:
- Speak like a real Cambodian talking to a friend.
- Simple Khmer words, casual, emotional, and believable.
- Avoid textbook explanations and corporate marketing language.
- Sound helpful, honest, and relatable.

Content Angles to Consider:
- Common mistakes people make in this category
- Things sellers rarely tell customers
- Simple tips or habits that improve results
- Myths vs reality
- Advice you'd give to a close friend
- Before/after mindset or behavior change
- Industry truths that affect everyday people

Product Information:
- Product Name: {product_name}
- Country: {country}
- Price: {price}
- Target Customers: {target_customers}
- Problems Solved: {problems}
- Uniqueness: {uniqueness}
- Warranty: {warranty}
- Promotion: {promotion}

Each topic should be short (3-7 words in Khmer), engaging, and focused on different aspects like:
1. Product benefits
2. Customer pain points
3. Lifestyle transformation
4. Social proof/testimonials
5. Special promotions or features

Return ONLY a JSON array of 5 topic strings in Khmer. Example format:
["ប្រធានបទទី១", "ប្រធានបទទី២", "ប្រធានបទទី៣", "ប្រធានបទទី៤", "ប្រធានបទទី៥"]"#,
        product_name = client.product_name,
        country = client.country,
        price = client.price,
        target_customers = client.target_customers,
        problems = client.problems().join(", "),
        uniqueness = client.uniqueness,
        warranty = client.warranty,
        promotion = client.promotion,
    )
}

fn branding_script_prompt(topic: &str, angle: Option<&MarketingAngle>) -> String {
    let angle_context = angle.map_or_else(String::new, |a| {
        format!(
            r#"
Marketing Angle Context (VERY IMPORTANT):
Angle Title: {}
Angle Description: {}

You MUST follow the angle description when deciding:
• How the HOOK is written
• How the story is framed
• How the content is structured and presented
"#,
            a.title, a.description
        )
    });
    let opening_line = angle.map_or_else(String::new, |a| {
        format!(" (based on the {} angle)", a.title)
    });

    format!(
        r#"Please create a script for a 30-second short-form video (e.g., for TikTok/Reels/Shorts) in Khmer Language.

The video should follow a fast-paced, list-style format, highlighting three to five distinct points. Each benefit/tip should be introduced quickly and explained in 4-5 seconds max.

Topic: {topic}

{angle_context}

Format Requirements:
1. A powerful attention-grabbing opening line{opening_line}
2. First benefit/tip with brief explanation
3. Second benefit/tip with brief explanation
4. Third benefit/tip with brief explanation
5. (optional according to the topic ) Fourth benefit/tip with brief explanation
6. (optional according to the topic ) Fifth benefit/tip with brief explanation
7. Strong call-to-action

Make it energetic, direct, and use simple Khmer language that resonates with the target audience. Focus on the product's unique value proposition and how it solves customer problems.

Return ONLY the script text in Khmer, formatted with clear sections."#
    )
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::services::angles::find_content_angle;

    fn test_client() -> Client {
        Client {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            product_name: "Herbal Shampoo".to_string(),
            country: "Cambodia".to_string(),
            price: "$12".to_string(),
            status: Default::default(),
            problems: r#"["hair loss","dry scalp","dandruff"]"#.to_string(),
            target_customers: "women 25-40".to_string(),
            warranty: "money back in 7 days".to_string(),
            promotion: "buy 2 get 1".to_string(),
            uniqueness: "natural ingredients".to_string(),
            immersion_data: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn test_typology() -> UserTypology {
        UserTypology {
            typology_name: "The Skeptical Saver".to_string(),
            mindset: "scrolls fast, trusts slowly".to_string(),
            core_pain: "afraid of wasting money".to_string(),
            core_desire: "peace of mind".to_string(),
            buying_trigger: "a believable guarantee".to_string(),
            best_content_angle: "Objection Handling".to_string(),
            cta_style: "reassurance".to_string(),
        }
    }

    fn valid_report_json(typology_count: usize) -> String {
        let typology = r#"{
            "typologyName": "T", "mindset": "m", "corePain": "p",
            "coreDesire": "d", "buyingTrigger": "t",
            "bestContentAngle": "a", "ctaStyle": "c"
        }"#;
        let typologies = vec![typology; typology_count].join(",");
        format!(
            r#"{{
            "avatarProfile": {{
                "demographics": "d", "psychographics": "p",
                "painPoints": ["a"], "desires": ["b"], "fears": ["c"], "objections": ["d"]
            }},
            "userTypologies": [{typologies}],
            "offerAnalysis": {{
                "coreValue": "v", "emotionalTriggers": [], "logicalBenefits": [],
                "uniqueSellingPoints": [], "guaranteeStrength": "g", "promotionImpact": "i"
            }},
            "marketingInsights": {{
                "buyingMotivation": "b", "decisionFactors": [], "messagingAngle": "m",
                "callToAction": "c", "competitiveAdvantage": "a"
            }},
            "recommendations": {{
                "contentStrategy": "c", "channelStrategy": "h",
                "timingStrategy": "t", "followUpStrategy": "f"
            }}
        }}"#
        )
    }

    #[test]
    fn immersion_prompt_embeds_product_data_and_schema() {
        let prompt = immersion_prompt(&test_client());
        assert!(prompt.contains("Herbal Shampoo / Cambodia / $12"));
        assert!(prompt.contains("hair loss, dry scalp, dandruff"));
        assert!(prompt.contains("\"userTypologies\""));
        assert!(prompt.contains("\"buyingTrigger\""));
        assert!(prompt.contains("\"ctaStyle\""));
        assert!(prompt.contains("7. Competitors: N/A"));
    }

    #[test]
    fn immersion_response_parses_with_nine_typologies() {
        let fenced = format!("```json\n{}\n```", valid_report_json(9));
        let report = immersion_from_response(&fenced).unwrap();
        assert_eq!(report.user_typologies.len(), 9);
    }

    #[test]
    fn immersion_response_rejects_out_of_range_typology_counts() {
        assert!(matches!(
            immersion_from_response(&valid_report_json(8)),
            Err(GeminiApiError::Parse(_))
        ));
        assert!(matches!(
            immersion_from_response(&valid_report_json(13)),
            Err(GeminiApiError::Parse(_))
        ));
        // 12 is the inclusive upper bound.
        assert!(immersion_from_response(&valid_report_json(12)).is_ok());
    }

    #[test]
    fn immersion_response_rejects_schema_mismatch() {
        let err = immersion_from_response(r#"{"avatarProfile": {}}"#).unwrap_err();
        assert!(matches!(err, GeminiApiError::Parse(_)));
    }

    #[test]
    fn topics_parse_from_json_fenced_array() {
        let text = "```json\n[\"A\",\"B\",\"C\",\"D\",\"E\"]\n```";
        assert_eq!(
            topics_from_response(text).unwrap(),
            vec!["A", "B", "C", "D", "E"]
        );
    }

    #[test]
    fn topics_reject_wrong_counts() {
        assert!(matches!(
            topics_from_response(r#"["A","B","C"]"#),
            Err(GeminiApiError::Parse(_))
        ));
        assert!(matches!(
            topics_from_response(r#"["A","B","C","D","E","F"]"#),
            Err(GeminiApiError::Parse(_))
        ));
        assert!(matches!(
            topics_from_response("not json at all"),
            Err(GeminiApiError::Parse(_))
        ));
    }

    #[test]
    fn content_prompt_without_typology_keeps_angle_only_wording() {
        let client = test_client();
        let angle = find_content_angle("Curiosity").unwrap();
        let prompt = content_script_prompt(&client, &angle, None, "");
        assert!(prompt.contains("Angle Title: Curiosity"));
        assert!(!prompt.contains("TARGET USER TYPOLOGY"));
        assert!(!prompt.contains("USER'S CONTENT GUIDANCE"));
        assert!(prompt.contains("the result of the viewer may get"));
    }

    #[test]
    fn content_prompt_with_typology_reshapes_hook_and_turning_point() {
        let client = test_client();
        let angle = find_content_angle("Storytelling").unwrap();
        let typology = test_typology();
        let prompt = content_script_prompt(&client, &angle, Some(&typology), "");
        assert!(prompt.contains("TARGET USER TYPOLOGY"));
        assert!(prompt.contains("the result of The Skeptical Saver may get"));
        assert!(prompt.contains("CORE PAIN: \"afraid of wasting money\""));
        assert!(prompt.contains("BUYING TRIGGER: \"a believable guarantee\""));
    }

    #[test]
    fn guidance_block_appears_only_when_given() {
        let client = test_client();
        let angle = find_content_angle("Urgency").unwrap();
        let with = content_script_prompt(&client, &angle, None, "do not mention the price");
        assert!(with.contains("USER'S CONTENT GUIDANCE (MUST FOLLOW):"));
        assert!(with.contains("do not mention the price"));

        let without = content_script_prompt(&client, &angle, None, "   ");
        assert!(!without.contains("USER'S CONTENT GUIDANCE"));
    }

    #[test]
    fn sale_prompt_follows_sales_structure() {
        let client = test_client();
        let angle = find_content_angle("Scarcity").unwrap();
        let typology = test_typology();
        let prompt = sale_script_prompt(&client, &angle, Some(&typology), "");
        assert!(prompt.contains("* **Hook:**"));
        assert!(prompt.contains("* **Solution:**"));
        assert!(prompt.contains("* **Agitation:**"));
        assert!(prompt.contains("* **Promise/Proof:**"));
        assert!(prompt.contains("* **CTA:**"));
        assert!(prompt.contains("40-55 second"));
        assert!(prompt.contains("core desire: \"peace of mind\""));
    }

    #[test]
    fn branding_topics_prompt_lists_product_information() {
        let prompt = branding_topics_prompt(&test_client());
        assert!(prompt.contains("- Product Name: Herbal Shampoo"));
        assert!(prompt.contains("Return ONLY a JSON array of 5 topic strings in Khmer."));
    }

    #[test]
    fn branding_script_prompt_angle_changes_only_the_opening() {
        let angle = crate::services::angles::find_branding_angle("The Tutorial Angle").unwrap();
        let with = branding_script_prompt("topic", Some(&angle));
        assert!(with.contains("Marketing Angle Context (VERY IMPORTANT):"));
        assert!(with.contains("(based on the The Tutorial Angle angle)"));

        let without = branding_script_prompt("topic", None);
        assert!(!without.contains("Marketing Angle Context"));
        assert!(without.contains("A powerful attention-grabbing opening line\n"));
    }
}
