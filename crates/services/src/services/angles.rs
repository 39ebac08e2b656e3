//! Static catalogs of marketing angles used to frame generated scripts.
//!
//! Angles are reference data, not database rows: saved scripts point at them
//! by title, so renaming an angle orphans the historical grouping for scripts
//! saved under the old title.

use std::collections::HashMap;

use db::models::script::Script;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A named persuasion/structure strategy with the description that steers the
/// generation prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct MarketingAngle {
    pub title: String,
    pub description: String,
}

impl MarketingAngle {
    fn new(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
        }
    }
}

/// The fixed catalog of 31 content angles.
pub fn content_angles() -> Vec<MarketingAngle> {
    vec![
        MarketingAngle::new(
            "Problem–Solution",
            "Open with one very real daily problem Cambodians face and sit inside that stress moment so viewers immediately relate. Then naturally show how the product or service removed that pain and made daily life calmer. Best for: Cold audience, fast clarity, instant relevance.",
        ),
        MarketingAngle::new(
            "Curiosity",
            "Create an information gap by showing or saying something incomplete, strange, or unexpected. Make people pause because they feel confused or curious and want the answer. Best for: Strong hooks in the first 1–3 seconds.",
        ),
        MarketingAngle::new(
            "Price Anchoring",
            "Mention a more expensive, risky, or tiring alternative that Cambodians already know, then introduce your option so it feels smarter and more reasonable without saying cheap. Best for: Selling value without discounts.",
        ),
        MarketingAngle::new(
            "Promotion",
            "Casually bring up a limited deal, bonus, or special condition as if sharing a useful tip with a friend, not announcing a sale. Best for: Short campaigns and promo periods.",
        ),
        MarketingAngle::new(
            "Urgency",
            "Create urgency by showing what people might lose or miss if they wait, using time, availability, or personal regret instead of pressure. Best for: Moving hesitant buyers.",
        ),
        MarketingAngle::new(
            "Feedback",
            "Use real comments, inbox messages, or reactions from Cambodian customers and respond naturally like chatting back. Best for: Trust, relatability, and social proof.",
        ),
        MarketingAngle::new(
            "Before–After",
            "Clearly show the emotional or lifestyle difference before and after using the product or service, focusing on relief and confidence. Best for: Skincare, service results, lifestyle change.",
        ),
        MarketingAngle::new(
            "Person A vs Person B",
            "Compare two people facing the same situation but making different choices, leading to different outcomes. Let viewers judge for themselves. Best for: Behavior change content.",
        ),
        MarketingAngle::new(
            "Pattern Interruption",
            "Start with something visually or verbally unexpected that doesn’t feel like an ad, forcing people to stop scrolling. Best for: High-competition niches.",
        ),
        MarketingAngle::new(
            "Reply to Comment",
            "Turn a real comment or doubt into content and answer it honestly and calmly, like talking to one person. Best for: Engagement and credibility.",
        ),
        MarketingAngle::new(
            "Customer Testimonial",
            "Let a real customer share their experience in their own words, even if imperfect. Authenticity matters more than polish. Best for: Warm audience conversion.",
        ),
        MarketingAngle::new(
            "Storytelling",
            "Tell a relatable real-life story with a clear struggle, turning point, and outcome where the product fits naturally into daily life. Best for: Emotional connection.",
        ),
        MarketingAngle::new(
            "Relatable Struggle",
            "Talk about a common frustration Cambodians experience but rarely say out loud, making viewers feel seen and understood. Best for: Emotional resonance.",
        ),
        MarketingAngle::new(
            "Breaking False Beliefs",
            "Call out a common wrong belief stopping people from buying and gently replace it with real-life experience. Best for: Unlocking hesitation.",
        ),
        MarketingAngle::new(
            "Speed & Ease",
            "Show how quick, simple, or effortless it is to get results, reducing fear of complexity. Best for: Busy or lazy buyers.",
        ),
        MarketingAngle::new(
            "Make It a Method",
            "Turn your solution into a simple named routine or method that feels easy to remember and repeat. Best for: Authority and memorability.",
        ),
        MarketingAngle::new(
            "Compounding Consequences",
            "Show how ignoring the problem slowly creates bigger stress, cost, or regret over time, without scaring people. Best for: Soft fear motivation.",
        ),
        MarketingAngle::new(
            "The Great Paradox",
            "Say something that sounds opposite or wrong at first, then explain why it’s actually true in real life. Best for: Standing out and rethinking.",
        ),
        MarketingAngle::new(
            "Compare the Alternatives",
            "Compare your solution with common options Cambodians already use and show why those options are tiring, risky, or inconvenient. Best for: Decision-stage buyers.",
        ),
        MarketingAngle::new(
            "Mistake Angle",
            "Highlight common mistakes people make before or after buying, speaking from experience, not blame. Best for: Education and positioning.",
        ),
        MarketingAngle::new(
            "Myth vs Reality",
            "Expose a popular myth and replace it with a grounded, real-life truth that viewers can accept. Best for: Skeptical audiences.",
        ),
        MarketingAngle::new(
            "Behind the Scenes (BTS)",
            "Show the real process, daily work, testing, or packing to prove you’re real and transparent. Best for: Humanizing your brand.",
        ),
        MarketingAngle::new(
            "Authority / Credibility",
            "Show why people should trust you through experience, results, or repetition, not titles or claims. Best for: High-trust offers.",
        ),
        MarketingAngle::new(
            "Social Proof Stack",
            "Stack multiple small proofs like comments, results, users, or reactions in one video to build confidence quickly. Best for: Strong conversion.",
        ),
        MarketingAngle::new(
            "Objection Handling",
            "Address common fears like price, trust, or difficulty directly and calmly, then remove them one by one. Best for: Closing buyers.",
        ),
        MarketingAngle::new(
            "Use Case / Scenario",
            "Show exactly who this is for and when it’s used in daily Cambodian life so viewers self-identify fast. Best for: Audience clarity.",
        ),
        MarketingAngle::new(
            "POV Angle",
            "Film from a first-person point of view so the viewer feels like they are living the moment themselves. Best for: Reels and TikTok virality.",
        ),
        MarketingAngle::new(
            "Transformation Journey",
            "Show gradual improvement over time instead of instant results to feel realistic and trustworthy. Best for: Long-term trust.",
        ),
        MarketingAngle::new(
            "Scarcity",
            "Limit quantity, time, or access in a calm way so it feels exclusive, not pushy. Best for: Action-driven content.",
        ),
        MarketingAngle::new(
            "Founder / Personal Story",
            "Share why you started, what problem you personally experienced, and why it mattered. Best for: Brand loyalty.",
        ),
        MarketingAngle::new(
            "Call-Out / Direct Address",
            "Speak directly to a very specific type of person so they feel personally called out. Best for: High relevance and stopping scroll.",
        ),
    ]
}

/// The fixed catalog of 7 viral angles used for branding content.
pub fn branding_angles() -> Vec<MarketingAngle> {
    vec![
        MarketingAngle::new(
            "The Tutorial Angle",
            "Showing a step-by-step process, framework, or acronym",
        ),
        MarketingAngle::new(
            "The Comparison Angle",
            "Compare different actions, methods, or products and their results",
        ),
        MarketingAngle::new(
            "The Myth Bust / Common Mistake Angle",
            "Share myths or mistakes in your niche and correct them",
        ),
        MarketingAngle::new(
            "The Do's vs. Don'ts Angle",
            "Show the right and wrong ways to do something",
        ),
        MarketingAngle::new(
            "The Tip / Hack Angle",
            "Show a one-off niche tip, lesson, or hack",
        ),
        MarketingAngle::new(
            "The Transformation Angle",
            "Show a client or personal before-and-after result",
        ),
        MarketingAngle::new(
            "The Challenge Angle",
            "Complete a niche-related challenge",
        ),
    ]
}

pub fn find_content_angle(title: &str) -> Option<MarketingAngle> {
    content_angles().into_iter().find(|a| a.title == title)
}

pub fn find_branding_angle(title: &str) -> Option<MarketingAngle> {
    branding_angles().into_iter().find(|a| a.title == title)
}

/// How many saved scripts each angle title has.
pub fn script_counts_by_angle(scripts: &[Script]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for script in scripts {
        *counts.entry(script.angle_title.clone()).or_insert(0) += 1;
    }
    counts
}

/// The content catalog reordered so the most-used angles come first; angles
/// with equal usage keep their catalog order.
pub fn angles_by_usage(scripts: &[Script]) -> Vec<MarketingAngle> {
    let counts = script_counts_by_angle(scripts);
    let mut angles = content_angles();
    angles.sort_by_key(|a| std::cmp::Reverse(counts.get(&a.title).copied().unwrap_or(0)));
    angles
}
