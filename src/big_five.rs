//! Big Five trait breakdown analyzer
//!
//! The one generator that actually merges generative output: the baseline
//! trait mapping for the type code is copied, the LLM response is parsed as
//! a trait -> (score, label, descriptors) mapping, and matching traits are
//! overlaid onto the copy. Parse or call failure keeps the baseline intact.

use crate::context::{extract_context, ConversationHistory, DEFAULT_MAX_CONTEXT_LENGTH};
use crate::error::InsightError;
use crate::generative::GenerativeBackend;
use crate::logging;
use crate::openai::OpenAiClient;
use crate::prompts::{PromptTemplate, INSIGHT_SLOTS, TRAIT_ANALYSIS_TEMPLATE};
use crate::DEFAULT_TYPE_KEY;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The five traits, in report order
pub const TRAIT_ORDER: [&str; 5] = [
    "Extraversion",
    "Openness",
    "Conscientiousness",
    "Agreeableness",
    "Neuroticism",
];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TraitScore {
    pub score: u32,
    pub label: String,
    pub descriptors: String,
}

/// A full trait mapping for one subject
pub type TraitBreakdown = HashMap<String, TraitScore>;

fn triple(score: u32, label: &str, descriptors: &str) -> TraitScore {
    TraitScore {
        score,
        label: label.to_string(),
        descriptors: descriptors.to_string(),
    }
}

/// MBTI to Big Five trait tendencies, with a DEFAULT fallback
static TRAIT_BASELINES: Lazy<HashMap<&'static str, TraitBreakdown>> = Lazy::new(|| {
    let mut table = HashMap::new();

    table.insert(
        "ISTJ",
        HashMap::from([
            ("Extraversion".to_string(), triple(30, "Introverted", "Reserved, Focused, Independent")),
            ("Openness".to_string(), triple(40, "Practical", "Conventional, Detail-oriented, Systematic")),
            ("Conscientiousness".to_string(), triple(95, "Highly Conscientious", "Organized, Disciplined, Meticulous")),
            ("Agreeableness".to_string(), triple(70, "Cooperative", "Supportive, Loyal, Considerate")),
            ("Neuroticism".to_string(), triple(40, "Stable", "Calm, Composed, Resilient")),
        ]),
    );

    table.insert(
        "INTJ",
        HashMap::from([
            ("Extraversion".to_string(), triple(35, "Introverted", "Strategic, Analytical, Independent")),
            ("Openness".to_string(), triple(90, "Highly Open", "Innovative, Intellectual, Curious")),
            ("Conscientiousness".to_string(), triple(85, "Very Conscientious", "Precise, Goal-oriented, Systematic")),
            ("Agreeableness".to_string(), triple(50, "Balanced", "Critical, Direct, Objective")),
            ("Neuroticism".to_string(), triple(45, "Moderately Stable", "Controlled, Introspective, Measured")),
        ]),
    );

    table.insert(
        DEFAULT_TYPE_KEY,
        HashMap::from([
            ("Extraversion".to_string(), triple(50, "Moderate", "Balanced, Adaptable, Flexible")),
            ("Openness".to_string(), triple(60, "Moderately Open", "Curious, Creative, Receptive")),
            ("Conscientiousness".to_string(), triple(65, "Somewhat Conscientious", "Responsible, Organized, Reliable")),
            ("Agreeableness".to_string(), triple(60, "Moderately Agreeable", "Kind, Cooperative, Supportive")),
            ("Neuroticism".to_string(), triple(50, "Average", "Emotionally Balanced, Adaptable, Resilient")),
        ]),
    );

    table
});

/// Construction-time invariant: DEFAULT exists and every mapping carries all
/// five traits with populated fields.
fn validate_baselines() -> Result<(), InsightError> {
    if !TRAIT_BASELINES.contains_key(DEFAULT_TYPE_KEY) {
        return Err(InsightError::InvalidBaseline(
            "trait table has no DEFAULT mapping".to_string(),
        ));
    }

    for (code, traits) in TRAIT_BASELINES.iter() {
        for name in TRAIT_ORDER {
            match traits.get(name) {
                Some(t) if !t.label.is_empty() && !t.descriptors.is_empty() => {}
                _ => {
                    return Err(InsightError::InvalidBaseline(format!(
                        "trait mapping for {} is missing {}",
                        code, name
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Resolve to a fresh copy: the returned mapping is overlaid in place and
/// must never alias the shared static table.
fn resolve(type_code: &str) -> TraitBreakdown {
    TRAIT_BASELINES
        .get(type_code)
        .or_else(|| TRAIT_BASELINES.get(DEFAULT_TYPE_KEY))
        .cloned()
        .expect("trait baseline table validated at construction")
}

/// A trait value as it may appear in model output: either a JSON object or a
/// `[score, label, descriptors]` tuple (the original data shape).
#[derive(Deserialize)]
#[serde(untagged)]
enum OverlayValue {
    Tuple(u32, String, String),
    Object {
        score: u32,
        label: String,
        descriptors: String,
    },
}

impl From<OverlayValue> for TraitScore {
    fn from(value: OverlayValue) -> Self {
        match value {
            OverlayValue::Tuple(score, label, descriptors) => TraitScore {
                score,
                label,
                descriptors,
            },
            OverlayValue::Object {
                score,
                label,
                descriptors,
            } => TraitScore {
                score,
                label,
                descriptors,
            },
        }
    }
}

/// Parse model output into a partial trait mapping. Malformed output yields
/// an empty overlay; there is no partial acceptance.
fn parse_overlay(response: &str) -> HashMap<String, TraitScore> {
    let cleaned = response
        .trim()
        .trim_start_matches("```json")
        .trim_end_matches("```")
        .trim();

    match serde_json::from_str::<HashMap<String, OverlayValue>>(cleaned) {
        Ok(parsed) => parsed
            .into_iter()
            .map(|(name, value)| (name, value.into()))
            .collect(),
        Err(_) => HashMap::new(),
    }
}

pub struct PersonalityTraitsAnalyzer {
    backend: Box<dyn GenerativeBackend>,
    template: PromptTemplate,
}

impl PersonalityTraitsAnalyzer {
    /// Construct with the OpenAI backend, reading OPENAI_API_KEY from the
    /// environment. A missing key fails construction, not requests.
    pub fn from_env() -> Result<Self, InsightError> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| InsightError::MissingApiKey)?;
        Self::new(Box::new(OpenAiClient::new(&api_key)))
    }

    pub fn new(backend: Box<dyn GenerativeBackend>) -> Result<Self, InsightError> {
        validate_baselines()?;
        let template = PromptTemplate::new(TRAIT_ANALYSIS_TEMPLATE, INSIGHT_SLOTS)?;

        Ok(Self { backend, template })
    }

    /// Analyze personality traits for a type code.
    ///
    /// Always succeeds: on any generative or parse fault the baseline
    /// mapping is returned unchanged.
    pub async fn analyze(
        &self,
        type_code: &str,
        history: &dyn ConversationHistory,
        max_context_length: Option<usize>,
    ) -> TraitBreakdown {
        let max_len = max_context_length.unwrap_or(DEFAULT_MAX_CONTEXT_LENGTH);
        let mut traits = resolve(type_code);
        let context = extract_context(history, max_len);

        logging::log_insight(Some(type_code), "Analyzing personality traits");

        let prompt = match self.template.fill(&[
            ("mbti_type", type_code),
            ("conversation_context", &context),
        ]) {
            Ok(prompt) => prompt,
            Err(e) => {
                logging::log_error(Some(type_code), &format!("Trait prompt fill failed: {}", e));
                return traits;
            }
        };

        match self.backend.complete(&prompt).await {
            Ok(response) => {
                let overlay = parse_overlay(&response);

                if overlay.is_empty() {
                    logging::log_generative(
                        Some(type_code),
                        "Trait response not parsable, keeping baseline",
                    );
                } else {
                    let mut replaced = 0;
                    for (name, score) in overlay {
                        // Only traits known to the baseline are overlaid
                        if traits.contains_key(&name) {
                            traits.insert(name, score);
                            replaced += 1;
                        }
                    }
                    logging::log_generative(
                        Some(type_code),
                        &format!("Overlaid {} trait(s) from generative response", replaced),
                    );
                }
            }
            Err(e) => {
                logging::log_error(
                    Some(type_code),
                    &format!("Trait generation failed: {}", e),
                );
            }
        }

        traits
    }

    /// Format a trait breakdown into display text, in fixed trait order.
    pub fn format(&self, traits: &TraitBreakdown) -> String {
        TRAIT_ORDER
            .iter()
            .filter_map(|name| traits.get(*name))
            .map(|t| format!("**{}%**\n**{}**\n**{}**", t.score, t.label, t.descriptors))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InMemoryHistory;
    use crate::generative::test_backends::{Canned, Unavailable};

    fn analyzer_without_backend() -> PersonalityTraitsAnalyzer {
        PersonalityTraitsAnalyzer::new(Box::new(Unavailable)).unwrap()
    }

    fn analyzer_with(response: &str) -> PersonalityTraitsAnalyzer {
        PersonalityTraitsAnalyzer::new(Box::new(Canned(response.to_string()))).unwrap()
    }

    #[tokio::test]
    async fn test_known_type_returns_baseline_when_backend_unavailable() {
        let analyzer = analyzer_without_backend();
        let history = InMemoryHistory::new();

        let traits = analyzer.analyze("ISTJ", &history, None).await;

        assert_eq!(traits, TRAIT_BASELINES["ISTJ"]);
    }

    #[tokio::test]
    async fn test_unknown_type_resolves_to_default() {
        let analyzer = analyzer_without_backend();
        let history = InMemoryHistory::new();

        let traits = analyzer.analyze("QQQQ", &history, None).await;

        assert_eq!(traits, TRAIT_BASELINES[DEFAULT_TYPE_KEY]);
    }

    #[tokio::test]
    async fn test_overlay_replaces_matching_traits_and_ignores_unknown() {
        let analyzer = analyzer_with(
            r#"{"Openness": {"score": 85, "label": "High", "descriptors": "y"},
                "Unknown": [10, "z", "w"]}"#,
        );
        let history = InMemoryHistory::new();

        let traits = analyzer.analyze("INTJ", &history, None).await;

        assert_eq!(traits["Openness"], triple(85, "High", "y"));
        assert!(!traits.contains_key("Unknown"));
        // Traits absent from the overlay keep their baseline values
        assert_eq!(traits["Extraversion"], TRAIT_BASELINES["INTJ"]["Extraversion"]);
        assert_eq!(traits.len(), 5);
    }

    #[tokio::test]
    async fn test_overlay_accepts_tuple_form() {
        let analyzer = analyzer_with(r#"{"Neuroticism": [20, "Very Stable", "Grounded, Calm, Steady"]}"#);
        let history = InMemoryHistory::new();

        let traits = analyzer.analyze("ISTJ", &history, None).await;

        assert_eq!(
            traits["Neuroticism"],
            triple(20, "Very Stable", "Grounded, Calm, Steady")
        );
    }

    #[tokio::test]
    async fn test_overlay_accepts_fenced_json() {
        let analyzer = analyzer_with(
            "```json\n{\"Openness\": {\"score\": 70, \"label\": \"Open\", \"descriptors\": \"Curious\"}}\n```",
        );
        let history = InMemoryHistory::new();

        let traits = analyzer.analyze("ISTJ", &history, None).await;

        assert_eq!(traits["Openness"], triple(70, "Open", "Curious"));
    }

    #[tokio::test]
    async fn test_unparsable_response_leaves_baseline_unchanged() {
        let analyzer = analyzer_with("The user seems quite open and agreeable overall.");
        let history = InMemoryHistory::new();

        let traits = analyzer.analyze("INTJ", &history, None).await;

        assert_eq!(traits, TRAIT_BASELINES["INTJ"]);
    }

    #[tokio::test]
    async fn test_overlay_never_mutates_shared_default_table() {
        let analyzer = analyzer_with(r#"{"Openness": [99, "Mutated", "Should not stick"]}"#);
        let history = InMemoryHistory::new();

        // Overlay onto the DEFAULT record via an unknown type code
        let overlaid = analyzer.analyze("QQQQ", &history, None).await;
        assert_eq!(overlaid["Openness"].score, 99);

        // A later request with no overlay must see the pristine DEFAULT
        let fallback = analyzer_without_backend();
        let traits = fallback.analyze("QQQQ", &history, None).await;
        assert_eq!(traits, TRAIT_BASELINES[DEFAULT_TYPE_KEY]);
        assert_eq!(traits["Openness"].score, 60);
    }

    #[test]
    fn test_format_uses_fixed_trait_order() {
        let analyzer = analyzer_without_backend();
        let traits = TRAIT_BASELINES["ISTJ"].clone();

        let output = analyzer.format(&traits);

        let blocks: Vec<&str> = output.split("\n\n").collect();
        assert_eq!(blocks.len(), 5);
        assert_eq!(blocks[0], "**30%**\n**Introverted**\n**Reserved, Focused, Independent**");
        assert_eq!(blocks[4], "**40%**\n**Stable**\n**Calm, Composed, Resilient**");
    }

    #[test]
    fn test_baseline_table_is_shape_complete() {
        assert!(validate_baselines().is_ok());
    }
}
