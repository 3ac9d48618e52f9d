//! Career insights generator
//!
//! Resolves a static baseline record for the requested type code (DEFAULT on
//! miss), makes one best-effort generative call seeded with conversation
//! context, and returns the baseline. The generative response is logged and
//! discarded - baseline content is what ships for this report kind.

use crate::context::{extract_context, ConversationHistory, DEFAULT_MAX_CONTEXT_LENGTH};
use crate::error::InsightError;
use crate::generative::GenerativeBackend;
use crate::logging;
use crate::openai::OpenAiClient;
use crate::prompts::{PromptTemplate, CAREER_INSIGHTS_TEMPLATE, INSIGHT_SLOTS};
use crate::DEFAULT_TYPE_KEY;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CareerInsight {
    pub workplace: String,
    pub perfect_career: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub ideal_careers: Vec<String>,
}

fn record(
    workplace: &str,
    perfect_career: &str,
    strengths: &[&str],
    weaknesses: &[&str],
    ideal_careers: &[&str],
) -> CareerInsight {
    CareerInsight {
        workplace: workplace.to_string(),
        perfect_career: perfect_career.to_string(),
        strengths: strengths.iter().map(|s| s.to_string()).collect(),
        weaknesses: weaknesses.iter().map(|s| s.to_string()).collect(),
        ideal_careers: ideal_careers.iter().map(|s| s.to_string()).collect(),
    }
}

/// Predefined career insights per MBTI type, with a DEFAULT fallback
static CAREER_BASELINES: Lazy<HashMap<&'static str, CareerInsight>> = Lazy::new(|| {
    let mut table = HashMap::new();

    table.insert(
        "INTJ",
        record(
            "In the world of careers, you thrive on cognitive challenges but resist structured physical activity, suggesting you seek mental rather than physical flow states. Creative problem-solving energizes you, whether it's cracking code or capturing moments through a lens.",
            "Those who work like you need constant intellectual stimulation and tend to dive deep into self-directed learning after hours. While you accept practical compromises for stability, you'll only find true fulfillment in roles that let you push boundaries and explore emerging technologies.",
            &["Analytical", "Determined", "Curious", "Focused", "Strategic", "Innovative"],
            &["Perfectionist", "Restless", "Stubborn", "Hesitant", "Overly Critical", "Difficulty Collaborating"],
            &["Software Architect", "Research Scientist", "Strategic Consultant", "Technology Strategist", "Innovation Manager"],
        ),
    );

    table.insert(
        "INFJ",
        record(
            "You excel in environments that allow for deep, meaningful work with a clear purpose. Your intuitive nature helps you see complex systems and human dynamics that others might miss.",
            "Your ideal career combines intellectual depth with human impact. You thrive in roles that allow you to create positive change, whether through counseling, writing, design, or strategic planning.",
            &["Empathetic", "Insightful", "Visionary", "Passionate", "Creative", "Purpose-Driven"],
            &["Idealistic", "Sensitive", "Burnout-Prone", "Conflict-Avoidant", "Perfectionistic", "Overwhelmed"],
            &["Counselor", "Non-Profit Leader", "Social Worker", "Creative Director", "Educational Consultant"],
        ),
    );

    table.insert(
        DEFAULT_TYPE_KEY,
        record(
            "You approach professional environments with a unique blend of your personality traits, seeking roles that align with your core values and personal growth.",
            "Your career path is characterized by continuous learning, adaptability, and a drive to make meaningful contributions in your chosen field.",
            &["Adaptable", "Passionate", "Committed", "Innovative", "Thoughtful"],
            &["Complex", "Challenging", "Evolving", "Introspective", "Nuanced"],
            &["Versatile Professional", "Adaptive Specialist", "Innovative Contributor"],
        ),
    );

    table
});

/// Construction-time invariant: DEFAULT exists and every record is
/// shape-complete, so per-request lookups can never fail.
fn validate_baselines() -> Result<(), InsightError> {
    if !CAREER_BASELINES.contains_key(DEFAULT_TYPE_KEY) {
        return Err(InsightError::InvalidBaseline(
            "career table has no DEFAULT record".to_string(),
        ));
    }

    for (code, insight) in CAREER_BASELINES.iter() {
        if insight.workplace.is_empty()
            || insight.perfect_career.is_empty()
            || insight.strengths.is_empty()
            || insight.weaknesses.is_empty()
            || insight.ideal_careers.is_empty()
        {
            return Err(InsightError::InvalidBaseline(format!(
                "career record for {} is missing fields",
                code
            )));
        }
    }

    Ok(())
}

fn resolve(type_code: &str) -> CareerInsight {
    CAREER_BASELINES
        .get(type_code)
        .or_else(|| CAREER_BASELINES.get(DEFAULT_TYPE_KEY))
        .cloned()
        .expect("career baseline table validated at construction")
}

pub struct CareerInsightsGenerator {
    backend: Box<dyn GenerativeBackend>,
    template: PromptTemplate,
}

impl CareerInsightsGenerator {
    /// Construct with the OpenAI backend, reading OPENAI_API_KEY from the
    /// environment. A missing key fails construction, not requests.
    pub fn from_env() -> Result<Self, InsightError> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| InsightError::MissingApiKey)?;
        Self::new(Box::new(OpenAiClient::new(&api_key)))
    }

    pub fn new(backend: Box<dyn GenerativeBackend>) -> Result<Self, InsightError> {
        validate_baselines()?;
        let template = PromptTemplate::new(CAREER_INSIGHTS_TEMPLATE, INSIGHT_SLOTS)?;

        Ok(Self { backend, template })
    }

    /// Generate career insights for a type code.
    ///
    /// Always succeeds: baseline lookup falls through to DEFAULT, and any
    /// fault in the context fetch or generative call is recovered locally.
    pub async fn generate(
        &self,
        type_code: &str,
        history: &dyn ConversationHistory,
        max_context_length: Option<usize>,
    ) -> CareerInsight {
        let max_len = max_context_length.unwrap_or(DEFAULT_MAX_CONTEXT_LENGTH);
        let insights = resolve(type_code);
        let context = extract_context(history, max_len);

        logging::log_insight(Some(type_code), "Generating career insights");

        // Best-effort personalization. The response is logged but not merged
        // into the result; this is the extension point for merging later.
        match self.template.fill(&[
            ("mbti_type", type_code),
            ("conversation_context", &context),
        ]) {
            Ok(prompt) => match self.backend.complete(&prompt).await {
                Ok(response) => {
                    logging::log_generative(
                        Some(type_code),
                        &format!(
                            "Career response received ({} chars), discarded in favor of baseline",
                            response.len()
                        ),
                    );
                }
                Err(e) => {
                    logging::log_error(
                        Some(type_code),
                        &format!("Career insights generation failed: {}", e),
                    );
                }
            },
            Err(e) => {
                logging::log_error(Some(type_code), &format!("Career prompt fill failed: {}", e));
            }
        }

        insights
    }

    /// Format career insights into display text.
    pub fn format(&self, insights: &CareerInsight) -> String {
        let mut output = String::from("**Career**\n");
        output.push_str("**Your workplace**\n");
        output.push_str(&format!("{}\n\n", insights.workplace));

        output.push_str("**Your perfect career**\n");
        output.push_str(&format!("{}\n\n", insights.perfect_career));

        output.push_str("**Strengths and weaknesses**\n");

        for strength in &insights.strengths {
            output.push_str(&format!("**{}**\n", strength));
        }

        for weakness in &insights.weaknesses {
            output.push_str(&format!("**{}**\n", weakness));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::InMemoryHistory;
    use crate::generative::test_backends::{Canned, Unavailable};

    fn generator_without_backend() -> CareerInsightsGenerator {
        CareerInsightsGenerator::new(Box::new(Unavailable)).unwrap()
    }

    #[tokio::test]
    async fn test_known_type_returns_baseline_when_backend_unavailable() {
        let generator = generator_without_backend();
        let history = InMemoryHistory::new();

        let insights = generator.generate("INTJ", &history, None).await;

        assert_eq!(insights, CAREER_BASELINES["INTJ"]);
    }

    #[tokio::test]
    async fn test_unknown_type_resolves_to_default() {
        let generator = generator_without_backend();
        let history = InMemoryHistory::new();

        let insights = generator.generate("XXXX", &history, None).await;

        assert_eq!(insights, CAREER_BASELINES[DEFAULT_TYPE_KEY]);
    }

    #[tokio::test]
    async fn test_successful_response_is_discarded() {
        let generator = CareerInsightsGenerator::new(Box::new(Canned(
            "{\"workplace\": \"somewhere else entirely\"}".to_string(),
        )))
        .unwrap();
        let mut history = InMemoryHistory::new();
        history.push("user", "I enjoy solving hard problems");

        let insights = generator.generate("INTJ", &history, None).await;

        assert_eq!(insights, CAREER_BASELINES["INTJ"]);
    }

    #[test]
    fn test_format_renders_strengths_before_weaknesses() {
        let generator = generator_without_backend();
        let insights = CAREER_BASELINES["INTJ"].clone();

        let output = generator.format(&insights);

        assert!(output.starts_with("**Career**\n"));
        assert!(output.contains("**Your workplace**"));
        assert!(output.contains("**Your perfect career**"));

        let strengths_pos = output.find("**Analytical**").unwrap();
        let weaknesses_pos = output.find("**Perfectionist**").unwrap();
        assert!(strengths_pos < weaknesses_pos);

        // One emphasized label per line, list order preserved
        assert!(output.contains("**Analytical**\n**Determined**\n**Curious**\n"));
    }

    #[test]
    fn test_baseline_table_is_shape_complete() {
        assert!(validate_baselines().is_ok());
        assert!(CAREER_BASELINES.contains_key(DEFAULT_TYPE_KEY));
    }
}
