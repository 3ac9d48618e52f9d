//! Relationship insights generator
//!
//! Same shape as the career generator: baseline lookup with DEFAULT
//! fallback, one best-effort generative call, response logged and discarded.

use crate::context::{extract_context, ConversationHistory, DEFAULT_MAX_CONTEXT_LENGTH};
use crate::error::InsightError;
use crate::generative::GenerativeBackend;
use crate::logging;
use crate::openai::OpenAiClient;
use crate::prompts::{PromptTemplate, INSIGHT_SLOTS, RELATIONSHIP_INSIGHTS_TEMPLATE};
use crate::DEFAULT_TYPE_KEY;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RelationshipInsight {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

fn record(summary: &str, strengths: &[&str], weaknesses: &[&str]) -> RelationshipInsight {
    RelationshipInsight {
        summary: summary.to_string(),
        strengths: strengths.iter().map(|s| s.to_string()).collect(),
        weaknesses: weaknesses.iter().map(|s| s.to_string()).collect(),
    }
}

/// Predefined relationship insights per MBTI type, with a DEFAULT fallback
static RELATIONSHIP_BASELINES: Lazy<HashMap<&'static str, RelationshipInsight>> =
    Lazy::new(|| {
        let mut table = HashMap::new();

        table.insert(
            "INTJ",
            record(
                "You gravitate towards intellectual pursuits and find comfort in structured, analytical environments. In relationships, you seek partners who can match your depth of curiosity while accepting your need for mental stimulation over physical activity. Your perfectionist tendencies extend beyond work into personal goals, but you maintain a healthy self-image despite acknowledging areas for improvement.",
                &["Accepting", "Patient", "Authentic", "Observant", "Loyal", "Supportive"],
                &["Reserved", "Distant", "Self-conscious", "Analytical", "Perfectionistic", "Challenging to read"],
            ),
        );

        table.insert(
            "INFJ",
            record(
                "You seek deep, meaningful connections that transcend surface-level interactions. Relationships for you are about emotional depth, mutual growth, and shared values. You're naturally intuitive, often sensing your partner's unspoken needs while maintaining a delicate balance between empathy and personal boundaries.",
                &["Empathetic", "Insightful", "Supportive", "Compassionate", "Deep", "Committed"],
                &["Idealistic", "Sensitive", "Overanalyzing", "People-pleasing", "Conflict-avoidant", "Emotionally intense"],
            ),
        );

        table.insert(
            DEFAULT_TYPE_KEY,
            record(
                "You approach relationships with a unique blend of your personality traits, seeking connections that align with your core values and personal growth. Your approach to partnerships is nuanced, balancing emotional needs with individual aspirations.",
                &["Authentic", "Caring", "Adaptable", "Committed", "Understanding"],
                &["Complex", "Challenging", "Nuanced", "Evolving", "Introspective"],
            ),
        );

        table
    });

fn validate_baselines() -> Result<(), InsightError> {
    if !RELATIONSHIP_BASELINES.contains_key(DEFAULT_TYPE_KEY) {
        return Err(InsightError::InvalidBaseline(
            "relationship table has no DEFAULT record".to_string(),
        ));
    }

    for (code, insight) in RELATIONSHIP_BASELINES.iter() {
        if insight.summary.is_empty()
            || insight.strengths.is_empty()
            || insight.weaknesses.is_empty()
        {
            return Err(InsightError::InvalidBaseline(format!(
                "relationship record for {} is missing fields",
                code
            )));
        }
    }

    Ok(())
}

fn resolve(type_code: &str) -> RelationshipInsight {
    RELATIONSHIP_BASELINES
        .get(type_code)
        .or_else(|| RELATIONSHIP_BASELINES.get(DEFAULT_TYPE_KEY))
        .cloned()
        .expect("relationship baseline table validated at construction")
}

pub struct RelationshipInsightsGenerator {
    backend: Box<dyn GenerativeBackend>,
    template: PromptTemplate,
}

impl RelationshipInsightsGenerator {
    /// Construct with the OpenAI backend, reading OPENAI_API_KEY from the
    /// environment. A missing key fails construction, not requests.
    pub fn from_env() -> Result<Self, InsightError> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| InsightError::MissingApiKey)?;
        Self::new(Box::new(OpenAiClient::new(&api_key)))
    }

    pub fn new(backend: Box<dyn GenerativeBackend>) -> Result<Self, InsightError> {
        validate_baselines()?;
        let template = PromptTemplate::new(RELATIONSHIP_INSIGHTS_TEMPLATE, INSIGHT_SLOTS)?;

        Ok(Self { backend, template })
    }

    /// Generate relationship insights for a type code. Always succeeds.
    pub async fn generate(
        &self,
        type_code: &str,
        history: &dyn ConversationHistory,
        max_context_length: Option<usize>,
    ) -> RelationshipInsight {
        let max_len = max_context_length.unwrap_or(DEFAULT_MAX_CONTEXT_LENGTH);
        let insights = resolve(type_code);
        let context = extract_context(history, max_len);

        logging::log_insight(Some(type_code), "Generating relationship insights");

        // Best-effort personalization; response logged, not merged.
        match self.template.fill(&[
            ("mbti_type", type_code),
            ("conversation_context", &context),
        ]) {
            Ok(prompt) => match self.backend.complete(&prompt).await {
                Ok(response) => {
                    logging::log_generative(
                        Some(type_code),
                        &format!(
                            "Relationship response received ({} chars), discarded in favor of baseline",
                            response.len()
                        ),
                    );
                }
                Err(e) => {
                    logging::log_error(
                        Some(type_code),
                        &format!("Relationship insights generation failed: {}", e),
                    );
                }
            },
            Err(e) => {
                logging::log_error(
                    Some(type_code),
                    &format!("Relationship prompt fill failed: {}", e),
                );
            }
        }

        insights
    }

    /// Format relationship insights into display text.
    pub fn format(&self, insights: &RelationshipInsight) -> String {
        let mut output = String::from("**Relationships**\n");
        output.push_str("**Summary**\n");
        output.push_str(&format!("{}\n\n", insights.summary));

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
