//! Report engine facade
//!
//! Owns the three generators behind a single credential check and renders
//! the combined report. No logic of its own beyond delegation.

use crate::big_five::PersonalityTraitsAnalyzer;
use crate::career::CareerInsightsGenerator;
use crate::context::ConversationHistory;
use crate::error::InsightError;
use crate::generative::GenerativeBackend;
use crate::logging;
use crate::openai::OpenAiClient;
use crate::relationship::RelationshipInsightsGenerator;

pub struct InsightEngine {
    career: CareerInsightsGenerator,
    relationship: RelationshipInsightsGenerator,
    traits: PersonalityTraitsAnalyzer,
}

impl InsightEngine {
    /// Construct all three generators against the OpenAI backend, reading
    /// OPENAI_API_KEY from the environment. Fails fast when the key is
    /// missing; no generator is usable without it.
    pub fn from_env() -> Result<Self, InsightError> {
        let api_key =
            std::env::var("OPENAI_API_KEY").map_err(|_| InsightError::MissingApiKey)?;

        let _ = logging::init_logging();
        let _ = logging::cleanup_old_logs();

        Self::with_api_key(&api_key)
    }

    pub fn with_api_key(api_key: &str) -> Result<Self, InsightError> {
        Ok(Self {
            career: CareerInsightsGenerator::new(backend(api_key))?,
            relationship: RelationshipInsightsGenerator::new(backend(api_key))?,
            traits: PersonalityTraitsAnalyzer::new(backend(api_key))?,
        })
    }

    /// Assemble from pre-built generators, for callers that inject their own
    /// backends.
    pub fn new(
        career: CareerInsightsGenerator,
        relationship: RelationshipInsightsGenerator,
        traits: PersonalityTraitsAnalyzer,
    ) -> Self {
        Self {
            career,
            relationship,
            traits,
        }
    }

    pub fn career(&self) -> &CareerInsightsGenerator {
        &self.career
    }

    pub fn relationship(&self) -> &RelationshipInsightsGenerator {
        &self.relationship
    }

    pub fn traits(&self) -> &PersonalityTraitsAnalyzer {
        &self.traits
    }

    /// Render all three report sections for a type code.
    pub async fn full_report(
        &self,
        type_code: &str,
        history: &dyn ConversationHistory,
        max_context_length: Option<usize>,
    ) -> String {
        let career = self.career.generate(type_code, history, max_context_length).await;
        let relationship = self
            .relationship
            .generate(type_code, history, max_context_length)
            .await;
        let traits = self.traits.analyze(type_code, history, max_context_length).await;

        format!(
            "{}\n{}\n**Personality Traits**\n{}",
            self.career.format(&career),
            self.relationship.format(&relationship),
            self.traits.format(&traits)
        )
    }
}

fn backend(api_key: &str) -> Box<dyn GenerativeBackend> {
    Box::new(OpenAiClient::new(api_key))
}
