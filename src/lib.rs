//! typelens - personality insight reports for MBTI type codes
//!
//! Three structurally identical generators (career, relationships, Big Five
//! trait breakdown) combine a static per-type knowledge base with a
//! best-effort LLM call seeded from recent conversation context. Static
//! content always wins when the generative side is unavailable; only the
//! trait analyzer merges generative output back into its result.

mod big_five;
mod career;
mod context;
mod engine;
mod error;
mod generative;
mod logging;
mod openai;
mod prompts;
mod relationship;
mod store;

pub use big_five::{PersonalityTraitsAnalyzer, TraitBreakdown, TraitScore, TRAIT_ORDER};
pub use career::{CareerInsight, CareerInsightsGenerator};
pub use context::{
    extract_context, ConversationHistory, ConversationTurn, InMemoryHistory, CONTEXT_WINDOW,
    DEFAULT_MAX_CONTEXT_LENGTH, NO_CONTEXT_PLACEHOLDER,
};
pub use engine::InsightEngine;
pub use error::InsightError;
pub use generative::{GenerativeBackend, GenerativeFault};
pub use logging::{cleanup_old_logs, init_logging, LogCategory};
pub use openai::{OpenAiClient, OpenAiFault, GPT_35_TURBO};
pub use prompts::{
    PromptTemplate, CAREER_INSIGHTS_TEMPLATE, INSIGHT_SLOTS, RELATIONSHIP_INSIGHTS_TEMPLATE,
    TRAIT_ANALYSIS_TEMPLATE,
};
pub use relationship::{RelationshipInsight, RelationshipInsightsGenerator};
pub use store::ConversationLog;

/// Sentinel key for the fallback record in every baseline table
pub const DEFAULT_TYPE_KEY: &str = "DEFAULT";
