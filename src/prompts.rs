// Instruction templates for the three insight generators, with named slots
// filled per request with the type code and conversation context.

use crate::error::InsightError;

/// A prompt template with named `{slot}` placeholders.
///
/// Construction verifies that every declared slot actually appears in the
/// template text; `fill` verifies that every declared slot is supplied.
/// Both are programming errors if violated, caught at generator construction.
pub struct PromptTemplate {
    template: &'static str,
    slots: &'static [&'static str],
}

impl PromptTemplate {
    pub fn new(
        template: &'static str,
        slots: &'static [&'static str],
    ) -> Result<Self, InsightError> {
        for slot in slots {
            let placeholder = format!("{{{}}}", slot);
            if !template.contains(&placeholder) {
                return Err(InsightError::Template(format!(
                    "declared slot '{}' does not appear in template",
                    slot
                )));
            }
        }

        Ok(Self { template, slots })
    }

    /// Fill every declared slot with its value. Values for undeclared slots
    /// are ignored; a missing value for a declared slot is an error.
    pub fn fill(&self, values: &[(&str, &str)]) -> Result<String, InsightError> {
        let mut output = self.template.to_string();

        for slot in self.slots {
            let value = values
                .iter()
                .find(|(name, _)| name == slot)
                .map(|(_, value)| *value)
                .ok_or_else(|| {
                    InsightError::Template(format!("no value supplied for slot '{}'", slot))
                })?;

            output = output.replace(&format!("{{{}}}", slot), value);
        }

        Ok(output)
    }
}

/// Slot names shared by all three insight templates
pub const INSIGHT_SLOTS: &[&str] = &["mbti_type", "conversation_context"];

pub const CAREER_INSIGHTS_TEMPLATE: &str = r#"Generate comprehensive career insights for the {mbti_type} personality type.

Conversation Context: {conversation_context}

Provide a detailed analysis covering:
1. Workplace Dynamics: How this personality type approaches work,
   their ideal work environment, and professional motivations
2. Perfect Career Paths: Roles and industries that align with
   their natural strengths and personality traits
3. Specific Career Strengths
4. Potential Career Challenges

Key Considerations:
- Reflect the unique characteristics of {mbti_type}
- Incorporate insights from the conversation context
- Be nuanced and avoid stereotyping
- Provide actionable and empathetic insights

Output Format:
A JSON object with detailed career insights"#;

pub const RELATIONSHIP_INSIGHTS_TEMPLATE: &str = r#"Generate comprehensive relationship insights for the {mbti_type} personality type.

Conversation Context: {conversation_context}

Provide a detailed analysis covering:
1. Relationship Summary: How this personality type approaches relationships,
   their core needs, communication style, and emotional landscape
2. Specific Strengths in Relationships
3. Potential Challenges in Relationships

Key Considerations:
- Reflect the unique characteristics of {mbti_type}
- Incorporate insights from the conversation context
- Be nuanced and avoid stereotyping
- Provide actionable and empathetic insights

Output Format:
A JSON object with detailed relationship insights"#;

pub const TRAIT_ANALYSIS_TEMPLATE: &str = r#"Analyze the conversation context and MBTI type to generate a comprehensive
five-factor personality model (Big Five) breakdown.

MBTI Type: {mbti_type}
Conversation Context: {conversation_context}

For each of the following traits, provide:
1. A percentage score (0-100%)
2. A descriptive label
3. 3 specific descriptors that capture the essence of the trait

Traits to analyze:
- Extraversion
- Openness
- Conscientiousness
- Agreeableness
- Neuroticism

Ensure the analysis is:
- Nuanced and specific to the individual
- Based on the conversation details
- Reflective of both the MBTI type and conversation context
- Providing insightful, personalized observations

Output Format:
A JSON object with detailed trait breakdowns"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_replaces_all_slots() {
        let template = PromptTemplate::new(CAREER_INSIGHTS_TEMPLATE, INSIGHT_SLOTS).unwrap();
        let filled = template
            .fill(&[
                ("mbti_type", "INTJ"),
                ("conversation_context", "likes puzzles"),
            ])
            .unwrap();

        assert!(filled.contains("INTJ"));
        assert!(filled.contains("likes puzzles"));
        assert!(!filled.contains("{mbti_type}"));
        assert!(!filled.contains("{conversation_context}"));
    }

    #[test]
    fn test_fill_missing_slot_value_errors() {
        let template = PromptTemplate::new(TRAIT_ANALYSIS_TEMPLATE, INSIGHT_SLOTS).unwrap();
        let result = template.fill(&[("mbti_type", "ENFP")]);

        assert!(result.is_err());
    }

    #[test]
    fn test_new_rejects_undeclared_slot() {
        let result = PromptTemplate::new("no placeholders here", &["mbti_type"]);

        assert!(result.is_err());
    }

    #[test]
    fn test_all_insight_templates_declare_their_slots() {
        assert!(PromptTemplate::new(CAREER_INSIGHTS_TEMPLATE, INSIGHT_SLOTS).is_ok());
        assert!(PromptTemplate::new(RELATIONSHIP_INSIGHTS_TEMPLATE, INSIGHT_SLOTS).is_ok());
        assert!(PromptTemplate::new(TRAIT_ANALYSIS_TEMPLATE, INSIGHT_SLOTS).is_ok());
    }
}
