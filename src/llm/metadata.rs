//! One-shot lesson metadata drafting.
//!
//! The admin panel can ask for a description, a duration estimate and tags
//! from a lesson title plus course context. Any failure along the way is
//! recovered with fixed defaults; saving a lesson manually never depends on
//! this call succeeding.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{create_llm, ChatMessage, LLMConfig};

/// Structured metadata draft for a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonDetails {
    pub description: String,
    pub duration_estimate: String,
    pub tags: Vec<String>,
}

impl LessonDetails {
    /// Values substituted when the generation call fails outright.
    pub fn fallback() -> Self {
        Self {
            description: "Add a description for this lesson.".to_string(),
            duration_estimate: "00:00".to_string(),
            tags: vec!["General".to_string()],
        }
    }
}

/// Reply shape; every field optional so partial replies can be patched
/// field by field.
#[derive(Debug, Deserialize)]
struct DetailsReply {
    description: Option<String>,
    duration_estimate: Option<String>,
    tags: Option<Vec<String>>,
}

impl From<DetailsReply> for LessonDetails {
    fn from(reply: DetailsReply) -> Self {
        Self {
            description: reply
                .description
                .unwrap_or_else(|| "Description not available.".to_string()),
            duration_estimate: reply.duration_estimate.unwrap_or_else(|| "05:00".to_string()),
            tags: reply
                .tags
                .unwrap_or_else(|| vec!["Course".to_string(), "Online".to_string()]),
        }
    }
}

/// Drafts lesson metadata through the configured provider.
pub struct MetadataGenerator {
    config: LLMConfig,
}

impl MetadataGenerator {
    pub fn new(config: LLMConfig) -> Self {
        Self { config }
    }

    /// Draft metadata for a lesson title.
    ///
    /// Never fails: provider errors and malformed replies are logged and
    /// replaced with the fixed fallback values.
    pub async fn generate(&self, title: &str, course_context: &str) -> LessonDetails {
        if !self.config.enable_generation {
            return LessonDetails::fallback();
        }

        match self.request_details(title, course_context).await {
            Ok(details) => details,
            Err(e) => {
                warn!("Metadata generation failed: {}", e);
                LessonDetails::fallback()
            }
        }
    }

    async fn request_details(
        &self,
        title: &str,
        course_context: &str,
    ) -> anyhow::Result<LessonDetails> {
        let llm = create_llm(&self.config)?;

        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: build_prompt(title, course_context),
        }];

        let response = llm.chat(messages).await?;
        debug!("Metadata reply received: {}", response.content);

        let cleaned = clean_llm_response(&response.content);
        let reply: DetailsReply = serde_json::from_str(&cleaned)?;
        Ok(reply.into())
    }
}

fn build_prompt(title: &str, course_context: &str) -> String {
    format!(
        r#"Create metadata for an online course lesson titled "{}".
Context of the course: {}.

Please provide:
1. A catchy, professional description (max 300 characters).
2. An estimated duration (e.g. "10:00").
3. A list of 3 relevant tags.

Return only a JSON object with this exact structure:
{{"description": "...", "duration_estimate": "...", "tags": ["...", "...", "..."]}}"#,
        title, course_context
    )
}

/// Clean LLM response by removing markdown code blocks and extra whitespace
fn clean_llm_response(content: &str) -> String {
    let content = content.trim();

    if content.starts_with("```") {
        if let Some(start) = content.find('\n') {
            if let Some(end) = content.rfind("```") {
                if end > start {
                    return content[start + 1..end].trim().to_string();
                }
            }
        }
    }

    content.replace("```", "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LLMProvider;

    #[test]
    fn clean_response_strips_fenced_json() {
        let input = "```json\n{\"description\": \"Intro\"}\n```";
        assert_eq!(clean_llm_response(input), "{\"description\": \"Intro\"}");
    }

    #[test]
    fn clean_response_leaves_plain_json_alone() {
        let input = "{\"description\": \"Intro\"}";
        assert_eq!(clean_llm_response(input), input);
    }

    #[test]
    fn partial_reply_is_patched_field_by_field() {
        let reply: DetailsReply =
            serde_json::from_str(r#"{"description": "Setting up the project"}"#)
                .expect("parses");
        let details = LessonDetails::from(reply);

        assert_eq!(details.description, "Setting up the project");
        assert_eq!(details.duration_estimate, "05:00");
        assert_eq!(details.tags, vec!["Course", "Online"]);
    }

    #[tokio::test]
    async fn generation_failure_yields_the_fixed_defaults() {
        // No API key configured, so provider construction fails and the
        // fallback must be substituted without the error escaping.
        let generator = MetadataGenerator::new(LLMConfig {
            api_key: None,
            provider: LLMProvider::Gemini,
            ..Default::default()
        });

        let details = generator.generate("Lesson 1: Setup", "Rust course").await;
        assert_eq!(details, LessonDetails::fallback());
        assert_eq!(details.duration_estimate, "00:00");
    }

    #[tokio::test]
    async fn disabled_generation_short_circuits_to_defaults() {
        let generator = MetadataGenerator::new(LLMConfig {
            enable_generation: false,
            ..Default::default()
        });

        let details = generator.generate("Any", "Any").await;
        assert_eq!(details, LessonDetails::fallback());
    }
}
