//! services/api/src/generation/course.rs
//!
//! Builds the course-outline prompt and runs it through the fallback chain
//! and the normalizer. The module/lesson/tag counts in the prompt are
//! advisory instructions to the provider, not enforced bounds; only the
//! structural shape of the reply is validated.

use coursecraft_core::domain::CourseOutline;
use coursecraft_core::normalize;
use coursecraft_core::ports::{GenerationRequest, PortError, PortResult};

use crate::generation::fallback::FallbackOrchestrator;

const SYSTEM_INSTRUCTIONS: &str =
    "You are an expert curriculum designer. Respond with ONLY a JSON object matching the requested schema.";

const PROMPT_TEMPLATE: &str = r#"You are an expert curriculum designer. Create a comprehensive online course for the topic: "{topic}".

Generate a detailed course structure with the following specifications:
- A clear, engaging course title and description
- 3-6 modules that progress from foundational to advanced concepts
- Each module should have 3-5 lessons
- Include 3-5 relevant tags for the course

Return ONLY a valid JSON object (no markdown, no explanation) in this exact format:
{
  "title": "Course Title",
  "description": "Detailed course description explaining what students will learn",
  "tags": ["tag1", "tag2", "tag3"],
  "modules": [
    {
      "title": "Module 1 Title",
      "lessons": [
        "Lesson 1 Title",
        "Lesson 2 Title",
        "Lesson 3 Title"
      ]
    }
  ]
}"#;

/// Generates a validated course outline for a free-text topic.
///
/// An empty or whitespace-only topic is rejected before any provider call.
pub async fn generate_course_outline(
    generator: &FallbackOrchestrator,
    topic: &str,
) -> PortResult<CourseOutline> {
    let topic = topic.trim();
    if topic.is_empty() {
        return Err(PortError::InvalidInput("Topic is required".to_string()));
    }

    let prompt = PROMPT_TEMPLATE.replace("{topic}", topic);
    let request = GenerationRequest::new(prompt).with_system(SYSTEM_INSTRUCTIONS);

    let raw = generator.generate(&request).await?;
    normalize::parse_course_outline(&raw)
}
