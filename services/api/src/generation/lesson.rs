//! services/api/src/generation/lesson.rs
//!
//! Builds the prompt for one lesson's detailed body and runs it through the
//! fallback chain and the normalizer.

use coursecraft_core::domain::LessonBody;
use coursecraft_core::normalize;
use coursecraft_core::ports::{GenerationRequest, PortResult};

use crate::generation::fallback::FallbackOrchestrator;

const SYSTEM_INSTRUCTIONS: &str =
    "You are an expert educator. Respond with ONLY a JSON object matching the requested schema for lesson content.";

const PROMPT_TEMPLATE: &str = r#"You are an expert educator creating detailed lesson content.

Course: "{course_title}"
Module: "{module_title}"
Lesson: "{lesson_title}"

Create comprehensive lesson content with the following structure:
- 2-3 clear learning objectives
- Structured content blocks including:
  * Headings to organize sections
  * Detailed paragraphs explaining concepts
  * Code examples (only if relevant to the topic) with proper language specification
  * A video search query (one relevant educational video topic)
  * 4-5 multiple choice questions to test understanding, each with 4 options and an explanation for the correct answer

Return ONLY a valid JSON object (no markdown, no explanation) in this exact format:
{
  "title": "{lesson_title}",
  "objectives": [
    "Understand the fundamental concepts...",
    "Apply techniques to solve..."
  ],
  "content": [
    {
      "type": "heading",
      "text": "Introduction"
    },
    {
      "type": "paragraph",
      "text": "Detailed explanation..."
    },
    {
      "type": "code",
      "language": "python",
      "text": "print('Hello World')"
    },
    {
      "type": "video",
      "query": "Introduction to React Hooks tutorial"
    },
    {
      "type": "mcq",
      "question": "What is the main purpose of...?",
      "options": ["Option A", "Option B", "Option C", "Option D"],
      "answer": 1,
      "explanation": "Option B is correct because..."
    }
  ]
}"#;

/// Generates a validated lesson body for one lesson of a course.
pub async fn generate_lesson_body(
    generator: &FallbackOrchestrator,
    course_title: &str,
    module_title: &str,
    lesson_title: &str,
) -> PortResult<LessonBody> {
    let prompt = PROMPT_TEMPLATE
        .replace("{course_title}", course_title)
        .replace("{module_title}", module_title)
        .replace("{lesson_title}", lesson_title);
    let request = GenerationRequest::new(prompt).with_system(SYSTEM_INSTRUCTIONS);

    let raw = generator.generate(&request).await?;
    normalize::parse_lesson_body(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::fallback::tests::StubProvider;
    use coursecraft_core::domain::ContentBlock;
    use coursecraft_core::ports::PortError;
    use std::sync::{Arc, Mutex};

    const LESSON_REPLY: &str = r#"{
        "title": "Paths",
        "objectives": ["Define walks and paths", "Trace a path in a small graph"],
        "content": [
            {"type": "heading", "text": "Walks, Trails, Paths"},
            {"type": "paragraph", "text": "A walk is any alternating sequence of vertices and edges."},
            {"type": "video", "query": "graph theory paths explained"},
            {"type": "mcq", "question": "Which walk repeats no vertex?",
             "options": ["A trail", "A path", "A cycle", "A circuit"],
             "answer": 1, "explanation": "Paths repeat neither vertices nor edges."}
        ]
    }"#;

    #[tokio::test]
    async fn lesson_reply_parses_into_a_body() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let generator =
            FallbackOrchestrator::new(vec![StubProvider::ok("gemini", LESSON_REPLY, &log)]);

        let body = generate_lesson_body(&generator, "Graph Theory", "Foundations", "Paths")
            .await
            .unwrap();
        assert_eq!(body.objectives.len(), 2);
        assert_eq!(body.content.len(), 4);
        assert!(matches!(body.content[0], ContentBlock::Heading { .. }));
    }

    #[tokio::test]
    async fn out_of_range_mcq_answer_is_malformed_output() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let reply = r#"{"content": [
            {"type": "mcq", "question": "?", "options": ["a"], "answer": 3, "explanation": "x"}
        ]}"#;
        let generator = FallbackOrchestrator::new(vec![StubProvider::ok("gemini", reply, &log)]);

        let err = generate_lesson_body(&generator, "C", "M", "L").await.unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }
}
