//! crates/coursecraft_core/src/normalize.rs
//!
//! Turns raw provider text into validated generation payloads. Providers are
//! told to answer with bare JSON but routinely wrap it in a fenced code block;
//! the normalizer strips the fence, parses strictly, and then checks every
//! invariant the schema itself cannot express. A failure here is
//! `PortError::MalformedOutput` and is never retried through the fallback
//! chain: the chain already committed to this provider's output.

use crate::domain::{ContentBlock, CourseOutline, LessonBody};
use crate::ports::{PortError, PortResult};

/// Strips a surrounding Markdown code fence, if present.
///
/// Handles an opening marker with or without a language tag and a closing
/// marker, and is a no-op on unfenced text, so applying it twice gives the
/// same result as applying it once.
pub fn strip_code_fence(text: &str) -> &str {
    let mut s = text.trim();
    if let Some(rest) = s.strip_prefix("```") {
        // Drop the language tag, if any, through the end of the marker line.
        s = match rest.find('\n') {
            Some(idx) => &rest[idx + 1..],
            None => rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric()),
        };
    }
    s = s.trim();
    if let Some(rest) = s.strip_suffix("```") {
        s = rest;
    }
    s.trim()
}

/// Parses and validates a generated course outline.
pub fn parse_course_outline(raw: &str) -> PortResult<CourseOutline> {
    let outline: CourseOutline = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| PortError::MalformedOutput(format!("course outline is not valid JSON: {e}")))?;
    validate_outline(&outline)?;
    Ok(outline)
}

/// Parses and validates a generated lesson body.
pub fn parse_lesson_body(raw: &str) -> PortResult<LessonBody> {
    let body: LessonBody = serde_json::from_str(strip_code_fence(raw))
        .map_err(|e| PortError::MalformedOutput(format!("lesson body is not valid JSON: {e}")))?;
    validate_lesson_body(&body)?;
    Ok(body)
}

fn validate_outline(outline: &CourseOutline) -> PortResult<()> {
    if outline.title.trim().is_empty() {
        return Err(PortError::MalformedOutput(
            "course outline has an empty title".to_string(),
        ));
    }
    if outline.modules.is_empty() {
        return Err(PortError::MalformedOutput(
            "course outline has no modules".to_string(),
        ));
    }
    for (i, module) in outline.modules.iter().enumerate() {
        if module.title.trim().is_empty() {
            return Err(PortError::MalformedOutput(format!(
                "module {i} has an empty title"
            )));
        }
    }
    Ok(())
}

fn validate_lesson_body(body: &LessonBody) -> PortResult<()> {
    if body.content.is_empty() {
        return Err(PortError::MalformedOutput(
            "lesson body has no content blocks".to_string(),
        ));
    }
    for (i, block) in body.content.iter().enumerate() {
        validate_block(i, block)?;
    }
    Ok(())
}

// Invariants the serde shapes cannot carry, chiefly the mcq answer index.
fn validate_block(index: usize, block: &ContentBlock) -> PortResult<()> {
    match block {
        ContentBlock::Mcq {
            options, answer, ..
        } => {
            if options.is_empty() {
                return Err(PortError::MalformedOutput(format!(
                    "content block {index}: mcq has no options"
                )));
            }
            if *answer >= options.len() {
                return Err(PortError::MalformedOutput(format!(
                    "content block {index}: mcq answer {answer} is out of range for {} options",
                    options.len()
                )));
            }
        }
        ContentBlock::Video { query, url } => {
            if query.is_none() && url.is_none() {
                return Err(PortError::MalformedOutput(format!(
                    "content block {index}: video has neither query nor url"
                )));
            }
        }
        ContentBlock::Heading { .. } | ContentBlock::Paragraph { .. } | ContentBlock::Code { .. } => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINE_JSON: &str = r#"{
        "title": "Intro to Graph Theory",
        "description": "From vertices to spanning trees.",
        "tags": ["math", "graphs"],
        "modules": [
            {"title": "Foundations", "lessons": ["Vertices and Edges", "Paths", "Cycles"]},
            {"title": "Trees", "lessons": ["Definitions", "Traversals", "Spanning Trees"]}
        ]
    }"#;

    #[test]
    fn fence_stripping_gives_identical_result_for_all_wrappings() {
        let plain = parse_course_outline(OUTLINE_JSON).unwrap();
        let tagged = parse_course_outline(&format!("```json\n{OUTLINE_JSON}\n```")).unwrap();
        let untagged = parse_course_outline(&format!("```\n{OUTLINE_JSON}\n```")).unwrap();

        for outline in [&tagged, &untagged] {
            assert_eq!(outline.title, plain.title);
            assert_eq!(outline.modules.len(), plain.modules.len());
            assert_eq!(outline.modules[1].lessons, plain.modules[1].lessons);
        }
    }

    #[test]
    fn fence_stripping_is_a_no_op_on_unfenced_text_and_idempotent() {
        assert_eq!(strip_code_fence(OUTLINE_JSON), OUTLINE_JSON.trim());
        let once = strip_code_fence("```json\n{\"a\": 1}\n```");
        assert_eq!(once, "{\"a\": 1}");
        assert_eq!(strip_code_fence(once), once);
    }

    #[test]
    fn single_line_fence_is_stripped() {
        assert_eq!(strip_code_fence("```json{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn conversational_preamble_is_malformed_output() {
        // A provider that chats instead of answering with JSON.
        let raw = r#"Sure, here's your course: {title: "X"}"#;
        let err = parse_course_outline(raw).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn outline_without_modules_key_is_rejected() {
        let err = parse_course_outline(r#"{"title": "X"}"#).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn outline_with_empty_module_list_is_rejected() {
        let err = parse_course_outline(r#"{"title": "X", "modules": []}"#).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn lesson_body_parses_with_defaulted_objectives() {
        let body = parse_lesson_body(
            r#"{"content": [{"type": "paragraph", "text": "Graphs model relations."}]}"#,
        )
        .unwrap();
        assert!(body.objectives.is_empty());
        assert_eq!(body.content.len(), 1);
    }

    #[test]
    fn unknown_block_type_fails_closed() {
        // The permissive path would have dropped the block at render time;
        // the normalizer instead rejects the payload outright.
        let err = parse_lesson_body(r#"{"content": [{"type": "diagram", "text": "x"}]}"#)
            .unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn mcq_answer_out_of_range_fails_closed() {
        // Stricter than the original shallow shape check: an invalid variant
        // is rejected at the boundary rather than persisted.
        let raw = r#"{"content": [
            {"type": "mcq", "question": "Pick one", "options": ["a", "b"], "answer": 2,
             "explanation": "nope"}
        ]}"#;
        let err = parse_lesson_body(raw).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));
    }

    #[test]
    fn mcq_answer_in_range_is_accepted() {
        let raw = r#"{"objectives": ["Know the basics"], "content": [
            {"type": "heading", "text": "Quiz"},
            {"type": "mcq", "question": "Pick one", "options": ["a", "b"], "answer": 1,
             "explanation": "b it is"}
        ]}"#;
        let body = parse_lesson_body(raw).unwrap();
        assert_eq!(body.content.len(), 2);
    }

    #[test]
    fn video_block_needs_query_or_url() {
        let err = parse_lesson_body(r#"{"content": [{"type": "video"}]}"#).unwrap_err();
        assert!(matches!(err, PortError::MalformedOutput(_)));

        parse_lesson_body(r#"{"content": [{"type": "video", "query": "graph theory intro"}]}"#)
            .unwrap();
    }
}
