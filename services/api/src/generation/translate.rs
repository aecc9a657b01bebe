//! services/api/src/generation/translate.rs
//!
//! Secondary-language translation of lesson text. Unlike the course and
//! lesson generators this is a raw text passthrough: no JSON schema and no
//! fence stripping of the result.

use coursecraft_core::ports::{GenerationRequest, PortError, PortResult};

use crate::generation::fallback::FallbackOrchestrator;

const PROMPT_TEMPLATE: &str = r#"Translate the following educational content to {language}. Keep technical terms in English but explain concepts naturally in {language}.

Text to translate:
{text}

Provide only the translated text without any additional explanation."#;

pub async fn translate(
    generator: &FallbackOrchestrator,
    text: &str,
    language: &str,
) -> PortResult<String> {
    if text.trim().is_empty() {
        return Err(PortError::InvalidInput(
            "Text is required for translation".to_string(),
        ));
    }

    let prompt = PROMPT_TEMPLATE
        .replace("{language}", language)
        .replace("{text}", text);
    let system = format!(
        "You are a translator. Return only the translated text in {language}, no explanation."
    );
    let request = GenerationRequest::new(prompt)
        .with_system(system)
        .with_max_output_tokens(800);

    let translated = generator.generate(&request).await?;
    Ok(translated.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::fallback::tests::StubProvider;
    use std::sync::{Arc, Mutex};

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_provider_call() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let generator =
            FallbackOrchestrator::new(vec![StubProvider::ok("gemini", "anuvaad", &log)]);

        let err = translate(&generator, "  ", "Hinglish").await.unwrap_err();
        assert!(matches!(err, PortError::InvalidInput(_)));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn translation_is_passed_through_untouched() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let generator = FallbackOrchestrator::new(vec![StubProvider::ok(
            "gemini",
            "  Graph ek structure hota hai.  ",
            &log,
        )]);

        let translated = translate(&generator, "A graph is a structure.", "Hinglish")
            .await
            .unwrap();
        assert_eq!(translated, "Graph ek structure hota hai.");
    }
}
