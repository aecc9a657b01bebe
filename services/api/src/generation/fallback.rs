//! services/api/src/generation/fallback.rs
//!
//! The provider fallback chain. Vendors are tried in the fixed priority order
//! they were configured in; any single failure moves on to the next vendor
//! with the same request. Only exhaustion of the whole chain is terminal.

use std::sync::Arc;

use coursecraft_core::ports::{GenerationProvider, GenerationRequest, PortError, PortResult};
use tracing::{debug, warn};

/// Runs one generation request through an ordered list of providers.
///
/// Single pass: no provider is invoked twice in the same call and there is no
/// backoff. Per-provider failures are logged and absorbed; callers only ever
/// see the first success or `PortError::Unavailable`.
pub struct FallbackOrchestrator {
    providers: Vec<Arc<dyn GenerationProvider>>,
}

impl FallbackOrchestrator {
    pub fn new(providers: Vec<Arc<dyn GenerationProvider>>) -> Self {
        Self { providers }
    }

    /// Vendor names in priority order, for startup diagnostics.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub async fn generate(&self, request: &GenerationRequest) -> PortResult<String> {
        if self.providers.is_empty() {
            return Err(PortError::Unavailable(
                "no generation providers configured".to_string(),
            ));
        }

        for provider in &self.providers {
            match provider.generate(request).await {
                Ok(text) => {
                    debug!(provider = provider.name(), "generation succeeded");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(provider = provider.name(), "provider failed, trying next: {e}");
                }
            }
        }

        Err(PortError::Unavailable(
            "all configured providers failed".to_string(),
        ))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// A scripted provider that records every invocation in a shared log.
    pub(crate) struct StubProvider {
        pub name: &'static str,
        pub reply: Result<&'static str, &'static str>,
        pub log: Arc<Mutex<Vec<&'static str>>>,
    }

    impl StubProvider {
        pub fn ok(
            name: &'static str,
            reply: &'static str,
            log: &Arc<Mutex<Vec<&'static str>>>,
        ) -> Arc<dyn GenerationProvider> {
            Arc::new(Self {
                name,
                reply: Ok(reply),
                log: log.clone(),
            })
        }

        pub fn failing(
            name: &'static str,
            log: &Arc<Mutex<Vec<&'static str>>>,
        ) -> Arc<dyn GenerationProvider> {
            Arc::new(Self {
                name,
                reply: Err("boom"),
                log: log.clone(),
            })
        }
    }

    #[async_trait]
    impl GenerationProvider for StubProvider {
        fn name(&self) -> &str {
            self.name
        }

        async fn generate(&self, _request: &GenerationRequest) -> PortResult<String> {
            self.log.lock().unwrap().push(self.name);
            self.reply
                .map(str::to_string)
                .map_err(|e| PortError::Provider(e.to_string()))
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest::new("prompt")
    }

    #[tokio::test]
    async fn first_success_stops_the_chain() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let orchestrator = FallbackOrchestrator::new(vec![
            StubProvider::ok("gemini", "text from gemini", &log),
            StubProvider::ok("openai", "text from openai", &log),
        ]);

        let text = orchestrator.generate(&request()).await.unwrap();
        assert_eq!(text, "text from gemini");
        assert_eq!(*log.lock().unwrap(), vec!["gemini"]);
    }

    #[tokio::test]
    async fn failure_advances_to_the_next_provider() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let orchestrator = FallbackOrchestrator::new(vec![
            StubProvider::failing("gemini", &log),
            StubProvider::ok("openai", "recovered", &log),
            StubProvider::ok("deepseek", "unused", &log),
        ]);

        let text = orchestrator.generate(&request()).await.unwrap();
        assert_eq!(text, "recovered");
        assert_eq!(*log.lock().unwrap(), vec!["gemini", "openai"]);
    }

    #[tokio::test]
    async fn exhaustion_invokes_each_provider_exactly_once_in_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let orchestrator = FallbackOrchestrator::new(vec![
            StubProvider::failing("gemini", &log),
            StubProvider::failing("openai", &log),
            StubProvider::failing("deepseek", &log),
        ]);

        let err = orchestrator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, PortError::Unavailable(_)));
        assert_eq!(*log.lock().unwrap(), vec!["gemini", "openai", "deepseek"]);
    }

    #[tokio::test]
    async fn empty_chain_is_unavailable() {
        let orchestrator = FallbackOrchestrator::new(Vec::new());
        let err = orchestrator.generate(&request()).await.unwrap_err();
        assert!(matches!(err, PortError::Unavailable(_)));
    }
}
