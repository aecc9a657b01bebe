//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::generation::FallbackOrchestrator;
use coursecraft_core::ports::{CourseStore, VideoSearchService};
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. The generation chain and the store are injected here rather
/// than living in module-level singletons, so tests can swap either.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CourseStore>,
    pub generator: Arc<FallbackOrchestrator>,
    /// Present only when a YouTube API key is configured.
    pub videos: Option<Arc<dyn VideoSearchService>>,
    pub config: Arc<Config>,
}
