//! crates/coursecraft_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of specific external implementations like databases
//! or generative-text vendors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Course, CourseOutline, Lesson, LessonBody, LessonPatch, Module, VideoResult};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations, mirroring the error taxonomy
/// the web layer reports to callers.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// Caller input was rejected before any network or storage call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A single provider failed (network, non-success status, empty reply).
    /// The fallback chain absorbs these; only exhaustion is terminal.
    #[error("Provider failure: {0}")]
    Provider(String),
    /// No provider is configured, or every configured provider failed.
    #[error("Generation unavailable: {0}")]
    Unavailable(String),
    /// A provider responded but its output did not parse against the
    /// expected shape. Never retried against another provider.
    #[error("Malformed generation output: {0}")]
    MalformedOutput(String),
    #[error("Not authorized")]
    Unauthorized,
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Generation Provider Port
//=========================================================================================

/// The parameters of one generation call, shared by every vendor adapter.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The fully rendered user prompt.
    pub prompt: String,
    /// Optional system instruction; vendors without a distinct system slot
    /// may fold it into the conversation however they see fit.
    pub system: Option<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: 0.2,
            max_output_tokens: 2000,
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    pub fn with_max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.max_output_tokens = max_output_tokens;
        self
    }
}

/// One generative-text vendor. Adapters convert vendor-specific failures into
/// `PortError::Provider` so the fallback chain can treat them uniformly.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// A short vendor name used in fallback diagnostics ("gemini", "openai").
    fn name(&self) -> &str;

    /// Sends the prompt to the vendor and returns the raw generated text.
    async fn generate(&self, request: &GenerationRequest) -> PortResult<String>;
}

//=========================================================================================
// Content Hierarchy Store Port
//=========================================================================================

#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Persists a course with its modules and stub lessons, in outline order.
    /// Modules get contiguous `order_index` values starting at 0; every lesson
    /// starts with empty content and `is_enriched = false`.
    async fn create_course_with_structure(
        &self,
        outline: &CourseOutline,
        owner_id: &str,
    ) -> PortResult<Course>;

    /// Fetches a course with modules and lessons populated in stored order.
    ///
    /// Population is best-effort: if the nested fetch fails for data reasons
    /// the bare course is returned instead of an error.
    async fn get_course(&self, course_id: Uuid) -> PortResult<Course>;

    /// Courses created by this owner, newest first.
    async fn list_courses(&self, owner_id: &str) -> PortResult<Vec<Course>>;

    /// Courses this owner has saved, newest first.
    async fn list_saved(&self, owner_id: &str) -> PortResult<Vec<Course>>;

    async fn get_module(&self, module_id: Uuid) -> PortResult<Module>;

    async fn get_lesson(&self, lesson_id: Uuid) -> PortResult<Lesson>;

    /// Applies a partial update; `None` fields are left untouched.
    async fn update_lesson(&self, lesson_id: Uuid, patch: LessonPatch) -> PortResult<Lesson>;

    /// Overwrites a lesson's objectives and content with a generated body and
    /// marks it enriched. Regeneration is last-write-wins.
    async fn apply_generated_lesson(
        &self,
        lesson_id: Uuid,
        body: &LessonBody,
    ) -> PortResult<Lesson>;

    /// Flips the lesson's membership in the owner's completed-set and returns
    /// the new membership state.
    async fn toggle_lesson_complete(&self, owner_id: &str, lesson_id: Uuid) -> PortResult<bool>;

    /// Adds the owner to the course's saved-by set. Idempotent.
    async fn save_course(&self, owner_id: &str, course_id: Uuid) -> PortResult<()>;

    /// Removes the owner from the course's saved-by set. Idempotent.
    async fn unsave_course(&self, owner_id: &str, course_id: Uuid) -> PortResult<()>;

    /// Deletes the course and cascades to its modules and lessons. Fails with
    /// `Unauthorized` (and no partial deletion) unless the requester created
    /// the course.
    async fn delete_course(&self, course_id: Uuid, requester_id: &str) -> PortResult<()>;
}

//=========================================================================================
// Video Search Port
//=========================================================================================

/// Looks up embeddable educational videos for a content block's query.
#[async_trait]
pub trait VideoSearchService: Send + Sync {
    async fn search(&self, query: &str, max_results: u32) -> PortResult<Vec<VideoResult>>;
}
