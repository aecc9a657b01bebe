//! crates/coursecraft_core/src/domain.rs
//!
//! Defines the core data structures for the application: the persisted
//! Course -> Module -> Lesson hierarchy and the typed lesson content blocks.
//! The serde derives double as the wire and storage format for generated
//! content, so the shapes here are a contract with the generation pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One typed unit of lesson material.
///
/// Serialized as a tagged object (`{"type": "heading", ...}`), which is the
/// exact shape providers are prompted to return and the shape stored in the
/// lesson's content column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    Heading {
        text: String,
    },
    Paragraph {
        text: String,
    },
    Code {
        /// Advisory rendering hint ("python", "rust", ...). Not validated
        /// against any fixed set.
        language: String,
        text: String,
    },
    Video {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        query: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },
    Mcq {
        question: String,
        options: Vec<String>,
        /// Index into `options`. Must be in range; checked when generated
        /// payloads are normalized.
        answer: usize,
        explanation: String,
    },
}

/// A top-level course created from a generated outline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    /// Opaque owner identifier supplied by the external identity system.
    pub creator: String,
    pub tags: Vec<String>,
    /// Populated child modules in `order_index` order. Empty when population
    /// was skipped or degraded.
    pub modules: Vec<Module>,
    pub saved_by: Vec<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,
    pub title: String,
    pub course_id: Uuid,
    /// Populated child lessons in stored order.
    pub lessons: Vec<Lesson>,
    /// Explicit position within the course. Contiguous from 0 at creation.
    pub order_index: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lesson {
    pub id: Uuid,
    pub title: String,
    pub module_id: Uuid,
    pub objectives: Vec<String>,
    /// Empty until the first successful content generation ("stub" state).
    pub content: Vec<ContentBlock>,
    pub is_enriched: bool,
    /// Secondary-language rendition of the lesson text, empty until requested.
    pub translation: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A partial lesson update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LessonPatch {
    pub title: Option<String>,
    pub objectives: Option<Vec<String>>,
    pub content: Option<Vec<ContentBlock>>,
    pub translation: Option<String>,
}

/// The course outline a provider is asked to produce for a topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseOutline {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub modules: Vec<ModuleOutline>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleOutline {
    pub title: String,
    /// Ordered lesson titles. Lessons are created as stubs from these.
    pub lessons: Vec<String>,
}

/// The detailed body a provider is asked to produce for a single lesson.
///
/// Providers are prompted to echo the lesson title back; it is accepted but
/// ignored, the stored title stays authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonBody {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

/// One result from the educational-video search.
#[derive(Debug, Clone, Serialize)]
pub struct VideoResult {
    pub video_id: String,
    pub title: String,
    pub thumbnail: String,
    pub channel_title: String,
    pub embed_url: String,
}
