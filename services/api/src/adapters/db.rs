//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the `CourseStore` port from the `core` crate. It handles
//! all interactions with the PostgreSQL database using `sqlx`.
//!
//! Course creation writes the hierarchy incrementally, awaiting each insert
//! in outline order so `order_index` values always match generation order.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use coursecraft_core::domain::{
    ContentBlock, Course, CourseOutline, Lesson, LessonBody, LessonPatch, Module,
};
use coursecraft_core::ports::{CourseStore, PortError, PortResult};
use sqlx::{FromRow, PgPool};
use tracing::error;
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `CourseStore` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct CourseRecord {
    id: Uuid,
    title: String,
    description: String,
    creator: String,
    tags: Vec<String>,
    is_published: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CourseRecord {
    fn into_domain(self, modules: Vec<Module>, saved_by: Vec<String>) -> Course {
        Course {
            id: self.id,
            title: self.title,
            description: self.description,
            creator: self.creator,
            tags: self.tags,
            modules,
            saved_by,
            is_published: self.is_published,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ModuleRecord {
    id: Uuid,
    course_id: Uuid,
    title: String,
    order_index: i32,
}

impl ModuleRecord {
    fn into_domain(self, lessons: Vec<Lesson>) -> Module {
        Module {
            id: self.id,
            title: self.title,
            course_id: self.course_id,
            lessons,
            order_index: self.order_index,
        }
    }
}

#[derive(FromRow)]
struct LessonRecord {
    id: Uuid,
    module_id: Uuid,
    title: String,
    objectives: Vec<String>,
    content: serde_json::Value,
    is_enriched: bool,
    translation: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl LessonRecord {
    /// Fails when the stored JSONB does not decode as content blocks, which
    /// callers treat as a population failure.
    fn into_domain(self) -> Result<Lesson, serde_json::Error> {
        let content: Vec<ContentBlock> = serde_json::from_value(self.content)?;
        Ok(Lesson {
            id: self.id,
            title: self.title,
            module_id: self.module_id,
            objectives: self.objectives,
            content,
            is_enriched: self.is_enriched,
            translation: self.translation,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

//=========================================================================================
// Internal Fetch Helpers
//=========================================================================================

const LESSON_COLUMNS: &str =
    "id, module_id, title, objectives, content, is_enriched, translation, created_at, updated_at";

impl DbAdapter {
    async fn fetch_course_record(&self, course_id: Uuid) -> PortResult<CourseRecord> {
        sqlx::query_as::<_, CourseRecord>(
            "SELECT id, title, description, creator, tags, is_published, created_at, updated_at \
             FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))
    }

    async fn fetch_saved_by(&self, course_id: Uuid) -> PortResult<Vec<String>> {
        sqlx::query_scalar::<_, String>(
            "SELECT owner_id FROM course_saves WHERE course_id = $1 ORDER BY saved_at ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn fetch_lessons(&self, module_id: Uuid) -> Result<Vec<Lesson>, PopulateError> {
        let records = sqlx::query_as::<_, LessonRecord>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE module_id = $1 ORDER BY order_index ASC",
        ))
        .bind(module_id)
        .fetch_all(&self.pool)
        .await?;

        records
            .into_iter()
            .map(|r| r.into_domain().map_err(PopulateError::from))
            .collect()
    }

    async fn fetch_modules(&self, course_id: Uuid) -> Result<Vec<Module>, PopulateError> {
        let records = sqlx::query_as::<_, ModuleRecord>(
            "SELECT id, course_id, title, order_index FROM modules \
             WHERE course_id = $1 ORDER BY order_index ASC",
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        let mut modules = Vec::with_capacity(records.len());
        for record in records {
            let lessons = self.fetch_lessons(record.id).await?;
            modules.push(record.into_domain(lessons));
        }
        Ok(modules)
    }

    /// Builds the full domain course. Nested population degrades gracefully:
    /// a structural failure in module/lesson data logs and yields the bare
    /// course rather than failing the whole request.
    async fn assemble_course(&self, record: CourseRecord) -> PortResult<Course> {
        let saved_by = self.fetch_saved_by(record.id).await?;
        let modules = match self.fetch_modules(record.id).await {
            Ok(modules) => modules,
            Err(e) => {
                error!(course_id = %record.id, "failed to populate course, returning it bare: {e}");
                Vec::new()
            }
        };
        Ok(record.into_domain(modules, saved_by))
    }

    async fn fetch_lesson_record(&self, lesson_id: Uuid) -> PortResult<LessonRecord> {
        sqlx::query_as::<_, LessonRecord>(&format!(
            "SELECT {LESSON_COLUMNS} FROM lessons WHERE id = $1",
        ))
        .bind(lesson_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("Lesson {} not found", lesson_id)))
    }
}

/// Why nested population failed: the query itself, or stored content that no
/// longer decodes as blocks.
#[derive(Debug, thiserror::Error)]
enum PopulateError {
    #[error("query failed: {0}")]
    Query(#[from] sqlx::Error),
    #[error("stored content is malformed: {0}")]
    Decode(#[from] serde_json::Error),
}

//=========================================================================================
// `CourseStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl CourseStore for DbAdapter {
    async fn create_course_with_structure(
        &self,
        outline: &CourseOutline,
        owner_id: &str,
    ) -> PortResult<Course> {
        let course_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO courses (id, title, description, creator, tags) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(course_id)
        .bind(&outline.title)
        .bind(&outline.description)
        .bind(owner_id)
        .bind(&outline.tags)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Awaited sequentially so order_index always matches outline order.
        for (module_index, module_outline) in outline.modules.iter().enumerate() {
            let module_id = Uuid::new_v4();
            sqlx::query("INSERT INTO modules (id, course_id, title, order_index) VALUES ($1, $2, $3, $4)")
                .bind(module_id)
                .bind(course_id)
                .bind(&module_outline.title)
                .bind(module_index as i32)
                .execute(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;

            for (lesson_index, lesson_title) in module_outline.lessons.iter().enumerate() {
                sqlx::query(
                    "INSERT INTO lessons (id, module_id, title, order_index) \
                     VALUES ($1, $2, $3, $4)",
                )
                .bind(Uuid::new_v4())
                .bind(module_id)
                .bind(lesson_title)
                .bind(lesson_index as i32)
                .execute(&self.pool)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
            }
        }

        self.get_course(course_id).await
    }

    async fn get_course(&self, course_id: Uuid) -> PortResult<Course> {
        let record = self.fetch_course_record(course_id).await?;
        self.assemble_course(record).await
    }

    async fn list_courses(&self, owner_id: &str) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(
            "SELECT id, title, description, creator, tags, is_published, created_at, updated_at \
             FROM courses WHERE creator = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut courses = Vec::with_capacity(records.len());
        for record in records {
            courses.push(self.assemble_course(record).await?);
        }
        Ok(courses)
    }

    async fn list_saved(&self, owner_id: &str) -> PortResult<Vec<Course>> {
        let records = sqlx::query_as::<_, CourseRecord>(
            "SELECT c.id, c.title, c.description, c.creator, c.tags, c.is_published, \
                    c.created_at, c.updated_at \
             FROM courses c JOIN course_saves s ON s.course_id = c.id \
             WHERE s.owner_id = $1 ORDER BY c.created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let mut courses = Vec::with_capacity(records.len());
        for record in records {
            courses.push(self.assemble_course(record).await?);
        }
        Ok(courses)
    }

    async fn get_module(&self, module_id: Uuid) -> PortResult<Module> {
        let record = sqlx::query_as::<_, ModuleRecord>(
            "SELECT id, course_id, title, order_index FROM modules WHERE id = $1",
        )
        .bind(module_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound(format!("Module {} not found", module_id)))?;

        let lessons = self
            .fetch_lessons(record.id)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.into_domain(lessons))
    }

    async fn get_lesson(&self, lesson_id: Uuid) -> PortResult<Lesson> {
        self.fetch_lesson_record(lesson_id)
            .await?
            .into_domain()
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn update_lesson(&self, lesson_id: Uuid, patch: LessonPatch) -> PortResult<Lesson> {
        let current = self.get_lesson(lesson_id).await?;

        let title = patch.title.unwrap_or(current.title);
        let objectives = patch.objectives.unwrap_or(current.objectives);
        let content = patch.content.unwrap_or(current.content);
        let translation = patch.translation.unwrap_or(current.translation);
        let content_json =
            serde_json::to_value(&content).map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "UPDATE lessons SET title = $1, objectives = $2, content = $3, translation = $4, \
             updated_at = now() WHERE id = $5",
        )
        .bind(&title)
        .bind(&objectives)
        .bind(&content_json)
        .bind(&translation)
        .bind(lesson_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.get_lesson(lesson_id).await
    }

    async fn apply_generated_lesson(
        &self,
        lesson_id: Uuid,
        body: &LessonBody,
    ) -> PortResult<Lesson> {
        // Existence check first so a stale id is NotFound, not a no-op.
        self.fetch_lesson_record(lesson_id).await?;

        let content_json = serde_json::to_value(&body.content)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query(
            "UPDATE lessons SET objectives = $1, content = $2, is_enriched = TRUE, \
             updated_at = now() WHERE id = $3",
        )
        .bind(&body.objectives)
        .bind(&content_json)
        .bind(lesson_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        self.get_lesson(lesson_id).await
    }

    async fn toggle_lesson_complete(&self, owner_id: &str, lesson_id: Uuid) -> PortResult<bool> {
        self.fetch_lesson_record(lesson_id).await?;

        let inserted = sqlx::query(
            "INSERT INTO completed_lessons (owner_id, lesson_id) VALUES ($1, $2) \
             ON CONFLICT (owner_id, lesson_id) DO NOTHING",
        )
        .bind(owner_id)
        .bind(lesson_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .rows_affected();

        if inserted > 0 {
            return Ok(true);
        }

        sqlx::query("DELETE FROM completed_lessons WHERE owner_id = $1 AND lesson_id = $2")
            .bind(owner_id)
            .bind(lesson_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(false)
    }

    async fn save_course(&self, owner_id: &str, course_id: Uuid) -> PortResult<()> {
        self.fetch_course_record(course_id).await?;

        sqlx::query(
            "INSERT INTO course_saves (course_id, owner_id) VALUES ($1, $2) \
             ON CONFLICT (course_id, owner_id) DO NOTHING",
        )
        .bind(course_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn unsave_course(&self, owner_id: &str, course_id: Uuid) -> PortResult<()> {
        self.fetch_course_record(course_id).await?;

        sqlx::query("DELETE FROM course_saves WHERE course_id = $1 AND owner_id = $2")
            .bind(course_id)
            .bind(owner_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn delete_course(&self, course_id: Uuid, requester_id: &str) -> PortResult<()> {
        let record = self.fetch_course_record(course_id).await?;
        if record.creator != requester_id {
            return Err(PortError::Unauthorized);
        }

        sqlx::query(
            "DELETE FROM lessons WHERE module_id IN \
             (SELECT id FROM modules WHERE course_id = $1)",
        )
        .bind(course_id)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query("DELETE FROM modules WHERE course_id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
