//! services/api/src/adapters/memory.rs
//!
//! An in-memory implementation of the `CourseStore` port. It mirrors the
//! Postgres adapter's semantics (ordering, idempotent saves, authorization on
//! delete, cascade) and backs the store-contract integration tests, where a
//! real database is not available.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use coursecraft_core::domain::{Course, CourseOutline, Lesson, LessonBody, LessonPatch, Module};
use coursecraft_core::ports::{CourseStore, PortError, PortResult};
use uuid::Uuid;

struct StoredCourse {
    course: Course,
    module_ids: Vec<Uuid>,
    saved_by: Vec<String>,
    /// Creation sequence number; newest-first listings sort on this so that
    /// courses created within the same timestamp tick still order correctly.
    seq: u64,
}

struct StoredModule {
    module: Module,
    lesson_ids: Vec<Uuid>,
}

#[derive(Default)]
struct State {
    courses: HashMap<Uuid, StoredCourse>,
    modules: HashMap<Uuid, StoredModule>,
    lessons: HashMap<Uuid, Lesson>,
    completed: HashSet<(String, Uuid)>,
    next_seq: u64,
}

impl State {
    fn assemble(&self, stored: &StoredCourse) -> Course {
        let mut course = stored.course.clone();
        course.saved_by = stored.saved_by.clone();
        course.modules = stored
            .module_ids
            .iter()
            .filter_map(|id| self.modules.get(id))
            .map(|m| {
                let mut module = m.module.clone();
                module.lessons = m
                    .lesson_ids
                    .iter()
                    .filter_map(|id| self.lessons.get(id))
                    .cloned()
                    .collect();
                module
            })
            .collect();
        course
    }
}

/// A `CourseStore` held entirely in process memory.
#[derive(Default)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryStore {
    async fn create_course_with_structure(
        &self,
        outline: &CourseOutline,
        owner_id: &str,
    ) -> PortResult<Course> {
        let mut state = self.state.lock().unwrap();
        let now = Utc::now();
        let course_id = Uuid::new_v4();

        let mut module_ids = Vec::with_capacity(outline.modules.len());
        for (module_index, module_outline) in outline.modules.iter().enumerate() {
            let module_id = Uuid::new_v4();
            let mut lesson_ids = Vec::with_capacity(module_outline.lessons.len());
            for lesson_title in &module_outline.lessons {
                let lesson_id = Uuid::new_v4();
                state.lessons.insert(
                    lesson_id,
                    Lesson {
                        id: lesson_id,
                        title: lesson_title.clone(),
                        module_id,
                        objectives: Vec::new(),
                        content: Vec::new(),
                        is_enriched: false,
                        translation: String::new(),
                        created_at: now,
                        updated_at: now,
                    },
                );
                lesson_ids.push(lesson_id);
            }
            state.modules.insert(
                module_id,
                StoredModule {
                    module: Module {
                        id: module_id,
                        title: module_outline.title.clone(),
                        course_id,
                        lessons: Vec::new(),
                        order_index: module_index as i32,
                    },
                    lesson_ids,
                },
            );
            module_ids.push(module_id);
        }

        let seq = state.next_seq;
        state.next_seq += 1;
        let stored = StoredCourse {
            course: Course {
                id: course_id,
                title: outline.title.clone(),
                description: outline.description.clone(),
                creator: owner_id.to_string(),
                tags: outline.tags.clone(),
                modules: Vec::new(),
                saved_by: Vec::new(),
                is_published: false,
                created_at: now,
                updated_at: now,
            },
            module_ids,
            saved_by: Vec::new(),
            seq,
        };
        let course = state.assemble(&stored);
        state.courses.insert(course_id, stored);
        Ok(course)
    }

    async fn get_course(&self, course_id: Uuid) -> PortResult<Course> {
        let state = self.state.lock().unwrap();
        let stored = state
            .courses
            .get(&course_id)
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))?;
        Ok(state.assemble(stored))
    }

    async fn list_courses(&self, owner_id: &str) -> PortResult<Vec<Course>> {
        let state = self.state.lock().unwrap();
        let mut stored: Vec<&StoredCourse> = state
            .courses
            .values()
            .filter(|s| s.course.creator == owner_id)
            .collect();
        stored.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(stored.into_iter().map(|s| state.assemble(s)).collect())
    }

    async fn list_saved(&self, owner_id: &str) -> PortResult<Vec<Course>> {
        let state = self.state.lock().unwrap();
        let mut stored: Vec<&StoredCourse> = state
            .courses
            .values()
            .filter(|s| s.saved_by.iter().any(|o| o == owner_id))
            .collect();
        stored.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(stored.into_iter().map(|s| state.assemble(s)).collect())
    }

    async fn get_module(&self, module_id: Uuid) -> PortResult<Module> {
        let state = self.state.lock().unwrap();
        let stored = state
            .modules
            .get(&module_id)
            .ok_or_else(|| PortError::NotFound(format!("Module {} not found", module_id)))?;
        let mut module = stored.module.clone();
        module.lessons = stored
            .lesson_ids
            .iter()
            .filter_map(|id| state.lessons.get(id))
            .cloned()
            .collect();
        Ok(module)
    }

    async fn get_lesson(&self, lesson_id: Uuid) -> PortResult<Lesson> {
        let state = self.state.lock().unwrap();
        state
            .lessons
            .get(&lesson_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Lesson {} not found", lesson_id)))
    }

    async fn update_lesson(&self, lesson_id: Uuid, patch: LessonPatch) -> PortResult<Lesson> {
        let mut state = self.state.lock().unwrap();
        let lesson = state
            .lessons
            .get_mut(&lesson_id)
            .ok_or_else(|| PortError::NotFound(format!("Lesson {} not found", lesson_id)))?;

        if let Some(title) = patch.title {
            lesson.title = title;
        }
        if let Some(objectives) = patch.objectives {
            lesson.objectives = objectives;
        }
        if let Some(content) = patch.content {
            lesson.content = content;
        }
        if let Some(translation) = patch.translation {
            lesson.translation = translation;
        }
        lesson.updated_at = Utc::now();
        Ok(lesson.clone())
    }

    async fn apply_generated_lesson(
        &self,
        lesson_id: Uuid,
        body: &LessonBody,
    ) -> PortResult<Lesson> {
        let mut state = self.state.lock().unwrap();
        let lesson = state
            .lessons
            .get_mut(&lesson_id)
            .ok_or_else(|| PortError::NotFound(format!("Lesson {} not found", lesson_id)))?;

        lesson.objectives = body.objectives.clone();
        lesson.content = body.content.clone();
        lesson.is_enriched = true;
        lesson.updated_at = Utc::now();
        Ok(lesson.clone())
    }

    async fn toggle_lesson_complete(&self, owner_id: &str, lesson_id: Uuid) -> PortResult<bool> {
        let mut state = self.state.lock().unwrap();
        if !state.lessons.contains_key(&lesson_id) {
            return Err(PortError::NotFound(format!("Lesson {} not found", lesson_id)));
        }

        let key = (owner_id.to_string(), lesson_id);
        if state.completed.remove(&key) {
            Ok(false)
        } else {
            state.completed.insert(key);
            Ok(true)
        }
    }

    async fn save_course(&self, owner_id: &str, course_id: Uuid) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .courses
            .get_mut(&course_id)
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))?;
        if !stored.saved_by.iter().any(|o| o == owner_id) {
            stored.saved_by.push(owner_id.to_string());
        }
        Ok(())
    }

    async fn unsave_course(&self, owner_id: &str, course_id: Uuid) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .courses
            .get_mut(&course_id)
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))?;
        stored.saved_by.retain(|o| o != owner_id);
        Ok(())
    }

    async fn delete_course(&self, course_id: Uuid, requester_id: &str) -> PortResult<()> {
        let mut state = self.state.lock().unwrap();
        let stored = state
            .courses
            .get(&course_id)
            .ok_or_else(|| PortError::NotFound(format!("Course {} not found", course_id)))?;
        if stored.course.creator != requester_id {
            return Err(PortError::Unauthorized);
        }

        let module_ids = stored.module_ids.clone();
        for module_id in module_ids {
            if let Some(module) = state.modules.remove(&module_id) {
                for lesson_id in module.lesson_ids {
                    state.lessons.remove(&lesson_id);
                    state.completed.retain(|(_, l)| *l != lesson_id);
                }
            }
        }
        state.courses.remove(&course_id);
        Ok(())
    }
}
