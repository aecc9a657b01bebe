//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.
//!
//! Every route identifies the caller by the `x-user-id` header; the value is
//! an opaque owner identifier issued by an external identity system and only
//! its equality matters here.

use crate::generation;
use crate::web::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use coursecraft_core::domain::{Course, Lesson, LessonPatch, VideoResult};
use coursecraft_core::ports::PortError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        generate_course_handler,
        list_courses_handler,
        list_saved_handler,
        get_course_handler,
        delete_course_handler,
        save_course_handler,
        unsave_course_handler,
        generate_lesson_handler,
        get_lesson_handler,
        update_lesson_handler,
        toggle_complete_handler,
        translate_handler,
        search_videos_handler,
    ),
    components(schemas(
        GenerateCourseRequest,
        TranslateRequest,
        CourseEnvelope,
        CourseListEnvelope,
        LessonEnvelope,
        ToggleCompleteEnvelope,
        TranslateEnvelope,
        VideoListEnvelope,
        MessageEnvelope,
    )),
    tags(
        (name = "Coursecraft API", description = "AI-assisted course authoring endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// Error Mapping
//=========================================================================================

/// Wraps a `PortError` so the whole taxonomy maps onto HTTP statuses in one
/// place instead of per handler.
pub struct WebError(PortError);

impl From<PortError> for WebError {
    fn from(e: PortError) -> Self {
        Self(e)
    }
}

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    message: String,
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            PortError::InvalidInput(m) => (StatusCode::BAD_REQUEST, m.clone()),
            PortError::Unauthorized => (
                StatusCode::FORBIDDEN,
                "Not authorized to perform this action".to_string(),
            ),
            PortError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
            PortError::Unavailable(_) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "Generation unavailable".to_string(),
            ),
            PortError::MalformedOutput(_) => (
                StatusCode::BAD_GATEWAY,
                "Malformed generation output".to_string(),
            ),
            PortError::Provider(_) | PortError::Unexpected(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected internal error occurred".to_string(),
            ),
        };
        if status.is_server_error() {
            error!("request failed: {:?}", self.0);
        }
        (
            status,
            Json(ErrorBody {
                success: false,
                message,
            }),
        )
            .into_response()
    }
}

/// Pulls the opaque owner identifier out of the `x-user-id` header.
fn owner_id(headers: &HeaderMap) -> Result<String, WebError> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or_else(|| WebError(PortError::InvalidInput("x-user-id header is required".to_string())))
}

//=========================================================================================
// API Request and Response Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct GenerateCourseRequest {
    topic: String,
}

#[derive(Deserialize, ToSchema)]
pub struct TranslateRequest {
    text: String,
}

#[derive(Deserialize)]
pub struct VideoSearchParams {
    query: String,
    max_results: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct CourseEnvelope {
    success: bool,
    #[schema(value_type = Object)]
    data: Course,
}

#[derive(Serialize, ToSchema)]
pub struct CourseListEnvelope {
    success: bool,
    count: usize,
    #[schema(value_type = Vec<Object>)]
    data: Vec<Course>,
}

#[derive(Serialize, ToSchema)]
pub struct LessonEnvelope {
    success: bool,
    #[schema(value_type = Object)]
    data: Lesson,
}

#[derive(Serialize, ToSchema)]
pub struct ToggleCompleteEnvelope {
    success: bool,
    completed: bool,
}

#[derive(Serialize, ToSchema)]
pub struct TranslateEnvelope {
    success: bool,
    original: String,
    translated: String,
}

#[derive(Serialize, ToSchema)]
pub struct VideoListEnvelope {
    success: bool,
    count: usize,
    #[schema(value_type = Vec<Object>)]
    data: Vec<VideoResult>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageEnvelope {
    success: bool,
    message: String,
}

//=========================================================================================
// Course Handlers
//=========================================================================================

/// Generate and persist a course for a free-text topic.
#[utoipa::path(
    post,
    path = "/api/courses/generate",
    request_body = GenerateCourseRequest,
    responses(
        (status = 201, description = "Course generated and persisted", body = CourseEnvelope),
        (status = 400, description = "Empty topic or missing x-user-id header"),
        (status = 502, description = "Provider returned malformed output"),
        (status = 503, description = "No provider could generate")
    )
)]
pub async fn generate_course_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<GenerateCourseRequest>,
) -> Result<impl IntoResponse, WebError> {
    let owner = owner_id(&headers)?;

    let outline = generation::generate_course_outline(&state.generator, &payload.topic).await?;
    let course = state
        .store
        .create_course_with_structure(&outline, &owner)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CourseEnvelope {
            success: true,
            data: course,
        }),
    ))
}

/// List the caller's own courses, newest first.
#[utoipa::path(
    get,
    path = "/api/courses",
    responses((status = 200, body = CourseListEnvelope))
)]
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, WebError> {
    let owner = owner_id(&headers)?;
    let courses = state.store.list_courses(&owner).await?;
    Ok(Json(CourseListEnvelope {
        success: true,
        count: courses.len(),
        data: courses,
    }))
}

/// List the courses the caller has saved, newest first.
#[utoipa::path(
    get,
    path = "/api/courses/saved",
    responses((status = 200, body = CourseListEnvelope))
)]
pub async fn list_saved_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, WebError> {
    let owner = owner_id(&headers)?;
    let courses = state.store.list_saved(&owner).await?;
    Ok(Json(CourseListEnvelope {
        success: true,
        count: courses.len(),
        data: courses,
    }))
}

/// Fetch one course with its modules and lessons.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses((status = 200, body = CourseEnvelope), (status = 404, description = "Unknown course"))
)]
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    owner_id(&headers)?;
    let course = state.store.get_course(id).await?;
    Ok(Json(CourseEnvelope {
        success: true,
        data: course,
    }))
}

/// Delete a course and everything under it. Creator only.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, body = MessageEnvelope),
        (status = 403, description = "Caller is not the creator"),
        (status = 404, description = "Unknown course")
    )
)]
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let owner = owner_id(&headers)?;
    state.store.delete_course(id, &owner).await?;
    Ok(Json(MessageEnvelope {
        success: true,
        message: "Course deleted successfully".to_string(),
    }))
}

/// Save a course for the caller. Idempotent.
#[utoipa::path(
    post,
    path = "/api/courses/{id}/save",
    params(("id" = Uuid, Path, description = "Course id")),
    responses((status = 200, body = MessageEnvelope), (status = 404, description = "Unknown course"))
)]
pub async fn save_course_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let owner = owner_id(&headers)?;
    state.store.save_course(&owner, id).await?;
    Ok(Json(MessageEnvelope {
        success: true,
        message: "Course saved successfully".to_string(),
    }))
}

/// Remove a course from the caller's saved set. Idempotent.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}/save",
    params(("id" = Uuid, Path, description = "Course id")),
    responses((status = 200, body = MessageEnvelope), (status = 404, description = "Unknown course"))
)]
pub async fn unsave_course_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let owner = owner_id(&headers)?;
    state.store.unsave_course(&owner, id).await?;
    Ok(Json(MessageEnvelope {
        success: true,
        message: "Course unsaved successfully".to_string(),
    }))
}

//=========================================================================================
// Lesson Handlers
//=========================================================================================

/// Generate detailed content for one lesson and persist it on the lesson.
#[utoipa::path(
    post,
    path = "/api/courses/{course_id}/modules/{module_id}/lessons/{lesson_id}/generate",
    params(
        ("course_id" = Uuid, Path, description = "Course id"),
        ("module_id" = Uuid, Path, description = "Module id"),
        ("lesson_id" = Uuid, Path, description = "Lesson id")
    ),
    responses(
        (status = 200, body = LessonEnvelope),
        (status = 404, description = "Unknown course, module, or lesson"),
        (status = 502, description = "Provider returned malformed output"),
        (status = 503, description = "No provider could generate")
    )
)]
pub async fn generate_lesson_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((course_id, module_id, lesson_id)): Path<(Uuid, Uuid, Uuid)>,
) -> Result<impl IntoResponse, WebError> {
    owner_id(&headers)?;

    let course = state.store.get_course(course_id).await?;
    let module = state.store.get_module(module_id).await?;
    let lesson = state.store.get_lesson(lesson_id).await?;

    let body = generation::generate_lesson_body(
        &state.generator,
        &course.title,
        &module.title,
        &lesson.title,
    )
    .await?;

    let updated = state.store.apply_generated_lesson(lesson.id, &body).await?;
    Ok(Json(LessonEnvelope {
        success: true,
        data: updated,
    }))
}

/// Fetch one lesson.
#[utoipa::path(
    get,
    path = "/api/lessons/{id}",
    params(("id" = Uuid, Path, description = "Lesson id")),
    responses((status = 200, body = LessonEnvelope), (status = 404, description = "Unknown lesson"))
)]
pub async fn get_lesson_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    owner_id(&headers)?;
    let lesson = state.store.get_lesson(id).await?;
    Ok(Json(LessonEnvelope {
        success: true,
        data: lesson,
    }))
}

/// Partially update a lesson (title, objectives, content, translation).
#[utoipa::path(
    put,
    path = "/api/lessons/{id}",
    request_body(content = Object, description = "Partial lesson fields to update"),
    responses((status = 200, body = LessonEnvelope), (status = 404, description = "Unknown lesson"))
)]
pub async fn update_lesson_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(patch): Json<LessonPatch>,
) -> Result<impl IntoResponse, WebError> {
    owner_id(&headers)?;
    let lesson = state.store.update_lesson(id, patch).await?;
    Ok(Json(LessonEnvelope {
        success: true,
        data: lesson,
    }))
}

/// Flip the caller's completion mark for a lesson.
#[utoipa::path(
    post,
    path = "/api/lessons/{id}/toggle-complete",
    params(("id" = Uuid, Path, description = "Lesson id")),
    responses((status = 200, body = ToggleCompleteEnvelope), (status = 404, description = "Unknown lesson"))
)]
pub async fn toggle_complete_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, WebError> {
    let owner = owner_id(&headers)?;
    let completed = state.store.toggle_lesson_complete(&owner, id).await?;
    Ok(Json(ToggleCompleteEnvelope {
        success: true,
        completed,
    }))
}

//=========================================================================================
// Utility Handlers
//=========================================================================================

/// Translate free text into the configured secondary language.
#[utoipa::path(
    post,
    path = "/api/translate",
    request_body = TranslateRequest,
    responses(
        (status = 200, body = TranslateEnvelope),
        (status = 400, description = "Empty text"),
        (status = 503, description = "No provider could generate")
    )
)]
pub async fn translate_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<TranslateRequest>,
) -> Result<impl IntoResponse, WebError> {
    let translated = generation::translate(
        &state.generator,
        &payload.text,
        &state.config.translation_language,
    )
    .await?;
    Ok(Json(TranslateEnvelope {
        success: true,
        original: payload.text,
        translated,
    }))
}

/// Search for embeddable educational videos.
#[utoipa::path(
    get,
    path = "/api/videos/search",
    params(
        ("query" = String, Query, description = "Search terms"),
        ("max_results" = Option<u32>, Query, description = "Result cap, defaults to 3")
    ),
    responses(
        (status = 200, body = VideoListEnvelope),
        (status = 400, description = "Missing query"),
        (status = 503, description = "Video search not configured")
    )
)]
pub async fn search_videos_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<VideoSearchParams>,
) -> Result<impl IntoResponse, WebError> {
    if params.query.trim().is_empty() {
        return Err(WebError(PortError::InvalidInput(
            "Query parameter is required".to_string(),
        )));
    }
    let videos = match &state.videos {
        Some(videos) => videos,
        None => {
            return Err(WebError(PortError::Unavailable(
                "video search is not configured".to_string(),
            )))
        }
    };

    let results = videos
        .search(&params.query, params.max_results.unwrap_or(3))
        .await?;
    Ok(Json(VideoListEnvelope {
        success: true,
        count: results.len(),
        data: results,
    }))
}
