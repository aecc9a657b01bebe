//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{DbAdapter, DeepSeekAdapter, GeminiAdapter, OpenAiAdapter, YouTubeAdapter},
    config::Config,
    error::ApiError,
    generation::FallbackOrchestrator,
    web::{
        delete_course_handler, generate_course_handler, generate_lesson_handler,
        get_course_handler, get_lesson_handler, list_courses_handler, list_saved_handler,
        rest::ApiDoc, save_course_handler, search_videos_handler, state::AppState,
        toggle_complete_handler, translate_handler, unsave_course_handler, update_lesson_handler,
    },
};
use async_openai::{config::OpenAIConfig, Client};
use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post},
    Router,
};
use coursecraft_core::ports::{GenerationProvider, VideoSearchService};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let store = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    store.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Generation Fallback Chain ---
    // Only vendors with a configured key join the chain, in priority order.
    let http = reqwest::Client::new();
    let mut providers: Vec<Arc<dyn GenerationProvider>> = Vec::new();
    if let Some(key) = &config.gemini_api_key {
        providers.push(Arc::new(GeminiAdapter::new(
            http.clone(),
            key.clone(),
            config.gemini_model.clone(),
            None,
        )));
    }
    if let Some(key) = &config.openai_api_key {
        let openai_client = Client::with_config(OpenAIConfig::new().with_api_key(key));
        providers.push(Arc::new(OpenAiAdapter::new(
            openai_client,
            config.openai_model.clone(),
        )));
    }
    if let Some(key) = &config.deepseek_api_key {
        providers.push(Arc::new(DeepSeekAdapter::new(
            key,
            config.deepseek_model.clone(),
        )));
    }
    let generator = Arc::new(FallbackOrchestrator::new(providers));
    info!(
        providers = ?generator.provider_names(),
        "Generation fallback chain configured"
    );

    let videos: Option<Arc<dyn VideoSearchService>> = config.youtube_api_key.as_ref().map(|key| {
        Arc::new(YouTubeAdapter::new(http.clone(), key.clone(), None)) as Arc<dyn VideoSearchService>
    });

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        store,
        generator,
        videos,
        config: config.clone(),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {e}")))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT, HeaderName::from_static("x-user-id")]);

    // --- 5. Create the Web Router ---
    let api_router = Router::new()
        .route("/api/courses/generate", post(generate_course_handler))
        .route("/api/courses", get(list_courses_handler))
        .route("/api/courses/saved", get(list_saved_handler))
        .route(
            "/api/courses/{id}",
            get(get_course_handler).delete(delete_course_handler),
        )
        .route(
            "/api/courses/{id}/save",
            post(save_course_handler).delete(unsave_course_handler),
        )
        .route(
            "/api/courses/{course_id}/modules/{module_id}/lessons/{lesson_id}/generate",
            post(generate_lesson_handler),
        )
        .route(
            "/api/lessons/{id}",
            get(get_lesson_handler).put(update_lesson_handler),
        )
        .route("/api/lessons/{id}/toggle-complete", post(toggle_complete_handler))
        .route("/api/translate", post(translate_handler))
        .route("/api/videos/search", get(search_videos_handler))
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
