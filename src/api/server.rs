//! HTTP server implementation for the API

use anyhow::Result;
use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::{handlers, models};
use crate::content::{CommandError, Confirmation, ContentManager};
use crate::llm::metadata::MetadataGenerator;
use crate::player::VideoSourceResolver;
use crate::state::AppState;

/// Shared application context handed to every route.
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<AppState>,
    pub content: Arc<ContentManager>,
    pub metadata: Arc<MetadataGenerator>,
    pub resolver: Arc<VideoSourceResolver>,
    /// Storage endpoint, used to recognize previously uploaded files
    pub storage_endpoint: String,
}

/// Configure and start the HTTP server
pub async fn start_http_server(context: AppContext, host: &str, port: u16) -> Result<()> {
    info!("Starting HTTP server on port {}", port);

    // Allow browser access from any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let app = build_router(context).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    );

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
    info!("API server listening on http://{}:{}", host, port);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
pub fn build_router(context: AppContext) -> Router {
    Router::new()
        // Health check endpoints (both paths for compatibility)
        .route("/health", get(health_handler))
        .route("/api/health", get(health_handler))
        // Catalog/home view
        .route("/api/catalog", get(catalog_handler))
        .route("/api/catalog/refresh", post(refresh_handler))
        .route("/api/catalog/featured", get(featured_handler))
        // Admin commands
        .route("/api/courses", post(create_course_handler))
        .route("/api/modules", post(create_module_handler))
        .route(
            "/api/modules/:id",
            put(edit_module_handler).delete(delete_module_handler),
        )
        .route("/api/lessons", post(create_lesson_handler))
        .route(
            "/api/lessons/:id",
            put(edit_lesson_handler).delete(delete_lesson_handler),
        )
        .route("/api/lessons/:id/source", get(lesson_source_handler))
        .route("/api/lessons/metadata", post(metadata_handler))
        // Player view
        .route("/api/player", get(player_handler))
        .route("/api/player/select", post(select_handler))
        .route("/api/player/navigate", post(navigate_handler))
        .route("/api/player/exit", post(exit_handler))
        // View switching
        .route("/api/view", get(view_handler).post(set_view_handler))
        .layer(DefaultBodyLimit::max(512 * 1024 * 1024))
        .with_state(context)
}

fn command_error_response(error: CommandError) -> Response {
    let status = match error {
        CommandError::ConfirmationRequired => StatusCode::BAD_REQUEST,
        CommandError::Store(_) | CommandError::Upload(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(json!({"error": error.to_string()}))).into_response()
}

fn unprocessable(message: String) -> Response {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({"error": message})),
    )
        .into_response()
}

fn confirmation_from(params: &models::DeleteParams) -> Confirmation {
    if params.confirm {
        Confirmation::Confirmed
    } else {
        Confirmation::Unconfirmed
    }
}

/// Health check handler
async fn health_handler() -> impl IntoResponse {
    Json(handlers::health_check())
}

async fn catalog_handler(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(handlers::catalog_overview(&ctx.state).await)
}

async fn refresh_handler(State(ctx): State<AppContext>) -> impl IntoResponse {
    ctx.content.refresh_catalog().await;
    Json(handlers::catalog_overview(&ctx.state).await)
}

async fn featured_handler(State(ctx): State<AppContext>) -> Response {
    match handlers::featured_course(&ctx.state).await {
        Some(course) => Json(course).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "no courses available"})),
        )
            .into_response(),
    }
}

async fn create_course_handler(
    State(ctx): State<AppContext>,
    Json(request): Json<models::CreateCourseRequest>,
) -> Response {
    let draft = crate::content::CourseDraft {
        title: request.title,
        description: request.description,
        thumbnail: request.thumbnail,
        hero_image: request.hero_image,
        tags: request.tags,
    };

    match ctx.content.create_course(draft).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({"id": id}))).into_response(),
        Err(e) => command_error_response(e),
    }
}

async fn create_module_handler(
    State(ctx): State<AppContext>,
    Json(request): Json<models::CreateModuleRequest>,
) -> Response {
    match ctx
        .content
        .create_module(&request.course_id, &request.title)
        .await
    {
        Ok(id) => (StatusCode::CREATED, Json(json!({"id": id}))).into_response(),
        Err(e) => command_error_response(e),
    }
}

async fn edit_module_handler(
    State(ctx): State<AppContext>,
    Path(module_id): Path<String>,
    Json(request): Json<models::EditModuleRequest>,
) -> Response {
    match ctx.content.edit_module(&module_id, &request.title).await {
        Ok(()) => Json(json!({"id": module_id})).into_response(),
        Err(e) => command_error_response(e),
    }
}

async fn delete_module_handler(
    State(ctx): State<AppContext>,
    Path(module_id): Path<String>,
    Query(params): Query<models::DeleteParams>,
) -> Response {
    match ctx
        .content
        .delete_module(&module_id, confirmation_from(&params))
        .await
    {
        Ok(()) => Json(json!({"deleted": module_id})).into_response(),
        Err(e) => command_error_response(e),
    }
}

async fn create_lesson_handler(
    State(ctx): State<AppContext>,
    mut multipart: Multipart,
) -> Response {
    let form = match models::read_lesson_form(&mut multipart).await {
        Ok(form) => form,
        Err(message) => return unprocessable(message),
    };

    let (Some(course_id), Some(module_id)) = (form.course_id.clone(), form.module_id.clone())
    else {
        return unprocessable("course_id and module_id are required".to_string());
    };

    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(message) => return unprocessable(message),
    };

    match ctx.content.create_lesson(&course_id, &module_id, draft).await {
        Ok(id) => (StatusCode::CREATED, Json(json!({"id": id}))).into_response(),
        Err(e) => command_error_response(e),
    }
}

async fn edit_lesson_handler(
    State(ctx): State<AppContext>,
    Path(lesson_id): Path<String>,
    mut multipart: Multipart,
) -> Response {
    let form = match models::read_lesson_form(&mut multipart).await {
        Ok(form) => form,
        Err(message) => return unprocessable(message),
    };

    // The course id namespaces any upload that happens during the edit.
    let Some(course_id) = form.course_id.clone() else {
        return unprocessable("course_id is required".to_string());
    };

    let draft = match form.into_draft() {
        Ok(draft) => draft,
        Err(message) => return unprocessable(message),
    };

    match ctx.content.edit_lesson(&course_id, &lesson_id, draft).await {
        Ok(()) => Json(json!({"id": lesson_id})).into_response(),
        Err(e) => command_error_response(e),
    }
}

async fn delete_lesson_handler(
    State(ctx): State<AppContext>,
    Path(lesson_id): Path<String>,
    Query(params): Query<models::DeleteParams>,
) -> Response {
    match ctx
        .content
        .delete_lesson(&lesson_id, confirmation_from(&params))
        .await
    {
        Ok(()) => Json(json!({"deleted": lesson_id})).into_response(),
        Err(e) => command_error_response(e),
    }
}

async fn lesson_source_handler(
    State(ctx): State<AppContext>,
    Path(lesson_id): Path<String>,
) -> Response {
    match handlers::lesson_source(&ctx.state, &ctx.resolver, &ctx.storage_endpoint, &lesson_id)
        .await
    {
        Some(source) => Json(source).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "lesson not found"})),
        )
            .into_response(),
    }
}

/// Metadata drafting never fails; fallback values come back on any error.
async fn metadata_handler(
    State(ctx): State<AppContext>,
    Json(request): Json<models::MetadataRequest>,
) -> impl IntoResponse {
    let details = ctx.metadata.generate(&request.title, &request.context).await;
    Json(details)
}

async fn player_handler(State(ctx): State<AppContext>) -> Response {
    match handlers::player_view(&ctx.state, &ctx.resolver).await {
        Some(view) => Json(view).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "player is idle"})),
        )
            .into_response(),
    }
}

async fn select_handler(
    State(ctx): State<AppContext>,
    Json(request): Json<models::SelectRequest>,
) -> impl IntoResponse {
    // Courses without playable content do not transition; selection stays
    // null in the response.
    let selection = ctx.state.select_course(&request.course_id).await;
    Json(json!({"selection": selection}))
}

async fn navigate_handler(
    State(ctx): State<AppContext>,
    Json(request): Json<models::NavigateRequest>,
) -> impl IntoResponse {
    let selection = ctx
        .state
        .navigate(&request.module_id, &request.lesson_id)
        .await;
    Json(json!({"selection": selection}))
}

async fn exit_handler(State(ctx): State<AppContext>) -> impl IntoResponse {
    ctx.state.exit_player().await;
    Json(json!({"view": crate::state::ViewState::Home}))
}

async fn view_handler(State(ctx): State<AppContext>) -> impl IntoResponse {
    Json(json!({"view": ctx.state.view().await}))
}

async fn set_view_handler(
    State(ctx): State<AppContext>,
    Json(request): Json<models::ViewRequest>,
) -> impl IntoResponse {
    ctx.state.set_view(request.view).await;
    Json(json!({"view": request.view}))
}
