//! View logic behind the HTTP routes.

use serde_json::{json, Value};

use crate::catalog::Course;
use crate::player::VideoSourceResolver;
use crate::state::{AppState, CatalogState};

/// Health check payload
pub fn health_check() -> Value {
    json!({
        "status": "healthy",
        "service": "coursecast",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

/// Catalog/home view: load status plus the course tree.
pub async fn catalog_overview(state: &AppState) -> Value {
    match state.catalog().await {
        CatalogState::Loading => json!({
            "status": "loading",
            "courses": []
        }),
        CatalogState::Ready(courses) => json!({
            "status": "ready",
            "courses": courses
        }),
        CatalogState::Failed(message) => json!({
            "status": "failed",
            "error": message,
            "courses": []
        }),
    }
}

/// The hero-featured course is simply the first one in the catalog.
pub async fn featured_course(state: &AppState) -> Option<Course> {
    state.courses().await.into_iter().next()
}

/// Player view: active selection, resolved video source and the sidebar
/// tree used for in-course navigation.
pub async fn player_view(state: &AppState, resolver: &VideoSourceResolver) -> Option<Value> {
    let selection = state.selection().await?;
    let courses = state.courses().await;
    let course = courses.iter().find(|c| c.id == selection.course_id)?;
    let module = course.find_module(&selection.module_id)?;
    let lesson = module.lessons.iter().find(|l| l.id == selection.lesson_id)?;

    Some(json!({
        "selection": selection,
        "course_title": course.title,
        "module_title": module.title,
        "lesson": lesson,
        "source": resolver.resolve(&lesson.video_url),
        "sidebar": course.modules,
    }))
}

/// Admin edit prefill: how an existing lesson's reference should be shown.
pub async fn lesson_source(
    state: &AppState,
    resolver: &VideoSourceResolver,
    storage_endpoint: &str,
    lesson_id: &str,
) -> Option<Value> {
    let courses = state.courses().await;
    courses.iter().find_map(|course| {
        course.find_lesson(lesson_id).map(|(_, lesson)| {
            json!({
                "reference": lesson.video_url,
                "kind": resolver.classify_for_editing(&lesson.video_url, storage_endpoint),
            })
        })
    })
}
