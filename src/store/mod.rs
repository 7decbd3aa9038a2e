//! Remote relational store collaborator.
//!
//! The store owns three record collections (courses, modules, lessons) and
//! enforces its own referential rules; this module only defines the
//! operations the catalog core needs from it.

pub mod rest;

pub use rest::RestStore;

use async_trait::async_trait;
use serde::Serialize;

use crate::catalog::CourseRecord;

/// Error types for remote store operations.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("store request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("store returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// New course row. The identifier is generated by the caller.
#[derive(Debug, Clone, Serialize)]
pub struct NewCourse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub hero_image: String,
    pub tags: Vec<String>,
}

/// New module row, referencing its owning course.
#[derive(Debug, Clone, Serialize)]
pub struct NewModule {
    pub id: String,
    pub course_id: String,
    pub title: String,
}

/// New lesson row, referencing its owning module.
#[derive(Debug, Clone, Serialize)]
pub struct NewLesson {
    pub id: String,
    pub module_id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Partial module update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModulePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Partial lesson update; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LessonPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
}

/// Operations the catalog core needs from the remote store.
///
/// `created_at` is assigned by the store on insert; the normalizer relies
/// on it for ordering.
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Nested-join read of the full catalog.
    async fn fetch_catalog(&self) -> StoreResult<Vec<CourseRecord>>;

    async fn insert_course(&self, course: NewCourse) -> StoreResult<()>;

    async fn insert_module(&self, module: NewModule) -> StoreResult<()>;

    async fn update_module(&self, module_id: &str, patch: ModulePatch) -> StoreResult<()>;

    async fn delete_module(&self, module_id: &str) -> StoreResult<()>;

    async fn insert_lesson(&self, lesson: NewLesson) -> StoreResult<()>;

    async fn update_lesson(&self, lesson_id: &str, patch: LessonPatch) -> StoreResult<()>;

    async fn delete_lesson(&self, lesson_id: &str) -> StoreResult<()>;

    /// Remove every lesson belonging to a module. Used when the store does
    /// not cascade module deletion itself.
    async fn delete_module_lessons(&self, module_id: &str) -> StoreResult<()>;
}
