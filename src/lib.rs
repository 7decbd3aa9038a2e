//! CourseCast - video course platform backend
//!
//! Catalog, player and content-management core for a video-course web
//! application. The relational store, the media bucket and the
//! generative-metadata service are external collaborators reached over HTTP.

pub mod api;
pub mod catalog;
pub mod config;
pub mod content;
pub mod llm;
pub mod player;
pub mod state;
pub mod storage;
pub mod store;

// Re-export main types for easy access
pub use crate::catalog::{normalize, Course, Lesson, Module};
pub use crate::config::Config;
pub use crate::content::{Confirmation, ContentManager};
pub use crate::llm::metadata::{LessonDetails, MetadataGenerator};
pub use crate::llm::{LLMConfig, LLMProvider};
pub use crate::player::{PlayerNavigator, PlayerSelection, SourceKind, VideoSource, VideoSourceResolver};
pub use crate::state::{AppState, CatalogState, ViewState};
pub use crate::storage::{BucketStorage, MediaStorage};
pub use crate::store::{CourseStore, RestStore};
