//! Content-management command set.
//!
//! Every command is a single remote-store request followed, on success, by
//! a full catalog refresh; there is no partial update path. Commands are
//! independent of each other: nothing serializes concurrent admin actions,
//! the refresh sequence numbers decide which tree ends up displayed.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::catalog::normalize;
use crate::state::AppState;
use crate::storage::{self, MediaStorage, StorageError};
use crate::store::{
    CourseStore, LessonPatch, ModulePatch, NewCourse, NewLesson, NewModule, StoreError,
};

/// Explicit acknowledgement required before a delete command dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Unconfirmed,
}

/// Error types for admin commands.
///
/// Failures are terminal for the one action that caused them; the admin
/// client keeps its form state and may retry.
#[derive(thiserror::Error, Debug)]
pub enum CommandError {
    #[error("deletion requires explicit confirmation")]
    ConfirmationRequired,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Upload(#[from] StorageError),
}

pub type CommandResult<T> = std::result::Result<T, CommandError>;

/// Inputs for creating a course.
#[derive(Debug, Clone)]
pub struct CourseDraft {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub hero_image: Option<String>,
    pub tags: Vec<String>,
}

/// Inputs for creating or editing a lesson.
#[derive(Debug, Clone)]
pub struct LessonDraft {
    pub title: String,
    pub description: String,
    pub duration: String,
    pub video: VideoInput,
    pub thumbnail: ThumbnailInput,
}

/// Where a lesson's video comes from.
#[derive(Debug, Clone)]
pub enum VideoInput {
    /// Pasted link or embed markup, stored as-is
    Reference(String),
    /// Raw file to upload before the record is written
    File(UploadFile),
}

/// Thumbnail for a lesson.
#[derive(Debug, Clone)]
pub enum ThumbnailInput {
    None,
    Address(String),
    File(UploadFile),
}

/// A file received from the admin form.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Executes admin commands against the collaborators and keeps the shared
/// catalog in sync.
pub struct ContentManager {
    store: Arc<dyn CourseStore>,
    storage: Arc<dyn MediaStorage>,
    state: Arc<AppState>,
    cascade_deletes: bool,
}

impl ContentManager {
    pub fn new(
        store: Arc<dyn CourseStore>,
        storage: Arc<dyn MediaStorage>,
        state: Arc<AppState>,
        cascade_deletes: bool,
    ) -> Self {
        Self {
            store,
            storage,
            state,
            cascade_deletes,
        }
    }

    /// Load the catalog from the store and install it into the shared
    /// state. Fetch failures land as a distinct failed state.
    pub async fn refresh_catalog(&self) {
        let seq = self.state.begin_refresh();
        match self.store.fetch_catalog().await {
            Ok(records) => {
                let courses = normalize(records);
                info!("Catalog refreshed: {} courses", courses.len());
                self.state.install_catalog(seq, courses).await;
            }
            Err(e) => {
                error!("Catalog fetch failed: {}", e);
                self.state.install_failure(seq, e.to_string()).await;
            }
        }
    }

    pub async fn create_course(&self, draft: CourseDraft) -> CommandResult<String> {
        let id = Uuid::new_v4().to_string();
        // The thumbnail doubles as the hero image when none was supplied.
        let hero_image = draft
            .hero_image
            .unwrap_or_else(|| draft.thumbnail.clone());

        self.store
            .insert_course(NewCourse {
                id: id.clone(),
                title: draft.title,
                description: draft.description,
                thumbnail: draft.thumbnail,
                hero_image,
                tags: draft.tags,
            })
            .await?;

        info!("Created course {}", id);
        self.refresh_catalog().await;
        Ok(id)
    }

    pub async fn create_module(&self, course_id: &str, title: &str) -> CommandResult<String> {
        let id = Uuid::new_v4().to_string();

        self.store
            .insert_module(NewModule {
                id: id.clone(),
                course_id: course_id.to_string(),
                title: title.to_string(),
            })
            .await?;

        info!("Created module {} in course {}", id, course_id);
        self.refresh_catalog().await;
        Ok(id)
    }

    pub async fn edit_module(&self, module_id: &str, title: &str) -> CommandResult<()> {
        self.store
            .update_module(
                module_id,
                ModulePatch {
                    title: Some(title.to_string()),
                },
            )
            .await?;

        info!("Updated module {}", module_id);
        self.refresh_catalog().await;
        Ok(())
    }

    pub async fn delete_module(
        &self,
        module_id: &str,
        confirmation: Confirmation,
    ) -> CommandResult<()> {
        if confirmation != Confirmation::Confirmed {
            return Err(CommandError::ConfirmationRequired);
        }

        if !self.cascade_deletes {
            self.store.delete_module_lessons(module_id).await?;
        }
        self.store.delete_module(module_id).await?;

        info!("Deleted module {}", module_id);
        self.refresh_catalog().await;
        Ok(())
    }

    pub async fn create_lesson(
        &self,
        course_id: &str,
        module_id: &str,
        draft: LessonDraft,
    ) -> CommandResult<String> {
        let (video_url, thumbnail) = self
            .resolve_media(course_id, draft.video, draft.thumbnail)
            .await?;
        let id = Uuid::new_v4().to_string();

        self.store
            .insert_lesson(NewLesson {
                id: id.clone(),
                module_id: module_id.to_string(),
                title: draft.title,
                description: draft.description,
                video_url,
                duration: draft.duration,
                thumbnail,
            })
            .await?;

        info!("Created lesson {} in module {}", id, module_id);
        self.refresh_catalog().await;
        Ok(id)
    }

    pub async fn edit_lesson(
        &self,
        course_id: &str,
        lesson_id: &str,
        draft: LessonDraft,
    ) -> CommandResult<()> {
        let (video_url, thumbnail) = self
            .resolve_media(course_id, draft.video, draft.thumbnail)
            .await?;

        self.store
            .update_lesson(
                lesson_id,
                LessonPatch {
                    title: Some(draft.title),
                    description: Some(draft.description),
                    video_url: Some(video_url),
                    duration: Some(draft.duration),
                    thumbnail,
                },
            )
            .await?;

        info!("Updated lesson {}", lesson_id);
        self.refresh_catalog().await;
        Ok(())
    }

    pub async fn delete_lesson(
        &self,
        lesson_id: &str,
        confirmation: Confirmation,
    ) -> CommandResult<()> {
        if confirmation != Confirmation::Confirmed {
            return Err(CommandError::ConfirmationRequired);
        }

        self.store.delete_lesson(lesson_id).await?;

        info!("Deleted lesson {}", lesson_id);
        self.refresh_catalog().await;
        Ok(())
    }

    /// Turn draft media into stored addresses.
    ///
    /// Uploads run to completion before any record write; a failed upload
    /// aborts the enclosing command with nothing written to the store.
    async fn resolve_media(
        &self,
        course_id: &str,
        video: VideoInput,
        thumbnail: ThumbnailInput,
    ) -> CommandResult<(String, Option<String>)> {
        let video_url = match video {
            VideoInput::Reference(value) => value,
            VideoInput::File(file) => {
                let path = storage::video_object_path(
                    course_id,
                    &file.filename,
                    Utc::now().timestamp_millis(),
                );
                self.storage
                    .upload(&path, file.bytes, &file.content_type)
                    .await?
            }
        };

        let thumbnail = match thumbnail {
            ThumbnailInput::None => None,
            ThumbnailInput::Address(value) => Some(value),
            ThumbnailInput::File(file) => {
                let path = storage::thumbnail_object_path(
                    course_id,
                    &file.filename,
                    Utc::now().timestamp_millis(),
                );
                Some(
                    self.storage
                        .upload(&path, file.bytes, &file.content_type)
                        .await?,
                )
            }
        };

        Ok((video_url, thumbnail))
    }
}
