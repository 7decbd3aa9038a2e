//! Object-storage collaborator for media uploads.
//!
//! Uploads return a publicly resolvable address which is then written into
//! the lesson record. Object paths are namespaced by course identifier plus
//! an upload timestamp to avoid collisions.

pub mod bucket;

pub use bucket::BucketStorage;

use async_trait::async_trait;

/// Error types for upload operations.
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("upload request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage returned {status}: {body}")]
    Rejected { status: u16, body: String },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Accepts a binary payload at a caller-chosen path and hands back a public
/// address for it.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;
}

/// Object path for an uploaded lesson video.
pub fn video_object_path(course_id: &str, filename: &str, uploaded_at_millis: i64) -> String {
    format!(
        "{}/{}.{}",
        course_id,
        uploaded_at_millis,
        file_extension(filename)
    )
}

/// Object path for an uploaded thumbnail image. Thumbnails share the video
/// bucket under a dedicated folder.
pub fn thumbnail_object_path(course_id: &str, filename: &str, uploaded_at_millis: i64) -> String {
    format!(
        "thumbnails/{}_{}.{}",
        course_id,
        uploaded_at_millis,
        file_extension(filename)
    )
}

fn file_extension(filename: &str) -> &str {
    filename.rsplit('.').next().unwrap_or(filename)
}
