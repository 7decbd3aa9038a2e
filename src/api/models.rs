//! API request payloads and admin form parsing.

use axum::extract::Multipart;
use serde::Deserialize;

use crate::content::{LessonDraft, ThumbnailInput, UploadFile, VideoInput};
use crate::state::ViewState;

#[derive(Debug, Deserialize)]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateModuleRequest {
    pub course_id: String,
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct EditModuleRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    pub title: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    pub course_id: String,
}

#[derive(Debug, Deserialize)]
pub struct NavigateRequest {
    pub module_id: String,
    pub lesson_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
    pub view: ViewState,
}

/// Delete endpoints require `?confirm=true`; anything else is rejected
/// before a request reaches the store.
#[derive(Debug, Deserialize)]
pub struct DeleteParams {
    #[serde(default)]
    pub confirm: bool,
}

/// Admin lesson form, submitted as multipart so files travel with the
/// text fields.
#[derive(Debug, Default)]
pub struct LessonForm {
    pub course_id: Option<String>,
    pub module_id: Option<String>,
    pub title: String,
    pub description: String,
    pub duration: String,
    pub video_reference: Option<String>,
    pub video_file: Option<UploadFile>,
    pub thumbnail_url: Option<String>,
    pub thumbnail_file: Option<UploadFile>,
}

impl LessonForm {
    /// Turn the form into command inputs. A lesson needs a video file or a
    /// non-empty reference; the thumbnail is optional.
    pub fn into_draft(self) -> Result<LessonDraft, String> {
        let video = match (self.video_file, self.video_reference) {
            (Some(file), _) => VideoInput::File(file),
            (None, Some(reference)) if !reference.is_empty() => VideoInput::Reference(reference),
            _ => return Err("a video file or video_reference is required".to_string()),
        };

        let thumbnail = match (self.thumbnail_file, self.thumbnail_url) {
            (Some(file), _) => ThumbnailInput::File(file),
            (None, Some(url)) if !url.is_empty() => ThumbnailInput::Address(url),
            _ => ThumbnailInput::None,
        };

        Ok(LessonDraft {
            title: self.title,
            description: self.description,
            duration: self.duration,
            video,
            thumbnail,
        })
    }
}

/// Read the multipart admin form field by field.
pub async fn read_lesson_form(multipart: &mut Multipart) -> Result<LessonForm, String> {
    let mut form = LessonForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("invalid multipart body: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video_file" | "thumbnail_file" => {
                let filename = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("failed reading {}: {}", name, e))?
                    .to_vec();

                let file = UploadFile {
                    filename,
                    content_type,
                    bytes,
                };
                if name == "video_file" {
                    form.video_file = Some(file);
                } else {
                    form.thumbnail_file = Some(file);
                }
            }
            _ => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| format!("failed reading {}: {}", name, e))?;
                match name.as_str() {
                    "course_id" => form.course_id = Some(value),
                    "module_id" => form.module_id = Some(value),
                    "title" => form.title = value,
                    "description" => form.description = value,
                    "duration" => form.duration = value,
                    "video_reference" => form.video_reference = Some(value),
                    "thumbnail_url" => form.thumbnail_url = Some(value),
                    _ => {}
                }
            }
        }
    }

    Ok(form)
}
