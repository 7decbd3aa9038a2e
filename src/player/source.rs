//! Video-source classification.
//!
//! A lesson stores its video reference as an opaque string. Classification
//! happens exactly once, here; everything downstream switches over the
//! resulting variant instead of re-inspecting the string.

use regex::Regex;
use serde::Serialize;

/// Render decision for a lesson's stored video reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum VideoSource {
    /// Caller-supplied markup, rendered verbatim. The admin is trusted to
    /// paste well-formed markup; no sanitization is performed.
    EmbedMarkup(String),
    /// Eleven-character identifier of a video on the hosted platform.
    HostedVideo(String),
    /// Address assumed to point straight at a playable media file. Load
    /// failures are reported inline by the media element at render time.
    DirectMedia(String),
}

/// How the admin form should present an existing reference for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Embed,
    StoredFile,
    ExternalLink,
}

/// Classifies video references. Holds the compiled hosted-platform pattern.
#[derive(Debug, Clone)]
pub struct VideoSourceResolver {
    hosted_pattern: Regex,
}

impl VideoSourceResolver {
    pub fn new() -> Self {
        // Tolerates scheme-less and www-less input; covers watch links with
        // query v=, youtu.be short links, /shorts/, /embed/ and /v/ paths.
        let hosted_pattern = Regex::new(
            r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:shorts/|(?:v|e(?:mbed)?)/|[^/\n\s]+/\S+/|\S*?[?&]v=)|youtu\.be/)([A-Za-z0-9_-]{11})",
        )
        .expect("hosted video pattern is valid");

        Self { hosted_pattern }
    }

    /// Classify a raw reference into exactly one source variant.
    ///
    /// Precedence: embed markup (cheap prefix test), then the hosted-video
    /// pattern, then the direct-media fallback. Empty and malformed strings
    /// fall through to `DirectMedia`.
    pub fn resolve(&self, reference: &str) -> VideoSource {
        if reference.trim_start().starts_with('<') {
            return VideoSource::EmbedMarkup(reference.to_string());
        }

        if let Some(id) = self.hosted_id(reference) {
            return VideoSource::HostedVideo(id);
        }

        VideoSource::DirectMedia(reference.to_string())
    }

    /// Extract the hosted-platform identifier, if the reference matches.
    pub fn hosted_id(&self, reference: &str) -> Option<String> {
        self.hosted_pattern
            .captures(reference)
            .map(|captures| captures[1].to_string())
    }

    /// Classify an existing reference for the admin edit form.
    ///
    /// References under the storage endpoint, or without a scheme at all,
    /// are treated as previously uploaded files.
    pub fn classify_for_editing(&self, reference: &str, storage_endpoint: &str) -> SourceKind {
        if reference.trim_start().starts_with('<') {
            return SourceKind::Embed;
        }

        let stored = (!storage_endpoint.is_empty()
            && reference.contains(storage_endpoint)
            && self.hosted_id(reference).is_none())
            || (!reference.is_empty() && !reference.contains("http"));
        if stored {
            SourceKind::StoredFile
        } else {
            SourceKind::ExternalLink
        }
    }
}

impl Default for VideoSourceResolver {
    fn default() -> Self {
        Self::new()
    }
}
