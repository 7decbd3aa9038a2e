//! Wire-record deserialization and tree normalization.
//!
//! The remote store returns courses with nested module and lesson
//! collections. All field aliasing and defaulting happens here; the rest of
//! the system only ever sees the typed tree.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{Course, Lesson, Module};

/// Course row as returned by the nested-join read.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub hero_image: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub modules: Option<Vec<ModuleRecord>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Module row, optionally embedding its lessons.
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub course_id: Option<String>,
    #[serde(default)]
    pub lessons: Option<Vec<LessonRecord>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Lesson row.
#[derive(Debug, Clone, Deserialize)]
pub struct LessonRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub video_url: String,
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub module_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Build the ordered course tree from raw store records.
///
/// Modules and lessons are sorted ascending by creation time; records
/// without a timestamp sort first. The sort is stable, so ties keep their
/// input order. Missing nested collections are treated as empty.
pub fn normalize(records: Vec<CourseRecord>) -> Vec<Course> {
    records.into_iter().map(normalize_course).collect()
}

fn normalize_course(record: CourseRecord) -> Course {
    let mut modules = record.modules.unwrap_or_default();
    modules.sort_by_key(|m| m.created_at);

    Course {
        id: record.id,
        title: record.title,
        description: record.description,
        thumbnail: record.thumbnail,
        hero_image: record.hero_image,
        tags: record.tags.unwrap_or_default(),
        modules: modules.into_iter().map(normalize_module).collect(),
    }
}

fn normalize_module(record: ModuleRecord) -> Module {
    let mut lessons = record.lessons.unwrap_or_default();
    lessons.sort_by_key(|l| l.created_at);

    Module {
        id: record.id,
        title: record.title,
        lessons: lessons.into_iter().map(normalize_lesson).collect(),
    }
}

fn normalize_lesson(record: LessonRecord) -> Lesson {
    Lesson {
        id: record.id,
        title: record.title,
        description: record.description,
        video_url: record.video_url,
        duration: record.duration,
        thumbnail: record.thumbnail,
    }
}
