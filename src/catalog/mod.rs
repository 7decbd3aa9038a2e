//! Course catalog data model.
//!
//! The tree built here is the single authoritative in-memory copy of the
//! remote catalog; views receive read-only snapshots of it.

pub mod normalize;

pub use normalize::{normalize, CourseRecord, LessonRecord, ModuleRecord};

use serde::{Deserialize, Serialize};

/// Top-level content unit containing ordered modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
    pub hero_image: Option<String>,
    pub tags: Vec<String>,
    pub modules: Vec<Module>,
}

/// Named grouping of lessons within a course. Ordered by creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: String,
    pub title: String,
    pub lessons: Vec<Lesson>,
}

/// Leaf content unit with a video reference, description and duration.
///
/// The duration is free-form short text and is not validated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: String,
    pub duration: String,
    pub thumbnail: Option<String>,
}

impl Course {
    /// Entry point for playback: the first module's first lesson.
    ///
    /// A course whose first module is empty has no entry point, even if a
    /// later module holds lessons.
    pub fn first_playable(&self) -> Option<(&Module, &Lesson)> {
        let module = self.modules.first()?;
        let lesson = module.lessons.first()?;
        Some((module, lesson))
    }

    pub fn find_module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    pub fn find_lesson(&self, lesson_id: &str) -> Option<(&Module, &Lesson)> {
        self.modules.iter().find_map(|m| {
            m.lessons
                .iter()
                .find(|l| l.id == lesson_id)
                .map(|l| (m, l))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: format!("Lesson {}", id),
            description: String::new(),
            video_url: "https://example.com/v.mp4".to_string(),
            duration: "10:00".to_string(),
            thumbnail: None,
        }
    }

    #[test]
    fn first_playable_requires_lesson_in_first_module() {
        let course = Course {
            id: "c1".to_string(),
            title: "Course".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            hero_image: None,
            tags: vec![],
            modules: vec![
                Module {
                    id: "m1".to_string(),
                    title: "Empty".to_string(),
                    lessons: vec![],
                },
                Module {
                    id: "m2".to_string(),
                    title: "Full".to_string(),
                    lessons: vec![lesson("l1")],
                },
            ],
        };

        assert!(course.first_playable().is_none());
    }

    #[test]
    fn first_playable_returns_first_module_first_lesson() {
        let course = Course {
            id: "c1".to_string(),
            title: "Course".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            hero_image: None,
            tags: vec![],
            modules: vec![Module {
                id: "m1".to_string(),
                title: "Intro".to_string(),
                lessons: vec![lesson("l1"), lesson("l2")],
            }],
        };

        let (module, lesson) = course.first_playable().expect("playable course");
        assert_eq!(module.id, "m1");
        assert_eq!(lesson.id, "l1");
    }
}
