//! Player navigation state.
//!
//! Two states: idle (nothing playing) and selected. At most one selection
//! is active at a time; every transition is synchronous.

use serde::Serialize;

use crate::catalog::Course;

/// What is currently playing. Transient: exists only while the player view
/// is active and is destroyed on the way back to the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSelection {
    pub course_id: String,
    pub module_id: String,
    pub lesson_id: String,
}

/// Idle/selected state machine for the player view.
#[derive(Debug, Default)]
pub struct PlayerNavigator {
    selection: Option<PlayerSelection>,
}

impl PlayerNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selection(&self) -> Option<&PlayerSelection> {
        self.selection.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.selection.is_none()
    }

    /// Enter the player at the course's first module and first lesson.
    ///
    /// Courses without playable content are not enterable from the catalog;
    /// the current state is left unchanged and `false` is returned.
    pub fn select_course_entry_point(&mut self, courses: &[Course], course_id: &str) -> bool {
        let Some(course) = courses.iter().find(|c| c.id == course_id) else {
            return false;
        };
        let Some((module, lesson)) = course.first_playable() else {
            return false;
        };

        self.selection = Some(PlayerSelection {
            course_id: course.id.clone(),
            module_id: module.id.clone(),
            lesson_id: lesson.id.clone(),
        });
        true
    }

    /// Move to another lesson inside the active course.
    ///
    /// Requires an active selection; the course stays fixed. Targets that do
    /// not exist in the active course's tree are rejected without a
    /// transition.
    pub fn navigate(&mut self, courses: &[Course], module_id: &str, lesson_id: &str) -> bool {
        let Some(current) = &self.selection else {
            return false;
        };
        let Some(course) = courses.iter().find(|c| c.id == current.course_id) else {
            return false;
        };
        let target_exists = course
            .find_module(module_id)
            .map_or(false, |m| m.lessons.iter().any(|l| l.id == lesson_id));
        if !target_exists {
            return false;
        }

        self.selection = Some(PlayerSelection {
            course_id: current.course_id.clone(),
            module_id: module_id.to_string(),
            lesson_id: lesson_id.to_string(),
        });
        true
    }

    /// Leave the player unconditionally; the selection is destroyed.
    pub fn exit_to_catalog(&mut self) {
        self.selection = None;
    }
}
