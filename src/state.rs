//! Shared application state.
//!
//! One `AppState` owns the catalog snapshot, the active view and the player
//! selection. Components receive it behind an `Arc`; nothing in the system
//! reaches for ambient globals.

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use crate::catalog::Course;
use crate::player::{PlayerNavigator, PlayerSelection};

/// Catalog snapshot as observed by the views.
///
/// A failed refresh is a distinct state from an empty catalog, so the home
/// view can tell "no content yet" apart from "the store is unreachable".
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    /// Initial load has not completed yet
    Loading,
    /// Last refresh succeeded; the tree may be empty
    Ready(Vec<Course>),
    /// Last refresh failed
    Failed(String),
}

/// Active screen. View switches are in-memory only; a restart always comes
/// back to the catalog view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    Home,
    Player,
    Admin,
}

struct CatalogSlot {
    /// Sequence number of the installed snapshot
    installed_seq: u64,
    state: CatalogState,
}

/// Single owner of catalog, view and player state.
///
/// The course tree is replaced wholesale on every refresh, so readers see
/// either the old or the new snapshot, never a partially updated one.
/// Refreshes carry a monotonic sequence number and install last-write-wins:
/// a slow fetch that finishes after a newer one cannot regress the tree.
pub struct AppState {
    catalog: RwLock<CatalogSlot>,
    view: RwLock<ViewState>,
    navigator: RwLock<PlayerNavigator>,
    refresh_seq: std::sync::atomic::AtomicU64,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            catalog: RwLock::new(CatalogSlot {
                installed_seq: 0,
                state: CatalogState::Loading,
            }),
            view: RwLock::new(ViewState::Home),
            navigator: RwLock::new(PlayerNavigator::new()),
            refresh_seq: std::sync::atomic::AtomicU64::new(0),
        }
    }

    /// Claim a sequence number for a refresh that is about to start.
    pub fn begin_refresh(&self) -> u64 {
        use std::sync::atomic::Ordering;
        self.refresh_seq.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Install a refreshed tree unless a newer refresh already landed.
    pub async fn install_catalog(&self, seq: u64, courses: Vec<Course>) -> bool {
        let mut slot = self.catalog.write().await;
        if seq <= slot.installed_seq {
            debug!("Discarding stale catalog refresh {}", seq);
            return false;
        }
        slot.installed_seq = seq;
        slot.state = CatalogState::Ready(courses);
        true
    }

    /// Record a failed refresh unless a newer refresh already landed.
    pub async fn install_failure(&self, seq: u64, message: String) -> bool {
        let mut slot = self.catalog.write().await;
        if seq <= slot.installed_seq {
            debug!("Discarding stale catalog failure {}", seq);
            return false;
        }
        slot.installed_seq = seq;
        slot.state = CatalogState::Failed(message);
        true
    }

    pub async fn catalog(&self) -> CatalogState {
        self.catalog.read().await.state.clone()
    }

    /// Courses of the current snapshot; empty while loading or failed.
    pub async fn courses(&self) -> Vec<Course> {
        match &self.catalog.read().await.state {
            CatalogState::Ready(courses) => courses.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn view(&self) -> ViewState {
        *self.view.read().await
    }

    /// Switch screens. Returning to the catalog destroys the player
    /// selection.
    pub async fn set_view(&self, view: ViewState) {
        if view != ViewState::Player {
            self.navigator.write().await.exit_to_catalog();
        }
        *self.view.write().await = view;
    }

    pub async fn selection(&self) -> Option<PlayerSelection> {
        self.navigator.read().await.selection().cloned()
    }

    /// Enter the player for a course, if it has playable content.
    pub async fn select_course(&self, course_id: &str) -> Option<PlayerSelection> {
        let courses = self.courses().await;
        let mut navigator = self.navigator.write().await;
        if navigator.select_course_entry_point(&courses, course_id) {
            *self.view.write().await = ViewState::Player;
            navigator.selection().cloned()
        } else {
            None
        }
    }

    /// Move to another lesson inside the active course.
    pub async fn navigate(&self, module_id: &str, lesson_id: &str) -> Option<PlayerSelection> {
        let courses = self.courses().await;
        let mut navigator = self.navigator.write().await;
        if navigator.navigate(&courses, module_id, lesson_id) {
            navigator.selection().cloned()
        } else {
            None
        }
    }

    /// Leave the player and return to the catalog view.
    pub async fn exit_player(&self) {
        self.navigator.write().await.exit_to_catalog();
        *self.view.write().await = ViewState::Home;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
