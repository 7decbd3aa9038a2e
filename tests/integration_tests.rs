use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::DateTime;

use coursecast_rust::catalog::{CourseRecord, LessonRecord, ModuleRecord};
use coursecast_rust::content::{
    CommandError, Confirmation, ContentManager, CourseDraft, LessonDraft, ThumbnailInput,
    UploadFile, VideoInput,
};
use coursecast_rust::state::{AppState, CatalogState};
use coursecast_rust::storage::{MediaStorage, StorageError, StorageResult};
use coursecast_rust::store::{
    CourseStore, LessonPatch, ModulePatch, NewCourse, NewLesson, NewModule, StoreError,
    StoreResult,
};

/// In-memory stand-in for the remote relational store. Records keep an
/// insertion counter that doubles as their creation timestamp; the catalog
/// read returns nested collections in reverse insertion order to mimic an
/// unordered store payload.
#[derive(Default)]
struct MemoryStore {
    courses: Mutex<Vec<NewCourse>>,
    modules: Mutex<Vec<(NewModule, i64)>>,
    lessons: Mutex<Vec<(NewLesson, i64)>>,
    counter: AtomicI64,
    fail_fetch: AtomicBool,
    calls: Mutex<Vec<String>>,
}

impl MemoryStore {
    fn next_stamp(&self) -> i64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn record_call(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn lesson_count(&self) -> usize {
        self.lessons.lock().unwrap().len()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn fetch_catalog(&self) -> StoreResult<Vec<CourseRecord>> {
        self.record_call("fetch_catalog");
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(StoreError::Rejected {
                status: 503,
                body: "store unavailable".to_string(),
            });
        }

        let courses = self.courses.lock().unwrap().clone();
        let modules = self.modules.lock().unwrap().clone();
        let lessons = self.lessons.lock().unwrap().clone();

        let records = courses
            .iter()
            .map(|course| CourseRecord {
                id: course.id.clone(),
                title: course.title.clone(),
                description: course.description.clone(),
                thumbnail: course.thumbnail.clone(),
                hero_image: Some(course.hero_image.clone()),
                tags: Some(course.tags.clone()),
                modules: Some(
                    modules
                        .iter()
                        .rev()
                        .filter(|(m, _)| m.course_id == course.id)
                        .map(|(m, stamp)| ModuleRecord {
                            id: m.id.clone(),
                            title: m.title.clone(),
                            course_id: Some(m.course_id.clone()),
                            lessons: Some(
                                lessons
                                    .iter()
                                    .rev()
                                    .filter(|(l, _)| l.module_id == m.id)
                                    .map(|(l, stamp)| LessonRecord {
                                        id: l.id.clone(),
                                        title: l.title.clone(),
                                        description: l.description.clone(),
                                        video_url: l.video_url.clone(),
                                        duration: l.duration.clone(),
                                        thumbnail: l.thumbnail.clone(),
                                        module_id: Some(l.module_id.clone()),
                                        created_at: DateTime::from_timestamp(*stamp, 0),
                                    })
                                    .collect(),
                            ),
                            created_at: DateTime::from_timestamp(*stamp, 0),
                        })
                        .collect(),
                ),
                created_at: None,
            })
            .collect();

        Ok(records)
    }

    async fn insert_course(&self, course: NewCourse) -> StoreResult<()> {
        self.record_call("insert_course");
        self.courses.lock().unwrap().push(course);
        Ok(())
    }

    async fn insert_module(&self, module: NewModule) -> StoreResult<()> {
        self.record_call("insert_module");
        let stamp = self.next_stamp();
        self.modules.lock().unwrap().push((module, stamp));
        Ok(())
    }

    async fn update_module(&self, module_id: &str, patch: ModulePatch) -> StoreResult<()> {
        self.record_call("update_module");
        let mut modules = self.modules.lock().unwrap();
        for (module, _) in modules.iter_mut() {
            if module.id == module_id {
                if let Some(title) = &patch.title {
                    module.title = title.clone();
                }
            }
        }
        Ok(())
    }

    async fn delete_module(&self, module_id: &str) -> StoreResult<()> {
        self.record_call("delete_module");
        self.modules.lock().unwrap().retain(|(m, _)| m.id != module_id);
        Ok(())
    }

    async fn insert_lesson(&self, lesson: NewLesson) -> StoreResult<()> {
        self.record_call("insert_lesson");
        let stamp = self.next_stamp();
        self.lessons.lock().unwrap().push((lesson, stamp));
        Ok(())
    }

    async fn update_lesson(&self, lesson_id: &str, patch: LessonPatch) -> StoreResult<()> {
        self.record_call("update_lesson");
        let mut lessons = self.lessons.lock().unwrap();
        for (lesson, _) in lessons.iter_mut() {
            if lesson.id == lesson_id {
                if let Some(title) = &patch.title {
                    lesson.title = title.clone();
                }
                if let Some(video_url) = &patch.video_url {
                    lesson.video_url = video_url.clone();
                }
                if let Some(duration) = &patch.duration {
                    lesson.duration = duration.clone();
                }
            }
        }
        Ok(())
    }

    async fn delete_lesson(&self, lesson_id: &str) -> StoreResult<()> {
        self.record_call("delete_lesson");
        self.lessons.lock().unwrap().retain(|(l, _)| l.id != lesson_id);
        Ok(())
    }

    async fn delete_module_lessons(&self, module_id: &str) -> StoreResult<()> {
        self.record_call("delete_module_lessons");
        self.lessons
            .lock()
            .unwrap()
            .retain(|(l, _)| l.module_id != module_id);
        Ok(())
    }
}

/// In-memory stand-in for the media bucket.
#[derive(Default)]
struct MemoryStorage {
    uploads: Mutex<Vec<String>>,
    fail: AtomicBool,
}

#[async_trait]
impl MediaStorage for MemoryStorage {
    async fn upload(
        &self,
        path: &str,
        _bytes: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                status: 500,
                body: "bucket unavailable".to_string(),
            });
        }
        self.uploads.lock().unwrap().push(path.to_string());
        Ok(format!("https://cdn.test/{}", path))
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    storage: Arc<MemoryStorage>,
    state: Arc<AppState>,
    content: ContentManager,
}

fn harness(cascade_deletes: bool) -> Harness {
    let store = Arc::new(MemoryStore::default());
    let storage = Arc::new(MemoryStorage::default());
    let state = Arc::new(AppState::new());
    let content = ContentManager::new(
        store.clone(),
        storage.clone(),
        state.clone(),
        cascade_deletes,
    );

    Harness {
        store,
        storage,
        state,
        content,
    }
}

fn course_draft(title: &str) -> CourseDraft {
    CourseDraft {
        title: title.to_string(),
        description: "A course".to_string(),
        thumbnail: "https://img.test/thumb.jpg".to_string(),
        hero_image: None,
        tags: vec!["rust".to_string()],
    }
}

fn reference_lesson(title: &str, reference: &str) -> LessonDraft {
    LessonDraft {
        title: title.to_string(),
        description: String::new(),
        duration: "10:00".to_string(),
        video: VideoInput::Reference(reference.to_string()),
        thumbnail: ThumbnailInput::None,
    }
}

#[tokio::test]
async fn create_course_refreshes_into_a_ready_catalog() {
    let h = harness(true);

    let id = h
        .content
        .create_course(course_draft("Rust Masterclass"))
        .await
        .expect("course created");

    match h.state.catalog().await {
        CatalogState::Ready(courses) => {
            assert_eq!(courses.len(), 1);
            assert_eq!(courses[0].id, id);
            // The thumbnail doubles as the hero image when none was given.
            assert_eq!(
                courses[0].hero_image.as_deref(),
                Some("https://img.test/thumb.jpg")
            );
        }
        other => panic!("expected ready catalog, got {:?}", other),
    }
}

#[tokio::test]
async fn modules_come_back_ordered_by_creation_time() {
    let h = harness(true);

    let course_id = h
        .content
        .create_course(course_draft("Course"))
        .await
        .expect("course");
    let first = h
        .content
        .create_module(&course_id, "Module 1")
        .await
        .expect("module 1");
    let second = h
        .content
        .create_module(&course_id, "Module 2")
        .await
        .expect("module 2");

    let courses = h.state.courses().await;
    let ids: Vec<&str> = courses[0].modules.iter().map(|m| m.id.as_str()).collect();
    // The store feeds modules back newest-first; normalization restores
    // creation order.
    assert_eq!(ids, vec![first.as_str(), second.as_str()]);
}

#[tokio::test]
async fn lesson_file_upload_precedes_the_record_write() {
    let h = harness(true);
    let course_id = h.content.create_course(course_draft("Course")).await.unwrap();
    let module_id = h.content.create_module(&course_id, "Module").await.unwrap();

    let draft = LessonDraft {
        title: "Uploaded lesson".to_string(),
        description: String::new(),
        duration: "00:00".to_string(),
        video: VideoInput::File(UploadFile {
            filename: "intro.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            bytes: vec![0u8; 16],
        }),
        thumbnail: ThumbnailInput::None,
    };

    h.content
        .create_lesson(&course_id, &module_id, draft)
        .await
        .expect("lesson created");

    let uploads = h.storage.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with(&format!("{}/", course_id)));
    assert!(uploads[0].ends_with(".mp4"));

    let courses = h.state.courses().await;
    let lesson = &courses[0].modules[0].lessons[0];
    assert!(lesson.video_url.starts_with("https://cdn.test/"));
}

#[tokio::test]
async fn upload_failure_aborts_the_command_with_no_record_written() {
    let h = harness(true);
    let course_id = h.content.create_course(course_draft("Course")).await.unwrap();
    let module_id = h.content.create_module(&course_id, "Module").await.unwrap();

    h.storage.fail.store(true, Ordering::SeqCst);

    let draft = LessonDraft {
        title: "Doomed lesson".to_string(),
        description: String::new(),
        duration: "00:00".to_string(),
        video: VideoInput::File(UploadFile {
            filename: "intro.mp4".to_string(),
            content_type: "video/mp4".to_string(),
            bytes: vec![0u8; 16],
        }),
        thumbnail: ThumbnailInput::None,
    };

    let result = h.content.create_lesson(&course_id, &module_id, draft).await;
    assert!(matches!(result, Err(CommandError::Upload(_))));
    assert_eq!(h.store.lesson_count(), 0);
}

#[tokio::test]
async fn unconfirmed_deletes_never_reach_the_store() {
    let h = harness(true);
    let course_id = h.content.create_course(course_draft("Course")).await.unwrap();
    let module_id = h.content.create_module(&course_id, "Module").await.unwrap();

    let result = h
        .content
        .delete_module(&module_id, Confirmation::Unconfirmed)
        .await;
    assert!(matches!(result, Err(CommandError::ConfirmationRequired)));
    assert!(!h.store.calls().iter().any(|c| c == "delete_module"));

    h.content
        .delete_module(&module_id, Confirmation::Confirmed)
        .await
        .expect("confirmed delete succeeds");
    assert!(h.store.calls().iter().any(|c| c == "delete_module"));
}

#[tokio::test]
async fn explicit_child_deletion_runs_before_the_module_delete() {
    let h = harness(false);
    let course_id = h.content.create_course(course_draft("Course")).await.unwrap();
    let module_id = h.content.create_module(&course_id, "Module").await.unwrap();
    h.content
        .create_lesson(
            &course_id,
            &module_id,
            reference_lesson("Lesson", "https://youtu.be/dQw4w9WgXcQ"),
        )
        .await
        .unwrap();

    h.content
        .delete_module(&module_id, Confirmation::Confirmed)
        .await
        .expect("delete succeeds");

    assert_eq!(h.store.lesson_count(), 0);

    let calls = h.store.calls();
    let lessons_at = calls
        .iter()
        .position(|c| c == "delete_module_lessons")
        .expect("child delete issued");
    let module_at = calls
        .iter()
        .position(|c| c == "delete_module")
        .expect("module delete issued");
    assert!(lessons_at < module_at);
}

#[tokio::test]
async fn fetch_failure_is_a_distinct_catalog_state() {
    let h = harness(true);

    h.store.fail_fetch.store(true, Ordering::SeqCst);
    h.content.refresh_catalog().await;
    assert!(matches!(h.state.catalog().await, CatalogState::Failed(_)));

    h.store.fail_fetch.store(false, Ordering::SeqCst);
    h.content.refresh_catalog().await;
    assert!(matches!(h.state.catalog().await, CatalogState::Ready(_)));
}

#[tokio::test]
async fn player_flow_from_catalog_to_lesson_and_back() {
    let h = harness(true);
    let course_id = h.content.create_course(course_draft("Course")).await.unwrap();
    let module_id = h.content.create_module(&course_id, "Module 1").await.unwrap();
    let second_module = h.content.create_module(&course_id, "Module 2").await.unwrap();
    let first_lesson = h
        .content
        .create_lesson(
            &course_id,
            &module_id,
            reference_lesson("Lesson 1", "https://youtu.be/dQw4w9WgXcQ"),
        )
        .await
        .unwrap();
    let second_lesson = h
        .content
        .create_lesson(
            &course_id,
            &second_module,
            reference_lesson("Lesson 2", "https://cdn.test/direct.mp4"),
        )
        .await
        .unwrap();

    let selection = h
        .state
        .select_course(&course_id)
        .await
        .expect("course is enterable");
    assert_eq!(selection.module_id, module_id);
    assert_eq!(selection.lesson_id, first_lesson);

    let selection = h
        .state
        .navigate(&second_module, &second_lesson)
        .await
        .expect("target exists");
    assert_eq!(selection.course_id, course_id);
    assert_eq!(selection.lesson_id, second_lesson);

    h.state.exit_player().await;
    assert!(h.state.selection().await.is_none());
}

#[tokio::test]
async fn editing_a_module_renames_it_in_the_next_snapshot() {
    let h = harness(true);
    let course_id = h.content.create_course(course_draft("Course")).await.unwrap();
    let module_id = h.content.create_module(&course_id, "Draft name").await.unwrap();

    h.content
        .edit_module(&module_id, "Final name")
        .await
        .expect("edit succeeds");

    let courses = h.state.courses().await;
    assert_eq!(courses[0].modules[0].title, "Final name");
}
