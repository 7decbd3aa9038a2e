//! PostgREST-conventions store client.
//!
//! Speaks the row-filter dialect of PostgREST-compatible endpoints: nested
//! joins via `select`, row filters via `id=eq.{id}`, inserts with
//! `Prefer: return=minimal`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Serialize;
use tracing::debug;

use super::{
    CourseStore, LessonPatch, ModulePatch, NewCourse, NewLesson, NewModule, StoreError,
    StoreResult,
};
use crate::catalog::CourseRecord;
use crate::config::StoreConfig;

const CATALOG_SELECT: &str = "*,modules(*,lessons(*))";

/// REST client for the remote relational store.
pub struct RestStore {
    config: StoreConfig,
    client: reqwest::Client,
}

impl RestStore {
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), table)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.config.api_key),
            )
    }

    async fn check(response: reqwest::Response) -> StoreResult<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(StoreError::Rejected { status, body })
    }

    async fn insert<T: Serialize + Sync>(&self, table: &str, row: &T) -> StoreResult<()> {
        debug!("Inserting into {}", table);
        let response = self
            .authorize(self.client.post(self.table_url(table)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn update<T: Serialize + Sync>(&self, table: &str, id: &str, patch: &T) -> StoreResult<()> {
        debug!("Updating {} row {}", table, id);
        let response = self
            .authorize(self.client.patch(self.table_url(table)))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=minimal")
            .json(patch)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, table: &str, filter_column: &str, id: &str) -> StoreResult<()> {
        debug!("Deleting from {} where {}={}", table, filter_column, id);
        let response = self
            .authorize(self.client.delete(self.table_url(table)))
            .query(&[(filter_column, format!("eq.{}", id))])
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CourseStore for RestStore {
    async fn fetch_catalog(&self) -> StoreResult<Vec<CourseRecord>> {
        debug!("Fetching catalog from {}", self.config.endpoint);
        let response = self
            .authorize(self.client.get(self.table_url("courses")))
            .query(&[("select", CATALOG_SELECT)])
            .send()
            .await?;

        let response = Self::check(response).await?;
        let records = response.json::<Vec<CourseRecord>>().await?;
        Ok(records)
    }

    async fn insert_course(&self, course: NewCourse) -> StoreResult<()> {
        self.insert("courses", &course).await
    }

    async fn insert_module(&self, module: NewModule) -> StoreResult<()> {
        self.insert("modules", &module).await
    }

    async fn update_module(&self, module_id: &str, patch: ModulePatch) -> StoreResult<()> {
        self.update("modules", module_id, &patch).await
    }

    async fn delete_module(&self, module_id: &str) -> StoreResult<()> {
        self.delete("modules", "id", module_id).await
    }

    async fn insert_lesson(&self, lesson: NewLesson) -> StoreResult<()> {
        self.insert("lessons", &lesson).await
    }

    async fn update_lesson(&self, lesson_id: &str, patch: LessonPatch) -> StoreResult<()> {
        self.update("lessons", lesson_id, &patch).await
    }

    async fn delete_lesson(&self, lesson_id: &str) -> StoreResult<()> {
        self.delete("lessons", "id", lesson_id).await
    }

    async fn delete_module_lessons(&self, module_id: &str) -> StoreResult<()> {
        self.delete("lessons", "module_id", module_id).await
    }
}
