//! LifeLens 门面：输入校验、文本 / 网址提交、累积传记流程
//!
//! 相当于界面层与编排器、爬虫、快照存储之间的胶水。每次生成成功都会覆盖当前传记。

use std::sync::Arc;

use crate::config::AppConfig;
use crate::core::{AppError, Orchestrator};
use crate::crawler::{CrawlerClient, CONNECT_FAILURE_MESSAGE};
use crate::storage::{FileStore, KeyValueStore, SnapshotStore};
use crate::story::{merge_timeline, LlmResult};

pub struct LifeLens {
    orchestrator: Orchestrator,
    crawler: CrawlerClient,
    store: SnapshotStore,
}

impl LifeLens {
    pub fn new(orchestrator: Orchestrator, crawler: CrawlerClient, store: SnapshotStore) -> Self {
        Self {
            orchestrator,
            crawler,
            store,
        }
    }

    /// 按配置组装：文件存储位于 app.storage_path
    pub fn from_config(cfg: &AppConfig) -> Result<Self, AppError> {
        let kv: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&cfg.app.storage_path));
        Ok(Self::new(
            Orchestrator::from_config(&cfg.providers),
            CrawlerClient::from_config(&cfg.crawler),
            SnapshotStore::open(kv)?,
        ))
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.orchestrator
    }

    pub fn crawler(&self) -> &CrawlerClient {
        &self.crawler
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SnapshotStore {
        &mut self.store
    }

    /// 从文本生成传记并设为当前传记；空白文本直接拒绝
    pub async fn submit_text(&mut self, text: &str) -> Result<&LlmResult, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyInput);
        }
        let result = self.orchestrator.generate(text).await?;
        Ok(self.store.set_current(result)?)
    }

    /// 先经爬虫服务抓取网页文本，再按文本生成
    pub async fn submit_url(&mut self, url: &str) -> Result<&LlmResult, AppError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::EmptyUrl);
        }
        if !self.crawler.is_available().await {
            return Err(AppError::CrawlerUnavailable);
        }

        let response = self.crawler.crawl(&self.crawler.request_for(url)).await;
        if !response.success {
            return Err(AppError::Crawl(
                response
                    .error
                    .unwrap_or_else(|| CONNECT_FAILURE_MESSAGE.to_string()),
            ));
        }
        tracing::info!(
            "Crawled {} page(s) from {}",
            response.page_count.unwrap_or(1),
            url
        );
        if response.extracted_text.trim().is_empty() {
            return Err(AppError::Crawl(
                "No text could be extracted from the website.".to_string(),
            ));
        }

        self.submit_text(&response.extracted_text).await
    }

    /// 累积传记：带上已有时间线生成，合并去重后写回 lifeStory
    pub async fn add_to_life_story(&self, text: &str) -> Result<LlmResult, AppError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::EmptyInput);
        }

        let existing = self.store.life_story()?;
        let generated = self.orchestrator.reconcile(text, &existing.timeline).await?;
        let merged = LlmResult {
            bio: generated.bio,
            timeline: merge_timeline(&existing.timeline, generated.timeline),
        };
        self.store.set_life_story(&merged)?;
        Ok(merged)
    }
}
