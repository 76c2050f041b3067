//! 爬虫服务客户端
//!
//! POST `{base}/api/crawl` 抓取网页并返回提取出的文本；GET `{base}/api/health` 判断服务是否可用。
//! 服务不可用是软状态（禁用 URL 输入），不是错误。

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::CrawlerSection;

pub const CONNECT_FAILURE_MESSAGE: &str = "Failed to connect to crawler service. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrawlRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_pages: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_links: Option<bool>,
}

impl CrawlRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: None,
            follow_links: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CrawlResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub extracted_text: String,
    pub crawled_urls: Option<Vec<String>>,
    pub page_count: Option<u32>,
    pub error: Option<String>,
}

impl CrawlResponse {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

pub struct CrawlerClient {
    http: Client,
    base_url: String,
    health_timeout: Duration,
    max_pages: Option<u32>,
    follow_links: Option<bool>,
}

impl CrawlerClient {
    pub fn new(base_url: &str, health_timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            health_timeout,
            max_pages: None,
            follow_links: None,
        }
    }

    pub fn from_config(cfg: &CrawlerSection) -> Self {
        Self {
            max_pages: Some(cfg.max_pages),
            follow_links: Some(cfg.follow_links),
            ..Self::new(&cfg.base_url, Duration::from_secs(cfg.health_timeout_secs))
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 带上配置中的抓取页数与是否跟随链接
    pub fn request_for(&self, url: &str) -> CrawlRequest {
        CrawlRequest {
            url: url.to_string(),
            max_pages: self.max_pages,
            follow_links: self.follow_links,
        }
    }

    /// 抓取网页；失败不返回 Err，而是 success=false 的响应
    ///
    /// 非 2xx 且响应体可解析时原样返回服务端的错误；连不上服务时返回固定提示。
    pub async fn crawl(&self, request: &CrawlRequest) -> CrawlResponse {
        let resp = match self
            .http
            .post(format!("{}/api/crawl", self.base_url))
            .json(request)
            .send()
            .await
        {
            Ok(resp) => resp,
            Err(e) => {
                tracing::error!("Error calling crawler API: {}", e);
                return CrawlResponse::failure(CONNECT_FAILURE_MESSAGE);
            }
        };

        let status = resp.status();
        match resp.json::<CrawlResponse>().await {
            Ok(body) => {
                if !status.is_success() {
                    tracing::error!("Crawler API returned HTTP {}: {:?}", status, body.error);
                }
                body
            }
            Err(e) => {
                tracing::error!("Crawler API returned HTTP {} with unreadable body: {}", status, e);
                CrawlResponse::failure(CONNECT_FAILURE_MESSAGE)
            }
        }
    }

    /// 健康检查：短超时内返回 200 即可用
    pub async fn is_available(&self) -> bool {
        match self
            .http
            .get(format!("{}/api/health", self.base_url))
            .timeout(self.health_timeout)
            .send()
            .await
        {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(e) => {
                tracing::warn!("Crawler backend is not available: {}", e);
                false
            }
        }
    }
}
