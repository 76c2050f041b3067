//! 生成编排器：按优先级依次尝试提供方，失败时回退
//!
//! 顺序：Gemini（配置了 Key 时）→ OpenAI 兼容（配置了 Key 时）→ Mock（一个都没配置时）。
//! 前面的提供方失败只记日志并继续；最后一个失败时按 FallbackPolicy 决定返回错误还是降级为 Mock。
//! 不缓存结果，除出站 HTTP 与日志外无副作用。

use std::sync::Arc;

use serde::Deserialize;

use crate::config::ProvidersSection;
use crate::core::GenerationError;
use crate::llm::{GeminiClient, LifeStoryProvider, MockProvider, OpenAiClient};
use crate::story::{LlmResult, TimelineEvent};

/// 所有已配置提供方都失败后的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// 最后一个提供方的错误作为 GenerationError 返回
    #[default]
    Propagate,
    /// 降级为 Mock 数据
    Mock,
}

/// 根据配置创建提供方列表（按优先级，未配置凭据的跳过）
pub(crate) fn create_providers_from_config(cfg: &ProvidersSection) -> Vec<Arc<dyn LifeStoryProvider>> {
    let mut providers: Vec<Arc<dyn LifeStoryProvider>> = Vec::new();

    match GeminiClient::from_config(&cfg.gemini) {
        Some(client) => {
            tracing::info!("Gemini provider enabled ({})", cfg.gemini.model);
            providers.push(Arc::new(client));
        }
        None => tracing::debug!("Gemini provider skipped: no API key"),
    }

    match OpenAiClient::from_config(&cfg.openai) {
        Some(client) => {
            tracing::info!("OpenAI provider enabled ({})", cfg.openai.model);
            providers.push(Arc::new(client));
        }
        None => tracing::debug!("OpenAI provider skipped: no API key"),
    }

    providers
}

/// 编排器：持有有序提供方列表、Mock 与回退策略
pub struct Orchestrator {
    providers: Vec<Arc<dyn LifeStoryProvider>>,
    mock: MockProvider,
    policy: FallbackPolicy,
}

impl Orchestrator {
    pub fn new(
        providers: Vec<Arc<dyn LifeStoryProvider>>,
        mock: MockProvider,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            providers,
            mock,
            policy,
        }
    }

    pub fn from_config(cfg: &ProvidersSection) -> Self {
        Self::new(
            create_providers_from_config(cfg),
            MockProvider::new(cfg.mock),
            cfg.fallback,
        )
    }

    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// 没有任何已配置提供方（只会返回 Mock 数据）
    pub fn is_mock_only(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    pub async fn generate(&self, input: &str) -> Result<LlmResult, GenerationError> {
        self.reconcile(input, &[]).await
    }

    /// 带已知时间线生成：提供方被要求不要重复 existing 中的事件
    pub async fn reconcile(
        &self,
        input: &str,
        existing: &[TimelineEvent],
    ) -> Result<LlmResult, GenerationError> {
        let mut last_error = None;

        for provider in &self.providers {
            tracing::info!("Generating life story with {}", provider.name());
            match provider.generate(input, existing).await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    tracing::warn!("{} call failed, falling back: {}", provider.name(), e);
                    last_error = Some(e);
                }
            }
        }

        match (last_error, self.policy) {
            (None, _) => {
                tracing::warn!("No API keys found, using mock data");
                Ok(self.mock.result_for(input))
            }
            (Some(e), FallbackPolicy::Propagate) => {
                tracing::error!("All providers failed: {}", e);
                Err(GenerationError::Exhausted(e))
            }
            (Some(e), FallbackPolicy::Mock) => {
                tracing::warn!("All providers failed ({}), using mock data", e);
                Ok(self.mock.result_for(input))
            }
        }
    }
}
