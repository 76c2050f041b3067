//! 生成提供方抽象
//!
//! 所有后端（Gemini / OpenAI 兼容 / Mock）实现 LifeStoryProvider：一次网络往返，内部不重试。

use async_trait::async_trait;

use crate::core::ProviderError;
use crate::story::{LlmResult, TimelineEvent};

/// 从文本生成传记（及时间线）；existing 为已知事件，提供方应避免重复输出
#[async_trait]
pub trait LifeStoryProvider: Send + Sync {
    /// 日志与错误中使用的提供方名称
    fn name(&self) -> &str;

    async fn generate(
        &self,
        input: &str,
        existing: &[TimelineEvent],
    ) -> Result<LlmResult, ProviderError>;
}
