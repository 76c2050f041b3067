//! 错误类型
//!
//! 分层：传输层（LlmError / ParseError）→ 提供方（ProviderError）→ 编排（GenerationError）→ 门面（AppError）。
//! 界面只拿到字符串：GenerationError 的 Display 即面向用户的提示。

use thiserror::Error;

/// 无法从模型输出中提取出合法 JSON；raw 保留原始文本便于日志诊断
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("JSON parse error: {reason}")]
pub struct ParseError {
    pub raw: String,
    pub reason: String,
}

impl ParseError {
    pub fn new(raw: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            reason: reason.into(),
        }
    }
}

/// 单次 LLM 调用失败的原因
#[derive(Error, Debug)]
pub enum LlmError {
    /// 请求未发出或未返回
    #[error("Network error: {0}")]
    Network(String),

    /// 非 2xx 响应
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// API 层拒绝（鉴权失败、模型不存在等）
    #[error("API error: {0}")]
    Api(String),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// 带提供方身份的失败
#[derive(Error, Debug)]
#[error("{provider} provider failed: {source}")]
pub struct ProviderError {
    pub provider: String,
    #[source]
    pub source: LlmError,
}

impl ProviderError {
    pub fn new(provider: impl Into<String>, source: impl Into<LlmError>) -> Self {
        Self {
            provider: provider.into(),
            source: source.into(),
        }
    }

    pub fn is_parse_error(&self) -> bool {
        matches!(self.source, LlmError::Parse(_))
    }
}

/// 所有已配置的提供方都失败
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Failed to generate life story. Please try again.")]
    Exhausted(#[source] ProviderError),
}

/// 键值存储读写失败
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// 门面层错误：输入校验、爬虫、生成、存储
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Please enter your life story text.")]
    EmptyInput,

    #[error("Please enter a website URL.")]
    EmptyUrl,

    #[error("Crawler service is not available.")]
    CrawlerUnavailable,

    #[error("{0}")]
    Crawl(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_is_user_facing() {
        let err = GenerationError::Exhausted(ProviderError::new(
            "openai",
            LlmError::Network("connection refused".into()),
        ));
        assert_eq!(
            err.to_string(),
            "Failed to generate life story. Please try again."
        );
    }

    #[test]
    fn test_provider_error_keeps_identity() {
        let err = ProviderError::new("gemini", ParseError::new("not json", "expected value"));
        assert!(err.is_parse_error());
        assert!(err.to_string().starts_with("gemini provider failed"));
    }
}
