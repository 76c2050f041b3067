//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `LIFELENS__*` 覆盖（双下划线表示嵌套，如 `LIFELENS__PROVIDERS__FALLBACK=mock`）。
//! 凭据另外识别常用的扁平变量：GEMINI_API_KEY / GEMINI_MODEL / LLM_API_KEY / LLM_API_URL / BACKEND_URL。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::FallbackPolicy;
use crate::llm::MockMode;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub app: AppSection,
    pub providers: ProvidersSection,
    pub crawler: CrawlerSection,
}

/// [app] 段：本地存储文件位置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppSection {
    pub storage_path: PathBuf,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("workspace/lifelens.json"),
        }
    }
}

/// [providers] 段：提供方优先级为 gemini → openai → mock
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersSection {
    /// 最后一个提供方失败时：propagate 返回错误 / mock 降级为模拟数据
    pub fallback: FallbackPolicy,
    pub mock: MockMode,
    pub gemini: GeminiSection,
    pub openai: OpenAiSection,
}

/// [providers.gemini] 段：主提供方
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeminiSection {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GeminiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-pro".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 4096,
        }
    }
}

/// [providers.openai] 段：次提供方（OpenAI 兼容对话补全）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiSection {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for OpenAiSection {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

/// [crawler] 段：外部爬虫服务
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerSection {
    pub base_url: String,
    /// 健康检查超时（秒）
    pub health_timeout_secs: u64,
    pub max_pages: u32,
    pub follow_links: bool,
}

impl Default for CrawlerSection {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            health_timeout_secs: 3,
            max_pages: 10,
            follow_links: true,
        }
    }
}

/// 非空才算已配置
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// LLM_API_URL 是完整端点（.../v1/chat/completions），客户端需要的是 API 根路径
fn api_base_from_endpoint(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    url.strip_suffix("/chat/completions")
        .unwrap_or(url)
        .trim_end_matches('/')
        .to_string()
}

impl GeminiSection {
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl OpenAiSection {
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}

impl AppConfig {
    /// 应用扁平环境变量：API Key 只在未配置时补齐；GEMINI_MODEL / LLM_API_URL / BACKEND_URL 给出即覆盖
    pub fn apply_env_fallbacks(mut self) -> Self {
        self.apply_fallbacks_from(|name| std::env::var(name).ok());
        self
    }

    pub(crate) fn apply_fallbacks_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if self.providers.gemini.credential().is_none() {
            self.providers.gemini.api_key = non_empty(lookup("GEMINI_API_KEY"));
        }
        if let Some(model) = non_empty(lookup("GEMINI_MODEL")) {
            self.providers.gemini.model = model;
        }
        if self.providers.openai.credential().is_none() {
            self.providers.openai.api_key = non_empty(lookup("LLM_API_KEY"));
        }
        if let Some(url) = non_empty(lookup("LLM_API_URL")) {
            self.providers.openai.base_url = api_base_from_endpoint(&url);
        }
        if let Some(url) = non_empty(lookup("BACKEND_URL")) {
            self.crawler.base_url = url;
        }
    }
}

/// 从 config 目录加载配置，环境变量 LIFELENS__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 叠加环境变量 LIFELENS__*（双下划线表示嵌套键）
/// 4. 最后应用扁平环境变量（见 apply_env_fallbacks）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("LIFELENS")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    let cfg: AppConfig = c.try_deserialize()?;
    Ok(cfg.apply_env_fallbacks())
}
