//! LifeLens - 将自由文本整理为结构化传记与时间线
//!
//! 模块划分：
//! - **app**: 门面（输入校验、文本 / 网址提交、累积传记）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型、提供方编排与回退
//! - **crawler**: 外部爬虫服务客户端
//! - **llm**: Prompt 构造、输出解析、提供方（Gemini / OpenAI 兼容 / Mock）
//! - **storage**: 键值存储与传记快照
//! - **story**: 数据模型与时间线工具

pub mod app;
pub mod config;
pub mod core;
pub mod crawler;
pub mod llm;
pub mod storage;
pub mod story;

#[cfg(test)]
pub(crate) mod test_support;

pub use app::LifeLens;
pub use story::{LlmResult, SavedBiography, TimelineEvent};
