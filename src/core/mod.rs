//! 核心层：错误类型与生成编排

pub mod error;
pub mod orchestrator;

pub use error::{AppError, GenerationError, LlmError, ParseError, ProviderError, StoreError};
pub use orchestrator::{FallbackPolicy, Orchestrator};
