//! LLM 层：Prompt 构造、输出解析、提供方抽象与实现（Gemini / OpenAI 兼容 / Mock）

pub mod gemini;
pub mod mock;
pub mod openai;
pub mod parser;
pub mod prompt;
pub mod traits;

pub use gemini::{GeminiClient, GenerationConfig, GEMINI_PROVIDER};
pub use mock::{MockMode, MockProvider, MOCK_PROVIDER};
pub use openai::{OpenAiClient, OPENAI_PROVIDER};
pub use parser::{parse_completion, parse_json, ExtractStrategy};
pub use prompt::{build_prompts, PromptPair};
pub use traits::LifeStoryProvider;
