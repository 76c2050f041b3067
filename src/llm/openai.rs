//! OpenAI 兼容对话补全客户端（次提供方）
//!
//! 通过 async_openai 调用，base_url 可配置；消息列表为 system + user。
//! 返回的 content 直接按 JSON 解析，不剥离代码围栏。

use async_openai::config::OpenAIConfig;
use async_openai::error::OpenAIError;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::config::OpenAiSection;
use crate::core::{LlmError, ProviderError};
use crate::llm::{parser, prompt, LifeStoryProvider};
use crate::story::{LlmResult, TimelineEvent};

pub const OPENAI_PROVIDER: &str = "openai";

/// OpenAI 兼容客户端：持有 Client 与固定的 model / temperature / token 上限
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str, temperature: f32, max_tokens: u32) -> Self {
        let config = OpenAIConfig::new()
            .with_api_base(base_url)
            .with_api_key(api_key);

        Self {
            client: Client::with_config(config),
            model: model.to_string(),
            temperature,
            max_tokens,
        }
    }

    /// 未配置 API Key 时返回 None
    pub fn from_config(section: &OpenAiSection) -> Option<Self> {
        let api_key = section.credential()?;
        Some(Self::new(
            &section.base_url,
            &section.model,
            api_key,
            section.temperature,
            section.max_tokens,
        ))
    }

    fn build_request(
        &self,
        input: &str,
        existing: &[TimelineEvent],
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let prompts = prompt::build_prompts(input, existing);
        let messages = vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(prompts.system)
                    .build()?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompts.user)
                    .build()?,
            ),
        ];

        CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .max_tokens(self.max_tokens)
            .build()
    }

    async fn complete(&self, input: &str, existing: &[TimelineEvent]) -> Result<String, LlmError> {
        let request = self.build_request(input, existing).map_err(to_llm_error)?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(to_llm_error)?;

        Ok(response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

fn to_llm_error(e: OpenAIError) -> LlmError {
    match e {
        OpenAIError::ApiError(api) => LlmError::Api(api.to_string()),
        other => LlmError::Network(other.to_string()),
    }
}

#[async_trait]
impl LifeStoryProvider for OpenAiClient {
    fn name(&self) -> &str {
        OPENAI_PROVIDER
    }

    async fn generate(
        &self,
        input: &str,
        existing: &[TimelineEvent],
    ) -> Result<LlmResult, ProviderError> {
        let content = self
            .complete(input, existing)
            .await
            .map_err(|e| ProviderError::new(OPENAI_PROVIDER, e))?;

        parser::parse_json(&content).map_err(|e| {
            tracing::error!("Failed to parse OpenAI response as JSON: {}", e);
            tracing::debug!("Raw response: {}", e.raw);
            ProviderError::new(OPENAI_PROVIDER, e)
        })
    }
}
