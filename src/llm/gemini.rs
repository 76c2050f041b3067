//! Gemini 客户端（主提供方）
//!
//! 调用 `models/{model}:generateContent`，安全阈值全部放开（BLOCK_NONE），输出长度受 max_output_tokens 限制。
//! 返回的是自由文本，交给 parser::parse_completion 提取 JSON。

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GeminiSection;
use crate::core::{LlmError, ParseError, ProviderError};
use crate::llm::{parser, prompt, LifeStoryProvider};
use crate::story::{LlmResult, TimelineEvent};

pub const GEMINI_PROVIDER: &str = "gemini";

const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// 采样参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    safety_settings: Vec<SafetySetting>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// 首个候选的所有文本片段拼接
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

/// Gemini 客户端：持有 HTTP Client、模型名与采样参数
pub struct GeminiClient {
    http: Client,
    base_url: String,
    model: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(base_url: &str, model: &str, api_key: &str, generation: GenerationConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
            generation,
        }
    }

    /// 未配置 API Key 时返回 None
    pub fn from_config(section: &GeminiSection) -> Option<Self> {
        let api_key = section.credential()?;
        Some(Self::new(
            &section.base_url,
            &section.model,
            api_key,
            GenerationConfig {
                temperature: section.temperature,
                top_p: section.top_p,
                top_k: section.top_k,
                max_output_tokens: section.max_output_tokens,
            },
        ))
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request<'a>(&self, prompt: &'a str) -> GenerateContentRequest<'a> {
        GenerateContentRequest {
            contents: vec![Content {
                parts: vec![RequestPart { text: prompt }],
            }],
            safety_settings: HARM_CATEGORIES
                .iter()
                .map(|&category| SafetySetting {
                    category,
                    threshold: "BLOCK_NONE",
                })
                .collect(),
            generation_config: self.generation,
        }
    }

    /// 发送请求并取回原始文本
    async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        let resp = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| LlmError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|e| ParseError::new(body.as_str(), e.to_string()))?;
        Ok(parsed.text())
    }
}

#[async_trait]
impl LifeStoryProvider for GeminiClient {
    fn name(&self) -> &str {
        GEMINI_PROVIDER
    }

    async fn generate(
        &self,
        input: &str,
        existing: &[TimelineEvent],
    ) -> Result<LlmResult, ProviderError> {
        let prompt = prompt::build_prompts(input, existing).combined();
        let text = self
            .complete(&prompt)
            .await
            .map_err(|e| ProviderError::new(GEMINI_PROVIDER, e))?;

        parser::parse_completion(&text).map_err(|e| {
            tracing::error!("Failed to parse Gemini response as JSON: {}", e);
            tracing::debug!("Raw response: {}", e.raw);
            ProviderError::new(GEMINI_PROVIDER, e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve;

    fn client() -> GeminiClient {
        GeminiClient::from_config(&GeminiSection {
            api_key: Some("g-key".into()),
            base_url: "https://example.test/".into(),
            ..GeminiSection::default()
        })
        .unwrap()
    }

    #[test]
    fn test_requires_credential() {
        assert!(GeminiClient::from_config(&GeminiSection::default()).is_none());
        let blank = GeminiSection {
            api_key: Some("".into()),
            ..GeminiSection::default()
        };
        assert!(GeminiClient::from_config(&blank).is_none());
    }

    #[test]
    fn test_endpoint() {
        assert_eq!(
            client().endpoint(),
            "https://example.test/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn test_request_relaxes_safety() {
        let c = client();
        let value = serde_json::to_value(c.build_request("hi")).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        let settings = value["safetySettings"].as_array().unwrap();
        assert_eq!(settings.len(), 4);
        assert!(settings.iter().all(|s| s["threshold"] == "BLOCK_NONE"));
        assert_eq!(value["generationConfig"]["topK"], 40);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 4096);
    }

    fn client_at(base_url: &str) -> GeminiClient {
        GeminiClient::from_config(&GeminiSection {
            api_key: Some("g-key".into()),
            base_url: base_url.to_string(),
            ..GeminiSection::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_server_error_is_status_error() {
        let (base, server) = serve(vec![(500, r#"{"error":{"message":"internal"}}"#.into())]).await;
        let err = client_at(&base).generate("my story", &[]).await.unwrap_err();

        assert_eq!(err.provider, GEMINI_PROVIDER);
        assert!(matches!(err.source, LlmError::Status { status: 500, .. }));
        assert_eq!(
            server.await.unwrap(),
            vec!["POST /v1beta/models/gemini-pro:generateContent HTTP/1.1"]
        );
    }

    #[tokio::test]
    async fn test_fenced_completion_is_parsed() {
        let completion = "```json\n{\"bio\": \"Born in Chicago.\", \"timeline\": [{\"date\": \"1990\", \"title\": \"Born\", \"description\": \"Chicago\"}]}\n```";
        let body = serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": completion}]}}]
        })
        .to_string();
        let (base, _server) = serve(vec![(200, body)]).await;

        let result = client_at(&base).generate("my story", &[]).await.unwrap();
        assert_eq!(result.bio, "Born in Chicago.");
        assert_eq!(result.timeline, vec![TimelineEvent::new("1990", "Born", "Chicago")]);
    }

    #[tokio::test]
    async fn test_unparseable_completion_is_parse_error() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"Sorry, no."}]}}]}"#;
        let (base, _server) = serve(vec![(200, body.into())]).await;
        let err = client_at(&base).generate("my story", &[]).await.unwrap_err();
        assert!(err.is_parse_error());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"```json\n{\"bio\":"},{"text":" \"x\"}\n```"}]}}]}"#;
        let parsed: GenerateContentResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parser::parse_completion(&parsed.text()).unwrap().bio, "x");
        let empty: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.text(), "");
    }
}
