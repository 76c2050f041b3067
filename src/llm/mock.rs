//! Mock 提供方（未配置任何 API Key 时使用，不访问网络）
//!
//! - static：固定的传记与时间线
//! - keywords：从输入中挑出较长的词拼出演示用时间线，便于本地跑通流程

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::ProviderError;
use crate::llm::LifeStoryProvider;
use crate::story::{sort_chronologically, LlmResult, TimelineEvent};

pub const MOCK_PROVIDER: &str = "mock";

const MOCK_BIO: &str = "A journey that began in 1990 in Chicago, blossoming into a bakery adventure in Paris by 2015. Born in Chicago, starting a journey of creativity and exploration. Later relocated to Paris and fulfilled a lifelong dream by opening a charming bakery in Montmartre.";

/// 模拟数据模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MockMode {
    #[default]
    Static,
    Keywords,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MockProvider {
    mode: MockMode,
}

impl MockProvider {
    pub fn new(mode: MockMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> MockMode {
        self.mode
    }

    pub fn result_for(&self, input: &str) -> LlmResult {
        match self.mode {
            MockMode::Static => static_result(),
            MockMode::Keywords => keyword_result(input),
        }
    }
}

pub fn static_result() -> LlmResult {
    LlmResult {
        bio: MOCK_BIO.to_string(),
        timeline: vec![
            TimelineEvent::new("1990", "Born in Chicago", "Started a journey of creativity and exploration."),
            TimelineEvent::new("2015", "Moved to Paris", "Relocated to Paris to chase a lifelong dream."),
            TimelineEvent::new("2015", "Opened a bakery", "Opened a charming bakery in Montmartre."),
        ],
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 演示数据：5~10 个事件，从 1980 年起每 4 年一个
pub fn keyword_result(input: &str) -> LlmResult {
    let keywords: Vec<&str> = input
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .filter(|w| w.chars().count() > 4)
        .collect();

    let count = keywords.len().div_ceil(10).clamp(5, 10);
    let mut timeline: Vec<TimelineEvent> = (0..count)
        .map(|i| {
            let keyword = if keywords.is_empty() {
                "event"
            } else {
                keywords[(i * 7) % keywords.len()]
            };
            TimelineEvent::new(
                (1980 + i * 4).to_string(),
                format!("{} milestone", capitalize(keyword)),
                format!("This significant {} event shaped my perspective and future path.", keyword),
            )
        })
        .collect();
    sort_chronologically(&mut timeline);

    let focus: Vec<&str> = keywords.iter().take(3).copied().collect();
    LlmResult {
        bio: format!("A life journey with focus on {}.", focus.join(", ")),
        timeline,
    }
}

#[async_trait]
impl LifeStoryProvider for MockProvider {
    fn name(&self) -> &str {
        MOCK_PROVIDER
    }

    async fn generate(
        &self,
        input: &str,
        _existing: &[TimelineEvent],
    ) -> Result<LlmResult, ProviderError> {
        Ok(self.result_for(input))
    }
}
