//! Prompt 构造：把用户原始文本与已知时间线拼成 system / user 两段指令
//!
//! 纯函数，不做输入校验（空文本在门面层拦截）。

use crate::story::TimelineEvent;

const SYSTEM_PROMPT: &str = r#"You are an assistant that transforms a user's freeform text about their life into a structured biography and timeline.

Your primary focus should be on generating a HIGHLY DETAILED and comprehensive biography. The biography should be thorough, informative, and as long as necessary to include all relevant details from the input text. Use rich, descriptive language and maintain a coherent narrative flow.

Format the response as a JSON object with:
1. A "bio" field containing a detailed, comprehensive paragraph (or paragraphs) summarizing their life. This should be the most substantial part of your response.
2. A "timeline" field containing an array of NEW events found in the text, ordered chronologically. Each event is an object with "date", "title" and "description" string fields. Dates may be a year, a decade such as "1990s", or something more specific.

Only include timeline events that are not already known. Never repeat an event that has the same date and title as a known event.

The response should be valid JSON only, with no additional text or explanation."#;

/// system + user 两段 prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

impl PromptPair {
    /// 单段式端点（无消息角色）使用：system 在前，空行分隔
    pub fn combined(&self) -> String {
        format!("{}\n\n{}", self.system, self.user)
    }
}

pub fn system_prompt() -> String {
    SYSTEM_PROMPT.to_string()
}

/// user prompt：原文 + 已知事件逐条原样列出
pub fn user_prompt(input: &str, existing: &[TimelineEvent]) -> String {
    let mut prompt = format!(
        "Parse this text into a detailed, comprehensive biography: \"{}\"",
        input
    );

    if !existing.is_empty() {
        prompt.push_str("\n\nThese timeline events are already known:\n");
        for event in existing {
            prompt.push_str(&format!(
                "- Date: {} | Title: {} | Description: {}\n",
                event.date, event.title, event.description
            ));
        }
        prompt.push_str(
            "\nDo not include any event whose date and title match one of the known events above. \
             Return only new events in \"timeline\".",
        );
    }

    prompt
}

pub fn build_prompts(input: &str, existing: &[TimelineEvent]) -> PromptPair {
    PromptPair {
        system: system_prompt(),
        user: user_prompt(input, existing),
    }
}
