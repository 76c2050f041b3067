//! 模型输出解析：从自由文本中提取 JSON 并反序列化为 LlmResult
//!
//! 按固定优先级尝试：```json 代码块 → 裸 ``` 代码块 → 首个 `{` 到最后一个 `}`。
//! 第一个能成功反序列化的候选即结果；全部失败返回 ParseError（带原文）。

use crate::core::ParseError;
use crate::story::LlmResult;

/// JSON 提取策略（按 ORDER 顺序尝试）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStrategy {
    JsonFence,
    BareFence,
    Braces,
}

impl ExtractStrategy {
    pub const ORDER: [ExtractStrategy; 3] = [
        ExtractStrategy::JsonFence,
        ExtractStrategy::BareFence,
        ExtractStrategy::Braces,
    ];

    /// 返回去掉围栏标记后的候选片段
    pub fn extract(self, text: &str) -> Option<&str> {
        match self {
            ExtractStrategy::JsonFence => {
                let start = text.find("```json")?;
                let rest = &text[start + "```json".len()..];
                let end = rest.find("```")?;
                Some(rest[..end].trim())
            }
            ExtractStrategy::BareFence => {
                // 开围栏后必须紧跟换行，带语言标记的围栏不算
                text.match_indices("```").find_map(|(start, _)| {
                    let rest = &text[start + 3..];
                    let body = rest
                        .strip_prefix("\r\n")
                        .or_else(|| rest.strip_prefix('\n'))?;
                    let end = body.find("```")?;
                    Some(body[..end].trim())
                })
            }
            ExtractStrategy::Braces => {
                let start = text.find('{')?;
                let end = text.rfind('}')?;
                (end > start).then(|| &text[start..=end])
            }
        }
    }
}

/// 解析带围栏或夹杂说明文字的模型输出
pub fn parse_completion(text: &str) -> Result<LlmResult, ParseError> {
    let mut last_reason = None;

    for strategy in ExtractStrategy::ORDER {
        let Some(candidate) = strategy.extract(text) else {
            continue;
        };
        match serde_json::from_str::<LlmResult>(candidate) {
            Ok(result) => return Ok(result),
            Err(e) => {
                tracing::debug!("{:?} candidate rejected: {}", strategy, e);
                last_reason = Some(e.to_string());
            }
        }
    }

    Err(ParseError::new(
        text,
        last_reason.unwrap_or_else(|| "no JSON object found".to_string()),
    ))
}

/// 直接解析（不剥离围栏），用于声明了 JSON 输出的对话补全端点
pub fn parse_json(content: &str) -> Result<LlmResult, ParseError> {
    serde_json::from_str(content.trim()).map_err(|e| ParseError::new(content, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_fence() {
        let text = "Here you go:\n```json\n{\"bio\": \"Born in Chicago.\", \"timeline\": [{\"date\": \"1990\", \"title\": \"Born\", \"description\": \"Chicago\"}]}\n```\nEnjoy!";
        let result = parse_completion(text).unwrap();
        assert_eq!(result.bio, "Born in Chicago.");
        assert_eq!(result.timeline.len(), 1);
        assert_eq!(result.timeline[0].date, "1990");
        assert_eq!(result.timeline[0].title, "Born");
        assert_eq!(result.timeline[0].description, "Chicago");
    }

    #[test]
    fn test_bare_fence() {
        let text = "```\n{\"bio\": \"A baker.\"}\n```";
        assert_eq!(parse_completion(text).unwrap().bio, "A baker.");
        assert_eq!(
            ExtractStrategy::BareFence.extract(text),
            Some("{\"bio\": \"A baker.\"}")
        );
    }

    #[test]
    fn test_language_tagged_fence_is_not_bare() {
        assert_eq!(ExtractStrategy::BareFence.extract("```js\nlet a = 1;\n```"), None);
    }

    #[test]
    fn test_braces_are_greedy() {
        let text = "Sure! {\"bio\": \"x\", \"timeline\": [{\"date\": \"2000\", \"title\": \"t\"}]} Hope it helps.";
        let result = parse_completion(text).unwrap();
        assert_eq!(result.timeline[0].title, "t");
        assert_eq!(result.timeline[0].description, "");
    }

    #[test]
    fn test_falls_through_to_later_strategy() {
        // 大括号策略从第一个 `{` 开始，围栏里的残片会把它带坏
        let text = "```json\nnot json\n```";
        assert!(parse_completion(text).is_err());
        let text = "```json\n{broken\n``` {\"bio\": \"ok\"}";
        assert!(parse_completion(text).is_err());
        let text = "{\"bio\": \"ok\"}\n```json\n{broken\n```";
        assert_eq!(parse_completion(text).unwrap().bio, "ok");
    }

    #[test]
    fn test_no_json_yields_parse_error_with_raw() {
        let text = "I'm sorry, I can't help with that.";
        let err = parse_completion(text).unwrap_err();
        assert_eq!(err.raw, text);
        assert_eq!(err.reason, "no JSON object found");
    }

    #[test]
    fn test_object_without_bio_is_rejected() {
        assert!(parse_completion("{\"foo\": 1}").is_err());
        assert!(parse_completion("}{").is_err());
    }

    #[test]
    fn test_parse_json_does_not_strip_fences() {
        assert!(parse_json("```json\n{\"bio\": \"x\"}\n```").is_err());
        assert_eq!(parse_json(" {\"bio\": \"x\"} ").unwrap().bio, "x");
    }
}
