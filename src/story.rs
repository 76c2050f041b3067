//! 数据模型：时间线事件、生成结果、已保存的传记快照
//!
//! 日期是自由格式字符串（"1990"、"1990s"、"June 2015"），只在需要排序时用 extract_year 粗略取年份。

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 时间线上的一个事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
}

impl TimelineEvent {
    pub fn new(
        date: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            title: title.into(),
            description: description.into(),
        }
    }

    /// 同一事件：date 与 title 去空白、忽略大小写后相等
    pub fn same_event(&self, other: &TimelineEvent) -> bool {
        self.date.trim().eq_ignore_ascii_case(other.date.trim())
            && self.title.trim().eq_ignore_ascii_case(other.title.trim())
    }
}

/// 一次生成的结果：传记正文 + 可选时间线（顺序由模型给出，不做校验）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResult {
    pub bio: String,
    #[serde(default)]
    pub timeline: Vec<TimelineEvent>,
}

impl LlmResult {
    pub fn bio_only(bio: impl Into<String>) -> Self {
        Self {
            bio: bio.into(),
            timeline: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bio.trim().is_empty() && self.timeline.is_empty()
    }
}

/// 命名快照：创建后不再修改，只能删除
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedBiography {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub last_updated: DateTime<Utc>,
}

impl SavedBiography {
    pub fn new(name: impl Into<String>, bio: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            bio: bio.into(),
            last_updated: Utc::now(),
        }
    }

    pub fn summary(&self) -> SavedSummary {
        SavedSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            last_updated: self.last_updated,
        }
    }
}

/// 列表展示用的快照摘要（不含正文）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedSummary {
    pub id: String,
    pub name: String,
    pub last_updated: DateTime<Utc>,
}

fn year_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(?:19|20)\d{2}\b").expect("valid year regex"))
}

fn decade_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b((?:19|20)\d0)s\b").expect("valid decade regex"))
}

/// 从自由格式日期中取年份：先找独立的四位年份，再找年代（"1990s" → 1990），都没有则 2000
pub fn extract_year(date: &str) -> i32 {
    if let Some(m) = year_regex().find(date) {
        if let Ok(year) = m.as_str().parse() {
            return year;
        }
    }
    decade_regex()
        .captures(date)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(2000)
}

/// 按年份稳定排序（同年保持原顺序）
pub fn sort_chronologically(events: &mut [TimelineEvent]) {
    events.sort_by_key(|e| extract_year(&e.date));
}

/// 合并时间线：保留已有事件的顺序，新事件按给出顺序追加，跳过与已有（或前面新增）重复的
pub fn merge_timeline(existing: &[TimelineEvent], incoming: Vec<TimelineEvent>) -> Vec<TimelineEvent> {
    let mut merged = existing.to_vec();
    for event in incoming {
        if merged.iter().any(|e| e.same_event(&event)) {
            tracing::debug!("Skipping duplicate timeline event: {} / {}", event.date, event.title);
            continue;
        }
        merged.push(event);
    }
    merged
}
