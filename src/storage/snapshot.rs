//! 传记快照存储
//!
//! 三个独立的键：
//! - `currentBiography`：当前传记，每次生成都会覆盖
//! - `savedBiographies`：命名快照列表，显式保存时追加
//! - `lifeStory`：弹窗流程使用的累积传记 + 时间线
//!
//! 保存不影响当前传记，清空当前传记也不影响已保存列表。

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::core::StoreError;
use crate::storage::KeyValueStore;
use crate::story::{LlmResult, SavedBiography, SavedSummary};

pub const CURRENT_BIOGRAPHY_KEY: &str = "currentBiography";
pub const SAVED_BIOGRAPHIES_KEY: &str = "savedBiographies";
pub const LIFE_STORY_KEY: &str = "lifeStory";

/// 快照存储：注入的键值存储 + 内存中的当前传记
pub struct SnapshotStore {
    kv: Arc<dyn KeyValueStore>,
    current: Option<LlmResult>,
}

impl SnapshotStore {
    /// 打开存储并读入已持久化的当前传记
    pub fn open(kv: Arc<dyn KeyValueStore>) -> Result<Self, StoreError> {
        let current = read_json(kv.as_ref(), CURRENT_BIOGRAPHY_KEY)?;
        Ok(Self { kv, current })
    }

    pub fn current(&self) -> Option<&LlmResult> {
        self.current.as_ref()
    }

    pub fn has_biography(&self) -> bool {
        self.current.as_ref().is_some_and(|c| !c.bio.trim().is_empty())
    }

    /// 替换当前传记并持久化
    pub fn set_current(&mut self, result: LlmResult) -> Result<&LlmResult, StoreError> {
        write_json(self.kv.as_ref(), CURRENT_BIOGRAPHY_KEY, &result)?;
        Ok(&*self.current.insert(result))
    }

    /// 删除持久化的当前传记并清空内存状态（调用方负责确认）
    pub fn clear_current(&mut self) -> Result<(), StoreError> {
        self.kv.remove(CURRENT_BIOGRAPHY_KEY)?;
        self.current = None;
        Ok(())
    }

    /// 以 name 保存当前传记；名称为空或没有当前传记时不做任何事
    pub fn save_current(&self, name: &str) -> Result<Option<SavedBiography>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(None);
        }
        let Some(current) = self.current.as_ref().filter(|c| !c.bio.trim().is_empty()) else {
            tracing::debug!("Nothing to save for {:?}: no current biography", name);
            return Ok(None);
        };

        let saved = SavedBiography::new(name, current.bio.clone());
        let mut all = self.saved()?;
        all.push(saved.clone());
        write_json(self.kv.as_ref(), SAVED_BIOGRAPHIES_KEY, &all)?;
        tracing::info!("Saved biography {:?} ({})", saved.name, saved.id);
        Ok(Some(saved))
    }

    /// 按 id 载入快照：只替换当前传记的 bio，时间线不恢复；找不到时不做任何事
    pub fn load(&mut self, id: &str) -> Result<Option<&LlmResult>, StoreError> {
        let Some(saved) = self.saved()?.into_iter().find(|b| b.id == id) else {
            tracing::debug!("Saved biography {} not found", id);
            return Ok(None);
        };

        let mut next = self.current.clone().unwrap_or_default();
        next.bio = saved.bio;
        self.set_current(next).map(Some)
    }

    /// 按 id 删除快照（调用方负责确认）；返回是否删除了条目
    pub fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut all = self.saved()?;
        let before = all.len();
        all.retain(|b| b.id != id);
        if all.len() == before {
            return Ok(false);
        }
        write_json(self.kv.as_ref(), SAVED_BIOGRAPHIES_KEY, &all)?;
        Ok(true)
    }

    /// 已保存列表，每次都从存储重新读取
    pub fn saved(&self) -> Result<Vec<SavedBiography>, StoreError> {
        Ok(read_json(self.kv.as_ref(), SAVED_BIOGRAPHIES_KEY)?.unwrap_or_default())
    }

    pub fn summaries(&self) -> Result<Vec<SavedSummary>, StoreError> {
        Ok(self.saved()?.iter().map(SavedBiography::summary).collect())
    }

    /// 累积传记；未保存过时为空传记与空时间线
    pub fn life_story(&self) -> Result<LlmResult, StoreError> {
        Ok(read_json(self.kv.as_ref(), LIFE_STORY_KEY)?.unwrap_or_default())
    }

    pub fn set_life_story(&self, story: &LlmResult) -> Result<(), StoreError> {
        write_json(self.kv.as_ref(), LIFE_STORY_KEY, story)
    }
}

fn read_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &str) -> Result<Option<T>, StoreError> {
    match kv.get(key)? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

fn write_json<T: Serialize + ?Sized>(kv: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StoreError> {
    kv.set(key, &serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::story::TimelineEvent;

    fn store() -> SnapshotStore {
        SnapshotStore::open(Arc::new(MemoryStore::new())).unwrap()
    }

    fn story(bio: &str) -> LlmResult {
        LlmResult {
            bio: bio.to_string(),
            timeline: vec![TimelineEvent::new("2015", "Moved to Paris", "")],
        }
    }

    #[test]
    fn test_save_without_current_is_noop() {
        let store = store();
        assert_eq!(store.save_current("Trip to Paris").unwrap(), None);
        assert!(store.saved().unwrap().is_empty());
    }

    #[test]
    fn test_save_requires_name() {
        let mut store = store();
        store.set_current(story("bio")).unwrap();
        assert_eq!(store.save_current("   ").unwrap(), None);
        assert!(store.saved().unwrap().is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let mut store = store();
        store.set_current(story("Original bio")).unwrap();
        let saved = store.save_current(" Trip to Paris ").unwrap().unwrap();
        assert_eq!(saved.name, "Trip to Paris");

        store.set_current(LlmResult::bio_only("Something else")).unwrap();
        let loaded = store.load(&saved.id).unwrap().unwrap();
        assert_eq!(loaded.bio, "Original bio");
        // 时间线不随快照恢复
        assert!(loaded.timeline.is_empty());
    }

    #[test]
    fn test_load_missing_id_leaves_current() {
        let mut store = store();
        store.set_current(story("Keep me")).unwrap();
        assert!(store.load("no-such-id").unwrap().is_none());
        assert_eq!(store.current(), Some(&story("Keep me")));
    }

    #[test]
    fn test_load_replaces_only_bio() {
        let mut store = store();
        store.set_current(story("First")).unwrap();
        let saved = store.save_current("first").unwrap().unwrap();
        store.set_current(story("Second")).unwrap();

        let loaded = store.load(&saved.id).unwrap().unwrap().clone();
        assert_eq!(loaded.bio, "First");
        assert_eq!(loaded.timeline.len(), 1);
    }

    #[test]
    fn test_delete() {
        let mut store = store();
        store.set_current(story("bio")).unwrap();
        let a = store.save_current("a").unwrap().unwrap();
        let b = store.save_current("b").unwrap().unwrap();
        assert_ne!(a.id, b.id);

        assert!(store.delete(&a.id).unwrap());
        assert!(!store.delete(&a.id).unwrap());
        let names: Vec<_> = store.summaries().unwrap().into_iter().map(|s| s.name).collect();
        assert_eq!(names, vec!["b"]);
    }

    #[test]
    fn test_clear_current_keeps_saved() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = SnapshotStore::open(kv.clone()).unwrap();
        store.set_current(story("bio")).unwrap();
        store.save_current("kept").unwrap();

        store.clear_current().unwrap();
        assert!(store.current().is_none());
        assert!(!store.has_biography());
        assert_eq!(kv.get(CURRENT_BIOGRAPHY_KEY).unwrap(), None);
        assert_eq!(store.saved().unwrap().len(), 1);
    }

    #[test]
    fn test_current_survives_reopen() {
        let kv = Arc::new(MemoryStore::new());
        let mut store = SnapshotStore::open(kv.clone()).unwrap();
        store.set_current(story("persisted")).unwrap();

        let reopened = SnapshotStore::open(kv).unwrap();
        assert_eq!(reopened.current().map(|c| c.bio.as_str()), Some("persisted"));
    }

    #[test]
    fn test_saved_sees_writes_from_other_handles() {
        let kv = Arc::new(MemoryStore::new());
        let mut writer = SnapshotStore::open(kv.clone()).unwrap();
        let reader = SnapshotStore::open(kv).unwrap();
        writer.set_current(story("bio")).unwrap();
        writer.save_current("from another tab").unwrap();
        assert_eq!(reader.saved().unwrap()[0].name, "from another tab");
    }

    #[test]
    fn test_life_story_defaults_to_empty() {
        let store = store();
        assert!(store.life_story().unwrap().is_empty());
        store.set_life_story(&story("accumulated")).unwrap();
        assert_eq!(store.life_story().unwrap().bio, "accumulated");
    }
}
