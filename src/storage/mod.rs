//! 本地持久化：键值存储抽象（内存 / JSON 文件）与传记快照

pub mod kv;
pub mod snapshot;

pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use snapshot::{SnapshotStore, CURRENT_BIOGRAPHY_KEY, LIFE_STORY_KEY, SAVED_BIOGRAPHIES_KEY};
