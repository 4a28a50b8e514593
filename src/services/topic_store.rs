//! 自定义资料库 - 业务能力层
//!
//! 负责自定义学习资料的新建、列出与删除，整表读写到单个存储槽位

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{AppResult, BusinessError, FileError};
use crate::infrastructure::SlotStorage;
use crate::models::StudyTopic;

/// 自定义资料使用的存储槽位
pub const CUSTOM_TOPICS_KEY: &str = "ref7_custom_topics";

/// 删除结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    /// 是否删除了资料
    pub removed: bool,
    /// 被删除的是否为当前正在查看的资料（调用方需清空当前视图）
    pub clear_active: bool,
}

/// 自定义资料库
///
/// 列表按创建时间倒序（最新的在前）。
pub struct TopicStore<S: SlotStorage> {
    storage: S,
    topics: Vec<StudyTopic>,
}

impl<S: SlotStorage> TopicStore<S> {
    /// 打开资料库并加载已保存的资料
    ///
    /// 数据缺失、读取失败或内容损坏时视为空列表
    pub fn open(storage: S) -> Self {
        let topics = load_topics(&storage);
        info!("✓ 已加载 {} 份自定义资料", topics.len());
        Self { storage, topics }
    }

    pub fn list(&self) -> &[StudyTopic] {
        &self.topics
    }

    pub fn get(&self, id: &str) -> Option<&StudyTopic> {
        self.topics.iter().find(|t| t.id == id)
    }

    /// 新建自定义资料
    ///
    /// # 参数
    /// - `title`: 标题（去除首尾空白后保存）
    /// - `content`: 资料原文（原样保存）
    ///
    /// # 返回
    /// 返回新建的资料；标题或内容为空时返回校验错误且不修改任何数据
    pub fn create(&mut self, title: &str, content: &str) -> AppResult<StudyTopic> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BusinessError::EmptyTitle.into());
        }
        if content.trim().is_empty() {
            return Err(BusinessError::EmptyContent.into());
        }

        let now = Utc::now().timestamp_millis();
        let id = self.unique_id(now);
        let topic = StudyTopic::custom(id, title.to_string(), content.to_string(), now);

        let mut updated = Vec::with_capacity(self.topics.len() + 1);
        updated.push(topic.clone());
        updated.extend(self.topics.iter().cloned());

        self.persist(&updated)?;
        self.topics = updated;

        info!("✓ 新建自定义资料: {} ({})", topic.title, topic.id);
        Ok(topic)
    }

    /// 删除自定义资料
    ///
    /// # 参数
    /// - `id`: 要删除的资料 ID
    /// - `active_id`: 当前正在查看的资料 ID
    pub fn delete(&mut self, id: &str, active_id: Option<&str>) -> AppResult<DeleteOutcome> {
        let Some(position) = self.topics.iter().position(|t| t.id == id) else {
            debug!("资料 {} 不存在，忽略删除", id);
            return Ok(DeleteOutcome {
                removed: false,
                clear_active: false,
            });
        };

        let mut updated = self.topics.clone();
        let removed = updated.remove(position);

        self.persist(&updated)?;
        self.topics = updated;

        info!("🗑️ 已删除自定义资料: {}", removed.title);
        Ok(DeleteOutcome {
            removed: true,
            clear_active: active_id == Some(id),
        })
    }

    fn persist(&self, topics: &[StudyTopic]) -> AppResult<()> {
        let serialized = serde_json::to_string(topics).map_err(|e| FileError::SerializeFailed {
            key: CUSTOM_TOPICS_KEY.to_string(),
            source: e,
        })?;
        self.storage.write(CUSTOM_TOPICS_KEY, &serialized)
    }

    /// 生成 `custom-<毫秒>` 形式的 ID，同一毫秒内重复时追加序号
    fn unique_id(&self, now: i64) -> String {
        let base = format!("custom-{}", now);
        let mut candidate = base.clone();
        let mut suffix = 1;
        while self.get(&candidate).is_some() {
            candidate = format!("{}-{}", base, suffix);
            suffix += 1;
        }
        candidate
    }
}

fn load_topics(storage: &impl SlotStorage) -> Vec<StudyTopic> {
    let raw = match storage.read(CUSTOM_TOPICS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!("读取自定义资料失败，视为空列表: {}", e);
            return Vec::new();
        }
    };

    match serde_json::from_str(&raw) {
        Ok(topics) => topics,
        Err(e) => {
            warn!("自定义资料数据已损坏，视为空列表: {}", e);
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::infrastructure::{FileSlotStorage, MemorySlotStorage};

    fn stored(storage: &MemorySlotStorage) -> Option<String> {
        storage.read(CUSTOM_TOPICS_KEY).unwrap()
    }

    #[test]
    fn test_blank_input_is_rejected_without_writing() {
        let storage = MemorySlotStorage::new();
        let mut store = TopicStore::open(&storage);

        assert!(matches!(
            store.create("", "x"),
            Err(AppError::Business(BusinessError::EmptyTitle))
        ));
        assert!(matches!(
            store.create("x", "  \n"),
            Err(AppError::Business(BusinessError::EmptyContent))
        ));
        assert!(store.list().is_empty());
        assert_eq!(stored(&storage), None);
    }

    #[test]
    fn test_newest_topic_comes_first() {
        let storage = MemorySlotStorage::new();
        let mut store = TopicStore::open(&storage);

        let first = store.create("第一份", "内容一").unwrap();
        let second = store.create("第二份", "内容二").unwrap();

        let ids: Vec<&str> = store.list().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec![second.id.as_str(), first.id.as_str()]);
        assert_ne!(first.id, second.id);
        assert!(second.is_custom);
        assert_eq!(second.user_content.as_deref(), Some("内容二"));
    }

    #[test]
    fn test_content_is_kept_verbatim() {
        let storage = MemorySlotStorage::new();
        let mut store = TopicStore::open(&storage);

        let topic = store.create("  笔记  ", "  第一行\n第二行  ").unwrap();

        assert_eq!(topic.title, "笔记");
        assert_eq!(topic.user_content.as_deref(), Some("  第一行\n第二行  "));
    }

    #[test]
    fn test_delete_removes_one_and_reports_active() {
        let storage = MemorySlotStorage::new();
        let mut store = TopicStore::open(&storage);
        let keep = store.create("保留", "a").unwrap();
        let gone = store.create("删除", "b").unwrap();

        let outcome = store.delete(&gone.id, Some(gone.id.as_str())).unwrap();
        assert_eq!(
            outcome,
            DeleteOutcome {
                removed: true,
                clear_active: true
            }
        );
        assert_eq!(store.list(), &[keep.clone()]);

        let reloaded = TopicStore::open(&storage);
        assert_eq!(reloaded.list(), &[keep.clone()]);

        let outcome = store.delete(&keep.id, Some("1")).unwrap();
        assert!(outcome.removed);
        assert!(!outcome.clear_active);
    }

    #[test]
    fn test_delete_unknown_id_changes_nothing() {
        let storage = MemorySlotStorage::new();
        let mut store = TopicStore::open(&storage);
        store.create("资料", "内容").unwrap();
        let before = stored(&storage);

        let outcome = store.delete("custom-0", None).unwrap();

        assert!(!outcome.removed);
        assert_eq!(store.list().len(), 1);
        assert_eq!(stored(&storage), before);
    }

    #[test]
    fn test_corrupt_data_loads_as_empty() {
        let storage = MemorySlotStorage::with_slot(CUSTOM_TOPICS_KEY, "{not json");
        let store = TopicStore::open(&storage);

        assert!(store.list().is_empty());
    }

    #[test]
    fn test_file_roundtrip_preserves_order() {
        let dir = std::env::temp_dir().join(format!("ref7-store-{}", std::process::id()));
        let mut store = TopicStore::open(FileSlotStorage::new(&dir));
        store.create("一", "1").unwrap();
        store.create("二", "2").unwrap();
        store.create("三", "3").unwrap();

        let reloaded = TopicStore::open(FileSlotStorage::new(&dir));

        assert_eq!(reloaded.list(), store.list());
        std::fs::remove_dir_all(&dir).ok();
    }

    /// 写入总是失败的存储
    struct ReadOnlyStorage;

    impl SlotStorage for ReadOnlyStorage {
        fn read(&self, _key: &str) -> AppResult<Option<String>> {
            Ok(None)
        }

        fn write(&self, key: &str, _value: &str) -> AppResult<()> {
            Err(FileError::write_failed(
                key,
                std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            )
            .into())
        }
    }

    #[test]
    fn test_failed_write_leaves_list_unchanged() {
        let mut store = TopicStore::open(ReadOnlyStorage);

        assert!(store.create("标题", "内容").is_err());
        assert!(store.list().is_empty());
    }
}
