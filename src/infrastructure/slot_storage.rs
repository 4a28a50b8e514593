//! 槽位存储 - 基础设施层
//!
//! 持有持久化资源，只暴露"按名读写整块文本"的能力

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::error::{AppError, AppResult, FileError};

/// 键值槽位存储
///
/// 职责：
/// - 按名称读写一整块序列化文本
/// - 不认识 StudyTopic
/// - 不做部分更新
pub trait SlotStorage {
    /// 读取槽位，不存在时返回 `None`
    fn read(&self, key: &str) -> AppResult<Option<String>>;

    /// 整体覆盖写入槽位
    fn write(&self, key: &str, value: &str) -> AppResult<()>;
}

/// 基于文件的槽位存储，每个槽位对应 `<dir>/<key>.json`
pub struct FileSlotStorage {
    dir: PathBuf,
}

impl FileSlotStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn slot_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SlotStorage for FileSlotStorage {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let path = self.slot_path(key);
        if !path.exists() {
            debug!("槽位 {} 不存在: {}", key, path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| FileError::read_failed(path.display().to_string(), e))?;
        Ok(Some(content))
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| FileError::write_failed(self.dir.display().to_string(), e))?;

        // 先写临时文件再改名，避免写到一半留下损坏的数据
        let path = self.slot_path(key);
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)
            .map_err(|e| FileError::write_failed(tmp_path.display().to_string(), e))?;
        fs::rename(&tmp_path, &path)
            .map_err(|e| FileError::write_failed(path.display().to_string(), e))?;

        debug!("槽位 {} 已写入 {} 字节", key, value.len());
        Ok(())
    }
}

/// 内存槽位存储
#[derive(Default)]
pub struct MemorySlotStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemorySlotStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置槽位内容
    pub fn with_slot(key: impl Into<String>, value: impl Into<String>) -> Self {
        let storage = Self::new();
        if let Ok(mut slots) = storage.slots.lock() {
            slots.insert(key.into(), value.into());
        }
        storage
    }
}

impl SlotStorage for MemorySlotStorage {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        let slots = self
            .slots
            .lock()
            .map_err(|e| AppError::Other(format!("内存存储锁已损坏: {}", e)))?;
        Ok(slots.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        let mut slots = self
            .slots
            .lock()
            .map_err(|e| AppError::Other(format!("内存存储锁已损坏: {}", e)))?;
        slots.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<S: SlotStorage + ?Sized> SlotStorage for &S {
    fn read(&self, key: &str) -> AppResult<Option<String>> {
        (**self).read(key)
    }

    fn write(&self, key: &str, value: &str) -> AppResult<()> {
        (**self).write(key, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_storage_roundtrip() {
        let dir = std::env::temp_dir().join(format!("ref7-slots-{}", std::process::id()));
        let storage = FileSlotStorage::new(&dir);
        assert_eq!(storage.dir(), dir.as_path());

        assert_eq!(storage.read("topics").unwrap(), None);

        storage.write("topics", "[1,2,3]").unwrap();
        assert_eq!(storage.read("topics").unwrap().as_deref(), Some("[1,2,3]"));

        storage.write("topics", "[]").unwrap();
        assert_eq!(storage.read("topics").unwrap().as_deref(), Some("[]"));
        assert!(!dir.join("topics.json.tmp").exists());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_memory_storage_overwrites() {
        let storage = MemorySlotStorage::with_slot("k", "old");
        storage.write("k", "new").unwrap();

        assert_eq!(storage.read("k").unwrap().as_deref(), Some("new"));
        assert_eq!(storage.read("other").unwrap(), None);
    }
}
