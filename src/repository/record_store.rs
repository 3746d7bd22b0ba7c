// ==========================================
// HACCP 合规核心 - 记录存储
// ==========================================
// 职责: UI 侧 load(key, default) / save(key, data) 协作接口
// 存储: 内存 或 SQLite record_kv 表（key → JSON 文本）
// 规则: 键不存在 → 返回默认值；JSON 损坏 → Serialization 错误
// ==========================================

use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use tracing::{debug, warn};

/// 标准存储键
pub mod record_keys {
    pub const INVENTORY: &str = "haccp:inventory";
    pub const REFRIGERATORS: &str = "haccp:refrigerators";
    pub const TEMPERATURES: &str = "haccp-temperatures";
    pub const USED_INGREDIENTS: &str = "haccp:used-ingredients";
    pub const ONBOARDING: &str = "haccp:onboarding";
    pub const SUPPLIERS: &str = "haccp:suppliers";
    pub const ORDERS: &str = "haccp:orders";
    pub const MIGRATED: &str = "haccp:migrated";
}

fn check_key(key: &str) -> RepositoryResult<()> {
    if key.trim().is_empty() {
        return Err(RepositoryError::InvalidKey(key.to_string()));
    }
    Ok(())
}

// ==========================================
// RecordStore - 原始 JSON 文本存取
// ==========================================
pub trait RecordStore: Send + Sync {
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>>;

    fn save_raw(&self, key: &str, json: &str) -> RepositoryResult<()>;

    /// 删除键；返回是否存在
    fn remove(&self, key: &str) -> RepositoryResult<bool>;
}

/// 类型化存取（对所有 RecordStore 自动实现）
pub trait RecordStoreExt: RecordStore {
    /// 读取记录，键不存在时返回 default
    fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> RepositoryResult<T> {
        match self.load_raw(key)? {
            None => Ok(default),
            Some(raw) => serde_json::from_str(&raw).map_err(|e| {
                warn!(key, error = %e, "存储记录 JSON 损坏");
                RepositoryError::serialization(key, e)
            }),
        }
    }

    fn save<T: Serialize + ?Sized>(&self, key: &str, data: &T) -> RepositoryResult<()> {
        let raw = serde_json::to_string(data).map_err(|e| RepositoryError::serialization(key, e))?;
        self.save_raw(key, &raw)
    }
}

impl<S: RecordStore + ?Sized> RecordStoreExt for S {}

// ==========================================
// MemoryRecordStore - 内存实现
// ==========================================
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecordStore for MemoryRecordStore {
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>> {
        check_key(key)?;
        let entries = self
            .entries
            .read()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn save_raw(&self, key: &str, json: &str) -> RepositoryResult<()> {
        check_key(key)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        entries.insert(key.to_string(), json.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> RepositoryResult<bool> {
        check_key(key)?;
        let mut entries = self
            .entries
            .write()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        Ok(entries.remove(key).is_some())
    }
}

// ==========================================
// SqliteRecordStore - SQLite 实现
// ==========================================
pub struct SqliteRecordStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// 打开数据库文件并建表
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Self::from_connection(Arc::new(Mutex::new(conn)))
    }

    /// 从已有连接创建（可与 ConfigManager 共享连接）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let store = Self { conn };
        {
            let conn = store.get_conn()?;
            configure_sqlite_connection(&conn)?;
            conn.execute_batch(
                r#"
                CREATE TABLE IF NOT EXISTS record_kv (
                    key TEXT PRIMARY KEY,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
                );
                "#,
            )?;
        }
        Ok(store)
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 全部键（按字母序）
    pub fn keys(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT key FROM record_kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}

impl RecordStore for SqliteRecordStore {
    fn load_raw(&self, key: &str) -> RepositoryResult<Option<String>> {
        check_key(key)?;
        let conn = self.get_conn()?;
        let value = conn
            .query_row(
                "SELECT value FROM record_kv WHERE key = ?1",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn save_raw(&self, key: &str, json: &str) -> RepositoryResult<()> {
        check_key(key)?;
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO record_kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, json],
        )?;
        debug!(key, bytes = json.len(), "记录已保存");
        Ok(())
    }

    fn remove(&self, key: &str) -> RepositoryResult<bool> {
        check_key(key)?;
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM record_kv WHERE key = ?1", params![key])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory_connection;

    #[test]
    fn test_memory_store_default_and_round_trip() {
        let store = MemoryRecordStore::new();
        let empty: Vec<String> = store.load(record_keys::SUPPLIERS, Vec::new()).unwrap();
        assert!(empty.is_empty());

        store.save(record_keys::SUPPLIERS, &vec!["Caseificio Rossi"]).unwrap();
        let loaded: Vec<String> = store.load(record_keys::SUPPLIERS, Vec::new()).unwrap();
        assert_eq!(loaded, vec!["Caseificio Rossi".to_string()]);
        assert!(store.remove(record_keys::SUPPLIERS).unwrap());
        assert!(!store.remove(record_keys::SUPPLIERS).unwrap());
    }

    #[test]
    fn test_corrupt_json_is_error() {
        let store = MemoryRecordStore::new();
        store.save_raw(record_keys::ORDERS, "{not json").unwrap();
        let result: RepositoryResult<Vec<String>> = store.load(record_keys::ORDERS, Vec::new());
        assert!(matches!(result, Err(RepositoryError::Serialization { .. })));
    }

    #[test]
    fn test_blank_key_rejected() {
        let store = MemoryRecordStore::new();
        assert!(matches!(store.load_raw("  "), Err(RepositoryError::InvalidKey(_))));
    }

    #[test]
    fn test_sqlite_store_upsert() {
        let conn = open_in_memory_connection().unwrap();
        let store = SqliteRecordStore::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        store.save(record_keys::MIGRATED, &false).unwrap();
        store.save(record_keys::MIGRATED, &true).unwrap();
        assert!(store.load(record_keys::MIGRATED, false).unwrap());
        assert_eq!(store.keys().unwrap(), vec![record_keys::MIGRATED.to_string()]);
    }
}
