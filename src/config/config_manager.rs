// ==========================================
// HACCP 合规核心 - 配置管理器
// ==========================================
// 职责: 从 config_kv 表加载判定常量与类别种子覆写
// 存储: config_kv 表 (key-value + scope)
// 规则: 缺失的键回退到默认值；组装结果必须通过 ComplianceConfig::validate
// ==========================================

use crate::config::compliance_config::ComplianceConfig;
use crate::config::error::{ConfigError, ConfigResult};
use crate::db::{configure_sqlite_connection, open_sqlite_connection};
use crate::domain::category::CategorySeed;
use crate::domain::temperature::TemperatureBand;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// 全局作用域
pub const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在时创建，并建立 config_kv 表）
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let manager = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        manager.ensure_schema()?;
        Ok(manager)
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn
                .lock()
                .map_err(|e| ConfigError::LockError(e.to_string()))?;
            configure_sqlite_connection(&guard)?;
        }
        let manager = Self { conn };
        manager.ensure_schema()?;
        Ok(manager)
    }

    fn lock(&self) -> ConfigResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| ConfigError::LockError(e.to_string()))
    }

    /// 建表（幂等）
    pub fn ensure_schema(&self) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS config_kv (
                scope_id TEXT NOT NULL DEFAULT 'global',
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                PRIMARY KEY (scope_id, key)
            );
            "#,
        )?;
        Ok(())
    }

    /// 读取 global scope 的配置值
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row(
                "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
                params![GLOBAL_SCOPE, key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    /// 写入 global scope 的配置值（UPSERT）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        debug!(key, value, "配置已写入");
        Ok(())
    }

    /// 获取所有 global 配置的快照
    pub fn get_config_snapshot(&self) -> ConfigResult<BTreeMap<String, String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut snapshot = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            snapshot.insert(key, value);
        }
        Ok(snapshot)
    }

    /// 读取并解析数值型配置
    fn get_parsed<T>(&self, key: &str) -> ConfigResult<Option<T>>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        match self.get_global_config_value(key)? {
            None => Ok(None),
            Some(raw) => raw
                .trim()
                .parse::<T>()
                .map(Some)
                .map_err(|e| ConfigError::ParseError {
                    key: key.to_string(),
                    value: raw.clone(),
                    message: e.to_string(),
                }),
        }
    }

    // ===== 判定配置 =====

    /// 组装判定配置（缺失键取默认值）
    pub fn load_compliance_config(&self) -> ConfigResult<ComplianceConfig> {
        let defaults = ComplianceConfig::default();

        let config = ComplianceConfig {
            tolerance_c: self
                .get_parsed(config_keys::TOLERANCE_C)?
                .unwrap_or(defaults.tolerance_c),
            ideal_band_c: self
                .get_parsed(config_keys::IDEAL_BAND_C)?
                .unwrap_or(defaults.ideal_band_c),
            ambient_range: TemperatureBand::new(
                self.get_parsed(config_keys::AMBIENT_MIN_C)?
                    .unwrap_or(defaults.ambient_range.min),
                self.get_parsed(config_keys::AMBIENT_MAX_C)?
                    .unwrap_or(defaults.ambient_range.max),
            ),
            reading_bounds: TemperatureBand::new(
                self.get_parsed(config_keys::READING_MIN_C)?
                    .unwrap_or(defaults.reading_bounds.min),
                self.get_parsed(config_keys::READING_MAX_C)?
                    .unwrap_or(defaults.reading_bounds.max),
            ),
            max_categories_per_point: self
                .get_parsed(config_keys::MAX_CATEGORIES_PER_POINT)?
                .unwrap_or(defaults.max_categories_per_point),
            expiry_warning_days: self
                .get_parsed(config_keys::EXPIRY_WARNING_DAYS)?
                .unwrap_or(defaults.expiry_warning_days),
            expiry_critical_days: self
                .get_parsed(config_keys::EXPIRY_CRITICAL_DAYS)?
                .unwrap_or(defaults.expiry_critical_days),
            locale: self
                .get_global_config_value(config_keys::LOCALE)?
                .map(|v| v.trim().to_string())
                .unwrap_or(defaults.locale),
        };

        config.validated()
    }

    // ===== 类别种子 =====

    /// 读取类别种子覆写（JSON 数组）
    ///
    /// # 返回
    /// - None: 未配置，使用内置注册表
    pub fn load_category_seed(&self) -> ConfigResult<Option<Vec<CategorySeed>>> {
        match self.get_global_config_value(config_keys::CATEGORY_SEED)? {
            None => Ok(None),
            Some(raw) => {
                let seed: Vec<CategorySeed> = serde_json::from_str(&raw)?;
                Ok(Some(seed))
            }
        }
    }

    /// 写入类别种子覆写
    pub fn save_category_seed(&self, seed: &[CategorySeed]) -> ConfigResult<()> {
        let raw = serde_json::to_string(seed)?;
        self.set_global_config_value(config_keys::CATEGORY_SEED, &raw)
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 容差
    pub const TOLERANCE_C: &str = "haccp/tolerance_c";
    pub const IDEAL_BAND_C: &str = "haccp/ideal_band_c";

    // 常温带
    pub const AMBIENT_MIN_C: &str = "haccp/ambient_min_c";
    pub const AMBIENT_MAX_C: &str = "haccp/ambient_max_c";

    // 物理读数边界
    pub const READING_MIN_C: &str = "haccp/reading_min_c";
    pub const READING_MAX_C: &str = "haccp/reading_max_c";

    pub const MAX_CATEGORIES_PER_POINT: &str = "haccp/max_categories_per_point";

    // 保质期
    pub const EXPIRY_WARNING_DAYS: &str = "haccp/expiry_warning_days";
    pub const EXPIRY_CRITICAL_DAYS: &str = "haccp/expiry_critical_days";

    pub const LOCALE: &str = "haccp/locale";

    // 类别种子 (JSON)
    pub const CATEGORY_SEED: &str = "haccp/category_seed";
}
