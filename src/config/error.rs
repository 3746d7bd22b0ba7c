// ==========================================
// HACCP 合规核心 - 配置层错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    // ===== 配置值错误 =====
    #[error("配置值无效 (key: {key}): {message}")]
    InvalidValue { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ParseError {
        key: String,
        value: String,
        message: String,
    },

    // ===== 类别种子错误 =====
    #[error("类别种子无效 (id: {id}): {message}")]
    InvalidCategory { id: String, message: String },

    #[error("类别 ID 重复: {0}")]
    DuplicateCategory(String),

    #[error("类别注册表为空")]
    EmptyRegistry,

    // ===== 数据库错误 =====
    #[error("数据库错误: {0}")]
    Database(String),

    #[error("锁获取失败: {0}")]
    LockError(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(key: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for ConfigError {
    fn from(err: rusqlite::Error) -> Self {
        ConfigError::Database(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
