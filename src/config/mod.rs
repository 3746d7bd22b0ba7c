// ==========================================
// HACCP 合规核心 - 配置层
// ==========================================
// 职责: 判定常量与类别种子的加载与校验
// 存储: config_kv 表（可选），缺失时使用默认值
// ==========================================

pub mod compliance_config;
pub mod config_manager;
pub mod error;

// 重导出
pub use compliance_config::ComplianceConfig;
pub use config_manager::{config_keys, ConfigManager};
pub use error::{ConfigError, ConfigResult};
