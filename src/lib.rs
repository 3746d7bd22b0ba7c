// ==========================================
// HACCP 合规核心 - 核心库
// ==========================================
// 职责: 设定温度解析、合规判定、类别冲突检测、记录校验
// 技术栈: Rust + SQLite（可选配置/记录存储）
// 系统定位: 纯核心，UI 与远程同步作为外部协作方
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "it");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 温度规格、类别与记录
pub mod domain;

// 引擎层 - 合规规则
pub mod engine;

// 配置层 - 合规常量与覆写
pub mod config;

// 数据仓储层 - 记录存储协作接口
pub mod repository;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{
    ComplianceType, ExpiryLevel, ReadingLevel, StatusColor, StorageKind, TempMode,
};

// 领域实体
pub use domain::{
    Category, CategorySeed, ComplianceCode, ComplianceResult, ConflictReport, ConservationPoint,
    ParsedSpec, PointRecord, ProductRecord, TemperatureBand, TemperatureLogRecord,
    TemperatureSpec,
};

// 引擎
pub use engine::{
    parse_spec, CategoryRegistry, ComplianceEvaluator, ConflictDetector, HaccpEngine,
    PointMigrator, Presenter, RecordValidator, SpecParser,
};

// 配置
pub use config::{ComplianceConfig, ConfigError, ConfigManager};

// 存储
pub use repository::{MemoryRecordStore, RecordStore, RecordStoreExt, SqliteRecordStore};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "HACCP Compliance";
