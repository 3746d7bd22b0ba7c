// ==========================================
// HACCP 合规核心 - 引擎层
// ==========================================
// 职责: 设定温度解析、类别注册表、合规判定、冲突检测、记录校验
// 红线: 纯函数，无 I/O；注册表与配置按引用注入
// ==========================================

pub mod category_registry;
pub mod compliance;
pub mod conflict;
pub mod haccp_engine;
pub mod migration;
pub mod presentation;
pub mod spec_parser;
pub mod validators;

// 重导出核心引擎
pub use category_registry::CategoryRegistry;
pub use compliance::ComplianceEvaluator;
pub use conflict::ConflictDetector;
pub use haccp_engine::HaccpEngine;
pub use migration::{MigrationError, PointMigrator};
pub use presentation::{OptimalRange, Presenter, ReadingStatus};
pub use spec_parser::{parse_spec, SpecExtractor, SpecParser};
pub use validators::RecordValidator;
