// ==========================================
// HACCP 合规核心 - 领域模型层
// ==========================================
// 职责: 定义温度规格、类别、判定结果与记录
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod category;
pub mod compliance;
pub mod records;
pub mod temperature;
pub mod types;

// 重导出核心类型
pub use category::{Category, CategorySeed};
pub use compliance::{ComplianceCode, ComplianceResult, ConflictReport};
pub use records::{
    ConservationPoint, MaintenanceData, MaintenanceTaskConfig, PointRecord, ProductRecord,
    TemperatureLogRecord,
};
pub use temperature::{ParsedSpec, TemperatureBand, TemperatureSpec};
pub use types::{
    ComplianceType, ExpiryLevel, MaintenanceTaskKind, ReadingLevel, StatusColor, StorageKind,
    TempMode,
};
