// ==========================================
// HACCP 合规核心 - 领域类型定义
// ==========================================
// 三级判定: compliant / warning / error
// 颜色提示与判定类型 1:1 绑定，UI 直接渲染
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 判定类型 (Compliance Type)
// ==========================================
// error 必须阻断持久化；warning 不阻断，但需提示用户
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplianceType {
    Compliant, // 合规
    Warning,   // 可接受但非最佳
    Error,     // 硬性违规
}

impl ComplianceType {
    /// 对应的 UI 颜色提示
    pub fn color(self) -> StatusColor {
        match self {
            ComplianceType::Compliant => StatusColor::Green,
            ComplianceType::Warning => StatusColor::Yellow,
            ComplianceType::Error => StatusColor::Red,
        }
    }

    /// 是否阻断持久化
    pub fn blocks_persistence(self) -> bool {
        matches!(self, ComplianceType::Error)
    }
}

impl fmt::Display for ComplianceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplianceType::Compliant => write!(f, "compliant"),
            ComplianceType::Warning => write!(f, "warning"),
            ComplianceType::Error => write!(f, "error"),
        }
    }
}

// ==========================================
// 颜色提示 (Status Color)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Green,
    Yellow,
    Red,
}

impl fmt::Display for StatusColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusColor::Green => write!(f, "green"),
            StatusColor::Yellow => write!(f, "yellow"),
            StatusColor::Red => write!(f, "red"),
        }
    }
}

// ==========================================
// 温度模式 (Temperature Mode)
// ==========================================
// 规范化记录中的 setTempMode 取值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TempMode {
    Fixed,
    Range,
    Ambient,
}

impl TempMode {
    /// 解析模式标签（大小写不敏感，未识别返回 None）
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "fixed" => Some(TempMode::Fixed),
            "range" => Some(TempMode::Range),
            "ambient" => Some(TempMode::Ambient),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TempMode::Fixed => "fixed",
            TempMode::Range => "range",
            TempMode::Ambient => "ambient",
        }
    }
}

impl fmt::Display for TempMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// 存储设备类型 (Storage Kind)
// ==========================================
// 由设定温度推导，仅用于展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageKind {
    Ambient,              // 常温
    Freezer,              // ≤ 0°C
    Refrigerator,         // ≤ 4°C
    RefrigeratorWarmZone, // ≤ 8°C
    ControlledAmbient,    // > 8°C
    Unknown,              // 无法解析
}

impl StorageKind {
    /// 翻译键
    pub fn i18n_key(self) -> &'static str {
        match self {
            StorageKind::Ambient => "storage_kind.ambient",
            StorageKind::Freezer => "storage_kind.freezer",
            StorageKind::Refrigerator => "storage_kind.refrigerator",
            StorageKind::RefrigeratorWarmZone => "storage_kind.refrigerator_warm_zone",
            StorageKind::ControlledAmbient => "storage_kind.controlled_ambient",
            StorageKind::Unknown => "storage_kind.unknown",
        }
    }
}

// ==========================================
// 读数着色等级 (Reading Level)
// ==========================================
// 仅用于着色，不参与合规判定
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadingLevel {
    Green,  // ≤ 理想带
    Orange, // ≤ 容差
    Red,    // > 容差
}

// ==========================================
// 保质期状态 (Expiry Level)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExpiryLevel {
    Ok,       // 距到期超过预警天数
    Expiring, // 预警期内
    Critical, // 临界期内（含当天）
    Expired,  // 已过期
}

// ==========================================
// 维护任务类型 (Maintenance Task Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceTaskKind {
    TemperatureMonitoring, // 温度监控
    Sanitization,          // 清洁消毒
    Defrosting,            // 除霜
}

impl fmt::Display for MaintenanceTaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaintenanceTaskKind::TemperatureMonitoring => write!(f, "temperature_monitoring"),
            MaintenanceTaskKind::Sanitization => write!(f, "sanitization"),
            MaintenanceTaskKind::Defrosting => write!(f, "defrosting"),
        }
    }
}
