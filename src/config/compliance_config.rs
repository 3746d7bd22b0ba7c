// ==========================================
// HACCP 合规核心 - 合规判定配置
// ==========================================
// 职责: 容差、理想带、常温带、物理读数边界等常量
// 红线: 启动时构造一次并校验，之后只读，按引用注入引擎
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::temperature::TemperatureBand;
use crate::i18n;
use serde::{Deserialize, Serialize};

/// 默认共享容差 (°C)
pub const DEFAULT_TOLERANCE_C: f64 = 2.0;

/// 默认理想带 (°C)，仅用于着色与固定温度读数的“精确命中”
pub const DEFAULT_IDEAL_BAND_C: f64 = 0.5;

/// 默认常温带 (°C)
pub const DEFAULT_AMBIENT_MIN_C: f64 = 15.0;
pub const DEFAULT_AMBIENT_MAX_C: f64 = 25.0;

/// 默认物理读数边界 (°C)
pub const DEFAULT_READING_MIN_C: f64 = -50.0;
pub const DEFAULT_READING_MAX_C: f64 = 100.0;

/// 每个存储点最多可分配的类别数
pub const DEFAULT_MAX_CATEGORIES_PER_POINT: usize = 5;

/// 保质期预警/临界天数
pub const DEFAULT_EXPIRY_WARNING_DAYS: i64 = 3;
pub const DEFAULT_EXPIRY_CRITICAL_DAYS: i64 = 1;

// ==========================================
// ComplianceConfig - 判定配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ComplianceConfig {
    /// 共享容差：类别区间两侧各扩展该值得到“可接受”区间
    pub tolerance_c: f64,
    /// 理想带：固定温度读数偏差在此范围内视为合规
    pub ideal_band_c: f64,
    /// 常温模式绑定的温度带
    pub ambient_range: TemperatureBand,
    /// 温度记录允许的物理读数范围
    pub reading_bounds: TemperatureBand,
    pub max_categories_per_point: usize,
    pub expiry_warning_days: i64,
    pub expiry_critical_days: i64,
    /// 结果消息语言
    pub locale: String,
}

impl Default for ComplianceConfig {
    fn default() -> Self {
        Self {
            tolerance_c: DEFAULT_TOLERANCE_C,
            ideal_band_c: DEFAULT_IDEAL_BAND_C,
            ambient_range: TemperatureBand::new(DEFAULT_AMBIENT_MIN_C, DEFAULT_AMBIENT_MAX_C),
            reading_bounds: TemperatureBand::new(DEFAULT_READING_MIN_C, DEFAULT_READING_MAX_C),
            max_categories_per_point: DEFAULT_MAX_CATEGORIES_PER_POINT,
            expiry_warning_days: DEFAULT_EXPIRY_WARNING_DAYS,
            expiry_critical_days: DEFAULT_EXPIRY_CRITICAL_DAYS,
            locale: i18n::DEFAULT_LOCALE.to_string(),
        }
    }
}

impl ComplianceConfig {
    /// 从 JSON 构造（缺失字段取默认值）并校验
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: ComplianceConfig = serde_json::from_str(json)?;
        config.validated()
    }

    pub fn with_locale(mut self, locale: &str) -> Self {
        self.locale = locale.to_string();
        self
    }

    pub fn with_tolerance(mut self, tolerance_c: f64) -> Self {
        self.tolerance_c = tolerance_c;
        self
    }

    /// 校验后返回自身
    pub fn validated(self) -> ConfigResult<Self> {
        self.validate()?;
        Ok(self)
    }

    /// 校验配置一致性
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.tolerance_c.is_finite() || self.tolerance_c < 0.0 {
            return Err(ConfigError::invalid("toleranceC", "必须为非负有限数"));
        }

        if !self.ideal_band_c.is_finite() || self.ideal_band_c < 0.0 {
            return Err(ConfigError::invalid("idealBandC", "必须为非负有限数"));
        }

        if self.ideal_band_c > self.tolerance_c {
            return Err(ConfigError::invalid(
                "idealBandC",
                format!("理想带 {} 不能大于容差 {}", self.ideal_band_c, self.tolerance_c),
            ));
        }

        Self::check_band("ambientRange", &self.ambient_range)?;
        Self::check_band("readingBounds", &self.reading_bounds)?;

        if self.max_categories_per_point == 0 {
            return Err(ConfigError::invalid("maxCategoriesPerPoint", "至少为 1"));
        }

        if self.expiry_critical_days < 0 || self.expiry_warning_days < self.expiry_critical_days {
            return Err(ConfigError::invalid(
                "expiryWarningDays",
                "需满足 0 <= 临界天数 <= 预警天数",
            ));
        }

        if !i18n::is_supported_locale(&self.locale) {
            return Err(ConfigError::invalid(
                "locale",
                format!("不支持的语言: {}", self.locale),
            ));
        }

        Ok(())
    }

    fn check_band(key: &str, band: &TemperatureBand) -> ConfigResult<()> {
        if !band.min.is_finite() || !band.max.is_finite() || band.min >= band.max {
            return Err(ConfigError::invalid(key, format!("区间无效: {}", band)));
        }
        Ok(())
    }
}
