// ==========================================
// HACCP 合规核心 - 温度规格模型
// ==========================================
// 职责: 存储点设定温度的和类型表示
// 红线: 同一时刻只有一种形态有效，不保留其他形态的字段
// ==========================================

use crate::domain::types::TempMode;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

// ==========================================
// TemperatureBand - 闭区间温度带 [min, max]
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureBand {
    pub min: f64,
    pub max: f64,
}

impl TemperatureBand {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// 单点温度带（固定设定温度）
    pub fn point(value: f64) -> Self {
        Self { min: value, max: value }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// other 是否完全落在本温度带内
    pub fn covers(&self, other: &TemperatureBand) -> bool {
        other.min >= self.min && other.max <= self.max
    }

    /// 两侧各扩展 margin
    pub fn expand(&self, margin: f64) -> TemperatureBand {
        TemperatureBand {
            min: self.min - margin,
            max: self.max + margin,
        }
    }

    /// 是否有交集（端点相接也算重叠）
    pub fn overlaps(&self, other: &TemperatureBand) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// 交集
    pub fn intersect(&self, other: &TemperatureBand) -> Option<TemperatureBand> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min <= max {
            Some(TemperatureBand { min, max })
        } else {
            None
        }
    }

    /// value 到温度带的距离（带内为 0）
    pub fn distance_to(&self, value: f64) -> f64 {
        if value < self.min {
            self.min - value
        } else if value > self.max {
            value - self.max
        } else {
            0.0
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

impl fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°C - {}°C", self.min, self.max)
    }
}

// ==========================================
// TemperatureSpec - 设定温度（规范形态）
// ==========================================
// JSON: {"mode":"fixed","value":4} / {"mode":"range","min":2,"max":4} / {"mode":"ambient"}
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum TemperatureSpec {
    /// 单一目标温度 (°C)
    Fixed { value: f64 },
    /// 目标区间 (°C)，要求 min < max
    Range { min: f64, max: f64 },
    /// 常温，隐式绑定配置中的常温带
    Ambient,
}

impl TemperatureSpec {
    pub fn mode(&self) -> TempMode {
        match self {
            TemperatureSpec::Fixed { .. } => TempMode::Fixed,
            TemperatureSpec::Range { .. } => TempMode::Range,
            TemperatureSpec::Ambient => TempMode::Ambient,
        }
    }

    /// 数值是否有限且区间满足 min < max
    pub fn is_well_formed(&self) -> bool {
        match *self {
            TemperatureSpec::Fixed { value } => value.is_finite(),
            TemperatureSpec::Range { min, max } => min.is_finite() && max.is_finite() && min < max,
            TemperatureSpec::Ambient => true,
        }
    }

    /// 设定温度覆盖的温度带
    ///
    /// # 参数
    /// - ambient: 常温模式绑定的温度带
    pub fn band(&self, ambient: TemperatureBand) -> TemperatureBand {
        match *self {
            TemperatureSpec::Fixed { value } => TemperatureBand::point(value),
            TemperatureSpec::Range { min, max } => TemperatureBand::new(min, max),
            TemperatureSpec::Ambient => ambient,
        }
    }

    /// 目标中心温度
    pub fn midpoint(&self, ambient: TemperatureBand) -> f64 {
        self.band(ambient).midpoint()
    }
}

// ==========================================
// ParsedSpec - 解析结果
// ==========================================
// Unknown 与 Ambient 区分：下游必须报硬错误，不得静默按常温处理
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParsedSpec {
    Known(TemperatureSpec),
    Unknown,
}

impl ParsedSpec {
    pub fn known(&self) -> Option<&TemperatureSpec> {
        match self {
            ParsedSpec::Known(spec) => Some(spec),
            ParsedSpec::Unknown => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ParsedSpec::Unknown)
    }
}

impl From<TemperatureSpec> for ParsedSpec {
    fn from(spec: TemperatureSpec) -> Self {
        ParsedSpec::Known(spec)
    }
}

impl Serialize for ParsedSpec {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParsedSpec::Known(spec) => spec.serialize(serializer),
            ParsedSpec::Unknown => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("mode", "unknown")?;
                map.end()
            }
        }
    }
}
