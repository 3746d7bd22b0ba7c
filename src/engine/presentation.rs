// ==========================================
// HACCP 合规核心 - 展示辅助
// ==========================================
// 职责: 设定温度文本、设备类型、读数着色、最优区间建议、保质期状态
// 说明: 仅用于展示，不参与合规判定
// ==========================================

use crate::config::compliance_config::ComplianceConfig;
use crate::domain::category::Category;
use crate::domain::temperature::{ParsedSpec, TemperatureBand, TemperatureSpec};
use crate::domain::types::{ExpiryLevel, ReadingLevel, StorageKind};
use crate::engine::category_registry::CategoryRegistry;
use crate::engine::validators::parse_expiry_date;
use crate::i18n::{fmt_celsius, tr, tr_with_args};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeSet;

// 设备类型阈值 (°C)
const FREEZER_MAX_C: f64 = 0.0;
const REFRIGERATOR_MAX_C: f64 = 4.0;
const WARM_ZONE_MAX_C: f64 = 8.0;

/// 读数着色结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingStatus {
    pub level: ReadingLevel,
    /// 与目标中心温度的绝对偏差 (°C)
    pub difference: f64,
}

/// 最优温度区间建议
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalRange {
    pub compatible: bool,
    pub range: Option<TemperatureBand>,
    pub message: String,
}

pub struct Presenter<'a> {
    registry: &'a CategoryRegistry,
    config: &'a ComplianceConfig,
}

impl<'a> Presenter<'a> {
    pub fn new(registry: &'a CategoryRegistry, config: &'a ComplianceConfig) -> Self {
        Self { registry, config }
    }

    /// "4°C" / "2°C - 4°C" / "Ambiente" / "N/A"
    pub fn display_temperature(&self, spec: &ParsedSpec) -> String {
        match spec {
            ParsedSpec::Known(TemperatureSpec::Fixed { value }) => format!("{}°C", fmt_celsius(*value)),
            ParsedSpec::Known(TemperatureSpec::Range { min, max }) => {
                format!("{}°C - {}°C", fmt_celsius(*min), fmt_celsius(*max))
            }
            ParsedSpec::Known(TemperatureSpec::Ambient) => tr(&self.config.locale, "display.ambient"),
            ParsedSpec::Unknown => tr(&self.config.locale, "display.not_available"),
        }
    }

    /// 由设定温度推导设备类型（区间取中心温度）
    pub fn storage_kind(&self, spec: &ParsedSpec) -> StorageKind {
        let spec = match spec {
            ParsedSpec::Known(TemperatureSpec::Ambient) => return StorageKind::Ambient,
            ParsedSpec::Known(spec) if spec.is_well_formed() => spec,
            _ => return StorageKind::Unknown,
        };

        let target = spec.midpoint(self.config.ambient_range);
        if target <= FREEZER_MAX_C {
            StorageKind::Freezer
        } else if target <= REFRIGERATOR_MAX_C {
            StorageKind::Refrigerator
        } else if target <= WARM_ZONE_MAX_C {
            StorageKind::RefrigeratorWarmZone
        } else {
            StorageKind::ControlledAmbient
        }
    }

    pub fn storage_kind_label(&self, spec: &ParsedSpec) -> String {
        tr(&self.config.locale, self.storage_kind(spec).i18n_key())
    }

    /// 读数着色：≤ 理想带 绿色；< 容差 橙色；否则红色
    ///
    /// 设定温度未知或读数非有限数时返回 None
    pub fn reading_status(&self, actual: f64, spec: &ParsedSpec) -> Option<ReadingStatus> {
        let spec = spec.known().filter(|s| s.is_well_formed())?;
        if !actual.is_finite() {
            return None;
        }

        let difference = (actual - spec.midpoint(self.config.ambient_range)).abs();
        let level = if difference <= self.config.ideal_band_c {
            ReadingLevel::Green
        } else if difference < self.config.tolerance_c {
            ReadingLevel::Orange
        } else {
            ReadingLevel::Red
        };
        Some(ReadingStatus { level, difference })
    }

    /// 所选类别原始安全区间的交集建议
    ///
    /// 未知与速冷机类别不参与；无可用类别时返回 None
    pub fn optimal_range<S: AsRef<str>>(&self, category_ids: &[S]) -> Option<OptimalRange> {
        let categories: Vec<&Category> = category_ids
            .iter()
            .map(|id| id.as_ref().trim())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| self.registry.get(id))
            .filter(|c| !c.is_blast_chiller())
            .collect();

        let (first, rest) = categories.split_first()?;
        let locale = &self.config.locale;

        if rest.is_empty() {
            let band = first.safe_band();
            return Some(OptimalRange {
                compatible: true,
                range: Some(band),
                message: tr_with_args(
                    locale,
                    "suggestion.single",
                    &[
                        ("name", first.name()),
                        ("min", &fmt_celsius(band.min)),
                        ("max", &fmt_celsius(band.max)),
                    ],
                ),
            });
        }

        let shared = rest
            .iter()
            .try_fold(first.safe_band(), |acc, c| acc.intersect(&c.safe_band()));

        Some(match shared {
            Some(band) => OptimalRange {
                compatible: true,
                range: Some(band),
                message: tr_with_args(
                    locale,
                    "suggestion.shared",
                    &[("min", &fmt_celsius(band.min)), ("max", &fmt_celsius(band.max))],
                ),
            },
            None => OptimalRange {
                compatible: false,
                range: None,
                message: tr(locale, "suggestion.incompatible"),
            },
        })
    }

    /// 保质期状态（按自然日计算）
    pub fn expiry_status(&self, expiry: NaiveDate, today: NaiveDate) -> ExpiryLevel {
        let days = (expiry - today).num_days();
        if days < 0 {
            ExpiryLevel::Expired
        } else if days <= self.config.expiry_critical_days {
            ExpiryLevel::Critical
        } else if days <= self.config.expiry_warning_days {
            ExpiryLevel::Expiring
        } else {
            ExpiryLevel::Ok
        }
    }

    /// 文本到期日的保质期状态（无法解析返回 None）
    pub fn expiry_status_str(&self, expiry: &str, today: NaiveDate) -> Option<ExpiryLevel> {
        parse_expiry_date(expiry).map(|date| self.expiry_status(date, today))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed(value: f64) -> ParsedSpec {
        ParsedSpec::Known(TemperatureSpec::Fixed { value })
    }

    #[test]
    fn test_display_and_kind() {
        let registry = CategoryRegistry::builtin();
        let config = ComplianceConfig::default().with_locale("en");
        let p = Presenter::new(&registry, &config);

        assert_eq!(p.display_temperature(&fixed(4.0)), "4°C");
        assert_eq!(
            p.display_temperature(&ParsedSpec::Known(TemperatureSpec::Range { min: 2.5, max: 4.0 })),
            "2.5°C - 4°C"
        );
        assert_eq!(p.display_temperature(&ParsedSpec::Unknown), "N/A");

        assert_eq!(p.storage_kind(&fixed(-18.0)), StorageKind::Freezer);
        assert_eq!(p.storage_kind(&fixed(0.0)), StorageKind::Freezer);
        assert_eq!(p.storage_kind(&fixed(4.0)), StorageKind::Refrigerator);
        assert_eq!(
            p.storage_kind(&ParsedSpec::Known(TemperatureSpec::Range { min: 4.0, max: 10.0 })),
            StorageKind::RefrigeratorWarmZone
        );
        assert_eq!(p.storage_kind(&fixed(12.0)), StorageKind::ControlledAmbient);
        assert_eq!(p.storage_kind(&ParsedSpec::Unknown), StorageKind::Unknown);
    }

    #[test]
    fn test_reading_status() {
        let registry = CategoryRegistry::builtin();
        let config = ComplianceConfig::default();
        let p = Presenter::new(&registry, &config);

        assert_eq!(p.reading_status(4.3, &fixed(4.0)).map(|s| s.level), Some(ReadingLevel::Green));
        assert_eq!(p.reading_status(5.5, &fixed(4.0)).map(|s| s.level), Some(ReadingLevel::Orange));
        assert_eq!(p.reading_status(7.0, &fixed(4.0)).map(|s| s.level), Some(ReadingLevel::Red));
        // 恰好等于容差即为红色
        assert_eq!(p.reading_status(6.0, &fixed(4.0)).map(|s| s.level), Some(ReadingLevel::Red));
        assert!(p.reading_status(4.0, &ParsedSpec::Unknown).is_none());
    }

    #[test]
    fn test_optimal_range() {
        let registry = CategoryRegistry::builtin();
        let config = ComplianceConfig::default();
        let p = Presenter::new(&registry, &config);

        let shared = p.optimal_range(&["fresh_meat", "fresh_dairy"]).unwrap();
        assert!(shared.compatible);
        assert_eq!(shared.range, Some(TemperatureBand::new(2.0, 4.0)));

        let clash = p.optimal_range(&["fresh_fish", "fresh_beverages", "frozen"]).unwrap();
        assert!(!clash.compatible);

        assert!(p.optimal_range(&["abbattitore_menu"]).is_none());
    }

    #[test]
    fn test_expiry_status() {
        let registry = CategoryRegistry::builtin();
        let config = ComplianceConfig::default();
        let p = Presenter::new(&registry, &config);
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();

        assert_eq!(p.expiry_status_str("2026-03-09", today), Some(ExpiryLevel::Expired));
        assert_eq!(p.expiry_status_str("2026-03-10", today), Some(ExpiryLevel::Critical));
        assert_eq!(p.expiry_status_str("2026-03-11", today), Some(ExpiryLevel::Critical));
        assert_eq!(p.expiry_status_str("2026-03-13", today), Some(ExpiryLevel::Expiring));
        assert_eq!(p.expiry_status_str("2026-03-20", today), Some(ExpiryLevel::Ok));
        assert_eq!(p.expiry_status_str("presto", today), None);
    }
}
