// ==========================================
// HACCP 合规核心 - 合规判定引擎
// ==========================================
// 职责:
// a) 存储点设定温度 vs 已分配类别 → 三级判定
// b) 实测读数 vs 存储点设定温度 → 三级判定
// 红线: 预期内的错误输入一律以 ComplianceResult 返回，不返回 Err
// ==========================================
// 存储点判定顺序（命中即返回）:
// 1) 类别为空           → error
// 2) 设定温度 Unknown   → error
// 3) 区间无效           → error
// 4) 未知类别           → error
// 5) 类别冲突           → error（短路，不做逐类别区间匹配）
// 6) 速冷机             → compliant（跳过区间匹配）
// 7) 常温模式           → 仅干货类别时 compliant，否则 warning
// 8) 逐类别: 理想区间 / 容差区间 / 不合规
// ==========================================

use crate::config::compliance_config::ComplianceConfig;
use crate::domain::category::Category;
use crate::domain::compliance::{ComplianceCode, ComplianceResult};
use crate::domain::records::{as_celsius, ConservationPoint};
use crate::domain::temperature::{ParsedSpec, TemperatureSpec};
use crate::engine::category_registry::CategoryRegistry;
use crate::engine::conflict::ConflictDetector;
use crate::i18n::{fmt_celsius, tr, tr_with_args};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// 浮点比较余量
const EPSILON: f64 = 1e-9;

// ==========================================
// ComplianceEvaluator - 合规判定引擎
// ==========================================
pub struct ComplianceEvaluator<'a> {
    registry: &'a CategoryRegistry,
    config: &'a ComplianceConfig,
}

impl<'a> ComplianceEvaluator<'a> {
    pub fn new(registry: &'a CategoryRegistry, config: &'a ComplianceConfig) -> Self {
        Self { registry, config }
    }

    fn msg(&self, key: &str) -> String {
        tr(&self.config.locale, key)
    }

    fn msg_with(&self, key: &str, args: &[(&str, &str)]) -> String {
        tr_with_args(&self.config.locale, key, args)
    }

    // ==========================================
    // a) 存储点判定
    // ==========================================

    /// 存储点设定温度与已分配类别的合规判定
    #[instrument(skip(self, spec, category_ids), fields(categories = category_ids.len()))]
    pub fn evaluate_point_compliance<S: AsRef<str>>(
        &self,
        spec: &ParsedSpec,
        category_ids: &[S],
    ) -> ComplianceResult {
        self.evaluate_categories(spec, category_ids, false)
    }

    /// 规范化存储点判定（速冷机跳过区间匹配）
    #[instrument(skip(self, point), fields(point_id = %point.id))]
    pub fn evaluate_point(&self, point: &ConservationPoint) -> ComplianceResult {
        let ids = point.category_ids();
        self.evaluate_categories(&ParsedSpec::Known(point.temp_spec), &ids, point.is_blast_chiller)
    }

    /// 存储点判定（显式指定是否为速冷机）
    pub fn evaluate_categories<S: AsRef<str>>(
        &self,
        spec: &ParsedSpec,
        category_ids: &[S],
        is_blast_chiller: bool,
    ) -> ComplianceResult {
        let ids: Vec<&str> = category_ids
            .iter()
            .map(|id| id.as_ref().trim())
            .filter(|id| !id.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if ids.is_empty() {
            return ComplianceResult::error(
                ComplianceCode::MissingCategories,
                self.msg("compliance.no_categories"),
            );
        }

        let spec = match spec {
            ParsedSpec::Known(spec) => *spec,
            ParsedSpec::Unknown => return self.unknown_spec(),
        };

        if !spec.is_well_formed() {
            return self.invalid_range(&spec);
        }

        let unknown: Vec<&str> = ids
            .iter()
            .copied()
            .filter(|id| !self.registry.contains(id))
            .collect();
        if !unknown.is_empty() {
            return ComplianceResult::error(
                ComplianceCode::UnknownCategory,
                self.msg_with("compliance.unknown_category", &[("ids", &unknown.join(", "))]),
            );
        }

        let conflicts =
            ConflictDetector::new(self.registry, self.config.tolerance_c).detect_conflicts(&ids);
        if !conflicts.is_empty() {
            let pairs = conflicts
                .iter()
                .map(|c| format!("{} / {}", self.category_name(&c.first), self.category_name(&c.second)))
                .collect::<Vec<_>>()
                .join(", ");
            return ComplianceResult::error(
                ComplianceCode::IncompatibleCategories,
                self.msg_with("compliance.incompatible_categories", &[("pairs", &pairs)]),
            );
        }

        if is_blast_chiller {
            return ComplianceResult::compliant_with(
                ComplianceCode::BlastChillerSkipped,
                self.msg("compliance.blast_chiller"),
            );
        }

        if spec == TemperatureSpec::Ambient {
            return self.evaluate_ambient(&ids);
        }

        let categories: Vec<&Category> = ids.iter().filter_map(|id| self.registry.get(id)).collect();
        self.evaluate_ranges(&spec, &categories)
    }

    fn category_name(&self, id: &str) -> String {
        self.registry
            .get(id)
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// 常温模式：仅允许干货/常温类别
    fn evaluate_ambient(&self, ids: &[&str]) -> ComplianceResult {
        let ambient = self.registry.ambient_category();

        if let (Some(ambient), [only]) = (ambient, ids) {
            if ambient.id() == *only {
                return ComplianceResult::compliant(self.msg("compliance.ambient_ok"));
            }
        }

        let name = ambient
            .map(|c| c.name().to_string())
            .unwrap_or_else(|| self.msg("display.not_available"));
        ComplianceResult::warning(
            ComplianceCode::AmbientCategoriesRestricted,
            self.msg_with("compliance.ambient_restrict", &[("name", &name)]),
            true,
        )
    }

    /// 逐类别区间匹配
    fn evaluate_ranges(&self, spec: &TemperatureSpec, categories: &[&Category]) -> ComplianceResult {
        let band = spec.band(self.config.ambient_range);
        let mut in_tolerance = Vec::new();
        let mut non_compliant = Vec::new();

        for category in categories {
            if category.safe_band().expand(EPSILON).covers(&band) {
                continue;
            }
            if category
                .acceptable_band(self.config.tolerance_c + EPSILON)
                .covers(&band)
            {
                in_tolerance.push(category.name());
            } else {
                non_compliant.push(category.name());
            }
        }

        debug!(
            band = %band,
            in_tolerance = in_tolerance.len(),
            non_compliant = non_compliant.len(),
            "类别区间匹配完成"
        );

        if !non_compliant.is_empty() {
            ComplianceResult::error(
                ComplianceCode::OutOfTolerance,
                self.msg_with(
                    "compliance.point_non_compliant",
                    &[("categories", &non_compliant.join(", "))],
                ),
            )
        } else if !in_tolerance.is_empty() {
            ComplianceResult::warning(
                ComplianceCode::WithinTolerance,
                self.msg_with(
                    "compliance.point_tolerance",
                    &[("categories", &in_tolerance.join(", "))],
                ),
                true,
            )
        } else {
            ComplianceResult::compliant(self.msg("compliance.point_compliant"))
        }
    }

    fn unknown_spec(&self) -> ComplianceResult {
        ComplianceResult::error(ComplianceCode::UnknownSpec, self.msg("compliance.unknown_spec"))
    }

    fn invalid_range(&self, spec: &TemperatureSpec) -> ComplianceResult {
        let (min, max) = match *spec {
            TemperatureSpec::Range { min, max } => (min, max),
            TemperatureSpec::Fixed { value } => (value, value),
            TemperatureSpec::Ambient => (self.config.ambient_range.min, self.config.ambient_range.max),
        };
        ComplianceResult::error(
            ComplianceCode::InvalidRange,
            self.msg_with(
                "compliance.invalid_range",
                &[("min", &fmt_celsius(min)), ("max", &fmt_celsius(max))],
            ),
        )
    }

    // ==========================================
    // b) 实测读数判定
    // ==========================================

    /// 实测读数 vs 设定温度
    ///
    /// - Fixed: 偏差 ≤ 理想带 → compliant；≤ 容差 → warning；否则 error
    /// - Range / Ambient: 区间内 → compliant；距边界 ≤ 容差 → warning；否则 error
    /// - 读数无效与设定温度无效使用不同的原因码
    #[instrument(skip(self, spec))]
    pub fn evaluate_observed_temperature(&self, actual: f64, spec: &ParsedSpec) -> ComplianceResult {
        if !actual.is_finite() {
            return ComplianceResult::error(ComplianceCode::InvalidReading, self.msg("reading.invalid"));
        }

        let spec = match spec {
            ParsedSpec::Known(spec) => *spec,
            ParsedSpec::Unknown => return self.unknown_spec(),
        };

        if !spec.is_well_formed() {
            return self.invalid_range(&spec);
        }

        let (diff, compliant_margin) = match spec {
            TemperatureSpec::Fixed { value } => ((actual - value).abs(), self.config.ideal_band_c),
            TemperatureSpec::Range { .. } | TemperatureSpec::Ambient => {
                (spec.band(self.config.ambient_range).distance_to(actual), 0.0)
            }
        };

        if diff <= compliant_margin + EPSILON {
            ComplianceResult::compliant(self.msg("reading.compliant"))
        } else if diff <= self.config.tolerance_c + EPSILON {
            ComplianceResult::warning(
                ComplianceCode::WithinTolerance,
                self.msg_with("reading.tolerance", &[("diff", &format!("{:.1}", diff))]),
                true,
            )
        } else {
            ComplianceResult::error(
                ComplianceCode::OutOfTolerance,
                self.msg_with("reading.out_of_range", &[("diff", &format!("{:.1}", diff))]),
            )
        }
    }

    /// 实测读数为任意 JSON 值（数字或数字字符串）
    pub fn evaluate_observed_value(&self, actual: &Value, spec: &ParsedSpec) -> ComplianceResult {
        match as_celsius(actual) {
            Some(value) => self.evaluate_observed_temperature(value, spec),
            None => ComplianceResult::error(ComplianceCode::InvalidReading, self.msg("reading.invalid")),
        }
    }
}
