// ==========================================
// HACCP 合规核心 - 记录校验器
// ==========================================
// 职责: 存储点 / 产品 / 温度记录 / 维护任务配置 的字段级结构校验
// 规则: 按顺序检查，首个违规即返回（不累积错误）
// 红线: 预期内的错误输入一律以 ComplianceResult 返回
// ==========================================

use crate::config::compliance_config::ComplianceConfig;
use crate::domain::compliance::{ComplianceCode, ComplianceResult};
use crate::domain::records::{
    MaintenanceData, MaintenanceTaskConfig, PointRecord, ProductRecord, TemperatureLogRecord,
};
use crate::domain::temperature::{ParsedSpec, TemperatureSpec};
use crate::domain::types::MaintenanceTaskKind;
use crate::engine::category_registry::CategoryRegistry;
use crate::engine::compliance::ComplianceEvaluator;
use crate::engine::spec_parser::SpecParser;
use crate::i18n::{fmt_celsius, tr, tr_with_args};
use chrono::{DateTime, NaiveDate};
use serde_json::Value;
use std::collections::BTreeSet;
use tracing::instrument;

/// 非空（去空白后）字符串
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 解析到期日：YYYY-MM-DD 或 RFC 3339 时间戳
pub fn parse_expiry_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive()))
}

/// 存储点记录上的类别 ID（规范字段优先，其次旧格式 selectedCategories）
///
/// 去空白、去重，保留首次出现的顺序
pub fn point_category_ids(record: &PointRecord) -> Vec<&str> {
    let mut seen = BTreeSet::new();
    record
        .storage_category_ids
        .as_ref()
        .or(record.selected_categories.as_ref())
        .map(|ids| {
            ids.iter()
                .map(|id| id.trim())
                .filter(|id| !id.is_empty() && seen.insert(*id))
                .collect()
        })
        .unwrap_or_default()
}

// ==========================================
// RecordValidator - 记录校验器
// ==========================================
pub struct RecordValidator<'a> {
    registry: &'a CategoryRegistry,
    config: &'a ComplianceConfig,
    parser: &'a SpecParser,
}

impl<'a> RecordValidator<'a> {
    pub fn new(
        registry: &'a CategoryRegistry,
        config: &'a ComplianceConfig,
        parser: &'a SpecParser,
    ) -> Self {
        Self {
            registry,
            config,
            parser,
        }
    }

    fn evaluator(&self) -> ComplianceEvaluator<'a> {
        ComplianceEvaluator::new(self.registry, self.config)
    }

    fn msg(&self, key: &str) -> String {
        tr(&self.config.locale, key)
    }

    fn missing(&self, key: &str, field: &str) -> ComplianceResult {
        ComplianceResult::error(ComplianceCode::MissingField, self.msg(key)).on_field(field)
    }

    // ===== 存储点 =====

    /// 存储点结构校验
    ///
    /// 顺序: 名称 → 部门 → 类别非空 → 类别数量上限 → 设定温度
    #[instrument(skip(self, record), fields(name = ?record.name))]
    pub fn validate_conservation_point(&self, record: &PointRecord) -> ComplianceResult {
        if non_blank(record.name.as_deref()).is_none() {
            return self.missing("validation.point.name_required", "name");
        }

        let department = non_blank(record.department_name.as_deref())
            .or_else(|| non_blank(record.location.as_deref()))
            .or_else(|| non_blank(record.department.as_deref()));
        if department.is_none() {
            return self.missing("validation.point.department_required", "departmentName");
        }

        let category_ids = point_category_ids(record);
        if category_ids.is_empty() {
            return ComplianceResult::error(
                ComplianceCode::MissingCategories,
                self.msg("validation.point.category_required"),
            )
            .on_field("storageCategoryIds");
        }

        let max = self.config.max_categories_per_point;
        if category_ids.len() > max {
            return ComplianceResult::error(
                ComplianceCode::TooManyCategories,
                tr_with_args(
                    &self.config.locale,
                    "validation.point.too_many_categories",
                    &[("max", &max.to_string())],
                ),
            )
            .on_field("storageCategoryIds");
        }

        match self.parser.parse(record) {
            ParsedSpec::Unknown => ComplianceResult::error(
                ComplianceCode::UnknownSpec,
                self.msg("compliance.unknown_spec"),
            )
            .on_field("setTempMode"),
            ParsedSpec::Known(TemperatureSpec::Fixed { value }) if !value.is_finite() => {
                ComplianceResult::error(
                    ComplianceCode::InvalidValue,
                    self.msg("validation.point.fixed_invalid"),
                )
                .on_field("setTempC")
            }
            ParsedSpec::Known(spec @ TemperatureSpec::Range { .. }) if !spec.is_well_formed() => {
                ComplianceResult::error(
                    ComplianceCode::InvalidRange,
                    self.msg("validation.point.range_invalid"),
                )
                .on_field("setTempRangeC")
            }
            ParsedSpec::Known(_) => ComplianceResult::compliant(self.msg("validation.point.valid")),
        }
    }

    /// 存储点完整评估：结构校验通过后再做类别合规判定
    pub fn assess_point(&self, record: &PointRecord) -> ComplianceResult {
        let structural = self.validate_conservation_point(record);
        if !structural.is_compliant() {
            return structural;
        }

        let is_blast_chiller = record
            .is_blast_chiller
            .or(record.is_abbattitore)
            .unwrap_or(false);
        self.evaluator().evaluate_categories(
            &self.parser.parse(record),
            &point_category_ids(record),
            is_blast_chiller,
        )
    }

    // ===== 产品 =====

    /// 产品结构校验
    ///
    /// 到期日早于 today → warning 且 isValid = false（由调用方决定是否阻断）；
    /// 当天到期不算过期
    #[instrument(skip(self, record), fields(name = ?record.name))]
    pub fn validate_product(&self, record: &ProductRecord, today: NaiveDate) -> ComplianceResult {
        if non_blank(record.name.as_deref()).is_none() {
            return self.missing("validation.product.name_required", "name");
        }

        if non_blank(record.category_id.as_deref()).is_none() {
            return self.missing("validation.product.category_required", "categoryId");
        }

        let expiry = match non_blank(record.expiry_date.as_deref()) {
            Some(expiry) => expiry,
            None => return self.missing("validation.product.expiry_required", "expiryDate"),
        };

        let expiry = match parse_expiry_date(expiry) {
            Some(date) => date,
            None => {
                return ComplianceResult::error(
                    ComplianceCode::InvalidDate,
                    self.msg("validation.product.expiry_invalid"),
                )
                .on_field("expiryDate")
            }
        };

        if expiry < today {
            return ComplianceResult::warning(
                ComplianceCode::Expired,
                self.msg("validation.product.expired"),
                false,
            )
            .on_field("expiryDate");
        }

        ComplianceResult::compliant(self.msg("validation.product.valid"))
    }

    // ===== 温度记录 =====

    /// 温度记录结构校验
    ///
    /// temperatureC 必须是 JSON 数字并落在物理读数范围内；timestamp 必须是 RFC 3339
    #[instrument(skip(self, record), fields(point_id = ?record.conservation_point_id))]
    pub fn validate_temperature_log(&self, record: &TemperatureLogRecord) -> ComplianceResult {
        if non_blank(record.conservation_point_id.as_deref()).is_none() {
            return self.missing("validation.log.point_required", "conservationPointId");
        }

        let temperature = match &record.temperature_c {
            None | Some(Value::Null) => {
                return self.missing("validation.log.temperature_required", "temperatureC")
            }
            Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()),
            Some(_) => None,
        };
        let temperature = match temperature {
            Some(t) => t,
            None => {
                return ComplianceResult::error(
                    ComplianceCode::InvalidValue,
                    self.msg("validation.log.temperature_required"),
                )
                .on_field("temperatureC")
            }
        };

        let bounds = self.config.reading_bounds;
        if !bounds.contains(temperature) {
            return ComplianceResult::error(
                ComplianceCode::OutOfPhysicalBounds,
                tr_with_args(
                    &self.config.locale,
                    "validation.log.temperature_out_of_bounds",
                    &[("min", &fmt_celsius(bounds.min)), ("max", &fmt_celsius(bounds.max))],
                ),
            )
            .on_field("temperatureC");
        }

        let timestamp = match non_blank(record.timestamp.as_deref()) {
            Some(ts) => ts,
            None => return self.missing("validation.log.timestamp_required", "timestamp"),
        };
        if DateTime::parse_from_rfc3339(timestamp).is_err() {
            return ComplianceResult::error(
                ComplianceCode::InvalidDate,
                self.msg("validation.log.timestamp_invalid"),
            )
            .on_field("timestamp");
        }

        ComplianceResult::compliant(self.msg("validation.log.valid"))
    }

    /// 温度记录校验 + 读数判定
    pub fn validate_log_reading(
        &self,
        record: &TemperatureLogRecord,
        spec: &ParsedSpec,
    ) -> ComplianceResult {
        let structural = self.validate_temperature_log(record);
        if !structural.is_compliant() {
            return structural;
        }
        match record.temperature() {
            Some(actual) => self.evaluator().evaluate_observed_temperature(actual, spec),
            None => structural,
        }
    }

    // ===== 维护任务 =====

    /// 单个维护任务配置校验
    pub fn validate_maintenance_config(
        &self,
        config: Option<&MaintenanceTaskConfig>,
    ) -> ComplianceResult {
        let config = match config {
            Some(config) => config,
            None => {
                return ComplianceResult::error(
                    ComplianceCode::MissingConfig,
                    self.msg("validation.maintenance.missing"),
                )
            }
        };

        if non_blank(config.frequency.as_deref()).is_none() {
            return self.missing("validation.maintenance.frequency_required", "frequency");
        }

        if non_blank(config.assigned_role.as_deref()).is_none() {
            return self.missing("validation.maintenance.role_required", "assigned_role");
        }

        ComplianceResult::compliant(self.msg("validation.maintenance.valid"))
    }

    /// 存储点维护任务集合校验（逐个已配置任务，首个违规即返回）
    pub fn validate_maintenance_data(&self, data: &MaintenanceData) -> ComplianceResult {
        if data.is_empty() {
            return self.validate_maintenance_config(None);
        }

        let tasks = [
            (MaintenanceTaskKind::TemperatureMonitoring, &data.temperature_monitoring),
            (MaintenanceTaskKind::Sanitization, &data.sanitization),
            (MaintenanceTaskKind::Defrosting, &data.defrosting),
        ];

        for (kind, task) in tasks {
            if let Some(task) = task {
                let result = self.validate_maintenance_config(Some(task));
                if !result.is_compliant() {
                    let field = match &result.field {
                        Some(field) => format!("{}.{}", kind, field),
                        None => kind.to_string(),
                    };
                    return result.on_field(&field);
                }
            }
        }

        ComplianceResult::compliant(self.msg("validation.maintenance.valid"))
    }
}
