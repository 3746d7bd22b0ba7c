// ==========================================
// HACCP 合规核心 - 旧格式存储点迁移
// ==========================================
// 职责: 旧格式记录 → 规范化 ConservationPoint
// 字段映射（规范字段优先，旧别名兜底）:
// - departmentName ← location / department
// - storageCategoryIds ← selectedCategories
// - isBlastChiller ← isAbbattitore
// - maintenance ← maintenanceData
// 红线: 设定温度 Unknown 不迁移，返回错误交给调用方处理
// ==========================================

use crate::config::compliance_config::ComplianceConfig;
use crate::domain::records::{generate_record_id, ConservationPoint, PointRecord};
use crate::domain::temperature::ParsedSpec;
use crate::engine::spec_parser::SpecParser;
use crate::i18n::tr;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// 迁移错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    #[error("设定温度无法识别 (point: {point})")]
    UnknownSpec { point: String },

    #[error("时间戳格式错误 (point: {point}, value: {value})")]
    InvalidTimestamp { point: String, value: String },
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub struct PointMigrator<'a> {
    parser: &'a SpecParser,
    config: &'a ComplianceConfig,
}

impl<'a> PointMigrator<'a> {
    pub fn new(parser: &'a SpecParser, config: &'a ComplianceConfig) -> Self {
        Self { parser, config }
    }

    /// 迁移单个存储点
    ///
    /// # 参数
    /// - now: 迁移时间（缺失 createdAt 时使用，同时写入 updatedAt）
    pub fn migrate_conservation_point(
        &self,
        record: &PointRecord,
        now: DateTime<Utc>,
    ) -> Result<ConservationPoint, MigrationError> {
        let id = non_blank(&record.id).unwrap_or_else(|| generate_record_id("cp"));
        let name = non_blank(&record.name)
            .unwrap_or_else(|| tr(&self.config.locale, "migration.unnamed_point"));

        let temp_spec = match self.parser.parse(record) {
            ParsedSpec::Known(spec) => spec,
            ParsedSpec::Unknown => {
                warn!(point = %id, "设定温度无法识别，跳过迁移");
                return Err(MigrationError::UnknownSpec { point: id });
            }
        };

        let created_at = match non_blank(&record.created_at) {
            None => now,
            Some(raw) => DateTime::parse_from_rfc3339(&raw)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| MigrationError::InvalidTimestamp {
                    point: id.clone(),
                    value: raw.clone(),
                })?,
        };

        let storage_category_ids: BTreeSet<String> = record
            .storage_category_ids
            .as_ref()
            .or(record.selected_categories.as_ref())
            .map(|ids| {
                ids.iter()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let point = ConservationPoint {
            id,
            name,
            department_id: non_blank(&record.department_id),
            department_name: non_blank(&record.department_name)
                .or_else(|| non_blank(&record.location))
                .or_else(|| non_blank(&record.department)),
            storage_category_ids,
            temp_spec,
            is_blast_chiller: record
                .is_blast_chiller
                .or(record.is_abbattitore)
                .unwrap_or(false),
            maintenance: record
                .maintenance
                .clone()
                .or_else(|| record.maintenance_data.clone())
                .unwrap_or_default(),
            dedicated_to: non_blank(&record.dedicated_to),
            created_at,
            updated_at: Some(now),
        };

        debug!(point = %point.id, mode = %point.temp_spec.mode(), "存储点已迁移");
        Ok(point)
    }

    /// 批量迁移（逐条返回结果，单条失败不影响其他记录）
    pub fn migrate_conservation_points(
        &self,
        records: &[PointRecord],
        now: DateTime<Utc>,
    ) -> Vec<Result<ConservationPoint, MigrationError>> {
        records
            .iter()
            .map(|record| self.migrate_conservation_point(record, now))
            .collect()
    }
}
