// ==========================================
// HACCP 合规核心 - 判定结果
// ==========================================
// 职责: 判定结果值对象（不持久化，按需重算）
// 红线: color 由 type 派生，不可单独设置
// ==========================================

use crate::domain::temperature::TemperatureBand;
use crate::domain::types::{ComplianceType, StatusColor};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ComplianceCode - 稳定的机器可读原因码
// ==========================================
// message 随语言变化，code 不变；调用方据此区分错误原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplianceCode {
    Compliant,
    MissingCategories,
    TooManyCategories,
    UnknownSpec,
    InvalidRange,
    UnknownCategory,
    IncompatibleCategories,
    AmbientCategoriesRestricted,
    BlastChillerSkipped,
    WithinTolerance,
    OutOfTolerance,
    InvalidReading,
    MissingField,
    InvalidValue,
    InvalidDate,
    Expired,
    OutOfPhysicalBounds,
    MissingConfig,
}

impl fmt::Display for ComplianceCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 与 serde 名称保持一致
        let name = serde_json::to_value(self)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        f.write_str(&name)
    }
}

// ==========================================
// ComplianceResult - 三级判定结果
// ==========================================
// JSON: {"isValid":true,"message":"...","type":"compliant","color":"green","code":"COMPLIANT"}
// 反序列化时忽略输入的 color，按 type 重新派生
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "ComplianceResultWire")]
pub struct ComplianceResult {
    pub is_valid: bool,
    pub message: String,
    #[serde(rename = "type")]
    result_type: ComplianceType,
    color: StatusColor,
    pub code: ComplianceCode,
    /// 触发判定的字段（记录校验时填写）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// 反序列化输入（不含 color）
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ComplianceResultWire {
    is_valid: bool,
    message: String,
    #[serde(rename = "type")]
    result_type: ComplianceType,
    code: ComplianceCode,
    #[serde(default)]
    field: Option<String>,
}

impl From<ComplianceResultWire> for ComplianceResult {
    fn from(wire: ComplianceResultWire) -> Self {
        let mut result = Self::build(wire.is_valid, wire.result_type, wire.code, wire.message);
        result.field = wire.field;
        result
    }
}

impl ComplianceResult {
    fn build(
        is_valid: bool,
        result_type: ComplianceType,
        code: ComplianceCode,
        message: String,
    ) -> Self {
        Self {
            is_valid,
            message,
            result_type,
            color: result_type.color(),
            code,
            field: None,
        }
    }

    /// 合规
    pub fn compliant(message: impl Into<String>) -> Self {
        Self::build(true, ComplianceType::Compliant, ComplianceCode::Compliant, message.into())
    }

    /// 合规（带非默认原因码，例如速冷机跳过区间匹配）
    pub fn compliant_with(code: ComplianceCode, message: impl Into<String>) -> Self {
        Self::build(true, ComplianceType::Compliant, code, message.into())
    }

    /// 警告
    ///
    /// is_valid 由调用方决定：容差内读数为 true，过期产品为 false
    pub fn warning(code: ComplianceCode, message: impl Into<String>, is_valid: bool) -> Self {
        Self::build(is_valid, ComplianceType::Warning, code, message.into())
    }

    /// 错误
    pub fn error(code: ComplianceCode, message: impl Into<String>) -> Self {
        Self::build(false, ComplianceType::Error, code, message.into())
    }

    /// 标注触发字段
    pub fn on_field(mut self, field: &str) -> Self {
        self.field = Some(field.to_string());
        self
    }

    pub fn result_type(&self) -> ComplianceType {
        self.result_type
    }

    pub fn color(&self) -> StatusColor {
        self.color
    }

    pub fn is_compliant(&self) -> bool {
        self.result_type == ComplianceType::Compliant
    }

    pub fn is_warning(&self) -> bool {
        self.result_type == ComplianceType::Warning
    }

    pub fn is_error(&self) -> bool {
        self.result_type == ComplianceType::Error
    }

    /// 是否阻断持久化（仅 error）
    pub fn blocks_persistence(&self) -> bool {
        self.result_type.blocks_persistence()
    }
}

impl fmt::Display for ComplianceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.result_type, self.code, self.message)
    }
}

// ==========================================
// ConflictReport - 类别冲突报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConflictReport {
    pub first: String,
    pub second: String,
    /// 容差扩展后的区间
    pub first_range: TemperatureBand,
    pub second_range: TemperatureBand,
}

impl ConflictReport {
    /// 是否涉及指定类别
    pub fn involves(&self, category_id: &str) -> bool {
        self.first == category_id || self.second == category_id
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) / {} ({})",
            self.first, self.first_range, self.second, self.second_range
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_serialization_shape() {
        let result = ComplianceResult::warning(ComplianceCode::WithinTolerance, "ok-ish", true);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(
            value,
            json!({
                "isValid": true,
                "message": "ok-ish",
                "type": "warning",
                "color": "yellow",
                "code": "WITHIN_TOLERANCE"
            })
        );
    }

    #[test]
    fn test_field_annotation_serialized() {
        let result = ComplianceResult::error(ComplianceCode::MissingField, "x").on_field("name");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["field"], "name");
        assert_eq!(value["color"], "red");
    }

    #[test]
    fn test_color_rederived_from_type_on_load() {
        let result: ComplianceResult = serde_json::from_value(json!({
            "isValid": false,
            "message": "x",
            "type": "error",
            "color": "green",
            "code": "UNKNOWN_SPEC",
            "field": "setTempMode"
        }))
        .unwrap();
        assert_eq!(result.color(), StatusColor::Red);
        assert_eq!(result.field.as_deref(), Some("setTempMode"));

        let stored = ComplianceResult::warning(ComplianceCode::WithinTolerance, "ok-ish", true);
        let loaded: ComplianceResult =
            serde_json::from_value(serde_json::to_value(&stored).unwrap()).unwrap();
        assert_eq!(loaded, stored);
    }

    #[test]
    fn test_code_display_matches_serde() {
        assert_eq!(ComplianceCode::UnknownSpec.to_string(), "UNKNOWN_SPEC");
        assert_eq!(ComplianceCode::OutOfPhysicalBounds.to_string(), "OUT_OF_PHYSICAL_BOUNDS");
    }
}
