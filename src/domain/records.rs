// ==========================================
// HACCP 合规核心 - 记录模型
// ==========================================
// 职责: UI/存储层传入的四类记录 + 规范化后的存储点
// 说明: 输入记录字段一律可选，缺失/类型错误由校验器报告，不在反序列化阶段失败
// ==========================================

use crate::domain::temperature::{ParsedSpec, TemperatureSpec};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use uuid::Uuid;

/// 从 JSON 值读取摄氏温度
///
/// - 数字 → 原值（需有限）
/// - 字符串 → 去空白后解析，允许逗号小数点（"3,5"）
/// - 其他 → None
pub fn as_celsius(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                trimmed.replace(',', ".").parse::<f64>().ok()
            }
        }
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

/// 记录 ID：字符串或数字（旧格式用毫秒时间戳作 ID），null → None
fn deserialize_loose_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "记录 ID 必须是字符串或数字: {}",
            other
        ))),
    }
}

/// 生成带前缀的记录 ID（cp_ / temp_ / prod_）
pub fn generate_record_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

// ==========================================
// MaintenanceTaskConfig - 维护任务配置
// ==========================================
// 字段名沿用存储格式（snake_case）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceTaskConfig {
    pub frequency: Option<String>,
    pub assigned_role: Option<String>,
    pub assigned_category: Option<String>,
    pub assigned_staff_ids: Vec<String>,
}

impl MaintenanceTaskConfig {
    pub fn new(frequency: &str, assigned_role: &str) -> Self {
        Self {
            frequency: Some(frequency.to_string()),
            assigned_role: Some(assigned_role.to_string()),
            ..Default::default()
        }
    }
}

/// 存储点的维护任务集合
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaintenanceData {
    pub temperature_monitoring: Option<MaintenanceTaskConfig>,
    pub sanitization: Option<MaintenanceTaskConfig>,
    pub defrosting: Option<MaintenanceTaskConfig>,
}

impl MaintenanceData {
    pub fn is_empty(&self) -> bool {
        self.temperature_monitoring.is_none()
            && self.sanitization.is_none()
            && self.defrosting.is_none()
    }
}

// ==========================================
// PointRecord - 存储点记录（含旧格式字段）
// ==========================================
// 规范字段: setTempMode / setTempC / setTempRangeC
// 旧格式温度字段: targetTemp / setTemperature / temperature / temp（数字或字符串）
// 旧格式别名: location / department / selectedCategories / isAbbattitore / maintenanceData
// 旧格式附加信息: dedicatedTo / nextMaintenance / createdBy / companyId（不影响温度解析）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointRecord {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "deserialize_loose_id"
    )]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_category_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blast_chiller: Option<bool>,

    // ===== 规范温度字段 =====
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_temp_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_temp_c: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_temp_range_c: Option<Value>,

    // ===== 旧格式温度字段 =====
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_temp: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_temperature: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<MaintenanceData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    // ===== 旧格式别名 =====
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_categories: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_abbattitore: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintenance_data: Option<MaintenanceData>,

    // ===== 旧格式附加信息 =====
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dedicated_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_maintenance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(alias = "company_id", skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,

    /// 未识别字段（与温度语义无关）
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl PointRecord {
    pub fn new(name: &str, department_name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            department_name: Some(department_name.to_string()),
            ..Default::default()
        }
    }

    pub fn with_categories(mut self, ids: &[&str]) -> Self {
        self.storage_category_ids = Some(ids.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn with_fixed(mut self, value: f64) -> Self {
        self.set_temp_mode = Some("fixed".to_string());
        self.set_temp_c = Some(Value::from(value));
        self.set_temp_range_c = None;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.set_temp_mode = Some("range".to_string());
        self.set_temp_c = None;
        self.set_temp_range_c = Some(serde_json::json!({ "min": min, "max": max }));
        self
    }

    pub fn with_ambient(mut self) -> Self {
        self.set_temp_mode = Some("ambient".to_string());
        self.set_temp_c = None;
        self.set_temp_range_c = None;
        self
    }

    pub fn blast_chiller(mut self) -> Self {
        self.is_blast_chiller = Some(true);
        self
    }

    /// 仅含温度字段的记录，按规范格式重新发布解析结果
    pub fn from_spec(parsed: &ParsedSpec) -> Self {
        match parsed {
            ParsedSpec::Known(TemperatureSpec::Fixed { value }) => Self::default().with_fixed(*value),
            ParsedSpec::Known(TemperatureSpec::Range { min, max }) => {
                Self::default().with_range(*min, *max)
            }
            ParsedSpec::Known(TemperatureSpec::Ambient) => Self::default().with_ambient(),
            ParsedSpec::Unknown => Self {
                set_temp_mode: Some("unknown".to_string()),
                ..Default::default()
            },
        }
    }

    /// 已分配类别（规范字段）
    pub fn category_ids(&self) -> &[String] {
        self.storage_category_ids.as_deref().unwrap_or(&[])
    }
}

// ==========================================
// ConservationPoint - 规范化存储点
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConservationPoint {
    pub id: String,
    pub name: String,
    pub department_id: Option<String>,
    pub department_name: Option<String>,
    pub storage_category_ids: BTreeSet<String>,
    pub temp_spec: TemperatureSpec,
    pub is_blast_chiller: bool,
    pub maintenance: MaintenanceData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dedicated_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ConservationPoint {
    /// 类别 ID 列表（有序）
    pub fn category_ids(&self) -> Vec<String> {
        self.storage_category_ids.iter().cloned().collect()
    }

    /// 转回规范格式记录（用于存储）
    pub fn to_record(&self) -> PointRecord {
        let mut record = PointRecord::from_spec(&ParsedSpec::Known(self.temp_spec));
        record.id = Some(self.id.clone());
        record.name = Some(self.name.clone());
        record.department_id = self.department_id.clone();
        record.department_name = self.department_name.clone();
        record.storage_category_ids = Some(self.category_ids());
        record.is_blast_chiller = Some(self.is_blast_chiller);
        record.maintenance = Some(self.maintenance.clone());
        record.dedicated_to = self.dedicated_to.clone();
        record.created_at = Some(self.created_at.to_rfc3339());
        record.updated_at = self.updated_at.map(|t| t.to_rfc3339());
        record
    }
}

// ==========================================
// ProductRecord - 库存产品
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conservation_point_name: Option<String>,
    /// ISO 日期（YYYY-MM-DD）或 RFC 3339 时间戳
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    pub allergens: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lot_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_delivery_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<String>,
}

impl ProductRecord {
    /// 新建产品记录（生成 ID 与添加时间）
    pub fn new(name: &str, category_id: &str, expiry_date: &str) -> Self {
        Self {
            id: Some(generate_record_id("prod")),
            name: Some(name.to_string()),
            category_id: Some(category_id.to_string()),
            expiry_date: Some(expiry_date.to_string()),
            added_at: Some(Utc::now().to_rfc3339()),
            ..Default::default()
        }
    }
}

// ==========================================
// TemperatureLogRecord - 温度记录
// ==========================================
// 每次人工/语音/自动读数创建一次，创建后不再修改（允许删除）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemperatureLogRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conservation_point_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conservation_point_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature_c: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_department: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl TemperatureLogRecord {
    /// 新建温度记录
    pub fn new(conservation_point_id: &str, temperature_c: f64, at: DateTime<Utc>) -> Self {
        Self {
            id: Some(generate_record_id("temp")),
            conservation_point_id: Some(conservation_point_id.to_string()),
            temperature_c: Some(Value::from(temperature_c)),
            timestamp: Some(at.to_rfc3339()),
            ..Default::default()
        }
    }

    pub fn with_point_name(mut self, name: &str) -> Self {
        self.conservation_point_name = Some(name.to_string());
        self
    }

    pub fn with_user(mut self, user_id: &str, user_name: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self.user_name = Some(user_name.to_string());
        self
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = Some(notes.to_string());
        self
    }

    /// 读数（°C），非数值返回 None
    pub fn temperature(&self) -> Option<f64> {
        self.temperature_c.as_ref().and_then(as_celsius)
    }
}
