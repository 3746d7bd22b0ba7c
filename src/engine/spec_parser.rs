// ==========================================
// HACCP 合规核心 - 设定温度解析器
// ==========================================
// 职责: 把历史格式各异的存储点记录规范化为 TemperatureSpec
// 输入: PointRecord（规范字段 + 旧格式温度字段）
// 输出: ParsedSpec（Known / Unknown）
// 红线: 纯函数，幂等；Unknown 不得静默降级为 Ambient
// ==========================================
// 提取顺序（命中即返回）:
// 1) 规范模式标签 setTempMode（或无标签但带 setTempC / setTempRangeC）
// 2) targetTemp → setTemperature → temperature → temp
// 3) 存在未识别字段 → Unknown
// 4) 全部缺失 → Ambient
// ==========================================

use crate::domain::records::{as_celsius, PointRecord};
use crate::domain::temperature::{ParsedSpec, TemperatureSpec};
use crate::domain::types::TempMode;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{debug, warn};

// 区间: "2-4°C" / "2 – 4" / "da 2.5 a 4.5°C" / "-20--16" / "2,5-4,5"
static RANGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)([-+]?\d+(?:[.,]\d+)?)\s*(?:°\s*c?\s*)?(?:-|–|—|~|\ba\b|\bto\b)\s*([-+]?\d+(?:[.,]\d+)?)",
    )
    .expect("区间正则表达式无效")
});

// 单值: "4°C" / "-18" / "3,5 gradi"
static SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([-+]?\d+(?:[.,]\d+)?)").expect("单值正则表达式无效"));

// 常温关键字
static AMBIENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)ambient").expect("常温正则表达式无效"));

static DEFAULT_PARSER: Lazy<SpecParser> = Lazy::new(SpecParser::new);

/// 使用默认提取链解析
pub fn parse_spec(record: &PointRecord) -> ParsedSpec {
    DEFAULT_PARSER.parse(record)
}

fn parse_number(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// 解析自由文本温度描述
///
/// 未能识别的文本按常温处理（保守默认）
pub fn parse_text(text: &str) -> TemperatureSpec {
    if AMBIENT_RE.is_match(text) {
        return TemperatureSpec::Ambient;
    }

    if let Some(caps) = RANGE_RE.captures(text) {
        let min = caps.get(1).and_then(|m| parse_number(m.as_str()));
        let max = caps.get(2).and_then(|m| parse_number(m.as_str()));
        if let (Some(min), Some(max)) = (min, max) {
            // 保持文本顺序，反向区间由校验器报告
            return TemperatureSpec::Range { min, max };
        }
    }

    if let Some(value) = SINGLE_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|m| parse_number(m.as_str()))
    {
        return TemperatureSpec::Fixed { value };
    }

    TemperatureSpec::Ambient
}

// ==========================================
// SpecExtractor - 提取策略
// ==========================================
pub trait SpecExtractor: Send + Sync {
    /// 策略名称（日志用）
    fn name(&self) -> &'static str;

    /// 尝试提取；None 表示本策略不适用，交给下一个策略
    fn extract(&self, record: &PointRecord) -> Option<ParsedSpec>;
}

/// 规范字段: setTempMode + setTempC / setTempRangeC
pub struct CanonicalModeExtractor;

impl CanonicalModeExtractor {
    fn fixed(record: &PointRecord) -> ParsedSpec {
        match record.set_temp_c.as_ref().and_then(as_celsius) {
            Some(value) => ParsedSpec::Known(TemperatureSpec::Fixed { value }),
            None => ParsedSpec::Unknown,
        }
    }

    fn range(record: &PointRecord) -> ParsedSpec {
        let bounds = record.set_temp_range_c.as_ref().and_then(|v| {
            let min = v.get("min").and_then(as_celsius)?;
            let max = v.get("max").and_then(as_celsius)?;
            Some((min, max))
        });
        match bounds {
            Some((min, max)) => ParsedSpec::Known(TemperatureSpec::Range { min, max }),
            None => ParsedSpec::Unknown,
        }
    }
}

impl SpecExtractor for CanonicalModeExtractor {
    fn name(&self) -> &'static str {
        "canonical"
    }

    fn extract(&self, record: &PointRecord) -> Option<ParsedSpec> {
        let tag = record
            .set_temp_mode
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());

        match tag {
            Some(tag) => Some(match TempMode::from_tag(tag) {
                Some(TempMode::Fixed) => Self::fixed(record),
                Some(TempMode::Range) => Self::range(record),
                Some(TempMode::Ambient) => ParsedSpec::Known(TemperatureSpec::Ambient),
                None => ParsedSpec::Unknown,
            }),
            // 无标签但带规范载荷
            None if record.set_temp_range_c.is_some() => Some(Self::range(record)),
            None if record.set_temp_c.is_some() => Some(Self::fixed(record)),
            None => None,
        }
    }
}

/// 旧格式标量字段（数字或字符串）
pub struct LegacyScalarExtractor {
    field: &'static str,
    accessor: fn(&PointRecord) -> Option<&Value>,
}

impl LegacyScalarExtractor {
    pub fn new(field: &'static str, accessor: fn(&PointRecord) -> Option<&Value>) -> Self {
        Self { field, accessor }
    }
}

impl SpecExtractor for LegacyScalarExtractor {
    fn name(&self) -> &'static str {
        self.field
    }

    fn extract(&self, record: &PointRecord) -> Option<ParsedSpec> {
        match (self.accessor)(record)? {
            Value::Null => None,
            // 0 是合法设定温度
            Value::Number(n) => Some(match n.as_f64().filter(|v| v.is_finite()) {
                Some(value) => ParsedSpec::Known(TemperatureSpec::Fixed { value }),
                None => ParsedSpec::Unknown,
            }),
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(ParsedSpec::Known(parse_text(s))),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) => Some(ParsedSpec::Unknown),
        }
    }
}

/// 带未识别字段且无任何温度信息的载荷
pub struct ForeignPayloadGuard;

impl SpecExtractor for ForeignPayloadGuard {
    fn name(&self) -> &'static str {
        "foreign_payload"
    }

    fn extract(&self, record: &PointRecord) -> Option<ParsedSpec> {
        if record.extra.is_empty() {
            None
        } else {
            Some(ParsedSpec::Unknown)
        }
    }
}

/// 全部缺失 → 常温
pub struct AmbientDefault;

impl SpecExtractor for AmbientDefault {
    fn name(&self) -> &'static str {
        "ambient_default"
    }

    fn extract(&self, _record: &PointRecord) -> Option<ParsedSpec> {
        Some(ParsedSpec::Known(TemperatureSpec::Ambient))
    }
}

// ==========================================
// SpecParser - 提取链
// ==========================================
pub struct SpecParser {
    extractors: Vec<Box<dyn SpecExtractor>>,
}

impl SpecParser {
    /// 默认提取链
    pub fn new() -> Self {
        Self::with_extractors(vec![
            Box::new(CanonicalModeExtractor),
            Box::new(LegacyScalarExtractor::new("targetTemp", |r| r.target_temp.as_ref())),
            Box::new(LegacyScalarExtractor::new("setTemperature", |r| {
                r.set_temperature.as_ref()
            })),
            Box::new(LegacyScalarExtractor::new("temperature", |r| r.temperature.as_ref())),
            Box::new(LegacyScalarExtractor::new("temp", |r| r.temp.as_ref())),
            Box::new(ForeignPayloadGuard),
            Box::new(AmbientDefault),
        ])
    }

    pub fn with_extractors(extractors: Vec<Box<dyn SpecExtractor>>) -> Self {
        Self { extractors }
    }

    /// 解析存储点记录
    pub fn parse(&self, record: &PointRecord) -> ParsedSpec {
        for extractor in &self.extractors {
            if let Some(parsed) = extractor.extract(record) {
                debug!(strategy = extractor.name(), ?parsed, "设定温度已解析");
                return parsed;
            }
        }
        // 提取链未以默认策略收尾
        ParsedSpec::Unknown
    }

    /// 解析任意 JSON 值（非对象或字段类型错误 → Unknown）
    pub fn parse_value(&self, value: &Value) -> ParsedSpec {
        if !value.is_object() {
            return ParsedSpec::Unknown;
        }
        match serde_json::from_value::<PointRecord>(value.clone()) {
            Ok(record) => self.parse(&record),
            Err(e) => {
                warn!(error = %e, "存储点记录结构无效");
                ParsedSpec::Unknown
            }
        }
    }
}

impl Default for SpecParser {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> ParsedSpec {
        SpecParser::new().parse_value(&value)
    }

    fn fixed(value: f64) -> ParsedSpec {
        ParsedSpec::Known(TemperatureSpec::Fixed { value })
    }

    fn range(min: f64, max: f64) -> ParsedSpec {
        ParsedSpec::Known(TemperatureSpec::Range { min, max })
    }

    const AMBIENT: ParsedSpec = ParsedSpec::Known(TemperatureSpec::Ambient);

    #[test]
    fn test_canonical_modes() {
        assert_eq!(parse(json!({"setTempMode": "fixed", "setTempC": 4})), fixed(4.0));
        assert_eq!(
            parse(json!({"setTempMode": "range", "setTempRangeC": {"min": 2, "max": 4}})),
            range(2.0, 4.0)
        );
        assert_eq!(parse(json!({"setTempMode": "ambient", "setTempC": 4})), AMBIENT);
    }

    #[test]
    fn test_canonical_tag_trusted_over_legacy_fields() {
        let parsed = parse(json!({"setTempMode": "fixed", "setTempC": -18, "targetTemp": "2-4°C"}));
        assert_eq!(parsed, fixed(-18.0));
    }

    #[test]
    fn test_canonical_tag_without_payload_is_unknown() {
        assert_eq!(parse(json!({"setTempMode": "fixed"})), ParsedSpec::Unknown);
        assert_eq!(
            parse(json!({"setTempMode": "range", "setTempRangeC": {"min": 2}})),
            ParsedSpec::Unknown
        );
    }

    #[test]
    fn test_unrecognized_tag_is_unknown() {
        assert_eq!(parse(json!({"setTempMode": "manual", "setTempC": 4})), ParsedSpec::Unknown);
    }

    #[test]
    fn test_untagged_canonical_payload() {
        assert_eq!(parse(json!({"setTempC": 3})), fixed(3.0));
        assert_eq!(parse(json!({"setTempRangeC": {"min": 0, "max": 4}})), range(0.0, 4.0));
    }

    #[test]
    fn test_legacy_numbers() {
        assert_eq!(parse(json!({"targetTemp": 4})), fixed(4.0));
        assert_eq!(parse(json!({"targetTemp": 0})), fixed(0.0));
        assert_eq!(parse(json!({"temperature": -18.5})), fixed(-18.5));
    }

    #[test]
    fn test_legacy_field_order() {
        assert_eq!(parse(json!({"temp": 8, "setTemperature": 5})), fixed(5.0));
        assert_eq!(parse(json!({"targetTemp": null, "temp": 8})), fixed(8.0));
        assert_eq!(parse(json!({"targetTemp": "  ", "temp": 8})), fixed(8.0));
    }

    #[test]
    fn test_legacy_strings() {
        assert_eq!(parse(json!({"targetTemp": "2-4°C"})), range(2.0, 4.0));
        assert_eq!(parse(json!({"targetTemp": "da 2.5 a 4.5°C"})), range(2.5, 4.5));
        assert_eq!(parse(json!({"targetTemp": "-20--16"})), range(-20.0, -16.0));
        assert_eq!(parse(json!({"targetTemp": "2 – 4 °C"})), range(2.0, 4.0));
        assert_eq!(parse(json!({"targetTemp": "3,5°C"})), fixed(3.5));
        assert_eq!(parse(json!({"targetTemp": "-18"})), fixed(-18.0));
        assert_eq!(parse(json!({"targetTemp": "Ambiente"})), AMBIENT);
        assert_eq!(parse(json!({"targetTemp": "temperatura AMBIENT"})), AMBIENT);
        assert_eq!(parse(json!({"targetTemp": "freddo"})), AMBIENT);
        assert_eq!(parse(json!({"targetTemp": "Temperatura ambientale 18"})), AMBIENT);
    }

    #[test]
    fn test_reversed_range_kept_in_textual_order() {
        assert_eq!(parse(json!({"targetTemp": "8-2"})), range(8.0, 2.0));
    }

    #[test]
    fn test_foreign_payloads() {
        assert_eq!(parse(json!({"targetTemp": true})), ParsedSpec::Unknown);
        assert_eq!(parse(json!({"targetTemp": [2, 4]})), ParsedSpec::Unknown);
        assert_eq!(parse(json!({"humidity": 60})), ParsedSpec::Unknown);
        assert_eq!(parse(json!("4°C")), ParsedSpec::Unknown);
    }

    #[test]
    fn test_missing_everything_is_ambient() {
        assert_eq!(parse(json!({})), AMBIENT);
        assert_eq!(parse(json!({"name": "Dispensa", "departmentName": "Magazzino"})), AMBIENT);
        // 旧格式附加信息不是温度字段
        assert_eq!(
            parse(json!({"name": "Dispensa", "location": "Magazzino", "dedicatedTo": "secco"})),
            AMBIENT
        );
    }
}
