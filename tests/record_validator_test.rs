// ==========================================
// 记录校验器 集成测试
// ==========================================
// 测试目标: 存储点 / 产品 / 温度记录 / 维护配置 的首个违规优先规则
// ==========================================


use chrono::Duration;
use haccp_compliance::domain::records::{MaintenanceData, MaintenanceTaskConfig};
use haccp_compliance::{ComplianceCode, ParsedSpec, ProductRecord, TemperatureLogRecord, TemperatureSpec};
use serde_json::json;
use test_helpers::{dairy_fridge, default_engine, english_engine, now, point_from_json, today};

#[test]
fn test_valid_conservation_point() {
    let engine = default_engine();
    let validator = engine.validator();

    let result = validator.validate_conservation_point(&dairy_fridge());
    assert!(result.is_compliant());
    assert!(result.is_valid);
    assert!(validator.assess_point(&dairy_fridge()).is_compliant());
}

#[test]
fn test_onboarding_point_scenario() {
    let engine = default_engine();
    let point = point_from_json(json!({
        "name": "Frigo A",
        "departmentName": "Cucina",
        "storageCategoryIds": ["dairy"],
        "setTempMode": "fixed",
        "setTempC": 4
    }));
    assert!(engine.validator().validate_conservation_point(&point).is_compliant());
}

#[test]
fn test_point_missing_categories() {
    let engine = default_engine();
    let point = point_from_json(json!({
        "name": "Frigo B",
        "departmentName": "Sala",
        "storageCategoryIds": [],
        "setTempMode": "fixed",
        "setTempC": 4
    }));

    let result = engine.validator().validate_conservation_point(&point);
    assert!(result.is_error());
    assert_eq!(result.code, ComplianceCode::MissingCategories);
    assert_eq!(result.field.as_deref(), Some("storageCategoryIds"));

    let english = english_engine().validator().validate_conservation_point(&point);
    assert!(english.message.to_lowercase().starts_with("select at least one"));
}

#[test]
fn test_point_name_checked_before_department() {
    let engine = default_engine();
    let point = point_from_json(json!({"storageCategoryIds": ["fresh_dairy"]}));

    let result = engine.validator().validate_conservation_point(&point);
    assert_eq!(result.code, ComplianceCode::MissingField);
    assert_eq!(result.field.as_deref(), Some("name"));
}

#[test]
fn test_legacy_location_counts_as_department() {
    let engine = default_engine();
    let point = point_from_json(json!({
        "name": "Frigo B",
        "location": "Cucina",
        "selectedCategories": ["fresh_meat"],
        "targetTemp": 2
    }));

    assert!(engine.validator().validate_conservation_point(&point).is_compliant());
    let migrated = engine
        .migrator()
        .migrate_conservation_point(&point, now())
        .expect("legacy point migrates");
    assert_eq!(migrated.department_name.as_deref(), Some("Cucina"));
}

#[test]
fn test_point_with_unknown_spec_blocked() {
    let engine = default_engine();
    let point = point_from_json(json!({
        "name": "Frigo C",
        "departmentName": "Cucina",
        "storageCategoryIds": ["fresh_meat"],
        "setTempMode": "fixed"
    }));

    let result = engine.validator().validate_conservation_point(&point);
    assert_eq!(result.code, ComplianceCode::UnknownSpec);
    assert!(result.blocks_persistence());
}

#[test]
fn test_expired_product_is_warning_but_invalid() {
    let engine = default_engine();
    let yesterday = (today() - Duration::days(1)).format("%Y-%m-%d").to_string();
    let product = ProductRecord::new("Mozzarella", "fresh_dairy", &yesterday);

    let result = engine.validator().validate_product(&product, today());
    assert!(result.is_warning());
    assert!(!result.is_valid);
    assert_eq!(result.code, ComplianceCode::Expired);
}

#[test]
fn test_product_expiring_today_is_valid() {
    let engine = default_engine();
    let product = ProductRecord::new("Ricotta", "fresh_dairy", "2026-03-10");
    assert!(engine.validator().validate_product(&product, today()).is_compliant());

    let timestamp = ProductRecord::new("Ricotta", "fresh_dairy", "2026-03-12T23:00:00+01:00");
    assert!(engine.validator().validate_product(&timestamp, today()).is_compliant());

    let garbage = ProductRecord::new("Ricotta", "fresh_dairy", "domani");
    assert_eq!(
        engine.validator().validate_product(&garbage, today()).code,
        ComplianceCode::InvalidDate
    );
}

#[test]
fn test_temperature_log_rules() {
    let engine = default_engine();
    let validator = engine.validator();

    let ok = TemperatureLogRecord::new("cp_1", 3.5, now());
    assert!(validator.validate_temperature_log(&ok).is_compliant());

    let mut text = ok.clone();
    text.temperature_c = Some(json!("3.5"));
    assert_eq!(validator.validate_temperature_log(&text).code, ComplianceCode::InvalidValue);

    let implausible = TemperatureLogRecord::new("cp_1", 250.0, now());
    assert_eq!(
        validator.validate_temperature_log(&implausible).code,
        ComplianceCode::OutOfPhysicalBounds
    );

    let mut no_point = ok.clone();
    no_point.conservation_point_id = None;
    assert_eq!(
        validator.validate_temperature_log(&no_point).field.as_deref(),
        Some("conservationPointId")
    );
}

#[test]
fn test_log_reading_combines_structure_and_compliance() {
    let engine = default_engine();
    let spec = ParsedSpec::Known(TemperatureSpec::Fixed { value: 4.0 });
    let validator = engine.validator();

    assert!(validator
        .validate_log_reading(&TemperatureLogRecord::new("cp_1", 4.2, now()), &spec)
        .is_compliant());
    assert!(validator
        .validate_log_reading(&TemperatureLogRecord::new("cp_1", 9.0, now()), &spec)
        .is_error());
}

#[test]
fn test_maintenance_configuration() {
    let engine = default_engine();
    let validator = engine.validator();

    assert_eq!(
        validator.validate_maintenance_config(None).code,
        ComplianceCode::MissingConfig
    );
    assert!(validator
        .validate_maintenance_config(Some(&MaintenanceTaskConfig::new("weekly", "dipendente")))
        .is_compliant());

    let data = MaintenanceData {
        temperature_monitoring: Some(MaintenanceTaskConfig::new("daily", "responsabile")),
        sanitization: Some(MaintenanceTaskConfig::new("weekly", "")),
        defrosting: None,
    };
    let result = validator.validate_maintenance_data(&data);
    assert!(result.is_error());
    assert_eq!(result.field.as_deref(), Some("sanitization.assigned_role"));
}
