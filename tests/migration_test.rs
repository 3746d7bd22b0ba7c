// ==========================================
// 旧格式存储点迁移 集成测试
// ==========================================
// 测试目标: 批量迁移、单条失败隔离、迁移结果可再判定
// ==========================================


use haccp_compliance::engine::MigrationError;
use haccp_compliance::repository::record_keys;
use haccp_compliance::{
    MemoryRecordStore, PointRecord, RecordStoreExt, TemperatureSpec,
};
use serde_json::json;
use test_helpers::{default_engine, now};

fn legacy_refrigerators() -> Vec<PointRecord> {
    serde_json::from_value(json!([
        {
            "id": "frigo-latticini",
            "name": "Frigo Latticini",
            "location": "Cucina",
            "selectedCategories": ["fresh_dairy"],
            "targetTemp": "2-4°C"
        },
        {
            "id": "congelatore",
            "name": "Congelatore",
            "department": "Magazzino",
            "selectedCategories": ["frozen"],
            "temperature": -18
        },
        {
            "id": "misterioso",
            "name": "Frigo misterioso",
            "location": "Bar",
            "coolingProfile": "eco"
        }
    ]))
    .expect("legacy fixture is valid")
}

#[test]
fn test_batch_migration_isolates_failures() {
    test_helpers::init_test_logging();
    let engine = default_engine();
    let results = engine
        .migrator()
        .migrate_conservation_points(&legacy_refrigerators(), now());

    assert_eq!(results.len(), 3);
    let dairy = results[0].as_ref().expect("dairy fridge migrates");
    assert_eq!(dairy.temp_spec, TemperatureSpec::Range { min: 2.0, max: 4.0 });
    assert_eq!(dairy.department_name.as_deref(), Some("Cucina"));

    let freezer = results[1].as_ref().expect("freezer migrates");
    assert_eq!(freezer.temp_spec, TemperatureSpec::Fixed { value: -18.0 });
    assert_eq!(freezer.department_name.as_deref(), Some("Magazzino"));

    assert_eq!(
        results[2],
        Err(MigrationError::UnknownSpec {
            point: "misterioso".to_string()
        })
    );
}

#[test]
fn test_migrated_points_pass_compliance() {
    let engine = default_engine();
    let evaluator = engine.evaluator();

    for point in engine
        .migrator()
        .migrate_conservation_points(&legacy_refrigerators(), now())
        .into_iter()
        .flatten()
    {
        assert!(
            evaluator.evaluate_point(&point).is_compliant(),
            "point {} should be compliant",
            point.id
        );
    }
}

#[test]
fn test_migration_through_record_store() {
    let engine = default_engine();
    let store = MemoryRecordStore::new();
    store
        .save(record_keys::REFRIGERATORS, &legacy_refrigerators())
        .expect("save should succeed");

    let legacy: Vec<PointRecord> = store
        .load(record_keys::REFRIGERATORS, Vec::new())
        .expect("load should succeed");
    let migrated: Vec<_> = engine
        .migrator()
        .migrate_conservation_points(&legacy, now())
        .into_iter()
        .filter_map(Result::ok)
        .collect();
    store
        .save(record_keys::REFRIGERATORS, &migrated)
        .expect("save should succeed");
    store.save(record_keys::MIGRATED, &true).expect("save should succeed");

    assert_eq!(migrated.len(), 2);
    assert!(store.load(record_keys::MIGRATED, false).expect("load should succeed"));
}

#[test]
fn test_legacy_dry_storage_with_metadata_migrates_as_ambient() {
    let engine = default_engine();
    let record: PointRecord = serde_json::from_value(json!({
        "id": 1709112345678_i64,
        "name": "Dispensa",
        "location": "Magazzino",
        "dedicatedTo": "secco",
        "nextMaintenance": "",
        "createdBy": "Marco",
        "selectedCategories": ["dry_goods"]
    }))
    .expect("legacy fixture is valid");

    let point = engine
        .migrator()
        .migrate_conservation_point(&record, now())
        .expect("dry storage migrates");
    assert_eq!(point.id, "1709112345678");
    assert_eq!(point.temp_spec, TemperatureSpec::Ambient);
    assert_eq!(point.dedicated_to.as_deref(), Some("secco"));
    assert!(engine.evaluator().evaluate_point(&point).is_compliant());
    assert_eq!(point.to_record().dedicated_to.as_deref(), Some("secco"));

    let unknown = test_helpers::point_from_json(json!({"name": "Dispensa", "humidity": 60}));
    assert!(engine.migrator().migrate_conservation_point(&unknown, now()).is_err());
}
