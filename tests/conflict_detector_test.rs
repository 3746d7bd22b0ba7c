// ==========================================
// 类别冲突检测 集成测试
// ==========================================
// 测试目标: 容差扩展区间的两两兼容性判断
// ==========================================


use haccp_compliance::{CategoryRegistry, CategorySeed, ConflictDetector, TemperatureBand};
use test_helpers::default_engine;

fn seed_registry() -> CategoryRegistry {
    CategoryRegistry::from_seed(vec![
        CategorySeed::new("chilled", "Refrigerati", 0.0, 4.0),
        CategorySeed::new("cool", "Freschi", 3.0, 8.0),
        CategorySeed::new("edge", "Limite", 8.0, 12.0),
        CategorySeed::new("cellar", "Cantina", 10.0, 14.0),
    ])
    .expect("种子有效")
}

#[test]
fn test_disjoint_ranges_are_incompatible() {
    let registry = seed_registry();
    let detector = ConflictDetector::new(&registry, 2.0);

    let reports = detector.detect_conflicts(&["chilled", "cellar"]);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].first, "cellar");
    assert_eq!(reports[0].second, "chilled");
    assert_eq!(reports[0].first_range, TemperatureBand::new(8.0, 16.0));
    assert_eq!(reports[0].second_range, TemperatureBand::new(-2.0, 6.0));
}

#[test]
fn test_overlapping_ranges_are_compatible() {
    let registry = seed_registry();
    let detector = ConflictDetector::new(&registry, 2.0);
    assert!(!detector.has_conflicts(&["chilled", "cool"]));
}

#[test]
fn test_touching_expanded_ranges_are_compatible() {
    let registry = seed_registry();
    // [-2, 6] 与 [6, 14] 端点相接
    assert!(!ConflictDetector::new(&registry, 2.0).has_conflicts(&["chilled", "edge"]));
    // 容差收紧后不再相接
    assert!(ConflictDetector::new(&registry, 1.0).has_conflicts(&["chilled", "edge"]));
}

#[test]
fn test_detection_is_order_independent() {
    let registry = seed_registry();
    let detector = ConflictDetector::new(&registry, 2.0);

    let forward = detector.detect_conflicts(&["chilled", "cool", "cellar"]);
    let backward = detector.detect_conflicts(&["cellar", "cool", "chilled"]);
    assert_eq!(forward, backward);
    assert!(forward.iter().all(|r| r.involves("cellar")));
}

#[test]
fn test_builtin_frozen_and_fresh_conflict() {
    let engine = default_engine();
    let reports = engine.detect_conflicts(&["fresh_meat", "frozen"]);
    assert_eq!(reports.len(), 1);

    // 速冷机类别不参与比较
    assert!(engine
        .detect_conflicts(&["abbattitore_menu", "fresh_meat"])
        .is_empty());
    assert!(engine.detect_conflicts(&["fresh_meat"]).is_empty());
}

#[test]
fn test_shared_range() {
    let registry = seed_registry();
    let detector = ConflictDetector::new(&registry, 2.0);
    assert_eq!(
        detector.shared_range(&["chilled", "cool"]),
        Some(TemperatureBand::new(1.0, 6.0))
    );
    assert_eq!(detector.shared_range(&["chilled", "cellar"]), None);
}
