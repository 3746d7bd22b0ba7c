// ==========================================
// HACCP 合规核心 - 类别冲突检测
// ==========================================
// 职责: 判断同一存储点上的类别安全区间能否共存
// 规则: 两两比较容差扩展后的区间 [min - tol, max + tol]，完全不相交即冲突
// 特例: 速冷机类别无稳态区间，视为中性；未知类别跳过（由判定器报告）
// ==========================================

use crate::domain::category::Category;
use crate::domain::compliance::ConflictReport;
use crate::domain::temperature::TemperatureBand;
use crate::engine::category_registry::CategoryRegistry;
use std::collections::BTreeSet;
use tracing::debug;

pub struct ConflictDetector<'a> {
    registry: &'a CategoryRegistry,
    tolerance: f64,
}

impl<'a> ConflictDetector<'a> {
    pub fn new(registry: &'a CategoryRegistry, tolerance: f64) -> Self {
        Self { registry, tolerance }
    }

    /// 参与比较的类别（去重、按 ID 排序、跳过未知与速冷机类别）
    fn comparable<S: AsRef<str>>(&self, category_ids: &[S]) -> Vec<&'a Category> {
        let registry: &'a CategoryRegistry = self.registry;
        category_ids
            .iter()
            .map(|id| id.as_ref().trim())
            .filter(|id| !id.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .filter_map(|id| registry.get(id))
            .filter(|c| !c.is_blast_chiller())
            .collect()
    }

    /// 检测冲突（空列表 = 无冲突）
    pub fn detect_conflicts<S: AsRef<str>>(&self, category_ids: &[S]) -> Vec<ConflictReport> {
        let categories = self.comparable(category_ids);
        let mut reports = Vec::new();

        for (i, first) in categories.iter().enumerate() {
            let first_range = first.acceptable_band(self.tolerance);
            for second in &categories[i + 1..] {
                let second_range = second.acceptable_band(self.tolerance);
                if !first_range.overlaps(&second_range) {
                    reports.push(ConflictReport {
                        first: first.id().to_string(),
                        second: second.id().to_string(),
                        first_range,
                        second_range,
                    });
                }
            }
        }

        if !reports.is_empty() {
            debug!(count = reports.len(), "检测到类别冲突");
        }
        reports
    }

    pub fn has_conflicts<S: AsRef<str>>(&self, category_ids: &[S]) -> bool {
        !self.detect_conflicts(category_ids).is_empty()
    }

    /// 所有可比较类别的扩展区间交集
    ///
    /// 无可比较类别或交集为空时返回 None
    pub fn shared_range<S: AsRef<str>>(&self, category_ids: &[S]) -> Option<TemperatureBand> {
        let mut bands = self
            .comparable(category_ids)
            .into_iter()
            .map(|c| c.acceptable_band(self.tolerance));
        let first = bands.next()?;
        bands.try_fold(first, |acc, band| acc.intersect(&band))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::category::CategorySeed;

    fn registry() -> CategoryRegistry {
        CategoryRegistry::from_seed(vec![
            CategorySeed::new("cold", "Cold", 0.0, 4.0),
            CategorySeed::new("cool", "Cool", 3.0, 8.0),
            CategorySeed::new("cellar", "Cellar", 10.0, 14.0),
            CategorySeed::new("blast", "Blast", -80.0, -10.0).blast_chiller(),
        ])
        .unwrap()
    }

    #[test]
    fn test_disjoint_expanded_ranges_conflict() {
        let registry = registry();
        let detector = ConflictDetector::new(&registry, 2.0);
        let reports = detector.detect_conflicts(&["cold", "cellar"]);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].first, "cellar");
        assert_eq!(reports[0].second, "cold");
        assert_eq!(reports[0].first_range, TemperatureBand::new(8.0, 16.0));
        assert_eq!(reports[0].second_range, TemperatureBand::new(-2.0, 6.0));
    }

    #[test]
    fn test_overlapping_ranges_compatible() {
        let registry = registry();
        let detector = ConflictDetector::new(&registry, 2.0);
        assert!(!detector.has_conflicts(&["cold", "cool"]));
        // [1, 10] 与 [8, 16]
        assert!(!detector.has_conflicts(&["cool", "cellar"]));
    }

    #[test]
    fn test_blast_chiller_and_unknown_are_neutral() {
        let registry = registry();
        let detector = ConflictDetector::new(&registry, 2.0);
        assert!(!detector.has_conflicts(&["cold", "blast", "missing"]));
    }

    #[test]
    fn test_duplicates_reported_once() {
        let registry = registry();
        let detector = ConflictDetector::new(&registry, 2.0);
        assert_eq!(detector.detect_conflicts(&["cold", "cellar", "cold"]).len(), 1);
    }

    #[test]
    fn test_shared_range() {
        let registry = registry();
        let detector = ConflictDetector::new(&registry, 2.0);
        assert_eq!(
            detector.shared_range(&["cold", "cool"]),
            Some(TemperatureBand::new(1.0, 6.0))
        );
        assert_eq!(detector.shared_range(&["cold", "cellar"]), None);
        assert_eq!(detector.shared_range(&["blast"]), None);
    }
}
