// ==========================================
// HACCP 合规核心 - 类别规则注册表
// ==========================================
// 职责: 类别 ID → 安全温度区间 的只读查找表
// 红线: 启动时构造一次，之后只读；可在线程间共享
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::category::{Category, CategorySeed};
use std::collections::{HashMap, HashSet};

/// 内置类别种子
pub fn builtin_seed() -> Vec<CategorySeed> {
    vec![
        CategorySeed::new("fresh_dairy", "Latticini e Formaggi", 2.0, 4.0)
            .with_description("Latte, formaggi freschi, yogurt"),
        CategorySeed::new("fresh_meat", "Carni Fresche", 0.0, 4.0)
            .with_description("Carni crude, pollame, salumi freschi"),
        CategorySeed::new("fresh_fish", "Pesce Fresco", 0.0, 2.0)
            .with_description("Pesce fresco, molluschi, crostacei"),
        CategorySeed::new("fresh_produce", "Verdure e Ortaggi", 2.0, 8.0)
            .with_description("Verdure fresche, insalate, ortaggi"),
        CategorySeed::new("fresh_fruits", "Frutta Fresca", 2.0, 8.0)
            .with_description("Frutta fresca di stagione"),
        CategorySeed::new("frozen", "Surgelati", -20.0, -16.0)
            .with_description("Tutti i prodotti surgelati"),
        CategorySeed::new("deep_frozen", "Ultra Surgelati", -25.0, -18.0)
            .with_description("Prodotti ultra surgelati (es. gelati)"),
        CategorySeed::new("dry_goods", "Dispensa Secca", 15.0, 25.0)
            .with_description("Pasta, riso, farina, conserve")
            .ambient(),
        CategorySeed::new("hot_holding", "Mantenimento Caldo", 60.0, 70.0)
            .with_description("Piatti pronti caldi, mantenuti a temperatura"),
        CategorySeed::new("chilled_ready", "Pronti Freddi", 2.0, 8.0)
            .with_description("Piatti pronti freddi, insalate pronte"),
        CategorySeed::new("fresh_beverages", "Bevande Fresche", 2.0, 10.0)
            .with_description("Bibite, succhi, acqua, bevande fresche"),
        CategorySeed::new("abbattitore_menu", "Prodotti per Menù / Scorte", -80.0, -10.0)
            .with_description("Prodotti per menù e scorte in abbattitore")
            .blast_chiller(),
        CategorySeed::new(
            "abbattitore_esposizione",
            "Prodotti per Esposizione / Vendita",
            -80.0,
            -10.0,
        )
        .with_description("Prodotti per esposizione e vendita in abbattitore")
        .blast_chiller(),
    ]
}

// ==========================================
// CategoryRegistry - 类别注册表
// ==========================================
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    categories: Vec<Category>,
    index: HashMap<String, usize>,
}

impl CategoryRegistry {
    /// 内置注册表
    pub fn builtin() -> Self {
        Self::build(builtin_seed())
    }

    /// 从种子数据构造（校验后）
    ///
    /// # 校验规则
    /// - 种子非空
    /// - id 非空且唯一
    /// - min/max 为有限数且 min <= max（单点区间允许）
    pub fn from_seed(seed: Vec<CategorySeed>) -> ConfigResult<Self> {
        if seed.is_empty() {
            return Err(ConfigError::EmptyRegistry);
        }

        let mut seen = HashSet::new();
        for entry in &seed {
            let id = entry.id.trim();
            if id.is_empty() {
                return Err(ConfigError::InvalidCategory {
                    id: entry.id.clone(),
                    message: "id 为空".to_string(),
                });
            }
            if !entry.min_temp.is_finite() || !entry.max_temp.is_finite() {
                return Err(ConfigError::InvalidCategory {
                    id: id.to_string(),
                    message: "温度必须为有限数".to_string(),
                });
            }
            if entry.min_temp > entry.max_temp {
                return Err(ConfigError::InvalidCategory {
                    id: id.to_string(),
                    message: format!("minTemp {} > maxTemp {}", entry.min_temp, entry.max_temp),
                });
            }
            if !seen.insert(id.to_string()) {
                return Err(ConfigError::DuplicateCategory(id.to_string()));
            }
        }

        Ok(Self::build(seed))
    }

    fn build(seed: Vec<CategorySeed>) -> Self {
        let categories: Vec<Category> = seed
            .into_iter()
            .map(|mut s| {
                s.id = s.id.trim().to_string();
                Category::from_seed(s)
            })
            .collect();
        let index = categories
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id().to_string(), i))
            .collect();
        Self { categories, index }
    }

    pub fn get(&self, id: &str) -> Option<&Category> {
        self.index.get(id).map(|&i| &self.categories[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// 常温/干货储藏类别
    pub fn ambient_category(&self) -> Option<&Category> {
        self.categories.iter().find(|c| c.is_ambient())
    }

    /// 按种子顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// 导出种子
    pub fn to_seed(&self) -> Vec<CategorySeed> {
        self.categories.iter().map(Category::to_seed).collect()
    }
}

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_seed_is_valid() {
        let registry = CategoryRegistry::from_seed(builtin_seed()).unwrap();
        assert_eq!(registry.len(), 13);
        assert_eq!(registry.len(), CategoryRegistry::builtin().len());
    }

    #[test]
    fn test_lookup() {
        let registry = CategoryRegistry::builtin();
        let dairy = registry.get("fresh_dairy").unwrap();
        assert_eq!(dairy.min_temp(), 2.0);
        assert_eq!(dairy.max_temp(), 4.0);
        assert!(registry.get("dairy").is_none());
        assert!(registry.get("abbattitore_menu").unwrap().is_blast_chiller());
    }

    #[test]
    fn test_ambient_category() {
        let registry = CategoryRegistry::builtin();
        assert_eq!(registry.ambient_category().map(|c| c.id()), Some("dry_goods"));
    }

    #[test]
    fn test_seed_validation() {
        assert!(matches!(
            CategoryRegistry::from_seed(vec![]),
            Err(ConfigError::EmptyRegistry)
        ));
        assert!(matches!(
            CategoryRegistry::from_seed(vec![
                CategorySeed::new("a", "A", 0.0, 4.0),
                CategorySeed::new(" a ", "A2", 1.0, 2.0),
            ]),
            Err(ConfigError::DuplicateCategory(ref id)) if id == "a"
        ));
        assert!(matches!(
            CategoryRegistry::from_seed(vec![CategorySeed::new("b", "B", 8.0, 2.0)]),
            Err(ConfigError::InvalidCategory { .. })
        ));
        assert!(CategoryRegistry::from_seed(vec![CategorySeed::new("c", "C", -18.0, -18.0)]).is_ok());
    }
}
