// ==========================================
// HACCP 合规核心 - 食品类别
// ==========================================
// 职责: 类别参考数据（安全温度区间）
// 红线: 启动时创建，运行期只读
// ==========================================

use crate::domain::temperature::TemperatureBand;
use serde::{Deserialize, Serialize};

// ==========================================
// CategorySeed - 类别种子数据（外部输入格式）
// ==========================================
// JSON: {"id":"fresh_dairy","name":"Latticini e Formaggi","minTemp":2,"maxTemp":4}
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySeed {
    pub id: String,
    pub name: String,
    pub min_temp: f64,
    pub max_temp: f64,
    #[serde(default)]
    pub description: Option<String>,
    /// 干货/常温储藏类别
    #[serde(default)]
    pub is_ambient: bool,
    /// 速冷机专用类别（无稳态区间）
    #[serde(default)]
    pub is_blast_chiller: bool,
}

impl CategorySeed {
    pub fn new(id: &str, name: &str, min_temp: f64, max_temp: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            min_temp,
            max_temp,
            description: None,
            is_ambient: false,
            is_blast_chiller: false,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn ambient(mut self) -> Self {
        self.is_ambient = true;
        self
    }

    pub fn blast_chiller(mut self) -> Self {
        self.is_blast_chiller = true;
        self
    }
}

// ==========================================
// Category - 注册表条目（不可变）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    id: String,
    name: String,
    min_temp: f64,
    max_temp: f64,
    description: Option<String>,
    is_ambient: bool,
    is_blast_chiller: bool,
}

impl Category {
    pub(crate) fn from_seed(seed: CategorySeed) -> Self {
        Self {
            id: seed.id,
            name: seed.name,
            min_temp: seed.min_temp,
            max_temp: seed.max_temp,
            description: seed.description,
            is_ambient: seed.is_ambient,
            is_blast_chiller: seed.is_blast_chiller,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn min_temp(&self) -> f64 {
        self.min_temp
    }

    pub fn max_temp(&self) -> f64 {
        self.max_temp
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn is_ambient(&self) -> bool {
        self.is_ambient
    }

    pub fn is_blast_chiller(&self) -> bool {
        self.is_blast_chiller
    }

    /// 理想区间 [min, max]
    pub fn safe_band(&self) -> TemperatureBand {
        TemperatureBand::new(self.min_temp, self.max_temp)
    }

    /// 容差扩展后的可接受区间 [min - tol, max + tol]
    pub fn acceptable_band(&self, tolerance: f64) -> TemperatureBand {
        self.safe_band().expand(tolerance)
    }

    /// 原始种子（用于导出）
    pub fn to_seed(&self) -> CategorySeed {
        CategorySeed {
            id: self.id.clone(),
            name: self.name.clone(),
            min_temp: self.min_temp,
            max_temp: self.max_temp,
            description: self.description.clone(),
            is_ambient: self.is_ambient,
            is_blast_chiller: self.is_blast_chiller,
        }
    }
}
