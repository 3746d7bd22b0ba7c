// ==========================================
// HACCP 合规核心 - 引擎门面
// ==========================================
// 职责: 持有启动时构造的注册表、配置与解析器，按引用分发给各引擎
// 红线: 构造后只读；可在线程间共享（Send + Sync）
// ==========================================

use crate::config::compliance_config::ComplianceConfig;
use crate::config::config_manager::ConfigManager;
use crate::config::error::ConfigResult;
use crate::domain::compliance::{ComplianceResult, ConflictReport};
use crate::domain::records::PointRecord;
use crate::domain::temperature::ParsedSpec;
use crate::engine::category_registry::CategoryRegistry;
use crate::engine::compliance::ComplianceEvaluator;
use crate::engine::conflict::ConflictDetector;
use crate::engine::migration::PointMigrator;
use crate::engine::presentation::Presenter;
use crate::engine::spec_parser::SpecParser;
use crate::engine::validators::RecordValidator;
use tracing::info;

pub struct HaccpEngine {
    registry: CategoryRegistry,
    config: ComplianceConfig,
    parser: SpecParser,
}

impl HaccpEngine {
    /// 创建引擎（配置先校验）
    pub fn new(registry: CategoryRegistry, config: ComplianceConfig) -> ConfigResult<Self> {
        let config = config.validated()?;
        Ok(Self {
            registry,
            config,
            parser: SpecParser::new(),
        })
    }

    /// 内置注册表 + 默认配置
    pub fn with_defaults() -> Self {
        Self {
            registry: CategoryRegistry::builtin(),
            config: ComplianceConfig::default(),
            parser: SpecParser::new(),
        }
    }

    /// 从 config_kv 加载配置与类别种子覆写
    pub fn from_config_manager(manager: &ConfigManager) -> ConfigResult<Self> {
        let config = manager.load_compliance_config()?;
        let registry = match manager.load_category_seed()? {
            Some(seed) => CategoryRegistry::from_seed(seed)?,
            None => CategoryRegistry::builtin(),
        };
        info!(
            categories = registry.len(),
            tolerance_c = config.tolerance_c,
            locale = %config.locale,
            "HACCP 引擎配置已加载"
        );
        Self::new(registry, config)
    }

    pub fn registry(&self) -> &CategoryRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ComplianceConfig {
        &self.config
    }

    pub fn parser(&self) -> &SpecParser {
        &self.parser
    }

    // ===== 各引擎（借用本门面持有的数据） =====

    pub fn evaluator(&self) -> ComplianceEvaluator<'_> {
        ComplianceEvaluator::new(&self.registry, &self.config)
    }

    pub fn conflict_detector(&self) -> ConflictDetector<'_> {
        ConflictDetector::new(&self.registry, self.config.tolerance_c)
    }

    pub fn validator(&self) -> RecordValidator<'_> {
        RecordValidator::new(&self.registry, &self.config, &self.parser)
    }

    pub fn presenter(&self) -> Presenter<'_> {
        Presenter::new(&self.registry, &self.config)
    }

    pub fn migrator(&self) -> PointMigrator<'_> {
        PointMigrator::new(&self.parser, &self.config)
    }

    // ===== 常用操作 =====

    pub fn parse_spec(&self, record: &PointRecord) -> ParsedSpec {
        self.parser.parse(record)
    }

    pub fn evaluate_point_compliance<S: AsRef<str>>(
        &self,
        spec: &ParsedSpec,
        category_ids: &[S],
    ) -> ComplianceResult {
        self.evaluator().evaluate_point_compliance(spec, category_ids)
    }

    pub fn evaluate_observed_temperature(&self, actual: f64, spec: &ParsedSpec) -> ComplianceResult {
        self.evaluator().evaluate_observed_temperature(actual, spec)
    }

    pub fn detect_conflicts<S: AsRef<str>>(&self, category_ids: &[S]) -> Vec<ConflictReport> {
        self.conflict_detector().detect_conflicts(category_ids)
    }
}

impl Default for HaccpEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}
