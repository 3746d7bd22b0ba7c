// ==========================================
// HACCP 合规核心 - 命令行入口
// ==========================================
// 用法: haccp-compliance <command> <args>
// 输入: JSON 文件（单个对象或数组）
// 输出: JSON（stdout），日志走 stderr
// 配置: HACCP_COMPLIANCE_DB 指向数据库时从 config_kv 加载，否则使用默认值
// 日志: HACCP_LOG_JSON=1 时输出 JSON 格式日志
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use haccp_compliance::domain::temperature::ParsedSpec;
use haccp_compliance::engine::validators::point_category_ids;
use haccp_compliance::{
    logging, ConfigManager, HaccpEngine, PointRecord, ProductRecord, TemperatureLogRecord,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::path::Path;

const DB_ENV: &str = "HACCP_COMPLIANCE_DB";
const LOG_JSON_ENV: &str = "HACCP_LOG_JSON";

const USAGE: &str = "\
用法: haccp-compliance <command> <args>

命令:
  parse <file>                  解析存储点设定温度
  point <file>                  校验存储点并判定合规
  product <file> [YYYY-MM-DD]   校验产品（默认以今天为基准）
  log <file>                    校验温度记录
  reading <celsius> <file>      判定读数是否符合存储点设定
  categories                    列出类别注册表";

fn main() {
    match std::env::var(LOG_JSON_ENV) {
        Ok(v) if v == "1" || v.eq_ignore_ascii_case("true") => logging::init_json(),
        _ => logging::init(),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            tracing::error!("{:#}", e);
            eprintln!("{}", USAGE);
            std::process::exit(1);
        }
    }
}

fn build_engine() -> Result<HaccpEngine> {
    match std::env::var(DB_ENV) {
        Ok(path) if !path.trim().is_empty() => {
            let manager = ConfigManager::new(path.trim())
                .with_context(|| format!("无法打开配置数据库: {}", path))?;
            Ok(HaccpEngine::from_config_manager(&manager)?)
        }
        _ => Ok(HaccpEngine::with_defaults()),
    }
}

/// 读取 JSON 文件，单个对象视为一条记录
fn read_records<T: DeserializeOwned>(path: &str) -> Result<Vec<T>> {
    let text = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("无法读取文件: {}", path))?;
    let value: Value =
        serde_json::from_str(&text).with_context(|| format!("JSON 格式错误: {}", path))?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).context("记录结构不匹配"))
        .collect()
}

fn spec_json(spec: &ParsedSpec) -> Value {
    match spec {
        ParsedSpec::Known(spec) => json!(spec),
        ParsedSpec::Unknown => json!({ "mode": "unknown" }),
    }
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str> {
    args.get(index)
        .map(String::as_str)
        .with_context(|| format!("缺少参数: {}", name))
}

fn run(args: &[String]) -> Result<String> {
    let command = arg(args, 0, "command")?;
    let engine = build_engine()?;

    let output = match command {
        "parse" => {
            let records: Vec<PointRecord> = read_records(arg(args, 1, "file")?)?;
            let presenter = engine.presenter();
            let rows: Vec<Value> = records
                .iter()
                .map(|record| {
                    let spec = engine.parse_spec(record);
                    json!({
                        "name": record.name,
                        "spec": spec_json(&spec),
                        "display": presenter.display_temperature(&spec),
                        "storageKind": presenter.storage_kind(&spec),
                    })
                })
                .collect();
            json!(rows)
        }
        "point" => {
            let records: Vec<PointRecord> = read_records(arg(args, 1, "file")?)?;
            let validator = engine.validator();
            let presenter = engine.presenter();
            let rows: Vec<Value> = records
                .iter()
                .map(|record| {
                    let ids = point_category_ids(record);
                    json!({
                        "name": record.name,
                        "result": validator.assess_point(record),
                        "conflicts": engine.detect_conflicts(&ids),
                        "optimalRange": presenter.optimal_range(&ids),
                    })
                })
                .collect();
            json!(rows)
        }
        "product" => {
            let records: Vec<ProductRecord> = read_records(arg(args, 1, "file")?)?;
            let today = match args.get(2) {
                Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .with_context(|| format!("日期格式错误: {}", raw))?,
                None => Local::now().date_naive(),
            };
            let validator = engine.validator();
            let presenter = engine.presenter();
            let rows: Vec<Value> = records
                .iter()
                .map(|record| {
                    json!({
                        "name": record.name,
                        "result": validator.validate_product(record, today),
                        "expiry": record
                            .expiry_date
                            .as_deref()
                            .and_then(|d| presenter.expiry_status_str(d, today)),
                    })
                })
                .collect();
            json!(rows)
        }
        "log" => {
            let records: Vec<TemperatureLogRecord> = read_records(arg(args, 1, "file")?)?;
            let validator = engine.validator();
            let rows: Vec<Value> = records
                .iter()
                .map(|record| json!(validator.validate_temperature_log(record)))
                .collect();
            json!(rows)
        }
        "reading" => {
            let raw = arg(args, 1, "celsius")?;
            let actual: f64 = raw
                .trim()
                .replace(',', ".")
                .parse()
                .with_context(|| format!("温度读数格式错误: {}", raw))?;
            let records: Vec<PointRecord> = read_records(arg(args, 2, "file")?)?;
            let Some(record) = records.first() else {
                bail!("存储点文件为空");
            };
            let spec = engine.parse_spec(record);
            json!({
                "name": record.name,
                "spec": spec_json(&spec),
                "result": engine.evaluate_observed_temperature(actual, &spec),
                "status": engine.presenter().reading_status(actual, &spec),
            })
        }
        "categories" => json!(engine.registry().to_seed()),
        other => bail!("未知命令: {}", other),
    };

    Ok(serde_json::to_string_pretty(&output)?)
}
