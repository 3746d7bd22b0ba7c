// ==========================================
// HACCP 合规核心 - 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持意大利语（默认）和英语
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// 引擎内部一律使用显式 locale（来自 ComplianceConfig），不依赖全局语言
// ==========================================

/// 默认语言
pub const DEFAULT_LOCALE: &str = "it";

/// 已提供翻译文件的语言
pub const AVAILABLE_LOCALES: &[&str] = &["it", "en"];

/// 是否为已支持的语言
pub fn is_supported_locale(locale: &str) -> bool {
    AVAILABLE_LOCALES.contains(&locale)
}

/// 获取当前全局语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置全局语言
///
/// # 参数
/// - locale: 语言代码（"it" 或 "en"）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(locale);
}

/// 按全局语言翻译（无参数）
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 按指定语言翻译（无参数）
///
/// # 示例
/// ```no_run
/// use haccp_compliance::i18n::tr;
/// let msg = tr("en", "reading.compliant");
/// ```
pub fn tr(locale: &str, key: &str) -> String {
    rust_i18n::t!(key, locale = locale).to_string()
}

/// 按指定语言翻译（带参数）
///
/// 占位符格式: %{name}
///
/// # 示例
/// ```no_run
/// use haccp_compliance::i18n::tr_with_args;
/// let msg = tr_with_args("it", "reading.tolerance", &[("diff", "1.0")]);
/// ```
pub fn tr_with_args(locale: &str, key: &str, args: &[(&str, &str)]) -> String {
    let mut result = tr(locale, key);
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 温度数值格式化：整数不带小数位（4 → "4"，2.5 → "2.5"）
pub fn fmt_celsius(value: f64) -> String {
    format!("{}", value)
}
