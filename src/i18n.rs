// ==========================================
// 国际化 (i18n) 模块
// ==========================================
// 使用 rust-i18n 库
// 支持中文（默认）、西班牙语、英文
// ==========================================
// 注意: rust_i18n::i18n! 宏已在 lib.rs 中初始化
// ==========================================

use crate::domain::RunSummary;
use crate::engine::BatchError;
use crate::importer::ImportError;

/// 支持的语言（首项为默认语言）
pub const SUPPORTED_LOCALES: [&str; 3] = ["zh-CN", "es", "en"];

/// 获取当前语言
pub fn current_locale() -> String {
    rust_i18n::locale().to_string()
}

/// 设置语言（未知语言回退到 zh-CN）
///
/// # 参数
/// - locale: 语言代码（"zh-CN" / "es" / "en"，允许 "es-CO"、"zh" 等写法）
pub fn set_locale(locale: &str) {
    rust_i18n::set_locale(resolve_locale(locale));
}

/// 语言代码归一化
pub fn resolve_locale(raw: &str) -> &'static str {
    let lower = raw.trim().to_lowercase();
    let primary = lower.split(['-', '_']).next().unwrap_or("");
    SUPPORTED_LOCALES
        .iter()
        .copied()
        .find(|l| l.split('-').next() == Some(primary))
        .unwrap_or(SUPPORTED_LOCALES[0])
}

/// 翻译消息（无参数）
///
/// # 示例
/// ```no_run
/// use order_batcher::i18n::t;
/// let msg = t("common.success");
/// ```
pub fn t(key: &str) -> String {
    rust_i18n::t!(key).to_string()
}

/// 翻译消息（带参数）
///
/// # 示例
/// ```no_run
/// use order_batcher::i18n::t_with_args;
/// let msg = t_with_args("import.file_not_found", &[("path", "/tmp/pedidos.xlsx")]);
/// ```
pub fn t_with_args(key: &str, args: &[(&str, &str)]) -> String {
    let mut result = rust_i18n::t!(key).to_string();
    for (k, v) in args {
        let placeholder = format!("%{{{}}}", k);
        result = result.replace(&placeholder, v);
    }
    result
}

/// 批次错误的本地化描述
pub fn describe_error(err: &BatchError) -> String {
    let detail = match err {
        BatchError::EmptySource => t("import.empty_source"),
        BatchError::Import(ImportError::FileNotFound(path)) => {
            t_with_args("import.file_not_found", &[("path", path)])
        }
        other => other.to_string(),
    };
    format!("{}: {}", t("common.failed"), detail)
}

/// 运行汇总（当前语言）
pub fn render_summary(summary: &RunSummary) -> Vec<String> {
    let line = |key: &str, value: String| format!("{}: {}", t(key), value);

    let mut lines = vec![
        t("summary.title"),
        line("summary.run_id", summary.run_id.clone()),
        line("summary.source_rows", summary.source_rows.to_string()),
        line("summary.rows_processed", summary.rows_processed.to_string()),
        line("summary.chunks", summary.chunks.to_string()),
        line("summary.warehouse_written", summary.fill.warehouse_written.to_string()),
        line(
            "summary.no_warehouse_destination",
            summary.fill.no_warehouse_destination.to_string(),
        ),
        line("summary.phone_filled", summary.cleaning.phone_filled.to_string()),
        line("summary.email_cleared", summary.cleaning.email_cleared.to_string()),
    ];

    let consolidation = &summary.consolidation;
    if let Some(reason) = &consolidation.skipped {
        lines.push(t_with_args("summary.consolidation_skipped", &[("reason", reason)]));
    } else if !consolidation.stages.is_empty() {
        lines.push(t_with_args(
            "summary.consolidation",
            &[("strategy", &consolidation.strategy)],
        ));
        for (idx, stage) in consolidation.stages.iter().enumerate() {
            lines.push(t_with_args(
                "summary.stage",
                &[
                    ("index", &(idx + 1).to_string()),
                    ("groups", &stage.groups.to_string()),
                    ("removed", &stage.rows_removed.to_string()),
                    ("quantity", &stage.quantity_total.to_string()),
                ],
            ));
        }
    }

    if let Some(path) = &summary.archive_path {
        lines.push(t_with_args("summary.archive", &[("path", path)]));
    }
    lines.push(t_with_args(
        "summary.elapsed",
        &[("ms", &summary.elapsed_ms.to_string())],
    ));
    lines
}
