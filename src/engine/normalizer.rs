// ==========================================
// 订单模板批量生成工具 - 文本归一化
// ==========================================
// 职责: 城市/省份/品牌/公司等自由文本的大小写与重音折叠
// 用途: 查表与分组键比较前统一归一化；slug 用于生成标识
// ==========================================

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));

/// 小写 + 去除首尾空白 + 去除重音（NFD 分解后丢弃组合符）
///
/// 空串/缺失值归一化为 ""
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect();
    folded.trim().to_string()
}

/// normalize + 内部连续空白压缩为单个空格（分组键使用）
pub fn normalize_strict(text: &str) -> String {
    WHITESPACE_RUN
        .replace_all(&normalize(text), " ")
        .into_owned()
}

/// 仅保留 ASCII 字母与数字（生成标识使用）
pub fn slug(text: &str) -> String {
    NON_ALNUM.replace_all(&normalize_strict(text), "").into_owned()
}
