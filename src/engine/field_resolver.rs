// ==========================================
// 订单模板批量生成工具 - 字段取值
// ==========================================
// 职责: 按映射规则计算单个输出单元格的值
// 红线: 任何规则都不报错；源列缺失降级为空值
// ==========================================

use crate::domain::{CellValue, MappingRule, SourceRow};

/// 一次运行内不变的文件名信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStems {
    pub template: String,
    pub source: String,
}

impl FileStems {
    pub fn new(template: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            source: source.into(),
        }
    }
}

impl Default for FileStems {
    fn default() -> Self {
        Self::new("template", "origen")
    }
}

/// 计算单元格取值
pub fn resolve(rule: &MappingRule, row: &SourceRow, stems: &FileStems) -> CellValue {
    match rule {
        MappingRule::CopySource { column } => row.get(column).cloned().unwrap_or_default(),
        MappingRule::Constant { value } => coerce_constant(value),
        MappingRule::TemplateFilenameStem => CellValue::Text(stems.template.clone()),
        MappingRule::SourceFilenameStem => CellValue::Text(stems.source.clone()),
    }
}

/// 固定值尝试转数值：整值 → 整数，其余有限数 → 小数，否则保留原文
pub fn coerce_constant(literal: &str) -> CellValue {
    match literal.trim().parse::<f64>() {
        Ok(f) if f.is_finite() => CellValue::from_f64(f),
        _ => CellValue::Text(literal.to_string()),
    }
}
