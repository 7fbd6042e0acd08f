// ==========================================
// 订单模板批量生成工具 - 源表行模型
// ==========================================
// 职责: 源表（列名 → 标量值）的内存表示
// 用途: 导入层写入，清洗/合并整表就地修改，填充阶段只读
// ==========================================

use crate::domain::types::CellValue;
use std::collections::HashMap;

// ==========================================
// SourceRow - 源表数据行
// ==========================================
// 列不预先固定；只有少数约定列名会被业务规则解释
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceRow {
    pub row_number: usize, // 源表数据行号（1 起，不含表头）
    values: HashMap<String, CellValue>,
}

impl SourceRow {
    pub fn new(row_number: usize) -> Self {
        Self {
            row_number,
            values: HashMap::new(),
        }
    }

    /// 按列名构造（测试/夹具常用）
    pub fn from_pairs<I, K, V>(row_number: usize, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<CellValue>,
    {
        let mut row = Self::new(row_number);
        for (k, v) in pairs {
            row.set(k, v.into());
        }
        row
    }

    pub fn get(&self, column: &str) -> Option<&CellValue> {
        self.values.get(column)
    }

    /// 文本视图；列缺失视为空串
    pub fn text(&self, column: &str) -> String {
        self.values
            .get(column)
            .map(CellValue::as_text)
            .unwrap_or_default()
    }

    pub fn set(&mut self, column: impl Into<String>, value: CellValue) {
        self.values.insert(column.into(), value);
    }

    /// 整行空白（所有单元格皆空）
    pub fn is_blank(&self) -> bool {
        self.values.values().all(CellValue::is_blank)
    }
}

// ==========================================
// SourceTable - 源表
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceTable {
    pub columns: Vec<String>, // 表头（保持源表顺序，已 TRIM）
    pub rows: Vec<SourceRow>,
}

impl SourceTable {
    pub fn new(columns: Vec<String>, rows: Vec<SourceRow>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// 缺失的列（按入参顺序）
    pub fn missing_columns<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|c| !self.has_column(c))
            .collect()
    }

    /// 追加派生列（已存在则忽略）
    pub fn ensure_column(&mut self, column: &str) {
        if !self.has_column(column) {
            self.columns.push(column.to_string());
        }
    }
}
