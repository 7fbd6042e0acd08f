// ==========================================
// 订单模板批量生成工具 - 模板表头布局
// ==========================================
// 职责: 目标模板某一工作表的表头（列位置 → 表头名）
// 约定: 列位置 1 起，连续；同名表头可占多个列位置
// ==========================================

use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLayout {
    pub sheet_name: String,
    pub header_row: u32,
    headers: Vec<String>,                // headers[i] 对应第 i+1 列（空表头为 ""）
    positions: HashMap<String, Vec<u32>>, // 表头名 → 全部列位置（升序）
}

impl TemplateLayout {
    pub fn new(sheet_name: impl Into<String>, header_row: u32, headers: Vec<String>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let mut positions: HashMap<String, Vec<u32>> = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            if name.is_empty() {
                continue;
            }
            positions
                .entry(name.clone())
                .or_default()
                .push(idx as u32 + 1);
        }
        Self {
            sheet_name: sheet_name.into(),
            header_row,
            headers,
            positions,
        }
    }

    /// 表头列数（含空表头）
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// 全部列（含空表头），顺序即列顺序
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// 去重后的非空表头名（按首次出现顺序）
    pub fn header_names(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        self.headers
            .iter()
            .filter(|h| !h.is_empty() && seen.insert(h.as_str()))
            .map(String::as_str)
            .collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.positions.contains_key(name)
    }

    /// 普通映射写入的列：同名表头取最后一次出现的位置
    pub fn column_of(&self, name: &str) -> Option<u32> {
        self.positions.get(name).and_then(|p| p.last().copied())
    }

    pub fn positions_of(&self, name: &str) -> &[u32] {
        self.positions.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 满足条件的表头的全部列位置（升序）
    pub fn positions_where<F>(&self, mut pred: F) -> Vec<u32>
    where
        F: FnMut(&str) -> bool,
    {
        let mut out: Vec<u32> = self
            .positions
            .iter()
            .filter(|(name, _)| pred(name))
            .flat_map(|(_, p)| p.iter().copied())
            .collect();
        out.sort_unstable();
        out
    }
}
