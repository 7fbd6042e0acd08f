// ==========================================
// 订单模板批量生成工具 - 仓库分配规则
// ==========================================
// 职责: 自由文本 (城市, 省份) → 仓库标签
// 规则（严格优先级，命中即返回）:
//   1. 城市精确匹配
//   2. 省份精确匹配
//   3. 关键字子串匹配（城市或省份中出现，按 hub 顺序）
//   4. 默认 hub
// 红线: 纯函数、确定性、全函数（永不失败）
// ==========================================

use crate::config::WarehouseTables;
use crate::domain::{SourceRow, WarehouseLabel};
use crate::engine::normalizer::normalize_strict;
use serde::Serialize;
use std::fmt;

/// 命中的规则层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchedBy {
    City,
    Department,
    Keyword,
    Default,
}

impl fmt::Display for MatchedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchedBy::City => write!(f, "city"),
            MatchedBy::Department => write!(f, "department"),
            MatchedBy::Keyword => write!(f, "keyword"),
            MatchedBy::Default => write!(f, "default"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    pub label: &'a WarehouseLabel,
    pub matched_by: MatchedBy,
}

// ==========================================
// WarehouseAssigner
// ==========================================
#[derive(Debug, Clone)]
pub struct WarehouseAssigner {
    tables: WarehouseTables,
}

impl WarehouseAssigner {
    pub fn new(tables: WarehouseTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &WarehouseTables {
        &self.tables
    }

    pub fn assign(&self, city: &str, department: &str) -> &WarehouseLabel {
        self.resolve(city, department).label
    }

    /// 分配并返回命中层级
    pub fn resolve(&self, city: &str, department: &str) -> Assignment<'_> {
        let city = normalize_strict(city);
        let department = normalize_strict(department);

        if let Some(label) = self.tables.city(&city) {
            return Assignment {
                label,
                matched_by: MatchedBy::City,
            };
        }

        if let Some(label) = self.tables.department(&department) {
            return Assignment {
                label,
                matched_by: MatchedBy::Department,
            };
        }

        for (label, keywords) in self.tables.keyword_groups() {
            let hit = keywords
                .iter()
                .any(|kw| city.contains(kw.as_str()) || department.contains(kw.as_str()));
            if hit {
                return Assignment {
                    label,
                    matched_by: MatchedBy::Keyword,
                };
            }
        }

        Assignment {
            label: self.tables.default_label(),
            matched_by: MatchedBy::Default,
        }
    }

    /// 按源表行分配（列缺失视为空）
    pub fn assign_row(
        &self,
        row: &SourceRow,
        city_column: &str,
        department_column: &str,
    ) -> &WarehouseLabel {
        self.assign(&row.text(city_column), &row.text(department_column))
    }
}
