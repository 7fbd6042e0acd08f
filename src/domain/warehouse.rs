// ==========================================
// 订单模板批量生成工具 - 仓库标签
// ==========================================
// hub: 仓库分组标识（如 "bogota" / "medellin"）
// label: 写入模板的显示名称
// reference_city: 仅用于查表参考，不写入输出
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WarehouseLabel {
    pub hub: String,
    pub label: String,
    #[serde(default)]
    pub reference_city: String,
}

impl fmt::Display for WarehouseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label)
    }
}
