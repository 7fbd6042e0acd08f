// ==========================================
// 订单模板批量生成工具 - 领域模型层
// ==========================================
// 职责: 定义源表/模板/映射/仓库/统计等领域类型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod mapping;
pub mod report;
pub mod row;
pub mod template;
pub mod types;
pub mod warehouse;

// 重导出核心类型
pub use mapping::{
    is_reserved, ColumnMapping, MappingRule, ORDER_REFERENCE_DESTINATION, RESERVED_DESTINATIONS,
};
pub use report::{ChunkStats, CleaningReport, ConsolidationReport, RunSummary, StageReport};
pub use row::{SourceRow, SourceTable};
pub use template::TemplateLayout;
pub use types::{CellValue, DATETIME_FORMAT, DATE_FORMAT};
pub use warehouse::WarehouseLabel;
