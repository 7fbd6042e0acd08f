// ==========================================
// 订单模板批量生成工具 - 核心库
// ==========================================
// 流程: 源表 → 清洗 → 合并 → 字段映射 + 仓库分配 → 分块模板 → 压缩包
// 系统定位: 离线批处理（单线程、确定性输出，电话补全除外）
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 批次配置 / 仓库查表 / 合并策略
pub mod config;

// 导入层 - 源表与模板读取、清洗
pub mod importer;

// 引擎层 - 业务规则与编排
pub mod engine;

// 导出层 - 模板填充与打包
pub mod exporter;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// 性能计时
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    CellValue, ColumnMapping, MappingRule, RunSummary, SourceRow, SourceTable, TemplateLayout,
    WarehouseLabel,
};

// 配置
pub use config::{BatchConfig, ConfigManager, ConsolidationMode, WarehouseTables};

// 引擎
pub use engine::{BatchError, BatchInput, BatchOutput, BatchRunner, WarehouseAssigner};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "订单模板批量生成工具";
