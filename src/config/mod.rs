// ==========================================
// 订单模板批量生成工具 - 配置层
// ==========================================
// 职责: 批次配置、仓库查表数据、合并策略数据
// 存储: TOML 文件（内置默认 + 运维覆盖）
// ==========================================

pub mod batch_config;
pub mod config_manager;
pub mod consolidation_profile;
pub mod error;
pub mod warehouse_tables;

// 重导出核心配置类型
pub use batch_config::{
    BatchConfig, CleaningConfig, ConsolidationConfig, IndicativoConfig, MappingSetting,
    SourceColumns,
};
pub use config_manager::{config_keys, ConfigManager};
pub use consolidation_profile::{
    ConsolidationColumns, ConsolidationMode, ConsolidationProfile, ConsolidationStage, OrderIdRule,
};
pub use error::{ConfigError, ConfigResult};
pub use warehouse_tables::{WarehouseTables, BUILTIN_TABLES_TOML};
