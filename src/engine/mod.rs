// ==========================================
// 订单模板批量生成工具 - 引擎层
// ==========================================
// 职责: 文本归一化、仓库分配、字段取值、行合并、分块规划、批次编排
// 红线: 引擎不直接读写文件（编排器除外），所有统计显式返回
// ==========================================

pub mod chunking;
pub mod consolidator;
pub mod error;
pub mod field_resolver;
pub mod normalizer;
pub mod orchestrator;
pub mod warehouse;

// 重导出核心引擎
pub use chunking::{archive_name, chunk_count, chunk_file_name, plan_chunks, ChunkPlan};
pub use consolidator::{run_stage, RowConsolidator};
pub use error::{BatchError, BatchResult};
pub use field_resolver::{coerce_constant, resolve, FileStems};
pub use normalizer::{normalize, normalize_strict, slug};
pub use orchestrator::{BatchInput, BatchOutput, BatchRunner, RunContext};
pub use warehouse::{Assignment, MatchedBy, WarehouseAssigner};
