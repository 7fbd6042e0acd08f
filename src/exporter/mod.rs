// ==========================================
// 订单模板批量生成工具 - 导出层
// ==========================================
// 职责: 分块模板填充、压缩包打包
// 输出: {prefix}{NN}.xlsx × N → {prefix}_lotes.zip
// ==========================================

pub mod error;
pub mod packager;
pub mod template_filler;

// 重导出核心类型
pub use error::{ExportError, ExportResult};
pub use packager::{ArchivePackager, ChunkFile};
pub use template_filler::{read_workbook, write_workbook, TemplateFiller};
