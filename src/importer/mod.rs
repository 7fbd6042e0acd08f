// ==========================================
// 订单模板批量生成工具 - 导入层
// ==========================================
// 职责: 源表与模板读取、源表清洗
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod template_reader;

// 重导出核心类型
pub use data_cleaner::{DataCleaner, EmailFilter, PhoneFiller};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use template_reader::XlsxTemplateReader;

// 重导出 Trait 接口
pub use importer_trait::{FileParser, RowCleaner, TemplateReader};
