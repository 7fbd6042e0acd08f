// ==========================================
// 订单模板批量生成工具 - 导出模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 语义: 任一分块失败即中止整个批次（不写出压缩包）
// ==========================================

use thiserror::Error;

/// 导出模块错误类型
#[derive(Error, Debug)]
pub enum ExportError {
    // ===== 模板相关错误 =====
    #[error("模板工作表不存在: {sheet}")]
    TemplateSheetNotFound { sheet: String },

    #[error("模板读取失败: {0}")]
    WorkbookReadError(String),

    #[error("工作簿写出失败: {0}")]
    WorkbookWriteError(String),

    // ===== 打包相关错误 =====
    #[error("压缩包写入失败: {0}")]
    ArchiveError(String),

    #[error("文件写入失败: {0}")]
    FileWriteError(String),
}

impl From<std::io::Error> for ExportError {
    fn from(err: std::io::Error) -> Self {
        ExportError::FileWriteError(err.to_string())
    }
}

impl From<zip::result::ZipError> for ExportError {
    fn from(err: zip::result::ZipError) -> Self {
        ExportError::ArchiveError(err.to_string())
    }
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
