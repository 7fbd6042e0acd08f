// ==========================================
// 订单模板批量生成工具 - 批次错误类型
// ==========================================
// 工具: thiserror 派生宏
// 语义: 任一错误中止整个批次；已生成的分块全部丢弃
// ==========================================

use crate::config::ConfigError;
use crate::exporter::ExportError;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BatchError {
    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("源表没有可处理的数据行")]
    EmptySource,

    #[error("第 {chunk} 个分块生成失败: {source}")]
    ChunkFailed {
        chunk: usize,
        #[source]
        source: ExportError,
    },
}

/// Result 类型别名
pub type BatchResult<T> = Result<T, BatchError>;
