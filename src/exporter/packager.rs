// ==========================================
// 订单模板批量生成工具 - 压缩包打包
// ==========================================
// 职责: 全部分块文件打包为一个 zip（内存中构建，Deflate 压缩）
// 红线: 所有分块成功后才落盘；任一失败不产生压缩包
// ==========================================

use crate::exporter::error::ExportResult;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// 一个已生成的分块文件
#[derive(Debug, Clone)]
pub struct ChunkFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

#[derive(Default)]
pub struct ArchivePackager {
    entries: Vec<ChunkFile>,
}

impl ArchivePackager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, file: ChunkFile) {
        self.entries.push(file);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn file_names(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.name.clone()).collect()
    }

    /// 编码为 zip 字节（条目顺序即加入顺序）
    pub fn to_zip_bytes(&self) -> ExportResult<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let opts = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            zip.start_file(entry.name.as_str(), opts)?;
            zip.write_all(&entry.bytes)?;
        }

        let cursor = zip.finish()?;
        Ok(cursor.into_inner())
    }

    /// 写出压缩包到目录
    pub fn write_to(&self, out_dir: &Path, archive_name: &str) -> ExportResult<PathBuf> {
        let bytes = self.to_zip_bytes()?;
        std::fs::create_dir_all(out_dir)?;
        let path = out_dir.join(archive_name);
        std::fs::write(&path, &bytes)?;

        info!(
            archive = %path.display(),
            entries = self.entries.len(),
            bytes = bytes.len(),
            "压缩包已写出"
        );
        Ok(path)
    }
}
