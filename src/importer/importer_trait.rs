// ==========================================
// 订单模板批量生成工具 - 导入层 Trait
// ==========================================
// 职责: 定义导入管道各阶段接口（不包含实现）
// 管道: 源表解析 → 模板表头读取 → 数据清洗
// ==========================================

use crate::domain::{SourceRow, SourceTable, TemplateLayout};
use crate::importer::error::ImportResult;
use rand::RngCore;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 源表解析（阶段 0）
// 实现者: ExcelParser, CsvParser
pub trait FileParser: Send + Sync {
    /// 解析源文件为 SourceTable
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - sheet: 工作表名（None → 第一个工作表；CSV 忽略）
    ///
    /// # 返回
    /// - Ok(SourceTable): 首行为表头，其余为数据行（已跳过全空行）
    /// - Err: 文件不存在 / 格式不支持 / 工作表不存在 / 解析失败
    fn parse(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<SourceTable>;
}

// ==========================================
// TemplateReader Trait
// ==========================================
// 用途: 读取模板表头布局（阶段 1）
// 实现者: XlsxTemplateReader
pub trait TemplateReader: Send + Sync {
    /// # 参数
    /// - template_bytes: 模板文件原始字节
    /// - sheet: 工作表名（None → 第一个工作表）
    /// - header_row: 表头行号（1 起）
    fn read_layout(
        &self,
        template_bytes: &[u8],
        sheet: Option<&str>,
        header_row: u32,
    ) -> ImportResult<TemplateLayout>;
}

// ==========================================
// RowCleaner Trait
// ==========================================
// 用途: 单列清洗规则（阶段 2）
// 实现者: PhoneFiller, EmailFilter
pub trait RowCleaner: Send + Sync {
    /// 规则名（日志用）
    fn name(&self) -> &'static str;

    /// 作用的源表列
    fn column(&self) -> &str;

    /// 清洗一行；返回该行是否被修改（计数用）
    fn clean_row(&self, row: &mut SourceRow, rng: &mut dyn RngCore) -> bool;
}
