// ==========================================
// 订单模板批量生成工具 - 模板表头读取
// ==========================================
// 阶段 1: 从模板字节读取指定表头行，生成 TemplateLayout
// 约定: 列位置从 A 列(1) 起连续编号，直到表格最右列
// ==========================================

use crate::domain::TemplateLayout;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::select_sheet;
use crate::importer::importer_trait::TemplateReader;
use calamine::{Reader, Xlsx};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;

pub struct XlsxTemplateReader;

impl TemplateReader for XlsxTemplateReader {
    fn read_layout(
        &self,
        template_bytes: &[u8],
        sheet: Option<&str>,
        header_row: u32,
    ) -> ImportResult<TemplateLayout> {
        let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(template_bytes))?;
        let sheet_names = workbook.sheet_names().to_vec();
        let sheet_name = select_sheet(&sheet_names, sheet, Path::new("<template>"))?;

        let range = workbook.worksheet_range(&sheet_name)?;
        let header_idx = header_row.saturating_sub(1);

        // get_value 使用绝对坐标（0 起）
        let last_col = range.end().map(|(_, c)| c + 1).unwrap_or(0);
        let mut headers: Vec<String> = (0..last_col)
            .map(|col| {
                range
                    .get_value((header_idx, col))
                    .map(|cell| cell.to_string().trim().to_string())
                    .unwrap_or_default()
            })
            .collect();

        // 去掉右侧空表头
        while headers.last().is_some_and(|h| h.is_empty()) {
            headers.pop();
        }

        if headers.is_empty() {
            return Err(ImportError::EmptyHeaderRow {
                sheet: sheet_name,
                row: header_row,
            });
        }

        debug!(sheet = %sheet_name, header_row, columns = headers.len(), "模板表头读取完成");
        Ok(TemplateLayout::new(sheet_name, header_row, headers))
    }
}
