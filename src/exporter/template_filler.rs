// ==========================================
// 订单模板批量生成工具 - 模板填充
// ==========================================
// 职责: 一个分块的数据行写入一份全新的模板副本
// 规则:
// - 第 i 行（0 起）写入模板第 start_row + i 行
// - 映射目标表头存在于模板 → 写入（同名表头取最后一列）
// - 仓库标签写入首个存在的仓库目标列；都不存在 → 计数，不报错
// - Indicativo 多列: 保留优先列（否则首列）写固定值，其余列清空
// 红线: 每个分块都从原始字节重新解析模板，分块间不共享工作簿状态
// ==========================================

use crate::config::{BatchConfig, IndicativoConfig};
use crate::domain::{
    CellValue, ChunkStats, ColumnMapping, MappingRule, SourceRow, TemplateLayout, DATETIME_FORMAT,
    DATE_FORMAT,
};
use crate::engine::field_resolver::{resolve, FileStems};
use crate::engine::normalizer::normalize_strict;
use crate::engine::warehouse::WarehouseAssigner;
use crate::exporter::error::{ExportError, ExportResult};
use std::io::Cursor;
use tracing::debug;
use umya_spreadsheet::{Cell, Spreadsheet};

/// 单元格写入
fn write_cell(cell: &mut Cell, value: &CellValue) {
    match value {
        CellValue::Empty => {
            cell.set_blank();
        }
        CellValue::Text(s) => {
            cell.set_value_string(s.as_str());
        }
        CellValue::Int(i) => {
            cell.set_value_number(*i as f64);
        }
        CellValue::Float(f) => {
            cell.set_value_number(*f);
        }
        CellValue::Bool(b) => {
            cell.set_value_bool(*b);
        }
        CellValue::Date(serial) => {
            let format = if serial.fract() == 0.0 {
                DATE_FORMAT
            } else {
                DATETIME_FORMAT
            };
            cell.set_value_number(*serial);
            cell.get_style_mut()
                .get_number_format_mut()
                .set_format_code(format);
        }
    }
}

/// 从字节解析工作簿
pub fn read_workbook(template_bytes: &[u8]) -> ExportResult<Spreadsheet> {
    umya_spreadsheet::reader::xlsx::read_reader(Cursor::new(template_bytes), true)
        .map_err(|e| ExportError::WorkbookReadError(e.to_string()))
}

/// 工作簿编码为 xlsx 字节
pub fn write_workbook(book: &Spreadsheet) -> ExportResult<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    umya_spreadsheet::writer::xlsx::write_writer(book, &mut out)
        .map_err(|e| ExportError::WorkbookWriteError(e.to_string()))?;
    Ok(out.into_inner())
}

// ==========================================
// TemplateFiller
// ==========================================
pub struct TemplateFiller<'a> {
    assigner: &'a WarehouseAssigner,
    city_column: String,
    department_column: String,
    warehouse_destinations: Vec<String>,
    indicativo: Option<IndicativoConfig>,
}

/// 针对某一模板布局预先算好的列位置
struct ColumnPlan {
    mapped: Vec<(u32, usize)>, // (列, 映射下标)
    warehouse: Option<u32>,
    indicativo_keep: Option<u32>,
    indicativo_clear: Vec<u32>,
}

impl<'a> TemplateFiller<'a> {
    pub fn new(
        assigner: &'a WarehouseAssigner,
        city_column: impl Into<String>,
        department_column: impl Into<String>,
        warehouse_destinations: Vec<String>,
        indicativo: Option<IndicativoConfig>,
    ) -> Self {
        Self {
            assigner,
            city_column: city_column.into(),
            department_column: department_column.into(),
            warehouse_destinations,
            indicativo,
        }
    }

    pub fn from_config(assigner: &'a WarehouseAssigner, config: &BatchConfig) -> Self {
        let indicativo = config
            .indicativo
            .enabled
            .then(|| config.indicativo.clone());
        Self::new(
            assigner,
            config.columns.city.clone(),
            config.columns.department.clone(),
            config.warehouse_destinations.clone(),
            indicativo,
        )
    }

    fn plan(&self, layout: &TemplateLayout, rules: &[(&str, &MappingRule)]) -> ColumnPlan {
        let mapped = rules
            .iter()
            .enumerate()
            .filter_map(|(idx, (dest, _))| layout.column_of(dest).map(|col| (col, idx)))
            .collect();

        let warehouse = self
            .warehouse_destinations
            .iter()
            .find_map(|dest| layout.column_of(dest));

        let (indicativo_keep, indicativo_clear) = match &self.indicativo {
            Some(rule) => {
                let target = normalize_strict(&rule.header);
                let positions = layout.positions_where(|name| normalize_strict(name) == target);
                let keep = if positions.contains(&rule.preferred_column) {
                    Some(rule.preferred_column)
                } else {
                    positions.first().copied()
                };
                let clear = positions
                    .into_iter()
                    .filter(|p| Some(*p) != keep)
                    .collect();
                (keep, clear)
            }
            None => (None, Vec::new()),
        };

        ColumnPlan {
            mapped,
            warehouse,
            indicativo_keep,
            indicativo_clear,
        }
    }

    /// 填充一个分块
    ///
    /// # 返回
    /// - (输出 xlsx 字节, 分块统计)
    /// - Err: 模板工作表不存在 / 模板读写失败
    pub fn fill(
        &self,
        template_bytes: &[u8],
        layout: &TemplateLayout,
        start_row: u32,
        rows: &[SourceRow],
        mapping: &ColumnMapping,
        stems: &FileStems,
    ) -> ExportResult<(Vec<u8>, ChunkStats)> {
        let mut book = read_workbook(template_bytes)?;
        let sheet = book
            .get_sheet_by_name_mut(&layout.sheet_name)
            .ok_or_else(|| ExportError::TemplateSheetNotFound {
                sheet: layout.sheet_name.clone(),
            })?;

        let rules: Vec<_> = mapping.iter().collect();
        let plan = self.plan(layout, &rules);
        let indicativo_value = self.indicativo.as_ref().map(|r| r.value as f64);

        let mut stats = ChunkStats::default();
        for (offset, row) in rows.iter().enumerate() {
            let target_row = start_row + offset as u32;

            for &(col, idx) in &plan.mapped {
                let value = resolve(rules[idx].1, row, stems);
                write_cell(sheet.get_cell_mut((col, target_row)), &value);
            }

            match plan.warehouse {
                Some(col) => {
                    let label =
                        self.assigner
                            .assign_row(row, &self.city_column, &self.department_column);
                    sheet
                        .get_cell_mut((col, target_row))
                        .set_value_string(label.label.as_str());
                    stats.warehouse_written += 1;
                }
                None => stats.no_warehouse_destination += 1,
            }

            if let (Some(col), Some(value)) = (plan.indicativo_keep, indicativo_value) {
                sheet.get_cell_mut((col, target_row)).set_value_number(value);
                for &other in &plan.indicativo_clear {
                    sheet.get_cell_mut((other, target_row)).set_blank();
                }
            }

            stats.rows += 1;
        }

        let bytes = write_workbook(&book)?;
        debug!(
            sheet = %layout.sheet_name,
            rows = stats.rows,
            bytes = bytes.len(),
            "分块模板填充完成"
        );
        Ok((bytes, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WarehouseTables;

    fn template_bytes(sheet: &str, headers: &[&str]) -> Vec<u8> {
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let ws = book.new_sheet(sheet).unwrap();
        for (i, h) in headers.iter().enumerate() {
            ws.get_cell_mut((i as u32 + 1, 1)).set_value_string(*h);
        }
        ws.get_cell_mut((1, 2)).set_value_string("subencabezado");
        write_workbook(&book).unwrap()
    }

    fn assigner() -> WarehouseAssigner {
        WarehouseAssigner::new(WarehouseTables::builtin().unwrap())
    }

    fn filler(assigner: &WarehouseAssigner) -> TemplateFiller<'_> {
        TemplateFiller::from_config(assigner, &BatchConfig::default())
    }

    fn layout(sheet: &str, headers: &[&str]) -> TemplateLayout {
        TemplateLayout::new(sheet, 1, headers.iter().map(|h| h.to_string()).collect())
    }

    #[test]
    fn test_fill_writes_mapped_values_and_warehouse() {
        let headers = ["Plantilla", "Ciudad", "Cantidad", "Bodega", "País"];
        let bytes = template_bytes("Ordenes", &headers);
        let rows = vec![
            SourceRow::from_pairs(
                1,
                [
                    ("Ciudad", CellValue::from("Envigado")),
                    ("Número de tiendas", CellValue::Int(3)),
                ],
            ),
            SourceRow::from_pairs(2, [("Ciudad", "Soacha")]),
        ];

        let a = assigner();
        let (out, stats) = filler(&a)
            .fill(
                &bytes,
                &layout("Ordenes", &headers),
                3,
                &rows,
                &ColumnMapping::preset(),
                &FileStems::new("plantilla", "origen"),
            )
            .unwrap();

        assert_eq!(stats.rows, 2);
        assert_eq!(stats.warehouse_written, 2);
        assert_eq!(stats.no_warehouse_destination, 0);

        let book = read_workbook(&out).unwrap();
        let ws = book.get_sheet_by_name("Ordenes").unwrap();
        assert_eq!(ws.get_value((1, 1)), "Plantilla");
        assert_eq!(ws.get_value((1, 2)), "subencabezado");
        assert_eq!(ws.get_value((1, 3)), "plantilla");
        assert_eq!(ws.get_value((2, 3)), "Envigado");
        assert_eq!(ws.get_value((3, 3)), "3");
        assert_eq!(ws.get_value((4, 3)), "Medellín #2 - Sabaneta Mayorca");
        assert_eq!(ws.get_value((5, 3)), "Colombia");
        assert_eq!(ws.get_value((4, 4)), "Bogotá #2 - Montevideo");
        // 缺失源列降级为空
        assert_eq!(ws.get_value((3, 4)), "");
    }

    #[test]
    fn test_cedis_fallback_and_no_destination() {
        let a = assigner();
        let rows = vec![SourceRow::from_pairs(1, [("Ciudad", "Bello")])];

        let headers = ["Ciudad", "CEDIS de origen"];
        let bytes = template_bytes("Hoja", &headers);
        let (out, stats) = filler(&a)
            .fill(&bytes, &layout("Hoja", &headers), 3, &rows, &ColumnMapping::preset(), &FileStems::default())
            .unwrap();
        assert_eq!(stats.warehouse_written, 1);
        let book = read_workbook(&out).unwrap();
        let ws = book.get_sheet_by_name("Hoja").unwrap();
        assert_eq!(ws.get_value((2, 3)), "Medellín #2 - Sabaneta Mayorca");

        let headers = ["Ciudad"];
        let bytes = template_bytes("Hoja", &headers);
        let (_, stats) = filler(&a)
            .fill(&bytes, &layout("Hoja", &headers), 3, &rows, &ColumnMapping::preset(), &FileStems::default())
            .unwrap();
        assert_eq!(stats.warehouse_written, 0);
        assert_eq!(stats.no_warehouse_destination, 1);
    }

    #[test]
    fn test_indicativo_override() {
        let headers = ["Nombre", "Ciudad", "Indicativo", "Cantidad", "Región", "País", " indicativo "];
        let bytes = template_bytes("Ordenes", &headers);
        let mut mapping = ColumnMapping::preset();
        mapping.insert("Indicativo", MappingRule::source("Indicativo"));
        let rows: Vec<SourceRow> = (1..=3)
            .map(|i| SourceRow::from_pairs(i, [("Indicativo", CellValue::Int(99))]))
            .collect();

        let a = assigner();
        let (out, _) = filler(&a)
            .fill(&bytes, &layout("Ordenes", &headers), 3, &rows, &mapping, &FileStems::default())
            .unwrap();

        let book = read_workbook(&out).unwrap();
        let ws = book.get_sheet_by_name("Ordenes").unwrap();
        for r in 3..=5 {
            assert_eq!(ws.get_value((3, r)), "57");
            assert_eq!(ws.get_value((7, r)), "");
        }
    }

    #[test]
    fn test_indicativo_first_occurrence_when_preferred_absent() {
        let headers = ["Indicativo", "Ciudad", "Cantidad", "Indicativo"];
        let bytes = template_bytes("Ordenes", &headers);
        let rows = vec![SourceRow::new(1)];

        let a = assigner();
        let (out, _) = filler(&a)
            .fill(&bytes, &layout("Ordenes", &headers), 3, &rows, &ColumnMapping::preset(), &FileStems::default())
            .unwrap();

        let book = read_workbook(&out).unwrap();
        let ws = book.get_sheet_by_name("Ordenes").unwrap();
        assert_eq!(ws.get_value((1, 3)), "57");
        assert_eq!(ws.get_value((4, 3)), "");
    }

    #[test]
    fn test_missing_sheet() {
        let bytes = template_bytes("Ordenes", &["Ciudad"]);
        let a = assigner();
        let result = filler(&a).fill(
            &bytes,
            &layout("Otra", &["Ciudad"]),
            3,
            &[],
            &ColumnMapping::preset(),
            &FileStems::default(),
        );
        assert!(matches!(
            result,
            Err(ExportError::TemplateSheetNotFound { sheet }) if sheet == "Otra"
        ));
    }

    #[test]
    fn test_date_values_keep_date_format() {
        let headers = ["Fecha", "Referencia"];
        let bytes = template_bytes("Ordenes", &headers);
        let mut mapping = ColumnMapping::new();
        mapping.insert("Fecha", MappingRule::source("Fecha de pedido"));
        mapping.insert("Referencia", MappingRule::source("Referencia"));
        let rows = vec![SourceRow::from_pairs(
            1,
            [
                ("Fecha de pedido", CellValue::Date(45580.0)),
                ("Referencia", CellValue::from("007")),
            ],
        )];

        let a = assigner();
        let (out, _) = filler(&a)
            .fill(&bytes, &layout("Ordenes", &headers), 3, &rows, &mapping, &FileStems::default())
            .unwrap();

        let book = read_workbook(&out).unwrap();
        let ws = book.get_sheet_by_name("Ordenes").unwrap();
        let cell = ws.get_cell((1, 3)).unwrap();
        assert_eq!(cell.get_value(), "45580");
        let format = cell.get_style().get_number_format().unwrap();
        assert_eq!(format.get_format_code(), DATE_FORMAT);
        assert_eq!(ws.get_value((2, 3)), "007");
    }

    #[test]
    fn test_corrupt_template_bytes() {
        let a = assigner();
        let result = filler(&a).fill(
            b"no es un xlsx",
            &layout("Ordenes", &["Ciudad"]),
            3,
            &[SourceRow::new(1)],
            &ColumnMapping::preset(),
            &FileStems::default(),
        );
        assert!(matches!(result, Err(ExportError::WorkbookReadError(_))));
    }
}
