// ==========================================
// 订单模板批量生成工具 - 源表解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xlsm/.xls/.xlsb/.ods) / CSV (.csv)
// 约定: 首行为表头（TRIM），全空行跳过，空表头列忽略
// ==========================================

use crate::domain::{CellValue, SourceRow, SourceTable};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, Reader};
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;
use tracing::debug;

const EXCEL_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// calamine 单元格 → CellValue
pub fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Int(*i),
        Data::Float(f) => CellValue::from_f64(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) if dt.is_duration() => CellValue::from_f64(dt.as_f64()),
        Data::DateTime(dt) => CellValue::Date(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
    }
}

/// CSV 文本 → CellValue（原样保留为文本，"007" 不会变成 7）
pub fn cell_from_text(raw: &str) -> CellValue {
    if raw.trim().is_empty() {
        return CellValue::Empty;
    }
    CellValue::Text(raw.to_string())
}

/// 按表头与单元格序列组装行
fn build_row<I>(row_number: usize, headers: &[String], cells: I) -> SourceRow
where
    I: IntoIterator<Item = CellValue>,
{
    let mut row = SourceRow::new(row_number);
    for (header, value) in headers.iter().zip(cells) {
        if header.is_empty() {
            continue;
        }
        row.set(header.clone(), value);
    }
    row
}

fn build_columns(headers: &[String]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::with_capacity(headers.len());
    for h in headers {
        if !h.is_empty() && !columns.contains(h) {
            columns.push(h.clone());
        }
    }
    columns
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse(&self, file_path: &Path, _sheet: Option<&str>) -> ImportResult<SourceTable> {
        let path = file_path;
        ensure_exists(path)?;

        let ext = extension_of(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let row = build_row(idx + 1, &headers, record.iter().map(cell_from_text));

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        debug!(file = %path.display(), rows = rows.len(), "CSV 解析完成");
        Ok(SourceTable::new(build_columns(&headers), rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse(&self, file_path: &Path, sheet: Option<&str>) -> ImportResult<SourceTable> {
        let path = file_path;
        ensure_exists(path)?;

        let ext = extension_of(path);
        if !EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;
        let sheet_names = workbook.sheet_names().to_vec();
        let sheet_name = select_sheet(&sheet_names, sheet, path)?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 表头（第一行）
        let mut data_rows = range.rows();
        let headers: Vec<String> = match data_rows.next() {
            Some(header_row) => header_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect(),
            None => return Ok(SourceTable::default()),
        };

        let mut rows = Vec::new();
        for (idx, data_row) in data_rows.enumerate() {
            let row = build_row(idx + 1, &headers, data_row.iter().map(cell_from_data));

            // 跳过完全空白的行
            if row.is_blank() {
                continue;
            }
            rows.push(row);
        }

        debug!(
            file = %path.display(),
            sheet = %sheet_name,
            rows = rows.len(),
            "Excel 解析完成"
        );
        Ok(SourceTable::new(build_columns(&headers), rows))
    }
}

/// 选择工作表：指定名称必须存在；未指定取第一个
pub fn select_sheet(
    sheet_names: &[String],
    requested: Option<&str>,
    origin: &Path,
) -> ImportResult<String> {
    match requested {
        Some(name) => {
            if sheet_names.iter().any(|s| s == name) {
                Ok(name.to_string())
            } else {
                Err(ImportError::SheetNotFound {
                    sheet: name.to_string(),
                    available: sheet_names.join(", "),
                })
            }
        }
        None => sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::EmptyWorkbook(origin.display().to_string())),
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(
        &self,
        file_path: P,
        sheet: Option<&str>,
    ) -> ImportResult<SourceTable> {
        let path = file_path.as_ref();
        let ext = extension_of(path);

        if ext == "csv" {
            CsvParser.parse(path, sheet)
        } else if EXCEL_EXTENSIONS.contains(&ext.as_str()) {
            ExcelParser.parse(path, sheet)
        } else {
            ensure_exists(path)?;
            Err(ImportError::UnsupportedFormat(ext))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(content: &str) -> tempfile::NamedTempFile {
        let mut f = Builder::new().suffix(".csv").tempfile().unwrap();
        write!(f, "{}", content).unwrap();
        f
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let f = csv_file(
            " Ciudad ,Departamento,Número de tiendas,Celular\n\
             Bello,Antioquia,3,\n\
             ,,,\n\
             Bogotá,Cundinamarca,2.5,3001234567\n",
        );

        let table = CsvParser.parse(f.path(), None).unwrap();
        assert_eq!(
            table.columns,
            vec!["Ciudad", "Departamento", "Número de tiendas", "Celular"]
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].row_number, 1);
        assert_eq!(table.rows[0].text("Ciudad"), "Bello");
        assert_eq!(table.rows[0].get("Número de tiendas"), Some(&CellValue::from("3")));
        assert_eq!(table.rows[0].get("Número de tiendas").and_then(CellValue::as_f64), Some(3.0));
        assert!(table.rows[0].get("Celular").unwrap().is_blank());
        assert_eq!(table.rows[1].row_number, 3);
        assert_eq!(
            table.rows[1].get("Número de tiendas"),
            Some(&CellValue::from("2.5"))
        );
        assert_eq!(table.rows[1].text("Celular"), "3001234567");
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse(Path::new("/no/such/file.csv"), None);
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let f = Builder::new().suffix(".txt").tempfile().unwrap();
        let result = UniversalFileParser.parse(f.path(), None);
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_select_sheet() {
        let names = vec!["Hoja1".to_string(), "Pedidos".to_string()];
        let origin = Path::new("x.xlsx");
        assert_eq!(select_sheet(&names, None, origin).unwrap(), "Hoja1");
        assert_eq!(select_sheet(&names, Some("Pedidos"), origin).unwrap(), "Pedidos");
        assert!(matches!(
            select_sheet(&names, Some("Otra"), origin),
            Err(ImportError::SheetNotFound { .. })
        ));
        assert!(matches!(
            select_sheet(&[], None, origin),
            Err(ImportError::EmptyWorkbook(_))
        ));
    }

    #[test]
    fn test_cell_conversions() {
        assert_eq!(cell_from_data(&Data::Float(3.0)), CellValue::Int(3));
        assert_eq!(cell_from_data(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_from_text("  "), CellValue::Empty);
        assert_eq!(cell_from_text("abc"), CellValue::from("abc"));
        assert_eq!(cell_from_text("nan"), CellValue::from("nan"));
    }

    #[test]
    fn test_csv_keeps_leading_zeros() {
        assert_eq!(cell_from_text("007"), CellValue::from("007"));
        assert_eq!(cell_from_text("0300123"), CellValue::from("0300123"));

        let f = csv_file("Referencia,Número de tiendas\n007,2\n");
        let table = CsvParser.parse(f.path(), None).unwrap();
        assert_eq!(table.rows[0].text("Referencia"), "007");
        assert_eq!(table.rows[0].get("Número de tiendas").and_then(CellValue::as_f64), Some(2.0));
    }

    #[test]
    fn test_excel_date_cell_becomes_date() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fechas.xlsx");
        let mut book = umya_spreadsheet::new_file_empty_worksheet();
        let ws = book.new_sheet("Pedidos").unwrap();
        ws.get_cell_mut((1, 1)).set_value_string("Fecha");
        let cell = ws.get_cell_mut((1, 2));
        cell.set_value_number(45580.0);
        cell.get_style_mut()
            .get_number_format_mut()
            .set_format_code("yyyy-mm-dd");
        umya_spreadsheet::writer::xlsx::write(&book, &path).unwrap();

        let table = ExcelParser.parse(&path, None).unwrap();
        assert_eq!(table.rows[0].get("Fecha"), Some(&CellValue::Date(45580.0)));
        assert_eq!(table.rows[0].text("Fecha"), "2024-10-15");
    }
}
