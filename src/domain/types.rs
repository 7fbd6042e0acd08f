// ==========================================
// 订单模板批量生成工具 - 领域类型定义
// ==========================================
// 职责: 单元格标量值（源表读取 / 模板写回共用）
// ==========================================

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use std::fmt;

/// 日期单元格的默认数字格式
pub const DATE_FORMAT: &str = "yyyy-mm-dd";
/// 含时间部分的日期单元格格式
pub const DATETIME_FORMAT: &str = "yyyy-mm-dd hh:mm:ss";

// ==========================================
// 单元格值 (Cell Value)
// ==========================================
// 源表单元格类型不固定：文本 / 整数 / 小数 / 布尔 / 日期 / 空
// Empty 即 "null"：写回模板时清空单元格
// Date 保存 Excel 序列值（1900 日期系统），写回时带日期格式
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Date(f64),
}

impl CellValue {
    /// 由浮点数构造：整值落为 Int，否则 Float
    pub fn from_f64(value: f64) -> Self {
        if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
            CellValue::Int(value as i64)
        } else {
            CellValue::Float(value)
        }
    }

    /// 空值判定（Empty 或 仅含空白的文本）
    pub fn is_blank(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// 数值视图（文本按十进制解析，失败/空 → None）
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Float(f) | CellValue::Date(f) => Some(*f),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
            CellValue::Empty | CellValue::Bool(_) => None,
        }
    }

    /// 日期视图（仅 Date；序列值超出范围 → None）
    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(serial) => serial_to_datetime(*serial),
            _ => None,
        }
    }

    /// 文本视图（Empty → ""）
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Text(s) => write!(f, "{}", s),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Date(serial) => match serial_to_datetime(*serial) {
                Some(dt) if dt.time() == chrono::NaiveTime::MIN => {
                    write!(f, "{}", dt.format("%Y-%m-%d"))
                }
                Some(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
                None => write!(f, "{}", serial),
            },
        }
    }
}

/// Excel 序列值 → 日期时间（基准 1899-12-30）
fn serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    base.checked_add_signed(Duration::milliseconds(millis))
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Int(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_f64_whole_is_int() {
        assert_eq!(CellValue::from_f64(4.0), CellValue::Int(4));
        assert_eq!(CellValue::from_f64(3.5), CellValue::Float(3.5));
    }

    #[test]
    fn test_is_blank() {
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::from("   ").is_blank());
        assert!(!CellValue::Int(0).is_blank());
        assert!(!CellValue::from("x").is_blank());
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(CellValue::from(" 2 ").as_f64(), Some(2.0));
        assert_eq!(CellValue::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(CellValue::from("abc").as_f64(), None);
        assert_eq!(CellValue::Empty.as_f64(), None);
    }

    #[test]
    fn test_date_display() {
        assert_eq!(CellValue::Date(45580.0).to_string(), "2024-10-15");
        assert_eq!(CellValue::Date(45580.5).to_string(), "2024-10-15 12:00:00");
        assert_eq!(CellValue::Date(45580.0).as_f64(), Some(45580.0));
        assert!(!CellValue::Date(45580.0).is_blank());
        assert_eq!(CellValue::Int(45580).as_datetime(), None);
    }

    #[test]
    fn test_as_text() {
        assert_eq!(CellValue::Empty.as_text(), "");
        assert_eq!(CellValue::Int(3001234567).as_text(), "3001234567");
    }
}
