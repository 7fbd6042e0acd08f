// ==========================================
// 订单模板批量生成工具 - 列映射模型
// ==========================================
// 职责: 目标表头 → 取值规则
// 红线: Bodega / CEDIS de origen 由仓库分配规则计算，不接受人工映射
// ==========================================

use serde::Serialize;
use std::collections::BTreeMap;

/// 仓库目标列（按优先级）
pub const RESERVED_DESTINATIONS: [&str; 2] = ["Bodega", "CEDIS de origen"];

/// 订单号目标列；合并策略生成订单标识时默认改读该标识
pub const ORDER_REFERENCE_DESTINATION: &str = "Número de orden externo";

// ==========================================
// 取值规则 (Mapping Rule)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MappingRule {
    /// 复制源表某列
    CopySource { column: String },
    /// 固定值（写入时尝试转为数值）
    Constant { value: String },
    /// 模板文件名（不含扩展名）
    TemplateFilenameStem,
    /// 源文件名（不含扩展名）
    SourceFilenameStem,
}

impl MappingRule {
    pub fn source(column: impl Into<String>) -> Self {
        MappingRule::CopySource {
            column: column.into(),
        }
    }

    pub fn constant(value: impl Into<String>) -> Self {
        MappingRule::Constant {
            value: value.into(),
        }
    }
}

// ==========================================
// ColumnMapping - 目标表头 → 规则
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    rules: BTreeMap<String, MappingRule>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// 出厂预设映射
    pub fn preset() -> Self {
        let mut m = Self::new();
        m.insert("Plantilla", MappingRule::TemplateFilenameStem);
        m.insert(
            ORDER_REFERENCE_DESTINATION,
            MappingRule::source("Nombre de la empresa"),
        );
        m.insert(
            "Nombre completo del comprador",
            MappingRule::source("Nombre completo"),
        );
        m.insert("Teléfono de contacto", MappingRule::source("Celular"));
        m.insert(
            "Correo electrónico",
            MappingRule::source("Correo electrónico"),
        );
        m.insert("Tipo de empacado", MappingRule::constant("Estandar"));
        m.insert("Igual al comprador", MappingRule::constant("SI"));
        m.insert("Dirección", MappingRule::source("Dirección"));
        // Ciudad 原样保留源值
        m.insert("Ciudad", MappingRule::source("Ciudad"));
        m.insert("Región", MappingRule::source("Departamento"));
        m.insert("País", MappingRule::constant("Colombia"));
        m.insert(
            "Método de envío",
            MappingRule::constant("Estándar (Local y Nacional)"),
        );
        m.insert("Tipo de recaudo", MappingRule::constant("NO APLICA"));
        m.insert(
            "SKU o Código Melonn del producto",
            MappingRule::source("Referencia"),
        );
        m.insert("Cantidad", MappingRule::source("Número de tiendas"));
        m
    }

    /// 写入规则；保留目标列被拒绝，返回 false
    pub fn insert(&mut self, destination: impl Into<String>, rule: MappingRule) -> bool {
        let destination = destination.into();
        if is_reserved(&destination) {
            return false;
        }
        self.rules.insert(destination, rule);
        true
    }

    pub fn remove(&mut self, destination: &str) -> Option<MappingRule> {
        self.rules.remove(destination)
    }

    pub fn get(&self, destination: &str) -> Option<&MappingRule> {
        self.rules.get(destination)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MappingRule)> {
        self.rules.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// 是否为仓库保留目标列
pub fn is_reserved(destination: &str) -> bool {
    RESERVED_DESTINATIONS.contains(&destination.trim())
}
