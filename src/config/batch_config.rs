// ==========================================
// 订单模板批量生成工具 - 批次配置项
// ==========================================
// 职责: 全部用户可调参数（TOML 反序列化，每项均有默认值）
// 覆写顺序: 内置默认 → 配置文件 → 环境变量 → 命令行
// ==========================================

use crate::config::consolidation_profile::{
    ConsolidationColumns, ConsolidationMode, ConsolidationProfile,
};
use crate::domain::mapping::is_reserved;
use crate::domain::{ColumnMapping, MappingRule, ORDER_REFERENCE_DESTINATION};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::warn;

// ==========================================
// BatchConfig - 批次配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// 每个输出文件的行数
    pub chunk_size: usize,
    /// 模板表头行（1 起）
    pub header_row: u32,
    /// 模板数据起始行（1 起）
    pub start_row: u32,
    /// 输出文件名前缀
    pub output_prefix: String,
    /// 汇总输出语言（zh-CN / es / en）
    pub locale: String,
    /// 外部仓库查表文件（None → 内置）
    pub warehouse_tables: Option<PathBuf>,
    /// 仓库目标列（按优先级）
    pub warehouse_destinations: Vec<String>,
    pub columns: SourceColumns,
    pub cleaning: CleaningConfig,
    pub consolidation: ConsolidationConfig,
    pub indicativo: IndicativoConfig,
    /// 目标表头 → 规则（覆盖预设；mode = "skip" 删除预设项）
    pub mapping: BTreeMap<String, MappingSetting>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            chunk_size: 100,
            header_row: 1,
            start_row: 3,
            output_prefix: "template_part".to_string(),
            locale: "zh-CN".to_string(),
            warehouse_tables: None,
            warehouse_destinations: vec!["Bodega".to_string(), "CEDIS de origen".to_string()],
            columns: SourceColumns::default(),
            cleaning: CleaningConfig::default(),
            consolidation: ConsolidationConfig::default(),
            indicativo: IndicativoConfig::default(),
            mapping: BTreeMap::new(),
        }
    }
}

/// 被业务规则解释的源表列名
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceColumns {
    pub city: String,
    pub department: String,
    pub phone: String,
    pub email: String,
    pub brand: String,
    pub store: String,
    pub company: String,
    pub quantity: String,
    /// 合并时重算的订单标识列（派生列）
    pub order_id: String,
}

impl Default for SourceColumns {
    fn default() -> Self {
        Self {
            city: "Ciudad".to_string(),
            department: "Departamento".to_string(),
            phone: "Celular".to_string(),
            email: "Correo electrónico".to_string(),
            brand: "Brand Slug".to_string(),
            store: "Store Slug".to_string(),
            company: "Nombre de la empresa".to_string(),
            quantity: "Número de tiendas".to_string(),
            order_id: "ID de orden".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    pub enabled: bool,
    pub phone_prefix: String,
    pub phone_length: usize,
    pub allowed_email_domains: Vec<String>,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            phone_prefix: "3".to_string(),
            phone_length: 10,
            allowed_email_domains: vec!["gmail.com".to_string(), "hotmail.com".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsolidationConfig {
    pub mode: ConsolidationMode,
    pub cap: f64,
}

impl Default for ConsolidationConfig {
    fn default() -> Self {
        Self {
            mode: ConsolidationMode::None,
            cap: 4.0,
        }
    }
}

/// 重复 "Indicativo" 表头规则
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicativoConfig {
    pub enabled: bool,
    pub header: String,
    pub value: i64,
    /// 优先保留的列位置（1 起）
    pub preferred_column: u32,
}

impl Default for IndicativoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            header: "Indicativo".to_string(),
            value: 57,
            preferred_column: 3,
        }
    }
}

// ==========================================
// MappingSetting - 配置文件中的映射项
// ==========================================
// 例:
//   [mapping."Cantidad"]
//   mode = "source"
//   column = "Número de tiendas"
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MappingSetting {
    Source {
        column: String,
    },
    Constant {
        #[serde(deserialize_with = "literal")]
        value: String,
    },
    TemplateName,
    SourceName,
    Skip,
}

impl MappingSetting {
    fn into_rule(self) -> Option<MappingRule> {
        match self {
            MappingSetting::Source { column } => Some(MappingRule::source(column)),
            MappingSetting::Constant { value } => Some(MappingRule::constant(value)),
            MappingSetting::TemplateName => Some(MappingRule::TemplateFilenameStem),
            MappingSetting::SourceName => Some(MappingRule::SourceFilenameStem),
            MappingSetting::Skip => None,
        }
    }
}

/// 固定值允许写成 TOML 字符串/数值/布尔，统一存为文本
fn literal<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Literal {
        Text(String),
        Int(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Literal::deserialize(deserializer)? {
        Literal::Text(s) => s,
        Literal::Int(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::Bool(b) => b.to_string(),
    })
}

impl BatchConfig {
    /// 生效的列映射：预设 + 配置覆盖；仓库目标列不接受映射
    ///
    /// 合并策略会生成订单标识时，订单号列默认改读订单标识列（配置显式映射优先）
    pub fn column_mapping(&self) -> ColumnMapping {
        let mut mapping = ColumnMapping::preset();
        let profile = self.consolidation_profile();
        if let Some(rule) = profile.stages.iter().find_map(|s| s.order_id.as_ref()) {
            mapping.insert(
                ORDER_REFERENCE_DESTINATION,
                MappingRule::source(rule.target_column.clone()),
            );
        }
        for (destination, setting) in &self.mapping {
            let destination = destination.trim();
            if is_reserved(destination) || self.warehouse_destinations.iter().any(|d| d == destination) {
                warn!(destination, "仓库目标列由分配规则计算，忽略该映射");
                continue;
            }
            match setting.clone().into_rule() {
                Some(rule) => {
                    mapping.insert(destination, rule);
                }
                None => {
                    mapping.remove(destination);
                }
            }
        }
        mapping
    }

    pub fn consolidation_profile(&self) -> ConsolidationProfile {
        let cols = ConsolidationColumns {
            brand: &self.columns.brand,
            company: &self.columns.company,
            store: &self.columns.store,
            quantity: &self.columns.quantity,
            order_id: &self.columns.order_id,
        };
        ConsolidationProfile::for_mode(self.consolidation.mode, &cols, self.consolidation.cap)
    }
}
