// ==========================================
// 订单模板批量生成工具 - 仓库分配查表数据
// ==========================================
// 职责: 城市/省份/关键字 → hub 查表数据的加载与校验
// 红线: 只存数据，不含匹配流程（匹配流程见 engine::warehouse）
// 存储: TOML（内置一份，运维可整体替换）
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::domain::WarehouseLabel;
use crate::engine::normalizer::normalize_strict;
use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

/// 内置查表数据
pub const BUILTIN_TABLES_TOML: &str = include_str!("../../config/warehouse_tables.toml");

// ===== TOML 文件结构 =====

#[derive(Debug, Deserialize)]
struct TablesFile {
    default_hub: String,
    hubs: Vec<HubSpec>,
}

#[derive(Debug, Deserialize)]
struct HubSpec {
    id: String,
    label: String,
    #[serde(default)]
    reference_city: String,
    #[serde(default)]
    cities: Vec<String>,
    #[serde(default)]
    departments: Vec<String>,
    #[serde(default)]
    keywords: Vec<String>,
}

// ==========================================
// WarehouseTables - 已归一化的查表数据
// ==========================================
#[derive(Debug, Clone)]
pub struct WarehouseTables {
    hubs: Vec<WarehouseLabel>,
    default_hub: usize,
    cities: HashMap<String, usize>,
    departments: HashMap<String, usize>,
    keywords: Vec<(usize, Vec<String>)>, // 按 hub 优先级排列
}

impl WarehouseTables {
    /// 加载内置查表数据
    pub fn builtin() -> ConfigResult<Self> {
        Self::from_toml_str(BUILTIN_TABLES_TOML, "<builtin>")
    }

    /// 从外部 TOML 文件加载
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw, &path.display().to_string())
    }

    pub fn from_toml_str(raw: &str, origin: &str) -> ConfigResult<Self> {
        let file: TablesFile = toml::from_str(raw).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            message: e.to_string(),
        })?;
        Self::build(file)
    }

    fn build(file: TablesFile) -> ConfigResult<Self> {
        if file.hubs.is_empty() {
            return Err(ConfigError::InvalidTables("至少需要一个 hub".to_string()));
        }

        let mut seen_ids = HashSet::new();
        let mut hubs = Vec::with_capacity(file.hubs.len());
        let mut cities = HashMap::new();
        let mut departments = HashMap::new();
        let mut keywords = Vec::new();

        for (idx, spec) in file.hubs.into_iter().enumerate() {
            let id = spec.id.trim().to_string();
            if id.is_empty() {
                return Err(ConfigError::InvalidTables(format!("第 {} 个 hub 缺少 id", idx + 1)));
            }
            if !seen_ids.insert(id.clone()) {
                return Err(ConfigError::InvalidTables(format!("hub id 重复: {}", id)));
            }

            // 同一键出现在多个 hub 时先出现者生效
            for city in &spec.cities {
                let key = normalize_strict(city);
                if !key.is_empty() {
                    cities.entry(key).or_insert(idx);
                }
            }
            for dept in &spec.departments {
                let key = normalize_strict(dept);
                if !key.is_empty() {
                    departments.entry(key).or_insert(idx);
                }
            }

            let mut hub_keywords = Vec::new();
            for kw in &spec.keywords {
                let key = normalize_strict(kw);
                if key.is_empty() {
                    return Err(ConfigError::InvalidTables(format!(
                        "hub {} 含空关键字（会匹配任意文本）",
                        id
                    )));
                }
                if !hub_keywords.contains(&key) {
                    hub_keywords.push(key);
                }
            }
            if !hub_keywords.is_empty() {
                keywords.push((idx, hub_keywords));
            }

            hubs.push(WarehouseLabel {
                hub: id,
                label: spec.label,
                reference_city: spec.reference_city,
            });
        }

        let default_id = file.default_hub.trim();
        let default_hub = hubs
            .iter()
            .position(|h| h.hub == default_id)
            .ok_or_else(|| {
                ConfigError::InvalidTables(format!("default_hub 不存在: {}", default_id))
            })?;

        Ok(Self {
            hubs,
            default_hub,
            cities,
            departments,
            keywords,
        })
    }

    pub fn hubs(&self) -> &[WarehouseLabel] {
        &self.hubs
    }

    pub fn hub(&self, id: &str) -> Option<&WarehouseLabel> {
        self.hubs.iter().find(|h| h.hub == id)
    }

    pub fn default_label(&self) -> &WarehouseLabel {
        &self.hubs[self.default_hub]
    }

    /// 城市精确匹配（入参须已归一化）
    pub fn city(&self, normalized: &str) -> Option<&WarehouseLabel> {
        self.cities.get(normalized).map(|&i| &self.hubs[i])
    }

    /// 省份精确匹配（入参须已归一化）
    pub fn department(&self, normalized: &str) -> Option<&WarehouseLabel> {
        self.departments.get(normalized).map(|&i| &self.hubs[i])
    }

    /// 关键字表（按 hub 优先级）
    pub fn keyword_groups(&self) -> impl Iterator<Item = (&WarehouseLabel, &[String])> {
        self.keywords
            .iter()
            .map(|(i, kws)| (&self.hubs[*i], kws.as_slice()))
    }

    /// 全部城市条目（归一化键 → hub id）
    pub fn city_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cities
            .iter()
            .map(|(k, &i)| (k.as_str(), self.hubs[i].hub.as_str()))
    }

    pub fn city_count(&self) -> usize {
        self.cities.len()
    }

    pub fn department_count(&self) -> usize {
        self.departments.len()
    }

    pub fn keyword_count(&self) -> usize {
        self.keywords.iter().map(|(_, k)| k.len()).sum()
    }
}
