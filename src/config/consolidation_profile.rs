use serde::{Deserialize, Serialize};

/// 合并策略（预设入口）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidationMode {
    /// 不合并
    #[default]
    None,
    /// 按 (品牌, 公司) 合并，数量封顶，重算订单标识
    BrandCompany,
    /// 先按 (品牌, 门店) 合并封顶，再按品牌求和（不再封顶）
    BrandTwoStage,
}

impl ConsolidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsolidationMode::None => "none",
            ConsolidationMode::BrandCompany => "brand_company",
            ConsolidationMode::BrandTwoStage => "brand_two_stage",
        }
    }
}

impl std::fmt::Display for ConsolidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ConsolidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "off" => Ok(ConsolidationMode::None),
            "brand_company" | "brand-company" => Ok(ConsolidationMode::BrandCompany),
            "brand_two_stage" | "brand-two-stage" | "brand" => Ok(ConsolidationMode::BrandTwoStage),
            other => Err(format!("未知合并策略: {}", other)),
        }
    }
}

/// 订单标识重算规则：slug(part1) + "-" + slug(part2) ...
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderIdRule {
    pub target_column: String,
    pub parts: Vec<String>,
}

/// 单个合并阶段
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidationStage {
    /// 分组键列（比较前做严格归一化）
    pub key_columns: Vec<String>,
    /// 组内数量求和后的上限
    pub cap: Option<f64>,
    /// 首个键列为空的行不参与分组，原样透传
    pub passthrough_blank_lead: bool,
    pub order_id: Option<OrderIdRule>,
}

/// 合并配置（分组键选择 + 上限 + 阶段数）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsolidationProfile {
    pub mode: ConsolidationMode,
    pub quantity_column: String,
    pub stages: Vec<ConsolidationStage>,
}

/// 合并所需的源表列名
#[derive(Debug, Clone)]
pub struct ConsolidationColumns<'a> {
    pub brand: &'a str,
    pub company: &'a str,
    pub store: &'a str,
    pub quantity: &'a str,
    pub order_id: &'a str,
}

impl ConsolidationProfile {
    pub fn for_mode(mode: ConsolidationMode, cols: &ConsolidationColumns<'_>, cap: f64) -> Self {
        let stages = match mode {
            ConsolidationMode::None => Vec::new(),
            ConsolidationMode::BrandCompany => vec![ConsolidationStage {
                key_columns: vec![cols.brand.to_string(), cols.company.to_string()],
                cap: Some(cap),
                passthrough_blank_lead: false,
                order_id: Some(OrderIdRule {
                    target_column: cols.order_id.to_string(),
                    parts: vec![cols.brand.to_string(), cols.company.to_string()],
                }),
            }],
            ConsolidationMode::BrandTwoStage => vec![
                ConsolidationStage {
                    key_columns: vec![cols.brand.to_string(), cols.store.to_string()],
                    cap: Some(cap),
                    passthrough_blank_lead: true,
                    order_id: None,
                },
                ConsolidationStage {
                    key_columns: vec![cols.brand.to_string()],
                    cap: None,
                    passthrough_blank_lead: true,
                    order_id: None,
                },
            ],
        };

        Self {
            mode,
            quantity_column: cols.quantity.to_string(),
            stages,
        }
    }

    pub fn is_noop(&self) -> bool {
        self.stages.is_empty()
    }

    /// 执行前必须存在的源表列
    pub fn required_columns(&self) -> Vec<&str> {
        let mut cols: Vec<&str> = vec![self.quantity_column.as_str()];
        for stage in &self.stages {
            for c in &stage.key_columns {
                if !cols.contains(&c.as_str()) {
                    cols.push(c.as_str());
                }
            }
        }
        cols
    }
}
