// ==========================================
// 订单模板批量生成工具 - 运行统计
// ==========================================
// 职责: 分块填充统计 / 清洗统计 / 合并统计 / 运行汇总
// 用途: 各阶段显式累加到 RunContext，最终生成 RunSummary
// ==========================================

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::ops::AddAssign;

// ==========================================
// ChunkStats - 单个分块的填充统计
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub rows: usize,                    // 写入的数据行数
    pub warehouse_written: usize,       // 写入仓库目标列的行数
    pub no_warehouse_destination: usize, // 模板无仓库目标列的行数
}

impl AddAssign for ChunkStats {
    fn add_assign(&mut self, rhs: Self) {
        self.rows += rhs.rows;
        self.warehouse_written += rhs.warehouse_written;
        self.no_warehouse_destination += rhs.no_warehouse_destination;
    }
}

// ==========================================
// CleaningReport - 清洗统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleaningReport {
    pub phone_filled: usize,  // 自动补全的电话数
    pub email_cleared: usize, // 被清空的邮箱数
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped_columns: Vec<String>, // 源表缺失而跳过的列
}

// ==========================================
// StageReport - 单阶段合并统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StageReport {
    pub key_columns: Vec<String>,
    pub cap: Option<f64>,
    pub input_rows: usize,
    pub groups: usize,           // 分组数
    pub passthrough_rows: usize, // 键为空而原样透传的行
    pub output_rows: usize,
    pub rows_removed: usize,
    pub quantity_total: f64, // 本阶段输出的数量合计（已封顶）
}

// ==========================================
// ConsolidationReport - 合并统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ConsolidationReport {
    pub strategy: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>, // 前置条件不满足时的原因
    pub stages: Vec<StageReport>,
}

impl ConsolidationReport {
    pub fn rows_removed(&self) -> usize {
        self.stages.iter().map(|s| s.rows_removed).sum()
    }

    /// 最终阶段的数量合计
    pub fn final_quantity(&self) -> Option<f64> {
        self.stages.last().map(|s| s.quantity_total)
    }
}

// ==========================================
// RunSummary - 运行汇总
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u128,
    pub source_rows: usize,
    pub rows_processed: usize,
    pub chunks: usize,
    pub chunk_files: Vec<String>,
    pub archive_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub archive_path: Option<String>,
    pub fill: ChunkStats,
    pub cleaning: CleaningReport,
    pub consolidation: ConsolidationReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_stats_add_assign() {
        let mut agg = ChunkStats::default();
        agg += ChunkStats {
            rows: 100,
            warehouse_written: 100,
            no_warehouse_destination: 0,
        };
        agg += ChunkStats {
            rows: 50,
            warehouse_written: 0,
            no_warehouse_destination: 50,
        };
        assert_eq!(agg.rows, 150);
        assert_eq!(agg.warehouse_written, 100);
        assert_eq!(agg.no_warehouse_destination, 50);
    }

    #[test]
    fn test_consolidation_report_totals() {
        let report = ConsolidationReport {
            strategy: "brand_two_stage".into(),
            skipped: None,
            stages: vec![
                StageReport {
                    rows_removed: 3,
                    quantity_total: 12.0,
                    ..Default::default()
                },
                StageReport {
                    rows_removed: 2,
                    quantity_total: 12.0,
                    ..Default::default()
                },
            ],
        };
        assert_eq!(report.rows_removed(), 5);
        assert_eq!(report.final_quantity(), Some(12.0));
    }
}
