// ==========================================
// 订单模板批量生成工具 - 行合并
// ==========================================
// 职责: 按归一化组合键分组，数量求和并按组封顶，每组保留一行代表行
// 规则:
// - 代表行 = 组内按输入顺序的第一行；仅覆盖数量列（及订单标识列）
// - 上限作用于本阶段组内总和，而非单行
// - 多阶段依次执行，后一阶段累加前一阶段已封顶的值
// - 前置列缺失 → 跳过合并，原样透传并告警
// ==========================================

use crate::config::{ConsolidationProfile, ConsolidationStage};
use crate::domain::{CellValue, ConsolidationReport, SourceRow, SourceTable, StageReport};
use crate::engine::normalizer::{normalize_strict, slug};
use std::collections::HashMap;
use tracing::{debug, info, warn};

pub struct RowConsolidator {
    profile: ConsolidationProfile,
}

impl RowConsolidator {
    pub fn new(profile: ConsolidationProfile) -> Self {
        Self { profile }
    }

    pub fn profile(&self) -> &ConsolidationProfile {
        &self.profile
    }

    /// 整表合并（就地替换 rows）
    pub fn consolidate(&self, table: &mut SourceTable) -> ConsolidationReport {
        let mut report = ConsolidationReport {
            strategy: self.profile.mode.as_str().to_string(),
            ..Default::default()
        };

        if self.profile.is_noop() {
            return report;
        }

        let required = self.profile.required_columns();
        let missing = table.missing_columns(&required);
        if !missing.is_empty() {
            let reason = format!("缺少列: {}", missing.join(", "));
            warn!(strategy = %report.strategy, reason = %reason, "合并前置条件不满足，跳过合并");
            report.skipped = Some(reason);
            return report;
        }

        for stage in &self.profile.stages {
            if let Some(rule) = &stage.order_id {
                table.ensure_column(&rule.target_column);
            }
        }

        let mut rows = std::mem::take(&mut table.rows);
        for (idx, stage) in self.profile.stages.iter().enumerate() {
            let (next, stage_report) = run_stage(stage, &self.profile.quantity_column, rows);
            debug!(
                stage = idx + 1,
                groups = stage_report.groups,
                removed = stage_report.rows_removed,
                "合并阶段完成"
            );
            report.stages.push(stage_report);
            rows = next;
        }
        table.rows = rows;

        info!(
            strategy = %report.strategy,
            output_rows = table.rows.len(),
            rows_removed = report.rows_removed(),
            quantity_total = report.final_quantity().unwrap_or(0.0),
            "行合并完成"
        );
        report
    }
}

enum Slot {
    Group,
    Passthrough(SourceRow),
}

fn quantity_of(row: &SourceRow, column: &str) -> f64 {
    row.get(column).and_then(CellValue::as_f64).unwrap_or(0.0)
}

/// 执行单个合并阶段
pub fn run_stage(
    stage: &ConsolidationStage,
    quantity_column: &str,
    rows: Vec<SourceRow>,
) -> (Vec<SourceRow>, StageReport) {
    let input_rows = rows.len();
    let mut index: HashMap<Vec<String>, usize> = HashMap::new();
    let mut groups: Vec<(SourceRow, f64)> = Vec::new();
    let mut slots: Vec<Slot> = Vec::with_capacity(rows.len());

    for row in rows {
        let key: Vec<String> = stage
            .key_columns
            .iter()
            .map(|c| normalize_strict(&row.text(c)))
            .collect();

        let lead_blank = key.first().map(|k| k.is_empty()).unwrap_or(true);
        if stage.passthrough_blank_lead && lead_blank {
            slots.push(Slot::Passthrough(row));
            continue;
        }

        let qty = quantity_of(&row, quantity_column);
        match index.get(&key) {
            Some(&g) => groups[g].1 += qty,
            None => {
                index.insert(key, groups.len());
                slots.push(Slot::Group);
                groups.push((row, qty));
            }
        }
    }

    let group_count = groups.len();
    let mut passthrough_rows = 0;
    let mut quantity_total = 0.0;
    let mut output = Vec::with_capacity(slots.len());
    // Slot::Group 出现顺序与 groups 下标顺序一致
    let mut group_iter = groups.into_iter();

    for slot in slots {
        match slot {
            Slot::Group => {
                let Some((mut rep, sum)) = group_iter.next() else {
                    continue;
                };
                let total = match stage.cap {
                    Some(cap) => sum.min(cap),
                    None => sum,
                };
                rep.set(quantity_column, CellValue::from_f64(total));
                if let Some(rule) = &stage.order_id {
                    let id = rule
                        .parts
                        .iter()
                        .map(|p| slug(&rep.text(p)))
                        .collect::<Vec<_>>()
                        .join("-");
                    rep.set(rule.target_column.clone(), CellValue::Text(id));
                }
                quantity_total += total;
                output.push(rep);
            }
            Slot::Passthrough(row) => {
                quantity_total += quantity_of(&row, quantity_column);
                passthrough_rows += 1;
                output.push(row);
            }
        }
    }

    let report = StageReport {
        key_columns: stage.key_columns.clone(),
        cap: stage.cap,
        input_rows,
        groups: group_count,
        passthrough_rows,
        output_rows: output.len(),
        rows_removed: input_rows - output.len(),
        quantity_total,
    };
    (output, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConsolidationColumns, ConsolidationMode};

    const BRAND: &str = "Brand Slug";
    const STORE: &str = "Store Slug";
    const COMPANY: &str = "Nombre de la empresa";
    const QTY: &str = "Número de tiendas";
    const ORDER_ID: &str = "ID de orden";

    fn consolidator(mode: ConsolidationMode) -> RowConsolidator {
        let cols = ConsolidationColumns {
            brand: BRAND,
            company: COMPANY,
            store: STORE,
            quantity: QTY,
            order_id: ORDER_ID,
        };
        RowConsolidator::new(ConsolidationProfile::for_mode(mode, &cols, 4.0))
    }

    fn row(n: usize, brand: &str, store: &str, company: &str, qty: i64, extra: &str) -> SourceRow {
        SourceRow::from_pairs(
            n,
            [
                (BRAND, CellValue::from(brand)),
                (STORE, CellValue::from(store)),
                (COMPANY, CellValue::from(company)),
                (QTY, CellValue::Int(qty)),
                ("Nota", CellValue::from(extra)),
            ],
        )
    }

    fn table(rows: Vec<SourceRow>) -> SourceTable {
        SourceTable::new(
            vec![BRAND.into(), STORE.into(), COMPANY.into(), QTY.into(), "Nota".into()],
            rows,
        )
    }

    #[test]
    fn test_brand_company_caps_and_keeps_first_row() {
        let mut t = table(vec![
            row(1, "Acme", "s1", "Café Sol", 3, "primero"),
            row(2, " ACME ", "s2", "cafe  sol", 5, "segundo"),
            row(3, "Other", "s1", "X", 2, "otro"),
        ]);
        let report = consolidator(ConsolidationMode::BrandCompany).consolidate(&mut t);

        assert_eq!(t.rows.len(), 2);
        let first = &t.rows[0];
        assert_eq!(first.row_number, 1);
        assert_eq!(first.get(QTY), Some(&CellValue::Int(4)));
        assert_eq!(first.text("Nota"), "primero");
        assert_eq!(first.text(ORDER_ID), "acme-cafesol");
        assert_eq!(t.rows[1].get(QTY), Some(&CellValue::Int(2)));
        assert!(t.has_column(ORDER_ID));

        assert_eq!(report.stages.len(), 1);
        assert_eq!(report.stages[0].groups, 2);
        assert_eq!(report.stages[0].rows_removed, 1);
        assert_eq!(report.final_quantity(), Some(6.0));
    }

    #[test]
    fn test_cap_never_exceeded() {
        let rows = (1..=20)
            .map(|i| row(i, "Acme", "s", "Co", 7, ""))
            .collect();
        let mut t = table(rows);
        consolidator(ConsolidationMode::BrandCompany).consolidate(&mut t);
        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].get(QTY), Some(&CellValue::Int(4)));
    }

    #[test]
    fn test_two_stage_caps_per_store_then_sums() {
        let mut t = table(vec![
            row(1, "Acme", "A", "Co", 3, ""),
            row(2, "Acme", "A", "Co", 3, ""), // 店 A = 6 → 4
            row(3, "Acme", "B", "Co", 2, ""),
            row(4, "Acme", "B", "Co", 3, ""), // 店 B = 5 → 4
        ]);
        let report = consolidator(ConsolidationMode::BrandTwoStage).consolidate(&mut t);

        assert_eq!(t.rows.len(), 1);
        assert_eq!(t.rows[0].get(QTY), Some(&CellValue::Int(8)));
        assert_eq!(t.rows[0].row_number, 1);
        assert_eq!(report.stages.len(), 2);
        assert_eq!(report.stages[0].groups, 2);
        assert_eq!(report.stages[0].rows_removed, 2);
        assert_eq!(report.stages[0].quantity_total, 8.0);
        assert_eq!(report.stages[1].groups, 1);
        assert_eq!(report.stages[1].rows_removed, 1);
    }

    #[test]
    fn test_two_stage_passthrough_blank_brand() {
        let mut t = table(vec![
            row(1, "", "A", "Co", 9, "sin marca"),
            row(2, "Acme", "A", "Co", 1, ""),
            row(3, "  ", "B", "Co", 9, "sin marca 2"),
            row(4, "acme", "B", "Co", 1, ""),
        ]);
        let report = consolidator(ConsolidationMode::BrandTwoStage).consolidate(&mut t);

        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.rows[0].row_number, 1);
        assert_eq!(t.rows[0].get(QTY), Some(&CellValue::Int(9)));
        assert_eq!(t.rows[1].row_number, 2);
        assert_eq!(t.rows[1].get(QTY), Some(&CellValue::Int(2)));
        assert_eq!(t.rows[2].row_number, 3);
        assert_eq!(report.stages[0].passthrough_rows, 2);
        assert_eq!(report.stages[1].passthrough_rows, 2);
    }

    #[test]
    fn test_missing_column_skips() {
        let mut t = SourceTable::new(
            vec![BRAND.into(), QTY.into()],
            vec![SourceRow::from_pairs(1, [(BRAND, "a")]), SourceRow::from_pairs(2, [(BRAND, "a")])],
        );
        let report = consolidator(ConsolidationMode::BrandCompany).consolidate(&mut t);
        assert_eq!(t.rows.len(), 2);
        assert!(report.skipped.is_some());
        assert!(report.stages.is_empty());
    }

    #[test]
    fn test_non_numeric_quantity_counts_as_zero() {
        let mut t = table(vec![row(1, "Acme", "A", "Co", 2, "")]);
        t.rows.push(SourceRow::from_pairs(
            2,
            [(BRAND, "Acme"), (STORE, "A"), (COMPANY, "Co"), (QTY, "n/a")],
        ));
        consolidator(ConsolidationMode::BrandCompany).consolidate(&mut t);
        assert_eq!(t.rows[0].get(QTY), Some(&CellValue::Int(2)));
    }

    #[test]
    fn test_none_mode_is_noop() {
        let mut t = table(vec![row(1, "Acme", "A", "Co", 9, ""), row(2, "Acme", "A", "Co", 9, "")]);
        let report = consolidator(ConsolidationMode::None).consolidate(&mut t);
        assert_eq!(t.rows.len(), 2);
        assert!(report.stages.is_empty());
        assert_eq!(report.strategy, "none");
    }
}
