// ==========================================
// 订单模板批量生成工具 - 分块规划
// ==========================================
// 职责: 行总数 N + 块大小 C → ceil(N/C) 个连续区间
// 约定: 第 k 块覆盖 [k*C, min((k+1)*C, N))；文件序号 1 起、两位补零
// ==========================================

use std::ops::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    /// 1 起的块序号
    pub index: usize,
    pub rows: Range<usize>,
}

impl ChunkPlan {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 输出文件名：{prefix}{index:02}.xlsx
    pub fn file_name(&self, prefix: &str) -> String {
        chunk_file_name(prefix, self.index)
    }
}

pub fn chunk_file_name(prefix: &str, index: usize) -> String {
    format!("{}{:02}.xlsx", prefix, index)
}

/// 压缩包名：{prefix}_lotes.zip
pub fn archive_name(prefix: &str) -> String {
    format!("{}_lotes.zip", prefix)
}

pub fn chunk_count(total: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        return 0;
    }
    total.div_ceil(chunk_size)
}

/// 规划分块（chunk_size 为 0 时返回空）
pub fn plan_chunks(total: usize, chunk_size: usize) -> Vec<ChunkPlan> {
    (0..chunk_count(total, chunk_size))
        .map(|k| ChunkPlan {
            index: k + 1,
            rows: k * chunk_size..((k + 1) * chunk_size).min(total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_250_rows_by_100() {
        let plan = plan_chunks(250, 100);
        let sizes: Vec<usize> = plan.iter().map(ChunkPlan::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
        assert_eq!(plan[2].rows, 200..250);
        assert_eq!(plan[0].file_name("template_part"), "template_part01.xlsx");
        assert_eq!(plan[2].file_name("template_part"), "template_part03.xlsx");
    }

    #[test]
    fn test_partition_has_no_gaps_or_overlaps() {
        for total in [0usize, 1, 7, 99, 100, 101, 1000] {
            for size in [1usize, 3, 10, 100] {
                let plan = plan_chunks(total, size);
                assert_eq!(plan.len(), chunk_count(total, size));
                let mut next = 0;
                for chunk in &plan {
                    assert_eq!(chunk.rows.start, next);
                    assert!(!chunk.is_empty());
                    next = chunk.rows.end;
                }
                assert_eq!(next, total);
                assert_eq!(plan.iter().map(ChunkPlan::len).sum::<usize>(), total);
                if let Some(last) = plan.last() {
                    let expected = if total % size == 0 { size } else { total % size };
                    assert_eq!(last.len(), expected);
                }
            }
        }
    }

    #[test]
    fn test_names() {
        assert_eq!(archive_name("template_part"), "template_part_lotes.zip");
        assert_eq!(chunk_file_name("x", 12), "x12.xlsx");
        assert_eq!(chunk_file_name("x", 123), "x123.xlsx");
    }

    #[test]
    fn test_zero_chunk_size() {
        assert!(plan_chunks(10, 0).is_empty());
    }
}
