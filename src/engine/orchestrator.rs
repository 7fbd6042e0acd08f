// ==========================================
// 订单模板批量生成工具 - 批次编排器
// ==========================================
// 用途: 协调一次批次运行的各阶段
// 主流程:
//   源表解析 → 模板表头读取 → 清洗 → 合并 → 分块
//   → (字段取值 + 仓库分配) 逐块填充 → 打包
// 红线:
// - 单线程、顺序执行；分块之间只共享只读输入
// - 阶段统计显式累加到 RunContext，不使用全局状态
// - 任一分块失败 → 整批失败，不写出压缩包
// ==========================================

use crate::config::{BatchConfig, ConfigManager, WarehouseTables};
use crate::domain::{
    ChunkStats, CleaningReport, ColumnMapping, ConsolidationReport, RunSummary, SourceTable,
    TemplateLayout,
};
use crate::engine::chunking::{archive_name, plan_chunks};
use crate::engine::consolidator::RowConsolidator;
use crate::engine::error::{BatchError, BatchResult};
use crate::engine::field_resolver::FileStems;
use crate::engine::warehouse::WarehouseAssigner;
use crate::exporter::{ArchivePackager, ChunkFile, TemplateFiller};
use crate::importer::{
    DataCleaner, ImportError, TemplateReader, UniversalFileParser, XlsxTemplateReader,
};
use crate::perf::PerfGuard;
use chrono::{DateTime, Utc};
use rand::RngCore;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

// ==========================================
// BatchInput - 一次运行的输入
// ==========================================
#[derive(Debug, Clone)]
pub struct BatchInput {
    pub source_path: PathBuf,
    /// None → 第一个工作表
    pub source_sheet: Option<String>,
    pub template_path: PathBuf,
    /// None → 第一个工作表
    pub template_sheet: Option<String>,
    /// None → 只返回压缩包字节，不落盘
    pub out_dir: Option<PathBuf>,
}

impl BatchInput {
    pub fn new(source_path: impl Into<PathBuf>, template_path: impl Into<PathBuf>) -> Self {
        Self {
            source_path: source_path.into(),
            source_sheet: None,
            template_path: template_path.into(),
            template_sheet: None,
            out_dir: None,
        }
    }

    pub fn with_source_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.source_sheet = Some(sheet.into());
        self
    }

    pub fn with_template_sheet(mut self, sheet: impl Into<String>) -> Self {
        self.template_sheet = Some(sheet.into());
        self
    }

    pub fn with_out_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(dir.into());
        self
    }

    /// 文件名主干（取不到时使用默认值）
    pub fn stems(&self) -> FileStems {
        let defaults = FileStems::default();
        FileStems::new(
            stem_of(&self.template_path).unwrap_or(defaults.template),
            stem_of(&self.source_path).unwrap_or(defaults.source),
        )
    }
}

fn stem_of(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// ==========================================
// RunContext - 运行期累加器
// ==========================================
#[derive(Debug)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    started: Instant,
    pub source_rows: usize,
    pub rows_processed: usize,
    pub cleaning: CleaningReport,
    pub consolidation: ConsolidationReport,
    pub fill: ChunkStats,
    pub chunk_files: Vec<String>,
}

impl RunContext {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            started: Instant::now(),
            source_rows: 0,
            rows_processed: 0,
            cleaning: CleaningReport::default(),
            consolidation: ConsolidationReport::default(),
            fill: ChunkStats::default(),
            chunk_files: Vec::new(),
        }
    }

    pub fn record_chunk(&mut self, file_name: String, stats: ChunkStats) {
        self.chunk_files.push(file_name);
        self.fill += stats;
    }

    pub fn finish(self, archive_name: String, archive_path: Option<PathBuf>) -> RunSummary {
        RunSummary {
            run_id: self.run_id,
            started_at: self.started_at,
            finished_at: Utc::now(),
            elapsed_ms: self.started.elapsed().as_millis(),
            source_rows: self.source_rows,
            rows_processed: self.rows_processed,
            chunks: self.chunk_files.len(),
            chunk_files: self.chunk_files,
            archive_name,
            archive_path: archive_path.map(|p| p.display().to_string()),
            fill: self.fill,
            cleaning: self.cleaning,
            consolidation: self.consolidation,
        }
    }
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 一次运行的产出
#[derive(Debug)]
pub struct BatchOutput {
    pub summary: RunSummary,
    /// 压缩包字节
    pub archive: Vec<u8>,
}

// ==========================================
// BatchRunner - 批次编排器
// ==========================================
pub struct BatchRunner {
    config: BatchConfig,
    mapping: ColumnMapping,
    assigner: WarehouseAssigner,
    consolidator: RowConsolidator,
    cleaner: DataCleaner,
}

impl BatchRunner {
    /// 创建新的编排器实例
    ///
    /// # 参数
    /// - config: 已校验的批次配置
    /// - tables: 仓库查表数据
    pub fn new(config: BatchConfig, tables: WarehouseTables) -> Self {
        Self {
            mapping: config.column_mapping(),
            assigner: WarehouseAssigner::new(tables),
            consolidator: RowConsolidator::new(config.consolidation_profile()),
            cleaner: DataCleaner::from_config(&config),
            config,
        }
    }

    /// 从配置管理器创建（加载仓库查表数据）
    pub fn from_manager(manager: &ConfigManager) -> BatchResult<Self> {
        let tables = manager.warehouse_tables()?;
        Ok(Self::new(manager.config().clone(), tables))
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn assigner(&self) -> &WarehouseAssigner {
        &self.assigner
    }

    /// 执行一次批次（线程本地随机数源）
    pub fn run(&self, input: &BatchInput) -> BatchResult<BatchOutput> {
        let mut rng = rand::rng();
        self.run_with_rng(input, &mut rng)
    }

    /// 执行一次批次（随机数源可注入）
    pub fn run_with_rng<R: RngCore>(
        &self,
        input: &BatchInput,
        rng: &mut R,
    ) -> BatchResult<BatchOutput> {
        let mut ctx = RunContext::new();
        info!(
            run_id = %ctx.run_id,
            source = %input.source_path.display(),
            template = %input.template_path.display(),
            "批次开始"
        );

        // ===== 阶段 0: 读取输入（任一失败均在产出前中止）=====
        let table = {
            let _perf = PerfGuard::new("parse_source");
            UniversalFileParser.parse(&input.source_path, input.source_sheet.as_deref())?
        };
        ctx.source_rows = table.len();
        if table.is_empty() {
            return Err(BatchError::EmptySource);
        }

        let template_bytes = read_template(&input.template_path)?;
        let layout = XlsxTemplateReader.read_layout(
            &template_bytes,
            input.template_sheet.as_deref(),
            self.config.header_row,
        )?;
        debug!(
            run_id = %ctx.run_id,
            sheet = %layout.sheet_name,
            columns = layout.width(),
            "模板表头已读取"
        );

        let stems = input.stems();
        self.execute(
            table,
            &template_bytes,
            &layout,
            &stems,
            input.out_dir.as_deref(),
            rng,
            ctx,
        )
    }

    /// 输入已读取后的全部阶段：处理 → 打包 → 落盘
    ///
    /// 任一分块失败时直接返回错误，out_dir 下不会出现压缩包
    #[allow(clippy::too_many_arguments)]
    pub fn execute<R: RngCore>(
        &self,
        table: SourceTable,
        template_bytes: &[u8],
        layout: &TemplateLayout,
        stems: &FileStems,
        out_dir: Option<&Path>,
        rng: &mut R,
        mut ctx: RunContext,
    ) -> BatchResult<BatchOutput> {
        let archive = self.process(table, template_bytes, layout, stems, rng, &mut ctx)?;

        // ===== 打包落盘 =====
        let name = archive_name(&self.config.output_prefix);
        let (bytes, path) = {
            let _perf = PerfGuard::new("package_archive");
            let bytes = archive.to_zip_bytes()?;
            let path = match out_dir {
                Some(dir) => Some(archive.write_to(dir, &name)?),
                None => None,
            };
            (bytes, path)
        };

        let summary = ctx.finish(name, path);
        info!(
            run_id = %summary.run_id,
            rows = summary.rows_processed,
            chunks = summary.chunks,
            elapsed_ms = summary.elapsed_ms as u64,
            "批次完成"
        );
        Ok(BatchOutput {
            summary,
            archive: bytes,
        })
    }

    /// 核心流程：清洗 → 合并 → 分块填充（不涉及源文件读取与落盘）
    pub fn process<R: RngCore>(
        &self,
        mut table: SourceTable,
        template_bytes: &[u8],
        layout: &TemplateLayout,
        stems: &FileStems,
        rng: &mut R,
        ctx: &mut RunContext,
    ) -> BatchResult<ArchivePackager> {
        // ===== 阶段 1: 清洗 =====
        ctx.cleaning = self.cleaner.clean_table(&mut table, rng);

        // ===== 阶段 2: 合并 =====
        ctx.consolidation = self.consolidator.consolidate(&mut table);
        ctx.rows_processed = table.len();

        // ===== 阶段 3: 分块填充 =====
        let filler = TemplateFiller::from_config(&self.assigner, &self.config);
        let plans = plan_chunks(table.len(), self.config.chunk_size);
        let mut packager = ArchivePackager::new();

        for plan in &plans {
            let _perf = PerfGuard::new("fill_chunk");
            let rows = &table.rows[plan.rows.clone()];
            let (bytes, stats) = filler
                .fill(
                    template_bytes,
                    layout,
                    self.config.start_row,
                    rows,
                    &self.mapping,
                    stems,
                )
                .map_err(|source| BatchError::ChunkFailed {
                    chunk: plan.index,
                    source,
                })?;

            let file_name = plan.file_name(&self.config.output_prefix);
            info!(
                run_id = %ctx.run_id,
                chunk = plan.index,
                rows = stats.rows,
                file = %file_name,
                "分块已生成"
            );
            ctx.record_chunk(file_name.clone(), stats);
            packager.add(ChunkFile {
                name: file_name,
                bytes,
            });
        }

        Ok(packager)
    }
}

fn read_template(path: &Path) -> BatchResult<Vec<u8>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()).into());
    }
    let bytes = std::fs::read(path).map_err(ImportError::from)?;
    Ok(bytes)
}
