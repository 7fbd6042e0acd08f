// ==========================================
// 订单模板批量生成工具 - 命令行入口
// ==========================================
// 子命令:
// - run: 执行一次批次，输出压缩包与运行汇总
// - headers: 预览模板表头
// - tables: 校验并汇总仓库查表数据
// ==========================================

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use order_batcher::config::{ConfigManager, ConsolidationMode, WarehouseTables};
use order_batcher::engine::{BatchInput, BatchRunner};
use order_batcher::i18n::{self, t_with_args};
use order_batcher::importer::{TemplateReader, XlsxTemplateReader};
use order_batcher::logging;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "order-batcher", version, about = "订单模板批量生成工具")]
struct Cli {
    /// 输出 JSON 格式日志
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// 执行一次批次
    Run(RunArgs),

    /// 列出模板表头
    Headers {
        #[arg(long)]
        template: PathBuf,

        #[arg(long)]
        template_sheet: Option<String>,

        #[arg(long, default_value_t = 1)]
        header_row: u32,

        #[arg(long)]
        locale: Option<String>,
    },

    /// 校验仓库查表数据
    Tables {
        /// 外部查表文件（缺省使用内置表）
        #[arg(long)]
        tables: Option<PathBuf>,

        #[arg(long)]
        locale: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// 源表（xlsx / xls / ods / csv）
    #[arg(long)]
    source: PathBuf,

    #[arg(long)]
    source_sheet: Option<String>,

    /// 模板（xlsx）
    #[arg(long)]
    template: PathBuf,

    #[arg(long)]
    template_sheet: Option<String>,

    /// 压缩包输出目录
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// 配置文件（TOML）
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    chunk_size: Option<usize>,

    #[arg(long)]
    prefix: Option<String>,

    /// none | brand_company | brand_two_stage
    #[arg(long)]
    consolidation: Option<ConsolidationMode>,

    /// 运行汇总另存为 JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    #[arg(long)]
    locale: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_with(if cli.log_json {
        logging::LogFormat::Json
    } else {
        logging::LogFormat::Text
    });

    tracing::debug!(
        app = order_batcher::APP_NAME,
        version = order_batcher::VERSION,
        "启动"
    );

    match cli.command {
        Command::Run(args) => run(args),
        Command::Headers {
            template,
            template_sheet,
            header_row,
            locale,
        } => {
            if let Some(locale) = locale {
                i18n::set_locale(&locale);
            }
            let bytes = std::fs::read(&template)
                .with_context(|| format!("读取模板失败: {}", template.display()))?;
            let layout =
                XlsxTemplateReader.read_layout(&bytes, template_sheet.as_deref(), header_row)?;
            println!(
                "{}",
                t_with_args(
                    "headers.title",
                    &[
                        ("sheet", &layout.sheet_name),
                        ("row", &header_row.to_string())
                    ]
                )
            );
            for (idx, header) in layout.headers().iter().enumerate() {
                if !header.trim().is_empty() {
                    println!("{:>4}  {}", idx + 1, header);
                }
            }
            Ok(())
        }
        Command::Tables { tables, locale } => {
            if let Some(locale) = locale {
                i18n::set_locale(&locale);
            }
            let tables = match tables {
                Some(path) => WarehouseTables::load(&path)?,
                None => WarehouseTables::builtin()?,
            };
            println!(
                "{}",
                t_with_args(
                    "tables.summary",
                    &[
                        ("hubs", &tables.hubs().len().to_string()),
                        ("cities", &tables.city_count().to_string()),
                        ("departments", &tables.department_count().to_string()),
                        ("keywords", &tables.keyword_count().to_string()),
                    ]
                )
            );
            println!(
                "{}",
                t_with_args(
                    "tables.default_hub",
                    &[("label", &tables.default_label().label)]
                )
            );
            Ok(())
        }
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut manager = ConfigManager::load(args.config.as_deref())?;
    {
        let cfg = manager.config_mut();
        if let Some(size) = args.chunk_size {
            cfg.chunk_size = size;
        }
        if let Some(prefix) = args.prefix {
            cfg.output_prefix = prefix;
        }
        if let Some(mode) = args.consolidation {
            cfg.consolidation.mode = mode;
        }
        if let Some(locale) = args.locale {
            cfg.locale = locale;
        }
    }
    ConfigManager::validate(manager.config())?;
    i18n::set_locale(&manager.config().locale);

    let runner = BatchRunner::from_manager(&manager)?;
    let mut input = BatchInput::new(&args.source, &args.template).with_out_dir(&args.out_dir);
    input.source_sheet = args.source_sheet;
    input.template_sheet = args.template_sheet;

    let output = runner.run(&input).map_err(|e| {
        let message = i18n::describe_error(&e);
        anyhow::Error::new(e).context(message)
    })?;
    for line in i18n::render_summary(&output.summary) {
        println!("{}", line);
    }

    if let Some(path) = args.summary_json {
        let json = serde_json::to_string_pretty(&output.summary)?;
        std::fs::write(&path, json)
            .with_context(|| format!("写出运行汇总失败: {}", path.display()))?;
    }
    println!("{}", i18n::t("common.success"));
    Ok(())
}
