// ==========================================
// 基地级维修排程系统 - 批处理入口
// ==========================================
// 用法:
//   depot-schedule <depot.xlsx> <maf.csv> [flight_hours.xlsx] [选项]
// 选项:
//   --output <目录>       输出根目录（默认当前目录）
//   --as-of <YYYY-MM-DD>  546 天推演锚点（默认今天）
//   --config <文件>       JSON 配置覆盖
//   --sheet <名称>        历史维修工作表名
//   --json-log            JSON 格式日志（不写处理日志文件）
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use depot_schedule::config::ConfigManager;
use depot_schedule::engine::{DepotScheduleOrchestrator, InputPaths};
use depot_schedule::exporter::{output_files, ScheduleExporter, VersionFolder};
use depot_schedule::logging;
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    positional: Vec<PathBuf>,
    output_root: Option<PathBuf>,
    as_of: Option<NaiveDate>,
    config_file: Option<PathBuf>,
    sheet: Option<String>,
    json_log: bool,
}

fn parse_args() -> Result<CliArgs> {
    let mut cli = CliArgs::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--output" => {
                cli.output_root = Some(args.next().context("--output 缺少目录参数")?.into());
            }
            "--as-of" => {
                let raw = args.next().context("--as-of 缺少日期参数")?;
                let date = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("--as-of 日期格式错误: {}", raw))?;
                cli.as_of = Some(date);
            }
            "--config" => {
                cli.config_file = Some(args.next().context("--config 缺少文件参数")?.into());
            }
            "--sheet" => {
                cli.sheet = Some(args.next().context("--sheet 缺少名称参数")?);
            }
            "--json-log" => cli.json_log = true,
            flag if flag.starts_with("--") => bail!("未知选项: {}", flag),
            path => cli.positional.push(PathBuf::from(path)),
        }
    }

    if cli.positional.len() < 2 || cli.positional.len() > 3 {
        bail!("用法: depot-schedule <历史维修文件> <MAF 文件> [飞行小时文件] [--output 目录] [--as-of YYYY-MM-DD] [--config 文件] [--sheet 名称] [--json-log]");
    }
    Ok(cli)
}

fn main() -> Result<()> {
    let cli = parse_args()?;

    let config = match &cli.config_file {
        Some(path) => ConfigManager::from_json_file(path)
            .with_context(|| format!("配置文件加载失败: {}", path.display()))?,
        None => ConfigManager::new(),
    };

    let output_root = cli.output_root.clone().unwrap_or_else(|| PathBuf::from("."));
    let folder = VersionFolder::prepare(&output_root, &config).context("版本目录准备失败")?;

    if cli.json_log {
        logging::init_json();
    } else {
        logging::init_with_file(&folder.file_path(output_files::PROCESSING_LOG, "txt"))
            .context("处理日志文件创建失败")?;
    }

    tracing::info!("==================================================");
    tracing::info!("{}", depot_schedule::APP_NAME);
    tracing::info!("系统版本: {}", depot_schedule::VERSION);
    tracing::info!("==================================================");

    let as_of = cli
        .as_of
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let paths = InputPaths {
        depot: cli.positional[0].clone(),
        maf: cli.positional[1].clone(),
        flight_hours: cli.positional.get(2).cloned(),
        depot_sheet: cli.sheet.clone(),
    };

    let orchestrator = DepotScheduleOrchestrator::new(&config);
    let result = orchestrator
        .run_from_files(&paths, as_of)
        .context("排程处理失败")?;

    let manifest = ScheduleExporter::new(&config)
        .export(&result, &output_root)
        .context("输出写出失败")?;

    for (path, rows) in &manifest.written {
        println!("{} ({} 行)", path.display(), rows);
    }
    println!("{}", manifest.summary_file.display());
    Ok(())
}
