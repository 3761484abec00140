// ==========================================
// 基地级维修排程系统 - 导出层
// ==========================================
// 职责: 版本目录 + 六类 CSV 输出 + 运行汇总
// 红线: 空子集不写文件
// ==========================================

pub mod csv_writer;
pub mod error;
pub mod summary;
pub mod version_folder;

pub use csv_writer::{cell_value, write_records};
pub use error::{ExportError, ExportResult};
pub use summary::ProcessingSummary;
pub use version_folder::{version_suffix, VersionFolder};

use crate::config::ScheduleConfigReader;
use crate::domain::record::MaintenanceRecord;
use crate::engine::orchestrator::ScheduleRunResult;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

// 输出文件名（不含版本后缀）
pub mod output_files {
    pub const COMBINED: &str = "combined_aircraft_data";
    pub const FUTURE_EVENTS: &str = "future_events";
    pub const MAF_546_ANALYSIS: &str = "maf_546_analysis";
    pub const MAF_546_PROJECTIONS: &str = "maf_546_projections";
    pub const SLEP_EVENTS: &str = "slep_events";
    pub const REBASE_EVENTS: &str = "rebase_events";
    pub const PROCESSING_SUMMARY: &str = "processing_summary";
    pub const PROCESSING_LOG: &str = "processing_log";
}

// ==========================================
// ExportManifest - 导出清单
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportManifest {
    pub folder: PathBuf,
    pub written: Vec<(PathBuf, usize)>, // (文件, 数据行数)
    pub skipped_empty: Vec<String>,
    pub summary_file: PathBuf,
}

pub struct ScheduleExporter<'a> {
    config: &'a dyn ScheduleConfigReader,
}

impl<'a> ScheduleExporter<'a> {
    pub fn new(config: &'a dyn ScheduleConfigReader) -> Self {
        Self { config }
    }

    /// 导出全部输出
    ///
    /// # 参数
    /// - result: 排程运行结果
    /// - output_root: 输出根目录（版本目录建在其下）
    #[instrument(skip(self, result), fields(run_id = %result.run_id, root = %output_root.display()))]
    pub fn export(&self, result: &ScheduleRunResult, output_root: &Path) -> ExportResult<ExportManifest> {
        let folder = VersionFolder::prepare(output_root, self.config)?;
        let ledger = &result.ledger;

        let all: Vec<&MaintenanceRecord> = ledger.records.iter().collect();
        let outputs: [(&str, Vec<&MaintenanceRecord>); 6] = [
            (output_files::COMBINED, all),
            (output_files::FUTURE_EVENTS, ledger.future_pmi()),
            (output_files::MAF_546_ANALYSIS, ledger.day546_historical()),
            (output_files::MAF_546_PROJECTIONS, ledger.day546_projections()),
            (output_files::SLEP_EVENTS, ledger.slep()),
            (output_files::REBASE_EVENTS, ledger.rebase()),
        ];

        let mut manifest = ExportManifest {
            folder: folder.path.clone(),
            ..Default::default()
        };

        for (stem, records) in outputs {
            if records.is_empty() {
                info!(output = stem, "子集为空，跳过写出");
                manifest.skipped_empty.push(stem.to_string());
                continue;
            }
            let path = folder.file_path(stem, "csv");
            let rows = write_records(&path, &ledger.schema, &records)?;
            info!(file = %path.display(), rows = rows, "已写出");
            manifest.written.push((path, rows));
        }

        let summary = ProcessingSummary::build(result, self.config);
        summary.log();
        let summary_file = folder.file_path(output_files::PROCESSING_SUMMARY, "json");
        summary.write_json(&summary_file)?;
        manifest.summary_file = summary_file;

        info!(
            folder = %manifest.folder.display(),
            files = manifest.written.len(),
            skipped = manifest.skipped_empty.len(),
            "导出完成"
        );
        Ok(manifest)
    }
}
