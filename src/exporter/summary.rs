// ==========================================
// 基地级维修排程系统 - 运行汇总报告
// ==========================================
// 职责: 台账统计 + 阶段统计 + 缺陷统计 + 配置快照
// 输出: 日志 + processing_summary_v<版本>.json
// ==========================================

use crate::config::{config_snapshot, ScheduleConfigReader};
use crate::domain::defect::DefectSummary;
use crate::engine::ledger::LedgerSummary;
use crate::engine::orchestrator::{RunStats, ScheduleRunResult};
use crate::exporter::error::ExportResult;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingSummary {
    pub run_id: String,
    pub app_version: String,
    pub output_version: String,
    pub as_of: NaiveDate,

    // 分来源计数
    pub total_records: usize,
    pub historical_depot_records: usize,
    pub projected_records: usize,
    pub maf_546_events: usize,
    pub maf_546_projections: usize,
    pub slep_events: usize,

    pub ledger: LedgerSummary,
    pub stats: RunStats,
    pub defects: DefectSummary,
    pub config: Value,
}

impl ProcessingSummary {
    pub fn build(result: &ScheduleRunResult, config: &dyn ScheduleConfigReader) -> Self {
        let ledger = result.ledger.summary();
        Self {
            run_id: result.run_id.to_string(),
            app_version: crate::VERSION.to_string(),
            output_version: config.output_version(),
            as_of: result.as_of,
            total_records: ledger.total_records,
            historical_depot_records: result.stats.historical_records,
            projected_records: result.stats.pmi_projected_records,
            maf_546_events: result.stats.day546_events,
            maf_546_projections: result.stats.day546_projections,
            slep_events: result.stats.slep_events,
            ledger,
            stats: result.stats.clone(),
            defects: result.defects.summary(),
            config: config_snapshot(config),
        }
    }

    /// 汇总写入日志
    pub fn log(&self) {
        info!(
            run_id = %self.run_id,
            total_records = self.total_records,
            historical = self.historical_depot_records,
            projected = self.projected_records,
            maf_546_events = self.maf_546_events,
            maf_546_projections = self.maf_546_projections,
            slep_events = self.slep_events,
            unique_aircraft = self.ledger.unique_aircraft,
            "处理汇总"
        );
        info!(
            earliest = ?self.ledger.earliest_start,
            latest = ?self.ledger.latest_start,
            "开始日期范围"
        );
        info!(
            rebase = self.ledger.rebase_events,
            day546 = self.ledger.day546_events,
            amarg = self.ledger.amarg_records,
            chart_visible = self.ledger.chart_visible_records,
            chart_hidden = self.ledger.chart_hidden_records,
            "标记统计"
        );
        for (task, count) in &self.ledger.task_distribution {
            info!(task = %task, count = *count, "任务分布");
        }
        info!(
            total = self.defects.total,
            errors = self.defects.errors,
            warnings = self.defects.warnings,
            skipped_sources = ?self.defects.skipped_sources,
            "缺陷统计"
        );
    }

    pub fn write_json(&self, path: &Path) -> ExportResult<()> {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        info!(file = %path.display(), "汇总报告已写出");
        Ok(())
    }
}
