// ==========================================
// 基地级维修排程系统 - 台账 CSV 写出
// ==========================================
// 格式: 日期 YYYY-MM-DD;布尔 true/false;空值写空字符串
// ==========================================

use crate::domain::record::MaintenanceRecord;
use crate::engine::ledger::LedgerSchema;
use crate::exporter::error::ExportResult;
use chrono::NaiveDate;
use csv::Writer;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_cell(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default()
}

fn opt_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// 单元格渲染
///
/// # 规则
/// - 声明列按字段取值
/// - 其余列从 extra 取值,缺失写空
pub fn cell_value(record: &MaintenanceRecord, column: &str) -> String {
    match column {
        "aircraft_id" => record.aircraft_id.clone(),
        "identity_key" => opt_cell(record.identity_key.as_deref()),
        "unit_type" => opt_cell(record.unit_type.as_deref()),
        "start_date" => date_cell(record.start_date),
        "finish_date" => date_cell(record.finish_date),
        "received_date" => date_cell(record.received_date),
        "task" => record.task.clone(),
        "unit_assignment" => opt_cell(record.unit_assignment.as_deref()),
        "source" => record.source.as_str().to_string(),
        "is_rebase" => record.is_rebase.to_string(),
        "is_546_event" => record.is_546_event.to_string(),
        "is_amarg_unit" => record.is_amarg_unit.to_string(),
        "chart_visible" => record.chart_visible.to_string(),
        "fiscal_year" => opt_cell(record.fiscal_year),
        "fiscal_quarter" => opt_cell(record.fiscal_quarter),
        "work_unit_code" => opt_cell(record.work_unit_code.as_deref()),
        "work_center" => opt_cell(record.work_center.as_deref()),
        "reason_description" => opt_cell(record.reason_description.as_deref()),
        "job_control_number" => opt_cell(record.job_control_number.as_deref()),
        "material_control_number" => opt_cell(record.material_control_number.as_deref()),
        "date_source_used" => opt_cell(record.date_source_used.map(|s| s.column_name())),
        "flight_hours" => opt_cell(record.flight_hours),
        "received_to_start_days" => opt_cell(record.received_to_start_days),
        "start_to_finish_days" => opt_cell(record.start_to_finish_days),
        other => record
            .extra
            .get(other)
            .cloned()
            .flatten()
            .unwrap_or_default(),
    }
}

fn to_row(record: &MaintenanceRecord, columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| cell_value(record, c)).collect()
}

/// 写出记录集
///
/// # 返回
/// - 写出的数据行数
pub fn write_records(
    path: &Path,
    schema: &LedgerSchema,
    records: &[&MaintenanceRecord],
) -> ExportResult<usize> {
    let columns = schema.columns();
    let mut wtr = Writer::from_path(path)?;
    wtr.write_record(&columns)?;
    for record in records {
        wtr.write_record(&to_row(record, &columns))?;
    }
    wtr.flush()?;

    tracing::debug!(file = %path.display(), rows = records.len(), "CSV 写出完成");
    Ok(records.len())
}
