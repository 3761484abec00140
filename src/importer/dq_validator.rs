// ==========================================
// 基地级维修排程系统 - 数据质量校验器实现
// ==========================================
// 职责: 必需列校验 + 空列告警 + MAF 预览统计
// 红线: 必需列缺失是致命错误;其余只告警
// ==========================================

use crate::domain::types::DateSource;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::{columns, find_flight_hour_id_column};
use crate::importer::schedule_importer_trait::ParsedTable;
use std::collections::HashSet;

// 各数据源必需列
pub const DEPOT_REQUIRED_COLUMNS: &[&str] = &[
    columns::DEPOT_AIRCRAFT_ID,
    columns::DEPOT_START_DATE,
    columns::DEPOT_TASK,
];

pub const MAF_REQUIRED_COLUMNS: &[&str] = &[
    columns::MAF_AIRCRAFT_ID,
    columns::MAF_WORK_UNIT_CODE,
    columns::MAF_WORK_CENTER,
    columns::MAF_REASON,
];

// ==========================================
// MafPreview - MAF 预览统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MafPreview {
    pub available_date_columns: Vec<String>,
    pub work_unit_code_matches: usize,
    pub work_center_counts: Vec<(String, usize)>,
    pub unique_aircraft: usize,
}

pub struct DqValidator;

impl DqValidator {
    /// 校验必需列
    ///
    /// # 返回
    /// - Err(MissingRequiredColumn): 列出全部缺失列
    pub fn validate_required_columns(
        &self,
        table: &ParsedTable,
        required: &[&str],
        source_name: &str,
    ) -> ImportResult<()> {
        let missing: Vec<String> = required
            .iter()
            .filter(|col| !table.has_column(col))
            .map(|col| col.to_string())
            .collect();

        if !missing.is_empty() {
            tracing::error!(source = source_name, missing = ?missing, "缺少必需列");
            return Err(ImportError::MissingRequiredColumn {
                source_name: source_name.to_string(),
                columns: missing,
            });
        }

        // 必需列完全为空只告警
        for col in required {
            if table.column_is_empty(col) {
                tracing::warn!(source = source_name, column = *col, "必需列完全为空");
            }
        }

        Ok(())
    }

    /// 历史维修结构校验
    pub fn validate_depot_table(&self, table: &ParsedTable) -> ImportResult<()> {
        self.validate_required_columns(table, DEPOT_REQUIRED_COLUMNS, "depot")?;
        tracing::info!(
            unique_aircraft = self.unique_values(table, columns::DEPOT_AIRCRAFT_ID),
            "历史维修数据校验完成"
        );
        Ok(())
    }

    /// MAF 结构校验 + 预览统计
    ///
    /// # 参数
    /// - work_unit_code: 546 天事件 WUC
    /// - work_centers: 546 天事件工作中心写法
    pub fn validate_maf_table(
        &self,
        table: &ParsedTable,
        work_unit_code: &str,
        work_centers: &[String],
    ) -> ImportResult<MafPreview> {
        self.validate_required_columns(table, MAF_REQUIRED_COLUMNS, "maf")?;

        let available_date_columns: Vec<String> = DateSource::PRIORITY
            .iter()
            .map(|s| s.column_name())
            .filter(|col| table.has_column(col))
            .map(str::to_string)
            .collect();

        let count_equal = |column: &str, expected: &str| {
            table
                .rows
                .iter()
                .filter(|row| row.values.get(column).map(|v| v.trim()) == Some(expected))
                .count()
        };

        let preview = MafPreview {
            work_unit_code_matches: count_equal(columns::MAF_WORK_UNIT_CODE, work_unit_code),
            work_center_counts: work_centers
                .iter()
                .map(|wc| (wc.clone(), count_equal(columns::MAF_WORK_CENTER, wc)))
                .collect(),
            unique_aircraft: self.unique_values(table, columns::MAF_AIRCRAFT_ID),
            available_date_columns,
        };

        tracing::info!(date_columns = ?preview.available_date_columns, "MAF 可用日期列");
        tracing::info!(
            work_unit_code = work_unit_code,
            matches = preview.work_unit_code_matches,
            "MAF 预览: WUC 匹配数"
        );
        tracing::info!(work_centers = ?preview.work_center_counts, "MAF 预览: 工作中心计数");
        tracing::info!(unique_aircraft = preview.unique_aircraft, "MAF 数据校验完成");

        if preview.available_date_columns.is_empty() {
            tracing::warn!("MAF 无任何候选日期列，546 天事件将全部因缺少日期被剔除");
        }

        Ok(preview)
    }

    /// 飞行小时结构校验（可选数据源）
    ///
    /// # 返回
    /// - Some(航空器列名): 结构可用
    /// - None: 缺少飞行小时列或航空器列,数据源降级
    pub fn validate_flight_hour_table<'a>(&self, table: &'a ParsedTable) -> Option<&'a str> {
        if !table.has_column(columns::FLIGHT_HOURS) {
            tracing::error!(column = columns::FLIGHT_HOURS, "飞行小时数据缺少必需列");
            return None;
        }

        let id_column = find_flight_hour_id_column(&table.headers);
        if id_column.is_none() {
            tracing::error!("飞行小时数据中未找到 BUNO 列");
        }
        id_column
    }

    fn unique_values(&self, table: &ParsedTable, column: &str) -> usize {
        table
            .rows
            .iter()
            .filter_map(|row| row.values.get(column))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .collect::<HashSet<_>>()
            .len()
    }
}
