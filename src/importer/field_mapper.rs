// ==========================================
// 基地级维修排程系统 - 字段映射器实现
// ==========================================
// 职责: 源列 → 标准字段映射 + 类型转换
// 红线: 单行失败只产出 RecordDefect,不中断批次
// ==========================================

use crate::domain::defect::{ProcessingStage, RecordDefect};
use crate::domain::record::{FlightHourObservation, RawDepotRecord, RawMafRecord};
use crate::domain::types::DateSource;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::schedule_importer_trait::ParsedRow;
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

// ==========================================
// 源列名常量
// ==========================================
pub mod columns {
    // ===== 历史维修（depot）=====
    pub const DEPOT_AIRCRAFT_ID: &str = "BUNO";
    pub const DEPOT_START_DATE: &str = "START DATE";
    pub const DEPOT_FINISH_DATE: &str = "FINISH DATE";
    pub const DEPOT_TASK: &str = "TASK";
    pub const DEPOT_UNIT_ASSIGNMENT: &str = "SQD";
    pub const DEPOT_RECEIVED_DATE: &str = "FID";
    pub const DEPOT_UNIT_TYPE_PREFIX: &str = "TMS";

    // ===== MAF =====
    pub const MAF_AIRCRAFT_ID: &str = "Buno";
    pub const MAF_WORK_UNIT_CODE: &str = "WUC";
    pub const MAF_WORK_CENTER: &str = "Work Center";
    pub const MAF_REASON: &str = "System Reason Description";
    pub const MAF_JCN: &str = "Jcn";
    pub const MAF_MCN: &str = "Mcn";

    // ===== 飞行小时 =====
    pub const FLIGHT_HOURS: &str = "AI_Running_Total_Flight_Hours";
    pub const FLIGHT_HOUR_ID_TOKEN: &str = "buno";
}

/// 定位机型列（首个以 TMS 开头的列）
pub fn find_unit_type_column(headers: &[String]) -> Option<&str> {
    headers
        .iter()
        .find(|h| h.to_uppercase().starts_with(columns::DEPOT_UNIT_TYPE_PREFIX))
        .map(String::as_str)
}

/// 定位飞行小时文件的航空器列（首个包含 buno 的列,不区分大小写）
pub fn find_flight_hour_id_column(headers: &[String]) -> Option<&str> {
    headers
        .iter()
        .find(|h| h.to_lowercase().contains(columns::FLIGHT_HOUR_ID_TOKEN))
        .map(String::as_str)
}

pub struct FieldMapper {
    cleaner: DataCleaner,
}

impl Default for FieldMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldMapper {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 提取字符串字段,支持多个可能的列名（别名）
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        let aliases: Vec<&str> = match key {
            columns::DEPOT_AIRCRAFT_ID => vec!["BUNO", "Buno", "BuNo"],
            columns::MAF_AIRCRAFT_ID => vec!["Buno", "BUNO", "BuNo"],
            columns::MAF_JCN => vec!["Jcn", "JCN"],
            columns::MAF_MCN => vec!["Mcn", "MCN"],
            _ => vec![key],
        };

        for alias in aliases {
            if let Some(v) = self.cleaner.normalize_null(row.get(alias).map(String::as_str)) {
                return Some(v);
            }
        }
        None
    }

    fn get_aircraft_id(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        self.cleaner
            .clean_aircraft_id(self.get_string(row, key).as_deref())
    }

    /// 解析必需日期（非空但无法识别 → Error,记录剔除）
    fn parse_required_date(
        &self,
        row: &ParsedRow,
        key: &str,
        aircraft_id: &str,
    ) -> Result<Option<NaiveDate>, RecordDefect> {
        match self.get_string(&row.values, key) {
            None => Ok(None),
            Some(value) => self.cleaner.parse_flexible_date(&value).map(Some).ok_or_else(|| {
                RecordDefect::error(
                    ProcessingStage::DepotImport,
                    Some(row.row_number),
                    Some(aircraft_id),
                    key,
                    format!("日期无法识别: {}", value),
                )
            }),
        }
    }

    /// 解析可选日期（无法识别 → Warning,字段置空,记录保留）
    fn parse_optional_date(
        &self,
        row: &ParsedRow,
        key: &str,
        aircraft_id: &str,
        warnings: &mut Vec<RecordDefect>,
    ) -> Option<NaiveDate> {
        let value = self.get_string(&row.values, key)?;
        let parsed = self.cleaner.parse_flexible_date(&value);
        if parsed.is_none() {
            warnings.push(RecordDefect::warning(
                ProcessingStage::DepotImport,
                Some(row.row_number),
                Some(aircraft_id),
                key,
                format!("日期无法识别，置空: {}", value),
            ));
        }
        parsed
    }

    /// 映射历史维修行
    ///
    /// # 参数
    /// - row: 解析后的行
    /// - headers: 源文件列（用于识别机型列与额外列）
    /// - warnings: 记录保留但字段降级时的缺陷输出
    ///
    /// # 返回
    /// - Err(RecordDefect): 航空器编号缺失或开始日期无法识别
    pub fn map_depot_row(
        &self,
        row: &ParsedRow,
        headers: &[String],
        warnings: &mut Vec<RecordDefect>,
    ) -> Result<RawDepotRecord, RecordDefect> {
        let aircraft_id = self
            .get_aircraft_id(&row.values, columns::DEPOT_AIRCRAFT_ID)
            .ok_or_else(|| {
                RecordDefect::error(
                    ProcessingStage::DepotImport,
                    Some(row.row_number),
                    None,
                    columns::DEPOT_AIRCRAFT_ID,
                    "航空器编号缺失",
                )
            })?;

        let start_date = self.parse_required_date(row, columns::DEPOT_START_DATE, &aircraft_id)?;
        let finish_date =
            self.parse_optional_date(row, columns::DEPOT_FINISH_DATE, &aircraft_id, warnings);
        let received_date =
            self.parse_optional_date(row, columns::DEPOT_RECEIVED_DATE, &aircraft_id, warnings);

        let task = self.get_string(&row.values, columns::DEPOT_TASK);
        if task.is_none() {
            warnings.push(RecordDefect::warning(
                ProcessingStage::DepotImport,
                Some(row.row_number),
                Some(&aircraft_id),
                columns::DEPOT_TASK,
                "任务代码缺失",
            ));
        }

        let unit_type_column = find_unit_type_column(headers);
        let unit_type = unit_type_column.and_then(|col| self.get_string(&row.values, col));

        // 额外列透传
        let mut extra = BTreeMap::new();
        for header in headers {
            if header.is_empty() || is_known_depot_column(header, unit_type_column) {
                continue;
            }
            if let Some(value) = self.get_string(&row.values, header) {
                extra.insert(header.clone(), value);
            }
        }

        Ok(RawDepotRecord {
            aircraft_id: Some(aircraft_id),
            start_date,
            finish_date,
            received_date,
            task,
            unit_assignment: self.get_string(&row.values, columns::DEPOT_UNIT_ASSIGNMENT),
            unit_type,
            extra,
            row_number: row.row_number,
        })
    }

    /// 映射 MAF 行（日期保持原始文本）
    pub fn map_maf_row(&self, row: &ParsedRow) -> Result<RawMafRecord, RecordDefect> {
        let aircraft_id = self
            .get_aircraft_id(&row.values, columns::MAF_AIRCRAFT_ID)
            .ok_or_else(|| {
                RecordDefect::error(
                    ProcessingStage::MafImport,
                    Some(row.row_number),
                    None,
                    columns::MAF_AIRCRAFT_ID,
                    "航空器编号缺失",
                )
            })?;

        let get = |key: &str| self.get_string(&row.values, key);

        Ok(RawMafRecord {
            aircraft_id: Some(aircraft_id),
            work_unit_code: get(columns::MAF_WORK_UNIT_CODE),
            work_center: get(columns::MAF_WORK_CENTER),
            reason_description: get(columns::MAF_REASON),
            received_date_time: get(DateSource::ReceivedDateTime.column_name()),
            received_date: get(DateSource::ReceivedDate.column_name()),
            in_work_date: get(DateSource::InWorkDate.column_name()),
            completion_date_time: get(
                DateSource::CompletionDateTime.column_name(),
            ),
            completion_date: get(DateSource::CompletionDate.column_name()),
            job_control_number: get(columns::MAF_JCN),
            material_control_number: get(columns::MAF_MCN),
            row_number: row.row_number,
        })
    }

    /// 映射飞行小时行
    ///
    /// # 返回
    /// - Err(RecordDefect): 航空器编号或飞行小时缺失/非数值
    pub fn map_flight_hour_row(
        &self,
        row: &ParsedRow,
        id_column: &str,
    ) -> Result<FlightHourObservation, RecordDefect> {
        let aircraft_id = self.get_aircraft_id(&row.values, id_column).ok_or_else(|| {
            RecordDefect::warning(
                ProcessingStage::FlightHourImport,
                Some(row.row_number),
                None,
                id_column,
                "航空器编号缺失",
            )
        })?;

        let raw_hours = self
            .get_string(&row.values, columns::FLIGHT_HOURS)
            .ok_or_else(|| {
                RecordDefect::warning(
                    ProcessingStage::FlightHourImport,
                    Some(row.row_number),
                    Some(&aircraft_id),
                    columns::FLIGHT_HOURS,
                    "飞行小时缺失",
                )
            })?;

        let flight_hours = self.cleaner.parse_number(&raw_hours).ok_or_else(|| {
            RecordDefect::error(
                ProcessingStage::FlightHourImport,
                Some(row.row_number),
                Some(&aircraft_id),
                columns::FLIGHT_HOURS,
                format!("飞行小时无法解析为数值: {}", raw_hours),
            )
        })?;

        Ok(FlightHourObservation {
            aircraft_id,
            flight_hours,
            row_number: row.row_number,
        })
    }
}

fn is_known_depot_column(header: &str, unit_type_column: Option<&str>) -> bool {
    if Some(header) == unit_type_column {
        return true;
    }
    matches!(
        header,
        "BUNO"
            | "Buno"
            | "BuNo"
            | columns::DEPOT_START_DATE
            | columns::DEPOT_FINISH_DATE
            | columns::DEPOT_TASK
            | columns::DEPOT_UNIT_ASSIGNMENT
            | columns::DEPOT_RECEIVED_DATE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(row_number: usize, pairs: &[(&str, &str)]) -> ParsedRow {
        ParsedRow {
            row_number,
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_map_depot_row_basic() {
        let hdr = headers(&["BUNO", "START DATE", "FINISH DATE", "TASK", "SQD", "TMS (Type)", "FID", "SITE"]);
        let r = row(
            2,
            &[
                ("BUNO", "166001.0"),
                ("START DATE", "2020-01-01"),
                ("FINISH DATE", "2020-02-15"),
                ("TASK", "PMI1"),
                ("SQD", "VFA-106"),
                ("TMS (Type)", "F/A-18E"),
                ("FID", "2019-12-20"),
                ("SITE", "Jacksonville"),
            ],
        );

        let mut warnings = Vec::new();
        let record = FieldMapper::new().map_depot_row(&r, &hdr, &mut warnings).unwrap();

        assert_eq!(record.aircraft_id.as_deref(), Some("166001"));
        assert_eq!(record.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(record.finish_date, NaiveDate::from_ymd_opt(2020, 2, 15));
        assert_eq!(record.received_date, NaiveDate::from_ymd_opt(2019, 12, 20));
        assert_eq!(record.task.as_deref(), Some("PMI1"));
        assert_eq!(record.unit_assignment.as_deref(), Some("VFA-106"));
        assert_eq!(record.unit_type.as_deref(), Some("F/A-18E"));
        assert_eq!(record.extra.get("SITE"), Some(&"Jacksonville".to_string()));
        assert_eq!(record.extra.len(), 1);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_map_depot_row_missing_aircraft_id() {
        let hdr = headers(&["BUNO", "START DATE", "TASK"]);
        let r = row(5, &[("BUNO", " "), ("START DATE", "2020-01-01"), ("TASK", "PMI1")]);

        let defect = FieldMapper::new()
            .map_depot_row(&r, &hdr, &mut Vec::new())
            .unwrap_err();
        assert_eq!(defect.row_number, Some(5));
        assert_eq!(defect.field, "BUNO");
    }

    #[test]
    fn test_map_depot_row_bad_start_date_dropped_bad_finish_kept() {
        let hdr = headers(&["BUNO", "START DATE", "FINISH DATE", "TASK"]);

        let bad_start = row(3, &[("BUNO", "U1"), ("START DATE", "sometime"), ("TASK", "PMI1")]);
        assert!(FieldMapper::new()
            .map_depot_row(&bad_start, &hdr, &mut Vec::new())
            .is_err());

        let bad_finish = row(
            4,
            &[("BUNO", "U1"), ("START DATE", "2020-01-01"), ("FINISH DATE", "soon"), ("TASK", "PMI1")],
        );
        let mut warnings = Vec::new();
        let record = FieldMapper::new()
            .map_depot_row(&bad_finish, &hdr, &mut warnings)
            .unwrap();
        assert!(record.finish_date.is_none());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].field, "FINISH DATE");
    }

    #[test]
    fn test_map_depot_row_empty_start_date_kept() {
        let hdr = headers(&["BUNO", "START DATE", "TASK"]);
        let r = row(6, &[("BUNO", "U1"), ("START DATE", ""), ("TASK", "PMI1")]);
        let record = FieldMapper::new().map_depot_row(&r, &hdr, &mut Vec::new()).unwrap();
        assert!(record.start_date.is_none());
    }

    #[test]
    fn test_map_maf_row() {
        let r = row(
            2,
            &[
                ("Buno", "U1"),
                ("WUC", "030000P"),
                ("Work Center", "20"),
                ("System Reason Description", "546 DAY INSPECTION"),
                ("Received Date", "2024-03-01"),
                ("Jcn", "JCN001"),
            ],
        );
        let record = FieldMapper::new().map_maf_row(&r).unwrap();
        assert_eq!(record.aircraft_id.as_deref(), Some("U1"));
        assert_eq!(record.work_center.as_deref(), Some("20"));
        assert_eq!(record.received_date.as_deref(), Some("2024-03-01"));
        assert!(record.received_date_time.is_none());
        assert_eq!(record.job_control_number.as_deref(), Some("JCN001"));
    }

    #[test]
    fn test_map_flight_hour_row() {
        let hdr = headers(&["Aircraft_BUNO", "AI_Running_Total_Flight_Hours"]);
        let id_col = find_flight_hour_id_column(&hdr).unwrap();
        assert_eq!(id_col, "Aircraft_BUNO");

        let r = row(2, &[("Aircraft_BUNO", "U1"), ("AI_Running_Total_Flight_Hours", "13500")]);
        let obs = FieldMapper::new().map_flight_hour_row(&r, id_col).unwrap();
        assert_eq!(obs.flight_hours, 13500.0);

        let bad = row(3, &[("Aircraft_BUNO", "U2"), ("AI_Running_Total_Flight_Hours", "many")]);
        assert!(FieldMapper::new().map_flight_hour_row(&bad, id_col).is_err());
    }
}
