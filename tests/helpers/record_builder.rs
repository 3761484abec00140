// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use depot_schedule::domain::record::{
    FlightHourObservation, MaintenanceRecord, RawDepotRecord, RawMafRecord,
};
use depot_schedule::domain::types::RecordSource;
use std::io::Write;
use tempfile::NamedTempFile;

pub fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// 写入带扩展名的临时 CSV
pub fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

pub fn flight_hours(aircraft_id: &str, hours: f64, row_number: usize) -> FlightHourObservation {
    FlightHourObservation {
        aircraft_id: aircraft_id.to_string(),
        flight_hours: hours,
        row_number,
    }
}

// ==========================================
// RawDepotRecord 构建器
// ==========================================
pub struct DepotBuilder {
    record: RawDepotRecord,
}

impl DepotBuilder {
    pub fn new(aircraft_id: &str, task: &str) -> Self {
        Self {
            record: RawDepotRecord {
                aircraft_id: Some(aircraft_id.to_string()),
                task: Some(task.to_string()),
                row_number: 2,
                ..Default::default()
            },
        }
    }

    pub fn start(mut self, date: NaiveDate) -> Self {
        self.record.start_date = Some(date);
        self
    }

    pub fn finish(mut self, date: NaiveDate) -> Self {
        self.record.finish_date = Some(date);
        self
    }

    pub fn squadron(mut self, sqd: &str) -> Self {
        self.record.unit_assignment = Some(sqd.to_string());
        self
    }

    pub fn unit_type(mut self, tms: &str) -> Self {
        self.record.unit_type = Some(tms.to_string());
        self
    }

    pub fn row(mut self, row_number: usize) -> Self {
        self.record.row_number = row_number;
        self
    }

    pub fn build(self) -> RawDepotRecord {
        self.record
    }
}

// ==========================================
// RawMafRecord 构建器
// ==========================================
pub struct MafBuilder {
    record: RawMafRecord,
}

impl MafBuilder {
    /// 三项判定全部成立的 546 天候选行
    pub fn qualifying(aircraft_id: &str) -> Self {
        Self {
            record: RawMafRecord {
                aircraft_id: Some(aircraft_id.to_string()),
                work_unit_code: Some("030000P".to_string()),
                work_center: Some("20".to_string()),
                reason_description: Some("546 DAY INSPECTION".to_string()),
                row_number: 2,
                ..Default::default()
            },
        }
    }

    pub fn work_center(mut self, wc: &str) -> Self {
        self.record.work_center = Some(wc.to_string());
        self
    }

    pub fn reason(mut self, reason: &str) -> Self {
        self.record.reason_description = Some(reason.to_string());
        self
    }

    pub fn received_date(mut self, value: &str) -> Self {
        self.record.received_date = Some(value.to_string());
        self
    }

    pub fn completion_date(mut self, value: &str) -> Self {
        self.record.completion_date = Some(value.to_string());
        self
    }

    pub fn row(mut self, row_number: usize) -> Self {
        self.record.row_number = row_number;
        self
    }

    pub fn build(self) -> RawMafRecord {
        self.record
    }
}

/// 历史台账记录
pub fn history(aircraft_id: &str, task: &str, start: NaiveDate) -> MaintenanceRecord {
    MaintenanceRecord::new(aircraft_id, task, RecordSource::Historical).with_dates(Some(start), None)
}
