// ==========================================
// 基地级维修排程系统 - 事件分类器
// ==========================================
// 职责: 换防 / AMARG / 546 天候选判定
// 输入: 历史维修中间记录、MAF 中间记录
// 输出: 打好标记的新记录（不修改输入）
// ==========================================

use crate::config::ScheduleConfigReader;
use crate::domain::defect::{ProcessingStage, RecordDefect};
use crate::domain::record::{Day546CandidateMatch, MaintenanceRecord, RawDepotRecord, RawMafRecord};
use crate::domain::types::RecordSource;

pub const REBASE_TOKEN: &str = "REBASE";
pub const AMARG_TOKEN: &str = "AMARG";

/// 任务文本是否为换防（不区分大小写）
pub fn is_rebase_text(text: Option<&str>) -> bool {
    text.unwrap_or("").to_uppercase().contains(REBASE_TOKEN)
}

/// 所属单位是否为 AMARG（不区分大小写）
pub fn is_amarg_text(text: Option<&str>) -> bool {
    text.unwrap_or("").to_uppercase().contains(AMARG_TOKEN)
}

// ==========================================
// EventClassifier - 历史记录分类
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct EventClassifier;

impl EventClassifier {
    pub fn new() -> Self {
        Self
    }

    /// 打标记: is_rebase / is_amarg_unit
    ///
    /// # 说明
    /// - 返回新记录,chart_visible 保持 true
    pub fn classify(&self, record: MaintenanceRecord) -> MaintenanceRecord {
        let is_rebase = is_rebase_text(Some(&record.task));
        let is_amarg_unit = is_amarg_text(record.unit_assignment.as_deref());
        MaintenanceRecord {
            is_rebase,
            is_amarg_unit,
            ..record
        }
    }

    /// 历史维修中间记录 → 已分类台账记录
    ///
    /// # 返回
    /// - Err(RecordDefect): 航空器编号缺失
    pub fn classify_depot(&self, raw: RawDepotRecord) -> Result<MaintenanceRecord, RecordDefect> {
        let aircraft_id = raw.aircraft_id.ok_or_else(|| {
            RecordDefect::error(
                ProcessingStage::DepotImport,
                Some(raw.row_number),
                None,
                "aircraft_id",
                "航空器编号缺失",
            )
        })?;

        let mut record = MaintenanceRecord::new(
            aircraft_id,
            raw.task.unwrap_or_default(),
            RecordSource::Historical,
        )
        .with_dates(raw.start_date, raw.finish_date);
        record.received_date = raw.received_date;
        record.unit_assignment = raw.unit_assignment;
        record.unit_type = raw.unit_type;
        record.extra = raw.extra.into_iter().map(|(k, v)| (k, Some(v))).collect();
        record.row_number = Some(raw.row_number);

        Ok(self.classify(record))
    }
}

// ==========================================
// Day546Criteria - 546 天候选判定
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Day546Criteria {
    work_unit_code: String,
    work_centers: Vec<String>,
    reason_token: String,
}

impl Day546Criteria {
    pub fn new(work_unit_code: &str, work_centers: &[String], reason_token: &str) -> Self {
        Self {
            work_unit_code: work_unit_code.trim().to_string(),
            work_centers: work_centers.iter().map(|s| s.trim().to_string()).collect(),
            reason_token: reason_token.to_uppercase(),
        }
    }

    pub fn from_config(config: &dyn ScheduleConfigReader) -> Self {
        Self::new(
            &config.day546_work_unit_code(),
            &config.day546_work_centers(),
            &config.day546_reason_token(),
        )
    }

    /// 三个谓词独立判定（缺失字段按空串处理）
    pub fn evaluate(&self, raw: &RawMafRecord) -> Day546CandidateMatch {
        let wuc = raw.work_unit_code.as_deref().unwrap_or("").trim();
        let work_center = raw.work_center.as_deref().unwrap_or("").trim();
        let reason = raw.reason_description.as_deref().unwrap_or("").to_uppercase();

        Day546CandidateMatch {
            work_unit_code_match: wuc == self.work_unit_code,
            work_center_match: self.work_centers.iter().any(|wc| wc == work_center),
            reason_match: reason.contains(&self.reason_token),
        }
    }
}
