// ==========================================
// 基地级维修排程系统 - 单机推演状态派生
// ==========================================
// 职责: 从航空器历史记录派生 PMI 推演状态
// 输入: 单机历史记录（原始顺序）
// 输出: AircraftProjectionState / 跳过原因
// ==========================================

use crate::domain::defect::{ProcessingStage, RecordDefect};
use crate::domain::record::{AircraftProjectionState, MaintenanceRecord};
use crate::engine::classifier::is_amarg_text;
use chrono::NaiveDate;

pub const PMI_TOKEN: &str = "PMI";

/// 排序键: 开始日期（缺失最小）,同日取后出现的行
fn recency_key(index: usize, record: &MaintenanceRecord) -> (Option<NaiveDate>, usize) {
    (record.start_date, index)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PmiStateDerivation;

impl PmiStateDerivation {
    pub fn new() -> Self {
        Self
    }

    /// 最近一次 PMI 类任务
    pub fn last_pmi_task(&self, history: &[&MaintenanceRecord]) -> Option<String> {
        history
            .iter()
            .enumerate()
            .filter(|(_, r)| r.task.to_uppercase().contains(PMI_TOKEN))
            .max_by_key(|(idx, r)| recency_key(*idx, r))
            .map(|(_, r)| r.task.clone())
    }

    /// 最近一次非空机型标签
    pub fn last_unit_type(&self, history: &[&MaintenanceRecord]) -> Option<String> {
        history
            .iter()
            .enumerate()
            .filter(|(_, r)| r.unit_type.is_some())
            .max_by_key(|(idx, r)| recency_key(*idx, r))
            .and_then(|(_, r)| r.unit_type.clone())
    }

    /// 起止日期最大值
    pub fn last_known_date(&self, history: &[&MaintenanceRecord]) -> Option<NaiveDate> {
        history
            .iter()
            .flat_map(|r| [r.start_date, r.finish_date])
            .flatten()
            .max()
    }

    /// 截至 last_date 的所属单位
    ///
    /// # 规则
    /// 1. 首条开始日期等于 last_date 的记录,其所属单位非空则取之
    /// 2. 否则取最近一条非空所属单位
    pub fn last_unit_assignment(
        &self,
        history: &[&MaintenanceRecord],
        last_date: NaiveDate,
    ) -> Option<String> {
        let on_last_date = history
            .iter()
            .find(|r| r.start_date == Some(last_date))
            .and_then(|r| r.unit_assignment.clone());
        if on_last_date.is_some() {
            return on_last_date;
        }

        history
            .iter()
            .enumerate()
            .filter(|(_, r)| r.unit_assignment.is_some())
            .max_by_key(|(idx, r)| recency_key(*idx, r))
            .and_then(|(_, r)| r.unit_assignment.clone())
    }

    /// 派生单机推演状态
    ///
    /// # 返回
    /// - Err(RecordDefect): 无 PMI 类任务或无任何日期,航空器跳过
    pub fn derive(
        &self,
        aircraft_id: &str,
        history: &[&MaintenanceRecord],
    ) -> Result<AircraftProjectionState, RecordDefect> {
        let last_pmi_task = self.last_pmi_task(history).ok_or_else(|| {
            RecordDefect::info(
                ProcessingStage::PmiProjection,
                None,
                Some(aircraft_id),
                "task",
                "无 PMI 任务，跳过推演",
            )
        })?;

        let unit_type = self.last_unit_type(history);

        let last_known_date = self.last_known_date(history).ok_or_else(|| {
            RecordDefect::warning(
                ProcessingStage::PmiProjection,
                None,
                Some(aircraft_id),
                "start_date",
                "无有效日期，跳过推演",
            )
        })?;

        let unit_assignment = self.last_unit_assignment(history, last_known_date);
        let amarg_excluded = is_amarg_text(unit_assignment.as_deref())
            || history.iter().any(|r| r.is_amarg_unit);

        Ok(AircraftProjectionState {
            aircraft_id: aircraft_id.to_string(),
            last_pmi_task,
            unit_type,
            last_known_date,
            unit_assignment,
            amarg_excluded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::RecordSource;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn rec(task: &str, start: Option<NaiveDate>, finish: Option<NaiveDate>, sqd: Option<&str>) -> MaintenanceRecord {
        let mut r = MaintenanceRecord::new("U1", task, RecordSource::Historical).with_dates(start, finish);
        r.unit_assignment = sqd.map(str::to_string);
        r
    }

    #[test]
    fn test_last_pmi_prefers_latest_start_then_later_row() {
        let a = rec("PMI1", Some(ymd(2020, 1, 1)), None, None);
        let b = rec("PMI2", Some(ymd(2021, 1, 1)), None, None);
        let c = rec("pmi1", Some(ymd(2021, 1, 1)), None, None);
        let d = rec("REBASE", Some(ymd(2022, 1, 1)), None, None);
        let history = vec![&a, &b, &c, &d];

        assert_eq!(PmiStateDerivation::new().last_pmi_task(&history), Some("pmi1".to_string()));
    }

    #[test]
    fn test_last_known_date_includes_finish() {
        let a = rec("PMI1", Some(ymd(2020, 1, 1)), Some(ymd(2020, 6, 1)), None);
        let b = rec("X", None, None, None);
        let history = vec![&a, &b];
        assert_eq!(PmiStateDerivation::new().last_known_date(&history), Some(ymd(2020, 6, 1)));
    }

    #[test]
    fn test_unit_assignment_falls_back_to_latest_non_null() {
        let a = rec("PMI1", Some(ymd(2019, 1, 1)), None, Some("VFA-106"));
        let b = rec("PMI2", Some(ymd(2020, 1, 1)), None, Some("VFA-32"));
        let c = rec("PMI1", Some(ymd(2021, 1, 1)), None, None);
        let history = vec![&a, &b, &c];

        let derivation = PmiStateDerivation::new();
        assert_eq!(
            derivation.last_unit_assignment(&history, ymd(2021, 1, 1)),
            Some("VFA-32".to_string())
        );
        assert_eq!(
            derivation.last_unit_assignment(&history, ymd(2019, 1, 1)),
            Some("VFA-106".to_string())
        );
    }

    #[test]
    fn test_derive_skips_without_pmi_or_dates() {
        let derivation = PmiStateDerivation::new();

        let a = rec("REBASE", Some(ymd(2020, 1, 1)), None, None);
        assert!(derivation.derive("U1", &[&a]).is_err());

        let b = rec("PMI1", None, None, None);
        let defect = derivation.derive("U1", &[&b]).unwrap_err();
        assert_eq!(defect.field, "start_date");
    }

    #[test]
    fn test_derive_amarg_exclusion() {
        let derivation = PmiStateDerivation::new();

        let a = rec("PMI1", Some(ymd(2020, 1, 1)), None, Some("AMARG Storage"));
        assert!(derivation.derive("U1", &[&a]).unwrap().amarg_excluded);

        let mut flagged = rec("PMI1", Some(ymd(2019, 1, 1)), None, None);
        flagged.is_amarg_unit = true;
        let later = rec("PMI2", Some(ymd(2020, 1, 1)), None, Some("VFA-106"));
        let state = derivation.derive("U1", &[&flagged, &later]).unwrap();
        assert_eq!(state.unit_assignment.as_deref(), Some("VFA-106"));
        assert!(state.amarg_excluded);
    }
}
