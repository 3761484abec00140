// ==========================================
// 基地级维修排程系统 - 546 天事件检测与推演
// ==========================================
// 职责: 从 MAF 记录检测历史 546 天事件 + 按航空器推演未来事件
// 输入: MAF 中间记录、推演锚点日期（显式注入）
// 输出: 546DAY / 546DAY_PROJ 台账记录
// 红线: 不读取系统时间;推演结果只取决于锚点与配置
// ==========================================

use crate::config::ScheduleConfigReader;
use crate::domain::defect::{DefectReport, ProcessingStage, RecordDefect};
use crate::domain::record::{MaintenanceRecord, RawMafRecord};
use crate::domain::types::{DateSource, RecordSource};
use crate::engine::classifier::{is_rebase_text, Day546Criteria};
use crate::engine::fiscal::{offset_days, FiscalCalendar};
use crate::importer::data_cleaner::DataCleaner;
use chrono::NaiveDate;
use std::collections::HashSet;
use tracing::{info, instrument, warn};

pub const DAY546_TASK: &str = "546DAY";
pub const DAY546_PROJECTION_TASK: &str = "546DAY_PROJ";

// ==========================================
// Day546Detection - 检测结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Day546Detection {
    pub events: Vec<MaintenanceRecord>,
    pub seed_aircraft: Vec<String>, // 推演种子（按首次出现顺序,含无日期行）
    pub qualifying_rows: usize,     // 三谓词全部成立的行数
    pub defects: DefectReport,
}

// ==========================================
// Day546Detector - 546 天事件检测器
// ==========================================
pub struct Day546Detector<'a> {
    config: &'a dyn ScheduleConfigReader,
    criteria: Day546Criteria,
    calendar: FiscalCalendar,
    cleaner: DataCleaner,
}

impl<'a> Day546Detector<'a> {
    pub fn new(config: &'a dyn ScheduleConfigReader) -> Self {
        Self {
            config,
            criteria: Day546Criteria::from_config(config),
            calendar: FiscalCalendar::new(),
            cleaner: DataCleaner,
        }
    }

    /// 按优先级选取开始日期
    ///
    /// # 规则
    /// - Received Date Time > Received Date > In Work Date > Comp Date Time > Comp Date
    /// - 取第一个可解析的字段
    pub fn resolve_start_date(&self, raw: &RawMafRecord) -> Option<(NaiveDate, DateSource)> {
        raw.date_candidates()
            .into_iter()
            .find_map(|(source, value)| {
                value
                    .and_then(|v| self.cleaner.parse_flexible_date(v))
                    .map(|date| (date, source))
            })
    }

    /// 完成日期 = 开始日期 + 偏移天数
    ///
    /// # 说明
    /// - 日期溢出时回退为开始日期并告警
    pub fn finish_date(&self, start: NaiveDate, aircraft_id: &str) -> NaiveDate {
        let offset = self.config.day546_offset_days();
        offset_days(start, offset).unwrap_or_else(|| {
            warn!(aircraft_id, start = %start, offset, "完成日期计算失败，回退为开始日期");
            start
        })
    }

    /// 检测单行
    ///
    /// # 返回
    /// - Ok(None): 不满足 546 天判定
    /// - Ok(Some(event)): 历史 546 天事件
    /// - Err(RecordDefect): 满足判定但五个候选日期均无法解析
    pub fn detect_row(&self, raw: &RawMafRecord) -> Result<Option<MaintenanceRecord>, RecordDefect> {
        if !self.criteria.evaluate(raw).qualifies() {
            return Ok(None);
        }

        let aircraft_id = raw.aircraft_id.as_deref().ok_or_else(|| {
            RecordDefect::error(
                ProcessingStage::Day546Detection,
                Some(raw.row_number),
                None,
                "aircraft_id",
                "546 天事件缺少航空器编号",
            )
        })?;

        let (start, date_source) = self.resolve_start_date(raw).ok_or_else(|| {
            RecordDefect::error(
                ProcessingStage::Day546Detection,
                Some(raw.row_number),
                Some(aircraft_id),
                "start_date",
                "546 天事件无可解析日期",
            )
        })?;

        let finish = self.finish_date(start, aircraft_id);
        let (fiscal_year, fiscal_quarter) = self.calendar.fiscal_pair(Some(start));

        let mut event = MaintenanceRecord::new(aircraft_id, DAY546_TASK, RecordSource::Day546Historical)
            .with_dates(Some(start), Some(finish))
            .with_fiscal(fiscal_year, fiscal_quarter);
        event.is_546_event = true;
        event.is_rebase = is_rebase_text(raw.reason_description.as_deref());
        event.work_unit_code = raw.work_unit_code.clone();
        event.work_center = raw.work_center.clone();
        event.reason_description = raw.reason_description.clone();
        event.job_control_number = raw.job_control_number.clone();
        event.material_control_number = raw.material_control_number.clone();
        event.date_source_used = Some(date_source);
        event.row_number = Some(raw.row_number);

        Ok(Some(event))
    }

    /// 批量检测
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub fn detect(&self, rows: &[RawMafRecord]) -> Day546Detection {
        let mut result = Day546Detection::default();
        let mut seen = HashSet::new();

        for raw in rows {
            if self.criteria.evaluate(raw).qualifies() {
                result.qualifying_rows += 1;
                if let Some(id) = raw.aircraft_id.as_deref() {
                    if seen.insert(id.to_string()) {
                        result.seed_aircraft.push(id.to_string());
                    }
                }
            }

            match self.detect_row(raw) {
                Ok(Some(event)) => result.events.push(event),
                Ok(None) => {}
                Err(defect) => result.defects.record(defect),
            }
        }

        info!(
            qualifying = result.qualifying_rows,
            with_dates = result.events.len(),
            date_issues = result.defects.len(),
            aircraft = result.seed_aircraft.len(),
            "546 天事件检测完成"
        );
        result
    }
}

// ==========================================
// Day546Projector - 546 天事件推演器
// ==========================================
pub struct Day546Projector<'a> {
    config: &'a dyn ScheduleConfigReader,
    calendar: FiscalCalendar,
}

impl<'a> Day546Projector<'a> {
    pub fn new(config: &'a dyn ScheduleConfigReader) -> Self {
        Self {
            config,
            calendar: FiscalCalendar::new(),
        }
    }

    /// 单机推演
    ///
    /// # 规则
    /// - 从锚点日期起每次前进 interval 天
    /// - 落在截止日期当天或之后的步丢弃并终止
    /// - 完成日期 = 步日期 + offset 天
    pub fn project_aircraft(&self, aircraft_id: &str, as_of: NaiveDate) -> Vec<MaintenanceRecord> {
        let interval = self.config.day546_interval_days();
        let offset = self.config.day546_offset_days();
        let horizon = self.config.projection_horizon();

        if interval <= 0 {
            warn!(aircraft_id, interval, "546 天推演间隔非正，跳过推演");
            return Vec::new();
        }

        let mut events = Vec::new();
        let mut current = as_of;
        while current < horizon {
            let next = match offset_days(current, interval) {
                Some(next) if next < horizon => next,
                _ => break,
            };

            let finish = offset_days(next, offset).unwrap_or(next);
            let (fiscal_year, fiscal_quarter) = self.calendar.fiscal_pair(Some(next));

            let mut event = MaintenanceRecord::new(
                aircraft_id,
                DAY546_PROJECTION_TASK,
                RecordSource::Day546Projection,
            )
            .with_dates(Some(next), Some(finish))
            .with_fiscal(fiscal_year, fiscal_quarter);
            event.is_546_event = true;

            events.push(event);
            current = next;
        }

        events
    }

    /// 批量推演（按种子顺序输出）
    #[instrument(skip(self, seed_aircraft), fields(aircraft = seed_aircraft.len(), as_of = %as_of))]
    pub fn project(&self, seed_aircraft: &[String], as_of: NaiveDate) -> Vec<MaintenanceRecord> {
        let events: Vec<MaintenanceRecord> = seed_aircraft
            .iter()
            .flat_map(|id| self.project_aircraft(id, as_of))
            .collect();

        info!(count = events.len(), "546 天事件推演完成");
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_keys, ConfigManager};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn qualifying_row(id: &str) -> RawMafRecord {
        RawMafRecord {
            aircraft_id: Some(id.to_string()),
            work_unit_code: Some("030000P".to_string()),
            work_center: Some("20".to_string()),
            reason_description: Some("546 DAY INSPECTION".to_string()),
            row_number: 2,
            ..Default::default()
        }
    }

    #[test]
    fn test_detect_row_uses_received_date() {
        let config = ConfigManager::new();
        let detector = Day546Detector::new(&config);

        let raw = RawMafRecord {
            received_date: Some("2024-03-01".to_string()),
            completion_date: Some("2024-04-10".to_string()),
            job_control_number: Some("JCN42".to_string()),
            ..qualifying_row("U1")
        };

        let event = detector.detect_row(&raw).unwrap().unwrap();
        assert_eq!(event.start_date, Some(ymd(2024, 3, 1)));
        assert_eq!(event.finish_date, Some(ymd(2024, 3, 22)));
        assert_eq!(event.fiscal_year, Some(2024));
        assert_eq!(event.fiscal_quarter, Some(2));
        assert_eq!(event.task, DAY546_TASK);
        assert_eq!(event.source, RecordSource::Day546Historical);
        assert_eq!(event.date_source_used, Some(DateSource::ReceivedDate));
        assert_eq!(event.job_control_number.as_deref(), Some("JCN42"));
        assert!(event.is_546_event);
        assert!(!event.is_rebase);
    }

    #[test]
    fn test_date_priority_skips_unparseable_candidates() {
        let config = ConfigManager::new();
        let detector = Day546Detector::new(&config);

        let raw = RawMafRecord {
            received_date_time: Some("garbage".to_string()),
            in_work_date: Some("2024-05-02".to_string()),
            completion_date: Some("2024-06-01".to_string()),
            ..qualifying_row("U1")
        };

        let (date, source) = detector.resolve_start_date(&raw).unwrap();
        assert_eq!(date, ymd(2024, 5, 2));
        assert_eq!(source, DateSource::InWorkDate);
    }

    #[test]
    fn test_finish_is_always_start_plus_offset() {
        let config = ConfigManager::new();
        let detector = Day546Detector::new(&config);

        for date in ["2023-12-20", "2024-02-28", "2024-12-31", "1/15/2021"] {
            let raw = RawMafRecord {
                received_date: Some(date.to_string()),
                ..qualifying_row("U1")
            };
            let event = detector.detect_row(&raw).unwrap().unwrap();
            let delta = event.finish_date.unwrap() - event.start_date.unwrap();
            assert_eq!(delta.num_days(), 21, "date={}", date);
        }
    }

    #[test]
    fn test_rebase_reason_sets_flag() {
        let config = ConfigManager::new();
        let detector = Day546Detector::new(&config);
        let raw = RawMafRecord {
            reason_description: Some("546 day rebase insp".to_string()),
            received_date: Some("2024-03-01".to_string()),
            ..qualifying_row("U1")
        };
        assert!(detector.detect_row(&raw).unwrap().unwrap().is_rebase);
    }

    #[test]
    fn test_detect_drops_dateless_rows_but_keeps_seed() {
        let config = ConfigManager::new();
        let detector = Day546Detector::new(&config);

        let rows = vec![
            RawMafRecord {
                received_date: Some("2024-03-01".to_string()),
                ..qualifying_row("U1")
            },
            qualifying_row("U2"),
            RawMafRecord {
                work_unit_code: Some("999999X".to_string()),
                received_date: Some("2024-03-01".to_string()),
                ..qualifying_row("U3")
            },
        ];

        let detection = detector.detect(&rows);
        assert_eq!(detection.qualifying_rows, 2);
        assert_eq!(detection.events.len(), 1);
        assert_eq!(detection.defects.len(), 1);
        assert_eq!(detection.seed_aircraft, vec!["U1".to_string(), "U2".to_string()]);
    }

    #[test]
    fn test_projection_steps_and_horizon() {
        let mut config = ConfigManager::new();
        config.set(config_keys::PROJECTION_END_YEAR, "2027");
        let projector = Day546Projector::new(&config);

        let as_of = ymd(2024, 1, 1);
        let events = projector.project_aircraft("U1", as_of);

        // 2024-01-01 + 546 = 2025-06-30, + 546 = 2026-12-28, 下一步超出 2027-12-31
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].start_date, Some(ymd(2025, 6, 30)));
        assert_eq!(events[0].finish_date, Some(ymd(2025, 7, 21)));
        assert_eq!(events[1].start_date, Some(ymd(2026, 12, 28)));
        assert!(events.iter().all(|e| e.task == DAY546_PROJECTION_TASK));
        assert!(events.iter().all(|e| e.is_546_event));
        assert!(events
            .iter()
            .all(|e| e.start_date.unwrap() < config.projection_horizon()));
    }

    #[test]
    fn test_projection_is_reproducible_for_same_anchor() {
        let config = ConfigManager::new();
        let projector = Day546Projector::new(&config);
        let seeds = vec!["U1".to_string(), "U2".to_string()];

        let a = projector.project(&seeds, ymd(2025, 1, 1));
        let b = projector.project(&seeds, ymd(2025, 1, 1));
        assert_eq!(a, b);
        assert_eq!(a[0].aircraft_id, "U1");
    }

    #[test]
    fn test_projection_anchor_past_horizon_yields_nothing() {
        let config = ConfigManager::new();
        let projector = Day546Projector::new(&config);
        assert!(projector.project_aircraft("U1", ymd(2053, 1, 1)).is_empty());
    }
}
