// ==========================================
// 基地级维修排程系统 - PMI 推演引擎
// ==========================================
// 职责: 按航空器派生状态并向前生成交替的 PMI 事件
// 输入: 已分类的历史记录
// 输出: PMI 推演台账记录
// 红线: AMARG 航空器不得出现在推演结果中;单机迭代有硬上限
// ==========================================

use crate::config::ScheduleConfigReader;
use crate::domain::defect::DefectReport;
use crate::domain::record::{AircraftProjectionState, MaintenanceRecord};
use crate::domain::types::RecordSource;
use crate::engine::fiscal::{offset_days, offset_months, FiscalCalendar};
use crate::engine::pmi_state_derivation::PmiStateDerivation;
use std::collections::HashMap;
use tracing::{debug, info, instrument};

// 每处理 N 架航空器输出一次进度
const PROGRESS_EVERY: usize = 50;

/// PMI 变体切换
///
/// # 规则
/// - 含 '1': 首个 '1' → '2'
/// - 否则: 首个 '2' → '1'
/// - 两者都不含: 原样返回
pub fn toggle_pmi_task(task: &str) -> String {
    if task.contains('1') {
        task.replacen('1', "2", 1)
    } else {
        task.replacen('2', "1", 1)
    }
}

// ==========================================
// PmiProjection - 推演结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct PmiProjection {
    pub events: Vec<MaintenanceRecord>,
    pub aircraft_total: usize,
    pub aircraft_projected: usize,
    pub aircraft_amarg_excluded: usize,
    pub defects: DefectReport,
}

// ==========================================
// PmiProjectionEngine - PMI 推演引擎
// ==========================================
pub struct PmiProjectionEngine<'a> {
    config: &'a dyn ScheduleConfigReader,
    calendar: FiscalCalendar,
    derivation: PmiStateDerivation,
}

impl<'a> PmiProjectionEngine<'a> {
    pub fn new(config: &'a dyn ScheduleConfigReader) -> Self {
        Self {
            config,
            calendar: FiscalCalendar::new(),
            derivation: PmiStateDerivation::new(),
        }
    }

    /// 单机推演
    ///
    /// # 规则
    /// - 间隔固定（两种变体相同）
    /// - 下一日期落在截止日期当天或之后即终止
    /// - 迭代次数不超过配置上限
    pub fn project_state(&self, state: &AircraftProjectionState) -> Vec<MaintenanceRecord> {
        if state.amarg_excluded {
            return Vec::new();
        }

        let interval = self.config.pmi_interval_months();
        let finish_offset = self.config.pmi_finish_offset_days();
        let max_iterations = self.config.pmi_max_iterations();
        let horizon = self.config.projection_horizon();

        let mut events = Vec::new();
        let mut current_date = state.last_known_date;
        let mut current_task = toggle_pmi_task(&state.last_pmi_task);
        let mut iterations = 0;

        while current_date < horizon && iterations < max_iterations {
            iterations += 1;

            let next_date = match offset_months(current_date, interval) {
                Some(d) if d < horizon => d,
                _ => break,
            };

            let finish_date = offset_days(next_date, finish_offset).unwrap_or(next_date);
            let (fiscal_year, fiscal_quarter) = self.calendar.fiscal_pair(Some(next_date));

            let mut event = MaintenanceRecord::new(
                &state.aircraft_id,
                current_task.as_str(),
                RecordSource::PmiProjection,
            )
            .with_dates(Some(next_date), Some(finish_date))
            .with_fiscal(fiscal_year, fiscal_quarter);
            event.unit_type = state.unit_type.clone();
            events.push(event);

            current_task = toggle_pmi_task(&current_task);
            current_date = next_date;
        }

        debug!(
            aircraft_id = %state.aircraft_id,
            events = events.len(),
            iterations,
            "PMI 单机推演完成"
        );
        events
    }

    /// 全量推演（按航空器首次出现顺序）
    #[instrument(skip(self, historical), fields(records = historical.len()))]
    pub fn project_all(&self, historical: &[MaintenanceRecord]) -> PmiProjection {
        let mut order: Vec<&str> = Vec::new();
        let mut groups: HashMap<&str, Vec<&MaintenanceRecord>> = HashMap::new();
        for record in historical {
            groups
                .entry(record.aircraft_id.as_str())
                .or_insert_with(|| {
                    order.push(record.aircraft_id.as_str());
                    Vec::new()
                })
                .push(record);
        }

        let mut result = PmiProjection {
            aircraft_total: order.len(),
            ..Default::default()
        };

        for (i, aircraft_id) in order.iter().enumerate() {
            if (i + 1) % PROGRESS_EVERY == 0 {
                info!(processed = i + 1, total = order.len(), "PMI 推演进度");
            }

            let history = groups.get(aircraft_id).map(Vec::as_slice).unwrap_or(&[]);
            let state = match self.derivation.derive(aircraft_id, history) {
                Ok(state) => state,
                Err(defect) => {
                    result.defects.record(defect);
                    continue;
                }
            };

            if state.amarg_excluded {
                info!(aircraft_id = %aircraft_id, "AMARG 航空器，跳过 PMI 推演");
                result.aircraft_amarg_excluded += 1;
                continue;
            }

            let events = self.project_state(&state);
            if !events.is_empty() {
                result.aircraft_projected += 1;
            }
            result.events.extend(events);
        }

        info!(
            aircraft = result.aircraft_total,
            projected = result.aircraft_projected,
            amarg_excluded = result.aircraft_amarg_excluded,
            events = result.events.len(),
            "PMI 推演完成"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{config_keys, ConfigManager};
    use chrono::NaiveDate;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn state(task: &str, last: NaiveDate) -> AircraftProjectionState {
        AircraftProjectionState {
            aircraft_id: "U1".to_string(),
            last_pmi_task: task.to_string(),
            unit_type: Some("MH-60R".to_string()),
            last_known_date: last,
            unit_assignment: Some("HSM-41".to_string()),
            amarg_excluded: false,
        }
    }

    #[test]
    fn test_toggle_pmi_task() {
        assert_eq!(toggle_pmi_task("PMI1"), "PMI2");
        assert_eq!(toggle_pmi_task("PMI2"), "PMI1");
        assert_eq!(toggle_pmi_task("PMI-1 (11)"), "PMI-2 (11)");
        assert_eq!(toggle_pmi_task("PMI"), "PMI");
        for task in ["PMI1", "PMI2", "PMI-2A", "1PMI"] {
            assert_eq!(toggle_pmi_task(&toggle_pmi_task(task)), task);
        }
    }

    #[test]
    fn test_first_projected_event() {
        let config = ConfigManager::new();
        let engine = PmiProjectionEngine::new(&config);

        let events = engine.project_state(&state("PMI1", ymd(2020, 1, 1)));
        let first = &events[0];
        assert_eq!(first.task, "PMI2");
        assert_eq!(first.start_date, Some(ymd(2023, 7, 1)));
        assert_eq!(first.finish_date, Some(ymd(2023, 7, 22)));
        assert_eq!(first.fiscal_year, Some(2023));
        assert_eq!(first.fiscal_quarter, Some(4));
        assert_eq!(first.unit_type.as_deref(), Some("MH-60R"));
        assert!(first.unit_assignment.is_none());
        assert_eq!(first.source, RecordSource::PmiProjection);

        // 变体交替
        assert_eq!(events[1].task, "PMI1");
        assert_eq!(events[1].start_date, Some(ymd(2027, 1, 1)));
        assert!(events.iter().all(|e| e.start_date.unwrap() < config.projection_horizon()));
    }

    #[test]
    fn test_iteration_cap() {
        let mut config = ConfigManager::new();
        config.set(config_keys::PMI_INTERVAL_MONTHS, "1");
        config.set(config_keys::PROJECTION_END_YEAR, "2200");
        let engine = PmiProjectionEngine::new(&config);

        let events = engine.project_state(&state("PMI1", ymd(2020, 1, 1)));
        assert_eq!(events.len(), 100);

        // 间隔为 0 时不推进日期,由迭代上限终止
        config.set(config_keys::PMI_INTERVAL_MONTHS, "0");
        let engine = PmiProjectionEngine::new(&config);
        assert!(engine.project_state(&state("PMI1", ymd(2020, 1, 1))).len() <= 100);
    }

    #[test]
    fn test_amarg_state_never_projects() {
        let config = ConfigManager::new();
        let engine = PmiProjectionEngine::new(&config);
        let mut s = state("PMI1", ymd(2020, 1, 1));
        s.amarg_excluded = true;
        assert!(engine.project_state(&s).is_empty());
    }

    #[test]
    fn test_project_all_groups_by_aircraft() {
        let config = ConfigManager::new();
        let engine = PmiProjectionEngine::new(&config);

        let mut u1 = MaintenanceRecord::new("U1", "PMI1", RecordSource::Historical)
            .with_dates(Some(ymd(2020, 1, 1)), None);
        u1.unit_assignment = Some("HSM-41".to_string());
        let mut u2 = MaintenanceRecord::new("U2", "PMI2", RecordSource::Historical)
            .with_dates(Some(ymd(2021, 1, 1)), None);
        u2.is_amarg_unit = true;
        let u3 = MaintenanceRecord::new("U3", "REBASE", RecordSource::Historical)
            .with_dates(Some(ymd(2021, 1, 1)), None);

        let result = engine.project_all(&[u1, u2, u3]);
        assert_eq!(result.aircraft_total, 3);
        assert_eq!(result.aircraft_projected, 1);
        assert_eq!(result.aircraft_amarg_excluded, 1);
        assert_eq!(result.defects.len(), 1);
        assert!(result.events.iter().all(|e| e.aircraft_id == "U1"));
    }
}
