// ==========================================
// 基地级维修排程系统 - SLEP 事件生成器
// ==========================================
// 职责: 飞行小时 → SLEP 等级 → 排程事件
// 输入: 飞行小时观测、起始计数器
// 输出: SLEP 台账记录 + 下一个计数器值
// 红线: 计数器显式传递,每生成一个事件自增一次
// ==========================================

use crate::config::{ScheduleConfigReader, SlepThresholds};
use crate::domain::defect::{DefectReport, ProcessingStage, RecordDefect};
use crate::domain::record::{FlightHourObservation, MaintenanceRecord};
use crate::domain::types::{RecordSource, SlepTier};
use crate::engine::fiscal::{offset_days, FiscalCalendar};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, instrument};

/// 按阈值从高到低判定等级
///
/// # 规则
/// - >= max_life → MAX_AIRCRAFT_LIFE
/// - >= slep_3 → SLEP_3
/// - >= slep_2 → SLEP_2
/// - >= slep_1 → SLEP_1
/// - 否则无事件
pub fn classify_tier(flight_hours: f64, thresholds: &SlepThresholds) -> Option<SlepTier> {
    if flight_hours >= thresholds.max_life {
        Some(SlepTier::MaxAircraftLife)
    } else if flight_hours >= thresholds.slep_3 {
        Some(SlepTier::Slep3)
    } else if flight_hours >= thresholds.slep_2 {
        Some(SlepTier::Slep2)
    } else if flight_hours >= thresholds.slep_1 {
        Some(SlepTier::Slep1)
    } else {
        None
    }
}

// ==========================================
// SlepGeneration - 生成结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct SlepGeneration {
    pub events: Vec<MaintenanceRecord>,
    pub next_counter: u32,
    pub tier_counts: BTreeMap<SlepTier, usize>,
    pub below_threshold: usize,
    pub defects: DefectReport,
}

// ==========================================
// SlepEventGenerator - SLEP 事件生成器
// ==========================================
pub struct SlepEventGenerator<'a> {
    config: &'a dyn ScheduleConfigReader,
    calendar: FiscalCalendar,
}

impl<'a> SlepEventGenerator<'a> {
    pub fn new(config: &'a dyn ScheduleConfigReader) -> Self {
        Self {
            config,
            calendar: FiscalCalendar::new(),
        }
    }

    /// 同一航空器多条观测合并为一条
    ///
    /// # 规则
    /// - 保留首次出现的位置
    /// - 取最大飞行小时
    pub fn collapse_observations(&self, observations: &[FlightHourObservation]) -> Vec<FlightHourObservation> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut collapsed: Vec<FlightHourObservation> = Vec::new();

        for obs in observations {
            match index.get(obs.aircraft_id.as_str()) {
                Some(&pos) => {
                    if obs.flight_hours > collapsed[pos].flight_hours {
                        collapsed[pos].flight_hours = obs.flight_hours;
                    }
                }
                None => {
                    index.insert(obs.aircraft_id.as_str(), collapsed.len());
                    collapsed.push(obs.clone());
                }
            }
        }

        collapsed
    }

    /// 生成单个事件
    ///
    /// # 参数
    /// - counter: 当前计数器值（开始日期 = 锚点 + counter × 间隔天数）
    ///
    /// # 返回
    /// - Ok(None): 低于最低阈值
    /// - Err(RecordDefect): 日期计算溢出
    pub fn generate_one(
        &self,
        obs: &FlightHourObservation,
        counter: u32,
    ) -> Result<Option<(SlepTier, MaintenanceRecord)>, RecordDefect> {
        let tier = match classify_tier(obs.flight_hours, &self.config.slep_thresholds()) {
            Some(tier) => tier,
            None => return Ok(None),
        };

        let spacing = self.config.slep_spacing_days() * i64::from(counter);
        let duration = self.config.slep_duration_days(tier);
        let overflow = || {
            RecordDefect::error(
                ProcessingStage::SlepGeneration,
                Some(obs.row_number),
                Some(&obs.aircraft_id),
                "start_date",
                format!("SLEP 日期计算溢出 (counter={})", counter),
            )
        };

        let start = offset_days(self.config.slep_anchor_date(), spacing).ok_or_else(overflow)?;
        let finish = offset_days(start, duration).ok_or_else(overflow)?;
        let (fiscal_year, fiscal_quarter) = self.calendar.fiscal_pair(Some(start));

        let mut event = MaintenanceRecord::new(&obs.aircraft_id, tier.task_code(), RecordSource::Slep)
            .with_dates(Some(start), Some(finish))
            .with_fiscal(fiscal_year, fiscal_quarter);
        event.flight_hours = Some(obs.flight_hours);
        event.row_number = Some(obs.row_number);

        Ok(Some((tier, event)))
    }

    /// 批量生成
    ///
    /// # 参数
    /// - observations: 飞行小时观测（输入顺序决定计数器顺序）
    /// - start_counter: 起始计数器值
    ///
    /// # 返回
    /// - SlepGeneration.next_counter: 最后一个事件之后的计数器值
    #[instrument(skip(self, observations), fields(observations = observations.len()))]
    pub fn generate(&self, observations: &[FlightHourObservation], start_counter: u32) -> SlepGeneration {
        let mut result = SlepGeneration {
            next_counter: start_counter,
            ..Default::default()
        };

        for obs in self.collapse_observations(observations) {
            match self.generate_one(&obs, result.next_counter) {
                Ok(Some((tier, event))) => {
                    *result.tier_counts.entry(tier).or_insert(0) += 1;
                    result.events.push(event);
                    result.next_counter += 1;
                }
                Ok(None) => result.below_threshold += 1,
                Err(defect) => result.defects.record(defect),
            }
        }

        for (tier, count) in &result.tier_counts {
            info!(tier = %tier, count, duration_days = self.config.slep_duration_days(*tier), "SLEP 等级统计");
        }
        info!(
            total = result.events.len(),
            below_threshold = result.below_threshold,
            next_counter = result.next_counter,
            "SLEP 事件生成完成"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use chrono::NaiveDate;

    fn obs(id: &str, hours: f64, row: usize) -> FlightHourObservation {
        FlightHourObservation {
            aircraft_id: id.to_string(),
            flight_hours: hours,
            row_number: row,
        }
    }

    #[test]
    fn test_classify_tier_boundaries() {
        let t = SlepThresholds::default();
        assert_eq!(classify_tier(9999.9, &t), None);
        assert_eq!(classify_tier(10000.0, &t), Some(SlepTier::Slep1));
        assert_eq!(classify_tier(11999.0, &t), Some(SlepTier::Slep1));
        assert_eq!(classify_tier(12000.0, &t), Some(SlepTier::Slep2));
        assert_eq!(classify_tier(14000.0, &t), Some(SlepTier::Slep3));
        assert_eq!(classify_tier(15999.9, &t), Some(SlepTier::Slep3));
        assert_eq!(classify_tier(16000.0, &t), Some(SlepTier::MaxAircraftLife));
    }

    #[test]
    fn test_counter_spacing_and_durations() {
        let config = ConfigManager::new();
        let generator = SlepEventGenerator::new(&config);

        let observations = vec![
            obs("A", 10500.0, 2),
            obs("B", 5000.0, 3), // 低于阈值,不占计数器
            obs("C", 16500.0, 4),
            obs("D", 13500.0, 5),
        ];

        let result = generator.generate(&observations, 0);
        assert_eq!(result.events.len(), 3);
        assert_eq!(result.next_counter, 3);
        assert_eq!(result.below_threshold, 1);

        let anchor = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap();
        assert_eq!(result.events[0].start_date, Some(anchor));
        assert_eq!(result.events[1].task, "MAX_AIRCRAFT_LIFE");
        assert_eq!(
            result.events[1].finish_date.unwrap() - result.events[1].start_date.unwrap(),
            chrono::Duration::days(180)
        );
        assert_eq!(result.events[2].start_date, NaiveDate::from_ymd_opt(2020, 7, 29));
        assert_eq!(result.events[2].flight_hours, Some(13500.0));
        assert_eq!(result.tier_counts.get(&SlepTier::Slep2), Some(&1));
    }

    #[test]
    fn test_start_counter_is_threaded() {
        let config = ConfigManager::new();
        let generator = SlepEventGenerator::new(&config);

        let first = generator.generate(&[obs("A", 12000.0, 2)], 5);
        assert_eq!(first.next_counter, 6);
        assert_eq!(first.events[0].start_date, NaiveDate::from_ymd_opt(2020, 9, 9));

        let second = generator.generate(&[obs("B", 12000.0, 2)], first.next_counter);
        assert_eq!(second.events[0].start_date, NaiveDate::from_ymd_opt(2020, 9, 23));
    }

    #[test]
    fn test_duplicate_observations_collapse_to_max() {
        let config = ConfigManager::new();
        let generator = SlepEventGenerator::new(&config);

        let observations = vec![obs("A", 11000.0, 2), obs("B", 12500.0, 3), obs("A", 14500.0, 4)];
        let result = generator.generate(&observations, 0);

        assert_eq!(result.events.len(), 2);
        assert_eq!(result.events[0].aircraft_id, "A");
        assert_eq!(result.events[0].task, "SLEP_3");
        assert_eq!(result.events[1].aircraft_id, "B");
    }
}
