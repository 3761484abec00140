// ==========================================
// Mock 配置实现 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use depot_schedule::config::{ScheduleConfigReader, SlepThresholds};
use depot_schedule::domain::types::SlepTier;

/// Mock 配置结构
#[derive(Debug, Clone)]
pub struct MockConfig {
    pub projection_end_year: i32,
    pub pmi_interval_months: u32,
    pub pmi_max_iterations: usize,
    pub day546_interval_days: i64,
    pub slep_thresholds: SlepThresholds,
    pub slep_anchor_date: NaiveDate,
    pub slep_spacing_days: i64,
    pub output_version: String,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            projection_end_year: 2052,
            pmi_interval_months: 42,
            pmi_max_iterations: 100,
            day546_interval_days: 546,
            slep_thresholds: SlepThresholds::default(),
            slep_anchor_date: NaiveDate::from_ymd_opt(2020, 7, 1).unwrap(),
            slep_spacing_days: 14,
            output_version: "7.1".to_string(),
        }
    }
}

impl MockConfig {
    /// 短间隔 + 远期截止（用于验证迭代上限）
    pub fn runaway_pmi() -> Self {
        Self {
            projection_end_year: 2400,
            pmi_interval_months: 1,
            ..Self::default()
        }
    }

    pub fn with_end_year(year: i32) -> Self {
        Self {
            projection_end_year: year,
            ..Self::default()
        }
    }
}

impl ScheduleConfigReader for MockConfig {
    fn projection_end_year(&self) -> i32 {
        self.projection_end_year
    }

    fn pmi_interval_months(&self) -> u32 {
        self.pmi_interval_months
    }

    fn pmi_max_iterations(&self) -> usize {
        self.pmi_max_iterations
    }

    fn pmi_finish_offset_days(&self) -> i64 {
        21
    }

    fn day546_interval_days(&self) -> i64 {
        self.day546_interval_days
    }

    fn day546_offset_days(&self) -> i64 {
        21
    }

    fn day546_work_unit_code(&self) -> String {
        "030000P".to_string()
    }

    fn day546_work_centers(&self) -> Vec<String> {
        vec!["020".to_string(), "20".to_string()]
    }

    fn day546_reason_token(&self) -> String {
        "546".to_string()
    }

    fn slep_thresholds(&self) -> SlepThresholds {
        self.slep_thresholds
    }

    fn slep_duration_days(&self, tier: SlepTier) -> i64 {
        match tier {
            SlepTier::MaxAircraftLife => 180,
            _ => 90,
        }
    }

    fn slep_anchor_date(&self) -> NaiveDate {
        self.slep_anchor_date
    }

    fn slep_spacing_days(&self) -> i64 {
        self.slep_spacing_days
    }

    fn output_version(&self) -> String {
        self.output_version.clone()
    }

    fn version_folder_prefix(&self) -> String {
        "depot_schedule_v".to_string()
    }
}
