// ==========================================
// 基地级维修排程系统 - 排程配置读取 Trait
// ==========================================
// 职责: 定义引擎所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::domain::types::SlepTier;
use chrono::NaiveDate;

// ==========================================
// SlepThresholds - SLEP 飞行小时阈值
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlepThresholds {
    pub slep_1: f64,
    pub slep_2: f64,
    pub slep_3: f64,
    pub max_life: f64,
}

impl Default for SlepThresholds {
    fn default() -> Self {
        Self {
            slep_1: 10000.0,
            slep_2: 12000.0,
            slep_3: 14000.0,
            max_life: 16000.0,
        }
    }
}

// ==========================================
// ScheduleConfigReader Trait
// ==========================================
// 用途: 引擎所需的配置读取接口
// 实现者: ConfigManager（默认值 + JSON 覆写）、测试 Mock
pub trait ScheduleConfigReader: Send + Sync {
    // ===== 推演窗口 =====

    /// 推演终止年份
    ///
    /// # 默认值
    /// - 2052
    fn projection_end_year(&self) -> i32;

    /// 推演截止日期（终止年份 12 月 31 日）
    ///
    /// # 说明
    /// - 落在截止日期当天或之后的推演步会被丢弃
    fn projection_horizon(&self) -> NaiveDate {
        let year = self.projection_end_year();
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap_or(NaiveDate::MAX)
    }

    // ===== PMI 推演 =====

    /// PMI 间隔（月）,两种变体共用
    ///
    /// # 默认值
    /// - 42
    fn pmi_interval_months(&self) -> u32;

    /// 单机 PMI 推演迭代上限
    ///
    /// # 默认值
    /// - 100
    fn pmi_max_iterations(&self) -> usize;

    /// PMI 推演事件完成日期偏移（天）
    ///
    /// # 默认值
    /// - 21
    fn pmi_finish_offset_days(&self) -> i64;

    // ===== 546 天事件 =====

    /// 546 天事件推演步长（天）
    ///
    /// # 默认值
    /// - 546
    fn day546_interval_days(&self) -> i64;

    /// 546 天事件完成日期偏移（天）
    ///
    /// # 默认值
    /// - 21
    fn day546_offset_days(&self) -> i64;

    /// 546 天事件 WUC（精确匹配）
    ///
    /// # 默认值
    /// - "030000P"
    fn day546_work_unit_code(&self) -> String;

    /// 546 天事件工作中心（补零与不补零两种写法）
    ///
    /// # 默认值
    /// - ["020", "20"]
    fn day546_work_centers(&self) -> Vec<String>;

    /// 原因描述中需包含的子串
    ///
    /// # 默认值
    /// - "546"
    fn day546_reason_token(&self) -> String;

    // ===== SLEP =====

    /// SLEP 飞行小时阈值
    ///
    /// # 默认值
    /// - 10000 / 12000 / 14000 / 16000
    fn slep_thresholds(&self) -> SlepThresholds;

    /// 指定等级的工期（天）
    ///
    /// # 默认值
    /// - SLEP_1..3 = 90, MAX_AIRCRAFT_LIFE = 180
    fn slep_duration_days(&self, tier: SlepTier) -> i64;

    /// SLEP 排程锚点日期
    ///
    /// # 默认值
    /// - 2020-07-01
    fn slep_anchor_date(&self) -> NaiveDate;

    /// SLEP 事件间隔（天）
    ///
    /// # 默认值
    /// - 14
    fn slep_spacing_days(&self) -> i64;

    // ===== 输出 =====

    /// 输出版本号（用于版本目录与文件名后缀）
    ///
    /// # 默认值
    /// - "7.1"
    fn output_version(&self) -> String;

    /// 版本目录前缀
    ///
    /// # 默认值
    /// - "depot_schedule_v"
    fn version_folder_prefix(&self) -> String;
}
