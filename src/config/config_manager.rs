// ==========================================
// 基地级维修排程系统 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、快照
// 存储: 内存 key-value（默认值 + JSON 文件覆写）
// ==========================================

use crate::config::schedule_config_trait::{ScheduleConfigReader, SlepThresholds};
use crate::domain::types::SlepTier;
use crate::importer::error::{ImportError, ImportResult};
use chrono::NaiveDate;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: HashMap<String, String>,
}

impl ConfigManager {
    /// 创建仅含默认值的 ConfigManager
    pub fn new() -> Self {
        Self::default()
    }

    /// 从 key-value 覆写创建
    pub fn from_map(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// 从 JSON 文件加载覆写（扁平对象,值可为字符串/数字/布尔）
    ///
    /// # 返回
    /// - Err: 文件不存在、JSON 格式错误、顶层不是对象
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> ImportResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// 从 JSON 文本加载覆写
    pub fn from_json_str(raw: &str) -> ImportResult<Self> {
        let parsed: Value = serde_json::from_str(raw).map_err(|e| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: e.to_string(),
        })?;

        let object = parsed.as_object().ok_or_else(|| ImportError::ConfigReadError {
            key: "*".to_string(),
            message: "配置文件顶层必须是 JSON 对象".to_string(),
        })?;

        let mut values = HashMap::new();
        for (key, value) in object {
            let text = match value {
                Value::String(s) => s.clone(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(items) => items
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(","),
                other => {
                    return Err(ImportError::ConfigValueError {
                        key: key.clone(),
                        value: other.to_string(),
                        message: "不支持的配置值类型".to_string(),
                    })
                }
            };
            values.insert(key.clone(), text);
        }

        tracing::info!(overrides = values.len(), "配置覆写加载完成");
        Ok(Self { values })
    }

    /// 设置单个配置值
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// 读取原始配置值
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 读取配置值,缺失或解析失败时回退默认值
    fn get_parsed_or_default<T>(&self, key: &str, default: T) -> T
    where
        T: FromStr,
    {
        match self.values.get(key) {
            None => default,
            Some(raw) => match raw.trim().parse::<T>() {
                Ok(v) => v,
                Err(_) => {
                    tracing::warn!(config_key = key, raw_value = %raw, "配置值格式错误，使用默认值");
                    default
                }
            },
        }
    }

    fn get_string_or_default(&self, key: &str, default: &str) -> String {
        self.values
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| default.to_string())
    }

    fn get_date_or_default(&self, key: &str, default: NaiveDate) -> NaiveDate {
        match self.values.get(key) {
            None => default,
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").unwrap_or_else(|_| {
                tracing::warn!(config_key = key, raw_value = %raw, "配置日期格式错误，使用默认值");
                default
            }),
        }
    }

    /// 获取生效配置快照（JSON）
    ///
    /// # 用途
    /// - 写入运行汇总,保证输出可追溯
    pub fn get_config_snapshot(&self) -> Value {
        config_snapshot(self)
    }
}

/// 任意 ScheduleConfigReader 的生效配置快照
pub fn config_snapshot(config: &dyn ScheduleConfigReader) -> Value {
    let thresholds = config.slep_thresholds();
    json!({
        (config_keys::PROJECTION_END_YEAR): config.projection_end_year(),
        (config_keys::PMI_INTERVAL_MONTHS): config.pmi_interval_months(),
        (config_keys::PMI_MAX_ITERATIONS): config.pmi_max_iterations(),
        (config_keys::PMI_FINISH_OFFSET_DAYS): config.pmi_finish_offset_days(),
        (config_keys::DAY546_INTERVAL_DAYS): config.day546_interval_days(),
        (config_keys::DAY546_OFFSET_DAYS): config.day546_offset_days(),
        (config_keys::DAY546_WORK_UNIT_CODE): config.day546_work_unit_code(),
        (config_keys::DAY546_WORK_CENTERS): config.day546_work_centers(),
        (config_keys::DAY546_REASON_TOKEN): config.day546_reason_token(),
        (config_keys::SLEP_1_HOURS): thresholds.slep_1,
        (config_keys::SLEP_2_HOURS): thresholds.slep_2,
        (config_keys::SLEP_3_HOURS): thresholds.slep_3,
        (config_keys::MAX_LIFE_HOURS): thresholds.max_life,
        (config_keys::SLEP_DURATION_DAYS): config.slep_duration_days(SlepTier::Slep1),
        (config_keys::MAX_LIFE_DURATION_DAYS): config.slep_duration_days(SlepTier::MaxAircraftLife),
        (config_keys::SLEP_ANCHOR_DATE): config.slep_anchor_date().format("%Y-%m-%d").to_string(),
        (config_keys::SLEP_SPACING_DAYS): config.slep_spacing_days(),
        (config_keys::OUTPUT_VERSION): config.output_version(),
        (config_keys::VERSION_FOLDER_PREFIX): config.version_folder_prefix(),
    })
}

// ==========================================
// ScheduleConfigReader Trait 实现
// ==========================================
impl ScheduleConfigReader for ConfigManager {
    fn projection_end_year(&self) -> i32 {
        self.get_parsed_or_default(config_keys::PROJECTION_END_YEAR, 2052)
    }

    fn pmi_interval_months(&self) -> u32 {
        self.get_parsed_or_default(config_keys::PMI_INTERVAL_MONTHS, 42)
    }

    fn pmi_max_iterations(&self) -> usize {
        self.get_parsed_or_default(config_keys::PMI_MAX_ITERATIONS, 100)
    }

    fn pmi_finish_offset_days(&self) -> i64 {
        self.get_parsed_or_default(config_keys::PMI_FINISH_OFFSET_DAYS, 21)
    }

    fn day546_interval_days(&self) -> i64 {
        self.get_parsed_or_default(config_keys::DAY546_INTERVAL_DAYS, 546)
    }

    fn day546_offset_days(&self) -> i64 {
        self.get_parsed_or_default(config_keys::DAY546_OFFSET_DAYS, 21)
    }

    fn day546_work_unit_code(&self) -> String {
        self.get_string_or_default(config_keys::DAY546_WORK_UNIT_CODE, "030000P")
    }

    fn day546_work_centers(&self) -> Vec<String> {
        let value = self.get_string_or_default(config_keys::DAY546_WORK_CENTERS, "020,20");

        let centers: Vec<String> = value
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if centers.is_empty() {
            vec!["020".to_string(), "20".to_string()]
        } else {
            centers
        }
    }

    fn day546_reason_token(&self) -> String {
        self.get_string_or_default(config_keys::DAY546_REASON_TOKEN, "546")
    }

    fn slep_thresholds(&self) -> SlepThresholds {
        let defaults = SlepThresholds::default();
        SlepThresholds {
            slep_1: self.get_parsed_or_default(config_keys::SLEP_1_HOURS, defaults.slep_1),
            slep_2: self.get_parsed_or_default(config_keys::SLEP_2_HOURS, defaults.slep_2),
            slep_3: self.get_parsed_or_default(config_keys::SLEP_3_HOURS, defaults.slep_3),
            max_life: self.get_parsed_or_default(config_keys::MAX_LIFE_HOURS, defaults.max_life),
        }
    }

    fn slep_duration_days(&self, tier: SlepTier) -> i64 {
        match tier {
            SlepTier::MaxAircraftLife => {
                self.get_parsed_or_default(config_keys::MAX_LIFE_DURATION_DAYS, 180)
            }
            SlepTier::Slep1 | SlepTier::Slep2 | SlepTier::Slep3 => {
                self.get_parsed_or_default(config_keys::SLEP_DURATION_DAYS, 90)
            }
        }
    }

    fn slep_anchor_date(&self) -> NaiveDate {
        let default = NaiveDate::from_ymd_opt(2020, 7, 1).unwrap_or(NaiveDate::MIN);
        self.get_date_or_default(config_keys::SLEP_ANCHOR_DATE, default)
    }

    fn slep_spacing_days(&self) -> i64 {
        self.get_parsed_or_default(config_keys::SLEP_SPACING_DAYS, 14)
    }

    fn output_version(&self) -> String {
        self.get_string_or_default(config_keys::OUTPUT_VERSION, "7.1")
    }

    fn version_folder_prefix(&self) -> String {
        self.get_string_or_default(config_keys::VERSION_FOLDER_PREFIX, "depot_schedule_v")
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 推演窗口
    pub const PROJECTION_END_YEAR: &str = "projection_end_year";

    // PMI
    pub const PMI_INTERVAL_MONTHS: &str = "pmi_interval_months";
    pub const PMI_MAX_ITERATIONS: &str = "pmi_max_iterations";
    pub const PMI_FINISH_OFFSET_DAYS: &str = "pmi_finish_offset_days";

    // 546 天事件
    pub const DAY546_INTERVAL_DAYS: &str = "day546_interval_days";
    pub const DAY546_OFFSET_DAYS: &str = "day546_offset_days";
    pub const DAY546_WORK_UNIT_CODE: &str = "day546_work_unit_code";
    pub const DAY546_WORK_CENTERS: &str = "day546_work_centers";
    pub const DAY546_REASON_TOKEN: &str = "day546_reason_token";

    // SLEP
    pub const SLEP_1_HOURS: &str = "slep_1_hours";
    pub const SLEP_2_HOURS: &str = "slep_2_hours";
    pub const SLEP_3_HOURS: &str = "slep_3_hours";
    pub const MAX_LIFE_HOURS: &str = "max_life_hours";
    pub const SLEP_DURATION_DAYS: &str = "slep_duration_days";
    pub const MAX_LIFE_DURATION_DAYS: &str = "max_life_duration_days";
    pub const SLEP_ANCHOR_DATE: &str = "slep_anchor_date";
    pub const SLEP_SPACING_DAYS: &str = "slep_spacing_days";

    // 输出
    pub const OUTPUT_VERSION: &str = "output_version";
    pub const VERSION_FOLDER_PREFIX: &str = "version_folder_prefix";
}
