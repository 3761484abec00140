// ==========================================
// 基地级维修排程系统 - 维修记录领域模型
// ==========================================
// 职责: 台账记录、导入中间结构体、飞行小时观测、推演状态
// 红线: 记录是值对象,由上一阶段产出、下一阶段消费,不原地修改
// ==========================================

use crate::domain::types::{DateSource, RecordSource};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ==========================================
// MaintenanceRecord - 台账记录
// ==========================================
// 用途: 历史记录与各类推演事件的统一表示
// 字段全集即合并台账的声明列集（额外列放在 extra）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceRecord {
    // ===== 主键 =====
    pub aircraft_id: String,          // 航空器编号（BUNO）
    pub identity_key: Option<String>, // 身份键（去重后唯一）

    // ===== 基础信息 =====
    pub unit_type: Option<String>,       // 机型标签（TMS）
    pub start_date: Option<NaiveDate>,   // 开始日期
    pub finish_date: Option<NaiveDate>,  // 完成日期
    pub received_date: Option<NaiveDate>, // 接收日期（FID）
    pub task: String,                    // 任务代码（PMI1 / 546DAY / SLEP_2 ...）
    pub unit_assignment: Option<String>, // 所属单位（SQD）
    pub source: RecordSource,            // 记录来源

    // ===== 标记 =====
    pub is_rebase: bool,     // 换防事件
    pub is_546_event: bool,  // 546 天事件
    pub is_amarg_unit: bool, // AMARG 封存单位
    pub chart_visible: bool, // 图表可见（默认 true）

    // ===== 财年（派生）=====
    pub fiscal_year: Option<i32>,
    pub fiscal_quarter: Option<u32>,

    // ===== 546 天事件明细 =====
    pub work_unit_code: Option<String>,
    pub work_center: Option<String>,
    pub reason_description: Option<String>,
    pub job_control_number: Option<String>,
    pub material_control_number: Option<String>,
    pub date_source_used: Option<DateSource>,

    // ===== SLEP 明细 =====
    pub flight_hours: Option<f64>,

    // ===== 派生间隔（天）=====
    pub received_to_start_days: Option<i64>,
    pub start_to_finish_days: Option<i64>,

    // ===== 源文件额外列 =====
    pub extra: BTreeMap<String, Option<String>>,

    // 元信息（不导出）
    #[serde(skip)]
    pub row_number: Option<usize>,
}

impl MaintenanceRecord {
    /// 创建记录（标记全部为 false,chart_visible 为 true）
    pub fn new(aircraft_id: impl Into<String>, task: impl Into<String>, source: RecordSource) -> Self {
        Self {
            aircraft_id: aircraft_id.into(),
            identity_key: None,
            unit_type: None,
            start_date: None,
            finish_date: None,
            received_date: None,
            task: task.into(),
            unit_assignment: None,
            source,
            is_rebase: false,
            is_546_event: false,
            is_amarg_unit: false,
            chart_visible: true,
            fiscal_year: None,
            fiscal_quarter: None,
            work_unit_code: None,
            work_center: None,
            reason_description: None,
            job_control_number: None,
            material_control_number: None,
            date_source_used: None,
            flight_hours: None,
            received_to_start_days: None,
            start_to_finish_days: None,
            extra: BTreeMap::new(),
            row_number: None,
        }
    }

    /// 设置起止日期
    pub fn with_dates(mut self, start: Option<NaiveDate>, finish: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.finish_date = finish;
        self
    }

    /// 设置财年/财季
    pub fn with_fiscal(mut self, fiscal_year: Option<i32>, fiscal_quarter: Option<u32>) -> Self {
        self.fiscal_year = fiscal_year;
        self.fiscal_quarter = fiscal_quarter;
        self
    }
}

// ==========================================
// RawDepotRecord - 历史维修导入中间结构体
// ==========================================
// 用途: 文件解析 → 字段映射 → 此结构
// 生命周期: 仅在导入流程内
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawDepotRecord {
    pub aircraft_id: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub finish_date: Option<NaiveDate>,
    pub received_date: Option<NaiveDate>,
    pub task: Option<String>,
    pub unit_assignment: Option<String>,
    pub unit_type: Option<String>,
    pub extra: BTreeMap<String, String>,

    // 元信息
    pub row_number: usize, // 原始文件行号（用于缺陷报告）
}

// ==========================================
// RawMafRecord - MAF 导入中间结构体
// ==========================================
// 日期保持原始文本,由 546 天检测器按优先级逐一尝试解析
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMafRecord {
    pub aircraft_id: Option<String>,
    pub work_unit_code: Option<String>,
    pub work_center: Option<String>,
    pub reason_description: Option<String>,

    pub received_date_time: Option<String>,
    pub received_date: Option<String>,
    pub in_work_date: Option<String>,
    pub completion_date_time: Option<String>,
    pub completion_date: Option<String>,

    pub job_control_number: Option<String>,
    pub material_control_number: Option<String>,

    pub row_number: usize,
}

impl RawMafRecord {
    /// 候选日期（按 DateSource::PRIORITY 顺序）
    pub fn date_candidates(&self) -> [(DateSource, Option<&str>); 5] {
        [
            (DateSource::ReceivedDateTime, self.received_date_time.as_deref()),
            (DateSource::ReceivedDate, self.received_date.as_deref()),
            (DateSource::InWorkDate, self.in_work_date.as_deref()),
            (DateSource::CompletionDateTime, self.completion_date_time.as_deref()),
            (DateSource::CompletionDate, self.completion_date.as_deref()),
        ]
    }
}

// ==========================================
// Day546CandidateMatch - 546 天候选判定
// ==========================================
// 三个独立谓词,全部成立才算 546 天事件
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day546CandidateMatch {
    pub work_unit_code_match: bool, // WUC 精确匹配
    pub work_center_match: bool,    // 工作中心属于固定两种写法
    pub reason_match: bool,         // 原因描述包含 "546"
}

impl Day546CandidateMatch {
    pub fn qualifies(&self) -> bool {
        self.work_unit_code_match && self.work_center_match && self.reason_match
    }
}

// ==========================================
// FlightHourObservation - 飞行小时观测
// ==========================================
// 来源: ML 飞行小时预测（外部提供,不在此计算）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightHourObservation {
    pub aircraft_id: String,
    pub flight_hours: f64,
    pub row_number: usize,
}

// ==========================================
// AircraftProjectionState - 单机推演状态
// ==========================================
// 仅 PMI 推演引擎使用,按航空器从历史记录子集重新派生,不持久化
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftProjectionState {
    pub aircraft_id: String,
    pub last_pmi_task: String,           // 最近一次 PMI 类任务
    pub unit_type: Option<String>,       // 最近一次非空机型标签
    pub last_known_date: NaiveDate,      // 起止日期最大值
    pub unit_assignment: Option<String>, // 截至 last_known_date 的所属单位
    pub amarg_excluded: bool,            // AMARG 排除标记
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_defaults() {
        let record = MaintenanceRecord::new("U1", "PMI1", RecordSource::Historical);
        assert!(record.chart_visible);
        assert!(!record.is_rebase);
        assert!(!record.is_546_event);
        assert!(!record.is_amarg_unit);
        assert!(record.identity_key.is_none());
        assert!(record.fiscal_year.is_none());
    }

    #[test]
    fn test_candidate_match_requires_all_three() {
        let mut m = Day546CandidateMatch {
            work_unit_code_match: true,
            work_center_match: true,
            reason_match: true,
        };
        assert!(m.qualifies());
        m.reason_match = false;
        assert!(!m.qualifies());
    }

    #[test]
    fn test_date_candidates_order() {
        let raw = RawMafRecord {
            received_date: Some("2024-03-01".to_string()),
            completion_date: Some("2024-03-05".to_string()),
            ..Default::default()
        };
        let candidates = raw.date_candidates();
        assert_eq!(candidates[0], (DateSource::ReceivedDateTime, None));
        assert_eq!(candidates[1], (DateSource::ReceivedDate, Some("2024-03-01")));
        assert_eq!(candidates[4], (DateSource::CompletionDate, Some("2024-03-05")));
    }
}
