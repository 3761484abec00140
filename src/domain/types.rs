// ==========================================
// 基地级维修排程系统 - 领域类型定义
// ==========================================
// 职责: 记录来源、SLEP 等级、MAF 日期来源等枚举
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 记录来源 (Record Source)
// ==========================================
// 台账合并时五条事件流各自的来源标记
// 序列化格式: snake_case (与导出文件一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    Historical,    // 历史维修记录
    PmiProjection, // PMI 推演
    #[serde(rename = "546_historical")]
    Day546Historical, // 546 天历史事件（MAF 检出）
    #[serde(rename = "546_projection")]
    Day546Projection, // 546 天推演
    Slep,          // 延寿（SLEP）事件
}

impl RecordSource {
    /// 全部来源（按合并顺序）
    pub const ALL: [RecordSource; 5] = [
        RecordSource::Historical,
        RecordSource::PmiProjection,
        RecordSource::Day546Historical,
        RecordSource::Day546Projection,
        RecordSource::Slep,
    ];

    /// 导出文件使用的字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordSource::Historical => "historical",
            RecordSource::PmiProjection => "pmi_projection",
            RecordSource::Day546Historical => "546_historical",
            RecordSource::Day546Projection => "546_projection",
            RecordSource::Slep => "slep",
        }
    }
}

impl fmt::Display for RecordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// SLEP 等级 (SLEP Tier)
// ==========================================
// 顺序: Slep1 < Slep2 < Slep3 < MaxAircraftLife
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SlepTier {
    #[serde(rename = "SLEP_1")]
    Slep1,
    #[serde(rename = "SLEP_2")]
    Slep2,
    #[serde(rename = "SLEP_3")]
    Slep3,
    MaxAircraftLife,
}

impl SlepTier {
    /// 任务代码（写入 task 字段）
    pub fn task_code(&self) -> &'static str {
        match self {
            SlepTier::Slep1 => "SLEP_1",
            SlepTier::Slep2 => "SLEP_2",
            SlepTier::Slep3 => "SLEP_3",
            SlepTier::MaxAircraftLife => "MAX_AIRCRAFT_LIFE",
        }
    }
}

impl fmt::Display for SlepTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.task_code())
    }
}

// ==========================================
// MAF 日期来源 (Date Source)
// ==========================================
// 546 天事件起始日期的候选字段,按优先级从高到低声明
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DateSource {
    ReceivedDateTime,
    ReceivedDate,
    InWorkDate,
    CompletionDateTime,
    CompletionDate,
}

impl DateSource {
    /// 优先级顺序（最具体的时间戳优先,完工日期兜底）
    pub const PRIORITY: [DateSource; 5] = [
        DateSource::ReceivedDateTime,
        DateSource::ReceivedDate,
        DateSource::InWorkDate,
        DateSource::CompletionDateTime,
        DateSource::CompletionDate,
    ];

    /// 源文件列名
    pub fn column_name(&self) -> &'static str {
        match self {
            DateSource::ReceivedDateTime => "Received Date Time",
            DateSource::ReceivedDate => "Received Date",
            DateSource::InWorkDate => "In Work Date",
            DateSource::CompletionDateTime => "Comp Date Time",
            DateSource::CompletionDate => "Comp Date",
        }
    }
}

impl fmt::Display for DateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.column_name())
    }
}
