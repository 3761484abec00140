// ==========================================
// 基地级维修排程系统 - 数据缺陷模型
// ==========================================
// 职责: 记录级缺陷描述 + 批次汇总
// 红线: 记录级缺陷不得中断批处理,只能被记录与汇总
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ==========================================
// DqLevel - 缺陷级别
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DqLevel {
    Error,   // 记录被剔除
    Warning, // 记录保留,字段降级
    Info,    // 仅记录
}

// ==========================================
// ProcessingStage - 处理阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStage {
    DepotImport,
    MafImport,
    FlightHourImport,
    FiscalCalendar,
    Day546Detection,
    Day546Projection,
    SlepGeneration,
    PmiProjection,
    KeyAssignment,
    LedgerAssembly,
}

impl fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProcessingStage::DepotImport => "depot_import",
            ProcessingStage::MafImport => "maf_import",
            ProcessingStage::FlightHourImport => "flight_hour_import",
            ProcessingStage::FiscalCalendar => "fiscal_calendar",
            ProcessingStage::Day546Detection => "day546_detection",
            ProcessingStage::Day546Projection => "day546_projection",
            ProcessingStage::SlepGeneration => "slep_generation",
            ProcessingStage::PmiProjection => "pmi_projection",
            ProcessingStage::KeyAssignment => "key_assignment",
            ProcessingStage::LedgerAssembly => "ledger_assembly",
        };
        write!(f, "{}", s)
    }
}

// ==========================================
// RecordDefect - 记录级缺陷
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordDefect {
    pub stage: ProcessingStage,      // 发生阶段
    pub row_number: Option<usize>,   // 原始文件行号
    pub aircraft_id: Option<String>, // 航空器编号（如果可解析）
    pub level: DqLevel,              // 缺陷级别
    pub field: String,               // 缺陷字段
    pub message: String,             // 缺陷描述
}

impl RecordDefect {
    /// 创建 Error 级缺陷（记录被剔除）
    pub fn error(
        stage: ProcessingStage,
        row_number: Option<usize>,
        aircraft_id: Option<&str>,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            stage,
            row_number,
            aircraft_id: aircraft_id.map(str::to_string),
            level: DqLevel::Error,
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 创建 Warning 级缺陷（记录保留）
    pub fn warning(
        stage: ProcessingStage,
        row_number: Option<usize>,
        aircraft_id: Option<&str>,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: DqLevel::Warning,
            ..Self::error(stage, row_number, aircraft_id, field, message)
        }
    }

    /// 创建 Info 级缺陷
    pub fn info(
        stage: ProcessingStage,
        row_number: Option<usize>,
        aircraft_id: Option<&str>,
        field: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            level: DqLevel::Info,
            ..Self::error(stage, row_number, aircraft_id, field, message)
        }
    }
}

impl fmt::Display for RecordDefect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {:?} 行={} 航空器={} 字段={}: {}",
            self.stage,
            self.level,
            self.row_number.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
            self.aircraft_id.as_deref().unwrap_or("-"),
            self.field,
            self.message
        )
    }
}

// ==========================================
// DefectReport - 缺陷汇总
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefectReport {
    pub defects: Vec<RecordDefect>,
    pub skipped_sources: Vec<String>, // 降级跳过的可选数据源
}

impl DefectReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录缺陷（同时输出 warn 日志）
    pub fn record(&mut self, defect: RecordDefect) {
        tracing::warn!(
            stage = %defect.stage,
            row_number = ?defect.row_number,
            aircraft_id = ?defect.aircraft_id,
            field = %defect.field,
            "{}",
            defect.message
        );
        self.defects.push(defect);
    }

    /// 合并另一份报告
    pub fn merge(&mut self, other: DefectReport) {
        self.defects.extend(other.defects);
        self.skipped_sources.extend(other.skipped_sources);
    }

    /// 标记被跳过的可选数据源
    pub fn skip_source(&mut self, source: impl Into<String>) {
        let source = source.into();
        tracing::warn!(source = %source, "可选数据源缺失或格式错误，跳过对应阶段");
        self.skipped_sources.push(source);
    }

    pub fn is_empty(&self) -> bool {
        self.defects.is_empty() && self.skipped_sources.is_empty()
    }

    pub fn len(&self) -> usize {
        self.defects.len()
    }

    /// 指定阶段的缺陷数量
    pub fn count_for_stage(&self, stage: ProcessingStage) -> usize {
        self.defects.iter().filter(|d| d.stage == stage).count()
    }

    /// 指定级别的缺陷数量
    pub fn count_for_level(&self, level: DqLevel) -> usize {
        self.defects.iter().filter(|d| d.level == level).count()
    }

    /// 按阶段统计
    pub fn summary(&self) -> DefectSummary {
        let mut by_stage: BTreeMap<String, usize> = BTreeMap::new();
        for defect in &self.defects {
            *by_stage.entry(defect.stage.to_string()).or_insert(0) += 1;
        }

        DefectSummary {
            total: self.defects.len(),
            errors: self.count_for_level(DqLevel::Error),
            warnings: self.count_for_level(DqLevel::Warning),
            infos: self.count_for_level(DqLevel::Info),
            by_stage,
            skipped_sources: self.skipped_sources.clone(),
        }
    }
}

// ==========================================
// DefectSummary - 缺陷统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefectSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
    pub by_stage: BTreeMap<String, usize>,
    pub skipped_sources: Vec<String>,
}
