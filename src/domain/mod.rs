// ==========================================
// 基地级维修排程系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型、缺陷模型
// 红线: 不含文件读写逻辑,不含引擎逻辑
// ==========================================

pub mod defect;
pub mod record;
pub mod types;

// 重导出核心类型
pub use defect::{DefectReport, DefectSummary, DqLevel, ProcessingStage, RecordDefect};
pub use record::{
    AircraftProjectionState, Day546CandidateMatch, FlightHourObservation, MaintenanceRecord,
    RawDepotRecord, RawMafRecord,
};
pub use types::{DateSource, RecordSource, SlepTier};
