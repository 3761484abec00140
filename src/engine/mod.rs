// ==========================================
// 基地级维修排程系统 - 引擎层
// ==========================================
// 职责: 分类、推演、去重、合并等业务规则
// 红线: 引擎不读写文件（run_from_files 仅委托导入层）
// 红线: 所有推演锚点由调用方显式传入,不读系统时钟
// ==========================================

pub mod classifier;
pub mod day546;
pub mod error;
pub mod fiscal;
pub mod key_assignment;
pub mod ledger;
pub mod orchestrator;
pub mod pmi_projection;
pub mod pmi_state_derivation;
pub mod slep;

// 重导出核心引擎
pub use classifier::{is_amarg_text, is_rebase_text, Day546Criteria, EventClassifier};
pub use day546::{Day546Detection, Day546Detector, Day546Projector, DAY546_PROJECTION_TASK, DAY546_TASK};
pub use error::{EngineError, EngineResult};
pub use fiscal::FiscalCalendar;
pub use key_assignment::{base_identity_key, KeyAssigner, KeyAssignment};
pub use ledger::{Ledger, LedgerAssembler, LedgerSchema, LedgerStreams, LedgerSummary, DECLARED_COLUMNS};
pub use orchestrator::{
    DepotScheduleOrchestrator, InputPaths, RunStats, ScheduleInputs, ScheduleRunResult,
    FLIGHT_HOURS_SOURCE,
};
pub use pmi_projection::{toggle_pmi_task, PmiProjection, PmiProjectionEngine};
pub use pmi_state_derivation::PmiStateDerivation;
pub use slep::{classify_tier, SlepEventGenerator, SlepGeneration};
