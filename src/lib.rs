// ==========================================
// 基地级维修排程系统 - 核心库
// ==========================================
// 职责: 历史维修 + MAF + 飞行小时 → 统一维修台账
// 形态: 单线程批处理,无持久化
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 配置层 - 推演参数
pub mod config;

// 导入层 - 外部文件
pub mod importer;

// 引擎层 - 业务规则
pub mod engine;

// 导出层 - CSV / 汇总
pub mod exporter;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    DateSource, DefectReport, FlightHourObservation, MaintenanceRecord, RawDepotRecord,
    RawMafRecord, RecordDefect, RecordSource, SlepTier,
};

// 配置
pub use config::{ConfigManager, ScheduleConfigReader};

// 引擎
pub use engine::{
    DepotScheduleOrchestrator, EngineError, FiscalCalendar, InputPaths, Ledger, ScheduleInputs,
    ScheduleRunResult,
};

// 导出
pub use exporter::{ExportError, ScheduleExporter};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "基地级维修排程系统";
