// ==========================================
// 基地级维修排程系统 - 配置层
// ==========================================
// 职责: 排程常量与阈值的读取,支持 JSON 覆写
// 存储: 内存 key-value（默认值兜底）
// ==========================================

pub mod config_manager;
pub mod schedule_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, config_snapshot, ConfigManager};
pub use schedule_config_trait::{ScheduleConfigReader, SlepThresholds};
