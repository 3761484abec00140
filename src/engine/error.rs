// ==========================================
// 基地级维修排程系统 - 引擎层错误类型
// ==========================================
// 说明: 仅承载致命错误（输出前中止）;记录级问题走 RecordDefect
// ==========================================

use crate::importer::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    // ===== 输入错误 =====
    #[error("必需输入缺失: {source_name}（{path}）")]
    MissingInput { source_name: String, path: String },

    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    // ===== 配置错误 =====
    #[error("配置无效 (key: {key}): {message}")]
    InvalidConfig { key: String, message: String },
}

pub type EngineResult<T> = Result<T, EngineError>;
