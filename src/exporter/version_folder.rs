// ==========================================
// 基地级维修排程系统 - 版本目录管理
// ==========================================
// 职责: 输出根目录下的 <前缀><版本> 目录（已存在则复用）
// ==========================================

use crate::config::ScheduleConfigReader;
use crate::exporter::error::{ExportError, ExportResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 版本号 → 文件名后缀（"7.1" → "v7_1"）
pub fn version_suffix(version: &str) -> String {
    format!("v{}", version.trim().replace('.', "_"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionFolder {
    pub path: PathBuf,
    pub version: String,
}

impl VersionFolder {
    /// 准备版本目录
    ///
    /// # 参数
    /// - output_root: 输出根目录
    /// - config: 提供版本号与目录前缀
    pub fn prepare(output_root: &Path, config: &dyn ScheduleConfigReader) -> ExportResult<Self> {
        let version = config.output_version();
        let path = output_root.join(format!("{}{}", config.version_folder_prefix(), version));

        if path.is_dir() {
            info!(folder = %path.display(), "使用已存在的版本目录");
        } else {
            fs::create_dir_all(&path).map_err(|e| ExportError::OutputDirError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
            info!(folder = %path.display(), "已创建版本目录");
        }

        Ok(Self { path, version })
    }

    /// 目录内带版本后缀的文件路径
    ///
    /// # 示例
    /// - ("combined_aircraft_data", "csv") → <目录>/combined_aircraft_data_v7_1.csv
    pub fn file_path(&self, stem: &str, extension: &str) -> PathBuf {
        self.path
            .join(format!("{}_{}.{}", stem, version_suffix(&self.version), extension))
    }
}
