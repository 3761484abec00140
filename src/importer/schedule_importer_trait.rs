// ==========================================
// 基地级维修排程系统 - 导入 Trait
// ==========================================
// 职责: 定义三类输入的导入接口（不包含实现）
// 红线: 致命错误返回 Err,记录级问题写入 DefectReport
// ==========================================

use crate::domain::defect::DefectReport;
use crate::domain::record::{FlightHourObservation, RawDepotRecord, RawMafRecord};
use crate::importer::error::ImportResult;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// ParsedTable - 文件解析结果
// ==========================================
// 表头保持原始列顺序（已规范化）,行按文件顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedTable {
    pub headers: Vec<String>,
    pub rows: Vec<ParsedRow>,
}

// ==========================================
// ParsedRow - 单行解析结果
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRow {
    pub row_number: usize, // 文件行号（表头为第 1 行）
    pub values: HashMap<String, String>,
}

impl ParsedTable {
    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// 列是否完全为空
    pub fn column_is_empty(&self, column: &str) -> bool {
        self.rows.iter().all(|row| {
            row.values
                .get(column)
                .map(|v| v.trim().is_empty())
                .unwrap_or(true)
        })
    }
}

// ==========================================
// ImportBatch - 单个数据源的导入结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ImportBatch<T> {
    pub records: Vec<T>,
    pub headers: Vec<String>, // 源文件列（规范化后）
    pub defects: DefectReport,
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为表格
    ///
    /// # 参数
    /// - file_path: 文件路径
    /// - sheet_name: 工作表名（仅 Excel,None 取第一个工作表）
    ///
    /// # 返回
    /// - Ok(ParsedTable): 跳过完全空白的行
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_table(&self, file_path: &Path, sheet_name: Option<&str>)
        -> ImportResult<ParsedTable>;
}

// ==========================================
// ScheduleImporter Trait
// ==========================================
// 用途: 排程输入导入主接口
// 实现者: ScheduleImporterImpl
pub trait ScheduleImporter: Send + Sync {
    /// 导入历史维修记录（必需）
    ///
    /// # 返回
    /// - Err: 文件缺失、缺少必需列（BUNO / START DATE / TASK）
    fn import_depot(
        &self,
        file_path: &Path,
        sheet_name: Option<&str>,
    ) -> ImportResult<ImportBatch<RawDepotRecord>>;

    /// 导入 MAF 记录（必需）
    ///
    /// # 返回
    /// - Err: 文件缺失、缺少必需列（Buno / WUC / Work Center / System Reason Description）
    fn import_maf(&self, file_path: &Path) -> ImportResult<ImportBatch<RawMafRecord>>;

    /// 导入飞行小时预测（可选）
    ///
    /// # 返回
    /// - Ok(None): 文件缺失或结构不符,降级跳过 SLEP 阶段
    fn import_flight_hours(
        &self,
        file_path: &Path,
    ) -> ImportResult<Option<ImportBatch<FlightHourObservation>>>;
}
