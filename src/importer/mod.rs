// ==========================================
// 基地级维修排程系统 - 导入层
// ==========================================
// 职责: 外部文件导入,生成中间结构体
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod schedule_importer_impl;
pub mod schedule_importer_trait;

// 重导出核心类型
pub use data_cleaner::DataCleaner;
pub use dq_validator::{DqValidator, MafPreview};
pub use error::{ImportError, ImportResult};
pub use field_mapper::FieldMapper;
pub use file_parser::{normalize_column_name, CsvParser, ExcelParser, UniversalFileParser};
pub use schedule_importer_impl::ScheduleImporterImpl;

// 重导出 Trait 接口
pub use schedule_importer_trait::{FileParser, ImportBatch, ParsedRow, ParsedTable, ScheduleImporter};
