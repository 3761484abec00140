// ==========================================
// 基地级维修排程系统 - 文件解析器实现
// ==========================================
// 职责: 文件读取 + 列名规范化
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::schedule_importer_trait::{FileParser, ParsedRow, ParsedTable};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 列名规范化: 换行替换为空格,去除首尾空白与 BOM
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .replace(['\n', '\r'], " ")
        .trim()
        .to_string()
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn build_row(headers: &[String], values: Vec<String>, row_number: usize) -> Option<ParsedRow> {
    let mut row_map = HashMap::new();
    for (col_idx, value) in values.into_iter().enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.is_empty() {
                continue;
            }
            row_map.insert(header.clone(), value.trim().to_string());
        }
    }

    // 跳过完全空白的行
    if row_map.values().all(|v| v.is_empty()) {
        return None;
    }

    Some(ParsedRow {
        row_number,
        values: row_map,
    })
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_table(&self, file_path: &Path, _sheet_name: Option<&str>) -> ImportResult<ParsedTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_extension(path);
        if ext != "csv" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(normalize_column_name)
            .collect();

        // 读取所有行（表头为第 1 行）
        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            let record = result?;
            let values = record.iter().map(str::to_string).collect();
            if let Some(row) = build_row(&headers, values, row_idx + 2) {
                rows.push(row);
            }
        }

        tracing::debug!(file = %path.display(), rows = rows.len(), "CSV 解析完成");
        Ok(ParsedTable { headers, rows })
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_table(&self, file_path: &Path, sheet_name: Option<&str>) -> ImportResult<ParsedTable> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        let ext = file_extension(path);
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        // 打开 Excel 文件（按扩展名自动选择 xlsx/xls 读取器）
        let mut workbook = open_workbook_auto(path)?;

        let sheet_names = workbook.sheet_names();
        let target_sheet = match sheet_name {
            Some(name) => {
                if !sheet_names.iter().any(|s| s == name) {
                    return Err(ImportError::ExcelParseError(format!(
                        "工作表不存在: {}（可用: {:?}）",
                        name, sheet_names
                    )));
                }
                name.to_string()
            }
            None => sheet_names
                .first()
                .cloned()
                .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?,
        };

        let range = workbook.worksheet_range(&target_sheet)?;

        // 提取表头（第一行）
        let mut sheet_rows = range.rows();
        let header_row = sheet_rows
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| normalize_column_name(&cell.to_string()))
            .collect();

        // 读取数据行
        let mut rows = Vec::new();
        for (row_idx, data_row) in sheet_rows.enumerate() {
            let values = data_row.iter().map(|cell| cell.to_string()).collect();
            if let Some(row) = build_row(&headers, values, row_idx + 2) {
                rows.push(row);
            }
        }

        tracing::debug!(
            file = %path.display(),
            sheet = %target_sheet,
            rows = rows.len(),
            "Excel 解析完成"
        );
        Ok(ParsedTable { headers, rows })
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(
        &self,
        file_path: P,
        sheet_name: Option<&str>,
    ) -> ImportResult<ParsedTable> {
        let path = file_path.as_ref();

        match file_extension(path).as_str() {
            "csv" => CsvParser.parse_to_table(path, sheet_name),
            "xlsx" | "xls" => ExcelParser.parse_to_table(path, sheet_name),
            other => Err(ImportError::UnsupportedFormat(other.to_string())),
        }
    }
}
