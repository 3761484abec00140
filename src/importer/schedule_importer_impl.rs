// ==========================================
// 基地级维修排程系统 - 排程输入导入器实现
// ==========================================
// 职责: 整合导入流程,从文件到中间结构体
// 流程: 解析 → 结构校验 → 映射/清洗 → 缺陷汇总
// ==========================================

use crate::config::ScheduleConfigReader;
use crate::domain::defect::DefectReport;
use crate::domain::record::{FlightHourObservation, RawDepotRecord, RawMafRecord};
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::FieldMapper;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::schedule_importer_trait::{ImportBatch, ScheduleImporter};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

// ==========================================
// ScheduleImporterImpl - 排程输入导入器实现
// ==========================================
pub struct ScheduleImporterImpl<'a> {
    // 配置读取器（MAF 预览统计使用 546 天判定参数）
    config: &'a dyn ScheduleConfigReader,

    // 导入组件
    file_parser: UniversalFileParser,
    field_mapper: FieldMapper,
    dq_validator: DqValidator,
}

impl<'a> ScheduleImporterImpl<'a> {
    pub fn new(config: &'a dyn ScheduleConfigReader) -> Self {
        Self {
            config,
            file_parser: UniversalFileParser,
            field_mapper: FieldMapper::new(),
            dq_validator: DqValidator,
        }
    }
}

impl ScheduleImporter for ScheduleImporterImpl<'_> {
    #[instrument(skip(self), fields(file = %file_path.display()))]
    fn import_depot(
        &self,
        file_path: &Path,
        sheet_name: Option<&str>,
    ) -> ImportResult<ImportBatch<RawDepotRecord>> {
        let start_time = Instant::now();
        info!("开始导入历史维修数据");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let table = self.file_parser.parse(file_path, sheet_name)?;
        info!(total_rows = table.rows.len(), "文件解析完成");

        // === 步骤 2: 结构校验（必需列缺失即失败）===
        debug!("步骤 2: 结构校验");
        self.dq_validator.validate_depot_table(&table)?;

        // === 步骤 3: 字段映射 + 清洗 ===
        debug!("步骤 3: 字段映射");
        let mut defects = DefectReport::new();
        let mut records = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            let mut warnings = Vec::new();
            match self.field_mapper.map_depot_row(row, &table.headers, &mut warnings) {
                Ok(record) => records.push(record),
                Err(defect) => defects.record(defect),
            }
            for warning in warnings {
                defects.record(warning);
            }
        }

        info!(
            total = table.rows.len(),
            success = records.len(),
            defects = defects.len(),
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            "历史维修数据导入完成"
        );

        Ok(ImportBatch {
            records,
            headers: table.headers,
            defects,
        })
    }

    #[instrument(skip(self), fields(file = %file_path.display()))]
    fn import_maf(&self, file_path: &Path) -> ImportResult<ImportBatch<RawMafRecord>> {
        info!("开始导入 MAF 数据");

        let table = self.file_parser.parse(file_path, None)?;
        info!(total_rows = table.rows.len(), "文件解析完成");

        self.dq_validator.validate_maf_table(
            &table,
            &self.config.day546_work_unit_code(),
            &self.config.day546_work_centers(),
        )?;

        let mut defects = DefectReport::new();
        let mut records = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            match self.field_mapper.map_maf_row(row) {
                Ok(record) => records.push(record),
                Err(defect) => defects.record(defect),
            }
        }

        info!(
            success = records.len(),
            defects = defects.len(),
            "MAF 数据导入完成"
        );

        Ok(ImportBatch {
            records,
            headers: table.headers,
            defects,
        })
    }

    #[instrument(skip(self), fields(file = %file_path.display()))]
    fn import_flight_hours(
        &self,
        file_path: &Path,
    ) -> ImportResult<Option<ImportBatch<FlightHourObservation>>> {
        if !file_path.exists() {
            warn!("飞行小时文件不存在，SLEP 分析将被跳过");
            return Ok(None);
        }

        // 可选数据源: 解析失败降级,不向上传播
        let table = match self.file_parser.parse(file_path, None) {
            Ok(table) => table,
            Err(e) => {
                warn!(error = %e, "飞行小时文件解析失败，SLEP 分析将被跳过");
                return Ok(None);
            }
        };
        info!(total_rows = table.rows.len(), "飞行小时文件解析完成");

        let id_column = match self.dq_validator.validate_flight_hour_table(&table) {
            Some(col) => col.to_string(),
            None => return Ok(None),
        };

        let mut defects = DefectReport::new();
        let mut records = Vec::with_capacity(table.rows.len());
        for row in &table.rows {
            match self.field_mapper.map_flight_hour_row(row, &id_column) {
                Ok(obs) => records.push(obs),
                Err(defect) => defects.record(defect),
            }
        }

        let unique_aircraft = records
            .iter()
            .map(|r| r.aircraft_id.as_str())
            .collect::<std::collections::HashSet<_>>()
            .len();
        info!(
            success = records.len(),
            unique_aircraft = unique_aircraft,
            defects = defects.len(),
            "飞行小时数据导入完成"
        );

        Ok(Some(ImportBatch {
            records,
            headers: table.headers,
            defects,
        }))
    }
}
