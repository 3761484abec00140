// ==========================================
// 基地级维修排程系统 - 引擎编排器
// ==========================================
// 职责: 协调各阶段引擎的执行顺序
// 流程: 历史分类 → PMI 推演 → 546 检测/推演 → SLEP → 台账合并
// 红线: 记录级缺陷不得中断批处理;致命错误必须在输出前返回
// ==========================================

use crate::config::{config_keys, ScheduleConfigReader};
use crate::domain::defect::DefectReport;
use crate::domain::record::{FlightHourObservation, MaintenanceRecord, RawDepotRecord, RawMafRecord};
use crate::engine::classifier::EventClassifier;
use crate::engine::day546::{Day546Detector, Day546Projector};
use crate::engine::error::{EngineError, EngineResult};
use crate::engine::ledger::{Ledger, LedgerAssembler, LedgerStreams};
use crate::engine::pmi_projection::PmiProjectionEngine;
use crate::engine::slep::SlepEventGenerator;
use crate::importer::{ScheduleImporter, ScheduleImporterImpl};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info, info_span, warn};
use uuid::Uuid;

/// 飞行小时数据源名（降级时写入 DefectReport）
pub const FLIGHT_HOURS_SOURCE: &str = "flight_hours";

// ==========================================
// ScheduleInputs - 内存输入
// ==========================================
#[derive(Debug, Clone)]
pub struct ScheduleInputs {
    pub historical: Vec<RawDepotRecord>,
    pub maf: Vec<RawMafRecord>,
    pub flight_hours: Option<Vec<FlightHourObservation>>, // None = 可选数据源降级
    pub as_of: NaiveDate,                                 // 546 天推演锚点
    pub slep_start_counter: u32,                          // SLEP 间隔计数起点
    pub input_defects: DefectReport,                      // 导入阶段缺陷
}

impl ScheduleInputs {
    pub fn new(historical: Vec<RawDepotRecord>, maf: Vec<RawMafRecord>, as_of: NaiveDate) -> Self {
        Self {
            historical,
            maf,
            flight_hours: None,
            as_of,
            slep_start_counter: 0,
            input_defects: DefectReport::new(),
        }
    }

    pub fn with_flight_hours(mut self, observations: Vec<FlightHourObservation>) -> Self {
        self.flight_hours = Some(observations);
        self
    }
}

// ==========================================
// InputPaths - 文件输入
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub depot: PathBuf,
    pub maf: PathBuf,
    pub flight_hours: Option<PathBuf>,
    pub depot_sheet: Option<String>,
}

// ==========================================
// RunStats - 各阶段统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunStats {
    pub historical_records: usize,
    pub pmi_projected_records: usize,
    pub pmi_aircraft_projected: usize,
    pub pmi_aircraft_amarg_excluded: usize,
    pub day546_qualifying_rows: usize,
    pub day546_events: usize,
    pub day546_projections: usize,
    pub slep_events: usize,
    pub slep_tier_counts: BTreeMap<String, usize>,
    pub slep_next_counter: u32,
    pub duplicate_key_groups: usize,
    pub elapsed_ms: u64,
}

// ==========================================
// ScheduleRunResult - 单次运行结果
// ==========================================
#[derive(Debug, Clone)]
pub struct ScheduleRunResult {
    pub run_id: Uuid,
    pub as_of: NaiveDate,
    pub ledger: Ledger,
    pub defects: DefectReport,
    pub stats: RunStats,
}

// ==========================================
// DepotScheduleOrchestrator - 引擎编排器
// ==========================================
pub struct DepotScheduleOrchestrator<'a> {
    config: &'a dyn ScheduleConfigReader,
    classifier: EventClassifier,
    day546_detector: Day546Detector<'a>,
    day546_projector: Day546Projector<'a>,
    slep_generator: SlepEventGenerator<'a>,
    pmi_engine: PmiProjectionEngine<'a>,
    assembler: LedgerAssembler,
}

impl<'a> DepotScheduleOrchestrator<'a> {
    /// 创建编排器
    ///
    /// # 参数
    /// - config: 配置读取器
    pub fn new(config: &'a dyn ScheduleConfigReader) -> Self {
        Self {
            config,
            classifier: EventClassifier::new(),
            day546_detector: Day546Detector::new(config),
            day546_projector: Day546Projector::new(config),
            slep_generator: SlepEventGenerator::new(config),
            pmi_engine: PmiProjectionEngine::new(config),
            assembler: LedgerAssembler::new(),
        }
    }

    /// 推演参数校验（非正间隔会导致推演不终止）
    pub fn validate_config(&self) -> EngineResult<()> {
        if self.config.pmi_interval_months() == 0 {
            return Err(EngineError::InvalidConfig {
                key: config_keys::PMI_INTERVAL_MONTHS.to_string(),
                message: "PMI 间隔必须大于 0".to_string(),
            });
        }
        if self.config.day546_interval_days() <= 0 {
            return Err(EngineError::InvalidConfig {
                key: config_keys::DAY546_INTERVAL_DAYS.to_string(),
                message: "546 天推演间隔必须大于 0".to_string(),
            });
        }
        if self.config.slep_spacing_days() < 0 {
            return Err(EngineError::InvalidConfig {
                key: config_keys::SLEP_SPACING_DAYS.to_string(),
                message: "SLEP 间隔天数不能为负".to_string(),
            });
        }
        Ok(())
    }

    /// 执行完整排程流程
    ///
    /// # 参数
    /// - inputs: 已导入的三路输入与推演锚点
    ///
    /// # 返回
    /// - Ok(ScheduleRunResult): 台账 + 缺陷汇总 + 阶段统计
    /// - Err(EngineError): 配置无效
    pub fn run(&self, inputs: ScheduleInputs) -> EngineResult<ScheduleRunResult> {
        let run_id = Uuid::new_v4();
        let span = info_span!("schedule_run", run_id = %run_id, as_of = %inputs.as_of);
        let _guard = span.enter();
        self.run_in_span(run_id, inputs)
    }

    fn run_in_span(&self, run_id: Uuid, inputs: ScheduleInputs) -> EngineResult<ScheduleRunResult> {
        let start_time = Instant::now();
        self.validate_config()?;

        let ScheduleInputs {
            historical,
            maf,
            flight_hours,
            as_of,
            slep_start_counter,
            input_defects,
        } = inputs;

        info!(
            historical = historical.len(),
            maf = maf.len(),
            flight_hours = flight_hours.as_ref().map(Vec::len),
            "开始执行排程流程"
        );

        let mut defects = input_defects;
        let mut stats = RunStats::default();

        // ==========================================
        // 步骤1: 历史记录分类
        // ==========================================
        debug!("步骤1: 历史记录分类");
        let mut classified: Vec<MaintenanceRecord> = Vec::with_capacity(historical.len());
        for raw in historical {
            match self.classifier.classify_depot(raw) {
                Ok(record) => classified.push(record),
                Err(defect) => defects.record(defect),
            }
        }
        stats.historical_records = classified.len();
        info!(
            records = classified.len(),
            rebase = classified.iter().filter(|r| r.is_rebase).count(),
            amarg = classified.iter().filter(|r| r.is_amarg_unit).count(),
            "历史记录分类完成"
        );

        // ==========================================
        // 步骤2: PMI 推演
        // ==========================================
        debug!("步骤2: PMI 推演");
        let pmi = self.pmi_engine.project_all(&classified);
        stats.pmi_projected_records = pmi.events.len();
        stats.pmi_aircraft_projected = pmi.aircraft_projected;
        stats.pmi_aircraft_amarg_excluded = pmi.aircraft_amarg_excluded;
        defects.merge(pmi.defects);

        // ==========================================
        // 步骤3: 546 天事件检测 + 推演
        // ==========================================
        debug!("步骤3: 546 天事件检测");
        let detection = self.day546_detector.detect(&maf);
        stats.day546_qualifying_rows = detection.qualifying_rows;
        stats.day546_events = detection.events.len();
        defects.merge(detection.defects);

        let day546_projections = self
            .day546_projector
            .project(&detection.seed_aircraft, as_of);
        stats.day546_projections = day546_projections.len();

        // ==========================================
        // 步骤4: SLEP 事件生成（可选数据源）
        // ==========================================
        debug!("步骤4: SLEP 事件生成");
        let slep_events = match flight_hours {
            Some(observations) => {
                let generation = self.slep_generator.generate(&observations, slep_start_counter);
                stats.slep_tier_counts = generation
                    .tier_counts
                    .iter()
                    .map(|(tier, count)| (tier.to_string(), *count))
                    .collect();
                stats.slep_next_counter = generation.next_counter;
                defects.merge(generation.defects);
                generation.events
            }
            None => {
                defects.skip_source(FLIGHT_HOURS_SOURCE);
                stats.slep_next_counter = slep_start_counter;
                Vec::new()
            }
        };
        stats.slep_events = slep_events.len();

        // ==========================================
        // 步骤5: 台账合并
        // ==========================================
        debug!("步骤5: 台账合并");
        let ledger = self.assembler.assemble(LedgerStreams {
            historical: classified,
            pmi_projections: pmi.events,
            day546_historical: detection.events,
            day546_projections,
            slep: slep_events,
        });
        stats.duplicate_key_groups = ledger.duplicate_key_groups;
        stats.elapsed_ms = start_time.elapsed().as_millis() as u64;

        info!(
            total_records = ledger.records.len(),
            defects = defects.len(),
            skipped_sources = ?defects.skipped_sources,
            elapsed_ms = stats.elapsed_ms,
            "排程流程完成"
        );

        Ok(ScheduleRunResult {
            run_id,
            as_of,
            ledger,
            defects,
            stats,
        })
    }

    /// 从文件导入并执行
    ///
    /// # 规则
    /// - 历史维修 / MAF 文件缺失或缺少必需列: 致命
    /// - 飞行小时文件缺失或结构不符: 降级,跳过 SLEP
    pub fn run_from_files(&self, paths: &InputPaths, as_of: NaiveDate) -> EngineResult<ScheduleRunResult> {
        ensure_exists("depot", &paths.depot)?;
        ensure_exists("maf", &paths.maf)?;

        let importer = ScheduleImporterImpl::new(self.config);
        let depot = importer.import_depot(&paths.depot, paths.depot_sheet.as_deref())?;
        let maf = importer.import_maf(&paths.maf)?;

        let flight_hours = match &paths.flight_hours {
            Some(path) => importer.import_flight_hours(path)?,
            None => {
                warn!("未提供飞行小时文件，SLEP 分析将被跳过");
                None
            }
        };

        let mut input_defects = depot.defects;
        input_defects.merge(maf.defects);

        let mut inputs = ScheduleInputs::new(depot.records, maf.records, as_of);
        if let Some(batch) = flight_hours {
            input_defects.merge(batch.defects);
            inputs.flight_hours = Some(batch.records);
        }
        inputs.input_defects = input_defects;

        self.run(inputs)
    }
}

fn ensure_exists(source_name: &str, path: &Path) -> EngineResult<()> {
    if path.exists() {
        Ok(())
    } else {
        tracing::error!(source = source_name, path = %path.display(), "必需输入文件不存在");
        Err(EngineError::MissingInput {
            source_name: source_name.to_string(),
            path: path.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigManager;
    use crate::domain::types::RecordSource;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn depot(id: &str, task: &str, start: NaiveDate, sqd: &str, row: usize) -> RawDepotRecord {
        RawDepotRecord {
            aircraft_id: Some(id.to_string()),
            start_date: Some(start),
            task: Some(task.to_string()),
            unit_assignment: Some(sqd.to_string()),
            row_number: row,
            ..Default::default()
        }
    }

    fn maf_546(id: &str, received: &str, row: usize) -> RawMafRecord {
        RawMafRecord {
            aircraft_id: Some(id.to_string()),
            work_unit_code: Some("030000P".to_string()),
            work_center: Some("20".to_string()),
            reason_description: Some("546 DAY INSPECTION".to_string()),
            received_date: Some(received.to_string()),
            row_number: row,
            ..Default::default()
        }
    }

    #[test]
    fn test_run_merges_all_streams() {
        let config = ConfigManager::new();
        let orchestrator = DepotScheduleOrchestrator::new(&config);

        let inputs = ScheduleInputs::new(
            vec![depot("U1", "PMI1", ymd(2020, 1, 1), "VFA-106", 2)],
            vec![maf_546("U1", "2024-03-01", 2)],
            ymd(2025, 1, 1),
        )
        .with_flight_hours(vec![FlightHourObservation {
            aircraft_id: "U1".to_string(),
            flight_hours: 13500.0,
            row_number: 2,
        }]);

        let result = orchestrator.run(inputs).unwrap();

        assert_eq!(result.stats.historical_records, 1);
        assert_eq!(result.stats.day546_events, 1);
        assert_eq!(result.stats.slep_events, 1);
        assert!(result.stats.pmi_projected_records > 0);
        assert!(result.stats.day546_projections > 0);
        assert!(result.defects.skipped_sources.is_empty());

        let sources: Vec<RecordSource> = result.ledger.records.iter().map(|r| r.source).collect();
        for source in RecordSource::ALL {
            assert!(sources.contains(&source), "缺少来源 {source}");
        }
        assert!(result.ledger.records.iter().all(|r| r.identity_key.is_some()));
    }

    #[test]
    fn test_missing_flight_hours_degrades() {
        let config = ConfigManager::new();
        let orchestrator = DepotScheduleOrchestrator::new(&config);

        let inputs = ScheduleInputs::new(
            vec![depot("U1", "PMI1", ymd(2020, 1, 1), "VFA-106", 2)],
            Vec::new(),
            ymd(2025, 1, 1),
        );
        let result = orchestrator.run(inputs).unwrap();

        assert_eq!(result.defects.skipped_sources, vec![FLIGHT_HOURS_SOURCE.to_string()]);
        assert!(result.ledger.slep().is_empty());
        assert!(!result.ledger.future_pmi().is_empty());
    }

    #[test]
    fn test_record_defects_do_not_abort() {
        let config = ConfigManager::new();
        let orchestrator = DepotScheduleOrchestrator::new(&config);

        let mut missing_id = depot("U1", "PMI1", ymd(2020, 1, 1), "VFA-106", 3);
        missing_id.aircraft_id = None;
        let inputs = ScheduleInputs::new(
            vec![depot("U2", "PMI2", ymd(2021, 1, 1), "VFA-32", 2), missing_id],
            Vec::new(),
            ymd(2025, 1, 1),
        );

        let result = orchestrator.run(inputs).unwrap();
        assert_eq!(result.stats.historical_records, 1);
        assert_eq!(result.defects.len(), 1);
    }

    #[test]
    fn test_invalid_interval_is_fatal() {
        let mut config = ConfigManager::new();
        config.set(config_keys::PMI_INTERVAL_MONTHS, "0");
        let orchestrator = DepotScheduleOrchestrator::new(&config);

        let result = orchestrator.run(ScheduleInputs::new(Vec::new(), Vec::new(), ymd(2025, 1, 1)));
        assert!(matches!(result, Err(EngineError::InvalidConfig { .. })));
    }

    #[test]
    fn test_run_from_files_missing_depot_is_fatal() {
        let config = ConfigManager::new();
        let orchestrator = DepotScheduleOrchestrator::new(&config);
        let paths = InputPaths {
            depot: PathBuf::from("no_such_depot.xlsx"),
            maf: PathBuf::from("no_such_maf.csv"),
            flight_hours: None,
            depot_sheet: None,
        };

        let result = orchestrator.run_from_files(&paths, ymd(2025, 1, 1));
        assert!(matches!(result, Err(EngineError::MissingInput { .. })));
    }
}
