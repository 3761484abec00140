// ==========================================
// 基地级维修排程系统 - 台账合并器
// ==========================================
// 职责: 五路记录流合并为统一台账
// 流程: 合并 → 列集统一 → 财年回填 → 身份键 → 间隔计算 → 稳定排序
// 红线: 最终排序是正确性要求,必须显式执行
// ==========================================

use crate::domain::record::MaintenanceRecord;
use crate::domain::types::RecordSource;
use crate::engine::fiscal::FiscalCalendar;
use crate::engine::key_assignment::KeyAssigner;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, instrument};

/// 声明列（MaintenanceRecord 字段全集,按导出顺序）
pub const DECLARED_COLUMNS: &[&str] = &[
    "aircraft_id",
    "identity_key",
    "unit_type",
    "start_date",
    "finish_date",
    "received_date",
    "task",
    "unit_assignment",
    "source",
    "is_rebase",
    "is_546_event",
    "is_amarg_unit",
    "chart_visible",
    "fiscal_year",
    "fiscal_quarter",
    "work_unit_code",
    "work_center",
    "reason_description",
    "job_control_number",
    "material_control_number",
    "date_source_used",
    "flight_hours",
    "received_to_start_days",
    "start_to_finish_days",
];

// ==========================================
// LedgerSchema - 台账列集
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSchema {
    pub extra_columns: Vec<String>, // 额外列（按首次出现顺序）
}

impl LedgerSchema {
    /// 完整列集: 声明列 + 额外列
    pub fn columns(&self) -> Vec<String> {
        DECLARED_COLUMNS
            .iter()
            .map(|c| c.to_string())
            .chain(self.extra_columns.iter().cloned())
            .collect()
    }

    /// 从记录集推导额外列并集
    pub fn from_records<'r>(records: impl IntoIterator<Item = &'r MaintenanceRecord>) -> Self {
        let mut seen = HashSet::new();
        let mut extra_columns = Vec::new();
        for record in records {
            for key in record.extra.keys() {
                if DECLARED_COLUMNS.contains(&key.as_str()) {
                    continue;
                }
                if seen.insert(key.clone()) {
                    extra_columns.push(key.clone());
                }
            }
        }
        Self { extra_columns }
    }
}

// ==========================================
// LedgerStreams - 五路输入流
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct LedgerStreams {
    pub historical: Vec<MaintenanceRecord>,
    pub pmi_projections: Vec<MaintenanceRecord>,
    pub day546_historical: Vec<MaintenanceRecord>,
    pub day546_projections: Vec<MaintenanceRecord>,
    pub slep: Vec<MaintenanceRecord>,
}

impl LedgerStreams {
    /// 按固定顺序拼接
    pub fn concat(self) -> Vec<MaintenanceRecord> {
        let mut all = self.historical;
        all.extend(self.pmi_projections);
        all.extend(self.day546_historical);
        all.extend(self.day546_projections);
        all.extend(self.slep);
        all
    }
}

// ==========================================
// Ledger - 合并台账
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct Ledger {
    pub records: Vec<MaintenanceRecord>,
    pub schema: LedgerSchema,
    pub duplicate_key_groups: usize,
}

impl Ledger {
    pub fn by_source(&self, source: RecordSource) -> Vec<&MaintenanceRecord> {
        self.records.iter().filter(|r| r.source == source).collect()
    }

    /// 未来 PMI 子集
    pub fn future_pmi(&self) -> Vec<&MaintenanceRecord> {
        self.by_source(RecordSource::PmiProjection)
    }

    pub fn day546_historical(&self) -> Vec<&MaintenanceRecord> {
        self.by_source(RecordSource::Day546Historical)
    }

    pub fn day546_projections(&self) -> Vec<&MaintenanceRecord> {
        self.by_source(RecordSource::Day546Projection)
    }

    pub fn slep(&self) -> Vec<&MaintenanceRecord> {
        self.by_source(RecordSource::Slep)
    }

    /// 换防子集（is_rebase = true）
    pub fn rebase(&self) -> Vec<&MaintenanceRecord> {
        self.records.iter().filter(|r| r.is_rebase).collect()
    }

    /// 台账统计
    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            total_records: self.records.len(),
            ..Default::default()
        };

        for source in RecordSource::ALL {
            summary
                .source_distribution
                .insert(source.as_str().to_string(), 0);
        }

        let mut aircraft = HashSet::new();
        for record in &self.records {
            aircraft.insert(record.aircraft_id.as_str());
            *summary
                .source_distribution
                .entry(record.source.as_str().to_string())
                .or_insert(0) += 1;
            *summary.task_distribution.entry(record.task.clone()).or_insert(0) += 1;

            if let Some(start) = record.start_date {
                summary.earliest_start = Some(summary.earliest_start.map_or(start, |d| d.min(start)));
                summary.latest_start = Some(summary.latest_start.map_or(start, |d| d.max(start)));
            }

            summary.rebase_events += usize::from(record.is_rebase);
            summary.day546_events += usize::from(record.is_546_event);
            summary.amarg_records += usize::from(record.is_amarg_unit);
            if record.chart_visible {
                summary.chart_visible_records += 1;
            } else {
                summary.chart_hidden_records += 1;
            }
        }

        summary.unique_aircraft = aircraft.len();
        summary
    }
}

// ==========================================
// LedgerSummary - 台账统计
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_records: usize,
    pub unique_aircraft: usize,
    pub earliest_start: Option<NaiveDate>,
    pub latest_start: Option<NaiveDate>,
    pub source_distribution: BTreeMap<String, usize>,
    pub task_distribution: BTreeMap<String, usize>,
    pub rebase_events: usize,
    pub day546_events: usize,
    pub amarg_records: usize,
    pub chart_visible_records: usize,
    pub chart_hidden_records: usize,
}

// ==========================================
// LedgerAssembler - 台账合并器
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerAssembler {
    calendar: FiscalCalendar,
    key_assigner: KeyAssigner,
}

impl LedgerAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 列集统一: 记录缺少的额外列补 None
    pub fn harmonize(
        &self,
        records: Vec<MaintenanceRecord>,
        schema: &LedgerSchema,
    ) -> Vec<MaintenanceRecord> {
        records
            .into_iter()
            .map(|mut record| {
                for column in &schema.extra_columns {
                    record.extra.entry(column.clone()).or_insert(None);
                }
                record
            })
            .collect()
    }

    /// 财年回填: 仅填补缺失部分,来源为开始日期
    pub fn backfill_fiscal(&self, record: MaintenanceRecord) -> MaintenanceRecord {
        let (fiscal_year, fiscal_quarter) = if record.fiscal_year.is_none() || record.fiscal_quarter.is_none() {
            self.calendar.fiscal_pair(record.start_date)
        } else {
            (None, None)
        };
        MaintenanceRecord {
            fiscal_year: record.fiscal_year.or(fiscal_year),
            fiscal_quarter: record.fiscal_quarter.or(fiscal_quarter),
            ..record
        }
    }

    /// 间隔计算（整天）
    ///
    /// # 规则
    /// - received_to_start_days = start - received
    /// - start_to_finish_days = finish - start
    pub fn compute_deltas(&self, record: MaintenanceRecord) -> MaintenanceRecord {
        let received_to_start_days = match (record.received_date, record.start_date) {
            (Some(received), Some(start)) => Some((start - received).num_days()),
            _ => None,
        };
        let start_to_finish_days = match (record.start_date, record.finish_date) {
            (Some(start), Some(finish)) => Some((finish - start).num_days()),
            _ => None,
        };
        MaintenanceRecord {
            received_to_start_days,
            start_to_finish_days,
            ..record
        }
    }

    /// 合并五路记录流
    #[instrument(skip(self, streams))]
    pub fn assemble(&self, streams: LedgerStreams) -> Ledger {
        info!(
            historical = streams.historical.len(),
            pmi_projections = streams.pmi_projections.len(),
            day546_historical = streams.day546_historical.len(),
            day546_projections = streams.day546_projections.len(),
            slep = streams.slep.len(),
            "开始合并台账"
        );

        // === 步骤 1: 合并 ===
        let unified = streams.concat();

        // === 步骤 2: 列集统一 ===
        let schema = LedgerSchema::from_records(&unified);
        debug!(extra_columns = ?schema.extra_columns, "额外列并集");
        let harmonized = self.harmonize(unified, &schema);

        // === 步骤 3: 财年回填 ===
        let with_fiscal: Vec<MaintenanceRecord> = harmonized
            .into_iter()
            .map(|r| self.backfill_fiscal(r))
            .collect();

        // === 步骤 4: 身份键 ===
        let keyed = self.key_assigner.assign(with_fiscal);

        // === 步骤 5: 间隔 ===
        let mut records: Vec<MaintenanceRecord> = keyed
            .records
            .into_iter()
            .map(|r| self.compute_deltas(r))
            .collect();

        // === 步骤 6: 稳定排序（航空器升序,开始日期升序,缺失日期排后）===
        records.sort_by(|a, b| {
            a.aircraft_id
                .cmp(&b.aircraft_id)
                .then_with(|| a.start_date.is_none().cmp(&b.start_date.is_none()))
                .then_with(|| a.start_date.cmp(&b.start_date))
        });

        info!(
            records = records.len(),
            columns = DECLARED_COLUMNS.len() + schema.extra_columns.len(),
            "台账合并完成"
        );

        Ledger {
            records,
            schema,
            duplicate_key_groups: keyed.duplicate_groups,
        }
    }
}
