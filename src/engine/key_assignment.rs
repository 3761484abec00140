// ==========================================
// 基地级维修排程系统 - 身份键分配与去重
// ==========================================
// 职责: 构造 aircraft_FY_task 身份键并解决冲突
// 红线: 每条记录恰好一个键;冲突绝不静默覆盖
// ==========================================

use crate::domain::record::MaintenanceRecord;
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument, warn};

// 财年缺失时的占位文本
pub const MISSING_FISCAL_YEAR: &str = "NA";

/// 基础身份键: aircraft_id + "_" + fiscal_year + "_" + task
pub fn base_identity_key(record: &MaintenanceRecord) -> String {
    let fiscal_year = record
        .fiscal_year
        .map(|fy| fy.to_string())
        .unwrap_or_else(|| MISSING_FISCAL_YEAR.to_string());
    format!("{}_{}_{}", record.aircraft_id, fiscal_year, record.task)
}

// ==========================================
// KeyAssignment - 分配结果
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct KeyAssignment {
    pub records: Vec<MaintenanceRecord>,
    pub duplicate_groups: usize,  // 成员数 > 1 的键组数
    pub duplicate_records: usize, // 被加序号的记录数
    pub resuffixed: usize,        // 加序号后仍冲突、再次加序号的记录数
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KeyAssigner;

impl KeyAssigner {
    pub fn new() -> Self {
        Self
    }

    /// 分配身份键
    ///
    /// # 规则
    /// - 基础键唯一: 直接使用
    /// - 基础键重复: 组内每个成员按拼接顺序追加 "_0"、"_1"...
    /// - 追加序号后仍与其他键冲突: 继续追加 "_1"、"_2"... 直至唯一
    #[instrument(skip(self, records), fields(records = records.len()))]
    pub fn assign(&self, records: Vec<MaintenanceRecord>) -> KeyAssignment {
        let base_keys: Vec<String> = records.iter().map(base_identity_key).collect();

        let mut group_sizes: HashMap<&str, usize> = HashMap::new();
        for key in &base_keys {
            *group_sizes.entry(key.as_str()).or_insert(0) += 1;
        }

        // 无冲突的基础键保持原样,先行占用
        let mut used: HashSet<String> = base_keys
            .iter()
            .filter(|k| group_sizes.get(k.as_str()) == Some(&1))
            .cloned()
            .collect();

        let mut result = KeyAssignment {
            duplicate_groups: group_sizes.values().filter(|&&n| n > 1).count(),
            ..Default::default()
        };

        let mut sequences: HashMap<&str, usize> = HashMap::new();
        let mut keyed = Vec::with_capacity(records.len());

        for (record, base) in records.into_iter().zip(base_keys.iter()) {
            let key = if group_sizes.get(base.as_str()) == Some(&1) {
                base.clone()
            } else {
                let seq = sequences.entry(base.as_str()).or_insert(0);
                let mut candidate = format!("{}_{}", base, seq);
                *seq += 1;
                result.duplicate_records += 1;

                if used.contains(&candidate) {
                    let mut n = 1;
                    while used.contains(&format!("{}_{}", candidate, n)) {
                        n += 1;
                    }
                    let resolved = format!("{}_{}", candidate, n);
                    warn!(key = %candidate, resolved = %resolved, "序号键仍冲突，再次追加序号");
                    candidate = resolved;
                    result.resuffixed += 1;
                }

                used.insert(candidate.clone());
                candidate
            };

            keyed.push(MaintenanceRecord {
                identity_key: Some(key),
                ..record
            });
        }

        if result.duplicate_groups > 0 {
            warn!(
                groups = result.duplicate_groups,
                records = result.duplicate_records,
                "发现重复身份键，已追加序号"
            );
        }
        info!(records = keyed.len(), "身份键分配完成");

        result.records = keyed;
        result
    }
}
