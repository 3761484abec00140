// ==========================================
// 基地级维修排程系统 - 财年日历
// ==========================================
// 规则: 财年自 10 月 1 日开始
// ==========================================
// 职责: 日期 → (财年, 财季)
// 红线: 缺失或无法解析的输入返回 None 并记录日志,绝不 panic
// ==========================================

use crate::importer::data_cleaner::DataCleaner;
use chrono::{Datelike, Duration, Months, NaiveDate};
use tracing::{debug, warn};

/// 日期加减天数（溢出返回 None）
pub fn offset_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::days(days))
}

/// 日期加月数（月末按目标月最后一天截断,溢出返回 None）
pub fn offset_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

// ==========================================
// FiscalCalendar - 财年日历
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct FiscalCalendar;

impl FiscalCalendar {
    pub fn new() -> Self {
        Self
    }

    /// 财年
    ///
    /// # 规则
    /// - 月份 >= 10: 公历年 + 1
    /// - 否则: 公历年
    pub fn fiscal_year(&self, date: NaiveDate) -> i32 {
        if date.month() >= 10 {
            date.year() + 1
        } else {
            date.year()
        }
    }

    /// 财季
    ///
    /// # 规则
    /// - 10~12 月 → 1
    /// - 1~3 月 → 2
    /// - 4~6 月 → 3
    /// - 7~9 月 → 4
    pub fn fiscal_quarter(&self, date: NaiveDate) -> u32 {
        match date.month() {
            10..=12 => 1,
            1..=3 => 2,
            4..=6 => 3,
            _ => 4,
        }
    }

    /// 可选日期 → (财年, 财季)
    pub fn fiscal_pair(&self, date: Option<NaiveDate>) -> (Option<i32>, Option<u32>) {
        match date {
            Some(d) => (Some(self.fiscal_year(d)), Some(self.fiscal_quarter(d))),
            None => {
                debug!("日期缺失，财年/财季置空");
                (None, None)
            }
        }
    }

    /// 原始文本 → (财年, 财季)
    ///
    /// # 返回
    /// - (None, None): 文本缺失或无法解析（记录 warn）
    pub fn fiscal_pair_from_str(&self, value: Option<&str>) -> (Option<i32>, Option<u32>) {
        let text = match value.map(str::trim).filter(|v| !v.is_empty()) {
            Some(text) => text,
            None => return self.fiscal_pair(None),
        };

        match DataCleaner.parse_flexible_date(text) {
            Some(date) => self.fiscal_pair(Some(date)),
            None => {
                warn!(value = text, "日期无法解析，财年/财季置空");
                (None, None)
            }
        }
    }
}
