// ==========================================
// 基地级维修排程系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 多格式日期解析 / 数值解析
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};

// 纯日期格式（按常见程度排序）
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%d-%b-%Y",
    "%d-%b-%y",
    "%d %b %Y",
];

// 带时间格式（取日期部分）
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%y %H:%M",
];

// Excel 序列日期识别区间（约 1927 ~ 2173 年）
const EXCEL_SERIAL_MIN: f64 = 10_000.0;
const EXCEL_SERIAL_MAX: f64 = 100_000.0;

pub struct DataCleaner;

impl DataCleaner {
    /// 文本清洗（TRIM,可选 UPPER）
    pub fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    /// NULL 标准化: 空白与常见空值占位符 → None
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            let upper = trimmed.to_uppercase();
            if trimmed.is_empty() || matches!(upper.as_str(), "NAN" | "NAT" | "NONE" | "NULL" | "N/A")
            {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    /// 多格式日期解析
    ///
    /// # 规则
    /// 1. 依次尝试纯日期格式
    /// 2. 依次尝试带时间格式,取日期部分
    /// 3. 数值落在 [10000, 100000) 时按 Excel 序列日期解析（1899-12-30 起算）
    ///
    /// # 返回
    /// - None: 无法识别（由调用方决定记为缺陷还是忽略）
    pub fn parse_flexible_date(&self, value: &str) -> Option<NaiveDate> {
        let value = value.trim();
        if value.is_empty() {
            return None;
        }

        for format in DATE_FORMATS {
            if let Ok(date) = NaiveDate::parse_from_str(value, format) {
                return Some(date);
            }
        }

        for format in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
                return Some(dt.date());
            }
        }

        self.parse_excel_serial(value)
    }

    /// Excel 序列日期（小数部分为时间,舍弃）
    fn parse_excel_serial(&self, value: &str) -> Option<NaiveDate> {
        let serial = value.parse::<f64>().ok()?;
        if !(EXCEL_SERIAL_MIN..EXCEL_SERIAL_MAX).contains(&serial) {
            return None;
        }
        let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
        epoch.checked_add_signed(chrono::Duration::days(serial.floor() as i64))
    }

    /// 数值解析（允许千分位逗号）
    pub fn parse_number(&self, value: &str) -> Option<f64> {
        let cleaned: String = value.trim().chars().filter(|c| *c != ',').collect();
        cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
    }

    /// 航空器编号标准化
    ///
    /// # 规则
    /// - Excel 数值单元格可能带 ".0" 后缀,去除后保留整数文本
    pub fn clean_aircraft_id(&self, value: Option<&str>) -> Option<String> {
        self.normalize_null(value).map(|v| match v.strip_suffix(".0") {
            Some(stripped) if !stripped.is_empty() && stripped.chars().all(|c| c.is_ascii_digit()) => {
                stripped.to_string()
            }
            _ => v,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_clean_text_basic() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.clean_text("  hello  ", false), "hello");
        assert_eq!(cleaner.clean_text("  rebase  ", true), "REBASE");
    }

    #[test]
    fn test_normalize_null() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.normalize_null(Some("  ")), None);
        assert_eq!(cleaner.normalize_null(Some("nan")), None);
        assert_eq!(cleaner.normalize_null(Some("NaT")), None);
        assert_eq!(cleaner.normalize_null(Some("  VFA-106  ")), Some("VFA-106".to_string()));
        assert_eq!(cleaner.normalize_null(None), None);
    }

    #[test]
    fn test_parse_flexible_date_formats() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_flexible_date("2024-03-01"), Some(ymd(2024, 3, 1)));
        assert_eq!(cleaner.parse_flexible_date("20240301"), Some(ymd(2024, 3, 1)));
        assert_eq!(cleaner.parse_flexible_date("3/1/2024"), Some(ymd(2024, 3, 1)));
        assert_eq!(cleaner.parse_flexible_date("2024-03-01 13:45:00"), Some(ymd(2024, 3, 1)));
        assert_eq!(cleaner.parse_flexible_date("2024-03-01T08:00:00"), Some(ymd(2024, 3, 1)));
        assert_eq!(cleaner.parse_flexible_date("03/01/2024 13:45"), Some(ymd(2024, 3, 1)));
    }

    #[test]
    fn test_parse_excel_serial_date() {
        let cleaner = DataCleaner;
        // 43831 = 2020-01-01
        assert_eq!(cleaner.parse_flexible_date("43831"), Some(ymd(2020, 1, 1)));
        assert_eq!(cleaner.parse_flexible_date("43831.75"), Some(ymd(2020, 1, 1)));
        // 小数值不视为日期
        assert_eq!(cleaner.parse_flexible_date("42"), None);
    }

    #[test]
    fn test_parse_flexible_date_rejects_garbage() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_flexible_date(""), None);
        assert_eq!(cleaner.parse_flexible_date("not a date"), None);
        assert_eq!(cleaner.parse_flexible_date("2024-13-45"), None);
    }

    #[test]
    fn test_parse_number_and_aircraft_id() {
        let cleaner = DataCleaner;
        assert_eq!(cleaner.parse_number("13,500.5"), Some(13500.5));
        assert_eq!(cleaner.parse_number("abc"), None);
        assert_eq!(cleaner.clean_aircraft_id(Some("166001.0")), Some("166001".to_string()));
        assert_eq!(cleaner.clean_aircraft_id(Some("U1")), Some("U1".to_string()));
        assert_eq!(cleaner.clean_aircraft_id(Some(" ")), None);
    }
}
