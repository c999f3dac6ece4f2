// ==========================================
// 需求计划系统 - 月度期间
// ==========================================
// 期间 = 日历月（年 + 月）,按时间顺序比较
// 展示格式: "Mar 2025"；同时接受 "2025-03"
// ==========================================

use chrono::{Datelike, Month, NaiveDate};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// 日历月期间
///
/// 字段顺序 (year, month) 保证派生的 `Ord` 即时间顺序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// 默认历史窗口起点（Nov 2024）
    pub const DEFAULT_HISTORY_START: Period = Period {
        year: 2024,
        month: 11,
    };

    /// 从年/月构造；月份越界或超出 chrono 可表示范围时返回 None
    pub fn from_ym(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(Self::from_date)
    }

    /// 取日期所在的月份
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// 向后偏移 n 个月
    pub fn plus_months(self, n: u32) -> Self {
        let serial = self.year as i64 * 12 + (self.month as i64 - 1) + n as i64;
        Self {
            year: serial.div_euclid(12) as i32,
            month: serial.rem_euclid(12) as u32 + 1,
        }
    }

    /// 下一个月
    pub fn succ(self) -> Self {
        self.plus_months(1)
    }

    /// 从本期起连续 n 个月
    pub fn run(self, n: u32) -> Vec<Period> {
        (0..n).map(|i| self.plus_months(i)).collect()
    }

    /// 展示标签,例如 "Mar 2025"
    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match u8::try_from(self.month).ok().and_then(|m| Month::try_from(m).ok()) {
            Some(month) => write!(f, "{} {}", &month.name()[..3], self.year),
            None => write!(f, "{}-{:02}", self.year, self.month),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        // "2025-03"
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", text), "%Y-%m-%d") {
            return Ok(Self::from_date(date));
        }

        // "Mar 2025" / "March 2025"
        if let Ok(date) = NaiveDate::parse_from_str(&format!("01 {}", text), "%d %b %Y") {
            return Ok(Self::from_date(date));
        }

        Err(format!("无法解析期间: {}（期望 \"Mar 2025\" 或 \"2025-03\"）", text))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
