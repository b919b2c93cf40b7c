use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime};

#[cfg(not(test))]
/// Localタイムゾーンでの今日の日付を取得する。
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

#[cfg(not(test))]
/// Localタイムゾーンでの現在日時を取得する。
pub fn now() -> NaiveDateTime {
    Local::now().naive_local()
}


#[cfg(test)]
pub use mock_datetime::{now, today};

/// `YYYY-MM-DD`形式の日付をパースする。
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Failed to parse date: {}", s))
}

/// 指定した日付を含む月の1日を返す。
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}
