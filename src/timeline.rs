use chrono::{Datelike, Duration, NaiveDate, Timelike};

use crate::colors::ColorMap;
use crate::error::ValidationError;
use crate::work_entry::{GroupBy, WorkEntry};

/// タイムラインに表示する曜日の数 (月曜〜金曜)。
pub const WORK_DAYS: usize = 5;

/// タイムラインの表示設定。
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimelineConfig {
    /// 表示を開始する時刻 (時)
    pub hour_start: u32,
    /// 表示を終了する時刻 (時)
    pub hour_end: u32,
    /// 1時間あたりの高さ (px)
    pub hour_height_px: f64,
    /// ブロックの最小の高さ (px)
    pub min_block_height_px: f64,
    /// 色分けに利用する項目
    pub group_by: GroupBy,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            hour_start: 6,
            hour_end: 22,
            hour_height_px: 50.0,
            min_block_height_px: 18.0,
            group_by: GroupBy::Project,
        }
    }
}

impl TimelineConfig {
    /// 表示時間帯を検証する。
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.hour_start >= self.hour_end || self.hour_end > 24 {
            return Err(ValidationError::InvalidHourWindow {
                start: self.hour_start,
                end: self.hour_end,
            });
        }

        Ok(())
    }

    fn window_seconds(&self) -> (u32, u32) {
        (self.hour_start * 3600, self.hour_end * 3600)
    }
}

/// タイムライン上の1ブロックの配置。
#[derive(Clone, Debug, PartialEq)]
pub struct TimelineBlock<'a> {
    pub entry: &'a WorkEntry,
    /// 月曜日を0とした列の位置
    pub day_index: usize,
    pub top_offset_px: f64,
    pub height_px: f64,
    pub color: &'static str,
}

/// 1週間分のタイムラインの配置結果。
#[derive(Clone, Debug)]
pub struct TimelineLayout<'a> {
    pub days: [NaiveDate; WORK_DAYS],
    pub colors: ColorMap,
    pub blocks: Vec<TimelineBlock<'a>>,
}

impl<'a> TimelineLayout<'a> {
    /// 指定した列のブロックを返す。
    pub fn blocks_for_day(&self, day_index: usize) -> impl Iterator<Item = &TimelineBlock<'a>> {
        self.blocks
            .iter()
            .filter(move |block| block.day_index == day_index)
    }
}

/// 指定した日付を含む週の月曜日を返す。
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday().into())
}

/// 月曜日から金曜日までの日付を返す。
pub fn week_dates(monday: NaiveDate) -> [NaiveDate; WORK_DAYS] {
    let mut days = [monday; WORK_DAYS];
    for (offset, day) in days.iter_mut().enumerate() {
        *day = monday + Duration::days(offset as i64);
    }
    days
}

/// 作業記録を曜日×時間のグリッドに配置する。
///
/// 各記録の時間帯は表示時間帯で切り詰め、表示時間帯に全く含まれない記録や
/// 週の月曜〜金曜以外の記録は配置しない。高さは`min_block_height_px`を下回らない。
///
/// 同じ日に時間帯が重なる記録があっても列を分けず、それぞれ独立して配置するため
/// 表示上は重なる。
///
/// # Arguments
///
/// * `week_of` - 表示する週に含まれる任意の日付
/// * `entries` - 配置する作業記録
/// * `config` - 表示設定
pub fn layout_week<'a>(
    week_of: NaiveDate,
    entries: &'a [WorkEntry],
    config: &TimelineConfig,
) -> Result<TimelineLayout<'a>, ValidationError> {
    config.validate()?;

    let days = week_dates(monday_of(week_of));
    let colors = ColorMap::build(entries.iter().map(|entry| config.group_by.key(entry)));
    let (window_start, window_end) = config.window_seconds();
    let to_px = |seconds: u32| f64::from(seconds) / 3600.0 * config.hour_height_px;

    let mut blocks: Vec<TimelineBlock<'a>> = entries
        .iter()
        .filter_map(|entry| {
            let day_index = days.iter().position(|day| *day == entry.work_date)?;
            // 秒単位で切り詰め、1分未満の記録も最小の高さで表示する
            let start = entry.start_time.num_seconds_from_midnight().max(window_start);
            let end = entry.end_time.num_seconds_from_midnight().min(window_end);
            if end <= start {
                return None;
            }

            let top_offset_px = to_px(start - window_start);
            let height_px = to_px(end - start).max(config.min_block_height_px);

            Some(TimelineBlock {
                entry,
                day_index,
                top_offset_px,
                height_px,
                color: colors.color_of(config.group_by.key(entry)),
            })
        })
        .collect();
    blocks.sort_by_key(|block| (block.day_index, block.entry.start_time));

    Ok(TimelineLayout {
        days,
        colors,
        blocks,
    })
}
