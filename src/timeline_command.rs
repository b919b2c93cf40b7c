use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::collaborator::{EntryQuery, WorkEntryRepository};
use crate::datetime::{parse_date, today};
use crate::timeline::{layout_week, monday_of, TimelineConfig, TimelineLayout};
use crate::view::ViewCache;
use crate::work_entry::{GroupBy, WorkEntry};

/// `timeline`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct TimelineArgs {
    #[clap(
        short = 'w',
        long = "week",
        help = "Any date in the week to show, in the format YYYY-MM-DD",
        parse(try_from_str = parse_date),
    )]
    week: Option<NaiveDate>,

    #[clap(long = "group-by", default_value = "project", help = "Color by project or category")]
    group_by: GroupBy,

    #[clap(long = "hour-start", default_value = "6")]
    hour_start: u32,

    #[clap(long = "hour-end", default_value = "22")]
    hour_end: u32,

    #[clap(long = "hour-height", default_value = "50")]
    hour_height: f64,

    #[clap(long = "min-block-height", default_value = "18")]
    min_block_height: f64,
}

impl TimelineArgs {
    fn config(&self) -> TimelineConfig {
        TimelineConfig {
            hour_start: self.hour_start,
            hour_end: self.hour_end,
            hour_height_px: self.hour_height,
            min_block_height_px: self.min_block_height,
            group_by: self.group_by,
        }
    }
}

/// 週のタイムラインを表示するためのコマンド。
pub struct TimelineCommand<'a, T: WorkEntryRepository> {
    repository: &'a T,
    entries: ViewCache<Vec<WorkEntry>>,
}

impl<'a, T: WorkEntryRepository> TimelineCommand<'a, T> {
    /// 新しい`TimelineCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - 作業記録を取得するためのリポジトリ
    pub fn new(repository: &'a T) -> Self {
        Self {
            repository,
            entries: ViewCache::new(),
        }
    }

    /// `timeline`サブコマンドの処理を行う。
    ///
    /// 指定された日付を含む週の月曜〜金曜の作業記録を取得し、グリッドに配置する。
    /// 日付が指定されていない場合は今日を含む週とする。
    pub async fn run(&mut self, args: &TimelineArgs) -> Result<TimelineLayout<'_>> {
        let config = args.config();
        config.validate()?;

        let monday = monday_of(args.week.unwrap_or_else(today));
        info!("Week of: {}", monday);

        let repository = self.repository;
        let query = EntryQuery::WeekOf(monday);
        let entries = self
            .entries
            .refresh(|| repository.list_entries(&query))
            .await
            .context("エントリーの取得に失敗しました")?
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(layout_week(monday, entries, &config)?)
    }
}
