use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::collaborator::{EntryQuery, WorkEntryRepository};
use crate::datetime::{first_day_of_month, parse_date, today};
use crate::range::validate_range;
use crate::report::{filter_options, summarize, ReportQuery, ReportSummary};
use crate::view::ViewCache;
use crate::work_entry::{GroupBy, WorkEntry};

/// `report`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct ReportArgs {
    #[clap(
        short = 'f',
        long = "from",
        help = "First day of the report in the format YYYY-MM-DD [default: first day of this month]",
        parse(try_from_str = parse_date),
    )]
    from: Option<NaiveDate>,

    #[clap(
        short = 't',
        long = "to",
        help = "Last day of the report in the format YYYY-MM-DD [default: today]",
        parse(try_from_str = parse_date),
    )]
    to: Option<NaiveDate>,

    #[clap(long = "group-by", default_value = "project", help = "Group by project or category")]
    group_by: GroupBy,

    #[clap(long = "project", help = "Only include this project (repeatable)")]
    projects: Vec<String>,

    #[clap(long = "category", help = "Only include this category (repeatable)")]
    categories: Vec<String>,

    #[clap(long = "remote", help = "Let the server aggregate the report")]
    remote: bool,
}

/// レポートの表示内容。
#[derive(Clone, Debug, PartialEq)]
pub struct ReportView {
    pub summary: ReportSummary,
    pub group_by: GroupBy,
    /// 期間内に存在するプロジェクト名
    pub project_options: Vec<String>,
    /// 期間内に存在するカテゴリ
    pub category_options: Vec<String>,
}

/// 期間内の作業時間を集計するためのコマンド。
pub struct ReportCommand<'a, T: WorkEntryRepository> {
    repository: &'a T,
    entries: ViewCache<Vec<WorkEntry>>,
}

impl<'a, T: WorkEntryRepository> ReportCommand<'a, T> {
    /// 新しい`ReportCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - 作業記録を取得するためのリポジトリ
    pub fn new(repository: &'a T) -> Self {
        Self {
            repository,
            entries: ViewCache::new(),
        }
    }

    /// `report`サブコマンドの処理を行う。
    ///
    /// 期間が指定されていない場合は、今月の1日から今日までを集計する。
    /// `--remote`の場合は集計をcollaboratorに任せ、結果の並び順だけを揃える。
    pub async fn run(&mut self, args: &ReportArgs) -> Result<ReportView> {
        let to = args.to.unwrap_or_else(today);
        let from = args.from.unwrap_or_else(|| first_day_of_month(today()));
        validate_range(from, to)?;
        info!("Report from: {}, to: {}", from, to);

        let query = ReportQuery {
            from,
            to,
            group_by: args.group_by,
            projects: args.projects.clone(),
            categories: args.categories.clone(),
        };
        let repository = self.repository;
        let entry_query = EntryQuery::between(from, to);
        let entries = self
            .entries
            .refresh(|| repository.list_entries(&entry_query))
            .await
            .context("エントリーの取得に失敗しました")?
            .map(Vec::as_slice)
            .unwrap_or_default();
        let (project_options, category_options) = filter_options(entries);

        let summary = if args.remote {
            let mut summary = repository
                .get_report_summary(&query)
                .await
                .context("レポートの取得に失敗しました")?;
            summary.sort_items();
            summary
        } else {
            summarize(entries, &query)?
        };

        Ok(ReportView {
            summary,
            group_by: args.group_by,
            project_options,
            category_options,
        })
    }
}
