use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::range::validate_range;
use crate::work_entry::{GroupBy, WorkEntry};

/// レポートの集計条件。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReportQuery {
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub group_by: GroupBy,
    /// 空の場合は絞り込まない
    pub projects: Vec<String>,
    /// 空の場合は絞り込まない
    pub categories: Vec<String>,
}

impl ReportQuery {
    /// 絞り込みなしの新しい`ReportQuery`を返す。
    pub fn new(from: NaiveDate, to: NaiveDate, group_by: GroupBy) -> Self {
        Self {
            from,
            to,
            group_by,
            projects: vec![],
            categories: vec![],
        }
    }

    fn includes(&self, entry: &WorkEntry) -> bool {
        (self.from..=self.to).contains(&entry.work_date)
            && (self.projects.is_empty() || self.projects.contains(&entry.project_name))
            && (self.categories.is_empty() || self.categories.contains(&entry.category))
    }
}

/// 集計結果の1項目。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SummaryItem {
    pub name: String,
    pub seconds: i64,
    pub percentage: f64,
}

/// 集計結果。`items`の秒数の合計は`total_seconds`と一致する。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_seconds: i64,
    pub items: Vec<SummaryItem>,
}

impl ReportSummary {
    /// 項目を秒数の降順、同じ秒数の場合は名前の昇順に並べる。
    pub fn sort_items(&mut self) {
        self.items.sort_by(|a, b| match b.seconds.cmp(&a.seconds) {
            Ordering::Equal => a.name.cmp(&b.name),
            ordering => ordering,
        });
    }
}

/// 作業記録をプロジェクトまたはカテゴリごとに集計する。
///
/// 期間外の記録と絞り込み条件に合わない記録は集計対象外とする。
/// 割合は合計に対する百分率を整数に丸めた値で、合計が0の場合は0とする。
///
/// # Arguments
///
/// * `entries` - 集計する作業記録
/// * `query` - 集計条件
pub fn summarize(
    entries: &[WorkEntry],
    query: &ReportQuery,
) -> Result<ReportSummary, ValidationError> {
    validate_range(query.from, query.to)?;

    let group_seconds: HashMap<&str, i64> = entries
        .iter()
        .filter(|entry| query.includes(entry))
        .fold(HashMap::new(), |mut accumulate, entry| {
            *accumulate.entry(query.group_by.key(entry)).or_insert(0) += entry.duration_seconds;
            accumulate
        });
    let total_seconds: i64 = group_seconds.values().sum();

    let mut summary = ReportSummary {
        total_seconds,
        items: group_seconds
            .into_iter()
            .map(|(name, seconds)| SummaryItem {
                name: name.to_string(),
                seconds,
                percentage: percentage(seconds, total_seconds),
            })
            .collect(),
    };
    summary.sort_items();

    Ok(summary)
}

/// 絞り込みの選択肢として、期間内に存在するプロジェクト名とカテゴリを出現順に返す。
pub fn filter_options(entries: &[WorkEntry]) -> (Vec<String>, Vec<String>) {
    entries.iter().fold(
        (Vec::new(), Vec::new()),
        |(mut projects, mut categories), entry| {
            if !projects.contains(&entry.project_name) {
                projects.push(entry.project_name.clone());
            }
            if !categories.contains(&entry.category) {
                categories.push(entry.category.clone());
            }
            (projects, categories)
        },
    )
}

/// 秒数を`HH:MM:SS`形式の文字列にする。
pub fn format_duration(total_seconds: i64) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

fn percentage(seconds: i64, total_seconds: i64) -> f64 {
    if total_seconds <= 0 {
        return 0.0;
    }
    (seconds as f64 / total_seconds as f64 * 100.0).round()
}
