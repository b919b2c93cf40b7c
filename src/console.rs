use std::io::Write;

use anyhow::{Context, Result};
use chrono::Datelike;

use crate::report::{format_duration, ReportSummary};
use crate::timeline::TimelineLayout;
use crate::work_entry::{GroupBy, WorkEntry};

const DAY_LABELS: [&str; 5] = ["月", "火", "水", "木", "金"];

/// Consoleに作業記録や集計結果を表示するためのtrait。
pub trait ConsolePresenter {
    /// 作業記録の一覧を表示する。
    fn show_entries(&mut self, entries: &[WorkEntry]) -> Result<()>;

    /// 1週間分のタイムラインを表示する。
    fn show_timeline(&mut self, layout: &TimelineLayout) -> Result<()>;

    /// 集計結果を表示する。
    ///
    /// # Arguments
    ///
    /// * `summary` - 集計結果
    /// * `group_by` - 集計に利用した項目
    fn show_report(&mut self, summary: &ReportSummary, group_by: GroupBy) -> Result<()>;

    /// 1行のメッセージを表示する。
    fn show_message(&mut self, message: &str) -> Result<()>;
}

/// Markdownのlist形式で表示する。
pub struct ConsoleMarkdownList<'a, W: Write> {
    writer: &'a mut W,
}

impl<'a, W: Write> ConsoleMarkdownList<'a, W> {
    /// 新しい`ConsoleMarkdownList`を返す。
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }
}

impl<'a, W: Write> ConsolePresenter for ConsoleMarkdownList<'a, W> {
    // 作業記録を作業日、開始時刻の順に表示する。
    fn show_entries(&mut self, entries: &[WorkEntry]) -> Result<()> {
        let mut sorted_entries = entries.to_vec();
        sorted_entries.sort_by_key(|entry| (entry.work_date, entry.start_time));

        for entry in sorted_entries {
            writeln!(
                self.writer,
                "- {} {}: {} / {} / {} ({})",
                entry.work_date,
                time_range(&entry),
                entry.task_name,
                entry.project_name,
                entry.category,
                entry.id
            )
            .with_context(|| format!("Failed to write entry: {:?}", entry))?;
        }

        Ok(())
    }

    fn show_timeline(&mut self, layout: &TimelineLayout) -> Result<()> {
        for (day_index, day) in layout.days.iter().enumerate() {
            writeln!(
                self.writer,
                "## {}/{}（{}）",
                day.month(),
                day.day(),
                DAY_LABELS[day_index]
            )
            .context("Failed to write timeline header")?;

            for block in layout.blocks_for_day(day_index) {
                writeln!(
                    self.writer,
                    "- {}: {} [{}] top={:.1}px height={:.1}px {}",
                    time_range(block.entry),
                    block.entry.task_name,
                    block.entry.project_name,
                    block.top_offset_px,
                    block.height_px,
                    block.color
                )
                .with_context(|| format!("Failed to write timeline block: {}", block.entry.id))?;
            }
        }

        Ok(())
    }

    fn show_report(&mut self, summary: &ReportSummary, group_by: GroupBy) -> Result<()> {
        let label = match group_by {
            GroupBy::Project => "プロジェクト別",
            GroupBy::Category => "カテゴリ別",
        };
        writeln!(
            self.writer,
            "合計: {} ({})",
            format_duration(summary.total_seconds),
            label
        )
        .context("Failed to write report total")?;

        for item in &summary.items {
            writeln!(
                self.writer,
                "- {}: {} ({}%)",
                item.name,
                format_duration(item.seconds),
                item.percentage
            )
            .with_context(|| format!("Failed to write report item: {}", item.name))?;
        }

        Ok(())
    }

    fn show_message(&mut self, message: &str) -> Result<()> {
        writeln!(self.writer, "{}", message).context("Failed to write message")
    }
}

fn time_range(entry: &WorkEntry) -> String {
    format!(
        "{}-{}",
        entry.start_time.format("%H:%M"),
        entry.end_time.format("%H:%M")
    )
}
