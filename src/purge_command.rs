use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use chrono::NaiveDate;

use crate::bulk_delete::BulkDeletePlanner;
use crate::collaborator::WorkEntryRepository;
use crate::datetime::{parse_date, today};

/// `purge`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct PurgeArgs {
    #[clap(short = 'f', long = "from", help = "[default: today]", parse(try_from_str = parse_date))]
    from: Option<NaiveDate>,

    #[clap(short = 't', long = "to", help = "[default: today]", parse(try_from_str = parse_date))]
    to: Option<NaiveDate>,

    #[clap(short = 'y', long = "yes", help = "Skip the confirmation prompt")]
    yes: bool,
}

/// 期間内の作業記録を一括で削除するためのコマンド。
///
/// 削除する件数を確認した後、明示的に承認された場合のみ削除する。
pub struct PurgeCommand<'a, T: WorkEntryRepository> {
    planner: BulkDeletePlanner<'a, T>,
}

impl<'a, T: WorkEntryRepository> PurgeCommand<'a, T> {
    /// 新しい`PurgeCommand`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self {
            planner: BulkDeletePlanner::new(repository),
        }
    }

    /// `purge`サブコマンドの処理を行う。
    ///
    /// 削除した場合は件数を、取り消した場合は`None`を返す。
    ///
    /// # Arguments
    ///
    /// * `args` - `purge`サブコマンドの引数
    /// * `input` - 確認への回答を読み込む入力
    /// * `output` - 確認メッセージの出力先
    pub async fn run<R: BufRead, W: Write>(
        &self,
        args: &PurgeArgs,
        input: &mut R,
        output: &mut W,
    ) -> Result<Option<u64>> {
        let from = args.from.unwrap_or_else(today);
        let to = args.to.unwrap_or_else(today);
        let plan = self.planner.preview(from, to).await?;

        if !args.yes {
            write!(output, "{} [y/N]: ", plan.confirmation_message())
                .and_then(|_| output.flush())
                .context("Failed to write confirmation")?;
            let mut answer = String::new();
            input
                .read_line(&mut answer)
                .context("Failed to read confirmation")?;
            if !is_yes(&answer) {
                return Ok(None);
            }
        }

        let deleted = self.planner.commit(&plan).await?;
        Ok(Some(deleted))
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
