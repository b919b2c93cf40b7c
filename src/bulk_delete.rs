use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::collaborator::{EntryQuery, WorkEntryRepository};
use crate::range::validate_range;

/// 一括削除の確認内容。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DeletePlan {
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// 確認時点で期間内に存在した件数
    pub count: usize,
}

impl DeletePlan {
    /// 削除前の確認メッセージ。
    pub fn confirmation_message(&self) -> String {
        format!(
            "指定期間（{}〜{}）のデータ {}件 を削除します。\nこの操作は取り消せません。よろしいですか？",
            self.from.format("%Y/%m/%d"),
            self.to.format("%Y/%m/%d"),
            self.count
        )
    }
}

/// 期間を指定した一括削除を、件数の確認と削除の2段階で行う。
///
/// 確認と削除の間に記録が変更される可能性があるため、削除した件数は`commit`の戻り値を正とする。
pub struct BulkDeletePlanner<'a, T: WorkEntryRepository> {
    repository: &'a T,
}

impl<'a, T: WorkEntryRepository> BulkDeletePlanner<'a, T> {
    /// 新しい`BulkDeletePlanner`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// 期間内の件数を確認する。記録は変更しない。
    pub async fn preview(&self, from: NaiveDate, to: NaiveDate) -> Result<DeletePlan> {
        validate_range(from, to)?;

        let entries = self
            .repository
            .list_entries(&EntryQuery::between(from, to))
            .await
            .context("エントリーの取得に失敗しました")?;
        info!("delete preview {} - {}: {} entries", from, to, entries.len());

        Ok(DeletePlan {
            from,
            to,
            count: entries.len(),
        })
    }

    /// 確認した期間の記録を削除し、実際に削除した件数を返す。
    ///
    /// 期間は再検証するが、件数が確認時から変わっていても削除は行う。
    pub async fn commit(&self, plan: &DeletePlan) -> Result<u64> {
        validate_range(plan.from, plan.to)?;

        let deleted = self
            .repository
            .delete_entries(plan.from, plan.to)
            .await
            .context("削除に失敗しました")?;
        if deleted != plan.count as u64 {
            info!(
                "deleted count differs from preview: previewed {}, deleted {}",
                plan.count, deleted
            );
        }

        Ok(deleted)
    }
}
