use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use log::info;

use crate::collaborator::WorkEntryRepository;
use crate::datetime::{parse_date, today};
use crate::work_entry::{parse_clock_time, EntryFields, EntryPatch, WorkEntry};

/// `add`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct AddArgs {
    #[clap(long = "task")]
    task: String,

    #[clap(long = "project")]
    project: String,

    #[clap(long = "category")]
    category: String,

    #[clap(
        short = 'd',
        long = "date",
        help = "Work date in the format YYYY-MM-DD [default: today]",
        parse(try_from_str = parse_date),
    )]
    date: Option<NaiveDate>,

    #[clap(long = "start", help = "HH:MM or HH:MM:SS", parse(try_from_str = parse_clock_time))]
    start: NaiveTime,

    #[clap(long = "end", help = "HH:MM or HH:MM:SS", parse(try_from_str = parse_clock_time))]
    end: NaiveTime,
}

/// `edit`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct EditArgs {
    id: String,

    #[clap(long = "task")]
    task: Option<String>,

    #[clap(long = "project")]
    project: Option<String>,

    #[clap(long = "category")]
    category: Option<String>,

    #[clap(short = 'd', long = "date", parse(try_from_str = parse_date))]
    date: Option<NaiveDate>,

    #[clap(long = "start", parse(try_from_str = parse_clock_time))]
    start: Option<NaiveTime>,

    #[clap(long = "end", parse(try_from_str = parse_clock_time))]
    end: Option<NaiveTime>,
}

impl EditArgs {
    fn patch(&self) -> EntryPatch {
        EntryPatch {
            task_name: trimmed(&self.task),
            project_name: trimmed(&self.project),
            category: trimmed(&self.category),
            work_date: self.date,
            start_time: self.start,
            end_time: self.end,
        }
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|value| value.trim().to_string())
}

/// `remove`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct RemoveArgs {
    id: String,
}

/// `duplicate`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct DuplicateArgs {
    id: String,

    #[clap(long = "start", parse(try_from_str = parse_clock_time))]
    start: NaiveTime,

    #[clap(long = "end", parse(try_from_str = parse_clock_time))]
    end: NaiveTime,
}

/// 作業記録を登録、更新、削除するためのコマンド。
///
/// 入力値はcollaboratorに送信する前に検証する。
pub struct EntryCommand<'a, T: WorkEntryRepository> {
    repository: &'a T,
}

impl<'a, T: WorkEntryRepository> EntryCommand<'a, T> {
    /// 新しい`EntryCommand`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// 作業記録を登録する。作業日が指定されていない場合は今日とする。
    pub async fn add(&self, args: &AddArgs) -> Result<WorkEntry> {
        let fields = EntryFields::new(
            &args.task,
            &args.project,
            &args.category,
            args.date.unwrap_or_else(today),
            args.start,
            args.end,
        )?;

        self.create(&fields).await
    }

    /// 作業記録を更新する。指定された項目だけを送信する。
    pub async fn edit(&self, args: &EditArgs) -> Result<WorkEntry> {
        let patch = args.patch();
        patch.validate()?;
        if patch.changes_one_time() {
            let current = self
                .repository
                .get_entry(&args.id)
                .await
                .context("エントリーの取得に失敗しました")?;
            patch.validate_against(&current)?;
        }

        let entry = self
            .repository
            .update_entry(&args.id, &patch)
            .await
            .context("保存に失敗しました")?;
        info!("Updated entry: {}", entry.id);

        Ok(entry)
    }

    /// 作業記録を削除する。
    pub async fn remove(&self, args: &RemoveArgs) -> Result<()> {
        self.repository
            .delete_entry(&args.id)
            .await
            .context("削除に失敗しました")?;
        info!("Removed entry: {}", args.id);

        Ok(())
    }

    /// 既存の作業記録を今日の日付で複製する。
    pub async fn duplicate(&self, args: &DuplicateArgs) -> Result<WorkEntry> {
        let source = self
            .repository
            .get_entry(&args.id)
            .await
            .context("エントリーの取得に失敗しました")?;
        let fields = source.duplicate(today(), args.start, args.end)?;

        self.create(&fields).await
    }

    async fn create(&self, fields: &EntryFields) -> Result<WorkEntry> {
        let entry = self
            .repository
            .create_entry(fields)
            .await
            .context("保存に失敗しました")?;
        info!("Created entry: {}", entry.id);

        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use clap::{Parser, Subcommand};

    use super::{AddArgs, DuplicateArgs, EditArgs, EntryCommand, RemoveArgs};
    use crate::collaborator::MockWorkEntryRepository;
    use crate::datetime::mock_datetime;
    use crate::error::ValidationError;
    use crate::work_entry::fixtures::entry;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[clap(subcommand)]
        command: TestCommand,
    }

    #[derive(Debug, Subcommand)]
    enum TestCommand {
        Add(AddArgs),
        Edit(EditArgs),
        Remove(RemoveArgs),
        Duplicate(DuplicateArgs),
    }

    fn parse(argv: &[&str]) -> TestCommand {
        let argv = std::iter::once("worktrack").chain(argv.iter().copied());
        TestCli::parse_from(argv).command
    }

    fn add_args(argv: &[&str]) -> AddArgs {
        match parse(argv) {
            TestCommand::Add(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    fn edit_args(argv: &[&str]) -> EditArgs {
        match parse(argv) {
            TestCommand::Edit(args) => args,
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_defaults_to_today() {
        mock_datetime::set_mock_today(NaiveDate::from_ymd_opt(2024, 5, 13).unwrap());
        let mut repository = MockWorkEntryRepository::new();
        repository
            .expect_create_entry()
            .withf(|fields| {
                fields.work_date == NaiveDate::from_ymd_opt(2024, 5, 13).unwrap()
                    && fields.task_name == "設計"
            })
            .times(1)
            .returning(|_| Ok(entry("new", "Alpha", "開発", "2024-05-13", "09:00", "10:00")));

        let command = EntryCommand::new(&repository);
        let created = command
            .add(&add_args(&[
                "add", "--task", "設計", "--project", "Alpha", "--category", "開発", "--start",
                "09:00", "--end", "10:00",
            ]))
            .await
            .unwrap();

        assert_eq!(created.id, "new");
        mock_datetime::clear_mock_today();
    }

    #[tokio::test]
    async fn test_add_rejects_blank_field_before_request() {
        let mut repository = MockWorkEntryRepository::new();
        repository.expect_create_entry().never();

        let command = EntryCommand::new(&repository);
        let error = command
            .add(&add_args(&[
                "add", "--task", " ", "--project", "Alpha", "--category", "開発", "--start",
                "09:00", "--end", "10:00",
            ]))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "タスク名を入力してください");
    }

    #[tokio::test]
    async fn test_add_failure_has_generic_message() {
        let mut repository = MockWorkEntryRepository::new();
        repository
            .expect_create_entry()
            .returning(|_| Err(anyhow::anyhow!("503 Service Unavailable")));

        let command = EntryCommand::new(&repository);
        let error = command
            .add(&add_args(&[
                "add", "--task", "設計", "--project", "Alpha", "--category", "開発", "--date",
                "2024-05-13", "--start", "09:00", "--end", "10:00",
            ]))
            .await
            .unwrap_err();

        assert_eq!(error.to_string(), "保存に失敗しました");
    }

    #[tokio::test]
    async fn test_edit_sends_patch_without_fetch() {
        let mut repository = MockWorkEntryRepository::new();
        repository.expect_get_entry().never();
        repository
            .expect_update_entry()
            .withf(|id, patch| {
                id == "1" && patch.category.as_deref() == Some("会議") && patch.task_name.is_none()
            })
            .times(1)
            .returning(|_, _| Ok(entry("1", "Alpha", "会議", "2024-05-13", "09:00", "10:00")));

        let command = EntryCommand::new(&repository);
        let updated = command
            .edit(&edit_args(&["edit", "1", "--category", "会議"]))
            .await
            .unwrap();

        assert_eq!(updated.category, "会議");
    }

    #[tokio::test]
    async fn test_edit_one_time_checked_against_current() {
        let mut repository = MockWorkEntryRepository::new();
        repository
            .expect_get_entry()
            .times(1)
            .returning(|_| Ok(entry("1", "Alpha", "開発", "2024-05-13", "09:00", "10:00")));
        repository.expect_update_entry().never();

        let command = EntryCommand::new(&repository);
        let error = command
            .edit(&edit_args(&["edit", "1", "--start", "10:30"]))
            .await
            .unwrap_err();

        assert_eq!(
            error.downcast_ref::<ValidationError>(),
            Some(&ValidationError::EndNotAfterStart)
        );
    }

    #[tokio::test]
    async fn test_edit_without_changes() {
        let mut repository = MockWorkEntryRepository::new();
        repository.expect_update_entry().never();

        let command = EntryCommand::new(&repository);
        let error = command
            .edit(&edit_args(&["edit", "1"]))
            .await
            .unwrap_err();

        assert_eq!(
            error.downcast_ref::<ValidationError>(),
            Some(&ValidationError::NothingToUpdate)
        );
    }

    #[tokio::test]
    async fn test_remove() {
        let mut repository = MockWorkEntryRepository::new();
        repository
            .expect_delete_entry()
            .withf(|id| id == "abc")
            .times(1)
            .returning(|_| Ok(()));

        let command = EntryCommand::new(&repository);
        let args = match parse(&["remove", "abc"]) {
            TestCommand::Remove(args) => args,
            other => panic!("unexpected command: {:?}", other),
        };

        command.remove(&args).await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_uses_today() {
        mock_datetime::set_mock_today(NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        let mut repository = MockWorkEntryRepository::new();
        repository
            .expect_get_entry()
            .returning(|_| Ok(entry("1", "Alpha", "開発", "2024-05-13", "09:00", "10:00")));
        repository
            .expect_create_entry()
            .withf(|fields| {
                fields.work_date == NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
                    && fields.project_name == "Alpha"
                    && fields.task_name == "task-1"
            })
            .times(1)
            .returning(|_| Ok(entry("2", "Alpha", "開発", "2024-06-03", "13:00", "14:00")));

        let command = EntryCommand::new(&repository);
        let args = match parse(&["duplicate", "1", "--start", "13:00", "--end", "14:00"]) {
            TestCommand::Duplicate(args) => args,
            other => panic!("unexpected command: {:?}", other),
        };
        let copy = command.duplicate(&args).await.unwrap();

        assert_eq!(copy.id, "2");
        mock_datetime::clear_mock_today();
    }
}
