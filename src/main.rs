use std::io;

use anyhow::Result;
use clap::{Parser, Subcommand};

use worktrack::collaborator::ApiClient;
use worktrack::config::Config;
use worktrack::datetime::now;
use worktrack::console::{ConsoleMarkdownList, ConsolePresenter};
use worktrack::entry_command::{AddArgs, DuplicateArgs, EditArgs, EntryCommand, RemoveArgs};
use worktrack::export_command::{ExportArgs, ExportCommand};
use worktrack::logger::setup_logger;
use worktrack::purge_command::{PurgeArgs, PurgeCommand};
use worktrack::report::format_duration;
use worktrack::report_command::{ReportArgs, ReportCommand};
use worktrack::suggest_command::{SuggestArgs, SuggestCommand};
use worktrack::timeline_command::{TimelineArgs, TimelineCommand};
use worktrack::track_command::{TrackAction, TrackArgs, TrackCommand, TrackingStore};

/// 作業記録を週のタイムラインやレポートとして表示するためのCLIアプリケーション。
///
/// # Examples
/// ```
/// $ cargo run -- timeline --week 2024-05-13
/// $ cargo run -- report --from 2024-05-01 --to 2024-05-31 --group-by category
/// ```
#[derive(Debug, Parser)]
#[clap(version, about)]
struct Args {
    #[clap(long = "api-url", global = true, help = "Base URL of the work entry API")]
    api_url: Option<String>,

    #[clap(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

/// サブコマンドを表す列挙型。
#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Show the Monday-Friday timeline of a week
    Timeline(TimelineArgs),
    /// Summarize work time by project or category
    Report(ReportArgs),
    /// Record a work entry
    Add(AddArgs),
    /// Update fields of a work entry
    Edit(EditArgs),
    /// Delete a work entry
    Remove(RemoveArgs),
    /// Copy a work entry onto today
    Duplicate(DuplicateArgs),
    /// Save the entries of a date range as CSV
    Export(ExportArgs),
    /// Delete all entries of a date range
    Purge(PurgeArgs),
    /// List known values of a field matching a query
    Suggest(SuggestArgs),
    /// Track a task live and record it when stopped
    Track(TrackArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    setup_logger(args.verbose)?;

    let config = Config::load(args.api_url.as_deref());
    let client = ApiClient::new(&config.api_url);
    let mut stdout = io::stdout();
    let mut presenter = ConsoleMarkdownList::new(&mut stdout);

    match args.subcommand {
        SubCommands::Timeline(timeline) => {
            let mut command = TimelineCommand::new(&client);
            let layout = command.run(&timeline).await?;
            presenter.show_timeline(&layout)?;
        }
        SubCommands::Report(report) => {
            let mut command = ReportCommand::new(&client);
            let view = command.run(&report).await?;
            presenter.show_report(&view.summary, view.group_by)?;
            presenter.show_message(&format!(
                "プロジェクト: {}",
                view.project_options.join(", ")
            ))?;
            presenter.show_message(&format!(
                "カテゴリ: {}",
                view.category_options.join(", ")
            ))?;
        }
        SubCommands::Add(add) => {
            let entry = EntryCommand::new(&client).add(&add).await?;
            presenter.show_entries(&[entry])?;
        }
        SubCommands::Edit(edit) => {
            let entry = EntryCommand::new(&client).edit(&edit).await?;
            presenter.show_entries(&[entry])?;
        }
        SubCommands::Remove(remove) => {
            EntryCommand::new(&client).remove(&remove).await?;
            presenter.show_message("削除しました")?;
        }
        SubCommands::Duplicate(duplicate) => {
            let entry = EntryCommand::new(&client).duplicate(&duplicate).await?;
            presenter.show_entries(&[entry])?;
        }
        SubCommands::Export(export) => {
            let path = ExportCommand::new(&client).run(&export).await?;
            presenter.show_message(&format!("{}に保存しました", path.display()))?;
        }
        SubCommands::Purge(purge) => {
            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut prompt = io::stderr();
            let deleted = PurgeCommand::new(&client)
                .run(&purge, &mut input, &mut prompt)
                .await?;
            match deleted {
                Some(count) => {
                    presenter.show_message(&format!("{}件のデータを削除しました", count))?
                }
                None => presenter.show_message("削除を取り消しました")?,
            }
        }
        SubCommands::Suggest(suggest) => {
            let values = SuggestCommand::new(&client).run(&suggest).await?;
            for value in values {
                presenter.show_message(&value)?;
            }
        }
        SubCommands::Track(track) => {
            let command = TrackCommand::new(&client, TrackingStore::default_location());
            match track.action {
                TrackAction::Start(start) => {
                    let state = command.start(&start).await?;
                    presenter.show_message(&format!(
                        "計測を開始しました: {} ({})",
                        state.task_name,
                        state.started_at.format("%H:%M:%S")
                    ))?;
                }
                TrackAction::Stop => {
                    let entry = command.stop().await?;
                    presenter.show_entries(&[entry])?;
                }
                TrackAction::Cancel => match command.cancel().await? {
                    Some(state) => presenter.show_message(&format!(
                        "計測を取り消しました: {}",
                        state.task_name
                    ))?,
                    None => presenter.show_message("計測中の作業はありません")?,
                },
                TrackAction::Status => match command.status().await? {
                    Some(state) => presenter.show_message(&format!(
                        "計測中: {} / {} / {} ({})",
                        state.task_name,
                        state.project_name,
                        state.category,
                        format_duration(state.elapsed_seconds(now()))
                    ))?,
                    None => presenter.show_message("計測中の作業はありません")?,
                },
            }
        }
    }

    Ok(())
}
