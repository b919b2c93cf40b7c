use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use log::info;

use crate::collaborator::WorkEntryRepository;
use crate::datetime::{parse_date, today};
use crate::range::validate_range;

/// `export`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    #[clap(short = 'f', long = "from", help = "[default: today]", parse(try_from_str = parse_date))]
    from: Option<NaiveDate>,

    #[clap(short = 't', long = "to", help = "[default: today]", parse(try_from_str = parse_date))]
    to: Option<NaiveDate>,

    #[clap(
        short = 'o',
        long = "output",
        help = "Directory to save the CSV [default: download directory]",
        parse(from_os_str)
    )]
    output: Option<PathBuf>,
}

/// 期間内の作業記録をCSVファイルとして保存するためのコマンド。
///
/// CSVの生成はcollaboratorが行う。
pub struct ExportCommand<'a, T: WorkEntryRepository> {
    repository: &'a T,
}

impl<'a, T: WorkEntryRepository> ExportCommand<'a, T> {
    /// 新しい`ExportCommand`を返す。
    pub fn new(repository: &'a T) -> Self {
        Self { repository }
    }

    /// `export`サブコマンドの処理を行い、保存したファイルのパスを返す。
    pub async fn run(&self, args: &ExportArgs) -> Result<PathBuf> {
        let from = args.from.unwrap_or_else(today);
        let to = args.to.unwrap_or_else(today);
        validate_range(from, to)?;
        info!("Export url: {}", self.repository.export_url(from, to));

        let csv = self
            .repository
            .download_export(from, to)
            .await
            .context("エクスポートに失敗しました")?;

        let directory = args
            .output
            .clone()
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let path = directory.join(export_file_name(from, to));
        write_file(&path, &csv).await?;
        info!("Saved {} bytes to {}", csv.len(), path.display());

        Ok(path)
    }
}

/// 保存するCSVファイルの名前を返す。
pub fn export_file_name(from: NaiveDate, to: NaiveDate) -> String {
    format!(
        "time_tracking_{}_{}.csv",
        from.format("%Y%m%d"),
        to.format("%Y%m%d")
    )
}

async fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    tokio::fs::write(path, contents)
        .await
        .with_context(|| format!("Failed to write file: {}", path.display()))
}
