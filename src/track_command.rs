use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{NaiveDateTime, Timelike};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::collaborator::WorkEntryRepository;
use crate::datetime::now;
use crate::error::ValidationError;
use crate::work_entry::{required, EntryFields, WorkEntry};

const STATE_FILE_NAME: &str = "tracking.json";

/// `track`サブコマンドの引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct TrackArgs {
    #[clap(subcommand)]
    pub action: TrackAction,
}

/// `track`サブコマンドの操作。
#[derive(Debug, clap::Subcommand)]
pub enum TrackAction {
    /// Start tracking a task from now
    Start(TrackStartArgs),
    /// Stop tracking and record the work entry
    Stop,
    /// Discard the running tracking without recording
    Cancel,
    /// Show the running tracking
    Status,
}

/// `track start`の引数を表す構造体。
#[derive(Debug, clap::Args)]
pub struct TrackStartArgs {
    #[clap(long = "task")]
    task: String,

    #[clap(long = "project")]
    project: String,

    #[clap(long = "category")]
    category: String,
}

/// 計測中の作業。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingState {
    pub task_name: String,
    pub project_name: String,
    pub category: String,
    pub started_at: NaiveDateTime,
}

impl TrackingState {
    /// 開始からの経過秒数を返す。
    pub fn elapsed_seconds(&self, now: NaiveDateTime) -> i64 {
        (now - self.started_at).num_seconds().max(0)
    }
}

/// 計測中の作業をファイルに保存する。
///
/// 計測はコマンドの実行を跨ぐため、開始時の内容をJSONとして保存しておく。
#[derive(Clone, Debug)]
pub struct TrackingStore {
    path: PathBuf,
}

impl TrackingStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// ユーザーのデータディレクトリに保存する`TrackingStore`を返す。
    pub fn default_location() -> Self {
        let directory = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self::new(directory.join("worktrack").join(STATE_FILE_NAME))
    }

    /// 計測中の作業を読み込む。計測していない場合は`None`を返す。
    pub async fn load(&self) -> Result<Option<TrackingState>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let state = serde_json::from_slice(&bytes).with_context(|| {
                    format!("Failed to parse tracking state: {}", self.path.display())
                })?;
                Ok(Some(state))
            }
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error)
                .with_context(|| format!("Failed to read file: {}", self.path.display())),
        }
    }

    pub async fn save(&self, state: &TrackingState) -> Result<()> {
        if let Some(directory) = self.path.parent() {
            tokio::fs::create_dir_all(directory)
                .await
                .with_context(|| format!("Failed to create directory: {}", directory.display()))?;
        }
        let contents =
            serde_json::to_vec_pretty(state).context("Failed to serialize tracking state")?;
        tokio::fs::write(&self.path, contents)
            .await
            .with_context(|| format!("Failed to write file: {}", self.path.display()))
    }

    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Err(error) if error.kind() != ErrorKind::NotFound => Err(error)
                .with_context(|| format!("Failed to remove file: {}", self.path.display())),
            _ => Ok(()),
        }
    }
}

/// 作業時間を計測し、終了時に作業記録として登録するためのコマンド。
pub struct TrackCommand<'a, T: WorkEntryRepository> {
    repository: &'a T,
    store: TrackingStore,
}

impl<'a, T: WorkEntryRepository> TrackCommand<'a, T> {
    /// 新しい`TrackCommand`を返す。
    ///
    /// # Arguments
    /// * `repository` - 作業記録を登録するためのリポジトリ
    /// * `store` - 計測中の作業の保存先
    pub fn new(repository: &'a T, store: TrackingStore) -> Self {
        Self { repository, store }
    }

    /// 現在時刻から計測を開始する。既に計測中の場合はエラーを返す。
    pub async fn start(&self, args: &TrackStartArgs) -> Result<TrackingState> {
        if let Some(running) = self.store.load().await? {
            bail!("既に計測中です: {}", running.task_name);
        }

        let started_at = now();
        let state = TrackingState {
            task_name: required(&args.task, "タスク名")?,
            project_name: required(&args.project, "プロジェクト名")?,
            category: required(&args.category, "カテゴリ")?,
            started_at: started_at.with_nanosecond(0).unwrap_or(started_at),
        };
        self.store.save(&state).await?;
        info!("Tracking started: {} at {}", state.task_name, state.started_at);

        Ok(state)
    }

    /// 計測を終了し、開始日を作業日とした作業記録を登録する。
    ///
    /// 登録に失敗した場合は計測中のまま残すため、再度`stop`できる。
    /// 日付を跨いだ計測は登録できないため、`cancel`で破棄する。
    pub async fn stop(&self) -> Result<WorkEntry> {
        let state = self
            .store
            .load()
            .await?
            .context("計測中の作業はありません")?;

        let stopped_at = now();
        if stopped_at.date() != state.started_at.date() {
            return Err(ValidationError::EndNotAfterStart.into());
        }
        let fields = EntryFields::new(
            &state.task_name,
            &state.project_name,
            &state.category,
            state.started_at.date(),
            state.started_at.time(),
            stopped_at.time(),
        )?;

        let entry = self
            .repository
            .create_entry(&fields)
            .await
            .context("保存に失敗しました")?;
        self.store.clear().await?;
        info!("Tracking stopped: {} ({})", entry.id, entry.duration_seconds);

        Ok(entry)
    }

    /// 計測を記録せずに破棄し、破棄した内容を返す。
    pub async fn cancel(&self) -> Result<Option<TrackingState>> {
        let state = self.store.load().await?;
        self.store.clear().await?;
        debug!("Tracking cancelled: {:?}", state);

        Ok(state)
    }

    /// 計測中の作業を返す。
    pub async fn status(&self) -> Result<Option<TrackingState>> {
        self.store.load().await
    }
}
