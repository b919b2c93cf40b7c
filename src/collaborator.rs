use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::{debug, info};
#[cfg(test)]
use mockall::automock;
use reqwest::{header::CONTENT_TYPE, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::report::{ReportQuery, ReportSummary};
use crate::suggest::SuggestField;
use crate::work_entry::{EntryFields, EntryPatch, WorkEntry};

/// 作業記録を取得する際の期間の指定方法。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntryQuery {
    /// 期間を指定しない
    All,
    /// 指定した日付を含む週の月曜〜金曜
    WeekOf(NaiveDate),
    /// 開始日、終了日を含む期間
    Range {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
}

impl EntryQuery {
    /// 開始日と終了日の両方を指定した期間を返す。
    pub fn between(from: NaiveDate, to: NaiveDate) -> Self {
        EntryQuery::Range {
            from: Some(from),
            to: Some(to),
        }
    }

    fn params(&self) -> Vec<(&'static str, String)> {
        match self {
            EntryQuery::All => vec![],
            EntryQuery::WeekOf(date) => vec![("week_of", date.to_string())],
            EntryQuery::Range { from, to } => [("from", from), ("to", to)]
                .into_iter()
                .filter_map(|(key, date)| date.map(|date| (key, date.to_string())))
                .collect(),
        }
    }
}

/// 作業記録の保存、候補の取得、集計、CSV生成を担う外部サービスとの境界。
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WorkEntryRepository: Send + Sync {
    /// 作業記録を作業日、開始時刻の順で取得する。
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<WorkEntry>>;

    /// 作業記録を1件取得する。
    async fn get_entry(&self, id: &str) -> Result<WorkEntry>;

    /// 作業記録を登録する。
    async fn create_entry(&self, fields: &EntryFields) -> Result<WorkEntry>;

    /// 作業記録を部分的に更新する。
    async fn update_entry(&self, id: &str, patch: &EntryPatch) -> Result<WorkEntry>;

    /// 作業記録を1件削除する。
    async fn delete_entry(&self, id: &str) -> Result<()>;

    /// 期間内の作業記録を一括で削除し、削除した件数を返す。
    async fn delete_entries(&self, from: NaiveDate, to: NaiveDate) -> Result<u64>;

    /// 項目ごとの既存の値を取得する。
    async fn list_suggestions(&self, field: SuggestField) -> Result<Vec<String>>;

    /// collaborator側で集計したレポートを取得する。
    async fn get_report_summary(&self, query: &ReportQuery) -> Result<ReportSummary>;

    /// 期間内の作業記録のCSVを取得できるURLを返す。
    fn export_url(&self, from: NaiveDate, to: NaiveDate) -> String;

    /// 期間内の作業記録のCSVを取得する。
    async fn download_export(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<u8>>;
}

/// 一括削除のレスポンスをデシリアライズするための構造体。
#[derive(Debug, Deserialize)]
struct DeleteResult {
    deleted_count: u64,
}

/// 作業記録APIと通信するためのクライアント。
///
/// # Examples
///
/// ```no_run
/// # async fn run() -> anyhow::Result<()> {
/// use worktrack::collaborator::{ApiClient, EntryQuery, WorkEntryRepository};
///
/// let client = ApiClient::new("http://localhost:8000/api");
/// let entries = client.list_entries(&EntryQuery::All).await?;
/// # Ok(())
/// # }
/// ```
pub struct ApiClient {
    client: Client,
    api_url: String,
}

impl ApiClient {
    /// 新しい`ApiClient`を返す。
    ///
    /// # Arguments
    ///
    /// * `api_url` - APIのベースURL。末尾の`/`は取り除く。
    pub fn new(api_url: &str) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    /// リクエストを送信し、成功以外のステータスはエラーとして返す。
    async fn send(&self, request: RequestBuilder) -> Result<reqwest::Response> {
        request
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", self.api_url))?
            .error_for_status()
            .context("Request returned an error status")
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        self.send(request)
            .await?
            .json::<T>()
            .await
            .context("Failed to deserialize response")
    }
}

#[async_trait]
impl WorkEntryRepository for ApiClient {
    async fn list_entries(&self, query: &EntryQuery) -> Result<Vec<WorkEntry>> {
        let entries: Vec<WorkEntry> = self
            .send_json(
                self.client
                    .get(self.url("/entries"))
                    .query(&query.params()),
            )
            .await?;
        info!("length of entries: {}", entries.len());

        Ok(entries)
    }

    async fn get_entry(&self, id: &str) -> Result<WorkEntry> {
        self.send_json(self.client.get(self.url(&format!("/entries/{}", id))))
            .await
    }

    async fn create_entry(&self, fields: &EntryFields) -> Result<WorkEntry> {
        let entry: WorkEntry = self
            .send_json(
                self.client
                    .post(self.url("/entries"))
                    .header(CONTENT_TYPE, "application/json")
                    .json(fields),
            )
            .await?;
        debug!("created entry: {}", entry.id);

        Ok(entry)
    }

    async fn update_entry(&self, id: &str, patch: &EntryPatch) -> Result<WorkEntry> {
        self.send_json(
            self.client
                .put(self.url(&format!("/entries/{}", id)))
                .header(CONTENT_TYPE, "application/json")
                .json(patch),
        )
        .await
    }

    async fn delete_entry(&self, id: &str) -> Result<()> {
        self.send(self.client.delete(self.url(&format!("/entries/{}", id))))
            .await?;

        Ok(())
    }

    async fn delete_entries(&self, from: NaiveDate, to: NaiveDate) -> Result<u64> {
        let result: DeleteResult = self
            .send_json(
                self.client
                    .delete(self.url("/entries"))
                    .query(&EntryQuery::between(from, to).params()),
            )
            .await?;
        info!("deleted entries: {}", result.deleted_count);

        Ok(result.deleted_count)
    }

    async fn list_suggestions(&self, field: SuggestField) -> Result<Vec<String>> {
        self.send_json(
            self.client
                .get(self.url(&format!("/suggestions/{}", field.as_str()))),
        )
        .await
    }

    async fn get_report_summary(&self, query: &ReportQuery) -> Result<ReportSummary> {
        let mut params = vec![
            ("from", query.from.to_string()),
            ("to", query.to.to_string()),
            ("group_by", query.group_by.as_str().to_string()),
        ];
        if !query.projects.is_empty() {
            params.push(("projects", query.projects.join(",")));
        }
        if !query.categories.is_empty() {
            params.push(("categories", query.categories.join(",")));
        }

        self.send_json(self.client.get(self.url("/reports/summary")).query(&params))
            .await
    }

    fn export_url(&self, from: NaiveDate, to: NaiveDate) -> String {
        format!("{}?from={}&to={}", self.url("/export/csv"), from, to)
    }

    async fn download_export(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<u8>> {
        let url = self.export_url(from, to);
        let bytes = self
            .send(self.client.get(&url))
            .await?
            .bytes()
            .await
            .with_context(|| format!("Failed to read response body from {}", url))?;

        Ok(bytes.to_vec())
    }
}
