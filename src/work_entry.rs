use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// 1件の作業記録。
///
/// IDやタイムスタンプはcollaboratorが割り当てる。このクレートでは読み取り専用として扱う。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkEntry {
    pub id: String,
    pub task_name: String,
    pub project_name: String,
    pub category: String,
    pub work_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_seconds: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl WorkEntry {
    /// タスク名、プロジェクト名、カテゴリを引き継ぎ、作業日を`today`とした複製を作成する。
    ///
    /// # Arguments
    ///
    /// * `today` - 複製先の作業日
    /// * `start_time` - 複製先の開始時刻
    /// * `end_time` - 複製先の終了時刻
    pub fn duplicate(
        &self,
        today: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<EntryFields, ValidationError> {
        EntryFields::new(
            &self.task_name,
            &self.project_name,
            &self.category,
            today,
            start_time,
            end_time,
        )
    }
}

/// 集計や色分けに利用する項目。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GroupBy {
    #[default]
    Project,
    Category,
}

impl GroupBy {
    /// 作業記録からこの項目の値を取り出す。
    pub fn key<'a>(&self, entry: &'a WorkEntry) -> &'a str {
        match self {
            GroupBy::Project => &entry.project_name,
            GroupBy::Category => &entry.category,
        }
    }

    /// collaboratorとの通信で利用する名前を返す。
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupBy::Project => "project",
            GroupBy::Category => "category",
        }
    }
}

impl FromStr for GroupBy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "project" => Ok(GroupBy::Project),
            "category" => Ok(GroupBy::Category),
            _ => anyhow::bail!("Unknown group: {} (expected project or category)", s),
        }
    }
}

/// 作業記録を登録するための入力値。
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EntryFields {
    pub task_name: String,
    pub project_name: String,
    pub category: String,
    pub work_date: NaiveDate,
    #[serde(serialize_with = "serialize_clock_time")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "serialize_clock_time")]
    pub end_time: NaiveTime,
}

impl EntryFields {
    /// 入力値を検証し、新しい`EntryFields`を返す。
    ///
    /// 文字列の前後の空白は取り除く。空の項目や終了時刻が開始時刻以前の場合はエラーを返す。
    pub fn new(
        task_name: &str,
        project_name: &str,
        category: &str,
        work_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Self, ValidationError> {
        let fields = Self {
            task_name: required(task_name, "タスク名")?,
            project_name: required(project_name, "プロジェクト名")?,
            category: required(category, "カテゴリ")?,
            work_date,
            start_time: truncate_to_seconds(start_time),
            end_time: truncate_to_seconds(end_time),
        };
        duration_seconds(fields.start_time, fields.end_time)?;

        Ok(fields)
    }
}

/// 作業記録を部分的に更新するための入力値。
///
/// `None`の項目は送信しない。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EntryPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_date: Option<NaiveDate>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_clock_time"
    )]
    pub start_time: Option<NaiveTime>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_clock_time"
    )]
    pub end_time: Option<NaiveTime>,
}

impl EntryPatch {
    /// 更新する項目が1つもない場合は`true`を返す。
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// 更新内容だけで判断できる範囲を検証する。
    ///
    /// 空にする項目がある場合や、開始時刻と終了時刻の両方を指定して終了時刻が開始時刻以前の場合はエラーを返す。
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.is_empty() {
            return Err(ValidationError::NothingToUpdate);
        }
        let check = |value: &Option<String>, label: &'static str| match value {
            Some(value) => required(value, label).map(|_| ()),
            None => Ok(()),
        };
        check(&self.task_name, "タスク名")?;
        check(&self.project_name, "プロジェクト名")?;
        check(&self.category, "カテゴリ")?;

        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => duration_seconds(start, end).map(|_| ()),
            _ => Ok(()),
        }
    }

    /// 開始時刻と終了時刻の片方だけを更新する場合は`true`を返す。
    pub fn changes_one_time(&self) -> bool {
        self.start_time.is_some() != self.end_time.is_some()
    }

    /// 既存の記録にこの更新を適用した結果を検証する。
    pub fn validate_against(&self, current: &WorkEntry) -> Result<(), ValidationError> {
        self.validate()?;

        let start = self.start_time.unwrap_or(current.start_time);
        let end = self.end_time.unwrap_or(current.end_time);
        duration_seconds(start, end).map(|_| ())
    }
}

/// 開始時刻から終了時刻までの秒数を返す。
///
/// 日付を跨ぐ区間は扱わないため、`end <= start`の場合はエラーを返す。
pub fn duration_seconds(start: NaiveTime, end: NaiveTime) -> Result<i64, ValidationError> {
    let seconds = (end - start).num_seconds();
    if seconds <= 0 {
        return Err(ValidationError::EndNotAfterStart);
    }

    Ok(seconds)
}

/// `HH:MM`または`HH:MM:SS`形式の時刻をパースする。
pub fn parse_clock_time(s: &str) -> anyhow::Result<NaiveTime> {
    use anyhow::Context;

    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
        .with_context(|| format!("Failed to parse time: {}", s))
}

/// 時刻を`HH:MM:SS`形式の文字列にする。
pub fn format_clock_time(time: NaiveTime) -> String {
    time.format("%H:%M:%S").to_string()
}

fn truncate_to_seconds(time: NaiveTime) -> NaiveTime {
    time.with_nanosecond(0).unwrap_or(time)
}

pub(crate) fn required(value: &str, label: &'static str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(label));
    }

    Ok(value.to_string())
}

fn serialize_clock_time<S: serde::Serializer>(
    time: &NaiveTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format_clock_time(*time))
}

fn serialize_optional_clock_time<S: serde::Serializer>(
    time: &Option<NaiveTime>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match time {
        Some(time) => serialize_clock_time(time, serializer),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
pub mod fixtures {
    use chrono::{NaiveDate, NaiveTime};

    use super::WorkEntry;

    /// テスト用の作業記録を作成する。
    ///
    /// `start`、`end`は`HH:MM`形式で指定する。
    pub fn entry(
        id: &str,
        project: &str,
        category: &str,
        date: &str,
        start: &str,
        end: &str,
    ) -> WorkEntry {
        let start_time = NaiveTime::parse_from_str(start, "%H:%M").unwrap();
        let end_time = NaiveTime::parse_from_str(end, "%H:%M").unwrap();
        let work_date = NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap();
        let timestamp = work_date.and_hms_opt(23, 0, 0).unwrap();
        WorkEntry {
            id: id.to_string(),
            task_name: format!("task-{}", id),
            project_name: project.to_string(),
            category: category.to_string(),
            work_date,
            start_time,
            end_time,
            duration_seconds: (end_time - start_time).num_seconds(),
            created_at: timestamp,
            updated_at: timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};
    use rstest::rstest;
    use serde_json::json;

    use super::fixtures::entry;
    use super::{duration_seconds, parse_clock_time, EntryFields, EntryPatch, GroupBy, WorkEntry};
    use crate::error::ValidationError;

    fn time(s: &str) -> NaiveTime {
        parse_clock_time(s).unwrap()
    }

    #[rstest]
    #[case::one_hour("09:00", "10:00", Ok(3600))]
    #[case::seconds("09:00:00", "09:00:30", Ok(30))]
    #[case::same_time("09:00", "09:00", Err(ValidationError::EndNotAfterStart))]
    #[case::midnight_crossing("23:00", "01:00", Err(ValidationError::EndNotAfterStart))]
    fn test_duration_seconds(
        #[case] start: &str,
        #[case] end: &str,
        #[case] expected: Result<i64, ValidationError>,
    ) {
        assert_eq!(duration_seconds(time(start), time(end)), expected);
    }

    #[rstest]
    #[case::project("project", GroupBy::Project, "Alpha")]
    #[case::category("category", GroupBy::Category, "開発")]
    fn test_group_by_key(#[case] name: &str, #[case] expected: GroupBy, #[case] key: &str) {
        let group_by: GroupBy = name.parse().unwrap();
        let work = entry("1", "Alpha", "開発", "2024-05-13", "09:00", "10:00");

        assert_eq!(group_by, expected);
        assert_eq!(group_by.key(&work), key);
        assert_eq!(group_by.as_str(), name);
    }

    #[test]
    fn test_group_by_rejects_unknown() {
        assert!("task".parse::<GroupBy>().is_err());
    }

    #[test]
    fn test_parse_clock_time_rejects_garbage() {
        assert!(parse_clock_time("25:00").is_err());
        assert!(parse_clock_time("nine").is_err());
    }

    #[test]
    fn test_deserialize_collaborator_response() {
        let value = json!({
            "id": "5f0c7a52-1e0b-4f7e-9b59-1c1f4a3c2d10",
            "task_name": "設計",
            "project_name": "Alpha",
            "category": "開発",
            "work_date": "2024-05-13",
            "start_time": "09:00:00",
            "end_time": "10:30:00",
            "duration_seconds": 5400,
            "created_at": "2024-05-13T10:30:01.123456",
            "updated_at": "2024-05-13T10:30:01.123456"
        });

        let entry: WorkEntry = serde_json::from_value(value).unwrap();

        assert_eq!(entry.start_time, NaiveTime::from_hms_opt(9, 0, 0).unwrap());
        assert_eq!(entry.end_time, NaiveTime::from_hms_opt(10, 30, 0).unwrap());
        assert_eq!(entry.duration_seconds, (entry.end_time - entry.start_time).num_seconds());
    }

    #[test]
    fn test_entry_fields_are_trimmed_and_serialized_with_seconds() {
        let fields = EntryFields::new(
            " 設計 ",
            "Alpha",
            "開発",
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
            time("09:00"),
            time("10:30"),
        )
        .unwrap();

        assert_eq!(
            serde_json::to_value(&fields).unwrap(),
            json!({
                "task_name": "設計",
                "project_name": "Alpha",
                "category": "開発",
                "work_date": "2024-05-13",
                "start_time": "09:00:00",
                "end_time": "10:30:00"
            })
        );
    }

    #[rstest]
    #[case::task("", "Alpha", "開発", ValidationError::MissingField("タスク名"))]
    #[case::project("設計", "  ", "開発", ValidationError::MissingField("プロジェクト名"))]
    #[case::category("設計", "Alpha", "", ValidationError::MissingField("カテゴリ"))]
    fn test_entry_fields_missing(
        #[case] task: &str,
        #[case] project: &str,
        #[case] category: &str,
        #[case] expected: ValidationError,
    ) {
        let result = EntryFields::new(
            task,
            project,
            category,
            NaiveDate::from_ymd_opt(2024, 5, 13).unwrap(),
            time("09:00"),
            time("10:00"),
        );

        assert_eq!(result, Err(expected));
    }

    #[test]
    fn test_duplicate_moves_to_today() {
        let original = entry("1", "Alpha", "開発", "2024-05-13", "09:00", "10:00");
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        let copy = original
            .duplicate(today, time("13:00"), time("14:00"))
            .unwrap();

        assert_eq!(copy.task_name, original.task_name);
        assert_eq!(copy.project_name, "Alpha");
        assert_eq!(copy.category, "開発");
        assert_eq!(copy.work_date, today);
    }

    #[test]
    fn test_patch_serializes_only_given_fields() {
        let patch = EntryPatch {
            category: Some("会議".to_string()),
            end_time: Some(time("11:00")),
            ..Default::default()
        };

        assert!(!patch.is_empty());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"category": "会議", "end_time": "11:00:00"})
        );
        assert!(EntryPatch::default().is_empty());
    }

    #[test]
    fn test_patch_validate_against_current_times() {
        let current = entry("1", "Alpha", "開発", "2024-05-13", "09:00", "10:00");
        let patch = EntryPatch {
            start_time: Some(time("10:30")),
            ..Default::default()
        };

        assert_eq!(
            patch.validate_against(&current),
            Err(ValidationError::EndNotAfterStart)
        );

        let patch = EntryPatch {
            task_name: Some(" ".to_string()),
            ..Default::default()
        };
        assert_eq!(
            patch.validate_against(&current),
            Err(ValidationError::MissingField("タスク名"))
        );
    }

    #[rstest]
    #[case::empty(EntryPatch::default(), Err(ValidationError::NothingToUpdate))]
    #[case::both_times_inverted(
        EntryPatch {
            start_time: Some(time("11:00")),
            end_time: Some(time("10:00")),
            ..Default::default()
        },
        Err(ValidationError::EndNotAfterStart),
    )]
    #[case::one_time(
        EntryPatch {
            start_time: Some(time("11:00")),
            ..Default::default()
        },
        Ok(()),
    )]
    fn test_patch_validate(
        #[case] patch: EntryPatch,
        #[case] expected: Result<(), ValidationError>,
    ) {
        assert_eq!(patch.validate(), expected);
    }

    #[test]
    fn test_patch_changes_one_time() {
        let start_only = EntryPatch {
            start_time: Some(time("11:00")),
            ..Default::default()
        };
        let both = EntryPatch {
            end_time: Some(time("12:00")),
            ..start_only.clone()
        };

        assert!(start_only.changes_one_time());
        assert!(!both.changes_one_time());
        assert!(!EntryPatch::default().changes_one_time());
    }
}
