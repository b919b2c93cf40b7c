use thiserror::Error;

/// 入力値の検証エラー。
///
/// 表示文字列はそのままユーザーに提示するメッセージとして利用する。
/// 検証エラーはcollaboratorへのリクエスト前に検出され、リクエストは送信されない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("期間は最長12ヶ月です")]
    RangeTooLong,

    #[error("開始日は終了日以前を指定してください")]
    RangeInverted,

    #[error("{0}を入力してください")]
    MissingField(&'static str),

    #[error("終了時刻は開始時刻より後を指定してください")]
    EndNotAfterStart,

    #[error("更新する項目を指定してください")]
    NothingToUpdate,

    #[error("表示時間帯が不正です: {start}時〜{end}時")]
    InvalidHourWindow { start: u32, end: u32 },
}
