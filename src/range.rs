use chrono::{Months, NaiveDate};

use crate::error::ValidationError;

/// 指定可能な期間の最大月数。
pub const MAX_RANGE_MONTHS: u32 = 12;

/// 期間が指定可能な範囲かどうかを判定する。
///
/// `from <= to`かつ`to`が`from`から12ヶ月以内の場合に有効とする。
/// レポート、CSVエクスポート、一括削除で共通して利用する。
///
/// # Arguments
///
/// * `from` - 期間の開始日
/// * `to` - 期間の終了日
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use worktrack::range::is_valid_range;
///
/// let from = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let to = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
/// assert!(is_valid_range(from, to));
/// ```
pub fn is_valid_range(from: NaiveDate, to: NaiveDate) -> bool {
    validate_range(from, to).is_ok()
}

/// 期間を検証し、不正な場合はその理由を返す。
pub fn validate_range(from: NaiveDate, to: NaiveDate) -> Result<(), ValidationError> {
    if from > to {
        return Err(ValidationError::RangeInverted);
    }
    // 月末を超える日付は月末に丸められる (例: 2024-02-29 + 12ヶ月 = 2025-02-28)
    match from.checked_add_months(Months::new(MAX_RANGE_MONTHS)) {
        Some(limit) if to > limit => Err(ValidationError::RangeTooLong),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rstest::rstest;

    use super::{is_valid_range, validate_range};
    use crate::error::ValidationError;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[rstest]
    #[case::same_day("2024-01-01", "2024-01-01", true)]
    #[case::within_year("2024-01-01", "2024-12-31", true)]
    #[case::exactly_twelve_months("2024-01-01", "2025-01-01", true)]
    #[case::one_day_over("2024-01-01", "2025-01-02", false)]
    #[case::inverted("2024-03-01", "2024-02-29", false)]
    #[case::leap_day_clamped("2024-02-29", "2025-02-28", true)]
    #[case::leap_day_over("2024-02-29", "2025-03-01", false)]
    fn test_is_valid_range(#[case] from: &str, #[case] to: &str, #[case] expected: bool) {
        assert_eq!(is_valid_range(date(from), date(to)), expected);
    }

    #[test]
    fn test_validate_range_reason() {
        assert_eq!(
            validate_range(date("2024-02-01"), date("2024-01-01")),
            Err(ValidationError::RangeInverted)
        );
        assert_eq!(
            validate_range(date("2024-01-01"), date("2025-06-01")),
            Err(ValidationError::RangeTooLong)
        );
        assert_eq!(
            ValidationError::RangeTooLong.to_string(),
            "期間は最長12ヶ月です"
        );
    }
}
