use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use log::debug;

use crate::collaborator::WorkEntryRepository;

/// フォーカスが外れてから候補を閉じるまでの猶予。
///
/// フォーカスが外れる直前に発生したポインタでの選択を受け付けるために必要となる。
/// `SuggestionInput`はタイマーを持たない。呼び出し側が`InputEvent::Blur`の後にこの時間を計測し、
/// `InputEvent::BlurGraceElapsed`を送る。
pub const BLUR_GRACE: Duration = Duration::from_millis(200);

/// 候補を取得する項目。
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SuggestField {
    Tasks,
    Projects,
    Categories,
}

impl SuggestField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestField::Tasks => "tasks",
            SuggestField::Projects => "projects",
            SuggestField::Categories => "categories",
        }
    }
}

impl FromStr for SuggestField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tasks" => Ok(SuggestField::Tasks),
            "projects" => Ok(SuggestField::Projects),
            "categories" => Ok(SuggestField::Categories),
            _ => anyhow::bail!(
                "Unknown field: {} (expected tasks, projects or categories)",
                s
            ),
        }
    }
}

/// 既存の値のうち、`query`を大文字小文字を区別せずに含むものを元の順序のまま返す。
///
/// `query`が空の場合は全ての値を返す。
///
/// # Examples
///
/// ```
/// use worktrack::suggest::match_suggestions;
///
/// let known = vec!["Alpha".to_string(), "beta".to_string(), "Gamma".to_string()];
/// assert_eq!(match_suggestions(&known, "A"), vec!["Alpha", "Gamma"]);
/// ```
pub fn match_suggestions<'a>(known: &'a [String], query: &str) -> Vec<&'a str> {
    if query.is_empty() {
        return known.iter().map(String::as_str).collect();
    }

    let query = query.to_lowercase();
    known
        .iter()
        .filter(|value| value.to_lowercase().contains(&query))
        .map(String::as_str)
        .collect()
}

/// 項目ごとの既存の値のキャッシュ。
///
/// 値は項目ごとに1度だけ取得し、入力のたびに問い合わせることはない。
#[derive(Debug, Default)]
pub struct SuggestionCache {
    values: HashMap<SuggestField, Vec<String>>,
}

impl SuggestionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 項目の既存の値を返す。未取得の場合のみcollaboratorから取得する。
    pub async fn get<T: WorkEntryRepository>(
        &mut self,
        repository: &T,
        field: SuggestField,
    ) -> Result<&[String]> {
        if !self.values.contains_key(&field) {
            let values = repository
                .list_suggestions(field)
                .await
                .with_context(|| format!("Failed to fetch suggestions: {}", field.as_str()))?;
            debug!("suggestions for {}: {}", field.as_str(), values.len());
            self.values.insert(field, values);
        }

        Ok(self.values.get(&field).map(Vec::as_slice).unwrap_or_default())
    }
}

/// 候補一覧の表示状態。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PopupState {
    Closed,
    Open,
}

/// 入力欄で発生する操作。
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Focus,
    /// 入力欄の値が変更された
    Input(String),
    ArrowDown,
    ArrowUp,
    Enter,
    Escape,
    /// ポインタが候補に重なった
    Hover(usize),
    /// 候補をクリックした
    Click(usize),
    /// フォーカスが外れた。`BLUR_GRACE`の後に`BlurGraceElapsed`を送ること。
    Blur,
    BlurGraceElapsed,
    /// 入力欄の外側をクリックした
    OutsideClick,
    /// ポインタが入力欄と候補一覧の外に出た
    PointerLeave,
}

/// 候補付きの入力欄の状態。
#[derive(Clone, Debug)]
pub struct SuggestionInput {
    known: Vec<String>,
    value: String,
    filtered: Vec<String>,
    state: PopupState,
    active: Option<usize>,
    blur_pending: bool,
}

impl SuggestionInput {
    /// 新しい`SuggestionInput`を返す。
    ///
    /// # Arguments
    ///
    /// * `known` - 候補となる既存の値
    /// * `value` - 入力欄の初期値
    pub fn new(known: Vec<String>, value: &str) -> Self {
        let mut input = Self {
            known,
            value: value.to_string(),
            filtered: vec![],
            state: PopupState::Closed,
            active: None,
            blur_pending: false,
        };
        input.refilter();
        input
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    /// 現在の入力値に一致する候補。
    pub fn suggestions(&self) -> &[String] {
        &self.filtered
    }

    /// 候補一覧を表示すべき場合は`true`を返す。
    pub fn is_visible(&self) -> bool {
        self.state == PopupState::Open && !self.filtered.is_empty()
    }

    /// 候補の元になる既存の値を置き換える。
    pub fn set_known(&mut self, known: Vec<String>) {
        self.known = known;
        self.refilter();
    }

    /// 操作を処理する。候補が確定した場合はその値を返す。
    pub fn handle(&mut self, event: InputEvent) -> Option<String> {
        let open = self.state == PopupState::Open;
        match event {
            InputEvent::Focus => {
                self.state = PopupState::Open;
                self.blur_pending = false;
            }
            InputEvent::Input(value) => {
                self.value = value;
                self.refilter();
            }
            InputEvent::ArrowDown if open && !self.filtered.is_empty() => {
                self.active = match self.active {
                    Some(index) if index + 1 < self.filtered.len() => Some(index + 1),
                    _ => Some(0),
                };
            }
            InputEvent::ArrowUp if open && !self.filtered.is_empty() => {
                self.active = match self.active {
                    Some(index) if index > 0 => Some(index - 1),
                    _ => Some(self.filtered.len() - 1),
                };
            }
            InputEvent::Enter if open => {
                if let Some(index) = self.active {
                    return self.commit(index);
                }
            }
            InputEvent::Escape if open => self.close(),
            InputEvent::Hover(index) if open && index < self.filtered.len() => {
                self.active = Some(index);
            }
            InputEvent::Click(index) if open => return self.commit(index),
            InputEvent::Blur if open => self.blur_pending = true,
            InputEvent::BlurGraceElapsed if self.blur_pending => self.close(),
            InputEvent::OutsideClick | InputEvent::PointerLeave if open => self.close(),
            _ => {}
        }
        None
    }

    fn commit(&mut self, index: usize) -> Option<String> {
        let selected = self.filtered.get(index)?.clone();
        self.value = selected.clone();
        self.refilter();
        self.close();
        Some(selected)
    }

    fn close(&mut self) {
        self.state = PopupState::Closed;
        self.active = None;
        self.blur_pending = false;
    }

    fn refilter(&mut self) {
        self.filtered = match_suggestions(&self.known, &self.value)
            .into_iter()
            .map(String::from)
            .collect();
        self.active = None;
    }
}
