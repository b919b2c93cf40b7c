use std::collections::{BTreeMap, BTreeSet};

/// タイムラインのブロックに利用する色のパレット。
pub const PALETTE: [&str; 10] = [
    "#2d8a8a", "#8a6b2d", "#5e2d8a", "#8a2d5e", "#2d5e8a", "#6b8a2d", "#8a2d2d", "#2d8a6b",
    "#5e8a2d", "#8a5e2d",
];

/// マップに存在しない名前に割り当てる色。
pub const DEFAULT_COLOR: &str = "#6b7280";

/// 名前から色への対応表。
///
/// 名前を辞書順に並べた位置でパレットの色を割り当てるため、
/// 同じ名前の集合からは入力順序に関係なく常に同じ対応表が得られる。
/// 名前の集合が変わった場合は作り直す必要がある。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorMap {
    colors: BTreeMap<String, &'static str>,
}

impl ColorMap {
    /// 名前の集合から新しい`ColorMap`を返す。
    ///
    /// 重複した名前は1つとして扱う。
    ///
    /// # Examples
    ///
    /// ```
    /// use worktrack::colors::{ColorMap, PALETTE};
    ///
    /// let map = ColorMap::build(["b", "a", "c"]);
    /// assert_eq!(map.color_of("a"), PALETTE[0]);
    /// ```
    pub fn build<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let colors = sorted
            .into_iter()
            .enumerate()
            .map(|(index, name)| (name, PALETTE[index % PALETTE.len()]))
            .collect();

        Self { colors }
    }

    /// 名前に対応する色を返す。未知の名前には`DEFAULT_COLOR`を返す。
    pub fn color_of(&self, name: &str) -> &'static str {
        self.colors.get(name).copied().unwrap_or(DEFAULT_COLOR)
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}
