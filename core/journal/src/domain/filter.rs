//! 一覧の絞り込み（キーワード + テキスト検索）
//!
//! 元の行は保持したまま、表示する部分集合だけを計算する純粋関数。

use super::place_entry::PlaceEntry;

/// 表示する行を選ぶ。キーワードで絞ってから、テキスト検索でさらに絞る（AND）。
///
/// - キーワードは trim 後の完全一致（大文字小文字を区別）
/// - 検索語は trim して小文字化し、いずれかの検索対象列に部分一致すれば残す（OR）
/// - 空のキーワード・空の検索語は条件なし
pub fn apply_filters<'a, E: PlaceEntry>(
    entries: &'a [E],
    selected_keyword: Option<&str>,
    search_query: &str,
) -> Vec<&'a E> {
    let keyword = selected_keyword.filter(|k| !k.is_empty());
    let query = search_query.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| match keyword {
            Some(k) => e.keyword().map(str::trim) == Some(k),
            None => true,
        })
        .filter(|e| {
            query.is_empty()
                || e
                    .search_fields()
                    .iter()
                    .any(|f| f.to_lowercase().contains(&query))
        })
        .collect()
}

/// 一覧画面の絞り込み UI 状態
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    pub selected_keyword: Option<String>,
    pub keyword_menu_open: bool,
    pub search_query: String,
}

impl FilterState {
    /// 検索語を更新する。空にしたときはキーワードメニューも閉じる。
    pub fn set_search_query(&mut self, query: &str) {
        self.search_query = query.to_string();
        if query.trim().is_empty() {
            self.keyword_menu_open = false;
        }
    }

    pub fn toggle_keyword_menu(&mut self) {
        self.keyword_menu_open = !self.keyword_menu_open;
    }

    /// キーワードを選ぶ（None で解除）。選んだらメニューは閉じる。
    pub fn select_keyword(&mut self, keyword: Option<&str>) {
        self.selected_keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        self.keyword_menu_open = false;
    }

    pub fn apply<'a, E: PlaceEntry>(&self, entries: &'a [E]) -> Vec<&'a E> {
        apply_filters(entries, self.selected_keyword.as_deref(), &self.search_query)
    }
}
