//! キーワード集合の導出と並び順
//!
//! キーワードは独立したエンティティではなく、読み込んだ行から毎回導出する。

use super::place_entry::PlaceEntry;
use std::cmp::Ordering;
use std::collections::BTreeSet;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// 照合キー: NFD 分解してアクセントを落とし、小文字化する
fn collation_key(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// 表示用の並び順。アクセント・大文字小文字を無視して比べ、同順位はコードポイント順。
pub fn collate(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.cmp(b))
}

fn sorted_distinct<'a>(values: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let distinct: BTreeSet<&str> = values
        .into_iter()
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .collect();
    let mut out: Vec<String> = distinct.into_iter().map(str::to_string).collect();
    out.sort_by(|a, b| collate(a, b));
    out
}

/// 読み込み済みの行に実在するキーワード（trim 済み・空なし・重複なし・照合順）
pub fn derive_available_keywords<E: PlaceEntry>(entries: &[E]) -> Vec<String> {
    sorted_distinct(entries.iter().filter_map(|e| e.keyword()))
}

/// 複数テーブルのキーワード列をまとめて候補にする
pub fn merge_keyword_suggestions<'a>(
    sources: impl IntoIterator<Item = Option<&'a str>>,
) -> Vec<String> {
    sorted_distinct(sources.into_iter().flatten())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::place_entry::Dream;
    use proptest::prelude::*;

    fn dream(keyword: Option<&str>) -> Dream {
        Dream {
            keyword: keyword.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_case_variants_are_kept_and_blanks_dropped() {
        let entries = vec![
            dream(Some("beach")),
            dream(Some("BEACH")),
            dream(Some("")),
            dream(None),
        ];
        assert_eq!(derive_available_keywords(&entries), vec!["BEACH", "beach"]);
    }

    #[test]
    fn test_trimmed_duplicates_collapse() {
        let entries = vec![dream(Some(" hike ")), dream(Some("hike")), dream(Some("   "))];
        assert_eq!(derive_available_keywords(&entries), vec!["hike"]);
    }

    #[test]
    fn test_accents_sort_with_base_letter() {
        let entries = vec![dream(Some("θάλασσα")), dream(Some("βουνό")), dream(Some("Άνδρος"))];
        assert_eq!(
            derive_available_keywords(&entries),
            vec!["Άνδρος", "βουνό", "θάλασσα"]
        );
        assert_eq!(collate("école", "ezra"), Ordering::Less);
    }

    #[test]
    fn test_merge_suggestions() {
        let merged = merge_keyword_suggestions(vec![Some("sea"), None, Some("food"), Some("sea ")]);
        assert_eq!(merged, vec!["food", "sea"]);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(128))]

        #[test]
        fn derived_keywords_are_nonblank_and_present(
            kws in proptest::collection::vec(proptest::option::of("[ a-zA-Zά-ώ]{0,6}"), 0..12)
        ) {
            let entries: Vec<Dream> = kws.iter().map(|k| dream(k.as_deref())).collect();
            let derived = derive_available_keywords(&entries);
            for k in &derived {
                prop_assert!(!k.trim().is_empty());
                prop_assert!(kws.iter().flatten().any(|src| src.trim() == k));
            }
            let unique: BTreeSet<&String> = derived.iter().collect();
            prop_assert_eq!(unique.len(), derived.len());
        }
    }
}
