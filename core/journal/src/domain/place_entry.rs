//! Place Entry（memory / dream）とその周辺の行型
//!
//! 行は serde でテーブルの JSON から直接読む。欠けた列と null は既定値で埋める。

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

fn text_of(v: Option<Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// 文字列・数値はそのまま文字列に、null は空文字に
fn text_or_empty<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(text_of(Option::<Value>::deserialize(d)?).unwrap_or_default())
}

/// 数値の id 列も文字列で持つ
fn opt_text<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(text_of(Option::<Value>::deserialize(d)?))
}

/// 緯度経度の組。片方だけの行は座標なしとして扱う。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn from_parts(lat: Option<f64>, lng: Option<f64>) -> Option<Self> {
        match (lat, lng) {
            (Some(lat), Some(lng)) => Some(Self { lat, lng }),
            _ => None,
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// 一覧・フィルタ・地図が共通に扱う場所エントリ
pub trait PlaceEntry {
    fn id(&self) -> &str;
    /// 表示名
    fn name(&self) -> &str;
    fn address(&self) -> Option<&str>;
    fn keyword(&self) -> Option<&str>;
    fn lat(&self) -> Option<f64>;
    fn lng(&self) -> Option<f64>;

    fn coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_parts(self.lat(), self.lng())
    }

    /// テキスト検索の対象列
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name()];
        fields.extend(self.address());
        fields.extend(self.keyword());
        fields
    }
}

/// 訪れた場所（posts テーブルの 1 行）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub author_id: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    /// YYYY-MM-DD
    #[serde(default)]
    pub visited_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub place_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    /// ストレージ上のパス（公開 URL ではない）
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
}

impl PlaceEntry for Memory {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        self.place_name.as_deref().unwrap_or(&self.title)
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    fn lat(&self) -> Option<f64> {
        self.lat
    }

    fn lng(&self) -> Option<f64> {
        self.lng
    }

    /// memory はタイトルでも引ける
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str()];
        fields.extend(self.place_name.as_deref());
        fields.extend(self.address.as_deref());
        fields.extend(self.keyword.as_deref());
        fields
    }
}

/// 行きたい場所（dreams テーブルの 1 行）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dream {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub author_id: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub place_name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub keyword: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl PlaceEntry for Dream {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.place_name
    }

    fn address(&self) -> Option<&str> {
        self.address.as_deref()
    }

    fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }

    fn lat(&self) -> Option<f64> {
        self.lat
    }

    fn lng(&self) -> Option<f64> {
        self.lng
    }
}

/// media テーブルの 1 行（url はストレージ上のパス）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(default, deserialize_with = "text_or_empty")]
    pub id: String,
    #[serde(default, deserialize_with = "opt_text")]
    pub post_id: Option<String>,
    #[serde(default, deserialize_with = "text_or_empty")]
    pub url: String,
}

/// 場所検索の結果 1 件
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub name: String,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lng: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_from_partial_row() {
        let m: Memory = serde_json::from_value(json!({
            "id": "p1",
            "title": "Sunset",
            "lat": 37.9,
            "lng": null,
            "keyword": "beach"
        }))
        .unwrap();
        assert_eq!(m.name(), "Sunset");
        assert_eq!(m.coordinate(), None);
        assert_eq!(m.search_fields(), vec!["Sunset", "beach"]);
    }

    #[test]
    fn test_null_and_numeric_columns() {
        let d: Dream = serde_json::from_value(json!({
            "id": 42,
            "author_id": 7,
            "place_name": null,
            "keyword": null
        }))
        .unwrap();
        assert_eq!(d.id, "42");
        assert_eq!(d.author_id.as_deref(), Some("7"));
        assert_eq!(d.name(), "");

        let m: Memory = serde_json::from_value(json!({"id": "p1", "title": null})).unwrap();
        assert_eq!(m.title, "");
        let media: MediaItem =
            serde_json::from_value(json!({"id": 3, "post_id": 9, "url": null})).unwrap();
        assert_eq!((media.id.as_str(), media.post_id.as_deref()), ("3", Some("9")));
    }

    #[test]
    fn test_memory_name_prefers_place_name() {
        let m = Memory {
            title: "Day out".to_string(),
            place_name: Some("Plaka".to_string()),
            ..Default::default()
        };
        assert_eq!(m.name(), "Plaka");
        assert!(m.search_fields().contains(&"Day out"));
    }

    #[test]
    fn test_dream_coordinate_and_fields() {
        let d = Dream {
            id: "d1".to_string(),
            place_name: "Balos".to_string(),
            address: Some("Crete".to_string()),
            lat: Some(35.58),
            lng: Some(23.59),
            ..Default::default()
        };
        assert_eq!(d.coordinate(), Some(Coordinate { lat: 35.58, lng: 23.59 }));
        assert_eq!(d.search_fields(), vec!["Balos", "Crete"]);
        assert_eq!(d.coordinate().unwrap().to_string(), "35.58,23.59");
    }
}
