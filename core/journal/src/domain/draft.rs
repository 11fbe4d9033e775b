//! 入力中の memory / dream（未検証の文字列の束）と、その検証
//!
//! 検証はリモート呼び出しの前にすべて終える。

use super::place_entry::{Memory, PlaceCandidate, PlaceEntry};
use chrono::NaiveDate;
use common::error::Error;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::OnceLock;

pub const MSG_TITLE_AND_DATE: &str = "Fill in at least a title and a valid date.";
pub const MSG_LAT_NOT_NUMBER: &str = "Lat must be a number.";
pub const MSG_LNG_NOT_NUMBER: &str = "Lng must be a number.";

/// YYYY-MM-DD 形式で、かつ実在する日付か
pub fn is_valid_iso_date(s: &str) -> bool {
    static ISO_DATE: OnceLock<Option<Regex>> = OnceLock::new();
    let shape_ok = ISO_DATE
        .get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").ok())
        .as_ref()
        .map(|re| re.is_match(s))
        .unwrap_or(false);
    shape_ok && NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

/// Unix 秒から UTC の日付（YYYY-MM-DD）
pub fn iso_date_from_secs(secs: i64) -> String {
    chrono::DateTime::from_timestamp(secs, 0)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "1970-01-01".to_string())
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    if t.is_empty() {
        None
    } else {
        Some(t.to_string())
    }
}

fn parse_coordinate(s: &str, message: &str) -> Result<Option<f64>, Error> {
    let t = s.trim();
    if t.is_empty() {
        return Ok(None);
    }
    match t.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(Some(v)),
        _ => Err(Error::validation(message)),
    }
}

fn format_coordinate(v: Option<f64>) -> String {
    v.map(|v| v.to_string()).unwrap_or_default()
}

/// memory 入力画面の値（作成・編集共通）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryDraft {
    /// Some なら既存 memory の編集
    pub id: Option<String>,
    pub title: String,
    pub body: String,
    pub visited_at: String,
    pub place_name: String,
    pub address: String,
    pub lat: String,
    pub lng: String,
    pub keyword: String,
}

/// posts に書き込む列（空文字は null）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryPayload {
    pub title: String,
    pub body: Option<String>,
    pub visited_at: String,
    pub place_name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub keyword: Option<String>,
}

impl MemoryDraft {
    /// 空の新規入力。訪問日は今日。
    pub fn new(today: &str) -> Self {
        Self {
            visited_at: today.to_string(),
            ..Default::default()
        }
    }

    pub fn is_edit(&self) -> bool {
        self.id.is_some()
    }

    /// 遷移パラメータから復元する。日付が不正・欠落なら今日にする。
    pub fn from_route_params(params: &BTreeMap<String, String>, today: &str) -> Self {
        let get = |k: &str| params.get(k).cloned().unwrap_or_default();
        let name = get("name");
        let title = params.get("title").cloned().unwrap_or_else(|| name.clone());
        let visited_at = params
            .get("visited_at")
            .filter(|d| is_valid_iso_date(d))
            .cloned()
            .unwrap_or_else(|| today.to_string());
        Self {
            id: params.get("id").filter(|id| !id.is_empty()).cloned(),
            title,
            body: get("body"),
            visited_at,
            place_name: name,
            address: get("address"),
            lat: get("lat"),
            lng: get("lng"),
            keyword: get("keyword"),
        }
    }

    /// 入力画面へ渡すパラメータ。空の値は載せない。
    pub fn to_route_params(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        let mut put = |k: &str, v: &str| {
            if !v.is_empty() {
                params.insert(k.to_string(), v.to_string());
            }
        };
        put("id", self.id.as_deref().unwrap_or(""));
        put("name", &self.place_name);
        if self.title != self.place_name {
            put("title", &self.title);
        }
        put("body", &self.body);
        put("visited_at", &self.visited_at);
        put("address", &self.address);
        put("lat", &self.lat);
        put("lng", &self.lng);
        put("keyword", &self.keyword);
        params
    }

    /// リモートに触れる前の検証。通れば書き込み用の値を返す。
    pub fn validate(&self) -> Result<MemoryPayload, Error> {
        if self.title.trim().is_empty() || !is_valid_iso_date(&self.visited_at) {
            return Err(Error::validation(MSG_TITLE_AND_DATE));
        }
        let lat = parse_coordinate(&self.lat, MSG_LAT_NOT_NUMBER)?;
        let lng = parse_coordinate(&self.lng, MSG_LNG_NOT_NUMBER)?;
        Ok(MemoryPayload {
            title: self.title.trim().to_string(),
            body: non_empty(&self.body),
            visited_at: self.visited_at.clone(),
            place_name: non_empty(&self.place_name),
            address: non_empty(&self.address),
            lat,
            lng,
            keyword: non_empty(&self.keyword),
        })
    }
}

/// 既存エントリ（主に dream）から新規 memory の下書きを作る。id は引き継がない。
pub fn promote_to_draft<E: PlaceEntry>(entry: &E, today: &str) -> MemoryDraft {
    MemoryDraft {
        id: None,
        title: entry.name().to_string(),
        place_name: entry.name().to_string(),
        address: entry.address().unwrap_or_default().to_string(),
        lat: format_coordinate(entry.lat()),
        lng: format_coordinate(entry.lng()),
        keyword: entry.keyword().unwrap_or_default().trim().to_string(),
        ..MemoryDraft::new(today)
    }
}

/// 既存 memory の編集用下書き
pub fn edit_draft(memory: &Memory, today: &str) -> MemoryDraft {
    let visited_at = memory
        .visited_at
        .as_deref()
        .filter(|d| is_valid_iso_date(d))
        .unwrap_or(today);
    MemoryDraft {
        id: Some(memory.id.clone()),
        title: if memory.title.is_empty() {
            memory.name().to_string()
        } else {
            memory.title.clone()
        },
        body: memory.body.clone().unwrap_or_default(),
        visited_at: visited_at.to_string(),
        place_name: memory.place_name.clone().unwrap_or_default(),
        address: memory.address.clone().unwrap_or_default(),
        lat: format_coordinate(memory.lat),
        lng: format_coordinate(memory.lng),
        keyword: memory.keyword.clone().unwrap_or_default(),
    }
}

/// 検索結果から memory の下書きを作る
pub fn draft_from_candidate(candidate: &PlaceCandidate, keyword: Option<&str>, today: &str) -> MemoryDraft {
    MemoryDraft {
        title: candidate.name.clone(),
        place_name: candidate.name.clone(),
        address: candidate.formatted_address.clone().unwrap_or_default(),
        lat: format_coordinate(candidate.lat),
        lng: format_coordinate(candidate.lng),
        keyword: keyword.unwrap_or_default().trim().to_string(),
        ..MemoryDraft::new(today)
    }
}

/// dreams に書き込む列
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreamPayload {
    pub author_id: String,
    pub place_name: String,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub note: Option<String>,
    pub keyword: Option<String>,
}

impl DreamPayload {
    pub fn from_candidate(author_id: &str, candidate: &PlaceCandidate, keyword: Option<&str>) -> Self {
        Self {
            author_id: author_id.to_string(),
            place_name: candidate.name.clone(),
            address: candidate.formatted_address.clone(),
            lat: candidate.lat,
            lng: candidate.lng,
            note: None,
            keyword: keyword.and_then(non_empty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::place_entry::Dream;

    const TODAY: &str = "2024-06-01";

    #[test]
    fn test_iso_date() {
        assert!(is_valid_iso_date("2024-02-29"));
        assert!(!is_valid_iso_date("2023-02-29"));
        assert!(!is_valid_iso_date("2024-1-05"));
        assert!(!is_valid_iso_date("2024-01-05T00:00"));
        assert!(!is_valid_iso_date(""));
        assert_eq!(iso_date_from_secs(0), "1970-01-01");
        assert_eq!(iso_date_from_secs(1_717_200_000), "2024-06-01");
    }

    #[test]
    fn test_validate_requires_title_and_date() {
        let mut d = MemoryDraft::new(TODAY);
        assert_eq!(d.validate(), Err(Error::validation(MSG_TITLE_AND_DATE)));
        d.title = "  Walk ".to_string();
        d.visited_at = "yesterday".to_string();
        assert_eq!(d.validate(), Err(Error::validation(MSG_TITLE_AND_DATE)));
        d.visited_at = TODAY.to_string();
        let payload = d.validate().unwrap();
        assert_eq!(payload.title, "Walk");
        assert_eq!(payload.body, None);
        assert_eq!(payload.lat, None);
    }

    #[test]
    fn test_validate_coordinates() {
        let mut d = MemoryDraft::new(TODAY);
        d.title = "x".to_string();
        d.lat = "abc".to_string();
        assert_eq!(d.validate(), Err(Error::validation(MSG_LAT_NOT_NUMBER)));
        d.lat = " 37.98 ".to_string();
        d.lng = "NaN".to_string();
        assert_eq!(d.validate(), Err(Error::validation(MSG_LNG_NOT_NUMBER)));
        d.lng = String::new();
        let payload = d.validate().unwrap();
        assert_eq!(payload.lat, Some(37.98));
        assert_eq!(payload.lng, None);
    }

    #[test]
    fn test_promote_copies_place_fields_without_id() {
        let dream = Dream {
            id: "d1".to_string(),
            place_name: "Balos".to_string(),
            address: Some("Crete".to_string()),
            lat: Some(35.5),
            lng: None,
            keyword: Some(" beach ".to_string()),
            ..Default::default()
        };
        let d = promote_to_draft(&dream, TODAY);
        assert_eq!(d.id, None);
        assert_eq!(d.title, "Balos");
        assert_eq!(d.place_name, "Balos");
        assert_eq!(d.address, "Crete");
        assert_eq!(d.lat, "35.5");
        assert_eq!(d.lng, "");
        assert_eq!(d.keyword, "beach");
        assert_eq!(d.visited_at, TODAY);
    }

    #[test]
    fn test_route_params_roundtrip_for_edit() {
        let memory = Memory {
            id: "p1".to_string(),
            title: "Dinner".to_string(),
            place_name: Some("Taverna".to_string()),
            visited_at: Some("2023-09-10".to_string()),
            lat: Some(37.0),
            lng: Some(23.5),
            ..Default::default()
        };
        let draft = edit_draft(&memory, TODAY);
        let params = draft.to_route_params();
        assert_eq!(params.get("id").map(String::as_str), Some("p1"));
        assert!(!params.contains_key("body"));
        assert_eq!(MemoryDraft::from_route_params(&params, TODAY), draft);
    }

    #[test]
    fn test_from_route_params_defaults() {
        let mut params = BTreeMap::new();
        params.insert("name".to_string(), "Plaka".to_string());
        params.insert("visited_at".to_string(), "bad".to_string());
        let d = MemoryDraft::from_route_params(&params, TODAY);
        assert!(!d.is_edit());
        assert_eq!(d.title, "Plaka");
        assert_eq!(d.place_name, "Plaka");
        assert_eq!(d.visited_at, TODAY);
    }

    #[test]
    fn test_dream_payload_from_candidate() {
        let c = PlaceCandidate {
            name: "Acropolis".to_string(),
            formatted_address: Some("Athens 105 58".to_string()),
            lat: Some(37.97),
            lng: Some(23.72),
        };
        let p = DreamPayload::from_candidate("u1", &c, Some("  "));
        assert_eq!(p.keyword, None);
        assert_eq!(p.note, None);
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["place_name"], "Acropolis");
        assert!(v["note"].is_null());
        let d = draft_from_candidate(&c, Some("history"), TODAY);
        assert_eq!(d.keyword, "history");
        assert_eq!(d.lat, "37.97");
    }
}
