//! 地図 API のテキスト検索で場所を探す

use crate::domain::{Coordinate, PlaceCandidate};
use crate::ports::outbound::PlaceSearch;
use common::error::Error;
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use std::time::Duration;

const TEXT_SEARCH_URL: &str = "https://maps.googleapis.com/maps/api/place/textsearch/json";
/// 検索半径（メートル）
pub const SEARCH_RADIUS_M: u32 = 4000;
/// 位置指定がないときの中心（アテネ）
pub const DEFAULT_CENTER: Coordinate = Coordinate {
    lat: 37.9838,
    lng: 23.7275,
};

pub struct GooglePlacesSearch {
    http: Client,
    api_key: String,
}

impl GooglePlacesSearch {
    pub fn new(api_key: &str) -> Result<Self, Error> {
        let http = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            api_key: api_key.to_string(),
        })
    }
}

/// 検索 URL を組み立てる（クエリはエンコードされる）
pub fn text_search_url(query: &str, around: Coordinate, api_key: &str) -> Result<Url, Error> {
    Url::parse_with_params(
        TEXT_SEARCH_URL,
        &[
            ("query", query.to_string()),
            ("location", around.to_string()),
            ("radius", SEARCH_RADIUS_M.to_string()),
            ("key", api_key.to_string()),
        ],
    )
    .map_err(|e| Error::system(format!("invalid search URL: {}", e)))
}

/// 応答本文を候補の列にする。ZERO_RESULTS は空。
pub fn parse_text_search(body: &Value) -> Result<Vec<PlaceCandidate>, Error> {
    let status = body.get("status").and_then(Value::as_str).unwrap_or("OK");
    match status {
        "OK" => {}
        "ZERO_RESULTS" => return Ok(Vec::new()),
        other => {
            let detail = body
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or("place search failed");
            return Err(Error::remote(200, format!("{}: {}", other, detail)));
        }
    }
    let results = body
        .get("results")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();
    Ok(results
        .iter()
        .filter_map(|r| {
            let name = r.get("name").and_then(Value::as_str)?;
            let location = r.pointer("/geometry/location");
            Some(PlaceCandidate {
                name: name.to_string(),
                formatted_address: r
                    .get("formatted_address")
                    .and_then(Value::as_str)
                    .map(str::to_string),
                lat: location.and_then(|l| l.get("lat")).and_then(Value::as_f64),
                lng: location.and_then(|l| l.get("lng")).and_then(Value::as_f64),
            })
        })
        .collect())
}

impl PlaceSearch for GooglePlacesSearch {
    fn search(&self, query: &str, around: Coordinate) -> Result<Vec<PlaceCandidate>, Error> {
        let url = text_search_url(query, around, &self.api_key)?;
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| Error::http(format!("HTTP request failed: {}", e)))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| Error::http(format!("Failed to read response: {}", e)))?;
        if !status.is_success() {
            return Err(Error::remote(status.as_u16(), common::adapter::rest::client::error_message(&text)));
        }
        let body: Value = serde_json::from_str(&text)?;
        parse_text_search(&body)
    }
}
