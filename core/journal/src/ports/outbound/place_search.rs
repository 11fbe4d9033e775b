//! 場所検索 Outbound ポート

use crate::domain::{Coordinate, PlaceCandidate};
use common::error::Error;

/// テキストで場所を探す（外部の地図検索 API）
pub trait PlaceSearch: Send + Sync {
    /// `around` を中心に探す。結果は関連度順。
    fn search(&self, query: &str, around: Coordinate) -> Result<Vec<PlaceCandidate>, Error>;
}
