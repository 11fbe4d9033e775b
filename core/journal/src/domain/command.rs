//! journal コマンドの enum（Command Pattern）
//!
//! 画面ごとの操作を 1 コマンドに対応させる。

use super::draft::MemoryDraft;
use super::place_entry::Coordinate;

/// 一覧コマンドの絞り込み指定
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListFilter {
    pub keyword: Option<String>,
    pub query: String,
}

/// 入力画面で書き換える項目（None は元の値のまま）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftFields {
    pub title: Option<String>,
    pub body: Option<String>,
    pub visited_at: Option<String>,
    pub place_name: Option<String>,
    pub address: Option<String>,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub keyword: Option<String>,
}

impl DraftFields {
    pub fn apply_to(&self, draft: &mut MemoryDraft) {
        let pairs: [(&Option<String>, &mut String); 8] = [
            (&self.title, &mut draft.title),
            (&self.body, &mut draft.body),
            (&self.visited_at, &mut draft.visited_at),
            (&self.place_name, &mut draft.place_name),
            (&self.address, &mut draft.address),
            (&self.lat, &mut draft.lat),
            (&self.lng, &mut draft.lng),
            (&self.keyword, &mut draft.keyword),
        ];
        for (value, slot) in pairs {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }
    }
}

/// journal の実行モード
#[derive(Debug, Clone, PartialEq)]
pub enum JournalCommand {
    Help,
    /// ゲートの状態と、path への遷移判定を表示
    Status { path: String },
    SignIn { email: String, password: String },
    SignOut,
    Home,
    Memories(ListFilter),
    Dreams(ListFilter),
    /// 一覧のキーワード候補（dreams=false なら memory 一覧）
    Keywords { dreams: bool },
    ShowMemory { id: String },
    /// id が Some なら既存 memory を読み込んでから fields を重ねる
    SaveMemory {
        id: Option<String>,
        fields: DraftFields,
        photos: Vec<String>,
    },
    DeleteDream { id: String },
    PromoteDream { id: String },
    SearchPlaces { query: String, around: Option<Coordinate> },
    /// 検索の最初の結果を dream に追加
    AddDream {
        query: String,
        around: Option<Coordinate>,
        keyword: Option<String>,
    },
    /// 検索の最初の結果を memory の下書きにする
    DraftFromPlace {
        query: String,
        around: Option<Coordinate>,
        keyword: Option<String>,
    },
}

impl JournalCommand {
    /// ログ用の名前
    pub fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Status { .. } => "status",
            Self::SignIn { .. } => "sign-in",
            Self::SignOut => "sign-out",
            Self::Home => "home",
            Self::Memories(_) => "memories",
            Self::Dreams(_) => "dreams",
            Self::Keywords { .. } => "keywords",
            Self::ShowMemory { .. } => "show",
            Self::SaveMemory { .. } => "save",
            Self::DeleteDream { .. } => "delete-dream",
            Self::PromoteDream { .. } => "promote",
            Self::SearchPlaces { .. } => "search",
            Self::AddDream { .. } => "add-dream",
            Self::DraftFromPlace { .. } => "draft-place",
        }
    }
}
