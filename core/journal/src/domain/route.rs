//! 画面ルート（パス + パラメータ）
//!
//! 公開ルートはサインイン画面ただ 1 つ。それ以外はすべて保護対象。

use std::collections::BTreeMap;

pub const SIGN_IN: &str = "/sign-in";
pub const HOME: &str = "/";
pub const ADD: &str = "/add";
pub const MY_POSTS: &str = "/my-posts";
pub const DREAMS: &str = "/dreams";
const POST_PREFIX: &str = "/post/";

/// 遷移先（パスとパラメータ）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub path: String,
    pub params: BTreeMap<String, String>,
}

impl Route {
    pub fn to(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn with_params(mut self, params: BTreeMap<String, String>) -> Self {
        self.params = params;
        self
    }

    pub fn sign_in() -> Self {
        Self::to(SIGN_IN)
    }

    pub fn home() -> Self {
        Self::to(HOME)
    }

    pub fn my_posts() -> Self {
        Self::to(MY_POSTS)
    }

    pub fn dreams() -> Self {
        Self::to(DREAMS)
    }

    pub fn post(id: &str) -> Self {
        Self::to(format!("{}{}", POST_PREFIX, id))
    }

    #[cfg(test)]
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
}

/// サインインなしで見られるパスか
pub fn is_public(path: &str) -> bool {
    path == SIGN_IN
}

/// "/post/{id}" から id を取り出す
pub fn post_id(path: &str) -> Option<&str> {
    path.strip_prefix(POST_PREFIX).filter(|id| !id.is_empty())
}
