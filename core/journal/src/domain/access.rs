//! アクセス判定（許可リストとゲート状態）
//!
//! 保護画面に入れるのは「セッションがあり、かつユーザー ID が許可リストに含まれる」ときだけ。

use super::route::{self, Route};
use common::domain::{Session, UserId};
use std::collections::BTreeSet;

/// 許可されたユーザー ID の集合。起動時に一度だけ作り、以後変更しない。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowList(BTreeSet<UserId>);

impl AllowList {
    /// カンマ区切りを分割し、前後の空白を除き、空要素を捨てる
    pub fn parse(csv: &str) -> Self {
        Self::from_ids(csv.split(','))
    }

    pub fn from_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            ids.into_iter()
                .map(|s| s.as_ref().trim().to_string())
                .filter(|s| !s.is_empty())
                .map(UserId::new)
                .collect(),
        )
    }

    pub fn contains(&self, id: &UserId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// ゲートの状態
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessState {
    /// セッション状態をまだ確認していない
    Unresolved,
    Unauthenticated,
    /// セッションはあるが許可リスト外
    Denied(UserId),
    Allowed(UserId),
}

/// 画面遷移の判定結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// 判定保留（読み込み表示のみ、遷移はしない）
    Loading,
    Redirect(Route),
    Proceed,
}

impl AccessState {
    pub fn evaluate(session: Option<&Session>, allow_list: &AllowList) -> Self {
        match session {
            None => Self::Unauthenticated,
            Some(s) if allow_list.contains(s.user_id()) => Self::Allowed(s.user_id().clone()),
            Some(s) => Self::Denied(s.user_id().clone()),
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Unresolved => "unresolved",
            Self::Unauthenticated => "unauthenticated",
            Self::Denied(_) => "denied",
            Self::Allowed(_) => "allowed",
        }
    }

    /// 現在のパスに対する判定。公開画面にいるならリダイレクトしない。
    pub fn decide(&self, current_path: &str) -> RouteDecision {
        match self {
            Self::Unresolved => RouteDecision::Loading,
            Self::Allowed(_) => RouteDecision::Proceed,
            Self::Unauthenticated | Self::Denied(_) => {
                if route::is_public(current_path) {
                    RouteDecision::Proceed
                } else {
                    RouteDecision::Redirect(Route::sign_in())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::AuthUser;
    use proptest::prelude::*;

    fn session(uid: &str) -> Session {
        Session {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: i64::MAX,
            user: AuthUser {
                id: UserId::new(uid),
                email: None,
            },
        }
    }

    #[test]
    fn test_parse_trims_and_drops_empty() {
        let list = AllowList::parse(" u1 , ,u2,, ");
        assert_eq!(list.len(), 2);
        assert!(list.contains(&UserId::new("u1")));
        assert!(list.contains(&UserId::new("u2")));
        assert!(AllowList::parse("").is_empty());
    }

    #[test]
    fn test_evaluate() {
        let list = AllowList::parse("u1");
        assert_eq!(AccessState::evaluate(None, &list), AccessState::Unauthenticated);
        assert_eq!(
            AccessState::evaluate(Some(&session("u1")), &list),
            AccessState::Allowed(UserId::new("u1"))
        );
        assert_eq!(
            AccessState::evaluate(Some(&session("u2")), &list),
            AccessState::Denied(UserId::new("u2"))
        );
    }

    #[test]
    fn test_empty_allow_list_denies_everyone() {
        let state = AccessState::evaluate(Some(&session("u1")), &AllowList::default());
        assert!(!state.is_allowed());
    }

    #[test]
    fn test_decide() {
        assert_eq!(AccessState::Unresolved.decide("/dreams"), RouteDecision::Loading);
        assert_eq!(AccessState::Unresolved.decide("/sign-in"), RouteDecision::Loading);
        assert_eq!(
            AccessState::Unauthenticated.decide("/dreams"),
            RouteDecision::Redirect(Route::sign_in())
        );
        assert_eq!(
            AccessState::Unauthenticated.decide("/sign-in"),
            RouteDecision::Proceed
        );
        assert_eq!(
            AccessState::Denied(UserId::new("u2")).decide("/"),
            RouteDecision::Redirect(Route::sign_in())
        );
        assert_eq!(
            AccessState::Allowed(UserId::new("u1")).decide("/post/1"),
            RouteDecision::Proceed
        );
    }

    proptest! {
        #[test]
        fn allowed_iff_session_and_member(
            ids in proptest::collection::vec("[a-z0-9]{1,6}", 0..5),
            uid in proptest::option::of("[a-z0-9]{1,6}"),
        ) {
            let list = AllowList::from_ids(&ids);
            let s = uid.as_deref().map(session);
            let state = AccessState::evaluate(s.as_ref(), &list);
            let expected = uid.as_ref().map(|u| ids.contains(u)).unwrap_or(false);
            prop_assert_eq!(state.is_allowed(), expected);
            prop_assert!(state != AccessState::Unresolved);
        }
    }
}
