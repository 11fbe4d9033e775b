//! サインイン・サインアウト
//!
//! 許可リスト外のアカウントは、サインインに成功してもその場でセッションを失効させる。

use crate::domain::{AllowList, Route};
use crate::ports::outbound::Router;
use common::domain::{Session, TableName};
use common::error::Error;
use common::ports::outbound::{AuthProvider, Log, LogLevel, LogRecord, TableProvider};
use serde_json::json;
use std::sync::Arc;

pub const MSG_MISSING_CREDENTIALS: &str = "Enter your email and password.";
pub const MSG_NOT_ALLOWED: &str = "Private app: this account is not allowed.";

/// profiles に表示名を書いておく（memory・dream の作成前にも呼ぶ）
pub(crate) fn upsert_profile(tables: &dyn TableProvider, session: &Session) -> Result<(), Error> {
    tables.upsert(
        TableName::PROFILES,
        &json!({
            "id": session.user_id().as_str(),
            "display_name": session.display_name(),
        }),
    )
}

pub struct SignInUseCase {
    auth: Arc<dyn AuthProvider>,
    tables: Arc<dyn TableProvider>,
    allow_list: AllowList,
    router: Arc<dyn Router>,
    log: Arc<dyn Log>,
}

impl SignInUseCase {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        tables: Arc<dyn TableProvider>,
        allow_list: AllowList,
        router: Arc<dyn Router>,
        log: Arc<dyn Log>,
    ) -> Self {
        Self {
            auth,
            tables,
            allow_list,
            router,
            log,
        }
    }

    pub fn sign_in(&self, email: &str, password: &str) -> Result<Session, Error> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::validation(MSG_MISSING_CREDENTIALS));
        }
        let session = super::logged(
            self.log.as_ref(),
            "sign in",
            self.auth.sign_in_with_password(email, password),
        )?;

        if !self.allow_list.contains(session.user_id()) {
            let _ = self.log.log(
                &LogRecord::new(LogLevel::Warn, "usecase", "access", "sign-in rejected by allow list")
                    .field("user_id", session.user_id().as_str()),
            );
            if let Err(e) = self.auth.sign_out() {
                super::log_remote_failure(self.log.as_ref(), "sign out", &e);
            }
            return Err(Error::forbidden(MSG_NOT_ALLOWED));
        }

        super::logged(
            self.log.as_ref(),
            "upsert profile",
            upsert_profile(self.tables.as_ref(), &session),
        )?;
        let _ = self.log.log(
            &LogRecord::new(LogLevel::Info, "usecase", "access", "signed in")
                .field("user_id", session.user_id().as_str()),
        );
        self.router.replace(Route::home());
        Ok(session)
    }

    pub fn sign_out(&self) -> Result<(), Error> {
        super::logged(self.log.as_ref(), "sign out", self.auth.sign_out())?;
        let _ = self
            .log
            .log(&LogRecord::new(LogLevel::Info, "usecase", "access", "signed out"));
        self.router.replace(Route::sign_in());
        Ok(())
    }
}
