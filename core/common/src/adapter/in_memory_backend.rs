//! メモリ上のバックエンド（認証・テーブル・ストレージ）
//!
//! ネットワーク不要でユースケースを動かすための実装。テストでは失敗注入と
//! 呼び出し回数の確認に使う。

use crate::adapter::ListenerRegistry;
use crate::domain::{AuthUser, Session, SessionEvent, TableName, UserId};
use crate::error::Error;
use crate::ports::outbound::{
    AuthProvider, Filter, ObjectStorage, Order, Select, SessionListener, Subscription,
    TableProvider, Upload,
};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;

/// 失敗を注入できる操作
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    CurrentSession,
    SignIn,
    SignOut,
    Select,
    Count,
    Insert,
    Update,
    Delete,
    Upsert,
    Upload,
}

#[derive(Debug, Clone)]
struct Account {
    email: String,
    password: String,
    user_id: UserId,
}

/// 認証・テーブル・ストレージを 1 つにまとめたメモリ実装
#[derive(Default)]
pub struct InMemoryBackend {
    accounts: Mutex<Vec<Account>>,
    session: Mutex<Option<Session>>,
    listeners: ListenerRegistry,
    tables: Mutex<HashMap<&'static str, Vec<Value>>>,
    objects: Mutex<BTreeMap<String, Vec<u8>>>,
    /// (テーブル名 or "*", 操作) の組で失敗させる
    failures: Mutex<HashSet<(String, Op)>>,
    next_id: AtomicU64,
    sign_out_calls: AtomicUsize,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_account(&self, email: &str, password: &str, user_id: &str) {
        if let Ok(mut accounts) = self.accounts.lock() {
            accounts.push(Account {
                email: email.to_string(),
                password: password.to_string(),
                user_id: UserId::new(user_id),
            });
        }
    }

    /// 通知なしでセッションを差し替える（起動時に保存済みセッションがある状態）
    pub fn set_session_for(&self, user_id: Option<&str>) {
        let session = user_id.map(|id| Self::make_session(UserId::new(id), None));
        if let Ok(mut s) = self.session.lock() {
            *s = session;
        }
    }

    /// プロバイダ側でセッションが変わったことを模擬する（差し替え + 通知）
    pub fn emit_session_change(&self, user_id: Option<&str>) {
        self.set_session_for(user_id);
        let session = self.session.lock().ok().and_then(|s| s.clone());
        let event = if session.is_some() {
            SessionEvent::SignedIn
        } else {
            SessionEvent::SignedOut
        };
        self.listeners.notify(event, session.as_ref());
    }

    /// table が None のときは全テーブルの op を失敗させる
    pub fn fail(&self, table: Option<TableName>, op: Op) {
        if let Ok(mut f) = self.failures.lock() {
            f.insert((table.map(|t| t.as_str()).unwrap_or("*").to_string(), op));
        }
    }

    pub fn clear_failures(&self) {
        if let Ok(mut f) = self.failures.lock() {
            f.clear();
        }
    }

    pub fn seed(&self, table: TableName, rows: Vec<Value>) {
        if let Ok(mut tables) = self.tables.lock() {
            tables.entry(table.as_str()).or_default().extend(rows);
        }
    }

    pub fn rows(&self, table: TableName) -> Vec<Value> {
        self.tables
            .lock()
            .ok()
            .and_then(|t| t.get(table.as_str()).cloned())
            .unwrap_or_default()
    }

    pub fn object_paths(&self) -> Vec<String> {
        self.objects
            .lock()
            .map(|o| o.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// "{bucket}/{path}" に置かれたバイト列
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects.lock().ok().and_then(|o| o.get(key).cloned())
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(AtomicOrdering::SeqCst)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn make_session(user_id: UserId, email: Option<String>) -> Session {
        Session {
            access_token: format!("token-{}", user_id),
            refresh_token: format!("refresh-{}", user_id),
            expires_at: i64::MAX,
            user: AuthUser { id: user_id, email },
        }
    }

    fn check(&self, table: Option<TableName>, op: Op) -> Result<(), Error> {
        let failures = self
            .failures
            .lock()
            .map_err(|_| Error::system("lock poisoned"))?;
        let hit = failures.contains(&("*".to_string(), op))
            || table
                .map(|t| failures.contains(&(t.as_str().to_string(), op)))
                .unwrap_or(false);
        if hit {
            return Err(Error::remote(500, format!("injected {:?} failure", op)));
        }
        Ok(())
    }

    fn with_table<R>(
        &self,
        table: TableName,
        f: impl FnOnce(&mut Vec<Value>) -> R,
    ) -> Result<R, Error> {
        let mut tables = self
            .tables
            .lock()
            .map_err(|_| Error::system("lock poisoned"))?;
        Ok(f(tables.entry(table.as_str()).or_default()))
    }
}

/// JSON 値の比較（null は別扱いにして呼び出し側で並べる）
fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// PostgREST の既定に合わせる: 昇順は NULLS LAST、降順は NULLS FIRST
fn compare_rows(a: &Value, b: &Value, order: &[Order]) -> Ordering {
    for key in order {
        let va = a.get(&key.column).unwrap_or(&Value::Null);
        let vb = b.get(&key.column).unwrap_or(&Value::Null);
        let ord = match (va.is_null(), vb.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_values(va, vb),
        };
        let ord = if key.ascending { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn project(row: &Value, columns: &str) -> Value {
    if columns.trim() == "*" {
        return row.clone();
    }
    let mut out = Map::new();
    for col in columns.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        out.insert(col.to_string(), row.get(col).cloned().unwrap_or(Value::Null));
    }
    Value::Object(out)
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(t), Some(p)) = (target.as_object_mut(), patch.as_object()) {
        for (k, v) in p {
            t.insert(k.clone(), v.clone());
        }
    }
}

impl AuthProvider for InMemoryBackend {
    fn current_session(&self) -> Result<Option<Session>, Error> {
        self.check(None, Op::CurrentSession)?;
        Ok(self
            .session
            .lock()
            .map_err(|_| Error::system("lock poisoned"))?
            .clone())
    }

    fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, Error> {
        self.check(None, Op::SignIn)?;
        let account = self
            .accounts
            .lock()
            .map_err(|_| Error::system("lock poisoned"))?
            .iter()
            .find(|a| a.email == email && a.password == password)
            .cloned()
            .ok_or_else(|| Error::session("Invalid login credentials"))?;
        let session = Self::make_session(account.user_id, Some(account.email));
        *self.session.lock().map_err(|_| Error::system("lock poisoned"))? = Some(session.clone());
        self.listeners.notify(SessionEvent::SignedIn, Some(&session));
        Ok(session)
    }

    fn sign_out(&self) -> Result<(), Error> {
        self.sign_out_calls.fetch_add(1, AtomicOrdering::SeqCst);
        self.check(None, Op::SignOut)?;
        *self.session.lock().map_err(|_| Error::system("lock poisoned"))? = None;
        self.listeners.notify(SessionEvent::SignedOut, None);
        Ok(())
    }

    fn subscribe(&self, listener: SessionListener) -> Subscription {
        self.listeners.subscribe(listener)
    }
}

impl TableProvider for InMemoryBackend {
    fn select(&self, query: &Select) -> Result<Vec<Value>, Error> {
        self.check(Some(query.table), Op::Select)?;
        self.with_table(query.table, |rows| {
            let mut hits: Vec<Value> = rows
                .iter()
                .filter(|r| query.filters.iter().all(|f| f.matches(r)))
                .cloned()
                .collect();
            hits.sort_by(|a, b| compare_rows(a, b, &query.order));
            if let Some(n) = query.limit {
                hits.truncate(n);
            }
            hits.iter().map(|r| project(r, &query.columns)).collect()
        })
    }

    fn count(&self, table: TableName, filters: &[Filter]) -> Result<u64, Error> {
        self.check(Some(table), Op::Count)?;
        self.with_table(table, |rows| {
            rows.iter()
                .filter(|r| filters.iter().all(|f| f.matches(r)))
                .count() as u64
        })
    }

    fn insert(&self, table: TableName, row: &Value) -> Result<Value, Error> {
        self.check(Some(table), Op::Insert)?;
        let mut row = row.clone();
        if row.get("id").map(Value::is_null).unwrap_or(true) {
            let n = self.next_id.fetch_add(1, AtomicOrdering::SeqCst) + 1;
            merge(&mut row, &serde_json::json!({ "id": format!("{}-{}", table, n) }));
        }
        self.with_table(table, |rows| {
            rows.push(row.clone());
            row
        })
    }

    fn update(&self, table: TableName, filters: &[Filter], patch: &Value) -> Result<Value, Error> {
        self.check(Some(table), Op::Update)?;
        let updated = self.with_table(table, |rows| {
            let mut first = None;
            for row in rows.iter_mut().filter(|r| filters.iter().all(|f| f.matches(r))) {
                merge(row, patch);
                first.get_or_insert_with(|| row.clone());
            }
            first
        })?;
        updated.ok_or_else(|| Error::not_found(format!("no matching row in {}", table)))
    }

    fn delete(&self, table: TableName, filters: &[Filter]) -> Result<(), Error> {
        self.check(Some(table), Op::Delete)?;
        self.with_table(table, |rows| {
            rows.retain(|r| !filters.iter().all(|f| f.matches(r)));
        })
    }

    fn upsert(&self, table: TableName, row: &Value) -> Result<(), Error> {
        self.check(Some(table), Op::Upsert)?;
        let id = row.get("id").cloned().unwrap_or(Value::Null);
        self.with_table(table, |rows| {
            match rows
                .iter()
                .position(|r| !id.is_null() && r.get("id") == Some(&id))
            {
                Some(i) => merge(&mut rows[i], row),
                None => rows.push(row.clone()),
            }
        })
    }
}

impl ObjectStorage for InMemoryBackend {
    fn upload(&self, upload: Upload<'_>) -> Result<String, Error> {
        self.check(None, Op::Upload)?;
        let key = format!("{}/{}", upload.bucket, upload.path);
        let mut objects = self
            .objects
            .lock()
            .map_err(|_| Error::system("lock poisoned"))?;
        if !upload.upsert && objects.contains_key(&key) {
            return Err(Error::remote(409, "The resource already exists"));
        }
        objects.insert(key, upload.bytes.to_vec());
        Ok(upload.path.to_string())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("memory://{}/{}", bucket, path)
    }
}
