//! セッション変化リスナーの登録簿
//!
//! 認証アダプタが共有する。通知時はロックを離してからリスナーを呼ぶので、
//! リスナーの中から再度サインアウト等を呼んでもデッドロックしない。

use crate::domain::{Session, SessionEvent};
use crate::ports::outbound::{SessionListener, Subscription};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

type Listeners = Mutex<BTreeMap<u64, SessionListener>>;

#[derive(Default)]
pub struct ListenerRegistry {
    listeners: Arc<Listeners>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: SessionListener) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut map) = self.listeners.lock() {
            map.insert(id, listener);
        }
        let weak = Arc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                if let Ok(mut map) = listeners.lock() {
                    map.remove(&id);
                }
            }
        })
    }

    pub fn notify(&self, event: SessionEvent, session: Option<&Session>) {
        let snapshot: Vec<SessionListener> = match self.listeners.lock() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => return,
        };
        for listener in snapshot {
            listener(event, session);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.lock().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
