//! 遷移履歴をメモリに持つルーター
//!
//! CLI では 1 コマンドの間だけ生きる。最終的な current_path を表示に使う。

use crate::domain::Route;
use crate::ports::outbound::Router;
use std::sync::Mutex;

pub struct HistoryRouter {
    stack: Mutex<Vec<Route>>,
}

impl HistoryRouter {
    pub fn new(start: Route) -> Self {
        Self {
            stack: Mutex::new(vec![start]),
        }
    }

    pub fn current(&self) -> Option<Route> {
        self.stack.lock().ok().and_then(|s| s.last().cloned())
    }

    /// 先頭から現在までの履歴
    #[cfg(test)]
    pub fn history(&self) -> Vec<Route> {
        self.stack.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Router for HistoryRouter {
    fn replace(&self, route: Route) {
        if let Ok(mut s) = self.stack.lock() {
            s.pop();
            s.push(route);
        }
    }

    fn push(&self, route: Route) {
        if let Ok(mut s) = self.stack.lock() {
            s.push(route);
        }
    }

    fn back(&self) {
        if let Ok(mut s) = self.stack.lock() {
            if s.len() > 1 {
                s.pop();
            }
        }
    }

    fn current_path(&self) -> String {
        self.current().map(|r| r.path).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_replace_back() {
        let r = HistoryRouter::new(Route::home());
        r.push(Route::dreams());
        r.replace(Route::post("p1"));
        assert_eq!(r.current_path(), "/post/p1");
        assert_eq!(r.history().len(), 2);
        r.back();
        assert_eq!(r.current_path(), "/");
        r.back();
        assert_eq!(r.current_path(), "/");
    }
}
