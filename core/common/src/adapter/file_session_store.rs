//! セッションを session.json で保存・読み込みするアダプタ

use crate::domain::Session;
use crate::error::Error;
use crate::ports::outbound::{FileSystem, SessionStore};
use std::path::PathBuf;
use std::sync::Arc;

/// state/session.json にセッションを置く実装
pub struct FileSessionStore {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>, Error> {
        if !self.fs.exists(&self.path) {
            return Ok(None);
        }
        let s = self.fs.read_to_string(&self.path)?;
        let session = serde_json::from_str(&s)?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            self.fs.create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(session)?;
        self.fs.write(&self.path, &json)
    }

    fn clear(&self) -> Result<(), Error> {
        if self.fs.exists(&self.path) {
            self.fs.remove_file(&self.path)?;
        }
        Ok(())
    }
}

/// メモリ上だけにセッションを持つ実装（テスト用）
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    session: std::sync::Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>, Error> {
        Ok(self.session.lock().map_err(|_| Error::system("lock poisoned"))?.clone())
    }

    fn save(&self, session: &Session) -> Result<(), Error> {
        *self.session.lock().map_err(|_| Error::system("lock poisoned"))? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<(), Error> {
        *self.session.lock().map_err(|_| Error::system("lock poisoned"))? = None;
        Ok(())
    }
}
