//! ローカルファイルシステム実装

use crate::error::Error;
use crate::ports::outbound::FileSystem;
use std::path::Path;

/// std::fs の結果をパス付きの Io エラーにする
fn with_path<T>(action: &str, path: &Path, result: std::io::Result<T>) -> Result<T, Error> {
    result.map_err(|e| Error::io_msg(format!("Failed to {} '{}': {}", action, path.display(), e)))
}

/// ローカルのファイル（設定・セッション・ログ・アップロードする写真）
#[derive(Debug, Clone, Default)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String, Error> {
        with_path("read", path, std::fs::read_to_string(path))
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, Error> {
        with_path("read", path, std::fs::read(path))
    }

    fn write(&self, path: &Path, contents: &str) -> Result<(), Error> {
        with_path("write", path, std::fs::write(path, contents))
    }

    fn create_dir_all(&self, path: &Path) -> Result<(), Error> {
        with_path("create directory", path, std::fs::create_dir_all(path))
    }

    fn remove_file(&self, path: &Path) -> Result<(), Error> {
        with_path("remove", path, std::fs::remove_file(path))
    }

    fn open_append(&self, path: &Path) -> Result<Box<dyn std::io::Write + Send>, Error> {
        let opened = std::fs::OpenOptions::new().create(true).append(true).open(path);
        let f = with_path("open for append", path, opened)?;
        Ok(Box::new(f))
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}
