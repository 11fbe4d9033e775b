//! アプリ設定の読み込み（adapter 層）

use crate::domain::{AppConfig, ConfigFile};
use common::domain::Dirs;
use common::error::Error;
use common::ports::outbound::{EnvResolver, FileSystem};

/// $JOURNAL_HOME/config.json（任意）を読み、環境変数で上書きする
pub fn load_app_config(
    fs: &dyn FileSystem,
    env: &dyn EnvResolver,
    dirs: &Dirs,
) -> Result<AppConfig, Error> {
    let path = dirs.config_file();
    let file = if fs.exists(&path) {
        let text = fs.read_to_string(&path)?;
        serde_json::from_str::<ConfigFile>(&text)
            .map_err(|e| Error::env(format!("invalid {}: {}", path.display(), e)))?
    } else {
        ConfigFile::default()
    };
    Ok(AppConfig::resolve(file, |name| env.var(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::adapter::{MapEnvResolver, StdFileSystem};
    use common::domain::UserId;

    #[test]
    fn test_missing_file_uses_env_only() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = Dirs::from_home(dir.path().to_path_buf());
        let env = MapEnvResolver::new([("JOURNAL_ALLOWED_UIDS", "u1, u2")]);
        let config = load_app_config(&StdFileSystem, &env, &dirs).unwrap();
        assert_eq!(config.allow_list.len(), 2);
        assert_eq!(config.photo_bucket, "photos");
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = Dirs::from_home(dir.path().to_path_buf());
        std::fs::write(
            dirs.config_file(),
            r#"{"supabase_url": "https://x.example", "supabase_anon_key": "k", "allowed_uids": ["u1"]}"#,
        )
        .unwrap();
        let env = MapEnvResolver::new(Vec::<(&str, &str)>::new());
        let config = load_app_config(&StdFileSystem, &env, &dirs).unwrap();
        assert_eq!(config.backend().unwrap().url, "https://x.example");
        assert!(config.allow_list.contains(&UserId::new("u1")));
    }

    #[test]
    fn test_malformed_file_is_env_error() {
        let dir = tempfile::tempdir().unwrap();
        let dirs = Dirs::from_home(dir.path().to_path_buf());
        std::fs::write(dirs.config_file(), "{not json").unwrap();
        let env = MapEnvResolver::new(Vec::<(&str, &str)>::new());
        let err = load_app_config(&StdFileSystem, &env, &dirs).unwrap_err();
        assert_eq!(err.exit_code(), 78);
    }
}
