//! 標準環境変数解決実装（std::env を委譲）

use crate::domain::Dirs;
use crate::error::Error;
use crate::ports::outbound::EnvResolver;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// 標準環境変数解決実装
#[derive(Debug, Clone, Default)]
pub struct StdEnvResolver;

impl EnvResolver for StdEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|s| !s.is_empty())
    }

    fn resolve_dirs(&self) -> Result<Dirs, Error> {
        resolve_dirs_with(|name| self.var(name))
    }
}

/// 固定のマップから引く EnvResolver（テスト用）
#[derive(Debug, Clone, Default)]
pub struct MapEnvResolver {
    vars: HashMap<String, String>,
}

impl MapEnvResolver {
    pub fn new<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl EnvResolver for MapEnvResolver {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).filter(|s| !s.is_empty()).cloned()
    }

    fn resolve_dirs(&self) -> Result<Dirs, Error> {
        resolve_dirs_with(|name| self.var(name))
    }
}

fn resolve_dirs_with(var: impl Fn(&str) -> Option<String>) -> Result<Dirs, Error> {
    if let Some(home) = var("JOURNAL_HOME") {
        return Ok(Dirs::from_home(PathBuf::from(home)));
    }

    let config_base = var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or_else(|| Error::env("HOME is not set"))?;

    Ok(Dirs::from_home(config_base.join("journal")))
}
