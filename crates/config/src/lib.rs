//! Layered configuration for rollsort.
//!
//! Sources are merged lowest to highest priority:
//!
//! 1. Built-in defaults ([`Config::default()`]).
//! 2. `config.toml`, `config.yaml` and `config.json` in the platform
//!    configuration directory (e.g. `~/.config/rollsort/` on Linux).
//! 3. An explicit file passed to [`Loader::with_file`], format chosen by
//!    extension.
//! 4. Environment variables prefixed `ROLLSORT_` (e.g. `ROLLSORT_CONCURRENCY=4`).
//!
//! ```no_run
//! use rollsort_config::Loader;
//!
//! let config = Loader::default().load().unwrap();
//! assert!(config.concurrency >= 1);
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONCURRENCY: usize = 16;
pub const DEFAULT_PAGE_SIZE: usize = 1000;
pub const DEFAULT_ENV_PREFIX: &str = "ROLLSORT_";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of relocations in flight at once.
    pub concurrency: usize,
    /// Children requested per listing page, for gateways that let the caller
    /// choose.
    pub page_size: usize,
    /// Names of the period folders expected under each year folder.
    pub periods: Vec<String>,
    /// Log mutations instead of performing them.
    pub dry_run: bool,
    /// Full path of the folder to sort from (e.g. `/root/Pictures/Camera Roll`).
    pub source: Option<String>,
    /// Full path of the folder to sort into (e.g. `/root/Pictures/iPhone`).
    pub destination: Option<String>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            page_size: DEFAULT_PAGE_SIZE,
            periods: (1..=12).map(|month| format!("{month:02}")).collect(),
            dry_run: false,
            source: None,
            destination: None,
        }
    }
}
impl Config {
    /// Check the merged values for consistency.
    pub fn validate(self) -> Result<Self> {
        if self.concurrency == 0 {
            exn::bail!(ErrorKind::Invalid("concurrency"));
        }
        if self.page_size == 0 {
            exn::bail!(ErrorKind::Invalid("page_size"));
        }
        if self.periods.is_empty() {
            exn::bail!(ErrorKind::Invalid("periods"));
        }
        let mut seen = HashSet::new();
        for period in &self.periods {
            let period = period.trim();
            if period.is_empty() || period.contains('/') || !seen.insert(period) {
                exn::bail!(ErrorKind::Invalid("periods"));
            }
        }
        if self.source.as_deref().is_some_and(|p| !p.starts_with('/')) {
            exn::bail!(ErrorKind::Invalid("source"));
        }
        if self.destination.as_deref().is_some_and(|p| !p.starts_with('/')) {
            exn::bail!(ErrorKind::Invalid("destination"));
        }
        Ok(self)
    }
}

/// Builds a [`Config`] from defaults, files and the environment.
#[derive(Debug, Clone)]
pub struct Loader {
    config_dir: Option<PathBuf>,
    file: Option<PathBuf>,
    env_prefix: String,
}
impl Default for Loader {
    fn default() -> Self {
        Self {
            config_dir: ProjectDirs::from("", "", "rollsort").map(|dirs| dirs.config_dir().to_path_buf()),
            file: None,
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }
}
impl Loader {
    /// Read `config.{toml,yaml,json}` from this directory instead of the
    /// platform default.
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = Some(dir.into());
        self
    }

    /// Skip directory lookup entirely.
    pub fn without_config_dir(mut self) -> Self {
        self.config_dir = None;
        self
    }

    /// Merge an explicit file on top of the directory files.
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn figment(&self) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(dir) = &self.config_dir {
            figment = figment
                .merge(Toml::file(dir.join("config.toml")))
                .merge(Yaml::file(dir.join("config.yaml")))
                .merge(Json::file(dir.join("config.json")));
        }
        if let Some(file) = &self.file {
            figment = Self::merge_file(figment, file);
        }
        figment.merge(Env::prefixed(&self.env_prefix))
    }

    /// Merge all sources, deserialize and [validate](Config::validate).
    pub fn load(&self) -> Result<Config> {
        if let Some(file) = &self.file
            && !file.is_file()
        {
            tracing::warn!(path = %file.display(), "Configuration file does not exist");
            exn::bail!(ErrorKind::Load);
        }
        let config: Config = self.figment().extract().or_raise(|| ErrorKind::Load)?;
        let config = config.validate()?;
        tracing::debug!(?config, "Configuration loaded");
        Ok(config)
    }

    fn merge_file(figment: Figment, file: &Path) -> Figment {
        match file.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
            Some("json") => figment.merge(Json::file(file)),
            _ => figment.merge(Toml::file(file)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::fs;

    fn isolated() -> Loader {
        Loader::default().without_config_dir().with_env_prefix("ROLLSORT_TEST_UNSET_")
    }

    #[test]
    fn test_defaults() {
        let config = isolated().load().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.concurrency, 16);
        assert_eq!(config.page_size, 1000);
        assert_eq!(config.periods.first().map(String::as_str), Some("01"));
        assert_eq!(config.periods.last().map(String::as_str), Some("12"));
    }

    #[rstest]
    #[case("config.toml", "concurrency = 4\ndry_run = true\nsource = \"/root/Pictures/Camera Roll\"\n")]
    #[case("config.yaml", "concurrency: 4\ndry_run: true\nsource: /root/Pictures/Camera Roll\n")]
    #[case("config.json", r#"{"concurrency": 4, "dry_run": true, "source": "/root/Pictures/Camera Roll"}"#)]
    fn test_config_dir_formats(#[case] name: &str, #[case] contents: &str) {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(name), contents).unwrap();
        let config = isolated().with_config_dir(dir.path()).load().unwrap();
        assert_eq!(config.concurrency, 4);
        assert!(config.dry_run);
        assert_eq!(config.source.as_deref(), Some("/root/Pictures/Camera Roll"));
        // Untouched fields keep their defaults.
        assert_eq!(config.periods.len(), 12);
    }

    #[test]
    fn test_explicit_file_overrides_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("config.toml"), "concurrency = 4\n").unwrap();
        let explicit = dir.path().join("override.yml");
        fs::write(&explicit, "concurrency: 8\nperiods: [\"Q1\", \"Q2\", \"Q3\", \"Q4\"]\n").unwrap();
        let config = isolated().with_config_dir(dir.path()).with_file(&explicit).load().unwrap();
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.periods, ["Q1", "Q2", "Q3", "Q4"]);
    }

    #[test]
    fn test_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("rollsort.toml");
        fs::write(&file, "concurrency = 4\n").unwrap();
        // Unique prefix: no other test reads this variable.
        unsafe { std::env::set_var("ROLLSORT_TEST_ENV_OVERRIDE_CONCURRENCY", "2") };
        let config = Loader::default()
            .without_config_dir()
            .with_file(&file)
            .with_env_prefix("ROLLSORT_TEST_ENV_OVERRIDE_")
            .load()
            .unwrap();
        assert_eq!(config.concurrency, 2);
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = isolated().with_file(dir.path().join("nope.toml")).load().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Load));
    }

    #[rstest]
    #[case(Config { concurrency: 0, ..Config::default() }, "concurrency")]
    #[case(Config { page_size: 0, ..Config::default() }, "page_size")]
    #[case(Config { periods: vec![], ..Config::default() }, "periods")]
    #[case(Config { periods: vec!["01".into(), "01".into()], ..Config::default() }, "periods")]
    #[case(Config { periods: vec!["2014/01".into()], ..Config::default() }, "periods")]
    #[case(Config { periods: vec!["  ".into()], ..Config::default() }, "periods")]
    #[case(Config { source: Some("Pictures".into()), ..Config::default() }, "source")]
    #[case(Config { destination: Some("iPhone".into()), ..Config::default() }, "destination")]
    fn test_validate_rejects(#[case] config: Config, #[case] field: &str) {
        let err = config.validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(f) if *f == field));
    }
}
