//! Engine launch configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default capacity of the connection's `info` queue
pub const DEFAULT_INFO_CAPACITY: usize = 32;

/// How to start an engine.
///
/// `env` follows three-state semantics: `None` inherits the parent
/// environment, `Some(vec![])` starts the engine with an empty environment,
/// and a populated list replaces the environment with exactly those
/// `KEY=VALUE` entries.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Option<Vec<String>>,
    pub working_dir: Option<PathBuf>,
    /// Number of unread `info` records kept before the oldest is dropped
    pub info_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            program: PathBuf::new(),
            args: Vec::new(),
            env: None,
            working_dir: None,
            info_capacity: DEFAULT_INFO_CAPACITY,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new(program: impl Into<PathBuf>) -> Self {
        EngineConfig {
            program: program.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an explicit environment entry. The first call switches from
    /// inheriting the parent environment to an explicit one.
    #[must_use]
    pub fn env_var(mut self, key: &str, value: &str) -> Self {
        self.env
            .get_or_insert_with(Vec::new)
            .push(format!("{key}={value}"));
        self
    }

    /// Start the engine with an empty environment.
    #[must_use]
    pub fn clear_env(mut self) -> Self {
        self.env = Some(Vec::new());
        self
    }

    #[must_use]
    pub fn working_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.working_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn info_capacity(mut self, capacity: usize) -> Self {
        self.info_capacity = capacity;
        self
    }

    /// Build the std command with arguments, environment and working
    /// directory applied. Stdio and platform flags are left to the caller.
    #[must_use]
    pub fn command(&self) -> process::Command {
        let mut cmd = process::Command::new(&self.program);
        cmd.args(&self.args);

        if let Some(entries) = &self.env {
            cmd.env_clear();
            for (key, value) in entries.iter().filter_map(|e| split_env_entry(e)) {
                cmd.env(key, value);
            }
        }
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Split `KEY=VALUE`, skipping entries without a key.
fn split_env_entry(entry: &str) -> Option<(OsString, OsString)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.is_empty() => Some((key.into(), value.into())),
        _ => {
            log::warn!("ignoring malformed environment entry '{entry}'");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_inherit_everything() {
        let config = EngineConfig::new("stockfish");
        assert_eq!(config.program, PathBuf::from("stockfish"));
        assert!(config.args.is_empty());
        assert_eq!(config.env, None);
        assert_eq!(config.working_dir, None);
        assert_eq!(config.info_capacity, DEFAULT_INFO_CAPACITY);
    }

    #[test]
    fn test_builder() {
        let config = EngineConfig::new("lc0")
            .arg("--threads=2")
            .args(["--backend", "blas"])
            .env_var("OMP_NUM_THREADS", "1")
            .working_dir("/tmp")
            .info_capacity(8);
        assert_eq!(config.args, vec!["--threads=2", "--backend", "blas"]);
        assert_eq!(config.env, Some(vec!["OMP_NUM_THREADS=1".to_string()]));
        assert_eq!(config.working_dir, Some(PathBuf::from("/tmp")));
        assert_eq!(config.info_capacity, 8);
    }

    #[test]
    fn test_clear_env_is_empty_list() {
        let config = EngineConfig::new("engine").clear_env();
        assert_eq!(config.env, Some(Vec::new()));
    }

    #[test]
    fn test_command_applies_explicit_env() {
        let config = EngineConfig::new("engine")
            .env_var("A", "1")
            .env_var("B", "x=y");
        let cmd = config.command();
        let envs: Vec<_> = cmd
            .get_envs()
            .map(|(k, v)| (k.to_os_string(), v.map(|v| v.to_os_string())))
            .collect();
        assert!(envs.contains(&("A".into(), Some("1".into()))));
        assert!(envs.contains(&("B".into(), Some("x=y".into()))));
    }

    #[test]
    fn test_split_env_entry() {
        assert_eq!(
            split_env_entry("KEY=VALUE"),
            Some(("KEY".into(), "VALUE".into()))
        );
        assert_eq!(split_env_entry("EMPTY="), Some(("EMPTY".into(), "".into())));
        assert_eq!(split_env_entry("=oops"), None);
        assert_eq!(split_env_entry("NOEQUALS"), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde_roundtrip() {
        let config = EngineConfig::new("stockfish").arg("bench").clear_env();
        let json = serde_json::to_string(&config).unwrap();
        let back: EngineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);

        let partial: EngineConfig = serde_json::from_str(r#"{"program":"lc0"}"#).unwrap();
        assert_eq!(partial.info_capacity, DEFAULT_INFO_CAPACITY);
    }
}
