use crate::{
    context::CheckOptions,
    semant::ErrorPolicy,
    strings,
};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Search for wff.toml starting from the current directory and moving up the directory tree
pub fn find_config_file() -> Result<PathBuf, ConfigError> {
    let current_dir = env::current_dir().map_err(|e| ConfigError::Io(PathBuf::from("."), e))?;
    find_config_file_from(&current_dir)
}

pub fn find_config_file_from(start: &Path) -> Result<PathBuf, ConfigError> {
    let start_dir = start
        .canonicalize()
        .map_err(|e| ConfigError::Io(start.to_path_buf(), e))?;

    let mut current = start_dir.as_path();

    loop {
        let candidate = current.join(strings::CONFIG_FILE_NAME.as_str());
        if candidate.exists() {
            return Ok(candidate);
        }

        current = match current.parent() {
            Some(parent) => parent,
            None => return Err(ConfigError::NotFound),
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WffConfig {
    project_dir: PathBuf,
    modules: Vec<PathBuf>,
    syntax_only: bool,
    fail_fast: bool,
    log_filter: Option<String>,
}

impl WffConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let project_dir = path
            .parent()
            .ok_or_else(|| ConfigError::InvalidPath(path.to_path_buf()))?
            .canonicalize()
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;

        Self::from_toml(&contents, project_dir).map_err(|e| ConfigError::Parse(path.to_path_buf(), e))
    }

    /// The configuration used when no config file exists: nothing to check by
    /// default, everything else at its defaults.
    pub fn in_dir(project_dir: PathBuf) -> Self {
        Self {
            project_dir,
            modules: Vec::new(),
            syntax_only: false,
            fail_fast: false,
            log_filter: None,
        }
    }

    pub fn from_toml(contents: &str, project_dir: PathBuf) -> Result<Self, toml::de::Error> {
        let file: WffConfigFile = toml::from_str(contents)?;
        let check = file.check.unwrap_or_default();
        let modules = check
            .modules
            .into_iter()
            .map(|module| project_dir.join(module))
            .collect();

        Ok(Self {
            modules,
            syntax_only: check.syntax_only,
            fail_fast: check.fail_fast,
            log_filter: file.log.and_then(|l| l.filter),
            project_dir,
        })
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Module files in checking order.
    pub fn modules(&self) -> &[PathBuf] {
        &self.modules
    }

    pub fn log_filter(&self) -> Option<&str> {
        self.log_filter.as_deref()
    }

    pub fn set_modules(&mut self, modules: Vec<PathBuf>) {
        self.modules = modules;
    }

    pub fn set_syntax_only(&mut self, syntax_only: bool) {
        self.syntax_only |= syntax_only;
    }

    pub fn set_fail_fast(&mut self, fail_fast: bool) {
        self.fail_fast |= fail_fast;
    }

    pub fn options(&self) -> CheckOptions {
        CheckOptions {
            syntax_only: self.syntax_only,
            policy: if self.fail_fast {
                ErrorPolicy::FailFast
            } else {
                ErrorPolicy::Accumulate
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WffConfigFile {
    check: Option<CheckConfig>,
    log: Option<LogConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckConfig {
    #[serde(default)]
    modules: Vec<PathBuf>,
    #[serde(default)]
    syntax_only: bool,
    #[serde(default)]
    fail_fast: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogConfig {
    filter: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not find wff.toml in this directory or any parent")]
    NotFound,
    #[error("could not read `{}`: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("invalid config `{}`: {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("invalid config path `{}`", .0.display())]
    InvalidPath(PathBuf),
}
