use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Where the database root of a call comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigProfile {
    /// Every call names its own root (the five-argument call form).
    CallerRoot,
    /// All calls search under one configured root; a per-call root is ignored.
    FixedRoot { db_root: String },
}

/// How the root reaches the engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RootChannel {
    /// Passed with the engine call itself.
    #[default]
    Parameter,
    /// Written to the named environment variable around the engine call.
    /// Only for engines that cannot take the root any other way; such calls
    /// are serialized process-wide.
    ProcessEnv(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct EngineConfig {
    pub root_channel: RootChannel,
    /// Upper bound on batches read per call; 0 means unlimited.
    pub max_batches: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    /// Directory for the append-only per-process diagnostic log. No file
    /// log when unset.
    pub dir: Option<String>,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), dir: None }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BridgeConfig {
    pub profile: ConfigProfile,
    pub engine: EngineConfig,
    pub log: LogConfig,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            profile: ConfigProfile::CallerRoot,
            engine: EngineConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl BridgeConfig {
    /// Merges `config.toml`, `config.<RUST_ENV>.toml` and `APP_*` variables
    /// (`__` separates nested keys, e.g. `APP_PROFILE__DB_ROOT`).
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        Self::load_for_env(&env_name)
    }

    pub fn load_for_env(env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(BridgeConfig::default()))
            .merge(Toml::file("config.toml"));
        match env_name {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));
        Ok(Self::from_figment(&figment)?)
    }

    pub fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Self = figment
            .extract()
            .map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if let ConfigProfile::FixedRoot { db_root } = &self.profile {
            if db_root.trim().is_empty() {
                return Err(Error::InvalidConfig("fixed_root profile needs a non-empty db_root".into()));
            }
        }
        if let RootChannel::ProcessEnv(var) = &self.engine.root_channel {
            if var.is_empty() || var.contains('=') || var.contains('\0') {
                return Err(Error::InvalidConfig(format!("unusable environment variable name '{var}'")));
            }
        }
        Ok(())
    }

    pub fn max_batches(&self) -> Option<usize> {
        (self.engine.max_batches > 0).then_some(self.engine.max_batches)
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    // Unknown variables are left as written
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
