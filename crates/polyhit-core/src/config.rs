//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `polyhit.toml` + `polyhit.<env>.toml` + `POLYHIT_*`
//! env vars. The base file can be relocated with `POLYHIT_CONFIG`, which may
//! use `~` and `${VAR}`.
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::borrow::Cow;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub const CONFIG_PATH_VAR: &str = "POLYHIT_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "polyhit.toml";

pub struct Config {
    figment: Figment,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
        let base = env::var(CONFIG_PATH_VAR)
            .map(expand_path)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_for_env(&base, &env_name)
    }

    pub fn load_for_env(base: &Path, env_name: &str) -> anyhow::Result<Self> {
        let mut figment = Figment::new().merge(Toml::file(base));
        if let Some(suffix) = env_suffix(env_name) {
            let overlay = sibling_for_env(base, suffix);
            debug!(base = %base.display(), overlay = %overlay.display(), "loading configuration");
            figment = figment.merge(Toml::file(overlay));
        }
        figment = figment.merge(Env::prefixed("POLYHIT_").split("__"));
        Ok(Self::from_figment(figment))
    }

    pub fn from_figment(figment: Figment) -> Self {
        Self { figment }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    /// Like [`Config::get`], but a missing key yields `T::default()`.
    pub fn get_or_default<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned + Default,
    {
        if self.figment.find_value(key).is_err() {
            return Ok(T::default());
        }
        self.get(key)
    }
}

fn env_suffix(env_name: &str) -> Option<&'static str> {
    match env_name {
        "dev" | "development" => Some("dev"),
        "prod" | "production" => Some("prod"),
        "test" | "testing" => Some("test"),
        _ => None,
    }
}

/// `dir/polyhit.toml` + `prod` -> `dir/polyhit.prod.toml`
fn sibling_for_env(base: &Path, suffix: &str) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "polyhit".to_string());
    base.with_file_name(format!("{stem}.{suffix}.toml"))
}

/// `~` and `$VAR` / `${VAR}` expansion for [`CONFIG_PATH_VAR`]. Unknown
/// variables are left as written.
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let raw = input.as_ref();
    let with_vars = shellexpand::env(raw).unwrap_or(Cow::Borrowed(raw));
    PathBuf::from(shellexpand::tilde(&with_vars).into_owned())
}
