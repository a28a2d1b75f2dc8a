//! Layered configuration for geocode.
//!
//! [`load_and_apply`] fills in process environment variables that are not
//! already set, so `geocode::Settings::from_env` sees one merged view.
//! Precedence, highest first:
//!
//! 1. the existing process environment
//! 2. project `.env` (current directory, or `override_dir`)
//! 3. `[env]` in `$XDG_CONFIG_HOME/<app_name>/config.toml`
//! 4. `[geocode]` in the same file, as `GEOCODE_<KEY>`

mod dotenv;
#[cfg(feature = "tracing-init")]
pub mod tracing_init;
mod xdg_toml;

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;

pub use xdg_toml::SETTINGS_PREFIX;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("xdg config path: {0}")]
    XdgPath(String),
    #[error("read xdg config: {0}")]
    XdgRead(std::io::Error),
    #[error("parse xdg toml: {0}")]
    XdgParse(#[from] toml::de::Error),
    #[error("[geocode].{key}: expected a string, number or boolean, got {kind}")]
    UnsupportedValue { key: String, kind: String },
    #[error("read .env: {0}")]
    DotenvRead(std::io::Error),
}

/// Merges the file layers into one map, lower layers first so higher ones win.
fn merged(
    xdg: xdg_toml::XdgVars,
    dotenv: HashMap<String, String>,
) -> HashMap<String, String> {
    let mut out = xdg.settings;
    out.extend(xdg.env);
    out.extend(dotenv);
    out
}

/// Loads `.env` and the XDG config for `app_name` and sets every variable the
/// process environment does not already define. Returns the names that were set.
pub fn load_and_apply(app_name: &str, override_dir: Option<&Path>) -> Result<Vec<String>, LoadError> {
    let xdg = xdg_toml::load_vars(app_name)?;
    let dotenv = dotenv::load_env_map(override_dir).map_err(LoadError::DotenvRead)?;

    let mut applied = Vec::new();
    for (key, value) in merged(xdg, dotenv) {
        if std::env::var_os(&key).is_some() {
            continue;
        }
        std::env::set_var(&key, value);
        applied.push(key);
    }
    applied.sort();
    Ok(applied)
}
