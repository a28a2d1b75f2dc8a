//! `$XDG_CONFIG_HOME/<app>/config.toml`: an `[env]` table of raw variables and
//! a `[geocode]` table of settings mapped to `GEOCODE_<KEY>` variables.
//!
//! ```toml
//! [env]
//! RUST_LOG = "geocode=debug"
//!
//! [geocode]
//! provider = "nominatim"
//! min_request_interval_ms = 1000
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use crate::LoadError;

/// Prefix for variables derived from the `[geocode]` table.
pub const SETTINGS_PREFIX: &str = "GEOCODE_";

fn config_file(app_name: &str) -> Result<Option<PathBuf>, LoadError> {
    let base = cross_xdg::BaseDirs::new().map_err(|e| LoadError::XdgPath(e.to_string()))?;
    let path = base.config_home().join(app_name).join("config.toml");
    Ok(path.is_file().then_some(path))
}

#[derive(serde::Deserialize, Default)]
struct ConfigFile {
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default)]
    geocode: toml::Table,
}

/// Variables from the XDG file, split by origin.
#[derive(Debug, Default)]
pub struct XdgVars {
    /// From `[env]`, verbatim.
    pub env: HashMap<String, String>,
    /// From `[geocode]`, keyed `GEOCODE_<UPPERCASE KEY>`.
    pub settings: HashMap<String, String>,
}

fn scalar_to_string(key: &str, value: &toml::Value) -> Result<String, LoadError> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        other => Err(LoadError::UnsupportedValue {
            key: key.to_string(),
            kind: other.type_str().to_string(),
        }),
    }
}

fn settings_vars(table: &toml::Table) -> Result<HashMap<String, String>, LoadError> {
    table
        .iter()
        .map(|(k, v)| {
            let var = format!("{}{}", SETTINGS_PREFIX, k.to_ascii_uppercase());
            Ok((var, scalar_to_string(k, v)?))
        })
        .collect()
}

/// Parses the config file for `app_name`. A missing file yields empty maps.
pub fn load_vars(app_name: &str) -> Result<XdgVars, LoadError> {
    let Some(path) = config_file(app_name)? else {
        return Ok(XdgVars::default());
    };
    let content = std::fs::read_to_string(&path).map_err(LoadError::XdgRead)?;
    parse_vars(&content)
}

fn parse_vars(content: &str) -> Result<XdgVars, LoadError> {
    let file: ConfigFile = toml::from_str(content)?;
    Ok(XdgVars {
        settings: settings_vars(&file.geocode)?,
        env: file.env,
    })
}
