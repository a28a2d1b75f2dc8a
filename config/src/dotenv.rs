//! Project `.env` reader. Values are returned, not applied; `lib.rs` decides precedence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

fn dotenv_file(dir: Option<&Path>) -> Option<PathBuf> {
    let base = match dir {
        Some(d) => d.to_path_buf(),
        None => std::env::current_dir().ok()?,
    };
    Some(base.join(".env")).filter(|p| p.is_file())
}

/// Strips one pair of matching quotes. Double quotes honour `\"`; single quotes are literal.
fn unquote(raw: &str) -> String {
    if raw.len() >= 2 {
        if let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
            return inner.replace("\\\"", "\"");
        }
        if let Some(inner) = raw.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            return inner.to_string();
        }
    }
    raw.to_string()
}

/// One `KEY=VALUE` per line. Blank lines and `#` lines are skipped, a leading
/// `export ` is allowed, and lines without `=` or with an empty key are ignored.
fn parse(content: &str) -> HashMap<String, String> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| {
            let l = l.strip_prefix("export ").unwrap_or(l);
            let (k, v) = l.split_once('=')?;
            let k = k.trim();
            (!k.is_empty()).then(|| (k.to_string(), unquote(v.trim())))
        })
        .collect()
}

/// Reads `.env` from `dir` (or the current directory). A missing file is an empty map.
pub fn load_env_map(dir: Option<&Path>) -> std::io::Result<HashMap<String, String>> {
    match dotenv_file(dir) {
        Some(path) => Ok(parse(&std::fs::read_to_string(path)?)),
        None => Ok(HashMap::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_geocode_settings() {
        let m = parse("GEOCODE_PROVIDER=nominatim\nGEOCODE_MAX_CACHE_SIZE = 500\n");
        assert_eq!(m.get("GEOCODE_PROVIDER").map(String::as_str), Some("nominatim"));
        assert_eq!(m.get("GEOCODE_MAX_CACHE_SIZE").map(String::as_str), Some("500"));
    }

    #[test]
    fn skips_comments_blank_and_malformed_lines() {
        let m = parse("# provider\n\nNO_EQUALS\n=orphan\nKEY=val\n");
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("KEY").map(String::as_str), Some("val"));
    }

    #[test]
    fn export_prefix_is_accepted() {
        let m = parse("export GEOCODE_USER_AGENT=me/1.0");
        assert_eq!(m.get("GEOCODE_USER_AGENT").map(String::as_str), Some("me/1.0"));
    }

    #[test]
    fn quotes_are_stripped() {
        let m = parse(
            "A=\"https://example.org/search?\"\nB='x \"y\"'\nC=\"say \\\"hi\\\"\"\nD=\"\"\nE=#kept",
        );
        assert_eq!(m["A"], "https://example.org/search?");
        assert_eq!(m["B"], "x \"y\"");
        assert_eq!(m["C"], "say \"hi\"");
        assert_eq!(m["D"], "");
        assert_eq!(m["E"], "#kept");
    }

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_env_map(Some(dir.path())).unwrap().is_empty());
    }

    #[test]
    fn reads_file_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(".env"), "GEOCODE_TIMEOUT_SECS=3\n").unwrap();
        let m = load_env_map(Some(dir.path())).unwrap();
        assert_eq!(m.get("GEOCODE_TIMEOUT_SECS").map(String::as_str), Some("3"));
    }
}
