use std::path::Path;
use std::process::Command;

// Runs the binary in an empty directory with an empty XDG config home and an
// unreachable provider, so no local config or network can leak in.
fn run_geocode(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_geocode"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("GEOCODE_PROVIDER", "photon")
        .env("GEOCODE_PHOTON_URL", "http://127.0.0.1:9/api/?")
        .env("GEOCODE_MIN_REQUEST_INTERVAL_MS", "0")
        .env_remove("LOG_FILE")
        .output()
        .expect("failed to run geocode binary")
}

#[test]
fn cli_help_succeeds() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_geocode(dir.path(), &["--help"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("--provider"));
    assert!(stdout.contains("--overrides"));
}

#[test]
fn cli_requires_an_address() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_geocode(dir.path(), &[]);
    assert!(!out.status.success());
}

#[test]
fn cli_override_resolves_without_network_json() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("overrides.json");
    std::fs::write(
        &path,
        r#"{"Paris": {"latitude": 48.85, "longitude": 2.35, "name": "Paris"}}"#,
    )
    .unwrap();

    let out = run_geocode(
        dir.path(),
        &["--json", "--overrides", path.to_str().unwrap(), "Paris"],
    );
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let line: serde_json::Value = serde_json::from_str(stdout.trim()).unwrap();
    assert_eq!(line["found"], true);
    assert_eq!(line["latitude"], 48.85);
    assert_eq!(line["name"], "Paris");
}

#[test]
fn cli_init_cache_resolves_text_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("init.json");
    std::fs::write(&path, r#"{"Oslo": {"latitude": 59.91, "longitude": 10.75}}"#).unwrap();

    let out = run_geocode(dir.path(), &["--init-cache", path.to_str().unwrap(), "Oslo"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.starts_with("Oslo\t59.91\t10.75"));
}

#[test]
fn cli_unresolved_address_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_geocode(dir.path(), &["Atlantis"]);
    assert_eq!(out.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Atlantis\tnot found"));
}

#[test]
fn cli_rejects_unknown_provider() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_geocode(dir.path(), &["--provider", "bing", "Paris"]);
    assert!(!out.status.success());
}
