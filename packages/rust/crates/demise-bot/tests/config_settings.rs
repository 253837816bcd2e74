#![allow(missing_docs)]

use std::path::PathBuf;

use demise_bot::{DemiseSettings, load_runtime_settings_from_paths};
use tempfile::TempDir;

fn write_file(path: PathBuf, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dir");
    }
    std::fs::write(path, content).expect("write yaml");
}

#[test]
fn merge_user_overrides_system() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("packages/conf/settings.yaml");
    let user = tmp.path().join(".config/demise/settings.yaml");

    write_file(
        system.clone(),
        r#"
discord:
  allowed_guilds: "3001"
  admin_users: "41"
  ingress_bind: "0.0.0.0:8082"
  ingress_path: "/discord/interactions"
  public_key: "system-key"
selectors:
  history_limit: 200
"#,
    );
    write_file(
        user.clone(),
        r#"
discord:
  allowed_guilds: "3001,3002"
  ingress_secret_token: "user-secret"
  public_key: "user-key"
selectors:
  history_limit: 50
"#,
    );

    let settings = load_runtime_settings_from_paths(&system, &user);

    assert_eq!(
        settings.discord.allowed_guilds.as_deref(),
        Some("3001,3002")
    );
    assert_eq!(settings.discord.admin_users.as_deref(), Some("41"));
    assert_eq!(
        settings.discord.ingress_path.as_deref(),
        Some("/discord/interactions")
    );
    assert_eq!(
        settings.discord.ingress_secret_token.as_deref(),
        Some("user-secret")
    );
    assert_eq!(settings.discord.public_key.as_deref(), Some("user-key"));
    assert_eq!(settings.discord.api_base_url, None);
    assert_eq!(settings.selectors.history_limit, Some(50));
}

#[test]
fn missing_files_yield_defaults() {
    let tmp = TempDir::new().expect("tempdir");
    let settings = load_runtime_settings_from_paths(
        &tmp.path().join("missing-system.yaml"),
        &tmp.path().join("missing-user.yaml"),
    );
    assert_eq!(settings, DemiseSettings::default());
}

#[test]
fn invalid_user_yaml_keeps_system_values() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("system.yaml");
    let user = tmp.path().join("user.yaml");
    write_file(
        system.clone(),
        "discord:\n  admin_users: \"41\"\nselectors:\n  history_limit: 120\n",
    );
    write_file(user.clone(), "discord: [not, a, mapping\n");

    let settings = load_runtime_settings_from_paths(&system, &user);

    assert_eq!(settings.discord.admin_users.as_deref(), Some("41"));
    assert_eq!(settings.selectors.history_limit, Some(120));
}

#[test]
fn empty_user_file_is_ignored() {
    let tmp = TempDir::new().expect("tempdir");
    let system = tmp.path().join("system.yaml");
    let user = tmp.path().join("user.yaml");
    write_file(system.clone(), "selectors:\n  history_limit: 75\n");
    write_file(user.clone(), "   \n");

    let settings = load_runtime_settings_from_paths(&system, &user);

    assert_eq!(settings.selectors.history_limit, Some(75));
}

#[test]
fn shipped_system_defaults_parse() {
    let system = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../../conf/settings.yaml");
    let tmp = TempDir::new().expect("tempdir");

    let settings = load_runtime_settings_from_paths(&system, &tmp.path().join("none.yaml"));

    assert_eq!(
        settings.discord.ingress_path.as_deref(),
        Some("/discord/interactions")
    );
    // Shipped blank so `demise run` refuses to start until a key is configured.
    assert_eq!(settings.discord.public_key.as_deref(), Some(""));
    assert_eq!(settings.selectors.history_limit, Some(50));
}
