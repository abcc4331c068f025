use drivedupe::cli::DriveArgs;
use drivedupe::config::{Config, ConfigError};
use figment::providers::{Format, Serialized, Toml};
use figment::{Figment, Jail};
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
client_id = "11111111-2222-3333-4444-555555555555"
tenant_id = "consumers"
root_folder = "01PHOTOS"
request_timeout_secs = 10
scopes = ["Files.ReadWrite"]

[retry]
max_attempts = 3
base_delay_ms = 250
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.client_id.as_deref(), Some("11111111-2222-3333-4444-555555555555"));
    assert_eq!(config.authority(), "https://login.microsoftonline.com/consumers");
    assert_eq!(config.root_folder, "01PHOTOS");
    assert_eq!(config.request_timeout(), Duration::from_secs(10));
    assert_eq!(config.scopes, vec!["Files.ReadWrite".to_string()]);

    let policy = config.retry_policy();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.base_delay, Duration::from_millis(250));
    // untouched nested keys keep their defaults
    assert_eq!(policy.max_delay, Duration::from_secs(32));
}

#[test]
fn test_explicit_config_file() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("custom.toml", "root_folder = \"01DOCS\"")?;

        let config = Config::load(Some(&jail.directory().join("custom.toml"))).unwrap();
        assert_eq!(config.root_folder, "01DOCS");
        assert!(config.client_id.is_none());
        Ok(())
    });
}

#[test]
fn test_missing_explicit_config_file_is_an_error() {
    let temp_dir = tempdir().unwrap();
    let missing = temp_dir.path().join("nope.toml");

    match Config::load(Some(&missing)) {
        Err(ConfigError::NotFound(path)) => assert_eq!(path, missing),
        other => panic!("Expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_malformed_config_file_is_an_error() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file("bad.toml", "request_timeout_secs = \"soon\"")?;

        let result = Config::load(Some(&jail.directory().join("bad.toml")));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
        Ok(())
    });
}

#[test]
fn test_raw_client_id_from_environment() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("CLIENT_ID", "from-dotenv");
        jail.set_env("TENANT_ID", "organizations");

        let config = Config::load(None).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("from-dotenv"));
        assert_eq!(config.tenant_id.as_deref(), Some("organizations"));
        Ok(())
    });
}

#[test]
fn test_prefixed_environment_overrides() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("DRIVEDUPE_ACCESS_TOKEN", "eyJ0eXAi");
        jail.set_env("DRIVEDUPE_RETRY__MAX_ATTEMPTS", "7");
        jail.set_env("DRIVEDUPE_GRAPH_URL", "https://graph.example/v1.0");

        let config = Config::load(None).unwrap();
        assert_eq!(config.access_token.as_deref(), Some("eyJ0eXAi"));
        assert_eq!(config.retry.max_attempts, 7);
        assert_eq!(config.graph_url, "https://graph.example/v1.0");
        Ok(())
    });
}

#[test]
fn test_layer_precedence() {
    Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file(
            "layers.toml",
            r#"
client_id = "from-file"
root_folder = "01FILE"

[retry]
max_attempts = 2
"#,
        )?;
        // raw variable beats the file, prefixed variable beats the raw one
        jail.set_env("CLIENT_ID", "from-raw-env");
        jail.set_env("DRIVEDUPE_CLIENT_ID", "from-prefixed-env");
        jail.set_env("DRIVEDUPE_ROOT_FOLDER", "01ENV");

        let mut config = Config::load(Some(&jail.directory().join("layers.toml"))).unwrap();
        assert_eq!(config.client_id.as_deref(), Some("from-prefixed-env"));
        assert_eq!(config.root_folder, "01ENV");
        assert_eq!(config.retry.max_attempts, 2);

        // CLI flags beat everything
        config.apply_cli(&DriveArgs {
            root: Some("01CLI".into()),
            max_attempts: Some(9),
        });
        assert_eq!(config.root_folder, "01CLI");
        assert_eq!(config.retry_policy().max_attempts, 9);
        Ok(())
    });
}
