//! Unit tests for configuration loading.

use cases_api::config::{ApiConfig, AppEnv, ConfigError};
use serial_test::serial;
use std::io::Write;

const ENV_KEYS: &[&str] = &[
    "CASES_API_CONFIG",
    "PORT",
    "DATABASE_URL",
    "JWT_SECRET",
    "APP_ENV",
    "RATE_LIMIT_PER_MINUTE",
    "CORS_ORIGINS",
    "DEFAULT_PAGE_SIZE",
    "MAX_PAGE_SIZE",
    "CASE_NAME_PREFIX",
];

fn clear_env() {
    for key in ENV_KEYS {
        unsafe { std::env::remove_var(key) };
    }
}

#[test]
#[serial]
fn test_defaults() {
    clear_env();
    let config = ApiConfig::load().unwrap();
    assert_eq!(config.port, 8081);
    assert_eq!(config.app_env, AppEnv::Production);
    assert_eq!(config.page_limits().default_size, 10);
    assert_eq!(config.page_limits().max_size, 1000);
    assert_eq!(config.case_name_prefix, "CS");
    assert!(config.database_url.is_none());
}

#[test]
#[serial]
fn test_env_overrides() {
    clear_env();
    unsafe {
        std::env::set_var("PORT", "9090");
        std::env::set_var("APP_ENV", "development");
        std::env::set_var("CORS_ORIGINS", "http://a.example, http://b.example");
        std::env::set_var("CASE_NAME_PREFIX", "SUP");
    }
    let config = ApiConfig::load().unwrap();
    clear_env();

    assert_eq!(config.port, 9090);
    assert!(config.is_development());
    assert_eq!(
        config.cors_origins,
        vec!["http://a.example".to_string(), "http://b.example".to_string()]
    );
    assert_eq!(config.case_name_prefix, "SUP");
}

#[test]
#[serial]
fn test_invalid_env_value() {
    clear_env();
    unsafe { std::env::set_var("PORT", "eighty") };
    let result = ApiConfig::load();
    clear_env();
    assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
}

#[test]
#[serial]
fn test_page_size_bounds_are_checked() {
    clear_env();
    unsafe {
        std::env::set_var("DEFAULT_PAGE_SIZE", "50");
        std::env::set_var("MAX_PAGE_SIZE", "20");
    }
    let result = ApiConfig::load();
    clear_env();
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_yaml_file_then_env() {
    clear_env();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port: 7000\nmax_page_size: 200\ncase_name_prefix: HD").unwrap();

    unsafe {
        std::env::set_var("CASES_API_CONFIG", file.path());
        std::env::set_var("PORT", "7001");
    }
    let config = ApiConfig::load().unwrap();
    clear_env();

    assert_eq!(config.port, 7001);
    assert_eq!(config.max_page_size, 200);
    assert_eq!(config.case_name_prefix, "HD");
    assert_eq!(config.default_page_size, 10);
}

#[test]
fn test_broken_yaml_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "port: [not a port").unwrap();
    let result = ApiConfig::from_file(file.path());
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
fn test_jwt_secret_rules() {
    let production = ApiConfig::default();
    assert!(matches!(
        production.resolve_jwt_secret(),
        Err(ConfigError::Insecure(_))
    ));

    let short = ApiConfig {
        jwt_secret: Some("short".to_string()),
        ..Default::default()
    };
    assert!(short.resolve_jwt_secret().is_err());

    let development = ApiConfig {
        app_env: AppEnv::Development,
        ..Default::default()
    };
    assert!(development.resolve_jwt_secret().unwrap().len() >= 32);

    let good = ApiConfig {
        jwt_secret: Some("a-production-secret-that-is-long-enough".to_string()),
        ..Default::default()
    };
    assert_eq!(
        good.resolve_jwt_secret().unwrap(),
        "a-production-secret-that-is-long-enough"
    );
}
