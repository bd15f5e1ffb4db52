use std::env;

use pretty_assertions::assert_eq;
use serial_test::serial;
use timesheet::config::Config;

mod common;

const KEYS: [&str; 8] = [
    "DATABASE_URL",
    "DATABASE_MAX_CONNECTIONS",
    "JWT_SECRET",
    "HOST",
    "PORT",
    "ENVIRONMENT",
    "CLIENT_BASE_URL",
    "ENFORCE_VALIDATION_ON_WRITE",
];

/// Runs `test` with the config variables cleared, restoring them afterwards.
fn with_clean_env<F: FnOnce()>(test: F) {
    let original: Vec<(&str, Option<String>)> =
        KEYS.iter().map(|key| (*key, env::var(key).ok())).collect();

    unsafe {
        for key in KEYS {
            env::remove_var(key);
        }
    }

    test();

    unsafe {
        for (key, value) in original {
            match value {
                Some(value) => env::set_var(key, value),
                None => env::remove_var(key),
            }
        }
    }
}

#[test]
#[serial]
fn test_config_from_env_with_defaults() {
    common::setup_test_env();

    with_clean_env(|| {
        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "postgres://@localhost:5432/timesheet");
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(
            config.jwt_secret,
            "your-super-secret-jwt-key-change-this-in-production-12345"
        );
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
        assert_eq!(config.environment, "development");
        assert_eq!(config.client_base_url, "http://localhost:3000");
        assert!(config.enforce_validation_on_write);
        assert!(config.is_development());
    });
}

#[test]
#[serial]
fn test_config_from_env_with_custom_values() {
    with_clean_env(|| {
        unsafe {
            env::set_var("DATABASE_URL", "postgres://db.internal:5432/hours");
            env::set_var("DATABASE_MAX_CONNECTIONS", "25");
            env::set_var("JWT_SECRET", "test-secret");
            env::set_var("HOST", "0.0.0.0");
            env::set_var("PORT", "3000");
            env::set_var("ENVIRONMENT", "production");
            env::set_var("CLIENT_BASE_URL", "https://app.example.com");
            env::set_var("ENFORCE_VALIDATION_ON_WRITE", "false");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.database_url, "postgres://db.internal:5432/hours");
        assert_eq!(config.database_max_connections, 25);
        assert_eq!(config.jwt_secret, "test-secret");
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.environment, "production");
        assert_eq!(config.client_base_url, "https://app.example.com");
        assert!(!config.enforce_validation_on_write);
        assert!(!config.is_development());
    });
}

#[test]
#[serial]
fn test_enforce_validation_flag_parsing() {
    with_clean_env(|| {
        for (value, expected) in [
            ("0", false),
            ("off", false),
            (" No ", false),
            ("FALSE", false),
            ("1", true),
            ("true", true),
            ("yes", true),
        ] {
            unsafe {
                env::set_var("ENFORCE_VALIDATION_ON_WRITE", value);
            }

            let config = Config::from_env_only().unwrap();

            assert_eq!(config.enforce_validation_on_write, expected, "value {:?}", value);
        }
    });
}

#[test]
#[serial]
fn test_config_invalid_numbers_fall_back_to_defaults() {
    with_clean_env(|| {
        unsafe {
            env::set_var("PORT", "invalid_port");
            env::set_var("DATABASE_MAX_CONNECTIONS", "many");
        }

        let config = Config::from_env_only().unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_max_connections, 10);
    });
}

#[test]
fn test_server_address() {
    let mut config = Config::test_config();
    config.host = "0.0.0.0".to_string();
    config.port = 9090;

    assert_eq!(config.server_address(), "0.0.0.0:9090");
}

#[test]
fn test_config_for_tests_enforces_validation() {
    let config = Config::test_config();

    assert!(config.enforce_validation_on_write);
    assert!(!config.is_development());
}
