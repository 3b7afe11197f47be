use servyre_it::config::{AppConfig, ConfigError, ConfigLoader};
use std::{
    env, fs,
    path::PathBuf,
    sync::{Mutex, MutexGuard, OnceLock},
};
use tempfile::TempDir;

const VARS: &[&str] = &[
    "SERVYRE_PROFILE",
    "SERVYRE_API_BIND_ADDR",
    "SERVYRE_LOG_LEVEL",
    "SERVYRE_SESSION_SECRET",
    "SERVYRE_DEV_LOGIN_ENABLED",
    "SERVYRE_MAX_ATTACHMENT_BYTES",
    "SERVYRE_DATABASE_URL",
];

fn env_lock() -> &'static Mutex<()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
}

fn env_guard() -> MutexGuard<'static, ()> {
    env_lock()
        .lock()
        .unwrap_or_else(|poison| poison.into_inner())
}

fn clear_env() {
    for var in VARS {
        unsafe {
            env::remove_var(var);
        }
    }
}

fn write_env_file(dir: &TempDir, name: &str, contents: &str) {
    let path = dir.path().join(name);
    fs::write(path, contents).unwrap();
}

fn loader(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_base_dir(PathBuf::from(dir.path()))
}

#[test]
fn loads_defaults_when_no_env_present() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    let cfg = loader(&temp_dir).load().expect("config loads with defaults");

    assert_eq!(cfg.profile, "local");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:8080");
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.requester_email_domain, "servyre");
    assert_eq!(cfg.max_attachment_bytes, 10 * 1024 * 1024);
    assert!(cfg.dev_login_enabled);
    assert!(cfg.run_migrations);
    cfg.bind_addr().expect("default bind addr parses");
}

#[test]
fn layered_env_files_apply_in_order() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "SERVYRE_API_BIND_ADDR=127.0.0.1:3000\n");
    write_env_file(&temp_dir, ".env.test", "SERVYRE_API_BIND_ADDR=192.168.0.10:5000\n");
    write_env_file(&temp_dir, ".env.test.local", "SERVYRE_API_BIND_ADDR=10.0.0.5:6000\n");

    // Select profile via .env.local before profile-specific files load.
    write_env_file(
        &temp_dir,
        ".env.local",
        "SERVYRE_PROFILE=test\nSERVYRE_API_BIND_ADDR=127.0.0.1:4000\nOTHER_APP_KEY=ignored\n",
    );

    let cfg = loader(&temp_dir).load().expect("config loads with layered env files");

    assert_eq!(cfg.profile, "test");
    assert_eq!(cfg.api_bind_addr, "10.0.0.5:6000");
}

#[test]
fn os_environment_has_highest_precedence() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "SERVYRE_API_BIND_ADDR=127.0.0.1:3000\n");

    unsafe {
        env::set_var("SERVYRE_API_BIND_ADDR", "0.0.0.0:9090");
    }

    let cfg = loader(&temp_dir).load().expect("config loads with env override");
    assert_eq!(cfg.api_bind_addr, "0.0.0.0:9090");

    clear_env();
}

#[test]
fn invalid_bind_addr_returns_error() {
    let _guard = env_guard();
    clear_env();

    unsafe {
        env::set_var("SERVYRE_API_BIND_ADDR", "not-an-addr");
    }
    let temp_dir = TempDir::new().unwrap();
    let err = loader(&temp_dir).load().expect_err("invalid bind addr should fail");
    assert!(format!("{}", err).contains("invalid api bind address"));

    clear_env();
}

#[test]
fn production_requires_a_long_session_secret() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "SERVYRE_PROFILE=prod\n");
    let err = loader(&temp_dir).load().expect_err("missing secret should fail");
    assert!(matches!(err, ConfigError::MissingSessionSecret));

    write_env_file(&temp_dir, ".env", "SERVYRE_PROFILE=prod\nSERVYRE_SESSION_SECRET=short\n");
    let err = loader(&temp_dir).load().expect_err("short secret should fail");
    assert!(matches!(err, ConfigError::SessionSecretTooShort { length: 5 }));

    write_env_file(
        &temp_dir,
        ".env",
        "SERVYRE_PROFILE=prod\nSERVYRE_SESSION_SECRET=0123456789abcdef0123456789abcdef\n",
    );
    let cfg = loader(&temp_dir).load().expect("prod config with secret loads");
    assert!(!cfg.dev_login_enabled);
    assert!(!cfg.is_development());
}

#[test]
fn dev_login_is_rejected_outside_development() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(
        &temp_dir,
        ".env",
        "SERVYRE_PROFILE=staging\nSERVYRE_SESSION_SECRET=0123456789abcdef0123456789abcdef\nSERVYRE_DEV_LOGIN_ENABLED=true\n",
    );
    let err = loader(&temp_dir).load().expect_err("dev login in staging should fail");
    assert!(matches!(err, ConfigError::DevLoginOutsideDevelopment { .. }));
}

#[test]
fn malformed_numbers_and_booleans_name_the_key() {
    let _guard = env_guard();
    clear_env();

    let temp_dir = TempDir::new().unwrap();
    write_env_file(&temp_dir, ".env", "SERVYRE_MAX_ATTACHMENT_BYTES=lots\n");
    let err = loader(&temp_dir).load().expect_err("bad number should fail");
    assert!(format!("{err}").contains("SERVYRE_MAX_ATTACHMENT_BYTES"));

    write_env_file(&temp_dir, ".env", "SERVYRE_DEV_LOGIN_ENABLED=maybe\n");
    let err = loader(&temp_dir).load().expect_err("bad boolean should fail");
    assert!(format!("{err}").contains("SERVYRE_DEV_LOGIN_ENABLED"));
}

#[test]
fn redacted_json_hides_secrets() {
    let cfg = AppConfig {
        session_secret: Some("super-secret-session-key-super-secret".to_string()),
        database_url: "postgres://servyre:hunter2@db:5432/servyre".to_string(),
        ..AppConfig::default()
    };

    let json = cfg.redacted_json().unwrap();
    assert!(!json.contains("super-secret-session-key"));
    assert!(!json.contains("hunter2"));
    assert!(json.contains("[REDACTED]"));
}
