//! Global application configuration manager.
//!
//! `AppConfig` is a lazily initialized, globally accessible singleton containing
//! runtime configuration values loaded from `.env` and environment variables.
//! It provides thread-safe access and mutation for tests or runtime overrides.
//!
//! Client handles (database, session cache, push, mail) are *not* kept here;
//! they are built from these values by the API's `AppState`.

use std::env;
use std::str::FromStr;
use std::sync::{OnceLock, RwLock};

/// Represents the complete application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: String,
    pub project_name: String,
    pub log_level: String,
    pub log_file: String,
    pub log_to_stdout: bool,
    pub database_path: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_duration_minutes: u64,
    pub otp_expiry_minutes: u64,
    pub session_duration_seconds: u64,
    pub geofence_radius_km: f64,
    pub redis_url: String,
    pub fcm_server_key: String,
    pub smtp_host: String,
    pub smtp_username: String,
    pub smtp_password: String,
    pub email_from_name: String,
    pub email_from_address: String,
}

/// Lazily-initialized, thread-safe singleton instance of `AppConfig`.
static CONFIG_INSTANCE: OnceLock<RwLock<AppConfig>> = OnceLock::new();

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.into())
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    /// Loads the configuration from `.env` and environment variables.
    ///
    /// Missing values fall back to development defaults. Secrets default to
    /// empty strings; the server refuses to start without `JWT_SECRET`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            env: var_or("APP_ENV", "development"),
            project_name: var_or("PROJECT_NAME", "attendx"),
            log_level: var_or("LOG_LEVEL", "api=info,services=info"),
            log_file: var_or("LOG_FILE", "api.log"),
            log_to_stdout: var_or("LOG_TO_STDOUT", "false") == "true",
            database_path: var_or("DATABASE_PATH", "data/attendx.db"),
            host: var_or("HOST", "127.0.0.1"),
            port: parse_or("PORT", 3000),
            jwt_secret: var_or("JWT_SECRET", ""),
            jwt_duration_minutes: parse_or("JWT_DURATION_MINUTES", 7 * 24 * 60),
            otp_expiry_minutes: parse_or("OTP_EXPIRY_MINUTES", 5),
            session_duration_seconds: parse_or("SESSION_DURATION_SECONDS", 180),
            geofence_radius_km: parse_or("GEOFENCE_RADIUS_KM", 1.0),
            redis_url: var_or("REDIS_URL", ""),
            fcm_server_key: var_or("FCM_SERVER_KEY", ""),
            smtp_host: var_or("SMTP_HOST", ""),
            smtp_username: var_or("SMTP_USERNAME", ""),
            smtp_password: var_or("SMTP_PASSWORD", ""),
            email_from_name: var_or("EMAIL_FROM_NAME", "Attendx Admin"),
            email_from_address: var_or("EMAIL_FROM_ADDRESS", "admin@attendx.local"),
        }
    }

    /// Returns a shared reference to the global configuration.
    ///
    /// # Panics
    /// Panics if the lock is poisoned.
    pub fn global() -> std::sync::RwLockReadGuard<'static, AppConfig> {
        CONFIG_INSTANCE
            .get_or_init(|| RwLock::new(AppConfig::from_env()))
            .read()
            .expect("Failed to acquire AppConfig read lock")
    }

    /// Resets the configuration by reloading from environment variables.
    ///
    /// Useful in tests to clear overrides.
    pub fn reset() {
        if let Some(lock) = CONFIG_INSTANCE.get() {
            let mut guard = lock
                .write()
                .expect("Failed to acquire AppConfig write lock");
            *guard = AppConfig::from_env();
        }
    }

    fn set_field<F>(setter: F)
    where
        F: FnOnce(&mut AppConfig),
    {
        let lock = CONFIG_INSTANCE.get_or_init(|| RwLock::new(AppConfig::from_env()));
        let mut guard = lock
            .write()
            .expect("Failed to acquire AppConfig write lock");
        setter(&mut guard);
    }

    // --- Per-field setters below ---

    pub fn set_session_duration_seconds(value: u64) {
        AppConfig::set_field(|cfg| cfg.session_duration_seconds = value);
    }

    pub fn set_geofence_radius_km(value: f64) {
        AppConfig::set_field(|cfg| cfg.geofence_radius_km = value);
    }
}

// --- Free accessors used by binaries ---

pub fn env() -> String {
    AppConfig::global().env.clone()
}

pub fn project_name() -> String {
    AppConfig::global().project_name.clone()
}

pub fn log_level() -> String {
    AppConfig::global().log_level.clone()
}

pub fn log_file() -> String {
    AppConfig::global().log_file.clone()
}

pub fn log_to_stdout() -> bool {
    AppConfig::global().log_to_stdout
}

pub fn database_path() -> String {
    AppConfig::global().database_path.clone()
}

pub fn host() -> String {
    AppConfig::global().host.clone()
}

pub fn port() -> u16 {
    AppConfig::global().port
}
