// src/config/db.rs
// DOCUMENTATION: MySQL connection settings and pool initialization
// PURPOSE: Derive pool options from the environment and report connectivity at startup

use crate::config::env::env_lookup;
use crate::config::tls::{tls_enabled, TlsSettings};
use crate::errors::{ConfigError, MissingVar};
use dotenv::dotenv;
use sqlx::mysql::{
    MySqlConnectOptions, MySqlDatabaseError, MySqlPool, MySqlPoolOptions, MySqlSslMode,
};
use sqlx::Connection;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Hard cap on concurrently open database connections
pub const MAX_CONNECTIONS: u32 = 10;

pub const DEFAULT_PORT: u16 = 3306;

pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 15_000;

/// Where the server is reached: a unix socket or a TCP endpoint, never both
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    Socket(PathBuf),
    Tcp { host: Option<String>, port: u16 },
}

impl fmt::Display for DbTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DbTarget::Socket(path) => write!(f, "socket:{}", path.display()),
            DbTarget::Tcp { host, port } => {
                write!(f, "{}:{}", host.as_deref().unwrap_or("<unset>"), port)
            }
        }
    }
}

/// Database connection settings loaded from DB_* variables
/// DOCUMENTATION: Built once at startup and handed to init_db_pool
/// Missing values are kept as None so the pool can still be created
#[derive(Debug, Clone)]
pub struct DbSettings {
    /// Socket path or host/port pair
    pub target: DbTarget,

    /// Login user (DB_USER, required)
    pub user: Option<String>,

    /// Login password (DB_PASSWORD)
    pub password: Option<String>,

    /// Schema name (DB_NAME, required)
    pub database: Option<String>,

    /// Maximum connections in the pool
    pub max_connections: u32,

    /// Time allowed to obtain a connection (DB_CONNECT_TIMEOUT, milliseconds)
    pub connect_timeout: Duration,

    /// TLS settings, None when TLS is off
    pub tls: Option<TlsSettings>,
}

impl DbSettings {
    /// Load database settings from the process environment
    pub fn from_env() -> Self {
        dotenv().ok();
        Self::from_lookup(env_lookup)
    }

    /// Build settings from an arbitrary name -> value lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("DB_HOST");

        let target = match lookup("DB_SOCKET_PATH") {
            Some(path) => DbTarget::Socket(PathBuf::from(path)),
            None => DbTarget::Tcp {
                host: host.clone(),
                port: parse_or(lookup("DB_PORT"), "DB_PORT", DEFAULT_PORT),
            },
        };

        let tls = if tls_enabled(lookup("DB_SSL").as_deref(), host.as_deref()) {
            Some(TlsSettings::load(&lookup))
        } else {
            None
        };

        let timeout_ms = parse_or(
            lookup("DB_CONNECT_TIMEOUT"),
            "DB_CONNECT_TIMEOUT",
            DEFAULT_CONNECT_TIMEOUT_MS,
        );

        DbSettings {
            target,
            user: lookup("DB_USER"),
            password: lookup("DB_PASSWORD"),
            database: lookup("DB_NAME"),
            max_connections: MAX_CONNECTIONS,
            connect_timeout: Duration::from_millis(timeout_ms),
            tls,
        }
    }

    /// Required variables that are absent, in a fixed order
    pub fn missing_vars(&self) -> Vec<MissingVar> {
        let mut missing = Vec::new();

        if matches!(self.target, DbTarget::Tcp { host: None, .. }) {
            missing.push(MissingVar::HostOrSocket);
        }
        if self.user.is_none() {
            missing.push(MissingVar::User);
        }
        if self.database.is_none() {
            missing.push(MissingVar::Database);
        }

        missing
    }

    /// Validate required configuration
    /// DOCUMENTATION: Callers log the error and continue; the failure shows up again on connect
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing = self.missing_vars();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::MissingVars(missing))
        }
    }

    /// Translate settings into sqlx connect options
    pub fn connect_options(&self) -> MySqlConnectOptions {
        let mut options = MySqlConnectOptions::new();

        options = match &self.target {
            DbTarget::Socket(path) => options.socket(path),
            DbTarget::Tcp { host, port } => {
                let options = match host {
                    Some(host) => options.host(host),
                    None => options,
                };
                options.port(*port)
            }
        };

        if let Some(user) = &self.user {
            options = options.username(user);
        }
        if let Some(password) = &self.password {
            options = options.password(password);
        }
        if let Some(database) = &self.database {
            options = options.database(database);
        }

        match &self.tls {
            Some(tls) => {
                options = options.ssl_mode(tls.ssl_mode());
                if let Some(ca) = &tls.ca {
                    options = options.ssl_ca_from_pem(ca.clone());
                }
                if let Some(cert) = &tls.cert {
                    options = options.ssl_client_cert_from_pem(cert);
                }
                if let Some(key) = &tls.key {
                    options = options.ssl_client_key_from_pem(key);
                }
                if let Some(version) = &tls.min_version {
                    // The driver negotiates the protocol itself; the value is kept for operators
                    log::debug!("DB_SSL_MIN_VERSION={} recorded", version);
                }
            }
            None => {
                options = options.ssl_mode(MySqlSslMode::Disabled);
            }
        }

        options
    }
}

fn parse_or<T: std::str::FromStr + Copy + fmt::Display>(
    value: Option<String>,
    var: &str,
    default: T,
) -> T {
    match value {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("Invalid {}={:?}, using default {}", var, raw, default);
            default
        }),
        None => default,
    }
}

/// Initialize MySQL connection pool
/// DOCUMENTATION: Creates the pool without connecting so startup never blocks on the database
/// Waiters queue without a depth limit; acquire is bounded by the connect timeout
/// A waiter behind a full pool gets PoolTimedOut after DB_CONNECT_TIMEOUT. sqlx has no
/// separate connect timeout, so this bounds both; it is not an admission limit
pub fn init_db_pool(settings: &DbSettings) -> MySqlPool {
    log::info!(
        "Initializing database pool: {} (db={}, max_connections={}, tls={})",
        settings.target,
        settings.database.as_deref().unwrap_or("<unset>"),
        settings.max_connections,
        settings.tls.is_some()
    );

    MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.connect_timeout)
        .connect_lazy_with(settings.connect_options())
}

/// Acquire one connection, ping it and hand it back to the pool
pub async fn check_connection(pool: &MySqlPool) -> Result<(), sqlx::Error> {
    let mut conn = pool.acquire().await?;
    conn.ping().await?;
    Ok(())
}

/// Run the startup connectivity check in the background
/// The outcome is only logged; the HTTP server starts regardless
pub fn spawn_connection_check(pool: MySqlPool, settings: &DbSettings) {
    let target = settings.target.clone();
    let database = settings.database.clone().unwrap_or_default();

    actix_rt::spawn(async move {
        match check_connection(&pool).await {
            Ok(()) => log::info!("Connected to MySQL {} (db={})", target, database),
            Err(e) => ConnectionFailure::from_error(&e).log(),
        }
    });
}

/// Operator-facing summary of a failed connection attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionFailure {
    pub message: String,
    /// Provider code: SQLSTATE for server errors, io kind for socket errors
    pub code: Option<String>,
    /// MySQL error number or OS errno
    pub errno: Option<i32>,
    /// Server rejected a plaintext connection
    pub needs_tls_hint: bool,
    /// Full error chain for debug output
    pub detail: String,
}

impl ConnectionFailure {
    pub fn from_error(err: &sqlx::Error) -> Self {
        let message = err.to_string();

        let (code, errno) = match err {
            sqlx::Error::Database(db_err) => (
                db_err.code().map(|c| c.into_owned()),
                db_err
                    .try_downcast_ref::<MySqlDatabaseError>()
                    .map(|e| i32::from(e.number())),
            ),
            sqlx::Error::Io(io_err) => (Some(format!("{:?}", io_err.kind())), io_err.raw_os_error()),
            sqlx::Error::PoolTimedOut => (Some("PoolTimedOut".to_string()), None),
            _ => (None, None),
        };

        ConnectionFailure {
            needs_tls_hint: mentions_insecure_transport(&message),
            detail: format!("{:?}", err),
            message,
            code,
            errno,
        }
    }

    pub fn log(&self) {
        log::error!("Database connection failed:");
        log::error!("  message: {}", self.message);
        if let Some(code) = &self.code {
            log::error!("  code: {}", code);
        }
        if let Some(errno) = self.errno {
            log::error!("  errno: {}", errno);
        }
        if self.needs_tls_hint {
            log::error!(
                "Hint: the server requires SSL/TLS. Set DB_SSL=true and DB_SSL_CA_PATH \
                 to the provider CA file in your .env."
            );
        }
        log::debug!("{}", self.detail);
    }
}

fn mentions_insecure_transport(message: &str) -> bool {
    message.to_ascii_lowercase().contains("insecure transport")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::testing::lookup_from;

    #[test]
    fn test_missing_vars_reported_in_order() {
        let settings = DbSettings::from_lookup(lookup_from(&[("DB_PASSWORD", "secret")]));

        assert_eq!(
            settings.missing_vars(),
            vec![MissingVar::HostOrSocket, MissingVar::User, MissingVar::Database]
        );

        let err = settings.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing DB env vars: DB_HOST or DB_SOCKET_PATH, DB_USER, DB_NAME"
        );
    }

    #[test]
    fn test_complete_settings_validate() {
        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_HOST", "127.0.0.1"),
            ("DB_USER", "shop"),
            ("DB_NAME", "storefront"),
        ]));

        assert!(settings.validate().is_ok());
        assert_eq!(
            settings.target,
            DbTarget::Tcp {
                host: Some("127.0.0.1".to_string()),
                port: 3306
            }
        );
        assert_eq!(settings.max_connections, 10);
        assert_eq!(settings.connect_timeout, Duration::from_millis(15_000));
        assert!(settings.tls.is_none());
    }

    #[test]
    fn test_socket_path_satisfies_target() {
        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_SOCKET_PATH", "/var/run/mysqld/mysqld.sock"),
            ("DB_HOST", "ignored.example.com"),
            ("DB_USER", "shop"),
        ]));

        assert_eq!(
            settings.target,
            DbTarget::Socket(PathBuf::from("/var/run/mysqld/mysqld.sock"))
        );
        assert_eq!(settings.missing_vars(), vec![MissingVar::Database]);
        assert_eq!(settings.target.to_string(), "socket:/var/run/mysqld/mysqld.sock");
    }

    #[test]
    fn test_port_and_timeout_overrides() {
        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "3307"),
            ("DB_CONNECT_TIMEOUT", "2500"),
        ]));

        assert_eq!(settings.target.to_string(), "db:3307");
        assert_eq!(settings.connect_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_invalid_numbers_fall_back() {
        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_HOST", "db"),
            ("DB_PORT", "abc"),
            ("DB_CONNECT_TIMEOUT", "soon"),
        ]));

        assert_eq!(settings.target.to_string(), "db:3306");
        assert_eq!(settings.connect_timeout, Duration::from_millis(15_000));
    }

    #[test]
    fn test_managed_host_enables_tls() {
        let settings = DbSettings::from_lookup(lookup_from(&[("DB_HOST", "foo.aivencloud.com")]));
        let tls = settings.tls.expect("tls should be enabled for managed host");
        assert!(tls.verify());

        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_HOST", "foo.aivencloud.com"),
            ("DB_SSL", "false"),
        ]));
        assert!(settings.tls.is_none());
    }

    #[test]
    fn test_insecure_fallback_through_settings() {
        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_HOST", "localhost"),
            ("DB_SSL", "true"),
            ("DB_SSL_ALLOW_INSECURE", "true"),
        ]));

        let tls = settings.tls.expect("tls forced on");
        assert!(!tls.verify());
        assert!(tls.ca.is_none());
    }

    #[test]
    fn test_tls_hint_detection() {
        let err = sqlx::Error::Protocol(
            "Connections using insecure transport are prohibited while --require_secure_transport=ON."
                .to_string(),
        );
        let failure = ConnectionFailure::from_error(&err);

        assert!(failure.needs_tls_hint);
        assert!(failure.code.is_none());
    }

    #[test]
    fn test_io_failure_carries_code() {
        let err = sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        let failure = ConnectionFailure::from_error(&err);

        assert_eq!(failure.code.as_deref(), Some("ConnectionRefused"));
        assert!(!failure.needs_tls_hint);
        assert!(failure.detail.starts_with("Io("));
        assert!(failure.detail.contains("ConnectionRefused"));
    }

    #[test]
    fn test_pool_timeout_failure() {
        let failure = ConnectionFailure::from_error(&sqlx::Error::PoolTimedOut);
        assert_eq!(failure.code.as_deref(), Some("PoolTimedOut"));
        assert_eq!(failure.errno, None);
        assert_eq!(failure.detail, "PoolTimedOut");
    }

    #[actix_web::test]
    async fn test_pool_created_without_database() {
        let settings = DbSettings::from_lookup(lookup_from(&[
            ("DB_HOST", "127.0.0.1"),
            ("DB_PORT", "1"),
            ("DB_CONNECT_TIMEOUT", "500"),
        ]));

        let pool = init_db_pool(&settings);
        assert_eq!(pool.size(), 0);
        assert!(check_connection(&pool).await.is_err());
    }
}
