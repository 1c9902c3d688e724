// src/config/tls.rs
// DOCUMENTATION: TLS settings for the MySQL connection
// PURPOSE: Decide when TLS is used and load certificate material from disk

use sqlx::mysql::MySqlSslMode;
use std::fs;

/// Hostname fragments of managed MySQL providers that expect TLS
/// Matched case-insensitively anywhere in the host string
pub const MANAGED_HOST_PATTERNS: [&str; 4] = [
    "aivencloud.com",
    "tidbcloud",
    "rds.amazonaws.com",
    "database.azure.com",
];

/// Whether the host looks like a managed database service
pub fn is_managed_host(host: &str) -> bool {
    let host = host.to_ascii_lowercase();
    MANAGED_HOST_PATTERNS
        .iter()
        .any(|pattern| host.contains(pattern))
}

/// Resolve the DB_SSL flag against the host heuristic
/// An explicit flag always wins; only an unset flag falls back to the host
pub fn tls_enabled(flag: Option<&str>, host: Option<&str>) -> bool {
    match flag {
        Some(value) => value == "true" || value == "1",
        None => host.map(is_managed_host).unwrap_or(false),
    }
}

/// How the server certificate is checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertVerification {
    /// Verified against the configured CA
    AgainstCa,
    /// No CA configured; verification stays on and connections fail until one is provided
    StrictWithoutCa,
    /// No CA configured and DB_SSL_ALLOW_INSECURE=true; certificate is not checked
    Insecure,
}

impl CertVerification {
    /// Pick the policy from what was loaded and the DB_SSL_ALLOW_INSECURE flag
    pub fn resolve(ca_loaded: bool, allow_insecure: bool) -> Self {
        match (ca_loaded, allow_insecure) {
            (true, _) => CertVerification::AgainstCa,
            (false, true) => CertVerification::Insecure,
            (false, false) => CertVerification::StrictWithoutCa,
        }
    }

    pub fn verifies(&self) -> bool {
        !matches!(self, CertVerification::Insecure)
    }

    /// Operator warning emitted when this policy is chosen
    pub fn warning(&self) -> Option<&'static str> {
        match self {
            CertVerification::Insecure => Some(
                "DB_SSL_ALLOW_INSECURE=true: connecting with SSL but skipping CA verification. \
                 This is insecure and only meant for temporary testing.",
            ),
            _ => None,
        }
    }
}

/// TLS material and verification policy for database connections
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    /// PEM bytes of the certificate authority
    pub ca: Option<Vec<u8>>,

    /// PEM bytes of the client certificate
    pub cert: Option<Vec<u8>>,

    /// PEM bytes of the client private key
    pub key: Option<Vec<u8>>,

    /// Minimum protocol version, kept verbatim (e.g. "TLSv1.2")
    pub min_version: Option<String>,

    /// Server certificate policy
    pub verification: CertVerification,
}

impl TlsSettings {
    /// Load TLS settings from DB_SSL_* variables
    /// DOCUMENTATION: Unreadable files are logged and skipped, never fatal
    pub fn load<F>(lookup: &F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let ca = read_pem(lookup, "DB_SSL_CA_PATH");
        let cert = read_pem(lookup, "DB_SSL_CERT_PATH");
        let key = read_pem(lookup, "DB_SSL_KEY_PATH");
        let min_version = lookup("DB_SSL_MIN_VERSION");

        let verification = CertVerification::resolve(
            ca.is_some(),
            lookup("DB_SSL_ALLOW_INSECURE").as_deref() == Some("true"),
        );
        if let Some(warning) = verification.warning() {
            log::warn!("{}", warning);
        }

        TlsSettings {
            ca,
            cert,
            key,
            min_version,
            verification,
        }
    }

    /// Whether the server certificate must be verified
    pub fn verify(&self) -> bool {
        self.verification.verifies()
    }

    /// Driver SSL mode for these settings
    pub fn ssl_mode(&self) -> MySqlSslMode {
        if self.verify() {
            MySqlSslMode::VerifyIdentity
        } else {
            MySqlSslMode::Required
        }
    }
}

fn read_pem<F>(lookup: &F, var: &str) -> Option<Vec<u8>>
where
    F: Fn(&str) -> Option<String>,
{
    let path = lookup(var)?;
    match fs::read(&path) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            log::error!("Failed to read {}: {} ({})", var, path, e);
            None
        }
    }
}
