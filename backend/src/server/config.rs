//! Server settings loaded via OrthoConfig.
//!
//! Every field can be set with a `CW_`-prefixed environment variable, e.g.
//! `CW_DATA_DIR=/var/lib/cw` or `CW_ADMIN_PASSWORD=...`.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use actix_web::cookie::Key;
use cap_std::{ambient_authority, fs::Dir};
use ortho_config::OrthoConfig;
use serde::Deserialize;
use tracing::warn;
use url::Url;
use zeroize::Zeroize;

use crate::domain::AdminCredentials;
use crate::outbound::ResilienceConfig;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PUBLIC_BASE_URL: &str = "http://localhost:8080/";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";
const SESSION_KEY_MIN_LEN: usize = 64;

/// Build mode for settings validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Tolerates a missing session key by generating a temporary one.
    Debug,
    /// Requires a readable session key of at least 64 bytes.
    Release,
}

impl BuildMode {
    /// Mode matching `cfg!(debug_assertions)`.
    #[must_use]
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// Errors raised while turning settings into runtime configuration.
#[derive(thiserror::Error, Debug)]
pub enum ServerConfigError {
    #[error("CW_ADMIN_PASSWORD must be set")]
    MissingAdminPassword,
    #[error("invalid bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("invalid public base URL '{value}': {source}")]
    InvalidBaseUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        path: PathBuf,
        length: usize,
        min_len: usize,
    },
}

/// Runtime settings for the HTTP server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CW")]
pub struct ServerSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory holding records and uploads; in-memory stores when absent.
    pub data_dir: Option<PathBuf>,
    /// Base URL under which `/api/v1/files/` is reachable by browsers.
    pub public_base_url: Option<String>,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
    /// File whose bytes derive the cookie signing key.
    pub session_key_file: Option<PathBuf>,
    /// Mark session cookies `Secure`; see [`Self::cookie_secure`].
    pub cookie_secure: Option<bool>,
    /// Deadline for one record store call, in milliseconds.
    pub store_timeout_ms: Option<u64>,
    /// Attempts per record store call, including the first.
    pub store_attempts: Option<u32>,
}

impl ServerSettings {
    /// Address to bind, defaulting to `0.0.0.0:8080`.
    pub fn bind_addr(&self) -> Result<SocketAddr, ServerConfigError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value
            .parse()
            .map_err(|source| ServerConfigError::InvalidBindAddr {
                value: value.to_owned(),
                source,
            })
    }

    /// Base URL for attachment links; a trailing slash is added when missing
    /// so relative joins keep any path prefix.
    pub fn public_base_url(&self) -> Result<Url, ServerConfigError> {
        let raw = self
            .public_base_url
            .as_deref()
            .unwrap_or(DEFAULT_PUBLIC_BASE_URL);
        let normalised = if raw.ends_with('/') {
            raw.to_owned()
        } else {
            format!("{raw}/")
        };
        Url::parse(&normalised).map_err(|source| ServerConfigError::InvalidBaseUrl {
            value: raw.to_owned(),
            source,
        })
    }

    /// Administrator credentials; the password has no default.
    pub fn admin_credentials(&self) -> Result<AdminCredentials, ServerConfigError> {
        let password = self
            .admin_password
            .as_deref()
            .filter(|password| !password.is_empty())
            .ok_or(ServerConfigError::MissingAdminPassword)?;
        let username = self
            .admin_username
            .as_deref()
            .unwrap_or(DEFAULT_ADMIN_USERNAME);
        Ok(AdminCredentials::new(username, password))
    }

    /// Whether session cookies carry `Secure`, on unless explicitly disabled.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookie_secure.unwrap_or(true)
    }

    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Record store limits, falling back to the defaults per field.
    pub fn resilience(&self) -> ResilienceConfig {
        let defaults = ResilienceConfig::default();
        ResilienceConfig {
            call_timeout: self
                .store_timeout_ms
                .map_or(defaults.call_timeout, Duration::from_millis),
            max_attempts: self
                .store_attempts
                .map_or(defaults.max_attempts, |attempts| attempts.max(1)),
            ..defaults
        }
    }

    /// Cookie signing key from [`Self::session_key_file`].
    pub fn session_key(&self, mode: BuildMode) -> Result<Key, ServerConfigError> {
        load_session_key(&self.session_key_file(), mode)
    }
}

fn read_key_bytes(path: &Path) -> std::io::Result<Vec<u8>> {
    let parent = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "key path has no file name")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read(name)
}

/// Derive the session key, generating a temporary one in debug builds when
/// the file cannot be read.
pub fn load_session_key(path: &Path, mode: BuildMode) -> Result<Key, ServerConfigError> {
    match read_key_bytes(path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(ServerConfigError::KeyTooShort {
                    path: path.to_path_buf(),
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode == BuildMode::Debug => {
            warn!(
                path = %path.display(),
                error = %error,
                "using temporary session key (dev only)"
            );
            Ok(Key::generate())
        }
        Err(source) => Err(ServerConfigError::KeyRead {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for server settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "CW_BIND_ADDR",
        "CW_DATA_DIR",
        "CW_PUBLIC_BASE_URL",
        "CW_ADMIN_USERNAME",
        "CW_ADMIN_PASSWORD",
        "CW_SESSION_KEY_FILE",
        "CW_COOKIE_SECURE",
        "CW_STORE_TIMEOUT_MS",
        "CW_STORE_ATTEMPTS",
    ];

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("cw-backend")])
            .expect("config should load")
    }

    fn cleared_except(set: &[(&'static str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = set
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared_except(&[]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("socket address")
        );
        assert!(settings.data_dir.is_none());
        assert_eq!(settings.cookie_secure, None);
        assert!(settings.cookie_secure());
        assert_eq!(
            settings.public_base_url().expect("default url").as_str(),
            DEFAULT_PUBLIC_BASE_URL
        );
        assert!(matches!(
            settings.admin_credentials(),
            Err(ServerConfigError::MissingAdminPassword)
        ));
        assert_eq!(settings.resilience(), ResilienceConfig::default());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(cleared_except(&[
            ("CW_BIND_ADDR", "127.0.0.1:9000"),
            ("CW_DATA_DIR", "/srv/cw"),
            ("CW_PUBLIC_BASE_URL", "https://cw.example.org/app"),
            ("CW_ADMIN_USERNAME", "chair"),
            ("CW_ADMIN_PASSWORD", "s3cret"),
            ("CW_COOKIE_SECURE", "false"),
            ("CW_STORE_TIMEOUT_MS", "250"),
            ("CW_STORE_ATTEMPTS", "5"),
        ]));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address").port(),
            9000
        );
        assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/cw")));
        assert!(!settings.cookie_secure());
        assert_eq!(
            settings.public_base_url().expect("url").as_str(),
            "https://cw.example.org/app/"
        );
        let credentials = settings.admin_credentials().expect("credentials");
        assert!(credentials.matches("chair", "s3cret"));
        let resilience = settings.resilience();
        assert_eq!(resilience.call_timeout, Duration::from_millis(250));
        assert_eq!(resilience.max_attempts, 5);
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    fn cookie_secure_follows_environment(#[case] raw: &str, #[case] expected: bool) {
        let _guard = lock_env(cleared_except(&[("CW_COOKIE_SECURE", raw)]));

        assert_eq!(load_from_empty_args().cookie_secure(), expected);
    }

    #[rstest]
    fn invalid_bind_address_is_reported() {
        let _guard = lock_env(cleared_except(&[("CW_BIND_ADDR", "localhost")]));

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(ServerConfigError::InvalidBindAddr { .. })
        ));
    }

    #[rstest]
    fn release_requires_long_readable_key() {
        let dir = tempfile::tempdir().expect("temp dir");
        let short = dir.path().join("short_key");
        let long = dir.path().join("long_key");
        std::fs::write(&short, [7_u8; 16]).expect("write short key");
        std::fs::write(&long, [7_u8; 64]).expect("write long key");

        assert!(matches!(
            load_session_key(&short, BuildMode::Release),
            Err(ServerConfigError::KeyTooShort { length: 16, .. })
        ));
        assert!(load_session_key(&long, BuildMode::Release).is_ok());
        assert!(matches!(
            load_session_key(&dir.path().join("missing"), BuildMode::Release),
            Err(ServerConfigError::KeyRead { .. })
        ));
    }

    #[rstest]
    fn debug_falls_back_to_temporary_key() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert!(load_session_key(&dir.path().join("missing"), BuildMode::Debug).is_ok());
    }
}
