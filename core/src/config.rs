//! Environment snapshot for the bootstrapper.
//!
//! All inputs are read once into [`BootstrapEnv`] so the bootstrap step
//! itself never touches process-wide state.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::BootstrapError;
use crate::servers::ServerEntry;

/// Well-known location the wrapped application reads its servers from.
pub const DEFAULT_CONFIG_PATH: &str = "/app/servers.yml";

/// Environment variable overriding the configuration file location.
pub const CONFIG_PATH_VAR: &str = "SERVERS_CONFIG_PATH";
/// Environment variable holding the API host. Required for synthesis.
pub const API_HOST_VAR: &str = "API_HOST";
/// Environment variable holding the API port.
pub const API_PORT_VAR: &str = "API_PORT";
/// Environment variable holding the API username.
pub const API_USERNAME_VAR: &str = "API_USERNAME";
/// Environment variable holding the API password.
pub const API_PASSWORD_VAR: &str = "API_PASSWORD";
/// Environment variable holding the API scheme.
pub const API_SCHEME_VAR: &str = "API_SCHEME";

/// Port written when `API_PORT` is unset.
pub const DEFAULT_API_PORT: u16 = 8001;
/// Username written when `API_USERNAME` is unset.
pub const DEFAULT_API_USERNAME: &str = "admin";
/// Password written when `API_PASSWORD` is unset.
pub const DEFAULT_API_PASSWORD: &str = "admin";

/// API connection values as supplied by the environment.
///
/// Every field is optional; defaults are applied by [`ApiSettings::synthesize`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiSettings {
    /// API host
    pub host: Option<String>,
    /// API port, unparsed
    pub port: Option<String>,
    /// API username
    pub username: Option<String>,
    /// API password
    pub password: Option<String>,
    /// API scheme
    pub scheme: Option<String>,
}

impl ApiSettings {
    /// Build the server entry to synthesize, applying defaults.
    ///
    /// # Returns
    ///
    /// `None` when no host is configured, since synthesis needs one.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::InvalidPort`] if the port is not a valid `u16`.
    pub fn synthesize(&self) -> Result<Option<ServerEntry>, BootstrapError> {
        let Some(host) = &self.host else {
            return Ok(None);
        };

        let port = match &self.port {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|source| BootstrapError::InvalidPort {
                    value: raw.clone(),
                    source,
                })?,
            None => DEFAULT_API_PORT,
        };

        Ok(Some(ServerEntry {
            host: host.clone(),
            port,
            username: self
                .username
                .clone()
                .unwrap_or_else(|| DEFAULT_API_USERNAME.to_string()),
            password: self
                .password
                .clone()
                .unwrap_or_else(|| DEFAULT_API_PASSWORD.to_string()),
            scheme: self.scheme.clone(),
        }))
    }
}

/// Snapshot of every environment input the bootstrapper reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapEnv {
    /// Configuration path override
    pub config_path: Option<PathBuf>,
    /// API connection values
    pub api: ApiSettings,
}

impl BootstrapEnv {
    /// Load the snapshot from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SERVERS_CONFIG_PATH`: configuration path override
    /// - `API_HOST`, `API_PORT`, `API_USERNAME`, `API_PASSWORD`, `API_SCHEME`
    ///
    /// Empty values count as unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(std::env::vars_os())
    }

    /// Build the snapshot from an explicit set of variables.
    ///
    /// Unrelated variables are ignored; later duplicates win.
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let mut env = Self::default();

        for (key, value) in vars {
            let key = key.into();
            let value = value.into();
            if value.is_empty() {
                continue;
            }

            match key.to_str() {
                Some(CONFIG_PATH_VAR) => env.config_path = Some(PathBuf::from(value)),
                Some(API_HOST_VAR) => env.api.host = Some(lossy(value)),
                Some(API_PORT_VAR) => env.api.port = Some(lossy(value)),
                Some(API_USERNAME_VAR) => env.api.username = Some(lossy(value)),
                Some(API_PASSWORD_VAR) => env.api.password = Some(lossy(value)),
                Some(API_SCHEME_VAR) => env.api.scheme = Some(lossy(value)),
                _ => {},
            }
        }

        env
    }

    /// Resolve the effective configuration path.
    ///
    /// The override wins when set, otherwise `default_path` is used.
    #[must_use]
    pub fn effective_path<'a>(&'a self, default_path: &'a Path) -> &'a Path {
        self.config_path.as_deref().unwrap_or(default_path)
    }
}

/// Convert an environment value to UTF-8, replacing invalid sequences.
fn lossy(value: OsString) -> String {
    value
        .into_string()
        .unwrap_or_else(|raw| raw.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_from_vars_reads_known_keys() {
        let env = BootstrapEnv::from_vars([
            ("SERVERS_CONFIG_PATH", "/cfg/custom.yml"),
            ("API_HOST", "10.0.0.5"),
            ("API_PORT", "9000"),
            ("API_SCHEME", "https"),
            ("HOME", "/root"),
        ]);

        assert_eq!(env.config_path, Some(PathBuf::from("/cfg/custom.yml")));
        assert_eq!(env.api.host.as_deref(), Some("10.0.0.5"));
        assert_eq!(env.api.port.as_deref(), Some("9000"));
        assert_eq!(env.api.scheme.as_deref(), Some("https"));
        assert_eq!(env.api.username, None);
    }

    #[test]
    fn test_from_vars_treats_empty_as_unset() {
        let env = BootstrapEnv::from_vars([("API_HOST", ""), ("SERVERS_CONFIG_PATH", "")]);
        assert_eq!(env, BootstrapEnv::default());
    }

    #[test]
    fn test_effective_path() {
        let default_path = Path::new(DEFAULT_CONFIG_PATH);

        let env = BootstrapEnv::default();
        assert_eq!(env.effective_path(default_path), default_path);

        let env = BootstrapEnv::from_vars([("SERVERS_CONFIG_PATH", "/cfg/custom.yml")]);
        assert_eq!(env.effective_path(default_path), Path::new("/cfg/custom.yml"));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_synthesize_applies_defaults() {
        let api = ApiSettings {
            host: Some("10.0.0.5".to_string()),
            ..ApiSettings::default()
        };

        let entry = api.synthesize().unwrap().unwrap();
        assert_eq!(entry.host, "10.0.0.5");
        assert_eq!(entry.port, 8001);
        assert_eq!(entry.username, "admin");
        assert_eq!(entry.password, "admin");
        assert_eq!(entry.scheme, None);
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_synthesize_without_host() {
        let api = ApiSettings {
            port: Some("9000".to_string()),
            username: Some("bob".to_string()),
            ..ApiSettings::default()
        };

        assert!(api.synthesize().unwrap().is_none());
    }

    #[test]
    fn test_synthesize_rejects_bad_port() {
        let api = ApiSettings {
            host: Some("localhost".to_string()),
            port: Some("eighty".to_string()),
            ..ApiSettings::default()
        };

        let err = api.synthesize();
        assert!(matches!(
            err,
            Err(BootstrapError::InvalidPort { ref value, .. }) if value == "eighty"
        ));
    }

    #[test]
    #[allow(clippy::unwrap_used)]
    fn test_invalid_port_message_names_variable() {
        let api = ApiSettings {
            host: Some("localhost".to_string()),
            port: Some("70000".to_string()),
            ..ApiSettings::default()
        };

        let message = api.synthesize().unwrap_err().to_string();
        assert!(message.starts_with("invalid API_PORT \"70000\""), "{message}");
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        let original = std::env::var_os(API_HOST_VAR);

        unsafe {
            std::env::set_var(API_HOST_VAR, "api.internal");
        }

        let env = BootstrapEnv::from_env();
        assert_eq!(env.api.host.as_deref(), Some("api.internal"));

        unsafe {
            match original {
                Some(value) => std::env::set_var(API_HOST_VAR, value),
                None => std::env::remove_var(API_HOST_VAR),
            }
        }
    }
}
