//! Server settings loaded through `ortho_config`.

use std::ffi::OsString;
use std::net::SocketAddr;

use color_eyre::eyre::{Result, WrapErr, eyre};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";

/// Settings read from `ADMIN_BACKEND_*` variables, config files, and flags.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ADMIN_BACKEND")]
pub struct ServerSettings {
    /// Listen address; defaults to `0.0.0.0:5000`.
    pub bind_addr: Option<String>,
}

impl ServerSettings {
    /// Load settings from the environment and configuration files.
    pub fn load_from_env() -> Result<Self> {
        Self::load_from_iter([OsString::from("admin-backend")])
            .map_err(|err| eyre!("failed to load server settings: {err}"))
    }

    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse()
            .wrap_err_with(|| format!("invalid bind address `{raw}`"))
    }
}

/// Resolved configuration for [`super::create_server`].
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self { bind_addr }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use env_lock::lock_env;
    use rstest::rstest;

    const VAR: &str = "ADMIN_BACKEND_BIND_ADDR";

    #[rstest]
    fn defaults_to_port_5000() {
        let _guard = lock_env([(VAR, None::<String>)]);

        let settings = ServerSettings::load_from_env().expect("settings load");

        assert_eq!(
            settings.bind_addr().expect("valid address"),
            "0.0.0.0:5000".parse::<SocketAddr>().expect("literal")
        );
    }

    #[rstest]
    fn environment_overrides_bind_addr() {
        let _guard = lock_env([(VAR, Some("127.0.0.1:8088"))]);

        let settings = ServerSettings::load_from_env().expect("settings load");

        assert_eq!(
            settings.bind_addr().expect("valid address").port(),
            8088
        );
    }

    #[rstest]
    fn malformed_bind_addr_is_reported() {
        let settings = ServerSettings {
            bind_addr: Some("localhost".to_owned()),
        };

        let err = settings.bind_addr().expect_err("not a socket address");

        assert!(err.to_string().contains("localhost"));
    }
}
