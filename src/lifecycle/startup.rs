//! Startup orchestration.
//!
//! Fail fast: any problem here is fatal and reported before a socket is bound.

use std::path::Path;

use crate::config::{load_config, validate_config, ConfigError, ProxyConfig};

/// Build the effective configuration from an optional file and the command line.
///
/// The command line port always wins; `host` overrides the configured bind host when given.
pub fn resolve_config(
    path: Option<&Path>,
    port: u16,
    host: Option<&str>,
) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };

    config.listener.port = port;
    if let Some(host) = host {
        config.listener.host = host.to_string();
    }

    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_overrides_defaults() {
        let config = resolve_config(None, 3128, Some("127.0.0.1")).unwrap();
        assert_eq!(config.listener.bind_address(), "127.0.0.1:3128");
    }

    #[test]
    fn invalid_host_override_is_rejected() {
        let err = resolve_config(None, 3128, Some("localhost")).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref errors) if errors[0].field == "listener.host"
        ));
    }

    #[test]
    fn ipv6_host_override_is_bracketed() {
        let config = resolve_config(None, 3128, Some("::1")).unwrap();
        assert_eq!(config.listener.bind_address(), "[::1]:3128");
        assert!(config.listener.socket_addr().unwrap().is_ipv6());

        let any = resolve_config(None, 0, Some("::")).unwrap();
        assert_eq!(any.listener.bind_address(), "[::]:0");
    }

    #[test]
    fn port_zero_is_allowed_for_ephemeral_binds() {
        let config = resolve_config(None, 0, None).unwrap();
        assert_eq!(config.listener.bind_address(), "0.0.0.0:0");
    }
}
