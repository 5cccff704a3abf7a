use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

/// Configuration for a mock server instance
#[derive(Debug, Clone)]
pub struct MockServerConfig {
    pub host: IpAddr,
    pub port: u16, // 0 picks an ephemeral port
    pub api_prefix: String,
    pub fixtures: Vec<PathBuf>, // cassettes loaded by the binary at startup
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 0,
            api_prefix: "/ver1".to_string(),
            fixtures: Vec::new(),
        }
    }
}

impl MockServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(host) = lookup("MOCK_HOST") {
            match host.parse::<IpAddr>() {
                Ok(value) => config.host = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse MOCK_HOST '{}': {}, using default: {}",
                        host,
                        e,
                        config.host
                    );
                }
            }
        }

        if let Some(port) = lookup("MOCK_PORT") {
            match port.parse::<u16>() {
                Ok(value) => config.port = value,
                Err(e) => {
                    tracing::warn!(
                        "Failed to parse MOCK_PORT '{}': {}, using default: {}",
                        port,
                        e,
                        config.port
                    );
                }
            }
        }

        if let Some(prefix) = lookup("MOCK_API_PREFIX") {
            config.api_prefix = Self::normalize_prefix(&prefix);
        }

        if let Some(fixtures) = lookup("MOCK_FIXTURES") {
            config.fixtures = fixtures
                .split(',')
                .map(str::trim)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from)
                .collect();
        }

        config
    }

    /// Leading slash, no trailing slash; an empty prefix mounts at the root.
    pub fn normalize_prefix(prefix: &str) -> String {
        let trimmed = prefix.trim().trim_matches('/');
        if trimmed.is_empty() {
            String::new()
        } else {
            format!("/{}", trimmed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> MockServerConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        MockServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_config() {
        let config = MockServerConfig::default();
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 0);
        assert_eq!(config.api_prefix, "/ver1");
        assert!(config.fixtures.is_empty());
    }

    #[test]
    fn test_env_overrides() {
        let config = config_from(&[
            ("MOCK_HOST", "0.0.0.0"),
            ("MOCK_PORT", "8089"),
            ("MOCK_API_PREFIX", "public/api/ver1/"),
            ("MOCK_FIXTURES", "a.yaml, b.yaml,,"),
        ]);

        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.port, 8089);
        assert_eq!(config.api_prefix, "/public/api/ver1");
        assert_eq!(
            config.fixtures,
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.yaml")]
        );
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let config = config_from(&[("MOCK_HOST", "localhost:80"), ("MOCK_PORT", "70000")]);
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_eq!(config.port, 0);
    }

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(MockServerConfig::normalize_prefix("/ver1"), "/ver1");
        assert_eq!(MockServerConfig::normalize_prefix("ver1/"), "/ver1");
        assert_eq!(MockServerConfig::normalize_prefix("/"), "");
        assert_eq!(MockServerConfig::normalize_prefix(""), "");
    }
}
