// ABOUTME: Configuration types and parsing for glaukos.yml.
// ABOUTME: Handles YAML parsing, validation, and per-section defaults.

mod drain;
mod health;
mod init;
mod proxy;
mod smoke;

pub use drain::DrainConfig;
pub use health::HealthConfig;
pub use init::init_config;
pub use proxy::ProxySettings;
pub use smoke::SmokeConfig;

use crate::error::{Error, Result};
use crate::types::{Color, ImageRef, ServiceName};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILENAME: &str = "glaukos.yml";
pub const CONFIG_FILENAME_ALT: &str = "glaukos.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(deserialize_with = "deserialize_service_name")]
    pub service: ServiceName,

    #[serde(deserialize_with = "deserialize_image_ref")]
    pub image: ImageRef,

    pub environments: Environments,

    pub proxy: ProxySettings,

    #[serde(default)]
    pub health: HealthConfig,

    #[serde(default)]
    pub smoke: SmokeConfig,

    #[serde(default)]
    pub drain: DrainConfig,

    #[serde(default)]
    pub runtime: RuntimeConfig,

    #[serde(default)]
    pub env: HashMap<String, String>,

    #[serde(default)]
    pub labels: HashMap<String, String>,
}

/// The two environments, one per color. Fixed shape rather than a list:
/// there is never a third slot.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Environments {
    pub blue: EnvironmentConfig,
    pub green: EnvironmentConfig,
}

impl Environments {
    pub fn get(&self, color: Color) -> &EnvironmentConfig {
        match color {
            Color::Blue => &self.blue,
            Color::Green => &self.green,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentConfig {
    /// host:port the reverse proxy routes to and probes reach.
    pub address: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Explicit runtime socket path (overrides the default).
    pub socket: Option<String>,
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Locate and parse the config file in `dir`, trying `glaukos.yml`
    /// then `glaukos.yaml`.
    pub fn discover(dir: &Path) -> Result<Self> {
        for name in [CONFIG_FILENAME, CONFIG_FILENAME_ALT] {
            let path = dir.join(name);
            if path.is_file() {
                let yaml = std::fs::read_to_string(&path)?;
                return Self::from_yaml(&yaml);
            }
        }
        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.environments.blue.address == self.environments.green.address {
            return Err(Error::InvalidConfig(format!(
                "blue and green environments share the address {}; the active \
                 color would be ambiguous",
                self.environments.blue.address
            )));
        }
        Ok(())
    }

    /// Container name for a color: `<service>-<color>`.
    pub fn container_name(&self, color: Color) -> String {
        format!("{}-{}", self.service, color)
    }

    /// The environment address for a color.
    pub fn address(&self, color: Color) -> &str {
        &self.environments.get(color).address
    }

    pub fn upstream_name(&self) -> String {
        self.proxy.upstream_name(&self.service)
    }

    /// A minimal valid config for tests.
    pub fn template() -> Self {
        Self::template_with_paths(
            PathBuf::from("/etc/nginx/conf.d/chat-upstream.conf"),
            None,
        )
    }

    /// Template with explicit proxy paths, for tests that need real files.
    pub fn template_with_paths(upstream_file: PathBuf, backup_dir: Option<PathBuf>) -> Self {
        Config {
            service: ServiceName::new("chat").expect("template service name is valid"),
            image: ImageRef::parse("ghcr.io/acme/chat:latest")
                .expect("template image ref is valid"),
            environments: Environments {
                blue: EnvironmentConfig {
                    address: "127.0.0.1:8001".to_string(),
                },
                green: EnvironmentConfig {
                    address: "127.0.0.1:8002".to_string(),
                },
            },
            proxy: ProxySettings {
                upstream_file,
                container: "edge-proxy".to_string(),
                backup_dir,
                upstream_name: None,
                reload_signal: "SIGHUP".to_string(),
            },
            health: HealthConfig::default(),
            smoke: SmokeConfig::default(),
            drain: DrainConfig::default(),
            runtime: RuntimeConfig::default(),
            env: HashMap::new(),
            labels: HashMap::new(),
        }
    }
}

fn deserialize_service_name<'de, D>(deserializer: D) -> std::result::Result<ServiceName, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ServiceName::new(&s).map_err(serde::de::Error::custom)
}

fn deserialize_image_ref<'de, D>(deserializer: D) -> std::result::Result<ImageRef, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    ImageRef::parse(&s).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
service: chat
image: ghcr.io/acme/chat:v3
environments:
  blue:
    address: 127.0.0.1:8001
  green:
    address: 127.0.0.1:8002
proxy:
  upstream_file: /etc/nginx/conf.d/chat-upstream.conf
  container: edge-proxy
"#;

    #[test]
    fn parses_minimal_config_with_defaults() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.service.as_str(), "chat");
        assert_eq!(config.address(Color::Blue), "127.0.0.1:8001");
        assert_eq!(config.address(Color::Green), "127.0.0.1:8002");
        assert_eq!(config.health.max_attempts, 10);
        assert_eq!(config.health.interval, std::time::Duration::from_secs(2));
        assert_eq!(config.smoke.handshake_attempts, 3);
        assert_eq!(config.drain.grace_period, std::time::Duration::from_secs(10));
        assert_eq!(config.upstream_name(), "chat_backend");
    }

    #[test]
    fn container_names_carry_the_color() {
        let config = Config::template();
        assert_eq!(config.container_name(Color::Blue), "chat-blue");
        assert_eq!(config.container_name(Color::Green), "chat-green");
    }

    #[test]
    fn rejects_identical_environment_addresses() {
        let yaml = MINIMAL.replace("127.0.0.1:8002", "127.0.0.1:8001");
        assert!(Config::from_yaml(&yaml).is_err());
    }

    #[test]
    fn backup_dir_defaults_next_to_upstream_file() {
        let config = Config::from_yaml(MINIMAL).unwrap();
        assert_eq!(
            config.proxy.backup_dir(),
            PathBuf::from("/etc/nginx/conf.d/backups")
        );
    }

    #[test]
    fn upstream_name_override_wins() {
        let yaml = format!("{MINIMAL}  upstream_name: chat_pool\n");
        let config = Config::from_yaml(&yaml).unwrap();
        assert_eq!(config.upstream_name(), "chat_pool");
    }
}
