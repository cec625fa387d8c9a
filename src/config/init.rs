// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates glaukos.yml template files.

use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{ImageRef, ServiceName};

use super::CONFIG_FILENAME;

pub fn init_config(
    dir: &Path,
    service: Option<&str>,
    image: Option<&str>,
    force: bool,
) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let service = match service {
        Some(s) => ServiceName::new(s).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        None => ServiceName::new("chat").expect("default service name is valid"),
    };
    let image = match image {
        Some(i) => ImageRef::parse(i).map_err(|e| Error::InvalidConfig(e.to_string()))?,
        None => ImageRef::parse("ghcr.io/acme/chat:latest").expect("default image is valid"),
    };

    std::fs::write(&config_path, generate_template_yaml(&service, &image))?;

    Ok(())
}

fn generate_template_yaml(service: &ServiceName, image: &ImageRef) -> String {
    format!(
        r#"service: {service}
image: {image}
environments:
  blue:
    address: 127.0.0.1:8001
  green:
    address: 127.0.0.1:8002
proxy:
  # Upstream include file owned by glaukos; the reverse proxy must
  # include it from its main configuration.
  upstream_file: /etc/nginx/conf.d/{service}-upstream.conf
  container: edge-proxy
  # backup_dir: /etc/nginx/conf.d/backups
  # upstream_name: {service}_backend
# health:
#   path: /healthz
#   interval: 2s
#   max_attempts: 10
# drain:
#   grace_period: 10s
#   drain_timeout: 30s
"#
    )
}
