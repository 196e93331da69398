use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::converter::ConverterConfig;
use crate::extractor::ExtractorConfig;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub extractor: ExtractorConfig,
    #[serde(default)]
    pub converter: ConverterConfig,
    #[serde(default)]
    pub delivery: DeliveryConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the landing page and its assets.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    3000
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Artifact storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory where transient artifacts are written.
    #[serde(default = "default_storage_dir")]
    pub dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_storage_dir(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("temp_downloads")
}

/// Delivery configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeliveryConfig {
    /// Wait between the end of a transfer and the deletion of the artifact.
    #[serde(default = "default_grace_delay_ms")]
    pub grace_delay_ms: u64,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            grace_delay_ms: default_grace_delay_ms(),
        }
    }
}

fn default_grace_delay_ms() -> u64 {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.storage.dir, PathBuf::from("temp_downloads"));
        assert_eq!(config.delivery.grace_delay_ms, 1000);
        assert_eq!(config.extractor.ytdlp_path, PathBuf::from("yt-dlp"));
        assert_eq!(config.converter.mp3_quality, 0);
    }

    #[test]
    fn test_deserialize_server_section() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000
public_dir = "/srv/www"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host.to_string(), "127.0.0.1");
        assert_eq!(config.server.public_dir, PathBuf::from("/srv/www"));
    }

    #[test]
    fn test_deserialize_tool_sections() {
        let toml = r#"
[storage]
dir = "/var/tmp/tubegrab"

[extractor]
ytdlp_path = "/opt/bin/yt-dlp"
timeout_secs = 120

[converter]
ffmpeg_path = "/opt/bin/ffmpeg"
mp3_quality = 2

[delivery]
grace_delay_ms = 250
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.storage.dir, PathBuf::from("/var/tmp/tubegrab"));
        assert_eq!(config.extractor.ytdlp_path, PathBuf::from("/opt/bin/yt-dlp"));
        assert_eq!(config.extractor.timeout_secs, 120);
        assert_eq!(config.converter.ffmpeg_path, PathBuf::from("/opt/bin/ffmpeg"));
        // Unset fields keep their defaults
        assert_eq!(config.converter.ffprobe_path, PathBuf::from("ffprobe"));
        assert_eq!(config.converter.mp3_quality, 2);
        assert_eq!(config.delivery.grace_delay_ms, 250);
    }
}
