use super::{types::Config, ConfigError};

/// Highest VBR quality index accepted by libmp3lame (`-q:a`).
const MAX_MP3_QUALITY: u8 = 9;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Tool paths are not empty
/// - Tool timeouts are positive
/// - MP3 VBR quality is within libmp3lame's range
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.extractor.ytdlp_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "extractor.ytdlp_path cannot be empty".to_string(),
        ));
    }

    if config.converter.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "converter.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.extractor.timeout_secs == 0 || config.converter.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "tool timeouts must be greater than 0".to_string(),
        ));
    }

    if config.converter.mp3_quality > MAX_MP3_QUALITY {
        return Err(ConfigError::ValidationError(format!(
            "converter.mp3_quality must be between 0 and {}",
            MAX_MP3_QUALITY
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_empty_ytdlp_path_fails() {
        let mut config = Config::default();
        config.extractor.ytdlp_path = PathBuf::new();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_zero_timeout_fails() {
        let mut config = Config::default();
        config.converter.timeout_secs = 0;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_validate_mp3_quality_out_of_range() {
        let mut config = Config::default();
        config.converter.mp3_quality = 10;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("mp3_quality"));
    }
}
