use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Site URL looks like an http(s) URL
/// - TMDB API key is present
/// - Server port is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if !config.site.url.starts_with("http://") && !config.site.url.starts_with("https://") {
        return Err(ConfigError::ValidationError(format!(
            "site.url must be an http(s) URL, got {:?}",
            config.site.url
        )));
    }

    if config.site.archive_link_marker.is_empty() {
        return Err(ConfigError::ValidationError(
            "site.archive_link_marker cannot be empty".to_string(),
        ));
    }

    if config.tmdb.api_key.is_empty() {
        return Err(ConfigError::ValidationError(
            "tmdb.api_key cannot be empty".to_string(),
        ));
    }

    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::load_config_from_str;

    fn valid_toml() -> &'static str {
        r#"
[site]
url = "https://example.lk"

[tmdb]
api_key = "key"
"#
    }

    #[test]
    fn test_validate_valid_config() {
        let config = load_config_from_str(valid_toml()).unwrap();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_bad_site_url_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.site.url = "ftp://example.lk".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_api_key_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.tmdb.api_key = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_empty_marker_fails() {
        let mut config = load_config_from_str(valid_toml()).unwrap();
        config.site.archive_link_marker = String::new();
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
