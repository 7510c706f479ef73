use crate::config::types::{Config, CrawlerConfig, FeedConfig, SourceConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_source_config(&config.source)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_feed_config(&config.feed)?;
    Ok(())
}

/// Validates guide site configuration
fn validate_source_config(config: &SourceConfig) -> Result<(), ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if base.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url must be an absolute HTTP(S) URL, got '{}'",
            config.base_url
        )));
    }

    if config.chart_paths.is_empty() {
        return Err(ConfigError::Validation(
            "chart-paths must contain at least one chart page path".to_string(),
        ));
    }

    for path in &config.chart_paths {
        if !path.starts_with('/') {
            return Err(ConfigError::Validation(format!(
                "chart path must start with '/', got '{}'",
                path
            )));
        }
    }

    if config.utc_offset_hours < -12 || config.utc_offset_hours > 14 {
        return Err(ConfigError::Validation(format!(
            "utc-offset-hours must be between -12 and 14, got {}",
            config.utc_offset_hours
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.window_count < 1 {
        return Err(ConfigError::Validation(format!(
            "window-count must be >= 1, got {}",
            config.window_count
        )));
    }

    if config.window_hours < 1 {
        return Err(ConfigError::Validation(format!(
            "window-hours must be >= 1, got {}",
            config.window_hours
        )));
    }

    if config.queue_capacity < 1 {
        return Err(ConfigError::Validation(format!(
            "queue-capacity must be >= 1, got {}",
            config.queue_capacity
        )));
    }

    if config.max_chart_failures < 1 {
        return Err(ConfigError::Validation(format!(
            "max-chart-failures must be >= 1, got {}",
            config.max_chart_failures
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact-url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

/// Validates feed output configuration
fn validate_feed_config(config: &FeedConfig) -> Result<(), ConfigError> {
    if config.path.is_empty() {
        return Err(ConfigError::Validation(
            "feed path cannot be empty".to_string(),
        ));
    }

    if config.title.is_empty() {
        return Err(ConfigError::Validation(
            "feed title cannot be empty".to_string(),
        ));
    }

    if config.max_items == Some(0) {
        return Err(ConfigError::Validation(
            "max-items must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Basic email validation: one '@' with non-empty local and domain parts
fn validate_email(email: &str) -> Result<(), ConfigError> {
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "contact-email '{}' is not a valid email address",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            source: SourceConfig {
                base_url: "http://tv.example.jp".to_string(),
                chart_paths: vec!["/chart/23.action".to_string()],
                utc_offset_hours: 9,
            },
            crawler: CrawlerConfig {
                window_count: 33,
                window_hours: 5,
                chart_interval_ms: 3000,
                detail_interval_ms: 3000,
                request_timeout_secs: 30,
                queue_capacity: 100,
                max_chart_failures: 3,
            },
            user_agent: UserAgentConfig {
                crawler_name: "guidefeed".to_string(),
                crawler_version: "1.0".to_string(),
                contact_url: "https://example.com/about".to_string(),
                contact_email: "admin@example.com".to_string(),
            },
            feed: FeedConfig {
                path: "./feed.atom".to_string(),
                title: "TV Guide".to_string(),
                description: String::new(),
                max_items: None,
            },
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&test_config()).is_ok());
    }

    #[test]
    fn test_invalid_base_url() {
        let mut config = test_config();
        config.source.base_url = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));
    }

    #[test]
    fn test_empty_chart_paths() {
        let mut config = test_config();
        config.source.chart_paths.clear();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_chart_path_without_leading_slash() {
        let mut config = test_config();
        config.source.chart_paths = vec!["chart/23.action".to_string()];
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_utc_offset_out_of_range() {
        let mut config = test_config();
        config.source.utc_offset_hours = 15;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_window_count() {
        let mut config = test_config();
        config.crawler.window_count = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_queue_capacity() {
        let mut config = test_config();
        config.crawler.queue_capacity = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_chart_failures() {
        let mut config = test_config();
        config.crawler.max_chart_failures = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_invalid_email() {
        let mut config = test_config();
        config.user_agent.contact_email = "not-an-email".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_feed_title() {
        let mut config = test_config();
        config.feed.title = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_max_items() {
        let mut config = test_config();
        config.feed.max_items = Some(0);
        assert!(validate(&config).is_err());
    }
}
