use crate::config::types::{Config, CrawlerConfig, IndexBackend, IndexConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Upper bound for any single worker pool
const MAX_WORKERS: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_index_config(&config.index)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("fetch_workers", config.fetch_workers),
        ("extract_workers", config.extract_workers),
        ("clean_workers", config.clean_workers),
    ] {
        if value < 1 || value > MAX_WORKERS {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and {}, got {}",
                name, MAX_WORKERS, value
            )));
        }
    }

    for (name, value) in [
        ("queue_capacity", config.queue_capacity),
        ("max_frontier", config.max_frontier),
        ("max_visited", config.max_visited),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }

    for (name, value) in [
        ("progress_interval_ms", config.progress_interval_ms),
        ("stall_timeout_ms", config.stall_timeout_ms),
        ("drain_timeout_ms", config.drain_timeout_ms),
        ("request_timeout_secs", config.request_timeout_secs),
    ] {
        if value == 0 {
            return Err(ConfigError::Validation(format!("{} must be > 0", name)));
        }
    }

    if let Some(seed) = &config.seed {
        validate_seed(seed)?;
    }

    Ok(())
}

/// Validates a seed URL: absolute, http(s), with a host
pub fn validate_seed(seed: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(seed)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "Seed URL '{}' must use http or https",
            seed
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "Seed URL '{}' has no host",
            seed
        )));
    }

    Ok(url)
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    Ok(())
}

/// Validates index configuration
fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if config.backend == IndexBackend::Sqlite && config.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty for the sqlite backend".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_seed() {
        assert!(validate_seed("https://example.com/").is_ok());
        assert!(validate_seed("http://127.0.0.1:8080/top10/").is_ok());

        assert!(validate_seed("").is_err());
        assert!(validate_seed("/relative/path").is_err());
        assert!(validate_seed("ftp://example.com/").is_err());
        assert!(validate_seed("mailto:someone@example.com").is_err());
    }

    #[test]
    fn test_worker_bounds() {
        let mut config = Config::default();
        assert!(validate(&config).is_ok());

        config.crawler.clean_workers = 0;
        assert!(validate(&config).is_err());

        config.crawler.clean_workers = MAX_WORKERS + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let mut config = Config::default();
        config.crawler.stall_timeout_ms = 0;
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_crawler_name_charset() {
        let mut config = Config::default();
        config.user_agent.crawler_name = "bad name!".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_sqlite_requires_path() {
        let mut config = Config::default();
        config.index.backend = IndexBackend::Sqlite;
        config.index.database_path = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
