use crate::config::types::{CatalogConfig, Config, CrawlerConfig, MySqlConfig, OutputConfig};
use crate::crawler::CatalogSelectors;
use crate::sink::SinkFormat;
use crate::ConfigError;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_catalog_config(&config.catalog)?;
    validate_output_config(&config.output)?;
    if config.output.format == SinkFormat::Mysql {
        validate_mysql_config(&config.mysql)?;
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.listing_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "listing_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.detail_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "detail_timeout_secs must be >= 1".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the catalog layout and compiles every selector once
fn validate_catalog_config(config: &CatalogConfig) -> Result<(), ConfigError> {
    if config.index_filename.is_empty() || config.index_filename.contains('/') {
        return Err(ConfigError::Validation(format!(
            "index_filename must be a bare file name, got '{}'",
            config.index_filename
        )));
    }

    if config.page_template.matches("{}").count() != 1 || config.page_template.contains('/') {
        return Err(ConfigError::Validation(format!(
            "page_template must be a file name with exactly one '{{}}' placeholder, got '{}'",
            config.page_template
        )));
    }

    CatalogSelectors::from_config(config)?;

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.table.trim().is_empty() {
        return Err(ConfigError::Validation("table cannot be empty".to_string()));
    }

    if let Some(path) = &config.path {
        if path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("path cannot be empty".to_string()));
        }
    }

    Ok(())
}

/// Validates MySQL connection settings
fn validate_mysql_config(config: &MySqlConfig) -> Result<(), ConfigError> {
    if config.host.trim().is_empty() {
        return Err(ConfigError::Validation("mysql host cannot be empty".to_string()));
    }

    if config.port == 0 {
        return Err(ConfigError::Validation("mysql port must be >= 1".to_string()));
    }

    if config.database.trim().is_empty() {
        return Err(ConfigError::Validation(
            "mysql database cannot be empty".to_string(),
        ));
    }

    Ok(())
}
