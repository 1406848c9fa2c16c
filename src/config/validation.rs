use crate::config::types::{Config, CrawlerConfig, OutputConfig, TargetConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_target_config(&config.target)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the crawl target
fn validate_target_config(config: &TargetConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.root_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "root_url '{}' must use http or https",
            config.root_url
        )));
    }

    if !config.page_url_template.contains("{n}") {
        return Err(ConfigError::Validation(format!(
            "page_url_template must contain '{{n}}', got '{}'",
            config.page_url_template
        )));
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.connect_timeout_secs < 1 || config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeouts must be >= 1s, got connect={}s request={}s",
            config.connect_timeout_secs, config.request_timeout_secs
        )));
    }

    if config.book_batch_size < 1 || config.book_batch_size > 500 {
        return Err(ConfigError::Validation(format!(
            "book_batch_size must be between 1 and 500, got {}",
            config.book_batch_size
        )));
    }

    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(
            "channel_capacity must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Checks the pieces that go into the User-Agent header
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    let name = config.crawler_name.as_str();
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return Err(ConfigError::Validation(format!(
            "crawler-name must be non-empty ASCII letters, digits or '-', got '{}'",
            name
        )));
    }

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler-version cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("contact-url: {}", e)))?;

    if !looks_like_email(&config.contact_email) {
        return Err(ConfigError::Validation(format!(
            "contact-email is not an address: '{}'",
            config.contact_email
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    validate_collection_name(&config.books_collection)?;
    validate_collection_name(&config.categories_collection)?;

    Ok(())
}

/// Checks a document collection name
///
/// Also used for collection names given on the command line.
pub(crate) fn validate_collection_name(name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Validation(
            "collection name cannot be empty".to_string(),
        ));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "collection name may only contain letters, digits, '_' and '-', got '{}'",
            name
        )));
    }

    Ok(())
}

/// `local@domain.tld`, nothing stricter
fn looks_like_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && domain.split('.').all(|part| !part.is_empty())
        }
        None => false,
    }
}
