use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;

/// Environment variable overriding `provider.access-token`
pub const ENV_ACCESS_TOKEN: &str = "WIKIMEDIA_ACCESS_TOKEN";
/// Environment variable overriding `provider.user-agent`
pub const ENV_USER_AGENT: &str = "WIKIMEDIA_USER_AGENT";
/// Environment variable overriding `provider.base-url`
pub const ENV_BASE_URL: &str = "WIKIMEDIA_BASE_URL";
/// Environment variable overriding `provider.requests-per-hour`
pub const ENV_REQUESTS_PER_HOUR: &str = "WIKIMEDIA_REQUESTS_PER_HOUR";

/// Loads and parses a configuration file from the given path
///
/// Values from the process environment (and a `.env` file, if one exists in
/// the working directory) override the provider section before validation.
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use article_ripple::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Max depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();

    let mut config = parse_config(path)?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;

    validate(&config)?;

    Ok(config)
}

/// Reads and deserializes the TOML file without validation or overrides
pub fn parse_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

/// Applies environment overrides using `lookup` to resolve variable names
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = &mut config.provider;

    if let Some(token) = lookup(ENV_ACCESS_TOKEN).filter(|t| !t.is_empty()) {
        provider.access_token = Some(token);
    }

    if let Some(user_agent) = lookup(ENV_USER_AGENT).filter(|u| !u.is_empty()) {
        provider.user_agent = user_agent;
    }

    if let Some(base_url) = lookup(ENV_BASE_URL).filter(|b| !b.is_empty()) {
        provider.base_url = base_url;
    }

    if let Some(raw) = lookup(ENV_REQUESTS_PER_HOUR) {
        provider.requests_per_hour = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
            name: ENV_REQUESTS_PER_HOUR,
            value: raw.clone(),
        })?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const VALID_CONFIG: &str = r#"
[crawler]
max-depth = 2
article-limit = 500
politeness-delay = 1500
keywords = ["neural", "machine learning"]

[provider]
base-url = "https://api.wikimedia.org/core/v1"
requests-per-hour = 5000
user-agent = "TestCrawler/1.0 (admin@example.com)"

[output]
data-dir = "./data"
checkpoint-path = "./checkpoint.json"
seed-path = "./seed.json"
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_valid_config() {
        let file = create_temp_config(VALID_CONFIG);
        let config = parse_config(file.path()).unwrap();

        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.crawler.article_limit, 500);
        assert_eq!(config.crawler.keywords.len(), 2);
        assert_eq!(config.crawler.progress_interval, 10);
        assert_eq!(config.provider.provider, "wikipedia");
        assert_eq!(config.provider.language, "en");
        assert_eq!(config.provider.max_retries, 3);
        assert_eq!(config.provider.backoff_base, 1000);
        assert!(config.provider.access_token.is_none());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_example_config_is_valid() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config.example.toml");
        let config = parse_config(&path).unwrap();

        validate(&config).unwrap();
        assert!(config.crawler.politeness_delay() > config.provider.rate_limit_delay());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = parse_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_env_overrides_provider_settings() {
        let file = create_temp_config(VALID_CONFIG);
        let mut config = parse_config(file.path()).unwrap();

        let env: HashMap<&str, &str> = [
            (ENV_ACCESS_TOKEN, "secret-token"),
            (ENV_USER_AGENT, "OverrideBot/2.0"),
            (ENV_REQUESTS_PER_HOUR, "3600"),
        ]
        .into_iter()
        .collect();

        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string())).unwrap();

        assert_eq!(config.provider.access_token.as_deref(), Some("secret-token"));
        assert_eq!(config.provider.user_agent, "OverrideBot/2.0");
        assert_eq!(config.provider.requests_per_hour, 3600);
        assert_eq!(config.provider.base_url, "https://api.wikimedia.org/core/v1");
    }

    #[test]
    fn test_env_override_rejects_bad_quota() {
        let file = create_temp_config(VALID_CONFIG);
        let mut config = parse_config(file.path()).unwrap();

        let result = apply_env_overrides(&mut config, |name| {
            (name == ENV_REQUESTS_PER_HOUR).then(|| "lots".to_string())
        });

        assert!(matches!(
            result,
            Err(ConfigError::InvalidEnv {
                name: ENV_REQUESTS_PER_HOUR,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let file = create_temp_config(VALID_CONFIG);
        let mut config = parse_config(file.path()).unwrap();

        apply_env_overrides(&mut config, |name| {
            (name != ENV_REQUESTS_PER_HOUR).then(String::new)
        })
        .unwrap();
        assert_eq!(config.provider.user_agent, "TestCrawler/1.0 (admin@example.com)");
        assert!(config.provider.access_token.is_none());
    }
}
