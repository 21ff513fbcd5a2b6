//! Environment-driven configuration. A `.env` file is honored when
//! present; unrecognized variables are ignored.

use undertow_search::ProviderKeys;

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    env_var(key).unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env_var(key)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on in-flight `/websearch` requests.
    pub semaphore_limit: usize,
    pub log_dir: Option<String>,

    /// Search backend name (`serper`, `serpapi`, `brave`, `duckduckgo`).
    pub search_engine: String,
    pub provider_keys: ProviderKeys,

    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,

    pub database_url: Option<String>,

    pub query_model: String,
    pub outline_model: String,
    pub answer_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 9004,
            semaphore_limit: 300,
            log_dir: None,
            search_engine: "serper".to_string(),
            provider_keys: ProviderKeys::default(),
            openai_api_key: None,
            openai_base_url: None,
            database_url: None,
            query_model: "gpt-4.1-nano-2025-04-14".to_string(),
            outline_model: "gpt-4.1-nano-2025-04-14".to_string(),
            answer_model: "gpt-4.1-mini-2025-04-14".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: env_or("APP_HOST", &defaults.host),
            port: env_parse("APP_PORT", defaults.port),
            semaphore_limit: env_parse("SEMAPHORE_LIMIT", defaults.semaphore_limit),
            log_dir: env_var("LOG_DIR"),
            search_engine: env_or("SEARCH_ENGINE", &defaults.search_engine),
            provider_keys: ProviderKeys {
                serper: env_var("SERPER_API_KEY"),
                serpapi: env_var("SERPAPI_API_KEY").or_else(|| env_var("SERP_API_KEY")),
                brave: env_var("BRAVE_API_KEY"),
            },
            openai_api_key: env_var("OPENAI_API_KEY"),
            openai_base_url: env_var("OPENAI_BASE_URL"),
            database_url: env_var("DATABASE_URL"),
            query_model: env_or("QUERY_MODEL", &defaults.query_model),
            outline_model: env_or("OUTLINE_MODEL", &defaults.outline_model),
            answer_model: env_or("ANSWER_MODEL", &defaults.answer_model),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_service_contract() {
        let config = AppConfig::default();
        assert_eq!(config.port, 9004);
        assert_eq!(config.semaphore_limit, 300);
        assert_eq!(config.search_engine, "serper");
        assert!(config.database_url.is_none());
    }
}
