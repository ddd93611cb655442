use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub ai: AiConfig,
    pub cookie_secure: bool,
    /// Credentialed CORS origins; empty means the permissive layer.
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "serene".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "serene-users".into()),
            ttl_minutes: env_parse("SESSION_TTL_MINUTES").unwrap_or(60 * 24),
        };
        let ai = AiConfig {
            api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
            base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".into()),
            model: std::env::var("OPENAI_MODEL").unwrap_or_else(|_| "gpt-3.5-turbo".into()),
            timeout_secs: env_parse("AI_TIMEOUT_SECS").unwrap_or(8),
        };
        let cookie_secure = env_parse("COOKIE_SECURE").unwrap_or(true);
        let cors_origins = origins_or_default(std::env::var("CORS_ORIGINS").ok().as_deref());

        Ok(Self {
            database_url,
            jwt,
            ai,
            cookie_secure,
            cors_origins,
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse::<T>().ok())
}

const DEV_ORIGIN: &str = "http://localhost:3000";

fn origins_or_default(raw: Option<&str>) -> Vec<String> {
    match raw {
        Some(v) => parse_origins(v),
        None => vec![DEV_ORIGIN.to_string()],
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|o| !o.is_empty() && *o != "*")
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origins_are_trimmed_and_wildcard_dropped() {
        let got = parse_origins(" http://localhost:3000 , ,*,https://app.example.com");
        assert_eq!(got, vec!["http://localhost:3000", "https://app.example.com"]);
        assert!(parse_origins("*").is_empty());
    }

    #[test]
    fn unset_origins_default_to_dev_frontend() {
        assert_eq!(origins_or_default(None), vec!["http://localhost:3000"]);
        assert!(origins_or_default(Some("*")).is_empty());
        assert_eq!(origins_or_default(Some("https://a.test")), vec!["https://a.test"]);
    }

    #[test]
    fn unparsable_env_values_fall_back() {
        std::env::remove_var("SERENE_TEST_UNSET_SECS");
        std::env::set_var("SERENE_TEST_BAD_SECS", "eight");
        std::env::set_var("SERENE_TEST_GOOD_SECS", " 12 ");
        std::env::set_var("SERENE_TEST_BAD_FLAG", "yes");

        assert_eq!(env_parse::<u64>("SERENE_TEST_UNSET_SECS"), None);
        assert_eq!(env_parse::<u64>("SERENE_TEST_BAD_SECS").unwrap_or(8), 8);
        assert_eq!(env_parse::<u64>("SERENE_TEST_GOOD_SECS"), Some(12));
        assert!(env_parse::<bool>("SERENE_TEST_BAD_FLAG").unwrap_or(true));
    }
}
