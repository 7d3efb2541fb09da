use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// PostgreSQL connection URL; the in-memory store is used when unset
    #[serde(default)]
    pub database_url: Option<String>,

    /// Redis connection URL; search results are not cached when unset
    #[serde(default)]
    pub redis_url: Option<String>,

    /// OMDb API key
    pub omdb_api_key: String,

    /// OMDb API base URL
    #[serde(default = "default_omdb_api_url")]
    pub omdb_api_url: String,

    /// YouTube Data API key
    pub youtube_api_key: String,

    /// YouTube Data API base URL
    #[serde(default = "default_youtube_api_url")]
    pub youtube_api_url: String,

    /// Directory uploaded avatars are written to
    #[serde(default = "default_media_root")]
    pub media_root: String,

    /// Public URL prefix the media directory is served under
    #[serde(default = "default_media_url_prefix")]
    pub media_url_prefix: String,

    /// Accounts signing up with one of these emails become administrators
    #[serde(default)]
    pub admin_emails: Vec<String>,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_omdb_api_url() -> String {
    "https://www.omdbapi.com".to_string()
}

fn default_youtube_api_url() -> String {
    "https://www.googleapis.com".to_string()
}

fn default_media_root() -> String {
    "./data/media".to_string()
}

fn default_media_url_prefix() -> String {
    "/media".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(std::env::vars())
    }

    /// Load configuration from an explicit set of key/value pairs
    pub fn from_vars<I>(vars: I) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = envy::from_iter::<_, Config>(vars)
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.admin_emails = config
            .admin_emails
            .iter()
            .map(|email| email.trim().to_lowercase())
            .filter(|email| !email.is_empty())
            .collect();
        Ok(config)
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_applied() {
        let config = Config::from_vars(vars(&[
            ("OMDB_API_KEY", "omdb"),
            ("YOUTUBE_API_KEY", "yt"),
        ]))
        .unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.redis_url, None);
        assert_eq!(config.omdb_api_url, "https://www.omdbapi.com");
        assert_eq!(config.media_url_prefix, "/media");
        assert!(config.admin_emails.is_empty());
        assert_eq!(config.bind_address(), "127.0.0.1:3000");
    }

    #[test]
    fn test_admin_emails_normalized() {
        let config = Config::from_vars(vars(&[
            ("OMDB_API_KEY", "omdb"),
            ("YOUTUBE_API_KEY", "yt"),
            ("ADMIN_EMAILS", " Root@CineCloud.app ,ops@cinecloud.app"),
        ]))
        .unwrap();

        assert_eq!(
            config.admin_emails,
            vec!["root@cinecloud.app", "ops@cinecloud.app"]
        );
    }

    #[test]
    fn test_missing_api_key_fails() {
        let result = Config::from_vars(vars(&[("OMDB_API_KEY", "omdb")]));
        assert!(result.is_err());
    }
}
