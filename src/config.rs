use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),
}

/// Top-level configuration loaded from .pr-greeter.toml, then overridden by
/// environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub github: GitHubConfig,

    #[serde(default)]
    pub openai: OpenAiConfig,

    /// File holding the comment posted when generation fails
    #[serde(default = "default_fallback_path")]
    pub fallback_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            github: GitHubConfig::default(),
            openai: OpenAiConfig::default(),
            fallback_path: default_fallback_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_webhook_path")]
    pub webhook_path: String,

    /// Shared secret used to sign webhook deliveries
    pub webhook_secret: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            webhook_path: default_webhook_path(),
            webhook_secret: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubConfig {
    /// GitHub App id
    pub app_id: Option<u64>,
    /// PEM private key of the GitHub App
    pub private_key_path: Option<PathBuf>,
    /// Static token, used instead of App credentials when set
    pub token: Option<String>,
    /// GitHub Enterprise host, e.g. "github.example.com"
    pub enterprise_host: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_openai_base_url(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_port() -> u16 {
    3000
}

fn default_webhook_path() -> String {
    "/api/webhook".to_string()
}

fn default_fallback_path() -> PathBuf {
    PathBuf::from("fallback.md")
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

fn default_temperature() -> f32 {
    0.6
}

/// How the service authenticates against the GitHub API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubCredentials {
    Token(String),
    App { app_id: u64, private_key_path: PathBuf },
}

impl Config {
    /// Load configuration from `path` (or .pr-greeter.toml in the current
    /// directory), then apply environment overrides.
    /// A missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Config, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load_from(path)?,
            None => {
                let default_path = Path::new(".pr-greeter.toml");
                if default_path.exists() {
                    Self::load_from(default_path)?
                } else {
                    Config::default()
                }
            }
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load from a specific path (useful for testing).
    pub fn load_from(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Override settings with environment variables read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("APP_ID") {
            let app_id = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "APP_ID", value: value.clone() })?;
            self.github.app_id = Some(app_id);
        }
        if let Some(value) = lookup("PRIVATE_KEY_PATH") {
            self.github.private_key_path = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("GITHUB_TOKEN") {
            self.github.token = Some(value);
        }
        if let Some(value) = lookup("GHE_HOST") {
            self.github.enterprise_host = Some(value);
        }
        if let Some(value) = lookup("WEBHOOK_SECRET") {
            self.server.webhook_secret = Some(value);
        }
        if let Some(value) = lookup("WEBHOOK_PATH") {
            self.server.webhook_path = value;
            self.webhook_path()?;
        }
        if let Some(value) = lookup("PORT") {
            self.server.port = value
                .parse()
                .map_err(|_| ConfigError::InvalidEnv { key: "PORT", value: value.clone() })?;
        }
        if let Some(value) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = Some(value);
        }
        if let Some(value) = lookup("OPENAI_MODEL") {
            self.openai.model = value;
        }
        if let Some(value) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = value;
        }
        Ok(())
    }

    pub fn webhook_secret(&self) -> Result<&str, ConfigError> {
        self.server
            .webhook_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("WEBHOOK_SECRET"))
    }

    /// Route the webhook endpoint is mounted on; must be absolute.
    pub fn webhook_path(&self) -> Result<&str, ConfigError> {
        let path = self.server.webhook_path.as_str();
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidEnv {
                key: "WEBHOOK_PATH",
                value: path.to_string(),
            });
        }
        Ok(path)
    }

    pub fn openai_api_key(&self) -> Result<&str, ConfigError> {
        self.openai
            .api_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("OPENAI_API_KEY"))
    }

    /// Resolve GitHub credentials: a static token takes precedence over App
    /// credentials, which need both the app id and the key path.
    pub fn github_credentials(&self) -> Result<GitHubCredentials, ConfigError> {
        if let Some(token) = self.github.token.clone().filter(|t| !t.is_empty()) {
            return Ok(GitHubCredentials::Token(token));
        }
        match (self.github.app_id, self.github.private_key_path.clone()) {
            (Some(app_id), Some(private_key_path)) => Ok(GitHubCredentials::App {
                app_id,
                private_key_path,
            }),
            (Some(_), None) => Err(ConfigError::Missing("PRIVATE_KEY_PATH")),
            _ => Err(ConfigError::Missing("APP_ID or GITHUB_TOKEN")),
        }
    }

    /// REST API root, honoring a GitHub Enterprise host.
    pub fn github_api_url(&self) -> String {
        match self.github.enterprise_host.as_deref() {
            Some(host) if !host.is_empty() => {
                let host = host
                    .trim_start_matches("https://")
                    .trim_start_matches("http://")
                    .trim_end_matches('/');
                format!("https://{}/api/v3", host)
            }
            _ => "https://api.github.com".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.webhook_path, "/api/webhook");
        assert_eq!(config.openai.max_tokens, 300);
        assert!((config.openai.temperature - 0.6).abs() < f32::EPSILON);
        assert_eq!(config.fallback_path, PathBuf::from("fallback.md"));
        assert_eq!(config.github_api_url(), "https://api.github.com");
    }

    #[test]
    fn test_parse_config_toml() {
        let toml_str = r#"
fallback_path = "assets/fallback.md"

[server]
port = 8080
webhook_secret = "s3cret"

[github]
app_id = 1234
private_key_path = "key.pem"
enterprise_host = "github.example.com"

[openai]
model = "gpt-4o"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.webhook_path, "/api/webhook");
        assert_eq!(config.webhook_secret().unwrap(), "s3cret");
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.max_tokens, 300);
        assert_eq!(config.github_api_url(), "https://github.example.com/api/v3");
        assert_eq!(
            config.github_credentials().unwrap(),
            GitHubCredentials::App { app_id: 1234, private_key_path: PathBuf::from("key.pem") }
        );
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: Config = toml::from_str("[server]\nport = 8080\n").unwrap();
        config
            .apply_env(env(&[
                ("PORT", "9000"),
                ("WEBHOOK_SECRET", "from-env"),
                ("OPENAI_API_KEY", "sk-env"),
                ("GITHUB_TOKEN", "ghp_env"),
                ("WEBHOOK_PATH", "/hooks"),
            ]))
            .unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.webhook_path, "/hooks");
        assert_eq!(config.webhook_secret().unwrap(), "from-env");
        assert_eq!(config.openai_api_key().unwrap(), "sk-env");
        assert_eq!(config.github_credentials().unwrap(), GitHubCredentials::Token("ghp_env".to_string()));
    }

    #[test]
    fn test_invalid_env_values() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "PORT", .. }));

        let err = config.apply_env(env(&[("APP_ID", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "APP_ID", .. }));
    }

    #[test]
    fn test_invalid_webhook_path() {
        let mut config = Config::default();
        let err = config.apply_env(env(&[("WEBHOOK_PATH", "hooks")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "WEBHOOK_PATH", .. }));

        let mut config = Config::default();
        let err = config.apply_env(env(&[("WEBHOOK_PATH", "")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnv { key: "WEBHOOK_PATH", .. }));

        let config: Config = toml::from_str("[server]\nwebhook_path = \"hooks\"\n").unwrap();
        assert!(matches!(config.webhook_path(), Err(ConfigError::InvalidEnv { key: "WEBHOOK_PATH", .. })));

        assert_eq!(Config::default().webhook_path().unwrap(), "/api/webhook");
    }

    #[test]
    fn test_enterprise_host_with_scheme() {
        let mut config = Config::default();
        config.github.enterprise_host = Some("https://ghe.corp/".to_string());
        assert_eq!(config.github_api_url(), "https://ghe.corp/api/v3");

        config.github.enterprise_host = Some("http://ghe.corp".to_string());
        assert_eq!(config.github_api_url(), "https://ghe.corp/api/v3");
    }

    #[test]
    fn test_missing_required_settings() {
        let config = Config::default();
        assert!(matches!(config.webhook_secret(), Err(ConfigError::Missing("WEBHOOK_SECRET"))));
        assert!(matches!(config.openai_api_key(), Err(ConfigError::Missing("OPENAI_API_KEY"))));
        assert!(config.github_credentials().is_err());

        let mut config = Config::default();
        config.github.app_id = Some(1);
        assert!(matches!(config.github_credentials(), Err(ConfigError::Missing("PRIVATE_KEY_PATH"))));
    }
}
