use log::info;
use reqwest::Url;
use roster_states::State;
use serde::Deserialize;
use thiserror::Error;

/// Base URL used when nothing is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:4000";

/// Environment variables read by [`BusinessConfig::from_env`] carry this prefix.
pub const ENV_PREFIX: &str = "ROSTER_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration from environment: {0}")]
    Env(#[from] serde_env::Error),
    #[error("invalid API base URL `{url}`: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    api_base_url: Option<String>,
}

/// Where the user service lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessConfig {
    pub api_base_url: String,
}

impl State for BusinessConfig {}

impl BusinessConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into();
        Self {
            api_base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    /// Read `ROSTER_API_BASE_URL` from the process environment, falling back to
    /// [`DEFAULT_API_BASE_URL`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars())
    }

    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let scoped: Vec<(String, String)> = vars
            .into_iter()
            .filter_map(|(key, value)| {
                key.as_ref()
                    .strip_prefix(ENV_PREFIX)
                    .map(|key| (key.to_owned(), value.as_ref().to_owned()))
            })
            .collect();

        let raw: RawConfig = serde_env::from_iter(scoped)?;
        let config = match raw.api_base_url {
            Some(url) if !url.trim().is_empty() => {
                info!("BusinessConfig: using API base URL {url}");
                Self::new(url.trim())
            }
            _ => {
                info!("BusinessConfig: API base URL not set, defaulting to {DEFAULT_API_BASE_URL}");
                Self::default()
            }
        };
        config.base_url()?;
        Ok(config)
    }

    fn base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.api_base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            url: self.api_base_url.clone(),
            reason: err.to_string(),
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::InvalidBaseUrl {
                url: self.api_base_url.clone(),
                reason: "not a base URL".to_owned(),
            });
        }
        Ok(url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ConfigError> {
        let mut url = self.base_url()?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| ConfigError::InvalidBaseUrl {
                    url: self.api_base_url.clone(),
                    reason: "not a base URL".to_owned(),
                })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// `POST {base}/users/signup`
    pub fn signup_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&["users", "signup"])
    }

    /// `DELETE {base}/users/delete/{username}`, with the username percent-encoded as one
    /// segment.
    pub fn delete_url(&self, username: &str) -> Result<Url, ConfigError> {
        self.endpoint(&["users", "delete", username])
    }

    /// `GET {base}/users`
    pub fn users_url(&self) -> Result<Url, ConfigError> {
        self.endpoint(&["users"])
    }
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL)
    }
}
