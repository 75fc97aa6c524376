use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::config::GitHubCredentials;

/// Backdate `iat` to absorb clock drift between us and GitHub.
const JWT_BACKDATE_SECS: u64 = 60;
/// GitHub rejects app JWTs valid for longer than ten minutes.
const JWT_LIFETIME_SECS: u64 = 9 * 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to read GitHub App private key: {0}")]
    KeyRead(#[from] std::io::Error),

    #[error("Invalid GitHub App private key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),

    #[error("Failed to sign GitHub App JWT: {0}")]
    Sign(#[source] jsonwebtoken::errors::Error),

    #[error("Delivery carries no installation id; cannot authenticate as the App")]
    MissingInstallation,

    #[error("Installation token request failed: {0}")]
    TokenRequest(#[from] reqwest::Error),

    #[error("Installation token request returned HTTP {status}: {message}")]
    TokenRejected { status: u16, message: String },
}

/// Credentials ready for use: the private key is read and parsed at startup.
#[derive(Clone)]
pub enum GitHubAuth {
    Token(String),
    App { app_id: u64, key: EncodingKey },
}

impl std::fmt::Debug for GitHubAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GitHubAuth::Token(_) => write!(f, "GitHubAuth::Token(..)"),
            GitHubAuth::App { app_id, .. } => write!(f, "GitHubAuth::App {{ app_id: {} }}", app_id),
        }
    }
}

#[derive(Serialize)]
struct AppClaims {
    iat: u64,
    exp: u64,
    iss: String,
}

#[derive(Deserialize)]
struct InstallationToken {
    token: String,
}

impl GitHubAuth {
    pub fn from_credentials(credentials: &GitHubCredentials) -> Result<Self, AuthError> {
        match credentials {
            GitHubCredentials::Token(token) => Ok(GitHubAuth::Token(token.clone())),
            GitHubCredentials::App { app_id, private_key_path } => {
                let pem = fs::read(private_key_path)?;
                let key = EncodingKey::from_rsa_pem(&pem).map_err(AuthError::InvalidKey)?;
                Ok(GitHubAuth::App { app_id: *app_id, key })
            }
        }
    }

    /// Resolve a bearer token valid for the given installation.
    #[instrument(skip_all, fields(installation = ?installation_id))]
    pub async fn token_for(
        &self,
        client: &reqwest::Client,
        api_url: &str,
        installation_id: Option<u64>,
    ) -> Result<String, AuthError> {
        match self {
            GitHubAuth::Token(token) => Ok(token.clone()),
            GitHubAuth::App { app_id, key } => {
                let installation_id = installation_id.ok_or(AuthError::MissingInstallation)?;
                let jwt = app_jwt(*app_id, key, unix_now())?;

                debug!("exchanging app JWT for installation token");
                let response = client
                    .post(format!("{}/app/installations/{}/access_tokens", api_url, installation_id))
                    .header("User-Agent", super::USER_AGENT)
                    .header("Accept", "application/vnd.github+json")
                    .bearer_auth(jwt)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(AuthError::TokenRejected {
                        status: status.as_u16(),
                        message: super::error_message(&body),
                    });
                }
                Ok(response.json::<InstallationToken>().await?.token)
            }
        }
    }
}

fn app_jwt(app_id: u64, key: &EncodingKey, now: u64) -> Result<String, AuthError> {
    let claims = AppClaims {
        iat: now.saturating_sub(JWT_BACKDATE_SECS),
        exp: now + JWT_LIFETIME_SECS,
        iss: app_id.to_string(),
    };
    encode(&Header::new(Algorithm::RS256), &claims, key).map_err(AuthError::Sign)
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
