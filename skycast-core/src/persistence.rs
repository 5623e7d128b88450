//! Thin client for the optional persistence backend (accounts, favorite
//! locations, threshold alerts).
//!
//! The dashboard core never calls this; it exists for the surrounding UI,
//! which expects exactly these operations.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::Config;

const REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("persistence backend is not configured")]
    NotConfigured,

    #[error("persistence backend returned status {0}")]
    Backend(u16),

    #[error("persistence request failed: {0}")]
    Network(#[from] reqwest::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteLocation {
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub location: String,
    pub threshold_c: f64,
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// JSON client against the configured persistence base URL. All mutating
/// calls require a token obtained from [`PersistenceClient::login`].
#[derive(Debug, Clone)]
pub struct PersistenceClient {
    http: Client,
    base_url: Option<String>,
    api_key: Option<String>,
}

impl PersistenceClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            http,
            base_url: config.persistence.base_url.clone(),
            api_key: config.persistence.api_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<String, PersistenceError> {
        let base = self
            .base_url
            .as_deref()
            .ok_or(PersistenceError::NotConfigured)?;
        Ok(format!("{}/{}", base.trim_end_matches('/'), path))
    }

    fn request(
        &self,
        builder: reqwest::RequestBuilder,
        token: Option<&AuthToken>,
    ) -> reqwest::RequestBuilder {
        let builder = match &self.api_key {
            Some(key) => builder.header("x-api-key", key),
            None => builder,
        };
        match token {
            Some(t) => builder.bearer_auth(&t.token),
            None => builder,
        }
    }

    async fn check<T: serde::de::DeserializeOwned>(
        res: reqwest::Response,
    ) -> Result<T, PersistenceError> {
        let status = res.status();
        if !status.is_success() {
            return Err(PersistenceError::Backend(status.as_u16()));
        }
        Ok(res.json().await?)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthToken, PersistenceError> {
        let url = self.endpoint("auth/login")?;
        let res = self
            .request(self.http.post(&url), None)
            .json(&LoginRequest { email, password })
            .send()
            .await?;
        Self::check(res).await
    }

    pub async fn save_favorite(
        &self,
        token: &AuthToken,
        location: &str,
    ) -> Result<FavoriteLocation, PersistenceError> {
        let url = self.endpoint("favorites")?;
        let res = self
            .request(self.http.post(&url), Some(token))
            .json(&FavoriteLocation {
                location: location.to_string(),
            })
            .send()
            .await?;
        Self::check(res).await
    }

    pub async fn list_favorites(
        &self,
        token: &AuthToken,
    ) -> Result<Vec<FavoriteLocation>, PersistenceError> {
        let url = self.endpoint("favorites")?;
        let res = self.request(self.http.get(&url), Some(token)).send().await?;
        Self::check(res).await
    }

    pub async fn create_alert(
        &self,
        token: &AuthToken,
        alert: &WeatherAlert,
    ) -> Result<WeatherAlert, PersistenceError> {
        let url = self.endpoint("alerts")?;
        let res = self
            .request(self.http.post(&url), Some(token))
            .json(alert)
            .send()
            .await?;
        Self::check(res).await
    }

    pub async fn list_alerts(
        &self,
        token: &AuthToken,
    ) -> Result<Vec<WeatherAlert>, PersistenceError> {
        let url = self.endpoint("alerts")?;
        let res = self.request(self.http.get(&url), Some(token)).send().await?;
        Self::check(res).await
    }
}
