use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::infra::{ArenaResponse, BoosterResponse, MoveRequest, PurchaseBoosterRequest};

const AUTH_HEADER: &str = "X-Auth-Token";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("arena response has no usable map size: {0:?}")]
    MissingMapSize(Vec<i32>),
}

/// Authenticated client for the arena server.
pub struct GameConnection {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl GameConnection {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    pub async fn arena(&self) -> Result<ArenaResponse, ApiError> {
        self.get("/arena").await
    }

    pub async fn boosters(&self) -> Result<BoosterResponse, ApiError> {
        self.get("/booster").await
    }

    pub async fn send_moves(&self, request: &MoveRequest) -> Result<(), ApiError> {
        self.post("/move", request).await
    }

    pub async fn purchase_booster(&self, booster_type: &str) -> Result<(), ApiError> {
        let request = PurchaseBoosterRequest {
            booster: booster_type.to_string(),
        };
        self.post("/booster", &request).await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &'static str) -> Result<T, ApiError> {
        debug!("GET {}", endpoint);
        let response = self
            .client
            .get(self.url(endpoint))
            .header(AUTH_HEADER, &self.token)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        let response = Self::check_status(endpoint, response).await?;
        response
            .json()
            .await
            .map_err(|source| ApiError::Decode { endpoint, source })
    }

    async fn post<B: Serialize>(&self, endpoint: &'static str, body: &B) -> Result<(), ApiError> {
        debug!("POST {}", endpoint);
        let response = self
            .client
            .post(self.url(endpoint))
            .header(AUTH_HEADER, &self.token)
            .json(body)
            .send()
            .await
            .map_err(|source| ApiError::Transport { endpoint, source })?;
        Self::check_status(endpoint, response).await?;
        Ok(())
    }

    async fn check_status(
        endpoint: &'static str,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "unable to read error body".to_owned());
        Err(ApiError::Status {
            endpoint,
            status,
            body,
        })
    }
}
