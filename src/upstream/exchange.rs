//! Client-credentials exchange against the carrier's OAuth2 token endpoint.

use std::future::Future;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AuthUnavailable;

pub const TOKEN_PATH: &str = "/v2/oauth/token";

/// Successful token endpoint response.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct TokenGrant {
    pub access_token: String,
    /// Nominal lifetime in seconds.
    pub expires_in: u64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

pub trait CredentialExchange: Send + Sync {
    fn exchange(&self) -> impl Future<Output = Result<TokenGrant, AuthUnavailable>> + Send;
}

#[derive(Debug, Clone)]
pub struct OAuth2Exchange {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl OAuth2Exchange {
    pub fn new(client: Client, base_url: &str, client_id: String, client_secret: String) -> Self {
        Self {
            client,
            token_url: format!("{}{}", base_url.trim_end_matches('/'), TOKEN_PATH),
            client_id,
            client_secret,
        }
    }
}

impl CredentialExchange for OAuth2Exchange {
    async fn exchange(&self) -> Result<TokenGrant, AuthUnavailable> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        debug!("requesting carrier token from {}", self.token_url);

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(AuthUnavailable::transport)?;

        let status = response.status();
        let body = response.text().await.map_err(AuthUnavailable::transport)?;
        if !status.is_success() {
            return Err(AuthUnavailable::rejected(status.as_u16(), body));
        }
        serde_json::from_str::<TokenGrant>(&body).map_err(AuthUnavailable::malformed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn exchange_for(server: &MockServer) -> OAuth2Exchange {
        OAuth2Exchange::new(Client::new(), &server.base_url(), "id-1".into(), "secret-1".into())
    }

    #[tokio::test]
    async fn posts_client_credentials_form() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(TOKEN_PATH)
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body_includes("grant_type=client_credentials")
                    .body_includes("client_id=id-1")
                    .body_includes("client_secret=secret-1");
                then.status(200).json_body(json!({
                    "access_token": "carrier-token",
                    "token_type": "bearer",
                    "expires_in": 3600,
                    "scope": "order:all payment:all",
                    "jti": "9adca50a"
                }));
            })
            .await;

        let grant = exchange_for(&server).exchange().await.unwrap();
        assert_eq!(grant.access_token, "carrier-token");
        assert_eq!(grant.expires_in, 3600);
        assert_eq!(grant.token_type.as_deref(), Some("bearer"));
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn rejection_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(400).json_body(json!({"error": "invalid_client"}));
            })
            .await;

        let err = exchange_for(&server).exchange().await.unwrap_err();
        assert_eq!(err.status, Some(400));
        assert!(err.body.unwrap().contains("invalid_client"));
    }

    #[tokio::test]
    async fn malformed_body_is_reported_without_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(TOKEN_PATH);
                then.status(200).body("not json");
            })
            .await;

        let err = exchange_for(&server).exchange().await.unwrap_err();
        assert_eq!(err.status, None);
        assert!(err.reason.contains("malformed"));
    }
}
