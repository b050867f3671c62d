//! Thin JSON client for the carrier's resource endpoints.

use anyhow::anyhow;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::helpers::time::get_instant;
use crate::observability::metrics::get_metrics;

static ERROR_MSG: &str = "error";
static STATUS_MSG: &str = "status";

pub const NO_QUERY: &[(&str, &str)] = &[];

#[derive(Debug, Clone)]
pub struct CarrierClient {
    http: Client,
    base_url: String,
}

impl CarrierClient {
    pub fn new(http: Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_json<Q: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        path: &str,
        query: &Q,
        token: &str,
    ) -> Result<Value, ApiError> {
        let request = self.request(Method::GET, path, token).query(query);
        self.send(endpoint, Method::GET, request).await
    }

    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &'static str,
        path: &str,
        body: &B,
        token: &str,
    ) -> Result<Value, ApiError> {
        let request = self.request(Method::POST, path, token).json(body);
        self.send(endpoint, Method::POST, request).await
    }

    fn request(&self, method: Method, path: &str, token: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(token)
    }

    async fn send(
        &self,
        endpoint: &'static str,
        method: Method,
        request: RequestBuilder,
    ) -> Result<Value, ApiError> {
        let metrics = get_metrics().await;
        let start = get_instant();
        metrics
            .upstream_requests
            .with_label_values(&[endpoint, method.as_str()])
            .inc();

        let result: Result<Value, ApiError> = async {
            let response = request
                .send()
                .await
                .map_err(|e| anyhow!("carrier request '{}' failed: {}", endpoint, e))?;
            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| anyhow!("carrier response '{}' unreadable: {}", endpoint, e))?;
            debug!("carrier '{}' responded with {}", endpoint, status);

            if status == StatusCode::NOT_FOUND {
                return Err(ApiError::NotFound(format!("{} resource not found", endpoint)));
            }
            if !status.is_success() {
                return Err(ApiError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }
            serde_json::from_str::<Value>(&body)
                .map_err(|e| ApiError::from(anyhow!("carrier response '{}' is not JSON: {}", endpoint, e)))
        }
        .await;

        metrics
            .upstream_duration
            .with_label_values(&[endpoint])
            .observe(start.elapsed().as_secs_f64());
        if let Err(err) = &result {
            let reason = match err {
                ApiError::Upstream { .. } | ApiError::NotFound(_) => STATUS_MSG,
                _ => ERROR_MSG,
            };
            metrics
                .upstream_failures
                .with_label_values(&[endpoint, reason])
                .inc();
            warn!("carrier '{}' call failed: {}", endpoint, err);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn attaches_bearer_and_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v2/location/cities")
                    .query_param("city", "Казань")
                    .header("authorization", "Bearer abc");
                then.status(200).json_body(json!([{"code": 151}]));
            })
            .await;

        let client = CarrierClient::new(Client::new(), &format!("{}/", server.base_url()));
        let value = client
            .get_json("cities", "/v2/location/cities", &[("city", "Казань")], "abc")
            .await
            .unwrap();
        assert_eq!(value, json!([{"code": 151}]));
        mock.assert_calls_async(1).await;
    }

    #[tokio::test]
    async fn maps_statuses_to_errors() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v2/orders/missing");
                then.status(404);
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/v2/orders");
                then.status(400).json_body(json!({"requests": [{"state": "INVALID"}]}));
            })
            .await;

        let client = CarrierClient::new(Client::new(), &server.base_url());
        let err = client
            .get_json("order_status", "/v2/orders/missing", NO_QUERY, "t")
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = client
            .post_json("orders", "/v2/orders", &json!({}), "t")
            .await
            .unwrap_err();
        match err {
            ApiError::Upstream { status, body } => {
                assert_eq!(status, 400);
                assert!(body.contains("INVALID"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }
}
