//! Carrier strategy: every logistics operation has a live implementation that
//! calls the CDEK API and a demo implementation backed by static data. The
//! process picks one at startup.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::cache::token_cache::TokenCache;
use crate::config::carrier::OperatingMode;
use crate::config::types::ServiceConfig;
use crate::error::ApiError;
use crate::helpers::time::SystemClock;
use crate::upstream::client::CarrierClient;
use crate::upstream::exchange::OAuth2Exchange;

pub mod demo;
pub mod demo_data;
pub mod live;
pub mod model;

use demo::DemoCarrier;
use live::LiveCarrier;
use model::{
    AuthGrant, CallerToken, EstimateRequest, Listing, LocationPage, LocationSearch, OrderRequest,
    PickupPointFilter,
};

pub trait Carrier: Send + Sync {
    fn authenticate(
        &self,
        caller: &CallerToken,
    ) -> impl Future<Output = Result<AuthGrant, ApiError>> + Send;

    /// Locations whose name matches the search term; empty for short terms.
    fn search_locations(
        &self,
        query: &LocationSearch,
        caller: &CallerToken,
    ) -> impl Future<Output = Result<Listing, ApiError>> + Send;

    fn list_locations(
        &self,
        query: &LocationPage,
        caller: &CallerToken,
    ) -> impl Future<Output = Result<Listing, ApiError>> + Send;

    fn pickup_points(
        &self,
        filter: &PickupPointFilter,
        caller: &CallerToken,
    ) -> impl Future<Output = Result<Listing, ApiError>> + Send;

    fn estimate(
        &self,
        request: &EstimateRequest,
        caller: &CallerToken,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn create_order(
        &self,
        order: &OrderRequest,
        caller: &CallerToken,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;

    fn order_status(
        &self,
        id: &str,
        caller: &CallerToken,
    ) -> impl Future<Output = Result<Value, ApiError>> + Send;
}

pub enum CarrierKind {
    Demo(DemoCarrier),
    Live(LiveCarrier),
}

impl CarrierKind {
    pub fn mode(&self) -> OperatingMode {
        match self {
            CarrierKind::Demo(_) => OperatingMode::Demo,
            CarrierKind::Live(_) => OperatingMode::Live,
        }
    }
}

impl Carrier for CarrierKind {
    async fn authenticate(&self, caller: &CallerToken) -> Result<AuthGrant, ApiError> {
        match self {
            CarrierKind::Demo(c) => c.authenticate(caller).await,
            CarrierKind::Live(c) => c.authenticate(caller).await,
        }
    }

    async fn search_locations(&self, query: &LocationSearch, caller: &CallerToken) -> Result<Listing, ApiError> {
        match self {
            CarrierKind::Demo(c) => c.search_locations(query, caller).await,
            CarrierKind::Live(c) => c.search_locations(query, caller).await,
        }
    }

    async fn list_locations(&self, query: &LocationPage, caller: &CallerToken) -> Result<Listing, ApiError> {
        match self {
            CarrierKind::Demo(c) => c.list_locations(query, caller).await,
            CarrierKind::Live(c) => c.list_locations(query, caller).await,
        }
    }

    async fn pickup_points(&self, filter: &PickupPointFilter, caller: &CallerToken) -> Result<Listing, ApiError> {
        match self {
            CarrierKind::Demo(c) => c.pickup_points(filter, caller).await,
            CarrierKind::Live(c) => c.pickup_points(filter, caller).await,
        }
    }

    async fn estimate(&self, request: &EstimateRequest, caller: &CallerToken) -> Result<Value, ApiError> {
        match self {
            CarrierKind::Demo(c) => c.estimate(request, caller).await,
            CarrierKind::Live(c) => c.estimate(request, caller).await,
        }
    }

    async fn create_order(&self, order: &OrderRequest, caller: &CallerToken) -> Result<Value, ApiError> {
        match self {
            CarrierKind::Demo(c) => c.create_order(order, caller).await,
            CarrierKind::Live(c) => c.create_order(order, caller).await,
        }
    }

    async fn order_status(&self, id: &str, caller: &CallerToken) -> Result<Value, ApiError> {
        match self {
            CarrierKind::Demo(c) => c.order_status(id, caller).await,
            CarrierKind::Live(c) => c.order_status(id, caller).await,
        }
    }
}

/// Shared HTTP client for credential exchange and resource calls.
pub fn build_http_client(timeout_ms: u64) -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_millis(timeout_ms))
        .build()
        .map_err(|e| anyhow!("failed to build HTTP client: {}", e))
}

/// Select the carrier implementation for the whole process.
pub fn build_carrier(config: &ServiceConfig) -> Result<CarrierKind> {
    match config.carrier.operating_mode()? {
        OperatingMode::Demo => {
            info!("carrier credentials not configured, serving demo data");
            Ok(CarrierKind::Demo(DemoCarrier::new()))
        }
        OperatingMode::Live => {
            let (client_id, client_secret) = config
                .carrier
                .credentials()
                .ok_or_else(|| anyhow!("carrier credentials are missing"))?;
            let http = build_http_client(config.settings.upstream.timeout_ms)?;
            let exchange = OAuth2Exchange::new(
                http.clone(),
                &config.carrier.base_url,
                client_id.to_owned(),
                client_secret.to_owned(),
            );
            let tokens = TokenCache::new(exchange, SystemClock, config.settings.safety_margin_seconds);
            info!("carrier API configured at {}", config.carrier.base_url);
            Ok(CarrierKind::Live(LiveCarrier::new(
                CarrierClient::new(http, &config.carrier.base_url),
                Arc::new(tokens),
                config.carrier.forward_client_token,
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::carrier::CarrierMode;

    #[test]
    fn selects_mode_from_credentials() {
        let mut config = ServiceConfig::default();
        assert_eq!(build_carrier(&config).unwrap().mode(), OperatingMode::Demo);

        config.carrier.client_id = Some("id".into());
        config.carrier.client_secret = Some("secret".into());
        assert_eq!(build_carrier(&config).unwrap().mode(), OperatingMode::Live);

        config.carrier.mode = CarrierMode::Demo;
        assert_eq!(build_carrier(&config).unwrap().mode(), OperatingMode::Demo);

        config.carrier.mode = CarrierMode::Live;
        config.carrier.client_secret = None;
        assert!(build_carrier(&config).is_err());
    }
}
