use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::cache::token_cache::TokenCache;
use crate::carrier::demo_data::CURRENCY;
use crate::carrier::model::{
    order_id, AuthGrant, CallerToken, EstimateRequest, Listing, LocationPage, LocationRef,
    LocationSearch, OrderRequest, PackageDescriptor, PickupPointFilter,
};
use crate::carrier::Carrier;
use crate::error::ApiError;
use crate::upstream::client::{CarrierClient, NO_QUERY};
use crate::utils::constants::{DEFAULT_ORIGIN_CODE, DEMO_TOKEN_PREFIX};

const CITIES_PATH: &str = "/v2/location/cities";
const DELIVERY_POINTS_PATH: &str = "/v2/deliverypoints";
const TARIFF_LIST_PATH: &str = "/v2/calculator/tarifflist";
const ORDERS_PATH: &str = "/v2/orders";

/// Calls the CDEK API with a cached server credential.
pub struct LiveCarrier {
    client: CarrierClient,
    tokens: Arc<TokenCache>,
    forward_client_token: bool,
}

#[derive(Debug, Serialize)]
struct TariffListBody<'a> {
    from_location: LocationRef,
    to_location: &'a LocationRef,
    packages: &'a [PackageDescriptor],
    services: Vec<Value>,
}

impl LiveCarrier {
    pub fn new(client: CarrierClient, tokens: Arc<TokenCache>, forward_client_token: bool) -> Self {
        Self {
            client,
            tokens,
            forward_client_token,
        }
    }

    /// Bearer for the outbound call: the caller's own token when forwarding is
    /// enabled, the cached server credential otherwise.
    async fn bearer(&self, caller: &CallerToken) -> Result<String, ApiError> {
        if self.forward_client_token {
            if let Some(token) = caller.0.as_deref().filter(|t| !t.starts_with(DEMO_TOKEN_PREFIX)) {
                debug!("forwarding caller token to carrier");
                return Ok(token.to_owned());
            }
        }
        Ok(self.tokens.acquire().await?.value)
    }
}

/// Wrap an upstream array as `{data, meta: {total}}`.
pub fn into_listing(value: Value) -> Listing {
    match value {
        Value::Array(items) => Listing::of(items),
        Value::Null => Listing::empty(),
        other => Listing::of(vec![other]),
    }
}

/// Add `total_sum` (requested tariff, else the cheapest) and `currency` to a
/// tariff list response when the carrier did not supply them.
pub fn with_totals(mut response: Value, tariff_code: Option<u32>) -> Value {
    let Some(object) = response.as_object_mut() else {
        return response;
    };
    if !object.contains_key("total_sum") {
        let tariffs = object
            .get("tariff_codes")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let requested = tariff_code.and_then(|code| {
            tariffs
                .iter()
                .find(|t| t.get("tariff_code").and_then(Value::as_u64) == Some(u64::from(code)))
        });
        let chosen = requested.or_else(|| {
            tariffs
                .iter()
                .filter(|t| t.get("delivery_sum").and_then(Value::as_f64).is_some())
                .min_by(|a, b| {
                    let a = a["delivery_sum"].as_f64().unwrap_or(f64::MAX);
                    let b = b["delivery_sum"].as_f64().unwrap_or(f64::MAX);
                    a.total_cmp(&b)
                })
        });
        if let Some(sum) = chosen.and_then(|t| t.get("delivery_sum")).cloned() {
            object.insert("total_sum".to_owned(), sum);
        }
    }
    object
        .entry("currency")
        .or_insert_with(|| Value::String(CURRENCY.to_owned()));
    response
}

/// Surface the latest status code as `entity.status` when absent.
fn with_current_status(mut response: Value) -> Value {
    if let Some(entity) = response.get_mut("entity").and_then(Value::as_object_mut) {
        if !entity.contains_key("status") {
            let latest = entity
                .get("statuses")
                .and_then(Value::as_array)
                .and_then(|statuses| statuses.first())
                .and_then(|status| status.get("code"))
                .cloned();
            if let Some(code) = latest {
                entity.insert("status".to_owned(), code);
            }
        }
    }
    response
}

impl Carrier for LiveCarrier {
    async fn authenticate(&self, _caller: &CallerToken) -> Result<AuthGrant, ApiError> {
        // rejections are returned as the token endpoint sent them
        let token = self.tokens.acquire().await.map_err(|err| match err.status {
            Some(status) => ApiError::Upstream {
                status,
                body: err.body.unwrap_or_default(),
            },
            None => ApiError::AuthUnavailable(err),
        })?;
        Ok(AuthGrant {
            expires_in: token.remaining_seconds(self.tokens.now()),
            access_token: token.value,
            token_type: "bearer".to_owned(),
        })
    }

    async fn search_locations(&self, query: &LocationSearch, caller: &CallerToken) -> Result<Listing, ApiError> {
        let Some(term) = query.term() else {
            return Ok(Listing::empty());
        };
        let token = self.bearer(caller).await?;
        let size = query.size().to_string();
        let params = [
            ("city", term),
            ("country_codes", query.country()),
            ("size", size.as_str()),
        ];
        let value = self.client.get_json("cities", CITIES_PATH, &params, &token).await?;
        Ok(into_listing(value))
    }

    async fn list_locations(&self, query: &LocationPage, caller: &CallerToken) -> Result<Listing, ApiError> {
        let token = self.bearer(caller).await?;
        let size = query.size().to_string();
        // CDEK pages are 0-based
        let page = (query.page() - 1).to_string();
        let region = query.region_code.map(|code| code.to_string());
        let mut params = vec![
            ("country_codes", query.country()),
            ("size", size.as_str()),
            ("page", page.as_str()),
        ];
        if let Some(region) = region.as_deref() {
            params.push(("region_code", region));
        }
        let value = self.client.get_json("cities", CITIES_PATH, &params, &token).await?;
        let mut listing = into_listing(value);
        listing.meta.page = Some(query.page());
        listing.meta.size = Some(query.size());
        Ok(listing)
    }

    async fn pickup_points(&self, filter: &PickupPointFilter, caller: &CallerToken) -> Result<Listing, ApiError> {
        let token = self.bearer(caller).await?;
        let city_code = filter.location_code.to_string();
        let have_cashless = filter.have_cashless.to_string();
        let params = [
            ("city_code", city_code.as_str()),
            ("type", filter.point_type.as_str()),
            ("have_cashless", have_cashless.as_str()),
        ];
        let value = self
            .client
            .get_json("deliverypoints", DELIVERY_POINTS_PATH, &params, &token)
            .await?;
        Ok(into_listing(value))
    }

    async fn estimate(&self, request: &EstimateRequest, caller: &CallerToken) -> Result<Value, ApiError> {
        let to_location = request
            .to_location
            .as_ref()
            .ok_or_else(|| ApiError::missing_fields(vec!["to_location".to_owned()]))?;
        let body = TariffListBody {
            from_location: request
                .from_location
                .clone()
                .filter(|location| location.code.is_some())
                .unwrap_or_else(|| LocationRef::with_code(DEFAULT_ORIGIN_CODE)),
            to_location,
            packages: request.packages.as_deref().unwrap_or_default(),
            services: Vec::new(),
        };
        let token = self.bearer(caller).await?;
        let value = self
            .client
            .post_json("tarifflist", TARIFF_LIST_PATH, &body, &token)
            .await?;
        Ok(with_totals(value, request.tariff_code))
    }

    async fn create_order(&self, order: &OrderRequest, caller: &CallerToken) -> Result<Value, ApiError> {
        let token = self.bearer(caller).await?;
        self.client
            .post_json("orders", ORDERS_PATH, &order.payload, &token)
            .await
    }

    async fn order_status(&self, id: &str, caller: &CallerToken) -> Result<Value, ApiError> {
        let id = order_id(id)?;
        let token = self.bearer(caller).await?;
        let path = format!("{}/{}", ORDERS_PATH, id);
        let value = self.client.get_json("order", &path, NO_QUERY, &token).await?;
        Ok(with_current_status(value))
    }
}
