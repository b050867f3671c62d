use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde_json::{json, Value};
use tracing::debug;

use crate::carrier::demo_data::{self, CITIES, PICKUP_POINTS};
use crate::carrier::model::{
    AuthGrant, CallerToken, EstimateRequest, Listing, ListingMeta, LocationPage, LocationSearch,
    OrderRequest, PickupPointFilter,
};
use crate::carrier::Carrier;
use crate::error::ApiError;
use crate::helpers::time::now_millis;
use crate::utils::constants::{
    DEFAULT_ORIGIN_CODE, DEFAULT_TARIFF_CODE, DEMO_TOKEN_LIFETIME_SECS, DEMO_TOKEN_PREFIX,
};

/// Serves the static tables; lookups are deterministic and nothing leaves the process.
#[derive(Debug, Default)]
pub struct DemoCarrier {
    sequence: AtomicU64,
}

impl DemoCarrier {
    pub fn new() -> Self {
        Self::default()
    }

    fn serves_country(country: &str) -> bool {
        country.eq_ignore_ascii_case(demo_data::COUNTRY_CODE)
    }

    fn created_status() -> Value {
        json!({
            "code": demo_data::STATUS_CREATED,
            "name": demo_data::STATUS_CREATED_NAME,
            "date_time": Utc::now().to_rfc3339(),
        })
    }
}

fn to_values<T: serde::Serialize>(records: impl Iterator<Item = T>) -> Result<Vec<Value>, ApiError> {
    records
        .map(|record| serde_json::to_value(record).map_err(|e| ApiError::from(anyhow::Error::from(e))))
        .collect()
}

impl Carrier for DemoCarrier {
    async fn authenticate(&self, _caller: &CallerToken) -> Result<AuthGrant, ApiError> {
        Ok(AuthGrant {
            access_token: format!("{}{}", DEMO_TOKEN_PREFIX, now_millis()),
            token_type: "bearer".to_owned(),
            expires_in: DEMO_TOKEN_LIFETIME_SECS,
        })
    }

    async fn search_locations(&self, query: &LocationSearch, _caller: &CallerToken) -> Result<Listing, ApiError> {
        let Some(term) = query.term() else {
            return Ok(Listing::empty());
        };
        if !Self::serves_country(query.country()) {
            return Ok(Listing::empty());
        }
        let needle = term.to_lowercase();
        let matches = CITIES
            .iter()
            .filter(|city| city.matches(&needle))
            .take(query.size())
            .map(|city| city.record());
        Ok(Listing::of(to_values(matches)?))
    }

    async fn list_locations(&self, query: &LocationPage, _caller: &CallerToken) -> Result<Listing, ApiError> {
        let (page, size) = (query.page(), query.size());
        // the static table carries no region codes, so region_code is not applied
        let cities = if Self::serves_country(query.country()) {
            demo_data::listed_cities()
        } else {
            Vec::new()
        };
        let data = to_values(
            cities
                .iter()
                .skip((page - 1).saturating_mul(size))
                .take(size)
                .map(|city| city.record()),
        )?;
        Ok(Listing {
            data,
            meta: ListingMeta {
                total: cities.len(),
                page: Some(page),
                size: Some(size),
                pages: Some(cities.len().div_ceil(size)),
            },
        })
    }

    async fn pickup_points(&self, filter: &PickupPointFilter, _caller: &CallerToken) -> Result<Listing, ApiError> {
        let known: Vec<_> = PICKUP_POINTS
            .iter()
            .filter(|point| point.city_code == filter.location_code)
            .collect();
        let records = if known.is_empty() {
            vec![demo_data::fallback_pickup_point(filter.location_code)]
        } else {
            known.iter().map(|point| point.record()).collect()
        };
        let wanted = filter.point_type.to_uppercase();
        let records = records
            .into_iter()
            .filter(|record| wanted == "ALL" || wanted == record.point_type);
        Ok(Listing::of(to_values(records)?))
    }

    async fn estimate(&self, request: &EstimateRequest, _caller: &CallerToken) -> Result<Value, ApiError> {
        let to_moscow = request.destination_code() == Some(DEFAULT_ORIGIN_CODE);
        let total = demo_data::BASE_COST + if to_moscow { 0 } else { demo_data::DISTANCE_SURCHARGE };
        debug!("demo estimate to {:?}: {}", request.destination_code(), total);
        Ok(json!({
            "tariff_codes": [{
                "tariff_code": demo_data::TARIFF_CODE,
                "tariff_name": demo_data::TARIFF_NAME,
                "tariff_description": demo_data::TARIFF_DESCRIPTION,
                "delivery_mode": demo_data::DELIVERY_MODE,
                "delivery_sum": total,
                "period_min": demo_data::PERIOD_MIN_DAYS,
                "period_max": demo_data::PERIOD_MAX_DAYS,
                "services": [],
            }],
            "total_sum": total,
            "currency": demo_data::CURRENCY,
        }))
    }

    async fn create_order(&self, order: &OrderRequest, _caller: &CallerToken) -> Result<Value, ApiError> {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let millis = now_millis();
        let uuid = format!("demo-uuid-{}-{}", millis, seq);
        debug!("demo order created: {}", uuid);
        Ok(json!({
            "entity": {
                "uuid": uuid,
                "cdek_number": format!("CDEK{:08}", millis.rem_euclid(100_000_000)),
                "number": order.draft.number,
                "tariff_code": order.draft.tariff_code.unwrap_or(DEFAULT_TARIFF_CODE),
                "statuses": [Self::created_status()],
            },
            "requests": [{
                "request_uuid": format!("req-{}-{}", millis, seq),
                "type": "CREATE",
                "state": "SUCCESSFUL",
                "date_time": Utc::now().to_rfc3339(),
            }],
        }))
    }

    async fn order_status(&self, id: &str, _caller: &CallerToken) -> Result<Value, ApiError> {
        Ok(json!({
            "entity": {
                "uuid": id,
                "status": demo_data::STATUS_CREATED,
                "statuses": [Self::created_status()],
            }
        }))
    }
}
