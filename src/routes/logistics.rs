use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use serde_json::Value;
use tracing::{debug, info};

use crate::carrier::model::{
    from_json, order_id, AuthGrant, EstimateRequest, Listing, LocationPage, LocationSearch,
    OrderRequest, PickupPointQuery, RequiredFields,
};
use crate::carrier::Carrier;
use crate::error::ApiError;
use crate::routes::{caller_token, json_body, query_params};
use crate::server::server::AppState;

pub async fn authenticate(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AuthGrant>, ApiError> {
    let grant = state.carrier.authenticate(&caller_token(&headers)).await?;
    Ok(Json(grant))
}

pub async fn search_locations(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<LocationSearch>, QueryRejection>,
) -> Result<Json<Listing>, ApiError> {
    let query = query_params(query)?;
    let listing = state
        .carrier
        .search_locations(&query, &caller_token(&headers))
        .await?;
    debug!("location search {:?} matched {}", query.term(), listing.meta.total);
    Ok(Json(listing))
}

pub async fn list_locations(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<LocationPage>, QueryRejection>,
) -> Result<Json<Listing>, ApiError> {
    let query = query_params(query)?;
    let listing = state
        .carrier
        .list_locations(&query, &caller_token(&headers))
        .await?;
    Ok(Json(listing))
}

pub async fn pickup_points(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<PickupPointQuery>, QueryRejection>,
) -> Result<Json<Listing>, ApiError> {
    let filter = query_params(query)?.filter()?;
    let listing = state
        .carrier
        .pickup_points(&filter, &caller_token(&headers))
        .await?;
    Ok(Json(listing))
}

pub async fn estimate(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let request: EstimateRequest = from_json(json_body(&body)?)?;
    request.validate()?;
    let quote = state
        .carrier
        .estimate(&request, &caller_token(&headers))
        .await?;
    Ok(Json(quote))
}

pub async fn create_order(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let order = OrderRequest::parse(json_body(&body)?)?;
    let created = state
        .carrier
        .create_order(&order, &caller_token(&headers))
        .await?;
    info!(
        "order created: uuid={}, number={}",
        created["entity"]["uuid"],
        order.draft.number.as_deref().unwrap_or("-")
    );
    Ok(Json(created))
}

pub async fn order_status(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = order_id(&id)?;
    let status = state.carrier.order_status(id, &caller_token(&headers)).await?;
    Ok(Json(status))
}
