//! Request and response shapes shared by the demo and live carriers.
//!
//! Every request body is parsed into a struct of optional fields and then
//! checked against its list of required fields, so a caller gets every
//! missing field in a single validation error.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::utils::constants::{
    DEFAULT_COUNTRY_CODE, DEFAULT_LIST_SIZE, DEFAULT_SEARCH_SIZE, MAX_PAGE_SIZE, MIN_SEARCH_CHARS,
};

/// Parse a JSON body, naming the offending field on type mismatches.
pub fn from_json<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_path_to_error::deserialize(value).map_err(|err| {
        let path = err.path().to_string();
        ApiError::Validation {
            message: format!("malformed field '{}': {}", path, err.inner()),
            fields: vec![path],
        }
    })
}

pub trait RequiredFields {
    /// Dotted paths of required inputs that are absent or blank.
    fn missing_fields(&self) -> Vec<String>;

    fn validate(&self) -> Result<(), ApiError> {
        let missing = self.missing_fields();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ApiError::missing_fields(missing))
        }
    }
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map_or(true, str::is_empty)
}

/// Bearer token presented by the caller, if any.
#[derive(Debug, Clone, Default)]
pub struct CallerToken(pub Option<String>);

impl CallerToken {
    pub fn from_authorization(header: Option<&str>) -> Self {
        let token = header
            .and_then(|value| value.strip_prefix("Bearer ").or_else(|| value.strip_prefix("bearer ")))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned);
        Self(token)
    }
}

/// ================================
/// Listings
/// ================================
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    pub data: Vec<Value>,
    pub meta: ListingMeta,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ListingMeta {
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages: Option<usize>,
}

impl Listing {
    pub fn empty() -> Self {
        Self::of(Vec::new())
    }

    pub fn of(data: Vec<Value>) -> Self {
        let meta = ListingMeta { total: data.len(), ..ListingMeta::default() };
        Self { data, meta }
    }
}

fn page_size(size: Option<usize>, default: usize) -> usize {
    size.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationSearch {
    pub name: Option<String>,
    pub country: Option<String>,
    pub size: Option<usize>,
}

impl LocationSearch {
    /// Search term, or None when it is too short to search for.
    pub fn term(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| name.chars().count() >= MIN_SEARCH_CHARS)
    }

    pub fn country(&self) -> &str {
        self.country.as_deref().filter(|c| !c.is_empty()).unwrap_or(DEFAULT_COUNTRY_CODE)
    }

    pub fn size(&self) -> usize {
        page_size(self.size, DEFAULT_SEARCH_SIZE)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocationPage {
    pub page: Option<usize>,
    pub size: Option<usize>,
    pub country: Option<String>,
    pub region_code: Option<u32>,
}

impl LocationPage {
    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page.unwrap_or(1).max(1)
    }

    pub fn size(&self) -> usize {
        page_size(self.size, DEFAULT_LIST_SIZE)
    }

    pub fn country(&self) -> &str {
        self.country.as_deref().filter(|c| !c.is_empty()).unwrap_or(DEFAULT_COUNTRY_CODE)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PickupPointQuery {
    pub location_code: Option<String>,
    #[serde(rename = "type")]
    pub point_type: Option<String>,
    pub have_cashless: Option<bool>,
}

/// Validated pickup-point lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickupPointFilter {
    pub location_code: u32,
    pub point_type: String,
    pub have_cashless: bool,
}

impl PickupPointQuery {
    pub fn filter(&self) -> Result<PickupPointFilter, ApiError> {
        Ok(PickupPointFilter {
            location_code: self.location_code()?,
            point_type: self.point_type().to_owned(),
            have_cashless: self.have_cashless(),
        })
    }

    pub fn location_code(&self) -> Result<u32, ApiError> {
        let raw = self.location_code.as_deref().map(str::trim).unwrap_or("");
        if raw.is_empty() {
            return Err(ApiError::missing_fields(vec!["location_code".to_owned()]));
        }
        raw.parse::<u32>().map_err(|_| {
            ApiError::invalid("location_code", format!("location_code '{}' must be a number", raw))
        })
    }

    pub fn point_type(&self) -> &str {
        self.point_type.as_deref().unwrap_or("ALL")
    }

    pub fn have_cashless(&self) -> bool {
        self.have_cashless.unwrap_or(true)
    }
}

/// ================================
/// Delivery estimate
/// ================================
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct LocationRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LocationRef {
    pub fn with_code(code: u32) -> Self {
        Self { code: Some(code), extra: Map::new() }
    }
}

/// Weight in grams, dimensions in centimetres.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct PackageDescriptor {
    pub weight: Option<u32>,
    pub length: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EstimateRequest {
    pub from_location: Option<LocationRef>,
    pub to_location: Option<LocationRef>,
    pub tariff_code: Option<u32>,
    pub packages: Option<Vec<PackageDescriptor>>,
}

impl EstimateRequest {
    pub fn destination_code(&self) -> Option<u32> {
        self.to_location.as_ref().and_then(|l| l.code)
    }
}

impl RequiredFields for EstimateRequest {
    fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        match &self.to_location {
            None => missing.push("to_location".to_owned()),
            Some(location) if location.code.is_none() => missing.push("to_location.code".to_owned()),
            Some(_) => {}
        }
        match self.packages.as_deref() {
            None | Some([]) => missing.push("packages".to_owned()),
            Some(packages) => {
                for (i, package) in packages.iter().enumerate() {
                    let fields = [
                        ("weight", package.weight),
                        ("length", package.length),
                        ("width", package.width),
                        ("height", package.height),
                    ];
                    for (name, value) in fields {
                        if value.is_none() {
                            missing.push(format!("packages[{}].{}", i, name));
                        }
                    }
                }
            }
        }
        missing
    }
}

/// ================================
/// Orders
/// ================================
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Phone {
    pub number: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Recipient {
    pub name: Option<String>,
    pub phones: Option<Vec<Phone>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderPackage {
    pub number: Option<String>,
    pub weight: Option<u32>,
}

/// Typed view of a shipment order used for validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderDraft {
    pub number: Option<String>,
    pub tariff_code: Option<u32>,
    pub recipient: Option<Recipient>,
    pub to_location: Option<LocationRef>,
    pub packages: Option<Vec<OrderPackage>>,
}

impl RequiredFields for OrderDraft {
    fn missing_fields(&self) -> Vec<String> {
        let mut missing = Vec::new();
        match &self.recipient {
            None => missing.push("recipient".to_owned()),
            Some(recipient) => {
                if is_blank(&recipient.name) {
                    missing.push("recipient.name".to_owned());
                }
                match recipient.phones.as_deref() {
                    None | Some([]) => missing.push("recipient.phones".to_owned()),
                    Some(phones) => {
                        for (i, phone) in phones.iter().enumerate() {
                            if is_blank(&phone.number) {
                                missing.push(format!("recipient.phones[{}].number", i));
                            }
                        }
                    }
                }
            }
        }
        match &self.to_location {
            None => missing.push("to_location".to_owned()),
            Some(location) if location.code.is_none() => missing.push("to_location.code".to_owned()),
            Some(_) => {}
        }
        match self.packages.as_deref() {
            None | Some([]) => missing.push("packages".to_owned()),
            Some(packages) => {
                for (i, package) in packages.iter().enumerate() {
                    if is_blank(&package.number) {
                        missing.push(format!("packages[{}].number", i));
                    }
                    if package.weight.is_none() {
                        missing.push(format!("packages[{}].weight", i));
                    }
                }
            }
        }
        missing
    }
}

/// Validated order: the typed view plus the caller's payload, forwarded verbatim.
#[derive(Debug, Clone)]
pub struct OrderRequest {
    pub draft: OrderDraft,
    pub payload: Value,
}

impl OrderRequest {
    pub fn parse(payload: Value) -> Result<Self, ApiError> {
        let draft: OrderDraft = from_json(payload.clone())?;
        draft.validate()?;
        Ok(Self { draft, payload })
    }
}

/// Checks an order identifier before it becomes a path segment upstream.
/// Only ASCII letters, digits, `-` and `_` are accepted, which covers CDEK
/// uuids and demo ids and rules out `/`, `..`, `?` and `#`.
pub fn order_id(raw: &str) -> Result<&str, ApiError> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(ApiError::missing_fields(vec!["id".to_owned()]));
    }
    if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ApiError::invalid("id", "order id may contain only letters, digits, '-' and '_'"));
    }
    Ok(id)
}

/// Token handed out by `POST /auth`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthGrant {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_term_counts_characters_not_bytes() {
        let query = LocationSearch { name: Some("Мо".into()), ..Default::default() };
        assert_eq!(query.term(), Some("Мо"));
        let query = LocationSearch { name: Some("M".into()), ..Default::default() };
        assert_eq!(query.term(), None);
        assert_eq!(query.country(), "RU");
        assert_eq!(query.size(), 20);
    }

    #[test]
    fn page_size_is_bounded() {
        let page = LocationPage { page: Some(0), size: Some(100_000), ..Default::default() };
        assert_eq!(page.page(), 1);
        assert_eq!(page.size(), MAX_PAGE_SIZE);
    }

    #[test]
    fn pickup_location_code_is_required_and_numeric() {
        let missing = PickupPointQuery::default().location_code().unwrap_err();
        assert!(matches!(missing, ApiError::Validation { ref fields, .. } if fields == &["location_code"]));

        let query = PickupPointQuery { location_code: Some("abc".into()), ..Default::default() };
        assert!(query.location_code().is_err());

        let query = PickupPointQuery { location_code: Some("44".into()), ..Default::default() };
        assert_eq!(query.location_code().unwrap(), 44);
        assert_eq!(query.point_type(), "ALL");
        assert!(query.have_cashless());
    }

    #[test]
    fn estimate_requires_destination_and_complete_packages() {
        let request: EstimateRequest = from_json(json!({
            "to_location": {"city": "Казань"},
            "packages": [{"weight": 500, "length": 30}]
        }))
        .unwrap();
        assert_eq!(
            request.missing_fields(),
            vec!["to_location.code", "packages[0].width", "packages[0].height"]
        );

        let request: EstimateRequest = from_json(json!({"packages": []})).unwrap();
        assert_eq!(request.missing_fields(), vec!["to_location", "packages"]);
    }

    #[test]
    fn order_lists_exactly_the_missing_fields() {
        let err = OrderRequest::parse(json!({
            "recipient": {"name": " ", "phones": [{"number": "+79990000000"}, {}]},
            "to_location": {"code": 44},
            "packages": [{"number": "1"}]
        }))
        .unwrap_err();
        match err {
            ApiError::Validation { fields, .. } => assert_eq!(
                fields,
                vec!["recipient.name", "recipient.phones[1].number", "packages[0].weight"]
            ),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn order_keeps_payload_verbatim() {
        let payload = json!({
            "number": "ORD-1",
            "tariff_code": 136,
            "comment": "fragile",
            "recipient": {"name": "Иван", "phones": [{"number": "+79990000000"}]},
            "to_location": {"code": 137, "address": "Невский пр., д. 28"},
            "packages": [{"number": "1", "weight": 500}]
        });
        let order = OrderRequest::parse(payload.clone()).unwrap();
        assert_eq!(order.payload, payload);
        assert_eq!(order.draft.number.as_deref(), Some("ORD-1"));
    }

    #[test]
    fn type_mismatch_names_the_field() {
        let err = from_json::<EstimateRequest>(json!({"to_location": {"code": "forty-four"}})).unwrap_err();
        match err {
            ApiError::Validation { fields, .. } => assert_eq!(fields, vec!["to_location.code"]),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn order_id_rejects_path_and_query_characters() {
        assert_eq!(order_id(" 72753034-ad4e-4a24-b1de-1e0d8ac6fd8c ").unwrap(), "72753034-ad4e-4a24-b1de-1e0d8ac6fd8c");
        assert_eq!(order_id("demo-uuid-1700000000000-1").unwrap(), "demo-uuid-1700000000000-1");

        for bad in ["../webhooks", "abc/def", "..", "abc?x=1", "abc#frag", "a%2Fb", "abc def"] {
            match order_id(bad).unwrap_err() {
                ApiError::Validation { fields, .. } => assert_eq!(fields, vec!["id"], "{}", bad),
                other => panic!("unexpected error {:?}", other),
            }
        }
        assert!(matches!(order_id("  "), Err(ApiError::Validation { .. })));
    }

    #[test]
    fn caller_token_strips_bearer_prefix() {
        assert_eq!(CallerToken::from_authorization(Some("Bearer abc")).0.as_deref(), Some("abc"));
        assert!(CallerToken::from_authorization(Some("Basic abc")).0.is_none());
        assert!(CallerToken::from_authorization(None).0.is_none());
    }
}
