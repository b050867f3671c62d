//! Shared constants and invariants

pub const DEFAULT_SAFETY_MARGIN_SECS: u64 = 300;
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_PAYMENT_DELAY_MS: u64 = 2000;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: &str = "3000";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_CARRIER_BASE_URL: &str = "https://api.edu.cdek.ru";

// Carrier request defaults
pub const DEFAULT_COUNTRY_CODE: &str = "RU";
pub const DEFAULT_SEARCH_SIZE: usize = 20;
pub const DEFAULT_LIST_SIZE: usize = 50;
pub const MAX_PAGE_SIZE: usize = 1000;
pub const MIN_SEARCH_CHARS: usize = 2;
pub const DEFAULT_TARIFF_CODE: u32 = 136;
/// Moscow, used as the origin when none is given.
pub const DEFAULT_ORIGIN_CODE: u32 = 44;

/// Prefix of tokens issued in demo mode; never forwarded to the carrier.
pub const DEMO_TOKEN_PREFIX: &str = "demo-token-";
pub const DEMO_TOKEN_LIFETIME_SECS: u64 = 3600;
