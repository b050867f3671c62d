use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::cache::token::Token;
use crate::error::AuthUnavailable;
use crate::helpers::time::{Clock, SystemClock};
use crate::observability::metrics::get_metrics;
use crate::upstream::exchange::{CredentialExchange, OAuth2Exchange};

/// Holds at most one carrier credential and refreshes it on demand.
///
/// The credential is replaced wholesale after each successful exchange and is
/// left untouched when an exchange fails. Callers racing on a stale credential
/// queue behind a single refresh and reuse its result.
pub struct TokenCache<E = OAuth2Exchange, C = SystemClock> {
    exchange: E,
    clock: C,
    safety_margin_seconds: u64,
    current: RwLock<Option<Token>>,
    refresh: Mutex<()>,
}

impl<E, C> TokenCache<E, C>
where
    E: CredentialExchange,
    C: Clock,
{
    pub fn new(exchange: E, clock: C, safety_margin_seconds: u64) -> Self {
        Self {
            exchange,
            clock,
            safety_margin_seconds,
            current: RwLock::new(None),
            refresh: Mutex::new(()),
        }
    }

    pub fn now(&self) -> u64 {
        self.clock.now()
    }

    /// Cached credential regardless of freshness.
    pub async fn peek(&self) -> Option<Token> {
        self.current.read().await.clone()
    }

    async fn fresh(&self) -> Option<Token> {
        let now = self.clock.now();
        self.current
            .read()
            .await
            .as_ref()
            .filter(|token| token.is_fresh(now, self.safety_margin_seconds))
            .cloned()
    }

    /// Return a credential that stays valid past the safety margin, exchanging
    /// client credentials for a new one when needed.
    pub async fn acquire(&self) -> Result<Token, AuthUnavailable> {
        let metrics = get_metrics().await;
        if let Some(token) = self.fresh().await {
            metrics.token_cache_hits.inc();
            return Ok(token);
        }

        let _singleflight = self.refresh.lock().await;
        // another caller may have refreshed while we waited
        if let Some(token) = self.fresh().await {
            metrics.token_cache_hits.inc();
            return Ok(token);
        }

        debug!("carrier credential absent or stale, exchanging");
        metrics.token_exchanges.inc();
        match self.exchange.exchange().await {
            Ok(grant) => {
                let token = Token::new(
                    grant.access_token,
                    self.clock.now().saturating_add(grant.expires_in),
                );
                *self.current.write().await = Some(token.clone());
                metrics.token_expiry_unix.set(token.exp_unix_ts as i64);
                info!("carrier credential refreshed, expires at {}", token.exp_unix_ts);
                Ok(token)
            }
            Err(err) => {
                let reason = err
                    .status
                    .map(|status| status.to_string())
                    .unwrap_or_else(|| "transport".to_owned());
                metrics
                    .token_exchange_failures
                    .with_label_values(&[reason.as_str()])
                    .inc();
                warn!("carrier credential exchange failed: {}", err);
                Err(err)
            }
        }
    }
}
