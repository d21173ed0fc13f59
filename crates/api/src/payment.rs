//! External payment collaborator.
//!
//! Registration computes an order intent from the event price through a
//! narrow gateway interface. The intent is returned to the caller but
//! never blocks registration: payment confirmation is reconciled
//! out-of-band (see `background::payment_reconciliation`).
//!
//! Two implementations exist: an HTTP client against a provider API, and
//! an offline gateway used when no provider is configured (local
//! development, tests).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use snapvote_core::types::DbId;
use uuid::Uuid;

/// Default currency for order intents.
const DEFAULT_CURRENCY: &str = "INR";

/// Default window (hours) a registration may stay `PENDING` before the
/// reconciliation job expires it.
const DEFAULT_PENDING_EXPIRY_HOURS: i64 = 72;

/// Payment collaborator configuration.
#[derive(Debug, Clone)]
pub struct PaymentConfig {
    /// Provider API base URL. When unset, the offline gateway is used.
    pub api_url: Option<String>,
    /// Provider API key, sent as a bearer token when present.
    pub api_key: Option<String>,
    /// Currency code stamped on every order intent.
    pub currency: String,
    /// Hours a registration may stay `PENDING` before being expired.
    pub pending_expiry_hours: i64,
}

impl PaymentConfig {
    /// Load payment configuration from environment variables.
    ///
    /// | Env Var                        | Default |
    /// |--------------------------------|---------|
    /// | `PAYMENT_API_URL`              | unset   |
    /// | `PAYMENT_API_KEY`              | unset   |
    /// | `PAYMENT_CURRENCY`             | `INR`   |
    /// | `PAYMENT_PENDING_EXPIRY_HOURS` | `72`    |
    pub fn from_env() -> Self {
        let api_url = std::env::var("PAYMENT_API_URL").ok().filter(|s| !s.is_empty());
        let api_key = std::env::var("PAYMENT_API_KEY").ok().filter(|s| !s.is_empty());
        let currency =
            std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| DEFAULT_CURRENCY.into());
        let pending_expiry_hours: i64 = std::env::var("PAYMENT_PENDING_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_PENDING_EXPIRY_HOURS.to_string())
            .parse()
            .expect("PAYMENT_PENDING_EXPIRY_HOURS must be a valid i64");

        Self {
            api_url,
            api_key,
            currency,
            pending_expiry_hours,
        }
    }
}

/// An order intent computed from an event price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Provider-side (or offline) order identifier.
    pub order_id: String,
    /// Amount in minor currency units.
    pub amount: i64,
    pub currency: String,
    /// Provider status at creation time (e.g. `"created"`).
    pub status: String,
}

/// Failures from the payment collaborator.
///
/// These never fail a registration; handlers log them and return a null
/// order to the caller.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment provider returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// Narrow seam to the payment collaborator. Trait object in [`AppState`]
/// so tests can substitute a double.
///
/// [`AppState`]: crate::state::AppState
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order intent for `amount` minor units, tied to the
    /// registering user and event for receipt purposes.
    async fn create_order(
        &self,
        amount: i64,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<OrderIntent, PaymentError>;
}

// ---------------------------------------------------------------------------
// HTTP gateway
// ---------------------------------------------------------------------------

/// Order-creation request body sent to the provider.
#[derive(Debug, Serialize)]
struct ProviderOrderRequest<'a> {
    amount: i64,
    currency: &'a str,
    receipt: String,
}

/// Subset of the provider's order response we care about.
#[derive(Debug, Deserialize)]
struct ProviderOrderResponse {
    id: String,
    status: Option<String>,
}

/// Gateway backed by an HTTP payment provider.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    currency: String,
}

impl HttpPaymentGateway {
    pub fn new(api_url: String, api_key: Option<String>, currency: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            currency,
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        amount: i64,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<OrderIntent, PaymentError> {
        let url = format!("{}/orders", self.api_url.trim_end_matches('/'));
        let body = ProviderOrderRequest {
            amount,
            currency: &self.currency,
            receipt: format!("evt-{event_id}-usr-{user_id}"),
        };

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?.error_for_status()?;
        let order: ProviderOrderResponse = response.json().await?;
        if order.id.is_empty() {
            return Err(PaymentError::InvalidResponse(
                "order id missing from provider response".into(),
            ));
        }

        Ok(OrderIntent {
            order_id: order.id,
            amount,
            currency: self.currency.clone(),
            status: order.status.unwrap_or_else(|| "created".into()),
        })
    }
}

// ---------------------------------------------------------------------------
// Offline gateway
// ---------------------------------------------------------------------------

/// Gateway used when no provider is configured: mints a local order id
/// so the registration flow is fully exercisable without a provider.
pub struct OfflinePaymentGateway {
    currency: String,
}

impl OfflinePaymentGateway {
    pub fn new(currency: String) -> Self {
        Self { currency }
    }
}

#[async_trait]
impl PaymentGateway for OfflinePaymentGateway {
    async fn create_order(
        &self,
        amount: i64,
        _user_id: DbId,
        _event_id: DbId,
    ) -> Result<OrderIntent, PaymentError> {
        Ok(OrderIntent {
            order_id: format!("offline-{}", Uuid::new_v4()),
            amount,
            currency: self.currency.clone(),
            status: "created".into(),
        })
    }
}

/// Build the gateway implied by the configuration: HTTP when an API URL
/// is configured, offline otherwise.
pub fn gateway_from_config(config: &PaymentConfig) -> std::sync::Arc<dyn PaymentGateway> {
    match &config.api_url {
        Some(url) => {
            tracing::info!(api_url = %url, "Using HTTP payment gateway");
            std::sync::Arc::new(HttpPaymentGateway::new(
                url.clone(),
                config.api_key.clone(),
                config.currency.clone(),
            ))
        }
        None => {
            tracing::info!("No payment provider configured, using offline gateway");
            std::sync::Arc::new(OfflinePaymentGateway::new(config.currency.clone()))
        }
    }
}
