//! Runtime configuration objects.
//!
//! Configuration is passed explicitly into the components that need it; there
//! is no process-wide state. The gateway API key is deliberately absent: it is
//! read from the settings store on every call so that rotation needs no restart.

use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Default per-request timeout for gateway calls.
pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the payment gateway.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub base_url: Url,
    pub timeout: Duration,
    /// Smallest amount, in whole currency units, the gateway accepts.
    pub min_amount: Decimal,
}

impl GatewayConfig {
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PaymentError::Configuration(format!("invalid gateway URL {base_url:?}: {e}"))
        })?;
        Ok(Self {
            base_url,
            timeout: DEFAULT_GATEWAY_TIMEOUT,
            min_amount: Decimal::ONE,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_min_amount(mut self, min_amount: Decimal) -> Self {
        self.min_amount = min_amount;
        self
    }
}

/// Shared secret the gateway signs webhook deliveries with.
///
/// `Debug` is redacted so the secret never reaches log output.
#[derive(Clone)]
pub struct WebhookSecret(String);

impl WebhookSecret {
    pub fn new(secret: impl Into<String>) -> Result<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(PaymentError::Configuration(
                "webhook secret must not be empty".to_string(),
            ));
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for WebhookSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WebhookSecret([REDACTED])")
    }
}
