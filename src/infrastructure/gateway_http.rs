//! HTTP client for the payment gateway.
//!
//! Both calls are `GET <base>?action=...&apikey=...` returning a
//! `{status, data}` envelope. Every failure (transport, timeout, non-2xx,
//! unexpected body) becomes a `GatewayError`; a missing API key is a
//! configuration error instead.

use crate::config::GatewayConfig;
use crate::domain::gateway::{CreatedTransaction, GatewayAction, GatewayReply};
use crate::domain::money::Amount;
use crate::domain::ports::{GATEWAY_KEY_SETTING, PaymentGateway, SettingsStoreRef};
use crate::domain::team::ExternalStatus;
use crate::error::{GatewayError, PaymentError, Result};
use async_trait::async_trait;
use reqwest::header::{CACHE_CONTROL, HeaderValue};
use serde_json::Value;

/// Gateway client over `reqwest`.
///
/// Holds no credentials: the API key is looked up in the settings store for
/// each request.
pub struct HttpGatewayClient {
    client: reqwest::Client,
    config: GatewayConfig,
    settings: SettingsStoreRef,
}

impl HttpGatewayClient {
    pub fn new(config: GatewayConfig, settings: SettingsStoreRef) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PaymentError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;
        Ok(Self {
            client,
            config,
            settings,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    async fn api_key(&self) -> Result<String> {
        match self.settings.get(GATEWAY_KEY_SETTING).await? {
            Some(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(PaymentError::Configuration(format!(
                "{GATEWAY_KEY_SETTING} is not set"
            ))),
        }
    }

    async fn call(&self, action: GatewayAction, params: &[(&str, &str)]) -> Result<GatewayReply> {
        let api_key = self.api_key().await?;
        let mut query = vec![("action", action.as_query()), ("apikey", api_key.as_str())];
        query.extend_from_slice(params);

        let response = self
            .client
            .get(self.config.base_url.clone())
            .query(&query)
            .header(CACHE_CONTROL, HeaderValue::from_static("no-cache"))
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::HttpStatus {
                status: status.as_u16(),
                body: body.chars().take(200).collect(),
            }
            .into());
        }

        let body: Value = response.json().await.map_err(|e| {
            if e.is_timeout() {
                self.transport_error(e)
            } else {
                GatewayError::Malformed(format!("{} response is not JSON: {e}", action.as_query()))
            }
        })?;

        Ok(GatewayReply::decode(action, body))
    }

    fn transport_error(&self, e: reqwest::Error) -> GatewayError {
        if e.is_timeout() {
            GatewayError::Timeout {
                elapsed_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            GatewayError::Transport(e.without_url().to_string())
        }
    }
}

#[async_trait]
impl PaymentGateway for HttpGatewayClient {
    async fn create_transaction(&self, amount: Amount) -> Result<CreatedTransaction> {
        let amount = amount.to_string();
        let reply = self
            .call(GatewayAction::CreatePayment, &[("amount", amount.as_str())])
            .await?;
        let created = reply.into_created().inspect_err(|e| {
            tracing::warn!(error = %e, "gateway did not create a transaction");
        })?;
        tracing::info!(trx_id = %created.trx_id, %amount, "gateway transaction created");
        Ok(created)
    }

    async fn check_status(&self, trx_id: &str) -> Result<ExternalStatus> {
        let reply = self
            .call(GatewayAction::CheckStatus, &[("trxid", trx_id)])
            .await?;
        let status = reply.into_status()?;
        tracing::debug!(trx_id, %status, "gateway status checked");
        Ok(status)
    }
}
