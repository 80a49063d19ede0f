use super::gateway::CreatedTransaction;
use super::money::Amount;
use super::team::{ExternalStatus, PaymentStatus, StatusUpdate, TeamPaymentRecord};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Settings key holding the gateway API key.
pub const GATEWAY_KEY_SETTING: &str = "payment_gateway_key";
/// Settings key for the gateway merchant id. Stored but not sent by the
/// current protocol.
pub const GATEWAY_ID_SETTING: &str = "payment_gateway_id";

/// Persistence of team payment records.
///
/// Every mutating method is a single atomic conditional write; the engine
/// relies on that instead of holding its own locks.
#[async_trait]
pub trait TeamStore: Send + Sync {
    /// Inserts the record unless the team already exists.
    async fn insert_if_absent(&self, record: TeamPaymentRecord) -> Result<bool>;
    async fn get(&self, team_id: &str) -> Result<Option<TeamPaymentRecord>>;
    async fn find_by_trx(&self, trx_id: &str) -> Result<Option<TeamPaymentRecord>>;
    async fn all(&self) -> Result<Vec<TeamPaymentRecord>>;
    /// Sets the trx id only if the team is pending and has none yet.
    async fn attach_transaction(&self, team_id: &str, trx_id: &str) -> Result<bool>;
    /// `UPDATE .. SET status, paid_at WHERE team = ? AND trx = ? AND status = expected`.
    async fn compare_and_set_status(
        &self,
        team_id: &str,
        trx_id: &str,
        expected: PaymentStatus,
        update: StatusUpdate,
    ) -> Result<bool>;
    /// Returns `false` when the team does not exist.
    async fn set_recorded_amount(&self, team_id: &str, amount: Option<Decimal>) -> Result<bool>;
}

/// Key/value settings read by the gateway client on every call.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;
    async fn put(&self, key: &str, value: &str) -> Result<()>;
}

/// Outbound calls to the payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_transaction(&self, amount: Amount) -> Result<CreatedTransaction>;
    /// Always a live lookup.
    async fn check_status(&self, trx_id: &str) -> Result<ExternalStatus>;
}

pub type TeamStoreRef = Arc<dyn TeamStore>;
pub type SettingsStoreRef = Arc<dyn SettingsStore>;
pub type PaymentGatewayRef = Arc<dyn PaymentGateway>;
