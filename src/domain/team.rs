use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Persisted payment state of a team.
///
/// `PENDING` is the only non-terminal state. `VERIFIED` is reached from `PAID`
/// by an administrator and is treated like `PAID` by reconciliation.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Verified,
    Expired,
}

impl PaymentStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Verified => "VERIFIED",
            PaymentStatus::Expired => "EXPIRED",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transaction status as reported by the gateway, either through the webhook
/// or through a status check.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ExternalStatus {
    Success,
    Pending,
    Expired,
    /// Anything the gateway sends that we do not act on.
    Other(String),
}

impl From<&str> for ExternalStatus {
    fn from(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => ExternalStatus::Success,
            "PENDING" => ExternalStatus::Pending,
            "EXPIRED" => ExternalStatus::Expired,
            _ => ExternalStatus::Other(raw.to_string()),
        }
    }
}

impl<'de> Deserialize<'de> for ExternalStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(ExternalStatus::from(raw.as_str()))
    }
}

impl fmt::Display for ExternalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalStatus::Success => f.write_str("SUCCESS"),
            ExternalStatus::Pending => f.write_str("PENDING"),
            ExternalStatus::Expired => f.write_str("EXPIRED"),
            ExternalStatus::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// The payment-related slice of a team row.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TeamPaymentRecord {
    pub team_id: String,
    /// Set once when the gateway transaction is created; never replaced.
    pub payment_trx_id: Option<String>,
    pub payment_status: PaymentStatus,
    /// Set exactly once, on entering `PAID`.
    pub paid_at: Option<DateTime<Utc>>,
    /// Net amount received, entered by an administrator.
    pub recorded_amount: Option<Decimal>,
}

impl TeamPaymentRecord {
    pub fn new(team_id: impl Into<String>) -> Self {
        Self {
            team_id: team_id.into(),
            payment_trx_id: None,
            payment_status: PaymentStatus::Pending,
            paid_at: None,
            recorded_amount: None,
        }
    }

    pub fn holds_transaction(&self, trx_id: &str) -> bool {
        self.payment_trx_id.as_deref() == Some(trx_id)
    }

    /// Applies a conditional status write in place.
    ///
    /// Returns `false` without touching the record unless the stored trx id is
    /// `trx_id` and the current status is `expected`. Store implementations
    /// call this inside their atomic section.
    pub fn compare_and_set(
        &mut self,
        trx_id: &str,
        expected: PaymentStatus,
        update: StatusUpdate,
    ) -> bool {
        if !self.holds_transaction(trx_id) || self.payment_status != expected {
            return false;
        }
        self.payment_status = update.status;
        if let Some(paid_at) = update.paid_at
            && self.paid_at.is_none()
        {
            self.paid_at = Some(paid_at);
        }
        true
    }

    /// Attaches a freshly created gateway transaction.
    ///
    /// Refuses when a trx id is already present or the record is no longer
    /// pending.
    pub fn attach(&mut self, trx_id: &str) -> bool {
        if self.payment_trx_id.is_some() || self.payment_status != PaymentStatus::Pending {
            return false;
        }
        self.payment_trx_id = Some(trx_id.to_string());
        true
    }
}

/// New values written by a successful conditional status update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatusUpdate {
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

impl StatusUpdate {
    pub fn paid(at: DateTime<Utc>) -> Self {
        Self {
            status: PaymentStatus::Paid,
            paid_at: Some(at),
        }
    }

    pub fn to(status: PaymentStatus) -> Self {
        Self {
            status,
            paid_at: None,
        }
    }
}
