use crate::error::PaymentError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Amount requested from the gateway when a payment link is created.
///
/// The gateway only accepts whole currency units, so an `Amount` is always a
/// positive integer at or above the configured minimum.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal, minimum: Decimal) -> Result<Self, PaymentError> {
        if value <= Decimal::ZERO {
            return Err(PaymentError::ValidationError(
                "Amount must be positive".to_string(),
            ));
        }
        if !value.fract().is_zero() {
            return Err(PaymentError::ValidationError(format!(
                "Amount {value} must be a whole number"
            )));
        }
        if value < minimum {
            return Err(PaymentError::ValidationError(format!(
                "Amount {value} is below the gateway minimum of {minimum}"
            )));
        }
        Ok(Self(value.normalize()))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Largest net amount an administrator may record.
pub const MAX_RECORDED_AMOUNT: Decimal = dec!(1000000000000);

/// Validates an administrator-entered net amount.
///
/// `None` clears the amount; negative values and values above
/// [`MAX_RECORDED_AMOUNT`] are rejected. Zero is accepted and behaves like
/// "no payout yet" in the fee model.
pub fn validate_recorded_amount(amount: Option<Decimal>) -> Result<Option<Decimal>, PaymentError> {
    match amount {
        Some(value) if value.is_sign_negative() && !value.is_zero() => Err(
            PaymentError::ValidationError("Recorded amount must not be negative".to_string()),
        ),
        Some(value) if value > MAX_RECORDED_AMOUNT => Err(PaymentError::ValidationError(
            format!("Recorded amount {value} exceeds the maximum of {MAX_RECORDED_AMOUNT}"),
        )),
        other => Ok(other),
    }
}
