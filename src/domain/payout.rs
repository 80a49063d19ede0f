use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

/// Share of the gross amount kept by the organizer.
pub const ORGANIZER_FEE_RATE: Decimal = dec!(0.10);
/// Share of the gross amount withheld by the gateway before settlement.
pub const PROCESSING_FEE_RATE: Decimal = dec!(0.007);

/// Decimal places used when a payout is presented.
pub const PRESENTATION_SCALE: u32 = 2;

/// Fee breakdown derived from the net amount an organizer actually received.
///
/// Never persisted: every read recomputes it from the recorded amount, so the
/// figures always follow the current fee rates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutComputation {
    pub recorded_amount: Decimal,
    pub before_processing: Decimal,
    pub processing_fee_amount: Decimal,
    pub organizer_fee_amount: Decimal,
    pub participant_take_home: Decimal,
}

impl PayoutComputation {
    /// Rounds every figure for display. The full-precision values are the
    /// source of truth; only call this at the edge.
    pub fn rounded(&self) -> Self {
        let round = |value: Decimal| value.round_dp(PRESENTATION_SCALE).normalize();
        Self {
            recorded_amount: round(self.recorded_amount),
            before_processing: round(self.before_processing),
            processing_fee_amount: round(self.processing_fee_amount),
            organizer_fee_amount: round(self.organizer_fee_amount),
            participant_take_home: round(self.participant_take_home),
        }
    }
}

/// Reverse-computes gross amount and fees from a net recorded amount.
///
/// Both fee rates are fractions of the gross; only the net (gross minus the
/// processing fee) is observable, so the gross is recovered by dividing by
/// `1 - PROCESSING_FEE_RATE`. The take-home is gross minus the organizer fee;
/// the processing fee already sits between gross and net.
///
/// Absent, zero or negative input yields an all-zero computation, and so does
/// a net amount too large to gross up without overflowing.
pub fn compute_payout(recorded_amount: Option<Decimal>) -> PayoutComputation {
    let net = match recorded_amount {
        Some(value) if value > Decimal::ZERO => value,
        _ => return PayoutComputation::default(),
    };

    reverse_fees(net).unwrap_or_else(|| {
        tracing::warn!(recorded_amount = %net, "recorded amount out of range for payout");
        PayoutComputation::default()
    })
}

fn reverse_fees(net: Decimal) -> Option<PayoutComputation> {
    let before_processing = net.checked_div(Decimal::ONE - PROCESSING_FEE_RATE)?;
    let processing_fee_amount = before_processing.checked_mul(PROCESSING_FEE_RATE)?;
    let organizer_fee_amount = before_processing.checked_mul(ORGANIZER_FEE_RATE)?;

    Some(PayoutComputation {
        recorded_amount: net,
        before_processing,
        processing_fee_amount,
        organizer_fee_amount,
        participant_take_home: before_processing.checked_sub(organizer_fee_amount)?,
    })
}
