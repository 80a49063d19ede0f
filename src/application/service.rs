use super::reconciliation::{Reconciliation, ReconciliationEngine};
use crate::domain::gateway::CreatedTransaction;
use crate::domain::money::{Amount, validate_recorded_amount};
use crate::domain::payout::{PayoutComputation, compute_payout};
use crate::domain::ports::{PaymentGatewayRef, TeamStoreRef};
use crate::domain::team::{ExternalStatus, PaymentStatus, StatusUpdate, TeamPaymentRecord};
use crate::error::{PaymentError, Result};
use rust_decimal::Decimal;

/// A team's payout figures alongside its payment status.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamPayout {
    pub team_id: String,
    pub payment_status: PaymentStatus,
    pub payout: PayoutComputation,
}

/// Entry point for everything that touches a team's payment.
///
/// Composes the team store, the gateway and the reconciliation engine. The
/// webhook ingress and the poll trigger both end up in
/// [`ReconciliationEngine::apply`].
pub struct PaymentService {
    store: TeamStoreRef,
    gateway: PaymentGatewayRef,
    engine: ReconciliationEngine,
    min_amount: Decimal,
}

impl PaymentService {
    /// Creates a new `PaymentService`.
    ///
    /// # Arguments
    ///
    /// * `store` - Persistence for team payment records.
    /// * `gateway` - Outbound payment gateway.
    /// * `min_amount` - Smallest amount the gateway accepts.
    pub fn new(store: TeamStoreRef, gateway: PaymentGatewayRef, min_amount: Decimal) -> Self {
        let engine = ReconciliationEngine::new(store.clone());
        Self {
            store,
            gateway,
            engine,
            min_amount,
        }
    }

    pub fn engine(&self) -> &ReconciliationEngine {
        &self.engine
    }

    pub async fn team(&self, team_id: &str) -> Result<TeamPaymentRecord> {
        self.store
            .get(team_id)
            .await?
            .ok_or_else(|| PaymentError::TeamNotFound(team_id.to_string()))
    }

    /// Creates the gateway transaction for a team that just registered.
    ///
    /// Opens a `PENDING` record when the team has none. A team that already
    /// holds a trx id is refused; reusing that id is the caller's decision.
    pub async fn start_payment(&self, team_id: &str, amount: Decimal) -> Result<CreatedTransaction> {
        let amount = Amount::new(amount, self.min_amount)?;

        if !self
            .store
            .insert_if_absent(TeamPaymentRecord::new(team_id))
            .await?
        {
            let existing = self.team(team_id).await?;
            if let Some(trx_id) = existing.payment_trx_id {
                return Err(PaymentError::TransactionAlreadyAssigned {
                    team_id: team_id.to_string(),
                    trx_id,
                });
            }
            if existing.payment_status != PaymentStatus::Pending {
                return Err(PaymentError::InvalidTransition {
                    team_id: team_id.to_string(),
                    from: existing.payment_status,
                    to: PaymentStatus::Pending,
                });
            }
        }

        let created = self.gateway.create_transaction(amount).await?;

        if !self
            .store
            .attach_transaction(team_id, &created.trx_id)
            .await?
        {
            // Another request attached first; ours stays orphaned at the gateway.
            let current = self.team(team_id).await?;
            tracing::warn!(
                team_id,
                orphaned_trx_id = %created.trx_id,
                "transaction created but team already holds one"
            );
            return Err(PaymentError::TransactionAlreadyAssigned {
                team_id: team_id.to_string(),
                trx_id: current.payment_trx_id.unwrap_or(created.trx_id),
            });
        }

        tracing::info!(team_id, trx_id = %created.trx_id, %amount, "payment started");
        Ok(created)
    }

    /// Poll trigger: fetches the live gateway status and reconciles it.
    ///
    /// A gateway failure is returned as is and leaves the record untouched;
    /// callers should ask the user to try again.
    pub async fn check_payment(&self, team_id: &str) -> Result<TeamPaymentRecord> {
        let record = self.team(team_id).await?;
        let Some(trx_id) = record.payment_trx_id else {
            return Err(PaymentError::ValidationError(format!(
                "team {team_id} has no payment transaction yet"
            )));
        };
        let status = self.gateway.check_status(&trx_id).await.inspect_err(|e| {
            tracing::warn!(team_id, %trx_id, error = %e, "status check failed");
        })?;
        self.engine.apply(team_id, &trx_id, &status).await?;
        self.team(team_id).await
    }

    /// Webhook path: resolves the team owning `trx_id` and reconciles.
    pub async fn handle_callback(
        &self,
        trx_id: &str,
        status: &ExternalStatus,
    ) -> Result<Reconciliation> {
        let Some(record) = self.store.find_by_trx(trx_id).await? else {
            tracing::warn!(trx_id, "callback for unknown transaction");
            return Err(PaymentError::TrxMismatch {
                team_id: String::new(),
                trx_id: trx_id.to_string(),
            });
        };
        self.engine.apply(&record.team_id, trx_id, status).await
    }

    /// Administrative confirmation of a received payment: `PAID -> VERIFIED`.
    pub async fn verify_payment(&self, team_id: &str) -> Result<TeamPaymentRecord> {
        let record = self.team(team_id).await?;
        let invalid = |from| PaymentError::InvalidTransition {
            team_id: team_id.to_string(),
            from,
            to: PaymentStatus::Verified,
        };

        match (record.payment_status, record.payment_trx_id.as_deref()) {
            (PaymentStatus::Verified, _) => Ok(record.clone()),
            (PaymentStatus::Paid, Some(trx_id)) => {
                let verified = self
                    .store
                    .compare_and_set_status(
                        team_id,
                        trx_id,
                        PaymentStatus::Paid,
                        StatusUpdate::to(PaymentStatus::Verified),
                    )
                    .await?;
                let current = self.team(team_id).await?;
                if !verified && current.payment_status != PaymentStatus::Verified {
                    return Err(invalid(current.payment_status));
                }
                tracing::info!(team_id, "payment verified");
                Ok(current)
            }
            (from, _) => Err(invalid(from)),
        }
    }

    /// Stores the net amount an administrator says was received.
    pub async fn record_amount(&self, team_id: &str, amount: Option<Decimal>) -> Result<TeamPayout> {
        let amount = validate_recorded_amount(amount)?;
        if !self.store.set_recorded_amount(team_id, amount).await? {
            return Err(PaymentError::TeamNotFound(team_id.to_string()));
        }
        tracing::info!(team_id, recorded_amount = ?amount, "recorded amount updated");
        self.payout(team_id).await
    }

    pub async fn payout(&self, team_id: &str) -> Result<TeamPayout> {
        let record = self.team(team_id).await?;
        Ok(to_payout(record))
    }

    pub async fn payout_report(&self) -> Result<Vec<TeamPayout>> {
        Ok(self.store.all().await?.into_iter().map(to_payout).collect())
    }
}

fn to_payout(record: TeamPaymentRecord) -> TeamPayout {
    TeamPayout {
        payout: compute_payout(record.recorded_amount),
        team_id: record.team_id,
        payment_status: record.payment_status,
    }
}
