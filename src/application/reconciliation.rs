use crate::domain::ports::TeamStoreRef;
use crate::domain::team::{ExternalStatus, PaymentStatus, StatusUpdate};
use crate::error::{PaymentError, Result};
use chrono::Utc;

/// What a call to [`ReconciliationEngine::apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// This call moved the team out of `PENDING`.
    Transitioned(PaymentStatus),
    /// The team was already terminal, or another caller won the race.
    AlreadySettled(PaymentStatus),
    /// The reported status does not move a pending payment.
    Unchanged,
}

impl Reconciliation {
    pub fn status(&self) -> Option<PaymentStatus> {
        match self {
            Reconciliation::Transitioned(status) | Reconciliation::AlreadySettled(status) => {
                Some(*status)
            }
            Reconciliation::Unchanged => None,
        }
    }
}

/// Merges gateway-reported outcomes into team records exactly once.
///
/// The engine is stateless. Webhook deliveries and status polls may call
/// `apply` concurrently, for the same team, any number of times: the only
/// write is the store's conditional update from `PENDING`, so at most one
/// caller ever performs the transition and `paid_at` is written once.
#[derive(Clone)]
pub struct ReconciliationEngine {
    store: TeamStoreRef,
}

impl ReconciliationEngine {
    pub fn new(store: TeamStoreRef) -> Self {
        Self { store }
    }

    /// Applies an externally reported status to `team_id`.
    ///
    /// Fails with `TrxMismatch` when `trx_id` is not the team's transaction.
    /// Terminal teams (`PAID`, `VERIFIED`, `EXPIRED`) are left untouched and
    /// the call still succeeds.
    pub async fn apply(
        &self,
        team_id: &str,
        trx_id: &str,
        external: &ExternalStatus,
    ) -> Result<Reconciliation> {
        let record = self
            .store
            .get(team_id)
            .await?
            .ok_or_else(|| PaymentError::TeamNotFound(team_id.to_string()))?;

        if !record.holds_transaction(trx_id) {
            tracing::warn!(team_id, trx_id, "rejecting status for a foreign transaction");
            return Err(PaymentError::TrxMismatch {
                team_id: team_id.to_string(),
                trx_id: trx_id.to_string(),
            });
        }

        if record.payment_status.is_terminal() {
            tracing::debug!(team_id, trx_id, status = %record.payment_status, "already settled");
            return Ok(Reconciliation::AlreadySettled(record.payment_status));
        }

        let update = match external {
            ExternalStatus::Success => StatusUpdate::paid(Utc::now()),
            ExternalStatus::Expired => StatusUpdate::to(PaymentStatus::Expired),
            ExternalStatus::Pending | ExternalStatus::Other(_) => {
                tracing::debug!(team_id, trx_id, %external, "no transition");
                return Ok(Reconciliation::Unchanged);
            }
        };

        let applied = self
            .store
            .compare_and_set_status(team_id, trx_id, PaymentStatus::Pending, update)
            .await?;

        if applied {
            tracing::info!(team_id, trx_id, status = %update.status, "payment status updated");
            return Ok(Reconciliation::Transitioned(update.status));
        }

        // Lost the race to a concurrent caller: report what it wrote.
        let current = self
            .store
            .get(team_id)
            .await?
            .ok_or_else(|| PaymentError::TeamNotFound(team_id.to_string()))?;
        tracing::debug!(team_id, trx_id, status = %current.payment_status, "concurrent update won");
        Ok(Reconciliation::AlreadySettled(current.payment_status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::TeamStore;
    use crate::domain::team::TeamPaymentRecord;
    use crate::infrastructure::in_memory::InMemoryTeamStore;
    use std::sync::Arc;

    async fn engine_with_pending(team_id: &str, trx_id: &str) -> (ReconciliationEngine, InMemoryTeamStore) {
        let store = InMemoryTeamStore::new();
        store
            .insert_if_absent(TeamPaymentRecord::new(team_id))
            .await
            .unwrap();
        store.attach_transaction(team_id, trx_id).await.unwrap();
        (ReconciliationEngine::new(Arc::new(store.clone())), store)
    }

    #[tokio::test]
    async fn test_success_marks_paid_once() {
        let (engine, store) = engine_with_pending("team-1", "trx-1").await;

        let first = engine
            .apply("team-1", "trx-1", &ExternalStatus::Success)
            .await
            .unwrap();
        assert_eq!(first, Reconciliation::Transitioned(PaymentStatus::Paid));
        let paid_at = store.get("team-1").await.unwrap().unwrap().paid_at;
        assert!(paid_at.is_some());

        let second = engine
            .apply("team-1", "trx-1", &ExternalStatus::Success)
            .await
            .unwrap();
        assert_eq!(second, Reconciliation::AlreadySettled(PaymentStatus::Paid));
        assert_eq!(store.get("team-1").await.unwrap().unwrap().paid_at, paid_at);
    }

    #[tokio::test]
    async fn test_expired_is_terminal() {
        let (engine, store) = engine_with_pending("team-1", "trx-1").await;

        let outcome = engine
            .apply("team-1", "trx-1", &ExternalStatus::Expired)
            .await
            .unwrap();
        assert_eq!(outcome, Reconciliation::Transitioned(PaymentStatus::Expired));

        // A late success must not revive an expired payment.
        let late = engine
            .apply("team-1", "trx-1", &ExternalStatus::Success)
            .await
            .unwrap();
        assert_eq!(late, Reconciliation::AlreadySettled(PaymentStatus::Expired));

        let record = store.get("team-1").await.unwrap().unwrap();
        assert_eq!(record.payment_status, PaymentStatus::Expired);
        assert!(record.paid_at.is_none());
    }

    #[tokio::test]
    async fn test_pending_and_unknown_statuses_are_noops() {
        let (engine, store) = engine_with_pending("team-1", "trx-1").await;

        for external in [
            ExternalStatus::Pending,
            ExternalStatus::Other("REFUNDED".to_string()),
        ] {
            let outcome = engine.apply("team-1", "trx-1", &external).await.unwrap();
            assert_eq!(outcome, Reconciliation::Unchanged);
        }
        let record = store.get("team-1").await.unwrap().unwrap();
        assert_eq!(record.payment_status, PaymentStatus::Pending);
    }

    #[tokio::test]
    async fn test_wrong_trx_never_changes_status() {
        let (engine, store) = engine_with_pending("team-1", "trx-1").await;

        let result = engine
            .apply("team-1", "trx-old", &ExternalStatus::Success)
            .await;
        assert!(matches!(result, Err(PaymentError::TrxMismatch { .. })));
        assert_eq!(
            store.get("team-1").await.unwrap().unwrap().payment_status,
            PaymentStatus::Pending
        );

        engine
            .apply("team-1", "trx-1", &ExternalStatus::Success)
            .await
            .unwrap();
        let result = engine
            .apply("team-1", "trx-old", &ExternalStatus::Expired)
            .await;
        assert!(matches!(result, Err(PaymentError::TrxMismatch { .. })));
        assert_eq!(
            store.get("team-1").await.unwrap().unwrap().payment_status,
            PaymentStatus::Paid
        );
    }

    #[tokio::test]
    async fn test_team_without_transaction_rejects_callbacks() {
        let store = InMemoryTeamStore::new();
        store
            .insert_if_absent(TeamPaymentRecord::new("team-1"))
            .await
            .unwrap();
        let engine = ReconciliationEngine::new(Arc::new(store));

        let result = engine
            .apply("team-1", "trx-1", &ExternalStatus::Success)
            .await;
        assert!(matches!(result, Err(PaymentError::TrxMismatch { .. })));
    }

    #[tokio::test]
    async fn test_unknown_team() {
        let engine = ReconciliationEngine::new(Arc::new(InMemoryTeamStore::new()));
        let result = engine
            .apply("ghost", "trx-1", &ExternalStatus::Success)
            .await;
        assert!(matches!(result, Err(PaymentError::TeamNotFound(_))));
    }

    #[tokio::test]
    async fn test_verified_refuses_automatic_transitions() {
        let (engine, store) = engine_with_pending("team-1", "trx-1").await;
        engine
            .apply("team-1", "trx-1", &ExternalStatus::Success)
            .await
            .unwrap();
        store
            .compare_and_set_status(
                "team-1",
                "trx-1",
                PaymentStatus::Paid,
                StatusUpdate::to(PaymentStatus::Verified),
            )
            .await
            .unwrap();
        let before = store.get("team-1").await.unwrap().unwrap();

        for external in [ExternalStatus::Success, ExternalStatus::Expired] {
            let outcome = engine.apply("team-1", "trx-1", &external).await.unwrap();
            assert_eq!(outcome, Reconciliation::AlreadySettled(PaymentStatus::Verified));
        }
        assert_eq!(store.get("team-1").await.unwrap().unwrap(), before);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_success_transitions_once() {
        let (engine, store) = engine_with_pending("team-1", "trx-1").await;

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let engine = engine.clone();
                tokio::spawn(async move {
                    engine
                        .apply("team-1", "trx-1", &ExternalStatus::Success)
                        .await
                        .unwrap()
                })
            })
            .collect();

        let mut transitioned = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Reconciliation::Transitioned(PaymentStatus::Paid) => transitioned += 1,
                Reconciliation::AlreadySettled(PaymentStatus::Paid) => {}
                other => panic!("unexpected outcome {other:?}"),
            }
        }

        assert_eq!(transitioned, 1);
        let record = store.get("team-1").await.unwrap().unwrap();
        assert_eq!(record.payment_status, PaymentStatus::Paid);
        assert!(record.paid_at.is_some());
    }
}
