use crate::domain::ports::{SettingsStore, TeamStore};
use crate::domain::team::{PaymentStatus, StatusUpdate, TeamPaymentRecord};
use crate::error::Result;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct Teams {
    by_id: HashMap<String, TeamPaymentRecord>,
    by_trx: HashMap<String, String>,
}

/// A thread-safe in-memory store for team payment records.
///
/// Every conditional write runs inside a single write-lock section, which is
/// what gives `compare_and_set_status` its atomicity. Clones share the data.
#[derive(Default, Clone)]
pub struct InMemoryTeamStore {
    teams: Arc<RwLock<Teams>>,
}

impl InMemoryTeamStore {
    /// Creates a new, empty in-memory team store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TeamStore for InMemoryTeamStore {
    async fn insert_if_absent(&self, record: TeamPaymentRecord) -> Result<bool> {
        let mut teams = self.teams.write().await;
        if teams.by_id.contains_key(&record.team_id) {
            return Ok(false);
        }
        if let Some(trx_id) = &record.payment_trx_id {
            teams.by_trx.insert(trx_id.clone(), record.team_id.clone());
        }
        teams.by_id.insert(record.team_id.clone(), record);
        Ok(true)
    }

    async fn get(&self, team_id: &str) -> Result<Option<TeamPaymentRecord>> {
        let teams = self.teams.read().await;
        Ok(teams.by_id.get(team_id).cloned())
    }

    async fn find_by_trx(&self, trx_id: &str) -> Result<Option<TeamPaymentRecord>> {
        let teams = self.teams.read().await;
        Ok(teams
            .by_trx
            .get(trx_id)
            .and_then(|team_id| teams.by_id.get(team_id))
            .cloned())
    }

    async fn all(&self) -> Result<Vec<TeamPaymentRecord>> {
        let teams = self.teams.read().await;
        let mut records: Vec<_> = teams.by_id.values().cloned().collect();
        records.sort_by(|a, b| a.team_id.cmp(&b.team_id));
        Ok(records)
    }

    async fn attach_transaction(&self, team_id: &str, trx_id: &str) -> Result<bool> {
        let mut teams = self.teams.write().await;
        if teams.by_trx.contains_key(trx_id) {
            return Ok(false);
        }
        let attached = match teams.by_id.get_mut(team_id) {
            Some(record) => record.attach(trx_id),
            None => false,
        };
        if attached {
            teams.by_trx.insert(trx_id.to_string(), team_id.to_string());
        }
        Ok(attached)
    }

    async fn compare_and_set_status(
        &self,
        team_id: &str,
        trx_id: &str,
        expected: PaymentStatus,
        update: StatusUpdate,
    ) -> Result<bool> {
        let mut teams = self.teams.write().await;
        Ok(teams
            .by_id
            .get_mut(team_id)
            .is_some_and(|record| record.compare_and_set(trx_id, expected, update)))
    }

    async fn set_recorded_amount(&self, team_id: &str, amount: Option<Decimal>) -> Result<bool> {
        let mut teams = self.teams.write().await;
        match teams.by_id.get_mut(team_id) {
            Some(record) => {
                record.recorded_amount = amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// A thread-safe in-memory settings store.
#[derive(Default, Clone)]
pub struct InMemorySettingsStore {
    settings: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let settings = self.settings.read().await;
        Ok(settings.get(key).cloned())
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let mut settings = self.settings.write().await;
        settings.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
