use crate::domain::ports::{SettingsStore, TeamStore};
use crate::domain::team::{PaymentStatus, StatusUpdate, TeamPaymentRecord};
use crate::error::{PaymentError, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, IteratorMode, Options, SingleThreaded, TransactionDB,
    TransactionDBOptions,
};
use rust_decimal::Decimal;
use std::path::Path;
use std::sync::Arc;

/// Column Family for team payment records, keyed by team id.
pub const CF_TEAMS: &str = "teams";
/// Column Family mapping a gateway trx id to its team id.
pub const CF_TRX_INDEX: &str = "trx_index";
/// Column Family for key/value settings.
pub const CF_SETTINGS: &str = "settings";

/// A persistent store implementation using RocksDB.
///
/// Conditional writes run in a RocksDB transaction that takes an exclusive
/// lock on the team key with `get_for_update`, so two concurrent callers can
/// never both observe `PENDING` and both commit.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<TransactionDB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<TransactionDB<SingleThreaded>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// the required column families when missing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cfs = [CF_TEAMS, CF_TRX_INDEX, CF_SETTINGS]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = TransactionDB::open_cf_descriptors(&opts, &TransactionDBOptions::default(), path, cfs)?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db.cf_handle(name).ok_or_else(|| {
            PaymentError::InternalError(Box::new(std::io::Error::other(format!(
                "{name} column family not found"
            ))))
        })
    }

    /// Reads, mutates and writes back one team record inside a transaction.
    ///
    /// `mutate` returns `false` to leave the record untouched; the transaction
    /// is then dropped, which rolls it back and releases the lock.
    fn update_team<F>(&self, team_id: &str, mutate: F) -> Result<bool>
    where
        F: FnOnce(&mut TeamPaymentRecord) -> bool,
    {
        let teams = self.cf(CF_TEAMS)?;
        let txn = self.db.transaction();

        let Some(bytes) = txn.get_for_update_cf(teams, team_id.as_bytes(), true)? else {
            return Ok(false);
        };
        let mut record = decode(&bytes)?;
        if !mutate(&mut record) {
            return Ok(false);
        }

        txn.put_cf(teams, team_id.as_bytes(), encode(&record)?)?;
        txn.commit()?;
        Ok(true)
    }
}

fn encode(record: &TeamPaymentRecord) -> Result<Vec<u8>> {
    serde_json::to_vec(record).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Serialization error: {}", e),
        )))
    })
}

fn decode(bytes: &[u8]) -> Result<TeamPaymentRecord> {
    serde_json::from_slice(bytes).map_err(|e| {
        PaymentError::InternalError(Box::new(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Deserialization error: {}", e),
        )))
    })
}

#[async_trait]
impl TeamStore for RocksDBStore {
    async fn insert_if_absent(&self, record: TeamPaymentRecord) -> Result<bool> {
        let teams = self.cf(CF_TEAMS)?;
        let index = self.cf(CF_TRX_INDEX)?;
        let txn = self.db.transaction();

        let key = record.team_id.as_bytes();
        if txn.get_for_update_cf(teams, key, true)?.is_some() {
            return Ok(false);
        }
        txn.put_cf(teams, key, encode(&record)?)?;
        if let Some(trx_id) = &record.payment_trx_id {
            txn.put_cf(index, trx_id.as_bytes(), key)?;
        }
        txn.commit()?;
        Ok(true)
    }

    async fn get(&self, team_id: &str) -> Result<Option<TeamPaymentRecord>> {
        let teams = self.cf(CF_TEAMS)?;
        match self.db.get_cf(teams, team_id.as_bytes())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn find_by_trx(&self, trx_id: &str) -> Result<Option<TeamPaymentRecord>> {
        let index = self.cf(CF_TRX_INDEX)?;
        let Some(team_id) = self.db.get_cf(index, trx_id.as_bytes())? else {
            return Ok(None);
        };
        let team_id = String::from_utf8_lossy(&team_id).into_owned();
        TeamStore::get(self, &team_id).await
    }

    async fn all(&self) -> Result<Vec<TeamPaymentRecord>> {
        let teams = self.cf(CF_TEAMS)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(teams, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(decode(&value)?);
        }
        Ok(records)
    }

    async fn attach_transaction(&self, team_id: &str, trx_id: &str) -> Result<bool> {
        let teams = self.cf(CF_TEAMS)?;
        let index = self.cf(CF_TRX_INDEX)?;
        let txn = self.db.transaction();

        if txn.get_for_update_cf(index, trx_id.as_bytes(), true)?.is_some() {
            return Ok(false);
        }
        let Some(bytes) = txn.get_for_update_cf(teams, team_id.as_bytes(), true)? else {
            return Ok(false);
        };
        let mut record = decode(&bytes)?;
        if !record.attach(trx_id) {
            return Ok(false);
        }

        txn.put_cf(teams, team_id.as_bytes(), encode(&record)?)?;
        txn.put_cf(index, trx_id.as_bytes(), team_id.as_bytes())?;
        txn.commit()?;
        Ok(true)
    }

    async fn compare_and_set_status(
        &self,
        team_id: &str,
        trx_id: &str,
        expected: PaymentStatus,
        update: StatusUpdate,
    ) -> Result<bool> {
        self.update_team(team_id, |record| {
            record.compare_and_set(trx_id, expected, update)
        })
    }

    async fn set_recorded_amount(&self, team_id: &str, amount: Option<Decimal>) -> Result<bool> {
        self.update_team(team_id, |record| {
            record.recorded_amount = amount;
            true
        })
    }
}

#[async_trait]
impl SettingsStore for RocksDBStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let settings = self.cf(CF_SETTINGS)?;
        Ok(self
            .db
            .get_cf(settings, key.as_bytes())?
            .map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn put(&self, key: &str, value: &str) -> Result<()> {
        let settings = self.cf(CF_SETTINGS)?;
        self.db.put_cf(settings, key.as_bytes(), value.as_bytes())?;
        Ok(())
    }
}
