//! Durable store backed by an append-only journal.
//!
//! Every accepted mutation is appended to the journal before it is applied
//! to the in-memory tables. On open the journal is replayed front-to-back.
//!
//! On-disk record format:
//! ```text
//! [4 bytes: payload length (little-endian u32)]
//! [4 bytes: CRC32 of payload (little-endian u32)]
//! [N bytes: payload (JSON-serialized JournalRecord)]
//! ```
//!
//! Replay stops at the first torn or corrupt record and the file is cut
//! back to the end of the last good one, so the recovered state is always
//! a prefix of committed history.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use helpup_types::{
    Campaign, CampaignId, CampaignUpdate, Donation, DonationId, NewCampaign, NewOrganization,
    NewUser, Organization, OrganizationId, OrganizationUpdate, TransactionId, User, UserId,
    WalletTransaction,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::batch::{CommitReceipt, WriteBatch};
use crate::error::{StoreError, StoreResult};
use crate::memory::InMemoryStore;
use crate::tables::Tables;
use crate::traits::{DirectoryStore, LedgerStore};

/// Header size: 4 bytes length + 4 bytes CRC.
const HEADER_SIZE: u64 = 8;

/// Flush/sync strategy for the journal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncMode {
    /// `fsync` after every record.
    #[default]
    EveryWrite,
    /// Flush to the OS and rely on its page cache.
    OsDefault,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalConfig {
    pub sync_mode: SyncMode,
}

/// One journaled mutation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "kebab-case")]
enum JournalRecord {
    User(NewUser),
    Organization(NewOrganization),
    Campaign(NewCampaign),
    OrganizationUpdate {
        id: OrganizationId,
        update: OrganizationUpdate,
    },
    CampaignUpdate {
        id: CampaignId,
        update: CampaignUpdate,
    },
    Commit(WriteBatch),
}

struct JournalWriter {
    file: File,
    offset: u64,
}

/// Store whose state survives restarts.
///
/// Reads are served from memory. Writes hold the table write lock while
/// the record is appended, so journal order always matches apply order.
pub struct JournalStore {
    path: PathBuf,
    state: InMemoryStore,
    writer: Mutex<JournalWriter>,
    config: JournalConfig,
    replayed: usize,
}

impl JournalStore {
    /// Open (or create) the journal at `path` and replay it.
    pub fn open(path: &Path, config: JournalConfig) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(path)?;
        let file_len = file.metadata()?.len();

        let (records, valid_len) = read_records(path, file_len)?;
        if valid_len < file_len {
            warn!(
                path = %path.display(),
                valid_len,
                file_len,
                "discarding torn or corrupt journal tail"
            );
            file.set_len(valid_len)?;
        }

        let mut tables = Tables::new();
        for (offset, record) in &records {
            replay(&mut tables, record).map_err(|e| StoreError::CorruptJournal {
                offset: *offset,
                reason: e.to_string(),
            })?;
        }

        info!(
            path = %path.display(),
            records = records.len(),
            commits = tables.commit_count(),
            "journal replayed"
        );

        Ok(Self {
            path: path.to_path_buf(),
            state: InMemoryStore::from_tables(tables),
            writer: Mutex::new(JournalWriter {
                file,
                offset: valid_len,
            }),
            config,
            replayed: records.len(),
        })
    }

    /// Path to the journal file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records replayed when the store was opened.
    pub fn replayed(&self) -> usize {
        self.replayed
    }

    /// Current end-of-journal offset in bytes.
    pub fn offset(&self) -> StoreResult<u64> {
        Ok(self.writer.lock().map_err(|_| StoreError::LockPoisoned)?.offset)
    }

    fn append(&self, record: &JournalRecord) -> StoreResult<u64> {
        let payload =
            serde_json::to_vec(record).map_err(|e| StoreError::Serialization(e.to_string()))?;
        let length = u32::try_from(payload.len())
            .map_err(|_| StoreError::Serialization("journal record too large".into()))?;
        let crc = crc32fast::hash(&payload);

        let mut frame = Vec::with_capacity(HEADER_SIZE as usize + payload.len());
        frame.extend_from_slice(&length.to_le_bytes());
        frame.extend_from_slice(&crc.to_le_bytes());
        frame.extend_from_slice(&payload);

        let mut w = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        let entry_offset = w.offset;

        if let Err(e) = write_frame(&mut w.file, &frame, self.config.sync_mode) {
            // Drop any partial frame so later records stay replayable.
            if let Err(cut) = w.file.set_len(entry_offset) {
                warn!(offset = entry_offset, error = %cut, "failed to discard partial journal record");
            }
            return Err(e.into());
        }

        w.offset += frame.len() as u64;
        debug!(offset = entry_offset, len = length, "journal append");
        Ok(entry_offset)
    }
}

impl std::fmt::Debug for JournalStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalStore")
            .field("path", &self.path)
            .field("replayed", &self.replayed)
            .finish()
    }
}

fn write_frame(file: &mut File, frame: &[u8], sync_mode: SyncMode) -> io::Result<()> {
    file.write_all(frame)?;
    file.flush()?;
    if sync_mode == SyncMode::EveryWrite {
        file.sync_data()?;
    }
    Ok(())
}

fn replay(tables: &mut Tables, record: &JournalRecord) -> StoreResult<()> {
    match record {
        JournalRecord::User(user) => {
            tables.insert_user(user.clone());
        }
        JournalRecord::Organization(organization) => {
            tables.insert_organization(organization.clone())?;
        }
        JournalRecord::Campaign(campaign) => {
            tables.insert_campaign(campaign.clone())?;
        }
        JournalRecord::OrganizationUpdate { id, update } => {
            tables.update_organization(*id, update)?;
        }
        JournalRecord::CampaignUpdate { id, update } => {
            tables.update_campaign(*id, update)?;
        }
        JournalRecord::Commit(batch) => {
            tables.commit(batch)?;
        }
    }
    Ok(())
}

/// Read every intact record. Returns the records with their offsets and the
/// length of the valid prefix.
fn read_records(path: &Path, file_len: u64) -> StoreResult<(Vec<(u64, JournalRecord)>, u64)> {
    let mut file = BufReader::new(File::open(path)?);
    let mut records = Vec::new();
    let mut offset: u64 = 0;

    while offset + HEADER_SIZE <= file_len {
        let mut header = [0u8; HEADER_SIZE as usize];
        match file.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(e.into()),
        }

        let length = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let expected_crc = u32::from_le_bytes([header[4], header[5], header[6], header[7]]);

        if length == 0 || offset + HEADER_SIZE + u64::from(length) > file_len {
            warn!(offset, length, file_len, "invalid journal record length; stopping replay");
            break;
        }

        let mut payload = vec![0u8; length as usize];
        match file.read_exact(&mut payload) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                warn!(offset, "truncated journal record; stopping replay");
                break;
            }
            Err(e) => return Err(e.into()),
        }

        let actual_crc = crc32fast::hash(&payload);
        if actual_crc != expected_crc {
            warn!(
                offset,
                expected = expected_crc,
                actual = actual_crc,
                "journal CRC mismatch; stopping replay"
            );
            break;
        }

        match serde_json::from_slice::<JournalRecord>(&payload) {
            Ok(record) => records.push((offset, record)),
            Err(e) => {
                warn!(offset, error = %e, "undecodable journal record; stopping replay");
                break;
            }
        }

        offset += HEADER_SIZE + u64::from(length);
    }

    Ok((records, offset))
}

impl DirectoryStore for JournalStore {
    fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.state.write_tables()?;
        self.append(&JournalRecord::User(user.clone()))?;
        Ok(tables.insert_user(user))
    }

    fn user(&self, id: UserId) -> StoreResult<Option<User>> {
        self.state.user(id)
    }

    fn users(&self) -> StoreResult<Vec<User>> {
        self.state.users()
    }

    fn insert_organization(&self, organization: NewOrganization) -> StoreResult<Organization> {
        let mut tables = self.state.write_tables()?;
        tables.check_organization(&organization)?;
        self.append(&JournalRecord::Organization(organization.clone()))?;
        tables.insert_organization(organization)
    }

    fn organization(&self, id: OrganizationId) -> StoreResult<Option<Organization>> {
        self.state.organization(id)
    }

    fn organizations(&self) -> StoreResult<Vec<Organization>> {
        self.state.organizations()
    }

    fn update_organization(
        &self,
        id: OrganizationId,
        update: &OrganizationUpdate,
    ) -> StoreResult<Organization> {
        let mut tables = self.state.write_tables()?;
        tables.check_organization_update(id, update)?;
        self.append(&JournalRecord::OrganizationUpdate {
            id,
            update: update.clone(),
        })?;
        tables.update_organization(id, update)
    }

    fn insert_campaign(&self, campaign: NewCampaign) -> StoreResult<Campaign> {
        let mut tables = self.state.write_tables()?;
        tables.check_campaign(&campaign)?;
        self.append(&JournalRecord::Campaign(campaign.clone()))?;
        tables.insert_campaign(campaign)
    }

    fn campaign(&self, id: CampaignId) -> StoreResult<Option<Campaign>> {
        self.state.campaign(id)
    }

    fn campaigns(&self) -> StoreResult<Vec<Campaign>> {
        self.state.campaigns()
    }

    fn update_campaign(&self, id: CampaignId, update: &CampaignUpdate) -> StoreResult<Campaign> {
        let mut tables = self.state.write_tables()?;
        tables.check_campaign_update(id, update)?;
        self.append(&JournalRecord::CampaignUpdate {
            id,
            update: update.clone(),
        })?;
        tables.update_campaign(id, update)
    }
}

impl LedgerStore for JournalStore {
    fn commit(&self, batch: &WriteBatch) -> StoreResult<CommitReceipt> {
        let mut tables = self.state.write_tables()?;
        let plan = tables.plan(batch)?;
        self.append(&JournalRecord::Commit(batch.clone()))?;
        let receipt = tables.apply(plan);
        debug!(sequence = receipt.sequence, ops = batch.len(), "batch committed");
        Ok(receipt)
    }

    fn transaction(&self, id: TransactionId) -> StoreResult<Option<WalletTransaction>> {
        self.state.transaction(id)
    }

    fn transactions(&self) -> StoreResult<Vec<WalletTransaction>> {
        self.state.transactions()
    }

    fn donation(&self, id: DonationId) -> StoreResult<Option<Donation>> {
        self.state.donation(id)
    }

    fn donations(&self) -> StoreResult<Vec<Donation>> {
        self.state.donations()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, SeekFrom};

    use chrono::{NaiveDate, Utc};
    use helpup_types::{Amount, ApprovalStatus, NewTransaction, Role, TransactionType};
    use rust_decimal_macros::dec;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            first_name: "Ana".into(),
            last_name: "Reyes".into(),
            email: email.into(),
            contact_number: None,
            role: Role::Donor,
        }
    }

    fn top_up(user: UserId, value: rust_decimal::Decimal) -> WriteBatch {
        let amount = Amount::new(value).unwrap();
        WriteBatch::new()
            .credit(user, amount)
            .append_transaction(NewTransaction {
                user_id: user,
                amount,
                transaction_type: TransactionType::TopUp,
                date: Utc::now(),
                notes: "Wallet top-up".into(),
            })
    }

    #[test]
    fn reopen_replays_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("helpup.journal");

        let user = {
            let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
            let user = store.insert_user(new_user("ana@example.org")).unwrap();
            store.commit(&top_up(user.id, dec!(100))).unwrap();
            store.commit(&top_up(user.id, dec!(25.50))).unwrap();
            user.id
        };

        let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
        assert_eq!(store.replayed(), 3);
        let user = store.user(user).unwrap().unwrap();
        assert_eq!(user.wallet_balance.as_decimal(), dec!(125.50));
        assert_eq!(user.version, 2);
        let transactions = store.transactions().unwrap();
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[1].id, TransactionId::new(2));
    }

    #[test]
    fn reopen_replays_directory_edits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("edits.journal");

        let (org, campaign) = {
            let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
            let org = store
                .insert_organization(NewOrganization {
                    name: "Bayanihan".into(),
                    contact_details: None,
                    owner: None,
                })
                .unwrap();
            let campaign = store
                .insert_campaign(NewCampaign {
                    name: "Flood relief".into(),
                    description: String::new(),
                    start_date: NaiveDate::from_ymd_opt(2026, 1, 1),
                    end_date: None,
                    target_amount: Amount::new(dec!(1000)).unwrap(),
                    organization_id: org.id,
                })
                .unwrap();
            store
                .update_organization(
                    org.id,
                    &OrganizationUpdate {
                        approval_status: Some(ApprovalStatus::Approved),
                        ..OrganizationUpdate::default()
                    },
                )
                .unwrap();
            store
                .update_campaign(
                    campaign.id,
                    &CampaignUpdate {
                        description: Some("Relief goods for Leyte".into()),
                        target_amount: Some(Amount::new(dec!(2500)).unwrap()),
                        ..CampaignUpdate::default()
                    },
                )
                .unwrap();

            // A rejected edit leaves no record behind.
            let before = store.offset().unwrap();
            let backwards = CampaignUpdate {
                end_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                ..CampaignUpdate::default()
            };
            assert!(matches!(
                store.update_campaign(campaign.id, &backwards),
                Err(StoreError::InvalidValue(_))
            ));
            assert_eq!(store.offset().unwrap(), before);
            (org.id, campaign.id)
        };

        let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
        assert_eq!(store.replayed(), 4);
        let org = store.organization(org).unwrap().unwrap();
        assert_eq!(org.approval_status, ApprovalStatus::Approved);
        let campaign = store.campaign(campaign).unwrap().unwrap();
        assert_eq!(campaign.description, "Relief goods for Leyte");
        assert_eq!(campaign.target_amount.as_decimal(), dec!(2500));
        assert_eq!(campaign.name, "Flood relief");
    }

    #[test]
    fn rejected_batch_is_not_journaled() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rejected.journal");
        let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
        let user = store.insert_user(new_user("a@example.org")).unwrap();
        let before = store.offset().unwrap();

        let overdraw = WriteBatch::new().debit(user.id, Amount::new(dec!(1)).unwrap());
        assert!(matches!(
            store.commit(&overdraw),
            Err(StoreError::InsufficientBalance { .. })
        ));
        assert_eq!(store.offset().unwrap(), before);
    }

    #[test]
    fn torn_tail_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torn.journal");
        let total_len = {
            let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
            let user = store.insert_user(new_user("a@example.org")).unwrap();
            store.commit(&top_up(user.id, dec!(10))).unwrap();
            store.offset().unwrap()
        };

        {
            let file = OpenOptions::new().write(true).open(&path).unwrap();
            file.set_len(total_len - 4).unwrap();
        }

        let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
        assert_eq!(store.replayed(), 1);
        let user = store.users().unwrap().pop().unwrap();
        assert_eq!(user.wallet_balance.as_decimal(), dec!(0));

        // The cut-back file accepts new records cleanly.
        store.commit(&top_up(user.id, dec!(5))).unwrap();
        drop(store);
        let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
        assert_eq!(store.replayed(), 2);
        assert_eq!(
            store.user(user.id).unwrap().unwrap().wallet_balance.as_decimal(),
            dec!(5)
        );
    }

    #[test]
    fn corrupt_record_stops_replay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.journal");
        {
            let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
            store.insert_user(new_user("a@example.org")).unwrap();
            store.insert_user(new_user("b@example.org")).unwrap();
        }

        // Flip the first payload byte of the first record.
        {
            let mut file = OpenOptions::new().read(true).write(true).open(&path).unwrap();
            file.seek(SeekFrom::Start(HEADER_SIZE)).unwrap();
            let mut buf = [0u8; 1];
            file.read_exact(&mut buf).unwrap();
            buf[0] ^= 0xFF;
            file.seek(SeekFrom::Start(HEADER_SIZE)).unwrap();
            file.write_all(&buf).unwrap();
            file.sync_all().unwrap();
        }

        let store = JournalStore::open(&path, JournalConfig::default()).unwrap();
        assert_eq!(store.replayed(), 0);
        assert!(store.users().unwrap().is_empty());
        assert_eq!(store.offset().unwrap(), 0);
    }

    #[test]
    fn os_default_sync_mode_still_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("os.journal");
        let config = JournalConfig {
            sync_mode: SyncMode::OsDefault,
        };
        {
            let store = JournalStore::open(&path, config.clone()).unwrap();
            store.insert_user(new_user("a@example.org")).unwrap();
        }
        let store = JournalStore::open(&path, config).unwrap();
        assert_eq!(store.users().unwrap().len(), 1);
    }
}
