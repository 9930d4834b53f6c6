//! Storage for the HelpUp wallet ledger.
//!
//! Directory entities (users, organizations, campaigns) and the ledger
//! (wallet transactions, donations) live behind two traits:
//!
//! - [`DirectoryStore`] -- registration and lookup of users, organizations,
//!   and campaigns
//! - [`LedgerStore`] -- atomic [`WriteBatch`] commits plus read access to
//!   transactions and donations
//!
//! # Storage Backends
//!
//! - [`InMemoryStore`] -- map-based store for tests and embedding
//! - [`JournalStore`] -- in-memory tables made durable by an append-only,
//!   CRC-framed journal that is replayed on open
//!
//! # Design Rules
//!
//! 1. Wallet balances change only through [`LedgerStore::commit`].
//! 2. A batch is planned against current state first; nothing is applied
//!    unless every operation's precondition holds.
//! 3. `Debit` is a conditional update evaluated inside the commit's critical
//!    section, so concurrent debits can never overdraw a wallet.
//! 4. Ledger entries and donations are append-only.
//! 5. The journal is written before in-memory state changes.

pub mod batch;
pub mod error;
pub mod journal;
pub mod memory;
pub mod tables;
pub mod traits;

pub use batch::{BatchOp, CommitReceipt, WriteBatch};
pub use error::{StoreError, StoreResult};
pub use journal::{JournalConfig, JournalStore, SyncMode};
pub use memory::InMemoryStore;
pub use traits::{DirectoryStore, LedgerStore, Store};
