//! Record store: transactional persistence for accounts, templates, CVs and
//! their section records.
//!
//! Every operation runs on a `StoreTx` obtained from `RecordStore::begin`.
//! Work becomes visible only on `commit`; dropping a transaction without
//! committing discards everything it did. Callers rely on that: an error
//! propagated with `?` mid-operation leaves the store untouched.
//!
//! Backends: `PgStore` (PostgreSQL) and `MemoryStore` (tests, local runs).

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resume::{NewResume, ResumeRow};
use crate::models::section::{SectionFields, SectionKind, SectionRecord};
use crate::models::template::TemplateRow;
use crate::models::user::{Account, NewAccount};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Opens a transaction. All reads and writes go through it.
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>>;
}

/// One unit of work against the store.
#[async_trait]
pub trait StoreTx: Send {
    // Accounts
    async fn create_account(&mut self, account: NewAccount) -> StoreResult<Account>;
    async fn get_account(&mut self, id: Uuid) -> StoreResult<Option<Account>>;

    // Templates
    async fn get_template(&mut self, id: i32) -> StoreResult<Option<TemplateRow>>;
    async fn list_templates(&mut self) -> StoreResult<Vec<TemplateRow>>;
    /// Inserts `template` unless a template with the same id exists.
    /// Returns whether a row was inserted.
    async fn insert_template_if_absent(&mut self, template: &TemplateRow) -> StoreResult<bool>;

    // CVs
    async fn create_resume(&mut self, owner_id: Uuid, resume: NewResume) -> StoreResult<ResumeRow>;
    /// Fetch filtered by owner: a wrong id and a wrong owner look the same.
    async fn get_resume(&mut self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<ResumeRow>>;
    async fn save_resume(&mut self, resume: &ResumeRow) -> StoreResult<()>;
    /// Removes the CV and all of its section records.
    async fn delete_resume(&mut self, resume: &ResumeRow) -> StoreResult<()>;
    /// Newest first by creation time.
    async fn list_resumes_for_owner(&mut self, owner_id: Uuid) -> StoreResult<Vec<ResumeRow>>;

    // Section records
    /// In insertion order.
    async fn list_children(
        &mut self,
        resume_id: Uuid,
        kind: SectionKind,
    ) -> StoreResult<Vec<SectionRecord>>;
    /// Appends a record to the end of the section.
    async fn create_child(
        &mut self,
        resume_id: Uuid,
        kind: SectionKind,
        fields: SectionFields,
    ) -> StoreResult<SectionRecord>;
    /// Overwrites the fields of an existing record. Its position is unchanged.
    async fn save_child(&mut self, child: &SectionRecord) -> StoreResult<()>;
    async fn delete_child(&mut self, child: &SectionRecord) -> StoreResult<()>;

    /// Makes every change in this transaction durable.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
