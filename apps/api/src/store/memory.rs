//! In-memory record store for tests and local runs (`STORE_BACKEND=memory`).
//!
//! A transaction holds the write lock for its whole lifetime and works on a
//! private copy of the state, which replaces the shared state on commit.
//! Transactions are therefore serialized, and an uncommitted one leaves no trace.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{OwnedRwLockWriteGuard, RwLock};
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult, StoreTx};
use crate::models::resume::{NewResume, ResumeRow};
use crate::models::section::{SectionFields, SectionKind, SectionRecord};
use crate::models::template::TemplateRow;
use crate::models::user::{Account, NewAccount};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    accounts: Vec<Account>,
    templates: Vec<TemplateRow>,
    /// Insertion order.
    resumes: Vec<ResumeRow>,
    /// Insertion order across every CV and section.
    children: Vec<SectionRecord>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
    #[cfg(test)]
    faults: Arc<std::sync::atomic::AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `delete_child` fail, to exercise rollback paths.
    #[cfg(test)]
    pub fn fail_child_deletes(&self, fail: bool) {
        self.faults
            .store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let guard = self.state.clone().write_owned().await;
        let working = MemoryState::clone(&guard);
        Ok(Box::new(MemoryTx {
            guard,
            working,
            #[cfg(test)]
            faults: self.faults.clone(),
        }))
    }
}

struct MemoryTx {
    guard: OwnedRwLockWriteGuard<MemoryState>,
    working: MemoryState,
    #[cfg(test)]
    faults: Arc<std::sync::atomic::AtomicBool>,
}

impl MemoryTx {
    #[cfg(test)]
    fn check_faults(&self, child: &SectionRecord) -> StoreResult<()> {
        if self.faults.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(StoreError::Corrupt(format!(
                "injected failure deleting {}",
                child.id
            )));
        }
        Ok(())
    }

    #[cfg(not(test))]
    fn check_faults(&self, _child: &SectionRecord) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl StoreTx for MemoryTx {
    async fn create_account(&mut self, account: NewAccount) -> StoreResult<Account> {
        if self
            .working
            .accounts
            .iter()
            .any(|a| a.username == account.username)
        {
            return Err(StoreError::Conflict("Username already exists".to_string()));
        }
        let account = Account {
            id: Uuid::new_v4(),
            username: account.username,
            email: account.email,
            display_name: account.display_name,
            created_at: Utc::now(),
        };
        self.working.accounts.push(account.clone());
        Ok(account)
    }

    async fn get_account(&mut self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(self.working.accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn get_template(&mut self, id: i32) -> StoreResult<Option<TemplateRow>> {
        Ok(self.working.templates.iter().find(|t| t.id == id).cloned())
    }

    async fn list_templates(&mut self) -> StoreResult<Vec<TemplateRow>> {
        let mut templates = self.working.templates.clone();
        templates.sort_by_key(|t| t.id);
        Ok(templates)
    }

    async fn insert_template_if_absent(&mut self, template: &TemplateRow) -> StoreResult<bool> {
        if self.working.templates.iter().any(|t| t.id == template.id) {
            return Ok(false);
        }
        self.working.templates.push(template.clone());
        Ok(true)
    }

    async fn create_resume(&mut self, owner_id: Uuid, resume: NewResume) -> StoreResult<ResumeRow> {
        let row = resume.into_row(Uuid::new_v4(), owner_id, Utc::now());
        self.working.resumes.push(row.clone());
        Ok(row)
    }

    async fn get_resume(&mut self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<ResumeRow>> {
        Ok(self
            .working
            .resumes
            .iter()
            .find(|r| r.id == id && r.owner_id == owner_id)
            .cloned())
    }

    async fn save_resume(&mut self, resume: &ResumeRow) -> StoreResult<()> {
        if let Some(slot) = self.working.resumes.iter_mut().find(|r| r.id == resume.id) {
            *slot = resume.clone();
        }
        Ok(())
    }

    async fn delete_resume(&mut self, resume: &ResumeRow) -> StoreResult<()> {
        self.working.resumes.retain(|r| r.id != resume.id);
        self.working.children.retain(|c| c.resume_id != resume.id);
        Ok(())
    }

    async fn list_resumes_for_owner(&mut self, owner_id: Uuid) -> StoreResult<Vec<ResumeRow>> {
        // Reverse insertion order first so equal timestamps still list newest first.
        let mut resumes: Vec<ResumeRow> = self
            .working
            .resumes
            .iter()
            .rev()
            .filter(|r| r.owner_id == owner_id)
            .cloned()
            .collect();
        resumes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(resumes)
    }

    async fn list_children(
        &mut self,
        resume_id: Uuid,
        kind: SectionKind,
    ) -> StoreResult<Vec<SectionRecord>> {
        Ok(self
            .working
            .children
            .iter()
            .filter(|c| c.resume_id == resume_id && c.kind == kind)
            .cloned()
            .collect())
    }

    async fn create_child(
        &mut self,
        resume_id: Uuid,
        kind: SectionKind,
        fields: SectionFields,
    ) -> StoreResult<SectionRecord> {
        let record = SectionRecord {
            id: Uuid::new_v4(),
            resume_id,
            kind,
            fields,
        };
        self.working.children.push(record.clone());
        Ok(record)
    }

    async fn save_child(&mut self, child: &SectionRecord) -> StoreResult<()> {
        if let Some(slot) = self.working.children.iter_mut().find(|c| c.id == child.id) {
            slot.fields = child.fields.clone();
        }
        Ok(())
    }

    async fn delete_child(&mut self, child: &SectionRecord) -> StoreResult<()> {
        self.check_faults(child)?;
        self.working.children.retain(|c| c.id != child.id);
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryTx {
            mut guard, working, ..
        } = *self;
        *guard = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(username: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            display_name: None,
        }
    }

    #[tokio::test]
    async fn test_uncommitted_work_is_discarded() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let account = tx.create_account(new_account("ada")).await.unwrap();
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.get_account(account.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_committed_work_is_visible() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let account = tx.create_account(new_account("ada")).await.unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert!(tx.get_account(account.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.create_account(new_account("ada")).await.unwrap();
        let err = tx.create_account(new_account("ada")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_delete_resume_cascades_children() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let owner = Uuid::new_v4();
        let keep = tx.create_resume(owner, NewResume::default()).await.unwrap();
        let gone = tx.create_resume(owner, NewResume::default()).await.unwrap();
        tx.create_child(keep.id, SectionKind::Skill, SectionFields::new())
            .await
            .unwrap();
        tx.create_child(gone.id, SectionKind::Skill, SectionFields::new())
            .await
            .unwrap();

        tx.delete_resume(&gone).await.unwrap();

        assert_eq!(tx.list_children(keep.id, SectionKind::Skill).await.unwrap().len(), 1);
        assert!(tx.list_children(gone.id, SectionKind::Skill).await.unwrap().is_empty());
        assert!(tx.get_resume(gone.id, owner).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resumes_list_newest_first() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let owner = Uuid::new_v4();
        let first = tx.create_resume(owner, NewResume::default()).await.unwrap();
        let second = tx.create_resume(owner, NewResume::default()).await.unwrap();
        tx.create_resume(Uuid::new_v4(), NewResume::default())
            .await
            .unwrap();

        let listed = tx.list_resumes_for_owner(owner).await.unwrap();
        let ids: Vec<Uuid> = listed.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn test_get_resume_filters_by_owner() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let owner = Uuid::new_v4();
        let resume = tx.create_resume(owner, NewResume::default()).await.unwrap();
        assert!(tx.get_resume(resume.id, owner).await.unwrap().is_some());
        assert!(tx.get_resume(resume.id, Uuid::new_v4()).await.unwrap().is_none());
    }
}
