//! PostgreSQL record store. One sqlx transaction per `StoreTx`; dropping it
//! without `commit` rolls back.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult, StoreTx};
use crate::models::resume::{NewResume, ResumeRow};
use crate::models::section::{SectionEntryRow, SectionFields, SectionKind, SectionRecord};
use crate::models::template::TemplateRow;
use crate::models::user::{Account, NewAccount};

const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn StoreTx>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTx { tx }))
    }
}

struct PgTx {
    tx: Transaction<'static, Postgres>,
}

fn into_record(row: SectionEntryRow) -> StoreResult<SectionRecord> {
    SectionRecord::try_from(row).map_err(StoreError::Corrupt)
}

#[async_trait]
impl StoreTx for PgTx {
    async fn create_account(&mut self, account: NewAccount) -> StoreResult<Account> {
        let result = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, username, email, display_name)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.display_name)
        .fetch_one(&mut *self.tx)
        .await;

        match result {
            Ok(row) => Ok(row),
            Err(sqlx::Error::Database(db_err))
                if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) =>
            {
                Err(StoreError::Conflict("Username already exists".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_account(&mut self, id: Uuid) -> StoreResult<Option<Account>> {
        Ok(
            sqlx::query_as::<_, Account>("SELECT * FROM accounts WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?,
        )
    }

    async fn get_template(&mut self, id: i32) -> StoreResult<Option<TemplateRow>> {
        Ok(
            sqlx::query_as::<_, TemplateRow>("SELECT * FROM cv_templates WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.tx)
                .await?,
        )
    }

    async fn list_templates(&mut self) -> StoreResult<Vec<TemplateRow>> {
        Ok(
            sqlx::query_as::<_, TemplateRow>("SELECT * FROM cv_templates ORDER BY id")
                .fetch_all(&mut *self.tx)
                .await?,
        )
    }

    async fn insert_template_if_absent(&mut self, template: &TemplateRow) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            INSERT INTO cv_templates
                (id, name, description, primary_color, secondary_color,
                 accent_color, font_family, layout_style)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(template.id)
        .bind(&template.name)
        .bind(&template.description)
        .bind(&template.primary_color)
        .bind(&template.secondary_color)
        .bind(&template.accent_color)
        .bind(&template.font_family)
        .bind(&template.layout_style)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn create_resume(&mut self, owner_id: Uuid, resume: NewResume) -> StoreResult<ResumeRow> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            r#"
            INSERT INTO resumes
                (id, owner_id, title, full_name, email, phone, location,
                 linkedin_url, github_url, date_of_birth, gender, nationality,
                 languages, marital_status, additional_info, professional_summary,
                 template_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(&resume.title)
        .bind(&resume.full_name)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.location)
        .bind(&resume.linkedin_url)
        .bind(&resume.github_url)
        .bind(resume.date_of_birth)
        .bind(&resume.gender)
        .bind(&resume.nationality)
        .bind(&resume.languages)
        .bind(&resume.marital_status)
        .bind(&resume.additional_info)
        .bind(&resume.professional_summary)
        .bind(resume.template_id)
        .fetch_one(&mut *self.tx)
        .await?)
    }

    async fn get_resume(&mut self, id: Uuid, owner_id: Uuid) -> StoreResult<Option<ResumeRow>> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE id = $1 AND owner_id = $2",
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&mut *self.tx)
        .await?)
    }

    async fn save_resume(&mut self, resume: &ResumeRow) -> StoreResult<()> {
        sqlx::query(
            r#"
            UPDATE resumes SET
                title = $2, full_name = $3, email = $4, phone = $5, location = $6,
                linkedin_url = $7, github_url = $8, date_of_birth = $9, gender = $10,
                nationality = $11, languages = $12, marital_status = $13,
                additional_info = $14, professional_summary = $15, template_id = $16,
                updated_at = $17
            WHERE id = $1
            "#,
        )
        .bind(resume.id)
        .bind(&resume.title)
        .bind(&resume.full_name)
        .bind(&resume.email)
        .bind(&resume.phone)
        .bind(&resume.location)
        .bind(&resume.linkedin_url)
        .bind(&resume.github_url)
        .bind(resume.date_of_birth)
        .bind(&resume.gender)
        .bind(&resume.nationality)
        .bind(&resume.languages)
        .bind(&resume.marital_status)
        .bind(&resume.additional_info)
        .bind(&resume.professional_summary)
        .bind(resume.template_id)
        .bind(resume.updated_at)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn delete_resume(&mut self, resume: &ResumeRow) -> StoreResult<()> {
        // section_entries cascade via the foreign key.
        sqlx::query("DELETE FROM resumes WHERE id = $1")
            .bind(resume.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn list_resumes_for_owner(&mut self, owner_id: Uuid) -> StoreResult<Vec<ResumeRow>> {
        Ok(sqlx::query_as::<_, ResumeRow>(
            "SELECT * FROM resumes WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&mut *self.tx)
        .await?)
    }

    async fn list_children(
        &mut self,
        resume_id: Uuid,
        kind: SectionKind,
    ) -> StoreResult<Vec<SectionRecord>> {
        let rows = sqlx::query_as::<_, SectionEntryRow>(
            r#"
            SELECT id, resume_id, section, data FROM section_entries
            WHERE resume_id = $1 AND section = $2
            ORDER BY seq
            "#,
        )
        .bind(resume_id)
        .bind(kind.as_str())
        .fetch_all(&mut *self.tx)
        .await?;
        rows.into_iter().map(into_record).collect()
    }

    async fn create_child(
        &mut self,
        resume_id: Uuid,
        kind: SectionKind,
        fields: SectionFields,
    ) -> StoreResult<SectionRecord> {
        let row = sqlx::query_as::<_, SectionEntryRow>(
            r#"
            INSERT INTO section_entries (id, resume_id, section, data)
            VALUES ($1, $2, $3, $4)
            RETURNING id, resume_id, section, data
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(resume_id)
        .bind(kind.as_str())
        .bind(Json(&fields))
        .fetch_one(&mut *self.tx)
        .await?;
        into_record(row)
    }

    async fn save_child(&mut self, child: &SectionRecord) -> StoreResult<()> {
        sqlx::query("UPDATE section_entries SET data = $2 WHERE id = $1")
            .bind(child.id)
            .bind(Json(&child.fields))
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn delete_child(&mut self, child: &SectionRecord) -> StoreResult<()> {
        sqlx::query("DELETE FROM section_entries WHERE id = $1")
            .bind(child.id)
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}
