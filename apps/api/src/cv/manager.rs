//! CV aggregate operations: create, edit, duplicate, delete, load, list.
//!
//! Each operation is one store transaction: it begins, does its work and
//! commits. Any error returns early and drops the transaction, so a CV is
//! never left half-edited or half-copied.
//!
//! Ownership: a CV is fetched by id filtered by owner. A wrong id and someone
//! else's CV both surface as `AppError::NotFound`.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::cv::reconcile::{reconcile_section, ReconcileReport};
use crate::cv::schema::{all_schemas, schema_for};
use crate::cv::submission::{parse_scalars, parse_section, RawSubmission, ScalarSubmission};
use crate::cv::templates::effective_template;
use crate::errors::AppError;
use crate::models::resume::{NewResume, ResumeRow, ResumeSummary};
use crate::models::section::{SectionKind, SectionRecord};
use crate::models::template::TemplateRow;
use crate::models::user::Owner;
use crate::store::{RecordStore, StoreTx};

/// A CV with its effective template and every section collection, in order.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeAggregate {
    pub resume: ResumeRow,
    pub template: Option<TemplateRow>,
    pub sections: BTreeMap<SectionKind, Vec<SectionRecord>>,
}

impl ResumeAggregate {
    pub fn section(&self, kind: SectionKind) -> &[SectionRecord] {
        self.sections.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EditOutcome {
    pub resume: ResumeRow,
    pub sections: BTreeMap<SectionKind, ReconcileReport>,
}

async fn fetch_owned(
    tx: &mut dyn StoreTx,
    resume_id: Uuid,
    owner: &Owner,
) -> Result<ResumeRow, AppError> {
    tx.get_resume(resume_id, owner.account_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("CV {resume_id} not found")))
}

/// Creates an empty CV for `owner`, titled with the owner's next sequence
/// number and named after the owner's profile.
pub async fn create_resume(store: &dyn RecordStore, owner: &Owner) -> Result<ResumeRow, AppError> {
    let mut tx = store.begin().await?;
    let account = tx
        .get_account(owner.account_id)
        .await?
        .ok_or(AppError::Unauthorized)?;
    let existing = tx.list_resumes_for_owner(owner.account_id).await?.len();

    let resume = tx
        .create_resume(
            owner.account_id,
            NewResume {
                title: format!("My CV {}", existing + 1),
                full_name: account.preferred_name().to_string(),
                ..NewResume::default()
            },
        )
        .await?;
    tx.commit().await?;

    info!("Created CV {} for account {}", resume.id, owner.account_id);
    Ok(resume)
}

fn apply_scalars(resume: &mut ResumeRow, scalars: ScalarSubmission) {
    resume.title = scalars.title;
    resume.full_name = scalars.full_name;
    resume.email = scalars.email;
    resume.phone = scalars.phone;
    resume.location = scalars.location;
    resume.linkedin_url = scalars.linkedin_url;
    resume.github_url = scalars.github_url;
    resume.date_of_birth = scalars.date_of_birth;
    resume.gender = scalars.gender;
    resume.nationality = scalars.nationality;
    resume.languages = scalars.languages;
    resume.marital_status = scalars.marital_status;
    resume.additional_info = scalars.additional_info;
    resume.professional_summary = scalars.professional_summary;
}

/// Applies an edit submission: scalar fields, template selection, then one
/// reconciliation pass per section. All or nothing.
pub async fn apply_edit(
    store: &dyn RecordStore,
    resume_id: Uuid,
    owner: &Owner,
    submission: &RawSubmission,
) -> Result<EditOutcome, AppError> {
    let mut tx = store.begin().await?;
    let mut resume = fetch_owned(tx.as_mut(), resume_id, owner).await?;

    // Ownership first, then parsing; a malformed section still fails before any write.
    let bundles = all_schemas()
        .iter()
        .map(|schema| parse_section(submission, schema))
        .collect::<Result<Vec<_>, _>>()?;
    let scalars = parse_scalars(submission);

    if let Some(template_id) = scalars.template_id {
        if tx.get_template(template_id).await?.is_some() {
            resume.template_id = Some(template_id);
        }
    }
    apply_scalars(&mut resume, scalars);
    resume.updated_at = Utc::now();
    tx.save_resume(&resume).await?;

    let mut sections = BTreeMap::new();
    for bundle in &bundles {
        let report =
            reconcile_section(tx.as_mut(), resume.id, schema_for(bundle.kind), bundle).await?;
        sections.insert(bundle.kind, report);
    }
    tx.commit().await?;

    info!("Applied edit to CV {resume_id} for account {}", owner.account_id);
    Ok(EditOutcome { resume, sections })
}

/// Copies a CV and every section record, in order, under a "(Copy n)" title.
pub async fn duplicate_resume(
    store: &dyn RecordStore,
    resume_id: Uuid,
    owner: &Owner,
) -> Result<ResumeRow, AppError> {
    let mut tx = store.begin().await?;
    let original = fetch_owned(tx.as_mut(), resume_id, owner).await?;
    let owned = tx.list_resumes_for_owner(owner.account_id).await?.len();

    let title = format!("{} (Copy {})", original.title, owned);
    let copy = tx
        .create_resume(owner.account_id, NewResume::copy_of(&original, title))
        .await?;

    for kind in SectionKind::ALL {
        for record in tx.list_children(original.id, kind).await? {
            tx.create_child(copy.id, kind, record.fields).await?;
        }
    }
    tx.commit().await?;

    info!("Duplicated CV {} into {}", original.id, copy.id);
    Ok(copy)
}

/// Deletes a CV and, with it, every section record.
pub async fn delete_resume(
    store: &dyn RecordStore,
    resume_id: Uuid,
    owner: &Owner,
) -> Result<(), AppError> {
    let mut tx = store.begin().await?;
    let resume = fetch_owned(tx.as_mut(), resume_id, owner).await?;
    tx.delete_resume(&resume).await?;
    tx.commit().await?;

    info!("Deleted CV {resume_id} for account {}", owner.account_id);
    Ok(())
}

/// Loads the full aggregate for preview or export.
pub async fn load_resume(
    store: &dyn RecordStore,
    resume_id: Uuid,
    owner: &Owner,
) -> Result<ResumeAggregate, AppError> {
    let mut tx = store.begin().await?;
    let resume = fetch_owned(tx.as_mut(), resume_id, owner).await?;
    let template = effective_template(tx.as_mut(), resume.template_id).await?;

    let mut sections = BTreeMap::new();
    for kind in SectionKind::ALL {
        sections.insert(kind, tx.list_children(resume.id, kind).await?);
    }

    Ok(ResumeAggregate {
        resume,
        template,
        sections,
    })
}

/// The owner's CVs, newest first.
pub async fn list_resumes(
    store: &dyn RecordStore,
    owner: &Owner,
) -> Result<Vec<ResumeSummary>, AppError> {
    let mut tx = store.begin().await?;
    let resumes = tx.list_resumes_for_owner(owner.account_id).await?;
    Ok(resumes.iter().map(ResumeSummary::from).collect())
}
