use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,

    // Contact
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin_url: String,
    pub github_url: String,

    // Personal details
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub nationality: String,
    pub languages: String,
    pub marital_status: String,
    pub additional_info: String,

    pub professional_summary: String,
    pub template_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every CV column the caller controls. Used both for fresh CVs and for
/// duplicates, which copy all of these verbatim apart from the title.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewResume {
    pub title: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin_url: String,
    pub github_url: String,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub nationality: String,
    pub languages: String,
    pub marital_status: String,
    pub additional_info: String,
    pub professional_summary: String,
    pub template_id: Option<i32>,
}

impl NewResume {
    /// Copy of `source`'s scalar fields under a new title.
    pub fn copy_of(source: &ResumeRow, title: String) -> Self {
        NewResume {
            title,
            full_name: source.full_name.clone(),
            email: source.email.clone(),
            phone: source.phone.clone(),
            location: source.location.clone(),
            linkedin_url: source.linkedin_url.clone(),
            github_url: source.github_url.clone(),
            date_of_birth: source.date_of_birth,
            gender: source.gender.clone(),
            nationality: source.nationality.clone(),
            languages: source.languages.clone(),
            marital_status: source.marital_status.clone(),
            additional_info: source.additional_info.clone(),
            professional_summary: source.professional_summary.clone(),
            template_id: source.template_id,
        }
    }

    pub fn into_row(self, id: Uuid, owner_id: Uuid, now: DateTime<Utc>) -> ResumeRow {
        ResumeRow {
            id,
            owner_id,
            title: self.title,
            full_name: self.full_name,
            email: self.email,
            phone: self.phone,
            location: self.location,
            linkedin_url: self.linkedin_url,
            github_url: self.github_url,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            nationality: self.nationality,
            languages: self.languages,
            marital_status: self.marital_status,
            additional_info: self.additional_info,
            professional_summary: self.professional_summary,
            template_id: self.template_id,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Lightweight listing entry for the owner's dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub title: String,
    pub full_name: String,
    pub template_id: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&ResumeRow> for ResumeSummary {
    fn from(row: &ResumeRow) -> Self {
        ResumeSummary {
            id: row.id,
            title: row.title.clone(),
            full_name: row.full_name.clone(),
            template_id: row.template_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
