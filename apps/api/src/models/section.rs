use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Field name → value for one section record. Every schema field is present,
/// possibly as an empty string.
pub type SectionFields = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Experience,
    Education,
    Skill,
    Project,
    Certification,
    Achievement,
    Reference,
}

impl SectionKind {
    pub const ALL: [SectionKind; 7] = [
        SectionKind::Experience,
        SectionKind::Education,
        SectionKind::Skill,
        SectionKind::Project,
        SectionKind::Certification,
        SectionKind::Achievement,
        SectionKind::Reference,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKind::Experience => "experience",
            SectionKind::Education => "education",
            SectionKind::Skill => "skill",
            SectionKind::Project => "project",
            SectionKind::Certification => "certification",
            SectionKind::Achievement => "achievement",
            SectionKind::Reference => "reference",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SectionKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown section kind '{s}'"))
    }
}

/// A stored child record of a CV. Order within a section is the store's
/// insertion order; there is no position column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub kind: SectionKind,
    pub fields: SectionFields,
}

impl SectionRecord {
    /// Value of `field`, or "" when the record does not carry it.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map(String::as_str).unwrap_or("")
    }
}

/// Raw `section_entries` row as read by sqlx.
#[derive(Debug, Clone, FromRow)]
pub struct SectionEntryRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub section: String,
    pub data: Json<SectionFields>,
}

impl TryFrom<SectionEntryRow> for SectionRecord {
    type Error = String;

    fn try_from(row: SectionEntryRow) -> Result<Self, Self::Error> {
        Ok(SectionRecord {
            id: row.id,
            resume_id: row.resume_id,
            kind: row.section.parse()?,
            fields: row.data.0,
        })
    }
}
