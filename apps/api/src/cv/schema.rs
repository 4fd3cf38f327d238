//! Declarative description of the seven CV sections: form prefix, field list
//! (in display order) and the fields a row must carry to be kept.

use crate::models::section::SectionKind;

#[derive(Debug)]
pub struct SectionSchema {
    pub kind: SectionKind,
    /// Submission keys are `{prefix}_{field}`.
    pub prefix: &'static str,
    pub fields: &'static [&'static str],
    pub required: &'static [&'static str],
}

impl SectionSchema {
    pub fn form_key(&self, field: &str) -> String {
        format!("{}_{}", self.prefix, field)
    }

    /// Key of the optional row-identifier column.
    pub fn id_key(&self) -> String {
        self.form_key("id")
    }
}

static SCHEMAS: [SectionSchema; 7] = [
    SectionSchema {
        kind: SectionKind::Experience,
        prefix: "experience",
        fields: &[
            "job_title",
            "company",
            "start_date",
            "end_date",
            "description",
            "achievements",
        ],
        required: &["job_title", "company"],
    },
    SectionSchema {
        kind: SectionKind::Education,
        prefix: "education",
        fields: &[
            "institution",
            "degree",
            "field_of_study",
            "start_date",
            "end_date",
            "description",
        ],
        required: &["institution", "degree"],
    },
    SectionSchema {
        kind: SectionKind::Skill,
        prefix: "skill",
        fields: &["name", "category"],
        required: &["name"],
    },
    SectionSchema {
        kind: SectionKind::Project,
        prefix: "project",
        fields: &[
            "name",
            "description",
            "technologies",
            "project_url",
            "start_date",
            "end_date",
        ],
        required: &["name"],
    },
    SectionSchema {
        kind: SectionKind::Certification,
        prefix: "certification",
        fields: &[
            "name",
            "issuing_organization",
            "issue_date",
            "expiry_date",
            "credential_url",
        ],
        required: &["name", "issuing_organization"],
    },
    SectionSchema {
        kind: SectionKind::Achievement,
        prefix: "achievement",
        fields: &["title", "issuing_organization", "date", "description"],
        required: &["title"],
    },
    SectionSchema {
        kind: SectionKind::Reference,
        prefix: "reference",
        fields: &["name", "position", "company", "email", "phone", "relationship"],
        required: &["name"],
    },
];

pub fn all_schemas() -> &'static [SectionSchema] {
    &SCHEMAS
}

pub fn schema_for(kind: SectionKind) -> &'static SectionSchema {
    // SCHEMAS is declared in SectionKind::ALL order.
    &SCHEMAS[kind as usize]
}
