//! Submission parsing: turns a raw edit submission into per-section
//! field-array bundles and the scalar CV fields.
//!
//! A submission maps a field name to one value or to a position-ordered list
//! of values. Section fields are keyed `{prefix}_{field}`; each list holds one
//! entry per row the editor presented. Nothing is trimmed here; JSON numbers
//! and booleans become their text and absent values become empty strings.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::cv::schema::SectionSchema;
use crate::models::section::{SectionFields, SectionKind};

/// Numbers and booleans are read as their JSON text; `null` inside a list
/// reads as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(String),
    List(Vec<String>),
}

impl FieldValue {
    fn as_list(&self) -> Vec<String> {
        match self {
            FieldValue::Single(value) => vec![value.clone()],
            FieldValue::List(values) => values.clone(),
        }
    }

    /// Scalar reading: a list yields its last element, as an HTML form would.
    fn as_scalar(&self) -> String {
        match self {
            FieldValue::Single(value) => value.clone(),
            FieldValue::List(values) => values.last().cloned().unwrap_or_default(),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .map(field_text)
                .collect::<Result<Vec<_>, _>>()
                .map(FieldValue::List)
                .map_err(de::Error::custom),
            other => field_text(other)
                .map(FieldValue::Single)
                .map_err(de::Error::custom),
        }
    }
}

fn field_text(value: Value) -> Result<String, &'static str> {
    match value {
        Value::String(text) => Ok(text),
        Value::Number(number) => Ok(number.to_string()),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Null => Ok(String::new()),
        Value::Array(_) | Value::Object(_) => {
            Err("expected a string, number, boolean or a flat list of them")
        }
    }
}

/// A top-level `null` counts as an absent field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RawSubmission(pub BTreeMap<String, FieldValue>);

impl<'de> Deserialize<'de> for RawSubmission {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fields = BTreeMap::<String, Option<FieldValue>>::deserialize(deserializer)?;
        Ok(RawSubmission(
            fields
                .into_iter()
                .filter_map(|(key, value)| value.map(|value| (key, value)))
                .collect(),
        ))
    }
}

impl RawSubmission {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }

    pub fn scalar(&self, key: &str) -> String {
        self.get(key).map(FieldValue::as_scalar).unwrap_or_default()
    }

    #[cfg(test)]
    pub fn set(&mut self, key: impl Into<String>, value: FieldValue) {
        self.0.insert(key.into(), value);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("{section}: field '{field}' has {found} rows, expected {expected}")]
    RaggedSection {
        section: SectionKind,
        field: String,
        expected: usize,
        found: usize,
    },
}

/// Parallel field arrays for one section: `len` candidate rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldArrayBundle {
    pub kind: SectionKind,
    pub len: usize,
    pub columns: BTreeMap<&'static str, Vec<String>>,
    /// Row identifiers, present only when the editor round-trips them.
    /// An empty string marks a row added in the editor.
    pub row_ids: Option<Vec<String>>,
}

impl FieldArrayBundle {
    pub fn value(&self, field: &str, row: usize) -> &str {
        self.columns
            .get(field)
            .and_then(|column| column.get(row))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// All schema fields of `row`, ready to store.
    pub fn row(&self, schema: &SectionSchema, row: usize) -> SectionFields {
        schema
            .fields
            .iter()
            .map(|field| (field.to_string(), self.value(field, row).to_string()))
            .collect()
    }

    /// A row is complete when every required field is non-empty.
    pub fn is_complete(&self, schema: &SectionSchema, row: usize) -> bool {
        schema
            .required
            .iter()
            .all(|field| !self.value(field, row).is_empty())
    }
}

/// Extracts one section's bundle. All present arrays must share a length;
/// absent fields are filled with that many empty strings.
pub fn parse_section(
    submission: &RawSubmission,
    schema: &SectionSchema,
) -> Result<FieldArrayBundle, SubmissionError> {
    let mut present: Vec<(&'static str, Vec<String>)> = Vec::new();
    for field in schema.fields {
        if let Some(value) = submission.get(&schema.form_key(field)) {
            present.push((*field, value.as_list()));
        }
    }
    let row_ids = submission.get(&schema.id_key()).map(FieldValue::as_list);

    let len = present
        .first()
        .map(|(_, values)| values.len())
        .or_else(|| row_ids.as_ref().map(Vec::len))
        .unwrap_or(0);

    for (field, values) in &present {
        if values.len() != len {
            return Err(SubmissionError::RaggedSection {
                section: schema.kind,
                field: field.to_string(),
                expected: len,
                found: values.len(),
            });
        }
    }
    if let Some(ids) = &row_ids {
        if ids.len() != len {
            return Err(SubmissionError::RaggedSection {
                section: schema.kind,
                field: "id".to_string(),
                expected: len,
                found: ids.len(),
            });
        }
    }

    let mut columns: BTreeMap<&'static str, Vec<String>> = present.into_iter().collect();
    for field in schema.fields {
        columns
            .entry(*field)
            .or_insert_with(|| vec![String::new(); len]);
    }

    Ok(FieldArrayBundle {
        kind: schema.kind,
        len,
        columns,
        row_ids,
    })
}

/// Scalar CV fields as submitted. Text fields default to "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScalarSubmission {
    pub title: String,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub linkedin_url: String,
    pub github_url: String,
    /// `None` when submitted empty (or unparseable): the date is cleared.
    pub date_of_birth: Option<NaiveDate>,
    pub gender: String,
    pub nationality: String,
    pub languages: String,
    pub marital_status: String,
    pub additional_info: String,
    pub professional_summary: String,
    /// Requested template; `None` when absent or not an integer.
    pub template_id: Option<i32>,
}

pub fn parse_scalars(submission: &RawSubmission) -> ScalarSubmission {
    ScalarSubmission {
        title: submission.scalar("title"),
        full_name: submission.scalar("full_name"),
        email: submission.scalar("email"),
        phone: submission.scalar("phone"),
        location: submission.scalar("location"),
        linkedin_url: submission.scalar("linkedin_url"),
        github_url: submission.scalar("github_url"),
        date_of_birth: parse_optional_date(&submission.scalar("date_of_birth")),
        gender: submission.scalar("gender"),
        nationality: submission.scalar("nationality"),
        languages: submission.scalar("languages"),
        marital_status: submission.scalar("marital_status"),
        additional_info: submission.scalar("additional_info"),
        professional_summary: submission.scalar("professional_summary"),
        template_id: submission.scalar("template_id").trim().parse::<i32>().ok(),
    }
}

fn parse_optional_date(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            warn!("Ignoring unparseable date '{raw}': {e}");
            None
        }
    }
}
