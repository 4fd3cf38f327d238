//! Section reconciliation: synchronises submitted rows with a CV's stored
//! section records.
//!
//! # Matching
//! - **Positional** (no `{prefix}_id` column submitted): row `i` maps to the
//!   `i`-th stored record. Extra rows are appended; stored records at
//!   positions `>= L` are deleted whatever their content.
//! - **By identifier** (`{prefix}_id` submitted): a row carrying the id of a
//!   stored record maps to that record, a row with an empty or unknown id is
//!   appended, and stored records no submitted row names are deleted.
//!
//! In both modes a row missing any required field is skipped: nothing is
//! created or updated for it, and a record it maps to is left as is.
//! Updates overwrite every schema field, blanks included. Records are never
//! reordered.
//!
//! Planning is pure; `apply_plan` executes a plan inside the caller's transaction.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::cv::schema::SectionSchema;
use crate::cv::submission::FieldArrayBundle;
use crate::models::section::{SectionFields, SectionKind, SectionRecord};
use crate::store::{StoreResult, StoreTx};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    /// Existing records carrying their new field values.
    pub updates: Vec<SectionRecord>,
    /// New records, in submission order.
    pub creates: Vec<SectionFields>,
    pub deletes: Vec<SectionRecord>,
    /// Submitted row indices left out for missing required fields.
    pub skipped: Vec<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    pub updated: usize,
    pub created: usize,
    pub deleted: usize,
    pub skipped: usize,
}

pub fn plan_reconciliation(
    bundle: &FieldArrayBundle,
    schema: &SectionSchema,
    existing: &[SectionRecord],
) -> ReconcilePlan {
    match &bundle.row_ids {
        Some(row_ids) => plan_by_identifier(bundle, schema, existing, row_ids),
        None => plan_positional(bundle, schema, existing),
    }
}

fn plan_positional(
    bundle: &FieldArrayBundle,
    schema: &SectionSchema,
    existing: &[SectionRecord],
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();

    for i in 0..bundle.len {
        if !bundle.is_complete(schema, i) {
            plan.skipped.push(i);
            continue;
        }
        let fields = bundle.row(schema, i);
        match existing.get(i) {
            Some(record) => plan.updates.push(SectionRecord {
                fields,
                ..record.clone()
            }),
            None => plan.creates.push(fields),
        }
    }

    if bundle.len < existing.len() {
        plan.deletes = existing[bundle.len..].to_vec();
    }
    plan
}

fn plan_by_identifier(
    bundle: &FieldArrayBundle,
    schema: &SectionSchema,
    existing: &[SectionRecord],
    row_ids: &[String],
) -> ReconcilePlan {
    let mut plan = ReconcilePlan::default();
    let mut claimed: HashSet<Uuid> = HashSet::new();

    for (i, raw_id) in row_ids.iter().enumerate().take(bundle.len) {
        // A row may name each stored record once; repeats and strangers are new rows.
        let matched = Uuid::parse_str(raw_id.trim())
            .ok()
            .filter(|id| !claimed.contains(id))
            .and_then(|id| existing.iter().find(|record| record.id == id));
        if let Some(record) = matched {
            claimed.insert(record.id);
        }

        if !bundle.is_complete(schema, i) {
            plan.skipped.push(i);
            continue;
        }
        let fields = bundle.row(schema, i);
        match matched {
            Some(record) => plan.updates.push(SectionRecord {
                fields,
                ..record.clone()
            }),
            None => plan.creates.push(fields),
        }
    }

    plan.deletes = existing
        .iter()
        .filter(|record| !claimed.contains(&record.id))
        .cloned()
        .collect();
    plan
}

/// Executes `plan` for one section of `resume_id`. Updates run first, then
/// appends in submission order, then deletions.
pub async fn apply_plan(
    tx: &mut dyn StoreTx,
    resume_id: Uuid,
    kind: SectionKind,
    plan: ReconcilePlan,
) -> StoreResult<ReconcileReport> {
    let report = ReconcileReport {
        updated: plan.updates.len(),
        created: plan.creates.len(),
        deleted: plan.deletes.len(),
        skipped: plan.skipped.len(),
    };

    for record in &plan.updates {
        tx.save_child(record).await?;
    }
    for fields in plan.creates {
        tx.create_child(resume_id, kind, fields).await?;
    }
    for record in &plan.deletes {
        tx.delete_child(record).await?;
    }

    debug!(
        "Reconciled {kind} for resume {resume_id}: {} updated, {} created, {} deleted, {} skipped",
        report.updated, report.created, report.deleted, report.skipped
    );
    Ok(report)
}

/// Loads the section's stored records, plans against them and applies the plan.
pub async fn reconcile_section(
    tx: &mut dyn StoreTx,
    resume_id: Uuid,
    schema: &SectionSchema,
    bundle: &FieldArrayBundle,
) -> StoreResult<ReconcileReport> {
    let existing = tx.list_children(resume_id, schema.kind).await?;
    let plan = plan_reconciliation(bundle, schema, &existing);
    apply_plan(tx, resume_id, schema.kind, plan).await
}
