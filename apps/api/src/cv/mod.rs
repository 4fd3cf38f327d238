//! CV editing: section schemas, form parsing, reconciliation and the
//! aggregate operations built on them.

pub mod handlers;
pub mod manager;
pub mod reconcile;
pub mod schema;
pub mod submission;
pub mod templates;
