use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Template used when a CV has none selected (or references one that is gone).
pub const DEFAULT_TEMPLATE_ID: i32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct TemplateRow {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub primary_color: String,
    pub secondary_color: String,
    pub accent_color: String,
    pub font_family: String,
    pub layout_style: String,
}
