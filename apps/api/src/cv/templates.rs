//! Template catalog: the built-in template set and lookup with default fallback.

use tracing::info;

use crate::models::template::{TemplateRow, DEFAULT_TEMPLATE_ID};
use crate::store::{RecordStore, StoreResult, StoreTx};

/// Built-in templates, seeded at startup.
pub fn default_templates() -> Vec<TemplateRow> {
    let template = |id: i32,
                    name: &str,
                    description: &str,
                    colors: [&str; 3],
                    font_family: &str,
                    layout_style: &str| TemplateRow {
        id,
        name: name.to_string(),
        description: description.to_string(),
        primary_color: colors[0].to_string(),
        secondary_color: colors[1].to_string(),
        accent_color: colors[2].to_string(),
        font_family: font_family.to_string(),
        layout_style: layout_style.to_string(),
    };

    vec![
        template(
            1,
            "Modern Professional",
            "Clean, modern design with balanced sections",
            ["#2c3e50", "#3498db", "#e74c3c"],
            "Arial, sans-serif",
            "modern",
        ),
        template(
            2,
            "Classic Executive",
            "Traditional layout for corporate roles",
            ["#1a1a1a", "#666666", "#8b4513"],
            "Georgia, serif",
            "classic",
        ),
        template(
            3,
            "Creative Portfolio",
            "Modern design for creative professionals",
            ["#2980b9", "#e67e22", "#27ae60"],
            "Helvetica Neue, sans-serif",
            "creative",
        ),
        template(
            4,
            "Minimal Clean",
            "Simple, clean design focused on content",
            ["#333333", "#666666", "#999999"],
            "Arial, sans-serif",
            "minimal",
        ),
    ]
}

/// Inserts any built-in template that is missing. Existing rows are left untouched.
pub async fn seed_default_templates(store: &dyn RecordStore) -> StoreResult<usize> {
    let mut tx = store.begin().await?;
    let mut created = 0;
    for template in default_templates() {
        if tx.insert_template_if_absent(&template).await? {
            info!("Created template: {} (ID: {})", template.name, template.id);
            created += 1;
        }
    }
    tx.commit().await?;
    info!("Template catalog ready ({created} created)");
    Ok(created)
}

/// The template a CV renders with: its selection if that still resolves,
/// otherwise the default template.
pub async fn effective_template(
    tx: &mut dyn StoreTx,
    selected: Option<i32>,
) -> StoreResult<Option<TemplateRow>> {
    if let Some(id) = selected {
        if let Some(template) = tx.get_template(id).await? {
            return Ok(Some(template));
        }
    }
    tx.get_template(DEFAULT_TEMPLATE_ID).await
}
