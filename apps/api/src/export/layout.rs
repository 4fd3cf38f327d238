//! Document layout: turns a loaded CV into an ordered list of styled lines.
//!
//! Layout is independent of the output format. The PDF encoder only decides
//! fonts, colours, wrapping and page breaks for each `LineStyle`.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cv::manager::ResumeAggregate;
use crate::models::section::{SectionKind, SectionRecord};

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LineStyle {
    /// Full name at the top of the document.
    Name,
    /// Contact and links lines under the name.
    Contact,
    SectionHeader,
    /// First line of a record: job title, degree, project name...
    EntryTitle,
    /// Secondary record details: organisation, dates, URLs.
    Meta,
    Body,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentLine {
    pub style: LineStyle,
    pub text: String,
}

impl DocumentLine {
    fn new(style: LineStyle, text: impl Into<String>) -> Self {
        Self {
            style,
            text: text.into(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout
// ────────────────────────────────────────────────────────────────────────────

/// Lays out `aggregate` in export order. Blank optional fields produce no line
/// and sections without records produce no header. References are never exported.
pub fn layout_document(aggregate: &ResumeAggregate) -> Vec<DocumentLine> {
    let mut lines = Vec::new();
    title_block(aggregate, &mut lines);

    let summary = aggregate.resume.professional_summary.trim();
    if !summary.is_empty() {
        lines.push(DocumentLine::new(LineStyle::SectionHeader, "Professional Summary"));
        lines.push(DocumentLine::new(LineStyle::Body, summary));
    }

    record_section(
        &mut lines,
        "Work Experience",
        aggregate.section(SectionKind::Experience),
        experience_lines,
    );
    record_section(
        &mut lines,
        "Education",
        aggregate.section(SectionKind::Education),
        education_lines,
    );
    skills_section(&mut lines, aggregate.section(SectionKind::Skill));
    record_section(
        &mut lines,
        "Projects",
        aggregate.section(SectionKind::Project),
        project_lines,
    );
    record_section(
        &mut lines,
        "Certifications",
        aggregate.section(SectionKind::Certification),
        certification_lines,
    );
    record_section(
        &mut lines,
        "Achievements",
        aggregate.section(SectionKind::Achievement),
        achievement_lines,
    );

    lines
}

/// Display label for a stored skill category.
pub fn skill_category_label(category: &str) -> String {
    match category.trim() {
        "technical" => "Technical Skills".to_string(),
        "soft" => "Soft Skills".to_string(),
        "languages" => "Languages".to_string(),
        "tools" => "Tools & Technologies".to_string(),
        "" => "Other".to_string(),
        other => other.to_string(),
    }
}

fn title_block(aggregate: &ResumeAggregate, lines: &mut Vec<DocumentLine>) {
    let resume = &aggregate.resume;
    if !resume.full_name.trim().is_empty() {
        lines.push(DocumentLine::new(LineStyle::Name, resume.full_name.trim()));
    }

    let contact = join_present(
        &[
            resume.email.as_str(),
            resume.phone.as_str(),
            resume.location.as_str(),
        ],
        " | ",
    );
    if !contact.is_empty() {
        lines.push(DocumentLine::new(LineStyle::Contact, contact));
    }

    let mut links = Vec::new();
    if !resume.linkedin_url.trim().is_empty() {
        links.push("LinkedIn");
    }
    if !resume.github_url.trim().is_empty() {
        links.push("GitHub");
    }
    if !links.is_empty() {
        lines.push(DocumentLine::new(LineStyle::Contact, links.join(" | ")));
    }
}

fn record_section(
    lines: &mut Vec<DocumentLine>,
    header: &str,
    records: &[SectionRecord],
    render: fn(&SectionRecord, &mut Vec<DocumentLine>),
) {
    if records.is_empty() {
        return;
    }
    lines.push(DocumentLine::new(LineStyle::SectionHeader, header));
    for record in records {
        render(record, lines);
    }
}

fn experience_lines(record: &SectionRecord, lines: &mut Vec<DocumentLine>) {
    push_present(lines, LineStyle::EntryTitle, record.get("job_title"));
    push_present(lines, LineStyle::Meta, record.get("company"));
    push_present(
        lines,
        LineStyle::Meta,
        &date_range(record.get("start_date"), record.get("end_date")),
    );
    push_present(lines, LineStyle::Body, record.get("description"));
    push_labelled(lines, LineStyle::Body, "Key achievements", record.get("achievements"));
}

fn education_lines(record: &SectionRecord, lines: &mut Vec<DocumentLine>) {
    let degree = record.get("degree").trim();
    let field = record.get("field_of_study").trim();
    let title = if field.is_empty() {
        degree.to_string()
    } else {
        format!("{degree} in {field}")
    };
    push_present(lines, LineStyle::EntryTitle, &title);
    push_present(lines, LineStyle::Meta, record.get("institution"));
    push_present(
        lines,
        LineStyle::Meta,
        &date_range(record.get("start_date"), record.get("end_date")),
    );
    push_present(lines, LineStyle::Body, record.get("description"));
}

fn project_lines(record: &SectionRecord, lines: &mut Vec<DocumentLine>) {
    push_present(lines, LineStyle::EntryTitle, record.get("name"));
    push_labelled(lines, LineStyle::Meta, "Technologies", record.get("technologies"));
    push_present(
        lines,
        LineStyle::Meta,
        &date_range(record.get("start_date"), record.get("end_date")),
    );
    push_present(lines, LineStyle::Meta, record.get("project_url"));
    push_present(lines, LineStyle::Body, record.get("description"));
}

fn certification_lines(record: &SectionRecord, lines: &mut Vec<DocumentLine>) {
    push_present(lines, LineStyle::EntryTitle, record.get("name"));
    push_present(lines, LineStyle::Meta, record.get("issuing_organization"));

    let mut dates = Vec::new();
    if !record.get("issue_date").trim().is_empty() {
        dates.push(format!("Issued: {}", record.get("issue_date").trim()));
    }
    if !record.get("expiry_date").trim().is_empty() {
        dates.push(format!("Expires: {}", record.get("expiry_date").trim()));
    }
    push_present(lines, LineStyle::Meta, &dates.join(" | "));
    push_present(lines, LineStyle::Meta, record.get("credential_url"));
}

fn achievement_lines(record: &SectionRecord, lines: &mut Vec<DocumentLine>) {
    push_present(lines, LineStyle::EntryTitle, record.get("title"));
    push_present(
        lines,
        LineStyle::Meta,
        &join_present(&[record.get("issuing_organization"), record.get("date")], " | "),
    );
    push_present(lines, LineStyle::Body, record.get("description"));
}

/// Skills render as one line per category group: `"{label}: a, b, c"`.
fn skills_section(lines: &mut Vec<DocumentLine>, skills: &[SectionRecord]) {
    if skills.is_empty() {
        return;
    }
    let mut groups: BTreeMap<String, Vec<&str>> = BTreeMap::new();
    for skill in skills {
        let name = skill.get("name").trim();
        if name.is_empty() {
            continue;
        }
        groups
            .entry(skill_category_label(skill.get("category")))
            .or_default()
            .push(name);
    }
    if groups.is_empty() {
        return;
    }

    lines.push(DocumentLine::new(LineStyle::SectionHeader, "Skills"));
    for (label, names) in groups {
        lines.push(DocumentLine::new(
            LineStyle::Body,
            format!("{label}: {}", names.join(", ")),
        ));
    }
}

fn push_present(lines: &mut Vec<DocumentLine>, style: LineStyle, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(DocumentLine::new(style, text));
    }
}

fn push_labelled(lines: &mut Vec<DocumentLine>, style: LineStyle, label: &str, text: &str) {
    let text = text.trim();
    if !text.is_empty() {
        lines.push(DocumentLine::new(style, format!("{label}: {text}")));
    }
}

fn join_present(values: &[&str], separator: &str) -> String {
    values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .collect::<Vec<_>>()
        .join(separator)
}

fn date_range(start: &str, end: &str) -> String {
    join_present(&[start, end], " - ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::NewResume;
    use crate::models::section::SectionFields;
    use chrono::Utc;
    use uuid::Uuid;

    fn aggregate(new: NewResume) -> ResumeAggregate {
        ResumeAggregate {
            resume: new.into_row(Uuid::new_v4(), Uuid::new_v4(), Utc::now()),
            template: None,
            sections: BTreeMap::new(),
        }
    }

    fn record(kind: SectionKind, pairs: &[(&str, &str)]) -> SectionRecord {
        let fields: SectionFields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        SectionRecord {
            id: Uuid::new_v4(),
            resume_id: Uuid::nil(),
            kind,
            fields,
        }
    }

    fn texts(lines: &[DocumentLine], style: LineStyle) -> Vec<&str> {
        lines
            .iter()
            .filter(|l| l.style == style)
            .map(|l| l.text.as_str())
            .collect()
    }

    #[test]
    fn test_title_block_contact_and_links() {
        let lines = layout_document(&aggregate(NewResume {
            full_name: "Ada Lovelace".into(),
            email: "ada@example.com".into(),
            location: "London".into(),
            github_url: "https://github.com/ada".into(),
            ..NewResume::default()
        }));

        assert_eq!(lines[0], DocumentLine::new(LineStyle::Name, "Ada Lovelace"));
        assert_eq!(
            texts(&lines, LineStyle::Contact),
            vec!["ada@example.com | London", "GitHub"]
        );
    }

    #[test]
    fn test_empty_cv_has_no_headers() {
        let lines = layout_document(&aggregate(NewResume::default()));
        assert!(lines.is_empty());
    }

    #[test]
    fn test_summary_omitted_when_blank() {
        let mut agg = aggregate(NewResume {
            full_name: "Ada".into(),
            professional_summary: "   ".into(),
            ..NewResume::default()
        });
        assert!(texts(&layout_document(&agg), LineStyle::SectionHeader).is_empty());

        agg.resume.professional_summary = "Analytical engine programmer".into();
        let lines = layout_document(&agg);
        assert_eq!(
            texts(&lines, LineStyle::SectionHeader),
            vec!["Professional Summary"]
        );
        assert_eq!(texts(&lines, LineStyle::Body), vec!["Analytical engine programmer"]);
    }

    #[test]
    fn test_section_order_and_references_excluded() {
        let mut agg = aggregate(NewResume {
            professional_summary: "Summary".into(),
            ..NewResume::default()
        });
        agg.sections.insert(
            SectionKind::Reference,
            vec![record(SectionKind::Reference, &[("name", "Charles Babbage")])],
        );
        agg.sections.insert(
            SectionKind::Achievement,
            vec![record(SectionKind::Achievement, &[("title", "First program")])],
        );
        agg.sections.insert(
            SectionKind::Experience,
            vec![record(
                SectionKind::Experience,
                &[("job_title", "Engineer"), ("company", "Acme")],
            )],
        );
        agg.sections.insert(
            SectionKind::Skill,
            vec![record(SectionKind::Skill, &[("name", "Rust")])],
        );

        let lines = layout_document(&agg);
        assert_eq!(
            texts(&lines, LineStyle::SectionHeader),
            vec!["Professional Summary", "Work Experience", "Skills", "Achievements"]
        );
        assert!(!lines.iter().any(|l| l.text.contains("Babbage")));
    }

    #[test]
    fn test_blank_optional_fields_are_omitted() {
        let mut agg = aggregate(NewResume::default());
        agg.sections.insert(
            SectionKind::Experience,
            vec![record(
                SectionKind::Experience,
                &[
                    ("job_title", "Engineer"),
                    ("company", "Acme"),
                    ("start_date", "Jan 2020"),
                    ("end_date", ""),
                    ("description", " "),
                ],
            )],
        );

        let lines = layout_document(&agg);
        assert_eq!(
            lines,
            vec![
                DocumentLine::new(LineStyle::SectionHeader, "Work Experience"),
                DocumentLine::new(LineStyle::EntryTitle, "Engineer"),
                DocumentLine::new(LineStyle::Meta, "Acme"),
                DocumentLine::new(LineStyle::Meta, "Jan 2020"),
            ]
        );
    }

    #[test]
    fn test_skills_grouped_by_label() {
        let mut agg = aggregate(NewResume::default());
        agg.sections.insert(
            SectionKind::Skill,
            vec![
                record(SectionKind::Skill, &[("name", "Rust"), ("category", "technical")]),
                record(SectionKind::Skill, &[("name", "Mentoring"), ("category", "soft")]),
                record(SectionKind::Skill, &[("name", "Go"), ("category", "technical")]),
                record(SectionKind::Skill, &[("name", "Juggling"), ("category", "")]),
                record(SectionKind::Skill, &[("name", "Docker"), ("category", "tools")]),
            ],
        );

        let lines = layout_document(&agg);
        assert_eq!(
            texts(&lines, LineStyle::Body),
            vec![
                "Other: Juggling",
                "Soft Skills: Mentoring",
                "Technical Skills: Rust, Go",
                "Tools & Technologies: Docker",
            ]
        );
    }

    #[test]
    fn test_education_title_and_certification_dates() {
        let mut agg = aggregate(NewResume::default());
        agg.sections.insert(
            SectionKind::Education,
            vec![record(
                SectionKind::Education,
                &[
                    ("institution", "MIT"),
                    ("degree", "BSc"),
                    ("field_of_study", "Mathematics"),
                ],
            )],
        );
        agg.sections.insert(
            SectionKind::Certification,
            vec![record(
                SectionKind::Certification,
                &[
                    ("name", "CKA"),
                    ("issuing_organization", "CNCF"),
                    ("expiry_date", "2027"),
                ],
            )],
        );

        let lines = layout_document(&agg);
        assert_eq!(
            texts(&lines, LineStyle::EntryTitle),
            vec!["BSc in Mathematics", "CKA"]
        );
        assert!(texts(&lines, LineStyle::Meta).contains(&"Expires: 2027"));
    }
}
