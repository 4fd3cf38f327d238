//! PDF encoding of laid-out CV lines.
//!
//! # Pipeline
//! 1. `paginate` wraps each `DocumentLine` with the font-metric tables and
//!    places the pieces on US-letter pages, breaking at the bottom margin.
//! 2. `encode_pages` writes one content stream per page with lopdf, using the
//!    two Type1 base fonts of the template's family.
//!
//! Both steps are synchronous. Callers on the async runtime go through
//! `tokio::task::spawn_blocking`.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};

use crate::export::font_metrics::FontFamily;
use crate::export::layout::{DocumentLine, LineStyle};
use crate::export::ExportError;
use crate::models::template::TemplateRow;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 54.0;

const LINE_HEIGHT: f32 = 1.3;
const RULE_GAP: f32 = 4.0;

const REGULAR_FONT: &str = "F1";
const BOLD_FONT: &str = "F2";

// ────────────────────────────────────────────────────────────────────────────
// Theme
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb(pub f32, pub f32, pub f32);

impl Rgb {
    pub const TEXT: Rgb = Rgb(0.1, 0.1, 0.1);

    /// Parses `#rrggbb`. Anything else is `None`.
    pub fn from_hex(hex: &str) -> Option<Rgb> {
        let digits = hex.trim().strip_prefix('#')?;
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        Some(Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

/// Fonts and colours taken from the CV's effective template.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfTheme {
    pub font: FontFamily,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub accent: Rgb,
}

impl Default for PdfTheme {
    fn default() -> Self {
        Self {
            font: FontFamily::Helvetica,
            primary: Rgb::TEXT,
            secondary: Rgb(0.4, 0.4, 0.4),
            accent: Rgb::TEXT,
        }
    }
}

impl PdfTheme {
    pub fn from_template(template: Option<&TemplateRow>) -> Self {
        let fallback = Self::default();
        let Some(template) = template else {
            return fallback;
        };
        Self {
            font: FontFamily::from_font_stack(&template.font_family),
            primary: Rgb::from_hex(&template.primary_color).unwrap_or(fallback.primary),
            secondary: Rgb::from_hex(&template.secondary_color).unwrap_or(fallback.secondary),
            accent: Rgb::from_hex(&template.accent_color).unwrap_or(fallback.accent),
        }
    }

    fn style(&self, style: LineStyle) -> TextStyle {
        let (size, bold, space_before, color) = match style {
            LineStyle::Name => (22, true, 0.0, self.primary),
            LineStyle::Contact => (10, false, 2.0, self.secondary),
            LineStyle::SectionHeader => (13, true, 14.0, self.accent),
            LineStyle::EntryTitle => (11, true, 6.0, self.primary),
            LineStyle::Meta => (10, false, 1.0, self.secondary),
            LineStyle::Body => (10, false, 2.0, Rgb::TEXT),
        };
        TextStyle {
            size,
            bold,
            space_before,
            color,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: i64,
    bold: bool,
    space_before: f32,
    color: Rgb,
}

impl TextStyle {
    fn leading(&self) -> f32 {
        self.size as f32 * LINE_HEIGHT
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Text {
        x: f32,
        baseline: f32,
        size: i64,
        bold: bool,
        color: Rgb,
        text: String,
    },
    /// Horizontal rule across the content width.
    Rule { y: f32, color: Rgb },
}

/// Places `lines` onto pages. Always returns at least one page.
pub fn paginate(lines: &[DocumentLine], theme: &PdfTheme) -> Vec<Vec<PageItem>> {
    let metrics = theme.font.metrics();
    let top = PAGE_HEIGHT - MARGIN;
    let content_width = PAGE_WIDTH - 2.0 * MARGIN;

    let mut pages: Vec<Vec<PageItem>> = vec![Vec::new()];
    let mut cursor = top;

    for (index, line) in lines.iter().enumerate() {
        let styled = theme.style(line.style);
        let leading = styled.leading();
        let wrapped = metrics.wrap(&line.text, content_width / styled.size as f32, styled.bold);
        if wrapped.is_empty() {
            continue;
        }

        let is_header = line.style == LineStyle::SectionHeader;
        let mut needed = styled.space_before + leading;
        if is_header {
            // A header never ends a page on its own.
            needed += RULE_GAP
                + lines
                    .get(index + 1)
                    .map(|next| theme.style(next.style).leading())
                    .unwrap_or(0.0);
        }
        if cursor - needed < MARGIN && !current_page_is_empty(&pages) {
            pages.push(Vec::new());
            cursor = top;
        }
        if !current_page_is_empty(&pages) {
            cursor -= styled.space_before;
        }

        for segment in wrapped {
            if cursor - leading < MARGIN && !current_page_is_empty(&pages) {
                pages.push(Vec::new());
                cursor = top;
            }
            let page = current_page(&mut pages);
            page.push(PageItem::Text {
                x: MARGIN,
                baseline: cursor - styled.size as f32,
                size: styled.size,
                bold: styled.bold,
                color: styled.color,
                text: segment,
            });
            cursor -= leading;
        }

        if is_header {
            let y = cursor + (leading - styled.size as f32) / 2.0;
            current_page(&mut pages).push(PageItem::Rule {
                y,
                color: styled.color,
            });
            cursor -= RULE_GAP;
        }
    }

    pages
}

fn current_page_is_empty(pages: &[Vec<PageItem>]) -> bool {
    pages.last().map_or(true, Vec::is_empty)
}

fn current_page(pages: &mut Vec<Vec<PageItem>>) -> &mut Vec<PageItem> {
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    let last = pages.len() - 1;
    &mut pages[last]
}

// ────────────────────────────────────────────────────────────────────────────
// Encoding
// ────────────────────────────────────────────────────────────────────────────

/// Encodes `s` as WinAnsi bytes. Characters outside the encoding become `?`.
pub fn encode_win_ansi(s: &str) -> Vec<u8> {
    s.chars()
        .map(|c| match c {
            '\t' => b' ',
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => c as u32 as u8,
            '€' => 0x80,
            '‚' => 0x82,
            'ƒ' => 0x83,
            '„' => 0x84,
            '…' => 0x85,
            '†' => 0x86,
            '‡' => 0x87,
            'ˆ' => 0x88,
            '‰' => 0x89,
            'Š' => 0x8a,
            '‹' => 0x8b,
            'Œ' => 0x8c,
            'Ž' => 0x8e,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '˜' => 0x98,
            '™' => 0x99,
            'š' => 0x9a,
            '›' => 0x9b,
            'œ' => 0x9c,
            'ž' => 0x9e,
            'Ÿ' => 0x9f,
            _ => b'?',
        })
        .collect()
}

fn coord(v: f32) -> Object {
    Object::Integer(v.round() as i64)
}

fn color_operands(color: Rgb) -> Vec<Object> {
    vec![
        Object::Real(color.0),
        Object::Real(color.1),
        Object::Real(color.2),
    ]
}

fn page_operations(items: &[PageItem]) -> Vec<Operation> {
    let mut ops = Vec::new();
    for item in items {
        match item {
            PageItem::Text {
                x,
                baseline,
                size,
                bold,
                color,
                text,
            } => {
                let font = if *bold { BOLD_FONT } else { REGULAR_FONT };
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![font.into(), Object::Integer(*size)]));
                ops.push(Operation::new("rg", color_operands(*color)));
                ops.push(Operation::new("Td", vec![coord(*x), coord(*baseline)]));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::string_literal(encode_win_ansi(text))],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
            PageItem::Rule { y, color } => {
                ops.push(Operation::new("RG", color_operands(*color)));
                ops.push(Operation::new("w", vec![Object::Real(0.75)]));
                ops.push(Operation::new("m", vec![coord(MARGIN), coord(*y)]));
                ops.push(Operation::new("l", vec![coord(PAGE_WIDTH - MARGIN), coord(*y)]));
                ops.push(Operation::new("S", vec![]));
            }
        }
    }
    ops
}

fn font_object(doc: &mut Document, base_font: &'static str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Writes the paginated items as a complete PDF document.
pub fn encode_pages(
    pages: &[Vec<PageItem>],
    theme: &PdfTheme,
    title: &str,
) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = font_object(&mut doc, theme.font.regular_name());
    let bold_id = font_object(&mut doc, theme.font.bold_name());
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR_FONT => regular_id,
            BOLD_FONT => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for items in pages {
        let content = Content {
            operations: page_operations(items),
        };
        let encoded = content
            .encode()
            .map_err(|e| ExportError::Encode(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![coord(0.0), coord(0.0), coord(PAGE_WIDTH), coord(PAGE_HEIGHT)],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(encode_win_ansi(title)),
        "Producer" => Object::string_literal("cvbuilder"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)
        .map_err(|e| ExportError::Encode(e.to_string()))?;
    Ok(buffer)
}
