//! Simple list sections and the paragraph shapes every builder shares.
//!
//! Each `build_*` function appends to the body and returns nothing. A section
//! whose data holds nothing printable is skipped entirely, title included.

use crate::docx::{Alignment, Document, Paragraph};
use crate::models::cv::{Education, Reference, TextOrLines};
use crate::render::style::{
    set_alignment, set_border, set_indent, set_spacing, styled, Border, RunStyle, LINE_SINGLE,
};
use crate::render::theme::{
    self, BASE_SIZE_PT, BLACK, DASH, LIST_INDENT, RED, RULE, RULE_SIZE, SECTION_INDENT,
    TITLE_RULE_SIZE,
};

// ────────────────────────────────────────────────────────────────────────────
// Shared paragraph shapes
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn body_style() -> RunStyle {
    RunStyle::sized(BASE_SIZE_PT).color(BLACK)
}

/// Upper-cased bold title over a thin rule.
pub(crate) fn section_title(title: &str) -> Paragraph {
    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Justify);
    set_spacing(&mut p, 8.0, 2.0, LINE_SINGLE);
    set_indent(&mut p, Some(SECTION_INDENT));
    set_border(&mut p, &Border::bottom(None, TITLE_RULE_SIZE));
    p.push_run(styled(&title.to_uppercase(), &body_style().bold()));
    p
}

/// Empty paragraph drawing a dark horizontal rule.
pub(crate) fn rule(before_pt: f32, after_pt: f32) -> Paragraph {
    let mut p = Paragraph::new();
    set_spacing(&mut p, before_pt, after_pt, LINE_SINGLE);
    set_border(&mut p, &Border::bottom(Some(RULE), RULE_SIZE));
    p
}

/// Justified body text at `indent`.
pub(crate) fn body_paragraph(text: &str, indent: i32) -> Paragraph {
    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Justify);
    set_spacing(&mut p, 0.0, 0.0, LINE_SINGLE);
    set_indent(&mut p, Some(indent));
    p.push_run(styled(text, &body_style()));
    p
}

/// `- text`, unstyled.
pub(crate) fn dash_item(text: &str, indent: i32) -> Paragraph {
    dash_item_styled(text, indent, &body_style())
}

pub(crate) fn dash_item_styled(text: &str, indent: i32, style: &RunStyle) -> Paragraph {
    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Justify);
    set_spacing(&mut p, 0.0, 0.0, LINE_SINGLE);
    set_indent(&mut p, Some(indent));
    p.push_run(styled(&format!("{DASH}{text}"), style));
    p
}

/// `- label: rest` with the label (separator included) in bold.
///
/// The label ends at the first `:` or `–`. Without either separator the whole
/// item is unstyled.
pub(crate) fn labelled_item(text: &str, indent: i32) -> Paragraph {
    let Some((label, rest)) = split_label(text) else {
        return dash_item(text, indent);
    };

    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Justify);
    set_spacing(&mut p, 0.0, 0.0, LINE_SINGLE);
    set_indent(&mut p, Some(indent));
    p.push_run(styled(&format!("{DASH}{label}"), &body_style().bold()));
    if !rest.is_empty() {
        p.push_run(styled(rest, &body_style()));
    }
    p
}

/// Splits right after the first `:` or `–`.
pub(crate) fn split_label(text: &str) -> Option<(&str, &str)> {
    let (index, sep) = text.char_indices().find(|(_, c)| matches!(c, ':' | '–'))?;
    let end = index + sep.len_utf8();
    Some((&text[..end], &text[end..]))
}

/// Trimmed, non-blank entries, in input order.
pub(crate) fn present(items: &[String]) -> Vec<&str> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect()
}

fn dash_list_section(doc: &mut Document, title: &str, items: &[String]) {
    let items = present(items);
    if items.is_empty() {
        return;
    }
    doc.push_paragraph(section_title(title));
    for item in items {
        doc.push_paragraph(dash_item(item, LIST_INDENT));
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

pub fn build_about(doc: &mut Document, about: &TextOrLines) {
    let lines = about.lines();
    if lines.is_empty() {
        return;
    }
    doc.push_paragraph(section_title(theme::ABOUT));

    let last = lines.len() - 1;
    for (i, line) in lines.into_iter().enumerate() {
        let mut p = body_paragraph(line, SECTION_INDENT);
        set_spacing(&mut p, 4.0, if i == last { 8.0 } else { 0.0 }, LINE_SINGLE);
        doc.push_paragraph(p);
    }
}

/// `degree – institution (year)`; missing parts are left out.
pub(crate) fn education_line(entry: &Education) -> String {
    let degree = entry.degree.trim();
    let institution = entry.institution.trim();
    let year = entry.year.trim();

    let mut line = degree.to_string();
    if !institution.is_empty() {
        if !line.is_empty() {
            line.push_str(" – ");
        }
        line.push_str(institution);
    }
    if !year.is_empty() {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&format!("({year})"));
    }
    line
}

pub fn build_education(doc: &mut Document, education: &[Education]) {
    let lines: Vec<String> = education
        .iter()
        .map(education_line)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return;
    }
    doc.push_paragraph(section_title(theme::EDUCATION));
    for line in &lines {
        let mut p = dash_item_styled(line, LIST_INDENT, &body_style().bold());
        set_spacing(&mut p, 4.0, 0.0, LINE_SINGLE);
        doc.push_paragraph(p);
    }
}

pub fn build_certifications(doc: &mut Document, certifications: &[String]) {
    dash_list_section(doc, theme::CERTIFICATIONS, certifications);
}

pub fn build_languages(doc: &mut Document, languages: &[String]) {
    dash_list_section(doc, theme::LANGUAGES, languages);
}

pub fn build_notable_projects(doc: &mut Document, projects: &[String]) {
    dash_list_section(doc, theme::NOTABLE_PROJECTS, projects);
}

pub fn build_other_references(doc: &mut Document, references: &[Reference]) {
    let references: Vec<(&str, &str)> = references
        .iter()
        .map(|r| (r.employer.trim(), r.job_title.trim()))
        .filter(|(employer, title)| !employer.is_empty() || !title.is_empty())
        .collect();
    if references.is_empty() {
        return;
    }
    doc.push_paragraph(section_title(theme::OTHER_REFERENCES));

    for (employer, title) in references {
        let mut p = Paragraph::new();
        set_spacing(&mut p, 0.0, 0.0, LINE_SINGLE);
        set_indent(&mut p, Some(LIST_INDENT));
        if !employer.is_empty() {
            p.push_run(styled(
                &format!("{} : ", employer.to_uppercase()),
                &RunStyle::sized(BASE_SIZE_PT).bold().color(RED),
            ));
        }
        if !title.is_empty() {
            p.push_run(styled(title, &body_style()));
        }
        doc.push_paragraph(p);
    }
}
