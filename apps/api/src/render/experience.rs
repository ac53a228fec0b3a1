//! Work-experience section: decorated title, then one block per entry with a
//! floating period badge beside the employer name.

use crate::docx::{Alignment, Document, Paragraph};
use crate::models::cv::{Experience, TextOrLines};
use crate::render::floating::{make_badge, DrawingIds};
use crate::render::sections::{body_paragraph, body_style, dash_item, labelled_item, present, rule};
use crate::render::style::{
    set_alignment, set_indent, set_spacing, styled, RunStyle, LINE_SINGLE,
};
use crate::render::theme::{
    self, BADGE_LINE_INDENT, BASE_SIZE_PT, EXPERIENCE_INDENT, EXPERIENCE_ITEM_INDENT, RED, TITLE,
};

pub fn build_experiences(doc: &mut Document, experiences: &[Experience], ids: &mut DrawingIds) {
    if experiences.is_empty() {
        return;
    }

    doc.push_paragraph(rule(10.0, 0.0));
    let mut title = Paragraph::new();
    set_alignment(&mut title, Alignment::Center);
    set_spacing(&mut title, 4.0, 4.0, LINE_SINGLE);
    title.push_run(styled(
        &theme::EXPERIENCES.to_uppercase(),
        &RunStyle::sized(12.0).bold().color(TITLE),
    ));
    doc.push_paragraph(title);
    doc.push_paragraph(rule(0.0, 8.0));

    for experience in experiences {
        build_entry(doc, experience, ids);
    }
}

/// Employer line with the period badge floated to its left.
fn badge_line(period: &str, employer: &str, ids: &mut DrawingIds) -> Paragraph {
    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Left);
    set_spacing(&mut p, 10.0, 2.0, LINE_SINGLE);
    set_indent(&mut p, Some(BADGE_LINE_INDENT));

    if !period.is_empty() {
        p.push_run(make_badge(period, ids.next_id()).into_run());
    }
    if !employer.is_empty() {
        p.push_run(styled(
            &employer.to_uppercase(),
            &RunStyle::sized(BASE_SIZE_PT).bold().color(RED),
        ));
    }
    p
}

fn centered_bold(text: &str) -> Paragraph {
    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Center);
    set_spacing(&mut p, 0.0, 0.0, LINE_SINGLE);
    p.push_run(styled(text, &body_style().bold()));
    p
}

fn label(text: &str) -> Paragraph {
    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Justify);
    set_spacing(&mut p, 6.0, 0.0, LINE_SINGLE);
    set_indent(&mut p, Some(EXPERIENCE_INDENT));
    p.push_run(styled(text, &body_style().bold()));
    p
}

fn push_list(doc: &mut Document, title: &str, items: &[String]) {
    let items = present(items);
    if items.is_empty() {
        return;
    }
    doc.push_paragraph(label(title));
    for item in items {
        doc.push_paragraph(dash_item(item, EXPERIENCE_ITEM_INDENT));
    }
}

fn build_entry(doc: &mut Document, exp: &Experience, ids: &mut DrawingIds) {
    let period = exp.period.trim();
    let employer = exp.employer.trim();
    if !period.is_empty() || !employer.is_empty() {
        doc.push_paragraph(badge_line(period, employer, ids));
    }

    let job_title = exp.job_title.trim();
    if !job_title.is_empty() {
        doc.push_paragraph(centered_bold(job_title));
    }
    let department = exp.department.trim();
    if !department.is_empty() {
        doc.push_paragraph(centered_bold(department));
    }

    match &exp.context {
        TextOrLines::Text(_) if !exp.context.is_blank() => {
            doc.push_paragraph(label(theme::LABEL_CONTEXT));
            for line in exp.context.lines() {
                doc.push_paragraph(body_paragraph(line, EXPERIENCE_INDENT));
            }
        }
        TextOrLines::Lines(lines) => push_list(doc, theme::LABEL_CONTEXT, lines),
        TextOrLines::Text(_) => {}
    }

    push_list(doc, theme::LABEL_OBJECTIVES, &exp.objectives);

    let achievements = present(exp.achievement_items());
    if !achievements.is_empty() {
        doc.push_paragraph(label(theme::LABEL_ACHIEVEMENTS));
        for item in achievements {
            doc.push_paragraph(labelled_item(item, EXPERIENCE_ITEM_INDENT));
        }
    }

    push_list(doc, theme::LABEL_RESULTS, &exp.results);

    let environment = exp.environment.lines();
    if !environment.is_empty() {
        doc.push_paragraph(label(theme::LABEL_ENVIRONMENT));
        doc.push_paragraph(body_paragraph(&environment.join(", "), EXPERIENCE_INDENT));
    }

    let mut spacer = Paragraph::new();
    set_spacing(&mut spacer, 0.0, 6.0, LINE_SINGLE);
    doc.push_paragraph(spacer);
}
