//! Identity block at the top of the first page.

use std::path::Path;

use tracing::warn;

use crate::docx::{Alignment, Document, Paragraph, StoryKind};
use crate::models::cv::CvRecord;
use crate::render::floating::{
    anchored_image, make_top_bar, AnchorSpec, AxisPosition, DrawingIds, FloatingObject,
    RelativeFrom,
};
use crate::render::sections::rule;
use crate::render::style::{set_alignment, set_spacing, styled, RunStyle, LINE_SINGLE};
use crate::render::theme::{
    BRAND, DECO_TOP_LEFT_OFFSET, DECO_TOP_LEFT_WIDTH, LOGO_H_OFFSET, LOGO_V_OFFSET, LOGO_WIDTH,
    RED,
};
use crate::render::AssetPaths;

const IDENTITY_PT: f32 = 14.0;

/// Top-left corner decoration, page relative. Shared with the footer.
pub(crate) fn top_left_deco(
    doc: &mut Document,
    story: StoryKind,
    path: &Path,
    ids: &mut DrawingIds,
) -> Option<FloatingObject> {
    let placed = anchored_image(
        doc,
        story,
        path,
        DECO_TOP_LEFT_WIDTH,
        |height| AnchorSpec {
            width: DECO_TOP_LEFT_WIDTH,
            height,
            horizontal_from: RelativeFrom::Page,
            horizontal: AxisPosition::Offset(DECO_TOP_LEFT_OFFSET),
            vertical_from: RelativeFrom::Page,
            vertical: AxisPosition::Offset(DECO_TOP_LEFT_OFFSET),
            behind_text: true,
        },
        ids.next_id(),
    );
    match placed {
        Ok(object) => Some(object),
        Err(e) => {
            warn!("Top-left decoration skipped: {e}");
            None
        }
    }
}

pub fn build_header(doc: &mut Document, cv: &CvRecord, assets: &AssetPaths, ids: &mut DrawingIds) {
    let mut banner = Paragraph::new();
    set_alignment(&mut banner, Alignment::Right);
    set_spacing(&mut banner, 0.0, 0.0, LINE_SINGLE);

    banner.push_run(make_top_bar(ids.next_id()).into_run());

    let logo = anchored_image(
        doc,
        StoryKind::Body,
        &assets.logo,
        LOGO_WIDTH,
        |height| AnchorSpec {
            width: LOGO_WIDTH,
            height,
            horizontal_from: RelativeFrom::Page,
            horizontal: AxisPosition::Offset(LOGO_H_OFFSET),
            vertical_from: RelativeFrom::Page,
            vertical: AxisPosition::Offset(LOGO_V_OFFSET),
            behind_text: false,
        },
        ids.next_id(),
    );
    match logo {
        Ok(object) => banner.push_run(object.into_run()),
        Err(e) => {
            warn!("Logo replaced by brand text: {e}");
            banner.push_run(styled(BRAND, &RunStyle::sized(IDENTITY_PT).bold().color(RED)));
        }
    }

    if let Some(deco) = top_left_deco(doc, StoryKind::Body, &assets.deco_top_left, ids) {
        banner.push_run(deco.into_run());
    }
    doc.push_paragraph(banner);

    doc.push_paragraph(rule(6.0, 4.0));

    let mut name = Paragraph::new();
    set_alignment(&mut name, Alignment::Center);
    set_spacing(&mut name, 4.0, 2.0, LINE_SINGLE);
    let full_name = cv.full_name.trim();
    let years = cv.years_of_experience.trim();
    if !full_name.is_empty() {
        name.push_run(styled(full_name, &RunStyle::sized(IDENTITY_PT)));
    }
    if !years.is_empty() {
        let suffix = if full_name.is_empty() {
            years.to_string()
        } else {
            format!(" – {years}")
        };
        name.push_run(styled(&suffix, &RunStyle::sized(IDENTITY_PT)));
    }
    doc.push_paragraph(name);

    let mut title = Paragraph::new();
    set_alignment(&mut title, Alignment::Center);
    set_spacing(&mut title, 0.0, 4.0, LINE_SINGLE);
    let job_title = cv.job_title.trim();
    if !job_title.is_empty() {
        title.push_run(styled(job_title, &RunStyle::sized(IDENTITY_PT).bold()));
    }
    doc.push_paragraph(title);

    doc.push_paragraph(rule(4.0, 8.0));
}
