//! Running footer: brand, live "Page X sur Y" fields and the two page-corner
//! decorations, which repeat on every page because the footer does.

use tracing::warn;

use crate::docx::{Alignment, Document, FieldChar, Paragraph, Run, StoryKind};
use crate::render::floating::{anchored_image, AnchorSpec, AxisPosition, DrawingIds, RelativeFrom};
use crate::render::header::top_left_deco;
use crate::render::style::{
    set_alignment, set_border, set_spacing, set_tabs, style_run, styled, Border, RunStyle, TabKind,
    TabStop, LINE_SINGLE,
};
use crate::render::theme::{
    BRAND, DECO_BOTTOM_RIGHT_H_OFFSET, DECO_BOTTOM_RIGHT_WIDTH, FOOTER_CENTER_TAB,
    FOOTER_RIGHT_TAB, GREY, PAGE_HEIGHT_EMU, RULE_SIZE,
};
use crate::render::AssetPaths;

const FOOTER_PT: f32 = 8.0;

fn footer_style() -> RunStyle {
    RunStyle::sized(FOOTER_PT).color(GREY)
}

/// A complex field (`begin`, instruction, `separate`, cached value, `end`).
/// The viewer recomputes the cached value on open and on reflow.
fn field(p: &mut Paragraph, instruction: &str, cached: &str) {
    let style = footer_style();
    let parts = [
        Run::field_char(FieldChar::Begin),
        Run::field_instruction(instruction),
        Run::field_char(FieldChar::Separate),
        Run::text(cached),
        Run::field_char(FieldChar::End),
    ];
    for mut run in parts {
        style_run(&mut run, &style);
        p.push_run(run);
    }
}

/// Clears the footer story and rebuilds it from scratch.
pub fn build_footer(doc: &mut Document, assets: &AssetPaths, ids: &mut DrawingIds) {
    doc.clear_footer();

    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Left);
    set_spacing(&mut p, 0.0, 0.0, LINE_SINGLE);
    set_border(&mut p, &Border::top(None, RULE_SIZE));
    set_tabs(
        &mut p,
        &[
            TabStop {
                kind: TabKind::Center,
                position: FOOTER_CENTER_TAB,
            },
            TabStop {
                kind: TabKind::Right,
                position: FOOTER_RIGHT_TAB,
            },
        ],
    );

    let style = footer_style();
    p.push_run(styled(BRAND, &style));
    p.push_run(styled("\t\tPage ", &style));
    field(&mut p, " PAGE ", "1");
    p.push_run(styled(" sur ", &style));
    field(&mut p, " NUMPAGES ", "1");

    let bottom_right = anchored_image(
        doc,
        StoryKind::Footer,
        &assets.deco_bottom_right,
        DECO_BOTTOM_RIGHT_WIDTH,
        |height| AnchorSpec {
            width: DECO_BOTTOM_RIGHT_WIDTH,
            height,
            horizontal_from: RelativeFrom::Page,
            horizontal: AxisPosition::Offset(DECO_BOTTOM_RIGHT_H_OFFSET),
            vertical_from: RelativeFrom::Page,
            vertical: AxisPosition::Offset(PAGE_HEIGHT_EMU - height),
            behind_text: true,
        },
        ids.next_id(),
    );
    match bottom_right {
        Ok(object) => p.push_run(object.into_run()),
        Err(e) => warn!("Bottom-right decoration skipped: {e}"),
    }
    if let Some(deco) = top_left_deco(doc, StoryKind::Footer, &assets.deco_top_left, ids) {
        p.push_run(deco.into_run());
    }

    doc.footer_mut().push_paragraph(p);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::xml::Element;
    use crate::render::floating::tests::png_bytes;
    use crate::render::sections::tests::blank_doc;

    fn instructions(p: &Paragraph) -> Vec<String> {
        p.runs()
            .iter()
            .flat_map(|r| r.element().children().iter())
            .filter(|c| c.name() == "w:instrText")
            .filter_map(|c| c.text().map(str::to_string))
            .collect()
    }

    fn footer_paragraph(doc: &Document) -> &Paragraph {
        doc.footer().paragraphs().next().unwrap()
    }

    #[test]
    fn test_footer_uses_live_page_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut doc = blank_doc();
        build_footer(&mut doc, &AssetPaths::in_dir(dir.path()), &mut DrawingIds::default());

        let p = footer_paragraph(&doc);
        assert_eq!(instructions(p), vec![" PAGE ", " NUMPAGES "]);
        assert_eq!(p.text(), "MALTEM AFRICA\t\tPage 1 sur 1");
        let tabs = p.properties().unwrap().child("w:tabs").unwrap();
        let positions: Vec<&str> = tabs.children().iter().filter_map(|t| t.attr("w:pos")).collect();
        assert_eq!(positions, vec!["4536", "9026"]);
    }

    #[test]
    fn test_footer_decorations_are_page_relative() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetPaths::in_dir(dir.path());
        std::fs::write(&assets.deco_bottom_right, png_bytes(10, 20)).unwrap();
        std::fs::write(&assets.deco_top_left, png_bytes(10, 20)).unwrap();

        let mut doc = blank_doc();
        let mut ids = DrawingIds::starting_at(40);
        build_footer(&mut doc, &assets, &mut ids);

        assert_eq!(doc.footer().drawing_ids(), vec![40, 41]);
        assert_eq!(doc.footer().relationships().len(), 2);
        let el = footer_paragraph(&doc).to_element();
        let anchors: Vec<&Element> = el
            .descendants()
            .into_iter()
            .filter(|e| e.name() == "wp:anchor")
            .collect();
        for anchor in &anchors {
            for axis in ["wp:positionH", "wp:positionV"] {
                assert_eq!(anchor.child(axis).unwrap().attr("relativeFrom"), Some("page"));
            }
        }
        let bottom = anchors[0]
            .child("wp:positionV")
            .and_then(|v| v.child("wp:posOffset"))
            .and_then(|o| o.text())
            .unwrap();
        assert_eq!(bottom, (PAGE_HEIGHT_EMU - 2 * DECO_BOTTOM_RIGHT_WIDTH).to_string());
    }

    #[test]
    fn test_rebuilding_footer_replaces_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetPaths::in_dir(dir.path());
        let mut doc = blank_doc();
        let mut ids = DrawingIds::default();
        build_footer(&mut doc, &assets, &mut ids);
        build_footer(&mut doc, &assets, &mut ids);
        assert_eq!(doc.footer().blocks().len(), 1);
    }

    #[test]
    fn test_rebuilding_footer_leaves_no_orphan_media() {
        let dir = tempfile::tempdir().unwrap();
        let assets = AssetPaths::in_dir(dir.path());
        std::fs::write(&assets.deco_bottom_right, png_bytes(10, 20)).unwrap();
        std::fs::write(&assets.deco_top_left, png_bytes(10, 20)).unwrap();

        let mut doc = blank_doc();
        let mut ids = DrawingIds::default();
        build_footer(&mut doc, &assets, &mut ids);
        build_footer(&mut doc, &assets, &mut ids);

        assert_eq!(doc.media().len(), 2);
        let targets: Vec<String> = doc
            .footer()
            .relationships()
            .iter()
            .map(|r| r.target.clone())
            .collect();
        for media in doc.media() {
            assert!(targets.contains(&format!("media/{}", media.file_name)));
        }
    }
}
