//! Primitive styling layer.
//!
//! These functions decorate paragraphs, runs, tables and cells that already
//! exist; they never create blocks. They are the only place in the renderer
//! that edits property elements (`w:pPr`, `w:rPr`, `w:tblPr`, `w:tcPr`).

use crate::docx::document::{PPR_ORDER, RPR_ORDER, TBLPR_ORDER, TCPR_ORDER};
use crate::docx::units::{pt_to_half_points, pt_to_twips};
use crate::docx::xml::Element;
use crate::docx::{Alignment, Paragraph, Run, Table, TableCell};
use crate::render::theme::{Rgb, BASE_SIZE_PT, FONT};

/// Single line spacing in `w:line` units (240ths of a line).
pub const LINE_SINGLE: u32 = 240;

/// Full typographic description of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunStyle {
    pub size_pt: f32,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Option<Rgb>,
    pub font: &'static str,
}

impl Default for RunStyle {
    fn default() -> Self {
        Self::sized(BASE_SIZE_PT)
    }
}

impl RunStyle {
    pub fn sized(size_pt: f32) -> Self {
        Self {
            size_pt,
            bold: false,
            italic: false,
            underline: false,
            color: None,
            font: FONT,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn underline(mut self) -> Self {
        self.underline = true;
        self
    }

    pub fn color(mut self, color: Rgb) -> Self {
        self.color = Some(color);
        self
    }
}

/// Replaces the run's properties with exactly `style`.
///
/// The font family is written to all four font slots (ascii, hAnsi, eastAsia,
/// cs) so a viewer cannot substitute another face for any script.
pub fn style_run(run: &mut Run, style: &RunStyle) {
    run.remove_properties();
    let props = run.properties_mut();

    props.insert_ordered(
        Element::new("w:rFonts")
            .with_attr("w:ascii", style.font)
            .with_attr("w:hAnsi", style.font)
            .with_attr("w:eastAsia", style.font)
            .with_attr("w:cs", style.font),
        RPR_ORDER,
    );
    if style.bold {
        props.insert_ordered(Element::new("w:b"), RPR_ORDER);
        props.insert_ordered(Element::new("w:bCs"), RPR_ORDER);
    }
    if style.italic {
        props.insert_ordered(Element::new("w:i"), RPR_ORDER);
        props.insert_ordered(Element::new("w:iCs"), RPR_ORDER);
    }
    if let Some(color) = style.color {
        props.insert_ordered(
            Element::new("w:color").with_attr("w:val", color.hex()),
            RPR_ORDER,
        );
    }
    let size = pt_to_half_points(style.size_pt);
    props.insert_ordered(Element::new("w:sz").with_attr("w:val", size), RPR_ORDER);
    props.insert_ordered(Element::new("w:szCs").with_attr("w:val", size), RPR_ORDER);
    if style.underline {
        props.insert_ordered(Element::new("w:u").with_attr("w:val", "single"), RPR_ORDER);
    }
}

/// A text run carrying `style`.
pub fn styled(text: &str, style: &RunStyle) -> Run {
    let mut run = Run::text(text);
    style_run(&mut run, style);
    run
}

/// Sets spacing before/after (points) and the line height (240ths, auto rule).
pub fn set_spacing(p: &mut Paragraph, before_pt: f32, after_pt: f32, line: u32) {
    let spacing = p.properties_mut().get_or_insert_ordered("w:spacing", PPR_ORDER);
    spacing.set_attr("w:before", pt_to_twips(before_pt));
    spacing.set_attr("w:after", pt_to_twips(after_pt));
    spacing.set_attr("w:line", line);
    spacing.set_attr("w:lineRule", "auto");
}

/// Sets the left indent in twips, or removes it with `None`.
///
/// Clearing removes the attribute itself (and the `w:ind` element once it is
/// empty) rather than writing a zero.
pub fn set_indent(p: &mut Paragraph, left: Option<i32>) {
    let props = p.properties_mut();
    match left {
        Some(left) => {
            props
                .get_or_insert_ordered("w:ind", PPR_ORDER)
                .set_attr("w:left", left);
        }
        None => {
            let now_empty = match props.child_mut("w:ind") {
                Some(ind) => {
                    ind.remove_attr("w:left");
                    !ind.has_attrs()
                }
                None => false,
            };
            if now_empty {
                props.remove_children("w:ind");
            }
        }
    }
}

pub fn set_alignment(p: &mut Paragraph, alignment: Alignment) {
    p.properties_mut()
        .get_or_insert_ordered("w:jc", PPR_ORDER)
        .set_attr("w:val", alignment.as_val());
}

/// Paragraph rule(s). `color: None` lets the viewer pick (`auto`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub top: bool,
    pub bottom: bool,
    pub color: Option<Rgb>,
    /// Eighths of a point.
    pub size: u32,
}

impl Border {
    pub fn bottom(color: Option<Rgb>, size: u32) -> Self {
        Self {
            top: false,
            bottom: true,
            color,
            size,
        }
    }

    pub fn top(color: Option<Rgb>, size: u32) -> Self {
        Self {
            top: true,
            bottom: false,
            color,
            size,
        }
    }
}

/// Replaces the paragraph's border block wholesale.
///
/// Every existing `w:pBdr` is purged before the new one goes in, so calling
/// this repeatedly never stacks duplicate border declarations.
pub fn set_border(p: &mut Paragraph, border: &Border) {
    let props = p.properties_mut();
    props.remove_children("w:pBdr");
    if !border.top && !border.bottom {
        return;
    }

    let color = border.color.map_or_else(|| "auto".to_string(), Rgb::hex);
    let side = |name: &str| {
        Element::new(name)
            .with_attr("w:val", "single")
            .with_attr("w:sz", border.size)
            .with_attr("w:space", 1)
            .with_attr("w:color", &color)
    };
    let mut block = Element::new("w:pBdr");
    if border.top {
        block.push(side("w:top"));
    }
    if border.bottom {
        block.push(side("w:bottom"));
    }
    props.insert_ordered(block, PPR_ORDER);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabKind {
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TabStop {
    pub kind: TabKind,
    /// Twips from the left margin.
    pub position: i32,
}

/// Replaces the paragraph's tab stops.
pub fn set_tabs(p: &mut Paragraph, stops: &[TabStop]) {
    let props = p.properties_mut();
    props.remove_children("w:tabs");
    if stops.is_empty() {
        return;
    }
    let mut tabs = Element::new("w:tabs");
    for stop in stops {
        let kind = match stop.kind {
            TabKind::Center => "center",
            TabKind::Right => "right",
        };
        tabs.push(
            Element::new("w:tab")
                .with_attr("w:val", kind)
                .with_attr("w:pos", stop.position),
        );
    }
    props.insert_ordered(tabs, PPR_ORDER);
}

fn nil_borders(name: &str, sides: &[&str]) -> Element {
    let mut block = Element::new(name);
    for side in sides {
        block.push(Element::new(*side).with_attr("w:val", "nil"));
    }
    block
}

/// Explicitly disables every table border, including inner grid lines.
pub fn clear_table_borders(table: &mut Table) {
    let props = table.properties_mut();
    props.remove_children("w:tblBorders");
    props.insert_ordered(
        nil_borders(
            "w:tblBorders",
            &["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"],
        ),
        TBLPR_ORDER,
    );
}

/// Explicitly disables every border of one cell.
pub fn clear_cell_borders(cell: &mut TableCell) {
    let props = cell.properties_mut();
    props.remove_children("w:tcBorders");
    props.insert_ordered(
        nil_borders("w:tcBorders", &["w:top", "w:left", "w:bottom", "w:right"]),
        TCPR_ORDER,
    );
}
