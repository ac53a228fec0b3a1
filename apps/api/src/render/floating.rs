//! Floating-object layer: anchored drawings positioned against the page,
//! column or paragraph.
//!
//! Images go through two steps: [`embed_image`] stores the bytes as a media
//! part and produces an inline drawing (the only place a relationship id is
//! minted), then [`to_anchor`] builds the floating equivalent from that
//! relationship id. The inline drawing itself is never placed in a story.
//!
//! Every anchor takes its `wp:docPr` id from a [`DrawingIds`] counter owned by
//! the caller. The z-order (`relativeHeight`) is derived from the same id, so
//! later objects stack above earlier ones.

use std::io;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use thiserror::Error;

use crate::docx::units::scale_to_width;
use crate::docx::xml::Element;
use crate::docx::{Alignment, Document, Paragraph, Run, StoryKind};
use crate::render::style::{set_alignment, set_spacing, styled, RunStyle, LINE_SINGLE};
use crate::render::theme::{
    Rgb, BADGE_HEIGHT, BADGE_H_OFFSET, BADGE_V_OFFSET, BADGE_WIDTH,
    PAGE_WIDTH_EMU, RED, TOP_BAR, TOP_BAR_HEIGHT, WHITE,
};

const URI_PICTURE: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";
const URI_SHAPE: &str = "http://schemas.microsoft.com/office/word/2010/wordprocessingShape";

/// Base `relativeHeight` used by Word for the first floating object.
const BASE_RELATIVE_HEIGHT: u64 = 251_658_240;
const RELATIVE_HEIGHT_STEP: u64 = 1024;

const BADGE_CORNER_ADJ: &str = "val 16667";
const BADGE_TEXT_PT: f32 = 8.0;

#[derive(Debug, Error)]
pub enum FloatingError {
    #[error("asset not found: {}", .0.display())]
    MissingAsset(PathBuf),

    #[error("failed to read {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("unreadable image {}: {source}", .path.display())]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("unsupported image format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("embedded image carries no relationship id")]
    MissingRelationship,
}

// ────────────────────────────────────────────────────────────────────────────
// Identifiers
// ────────────────────────────────────────────────────────────────────────────

/// Hands out document-wide unique drawing ids, in increasing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrawingIds {
    next: u32,
}

impl Default for DrawingIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl DrawingIds {
    /// `wp:docPr` ids must be positive, so a start of 0 is bumped to 1.
    pub fn starting_at(first: u32) -> Self {
        Self { next: first.max(1) }
    }

    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`DrawingIds::next_id`] returns.
    pub fn peek(&self) -> u32 {
        self.next
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Anchor geometry
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeFrom {
    Page,
    Column,
    Paragraph,
}

impl RelativeFrom {
    fn as_str(self) -> &'static str {
        match self {
            RelativeFrom::Page => "page",
            RelativeFrom::Column => "column",
            RelativeFrom::Paragraph => "paragraph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisPosition {
    /// EMU offset from the reference frame.
    Offset(i64),
    /// Named alignment inside the reference frame (`left`, `center`, `top`, …).
    Align(&'static str),
}

/// Where and how large an anchored object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSpec {
    pub width: i64,
    pub height: i64,
    pub horizontal_from: RelativeFrom,
    pub horizontal: AxisPosition,
    pub vertical_from: RelativeFrom,
    pub vertical: AxisPosition,
    pub behind_text: bool,
}

/// A finished `w:drawing` carrying a `wp:anchor`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloatingObject {
    pub id: u32,
    drawing: Element,
}

impl FloatingObject {
    pub fn drawing(&self) -> &Element {
        &self.drawing
    }

    /// Wraps the drawing in its own run. Floating shapes must be run children;
    /// placed directly under `w:p` they are dropped by some viewers.
    pub fn into_run(self) -> Run {
        let mut run = Run::new();
        run.push_content(self.drawing);
        run
    }
}

/// Result of [`embed_image`]: an inline drawing plus its natural extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub width: i64,
    pub height: i64,
    drawing: Element,
}

impl InlineImage {
    pub fn drawing(&self) -> &Element {
        &self.drawing
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Images
// ────────────────────────────────────────────────────────────────────────────

/// Embeds the image at `path` into `story` scaled to `width` EMU, aspect ratio kept.
pub fn embed_image(
    doc: &mut Document,
    story: StoryKind,
    path: &Path,
    width: i64,
) -> Result<InlineImage, FloatingError> {
    let bytes = std::fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => FloatingError::MissingAsset(path.to_path_buf()),
        _ => FloatingError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let format = image::guess_format(&bytes).map_err(|source| FloatingError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    let extension = match format {
        ImageFormat::Png => "png",
        ImageFormat::Jpeg => "jpeg",
        _ => return Err(FloatingError::UnsupportedFormat(path.to_path_buf())),
    };
    let decoded = image::load_from_memory_with_format(&bytes, format).map_err(|source| {
        FloatingError::Image {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let height = scale_to_width(decoded.width(), decoded.height(), width);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let rel_id = doc.add_image(story, bytes, extension);

    let inline = Element::new("wp:inline")
        .with_attr("distT", 0)
        .with_attr("distB", 0)
        .with_attr("distL", 0)
        .with_attr("distR", 0)
        .with_child(extent(width, height))
        .with_child(Element::new("wp:docPr").with_attr("id", 0).with_attr("name", &name))
        .with_child(picture_graphic(&rel_id, width, height, &name));

    Ok(InlineImage {
        width,
        height,
        drawing: Element::new("w:drawing").with_child(inline),
    })
}

/// The `r:embed` id the embedding step attached to the inline drawing.
pub fn relationship_id(image: &InlineImage) -> Option<&str> {
    image
        .drawing
        .find("a:blip")
        .and_then(|blip| blip.attr("r:embed"))
        .filter(|id| !id.is_empty())
}

/// Embeds and anchors in one step.
pub fn anchored_image(
    doc: &mut Document,
    story: StoryKind,
    path: &Path,
    width: i64,
    place: impl FnOnce(i64) -> AnchorSpec,
    id: u32,
) -> Result<FloatingObject, FloatingError> {
    let inline = embed_image(doc, story, path, width)?;
    let rel_id = relationship_id(&inline).ok_or(FloatingError::MissingRelationship)?;
    let spec = place(inline.height);
    Ok(to_anchor(rel_id, &spec, id))
}

/// Floating picture referencing an already-embedded image.
pub fn to_anchor(rel_id: &str, spec: &AnchorSpec, id: u32) -> FloatingObject {
    let name = format!("img{id}");
    let graphic = picture_graphic(rel_id, spec.width, spec.height, &name);
    FloatingObject {
        id,
        drawing: anchor_drawing(spec, id, &name, graphic),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shapes
// ────────────────────────────────────────────────────────────────────────────

/// Rounded red badge with the period label in white, centred.
///
/// The shape has a fixed size whatever the label length.
pub fn make_badge(label: &str, id: u32) -> FloatingObject {
    let mut p = Paragraph::new();
    set_alignment(&mut p, Alignment::Center);
    set_spacing(&mut p, 0.0, 0.0, LINE_SINGLE);
    p.push_run(styled(label, &RunStyle::sized(BADGE_TEXT_PT).color(WHITE)));

    let shape = Element::new("wps:wsp")
        .with_child(Element::new("wps:cNvSpPr").with_child(Element::new("a:spLocks")))
        .with_child(shape_properties(
            BADGE_WIDTH,
            BADGE_HEIGHT,
            Element::new("a:prstGeom").with_attr("prst", "roundRect").with_child(
                Element::new("a:avLst").with_child(
                    Element::new("a:gd")
                        .with_attr("name", "adj")
                        .with_attr("fmla", BADGE_CORNER_ADJ),
                ),
            ),
            RED,
        ))
        .with_child(
            Element::new("wps:txbx")
                .with_child(Element::new("w:txbxContent").with_child(p.to_element())),
        )
        .with_child(
            Element::new("wps:bodyPr")
                .with_attr("rot", 0)
                .with_attr("lIns", 0)
                .with_attr("tIns", 0)
                .with_attr("rIns", 0)
                .with_attr("bIns", 0)
                .with_attr("anchor", "ctr")
                .with_child(Element::new("a:noAutofit")),
        );

    let spec = AnchorSpec {
        width: BADGE_WIDTH,
        height: BADGE_HEIGHT,
        horizontal_from: RelativeFrom::Column,
        horizontal: AxisPosition::Offset(BADGE_H_OFFSET),
        vertical_from: RelativeFrom::Paragraph,
        vertical: AxisPosition::Offset(BADGE_V_OFFSET),
        behind_text: false,
    };
    FloatingObject {
        id,
        drawing: anchor_drawing(&spec, id, &format!("badge{id}"), shape_graphic(shape)),
    }
}

/// Full-width red strip at the top edge of the page, behind text.
pub fn make_top_bar(id: u32) -> FloatingObject {
    let shape = Element::new("wps:wsp")
        .with_child(
            Element::new("wps:cNvSpPr")
                .with_child(Element::new("a:spLocks").with_attr("noChangeArrowheads", 1)),
        )
        .with_child(shape_properties(
            PAGE_WIDTH_EMU,
            TOP_BAR_HEIGHT,
            Element::new("a:prstGeom")
                .with_attr("prst", "rect")
                .with_child(Element::new("a:avLst")),
            TOP_BAR,
        ))
        .with_child(
            Element::new("wps:bodyPr")
                .with_attr("rot", 0)
                .with_attr("wrap", "square")
                .with_attr("anchor", "t")
                .with_child(Element::new("a:noAutofit")),
        );

    let spec = AnchorSpec {
        width: PAGE_WIDTH_EMU,
        height: TOP_BAR_HEIGHT,
        horizontal_from: RelativeFrom::Page,
        horizontal: AxisPosition::Align("left"),
        vertical_from: RelativeFrom::Page,
        vertical: AxisPosition::Offset(0),
        behind_text: true,
    };
    FloatingObject {
        id,
        drawing: anchor_drawing(&spec, id, "TopBar", shape_graphic(shape)),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fragments
// ────────────────────────────────────────────────────────────────────────────

fn extent(cx: i64, cy: i64) -> Element {
    Element::new("wp:extent").with_attr("cx", cx).with_attr("cy", cy)
}

fn transform(cx: i64, cy: i64) -> Element {
    Element::new("a:xfrm")
        .with_child(Element::new("a:off").with_attr("x", 0).with_attr("y", 0))
        .with_child(Element::new("a:ext").with_attr("cx", cx).with_attr("cy", cy))
}

fn axis(name: &str, from: RelativeFrom, position: AxisPosition) -> Element {
    let value = match position {
        AxisPosition::Offset(offset) => Element::new("wp:posOffset").with_text(&offset.to_string()),
        AxisPosition::Align(align) => Element::new("wp:align").with_text(align),
    };
    Element::new(name)
        .with_attr("relativeFrom", from.as_str())
        .with_child(value)
}

fn anchor_drawing(spec: &AnchorSpec, id: u32, name: &str, graphic: Element) -> Element {
    let relative_height = BASE_RELATIVE_HEIGHT + u64::from(id) * RELATIVE_HEIGHT_STEP;
    let anchor = Element::new("wp:anchor")
        .with_attr("distT", 0)
        .with_attr("distB", 0)
        .with_attr("distL", 114_300)
        .with_attr("distR", 114_300)
        .with_attr("simplePos", 0)
        .with_attr("relativeHeight", relative_height)
        .with_attr("behindDoc", u8::from(spec.behind_text))
        .with_attr("locked", 0)
        .with_attr("layoutInCell", 1)
        .with_attr("allowOverlap", 1)
        .with_child(Element::new("wp:simplePos").with_attr("x", 0).with_attr("y", 0))
        .with_child(axis("wp:positionH", spec.horizontal_from, spec.horizontal))
        .with_child(axis("wp:positionV", spec.vertical_from, spec.vertical))
        .with_child(extent(spec.width, spec.height))
        .with_child(
            Element::new("wp:effectExtent")
                .with_attr("l", 0)
                .with_attr("t", 0)
                .with_attr("r", 0)
                .with_attr("b", 0),
        )
        .with_child(Element::new("wp:wrapNone"))
        .with_child(Element::new("wp:docPr").with_attr("id", id).with_attr("name", name))
        .with_child(graphic);
    Element::new("w:drawing").with_child(anchor)
}

fn picture_graphic(rel_id: &str, cx: i64, cy: i64, name: &str) -> Element {
    let pic = Element::new("pic:pic")
        .with_child(
            Element::new("pic:nvPicPr")
                .with_child(Element::new("pic:cNvPr").with_attr("id", 0).with_attr("name", name))
                .with_child(
                    Element::new("pic:cNvPicPr")
                        .with_child(Element::new("a:picLocks").with_attr("noChangeAspect", 1)),
                ),
        )
        .with_child(
            Element::new("pic:blipFill")
                .with_child(Element::new("a:blip").with_attr("r:embed", rel_id))
                .with_child(Element::new("a:stretch").with_child(Element::new("a:fillRect"))),
        )
        .with_child(
            Element::new("pic:spPr").with_child(transform(cx, cy)).with_child(
                Element::new("a:prstGeom")
                    .with_attr("prst", "rect")
                    .with_child(Element::new("a:avLst")),
            ),
        );
    Element::new("a:graphic").with_child(
        Element::new("a:graphicData")
            .with_attr("uri", URI_PICTURE)
            .with_child(pic),
    )
}

fn shape_graphic(shape: Element) -> Element {
    Element::new("a:graphic").with_child(
        Element::new("a:graphicData")
            .with_attr("uri", URI_SHAPE)
            .with_child(shape),
    )
}

fn shape_properties(cx: i64, cy: i64, geometry: Element, fill: Rgb) -> Element {
    Element::new("wps:spPr")
        .with_child(transform(cx, cy))
        .with_child(geometry)
        .with_child(
            Element::new("a:solidFill")
                .with_child(Element::new("a:srgbClr").with_attr("val", fill.hex())),
        )
        .with_child(Element::new("a:ln").with_child(Element::new("a:noFill")))
}
