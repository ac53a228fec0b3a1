//! In-memory WordprocessingML document: stories of paragraphs and tables,
//! their relationship tables, and embedded media.
//!
//! Paragraphs are built as values and then pushed into a story. A story never
//! hands a pushed paragraph back for mutation; the only rewrite it supports is
//! [`Story::clear`], used when the running footer is rebuilt.

use crate::docx::units::cm_to_twips;
use crate::docx::xml::Element;

/// Child order of `w:pPr` (CT_PPr sequence).
pub(crate) const PPR_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:suppressLineNumbers",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:suppressAutoHyphens",
    "w:kinsoku",
    "w:wordWrap",
    "w:overflowPunct",
    "w:topLinePunct",
    "w:autoSpaceDE",
    "w:autoSpaceDN",
    "w:bidi",
    "w:adjustRightInd",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:mirrorIndents",
    "w:suppressOverlap",
    "w:jc",
    "w:textDirection",
    "w:textAlignment",
    "w:textboxTightWrap",
    "w:outlineLvl",
    "w:divId",
    "w:cnfStyle",
    "w:rPr",
    "w:sectPr",
    "w:pPrChange",
];

/// Child order of `w:rPr` (CT_RPr sequence).
pub(crate) const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:outline",
    "w:shadow",
    "w:emboss",
    "w:imprint",
    "w:noProof",
    "w:snapToGrid",
    "w:vanish",
    "w:webHidden",
    "w:color",
    "w:spacing",
    "w:w",
    "w:kern",
    "w:position",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:effect",
    "w:bdr",
    "w:shd",
    "w:fitText",
    "w:vertAlign",
    "w:rtl",
    "w:cs",
    "w:em",
    "w:lang",
];

/// Child order of `w:tblPr`.
pub(crate) const TBLPR_ORDER: &[&str] = &[
    "w:tblStyle",
    "w:tblpPr",
    "w:tblOverlap",
    "w:bidiVisual",
    "w:tblStyleRowBandSize",
    "w:tblStyleColBandSize",
    "w:tblW",
    "w:jc",
    "w:tblCellSpacing",
    "w:tblInd",
    "w:tblBorders",
    "w:shd",
    "w:tblLayout",
    "w:tblCellMar",
    "w:tblLook",
];

/// Child order of `w:tcPr`.
pub(crate) const TCPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:tcW",
    "w:gridSpan",
    "w:hMerge",
    "w:vMerge",
    "w:tcBorders",
    "w:shd",
    "w:noWrap",
    "w:tcMar",
    "w:textDirection",
    "w:tcFitText",
    "w:vAlign",
    "w:hideMark",
];

/// Body relationship ids rId1..rId3 are taken by styles, settings and the footer.
pub(crate) const STYLES_REL_ID: &str = "rId1";
pub(crate) const SETTINGS_REL_ID: &str = "rId2";
pub(crate) const FOOTER_REL_ID: &str = "rId3";
const BODY_FIRST_FREE_REL: u32 = 4;
const FOOTER_FIRST_FREE_REL: u32 = 1;

// ────────────────────────────────────────────────────────────────────────────
// Page setup
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSetup {
    pub width: i32,
    pub height: i32,
    pub margin_top: i32,
    pub margin_right: i32,
    pub margin_bottom: i32,
    pub margin_left: i32,
    pub header_distance: i32,
    pub footer_distance: i32,
}

impl PageSetup {
    /// A4 portrait with equal margins on all sides. All inputs in centimetres.
    pub fn a4(margin_cm: f32, footer_cm: f32) -> Self {
        let margin = cm_to_twips(margin_cm);
        Self {
            width: cm_to_twips(21.0),
            height: cm_to_twips(29.7),
            margin_top: margin,
            margin_right: margin,
            margin_bottom: margin,
            margin_left: margin,
            header_distance: cm_to_twips(1.25),
            footer_distance: cm_to_twips(footer_cm),
        }
    }

    /// Usable text width between the left and right margins, in twips.
    pub fn content_width(&self) -> i32 {
        self.width - self.margin_left - self.margin_right
    }
}

/// Font family and size applied document-wide through the style defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseFont {
    pub family: String,
    pub size_pt: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_val(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "both",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Runs
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldChar {
    Begin,
    Separate,
    End,
}

impl FieldChar {
    fn as_val(self) -> &'static str {
        match self {
            FieldChar::Begin => "begin",
            FieldChar::Separate => "separate",
            FieldChar::End => "end",
        }
    }
}

/// A `w:r` span. Tabs and newlines in text become `w:tab` / `w:br` children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    el: Element,
}

impl Default for Run {
    fn default() -> Self {
        Self::new()
    }
}

impl Run {
    pub fn new() -> Self {
        Self {
            el: Element::new("w:r"),
        }
    }

    pub fn text(text: &str) -> Self {
        let mut run = Self::new();
        let mut buf = String::new();
        for c in text.chars() {
            match c {
                '\t' => {
                    run.flush_text(&mut buf);
                    run.el.push(Element::new("w:tab"));
                }
                '\n' => {
                    run.flush_text(&mut buf);
                    run.el.push(Element::new("w:br"));
                }
                '\r' => {}
                _ => buf.push(c),
            }
        }
        run.flush_text(&mut buf);
        run
    }

    pub fn page_break() -> Self {
        let mut run = Self::new();
        run.el.push(Element::new("w:br").with_attr("w:type", "page"));
        run
    }

    pub fn field_char(kind: FieldChar) -> Self {
        let mut run = Self::new();
        run.el
            .push(Element::new("w:fldChar").with_attr("w:fldCharType", kind.as_val()));
        run
    }

    pub fn field_instruction(instruction: &str) -> Self {
        let mut run = Self::new();
        run.el.push(
            Element::new("w:instrText")
                .with_attr("xml:space", "preserve")
                .with_text(instruction),
        );
        run
    }

    fn flush_text(&mut self, buf: &mut String) {
        if buf.is_empty() {
            return;
        }
        self.el.push(
            Element::new("w:t")
                .with_attr("xml:space", "preserve")
                .with_text(buf),
        );
        buf.clear();
    }

    /// Appends raw content (e.g. a `w:drawing`) after the run properties.
    pub(crate) fn push_content(&mut self, content: Element) {
        self.el.push(content);
    }

    /// The run's `w:rPr`, created as first child if absent.
    pub(crate) fn properties_mut(&mut self) -> &mut Element {
        if self.el.child("w:rPr").is_none() {
            self.el.insert(0, Element::new("w:rPr"));
        }
        let index = self
            .el
            .children()
            .iter()
            .position(|c| c.name() == "w:rPr")
            .unwrap_or(0);
        self.el.child_mut_at(index)
    }

    pub(crate) fn remove_properties(&mut self) {
        self.el.remove_children("w:rPr");
    }

    pub fn properties(&self) -> Option<&Element> {
        self.el.child("w:rPr")
    }

    pub fn element(&self) -> &Element {
        &self.el
    }

    pub(crate) fn into_element(self) -> Element {
        self.el
    }

    /// Visible text of this run: `w:t` text, tabs and line breaks.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        for child in self.el.children() {
            match child.name() {
                "w:t" => out.push_str(child.text().unwrap_or_default()),
                "w:tab" => out.push('\t'),
                "w:br" if child.attr("w:type").is_none() => out.push('\n'),
                _ => {}
            }
        }
        out
    }

    pub fn is_bold(&self) -> bool {
        self.properties()
            .and_then(|p| p.child("w:b"))
            .is_some_and(|b| b.attr("w:val").map_or(true, |v| v != "0" && v != "false"))
    }

    pub fn color(&self) -> Option<&str> {
        self.properties()
            .and_then(|p| p.child("w:color"))
            .and_then(|c| c.attr("w:val"))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Paragraphs
// ────────────────────────────────────────────────────────────────────────────

/// A `w:p` block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    el: Element,
    runs: Vec<Run>,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self::new()
    }
}

impl Paragraph {
    pub fn new() -> Self {
        Self {
            el: Element::new("w:p"),
            runs: Vec::new(),
        }
    }

    /// A paragraph holding only a hard page break.
    pub fn page_break() -> Self {
        let mut p = Self::new();
        p.push_run(Run::page_break());
        p
    }

    pub fn push_run(&mut self, run: Run) {
        self.runs.push(run);
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// The paragraph's `w:pPr`, created on first use.
    pub(crate) fn properties_mut(&mut self) -> &mut Element {
        if self.el.child("w:pPr").is_none() {
            self.el.insert(0, Element::new("w:pPr"));
        }
        self.el.child_mut_at(0)
    }

    pub fn properties(&self) -> Option<&Element> {
        self.el.child("w:pPr")
    }

    /// Visible text of all runs, in order.
    pub fn text(&self) -> String {
        self.runs.iter().map(Run::plain_text).collect()
    }

    pub fn has_page_break(&self) -> bool {
        self.runs.iter().any(|r| {
            r.element()
                .children()
                .iter()
                .any(|c| c.name() == "w:br" && c.attr("w:type") == Some("page"))
        })
    }

    pub fn to_element(&self) -> Element {
        let mut el = self.el.clone();
        for run in &self.runs {
            el.push(run.clone().into_element());
        }
        el
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tables
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableCell {
    props: Element,
    paragraphs: Vec<Paragraph>,
}

impl TableCell {
    pub fn new(width: i32) -> Self {
        let mut props = Element::new("w:tcPr");
        props.insert_ordered(
            Element::new("w:tcW")
                .with_attr("w:w", width)
                .with_attr("w:type", "dxa"),
            TCPR_ORDER,
        );
        Self {
            props,
            paragraphs: Vec::new(),
        }
    }

    pub fn push_paragraph(&mut self, p: Paragraph) {
        self.paragraphs.push(p);
    }

    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.paragraphs
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Element {
        &mut self.props
    }

    pub fn properties(&self) -> &Element {
        &self.props
    }

    fn to_element(&self) -> Element {
        let mut el = Element::new("w:tc").with_child(self.props.clone());
        // A cell must end with a paragraph.
        if self.paragraphs.is_empty() {
            el.push(Paragraph::new().to_element());
        }
        for p in &self.paragraphs {
            el.push(p.to_element());
        }
        el
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    cells: Vec<TableCell>,
}

impl TableRow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_cell(&mut self, cell: TableCell) {
        self.cells.push(cell);
    }

    pub fn cells(&self) -> &[TableCell] {
        &self.cells
    }
}

/// A `w:tbl` with a fixed column grid (widths in twips).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    props: Element,
    grid: Vec<i32>,
    rows: Vec<TableRow>,
}

impl Table {
    pub fn new(column_widths: &[i32]) -> Self {
        let total: i32 = column_widths.iter().sum();
        let mut props = Element::new("w:tblPr");
        props.insert_ordered(
            Element::new("w:tblW")
                .with_attr("w:w", total)
                .with_attr("w:type", "dxa"),
            TBLPR_ORDER,
        );
        props.insert_ordered(
            Element::new("w:tblLayout").with_attr("w:type", "fixed"),
            TBLPR_ORDER,
        );
        Self {
            props,
            grid: column_widths.to_vec(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: TableRow) {
        self.rows.push(row);
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn column_widths(&self) -> &[i32] {
        &self.grid
    }

    pub(crate) fn properties_mut(&mut self) -> &mut Element {
        &mut self.props
    }

    pub fn properties(&self) -> &Element {
        &self.props
    }

    pub fn to_element(&self) -> Element {
        let mut grid = Element::new("w:tblGrid");
        for w in &self.grid {
            grid.push(Element::new("w:gridCol").with_attr("w:w", w));
        }
        let mut el = Element::new("w:tbl")
            .with_child(self.props.clone())
            .with_child(grid);
        for row in &self.rows {
            let mut tr = Element::new("w:tr");
            for cell in &row.cells {
                tr.push(cell.to_element());
            }
            el.push(tr);
        }
        el
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Stories
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph(Paragraph),
    Table(Table),
}

impl Block {
    pub fn to_element(&self) -> Element {
        match self {
            Block::Paragraph(p) => p.to_element(),
            Block::Table(t) => t.to_element(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub target: String,
}

/// An ordered flow of blocks with its own relationship table
/// (the body and the footer each live in a separate package part).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Story {
    blocks: Vec<Block>,
    relationships: Vec<Relationship>,
    first_rel: u32,
}

impl Story {
    fn new(first_rel: u32) -> Self {
        Self {
            blocks: Vec::new(),
            relationships: Vec::new(),
            first_rel,
        }
    }

    pub fn push_paragraph(&mut self, p: Paragraph) {
        self.blocks.push(Block::Paragraph(p));
    }

    pub fn push_table(&mut self, t: Table) {
        self.blocks.push(Block::Table(t));
    }

    /// Drops every block and relationship of this story. Media parts are owned
    /// by the [`Document`]; see [`Document::clear_footer`].
    fn clear(&mut self) {
        self.blocks.clear();
        self.relationships.clear();
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Top-level paragraphs, skipping tables.
    pub fn paragraphs(&self) -> impl Iterator<Item = &Paragraph> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Paragraph(p) => Some(p),
            Block::Table(_) => None,
        })
    }

    pub fn tables(&self) -> impl Iterator<Item = &Table> {
        self.blocks.iter().filter_map(|b| match b {
            Block::Table(t) => Some(t),
            Block::Paragraph(_) => None,
        })
    }

    pub fn relationships(&self) -> &[Relationship] {
        &self.relationships
    }

    fn add_relationship(&mut self, target: String) -> String {
        let id = format!("rId{}", self.first_rel as usize + self.relationships.len());
        self.relationships.push(Relationship {
            id: id.clone(),
            target,
        });
        id
    }

    /// `wp:docPr` ids of every drawing in this story, in document order.
    pub fn drawing_ids(&self) -> Vec<u32> {
        self.blocks
            .iter()
            .flat_map(|b| {
                b.to_element()
                    .descendants()
                    .into_iter()
                    .filter(|e| e.name() == "wp:docPr")
                    .filter_map(|e| e.attr("id").and_then(|v| v.parse().ok()))
                    .collect::<Vec<u32>>()
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoryKind {
    Body,
    Footer,
}

/// A binary part stored under `word/media/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Media {
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Story whose relationship points at this part.
    pub owner: StoryKind,
}

impl Media {
    pub fn extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    setup: PageSetup,
    base_font: BaseFont,
    body: Story,
    footer: Story,
    media: Vec<Media>,
    /// Number used for the next `imageN` file name. Never reused.
    next_media: u32,
}

impl Document {
    pub fn new(setup: PageSetup, base_font: BaseFont) -> Self {
        Self {
            setup,
            base_font,
            body: Story::new(BODY_FIRST_FREE_REL),
            footer: Story::new(FOOTER_FIRST_FREE_REL),
            media: Vec::new(),
            next_media: 1,
        }
    }

    pub fn setup(&self) -> &PageSetup {
        &self.setup
    }

    pub fn base_font(&self) -> &BaseFont {
        &self.base_font
    }

    pub fn push_paragraph(&mut self, p: Paragraph) {
        self.body.push_paragraph(p);
    }

    pub fn push_table(&mut self, t: Table) {
        self.body.push_table(t);
    }

    pub fn body(&self) -> &Story {
        &self.body
    }

    pub fn footer(&self) -> &Story {
        &self.footer
    }

    pub fn footer_mut(&mut self) -> &mut Story {
        &mut self.footer
    }

    /// Empties the footer story and drops the media parts only it referenced.
    pub fn clear_footer(&mut self) {
        self.footer.clear();
        self.media.retain(|m| m.owner != StoryKind::Footer);
    }

    pub fn media(&self) -> &[Media] {
        &self.media
    }

    /// Stores `bytes` as a media part and relates it to `story`.
    /// Returns the relationship id to reference from `a:blip r:embed`.
    pub fn add_image(&mut self, story: StoryKind, bytes: Vec<u8>, extension: &str) -> String {
        let file_name = format!("image{}.{}", self.next_media, extension);
        self.next_media += 1;
        let target = format!("media/{file_name}");
        self.media.push(Media {
            file_name,
            bytes,
            owner: story,
        });
        match story {
            StoryKind::Body => self.body.add_relationship(target),
            StoryKind::Footer => self.footer.add_relationship(target),
        }
    }

    /// Every drawing id in the body and the footer.
    pub fn drawing_ids(&self) -> Vec<u32> {
        let mut ids = self.body.drawing_ids();
        ids.extend(self.footer.drawing_ids());
        ids
    }
}
