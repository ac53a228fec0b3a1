//! Two-column skills block.
//!
//! Categories are split at the midpoint, `ceil(n / 2)` on the left, and laid
//! out in a borderless three-column table: left content, a fixed gutter, right
//! content.

use crate::docx::{Document, Paragraph, Table, TableCell, TableRow};
use crate::models::cv::SkillCategory;
use crate::render::sections::{body_style, dash_item, present, section_title};
use crate::render::style::{
    clear_cell_borders, clear_table_borders, set_spacing, styled, LINE_SINGLE,
};
use crate::render::theme::{self, SKILLS_GUTTER};

/// Order-preserving split: the left half gets the extra element.
pub fn split_columns<T>(items: &[T]) -> (&[T], &[T]) {
    items.split_at(items.len().div_ceil(2))
}

fn has_content(category: &SkillCategory) -> bool {
    !category.category.trim().is_empty() || !present(&category.items).is_empty()
}

fn column_cell(categories: &[&SkillCategory], width: i32) -> TableCell {
    let mut cell = TableCell::new(width);
    clear_cell_borders(&mut cell);

    for (i, category) in categories.iter().enumerate() {
        let name = category.category.trim();
        if !name.is_empty() {
            let mut label = Paragraph::new();
            set_spacing(&mut label, if i == 0 { 0.0 } else { 6.0 }, 2.0, LINE_SINGLE);
            label.push_run(styled(name, &body_style().bold()));
            cell.push_paragraph(label);
        }
        for item in present(&category.items) {
            cell.push_paragraph(dash_item(item, 0));
        }
    }
    cell
}

pub fn build_skills(doc: &mut Document, skills: &[SkillCategory]) {
    let categories: Vec<&SkillCategory> = skills.iter().filter(|c| has_content(c)).collect();
    if categories.is_empty() {
        return;
    }
    doc.push_paragraph(section_title(theme::SKILLS));

    let content = doc.setup().content_width();
    let left_width = (content - SKILLS_GUTTER) / 2;
    let right_width = content - SKILLS_GUTTER - left_width;

    let (left, right) = split_columns(&categories);
    let mut table = Table::new(&[left_width, SKILLS_GUTTER, right_width]);
    clear_table_borders(&mut table);

    let mut spacer = TableCell::new(SKILLS_GUTTER);
    clear_cell_borders(&mut spacer);

    let mut row = TableRow::new();
    row.push_cell(column_cell(left, left_width));
    row.push_cell(spacer);
    row.push_cell(column_cell(right, right_width));
    table.push_row(row);
    doc.push_table(table);

    // Keeps the next section title off the table edge.
    let mut after = Paragraph::new();
    set_spacing(&mut after, 0.0, 4.0, LINE_SINGLE);
    doc.push_paragraph(after);
}
