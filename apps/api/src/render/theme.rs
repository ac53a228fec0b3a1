//! Fixed visual template: colors, fonts, labels and geometry.

use crate::docx::units::EMU_PER_CM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn hex(self) -> String {
        let [r, g, b] = self.0;
        format!("{r:02X}{g:02X}{b:02X}")
    }
}

pub const RED: Rgb = Rgb([0xC0, 0x00, 0x00]);
pub const TITLE: Rgb = Rgb([0xBE, 0x3B, 0x4E]);
pub const BLACK: Rgb = Rgb([0x11, 0x11, 0x11]);
pub const WHITE: Rgb = Rgb([0xFF, 0xFF, 0xFF]);
pub const GREY: Rgb = Rgb([0x60, 0x60, 0x60]);
pub const RULE: Rgb = Rgb([0x23, 0x1F, 0x20]);
pub const TOP_BAR: Rgb = Rgb([0xE9, 0x27, 0x2D]);

pub const FONT: &str = "Century Gothic";
pub const BASE_SIZE_PT: f32 = 10.0;
pub const BRAND: &str = "MALTEM AFRICA";

pub const PAGE_MARGIN_CM: f32 = 1.8;
pub const FOOTER_DISTANCE_CM: f32 = 0.8;
pub const PAGE_WIDTH_EMU: i64 = 21 * EMU_PER_CM;
pub const PAGE_HEIGHT_EMU: i64 = 297 * EMU_PER_CM / 10;

pub const DASH: &str = "- ";

// Section titles
pub const ABOUT: &str = "À propos";
pub const SKILLS: &str = "Compétences";
pub const EDUCATION: &str = "Formation";
pub const CERTIFICATIONS: &str = "Certifications";
pub const LANGUAGES: &str = "Langues";
pub const OTHER_REFERENCES: &str = "Autres références";
pub const NOTABLE_PROJECTS: &str = "Projets marquants";
pub const EXPERIENCES: &str = "Expériences professionnelles";

// Experience sub-labels
pub const LABEL_CONTEXT: &str = "Contexte & enjeux";
pub const LABEL_OBJECTIVES: &str = "Objectifs";
pub const LABEL_ACHIEVEMENTS: &str = "Réalisations";
pub const LABEL_RESULTS: &str = "Résultats / impacts";
pub const LABEL_ENVIRONMENT: &str = "Environnement";

// Left indents, in twips
pub const SECTION_INDENT: i32 = 426;
pub const LIST_INDENT: i32 = 709;
pub const BADGE_LINE_INDENT: i32 = 1800;
pub const EXPERIENCE_INDENT: i32 = 2124;
pub const EXPERIENCE_ITEM_INDENT: i32 = 2500;

// Paragraph border sizes, in eighths of a point
pub const RULE_SIZE: u32 = 6;
pub const TITLE_RULE_SIZE: u32 = 12;

// Footer tab stops, in twips
pub const FOOTER_CENTER_TAB: i32 = 4536;
pub const FOOTER_RIGHT_TAB: i32 = 9026;

// Skills table gutter, in twips
pub const SKILLS_GUTTER: i32 = 340;

// Floating geometry, in EMU
pub const TOP_BAR_HEIGHT: i64 = 72_390;
pub const BADGE_WIDTH: i64 = 1_097_280;
pub const BADGE_HEIGHT: i64 = 246_888;
pub const BADGE_H_OFFSET: i64 = -50_800;
pub const BADGE_V_OFFSET: i64 = 100_000;
pub const LOGO_WIDTH: i64 = 2_433_960;
pub const LOGO_H_OFFSET: i64 = 4_852_434;
pub const LOGO_V_OFFSET: i64 = 165_843;
pub const DECO_TOP_LEFT_WIDTH: i64 = 682_625;
pub const DECO_BOTTOM_RIGHT_WIDTH: i64 = 673_100;
pub const DECO_TOP_LEFT_OFFSET: i64 = -106_680;
pub const DECO_BOTTOM_RIGHT_H_OFFSET: i64 = 6_886_900;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_hex_is_uppercase_six_digits() {
        assert_eq!(RED.hex(), "C00000");
        assert_eq!(TITLE.hex(), "BE3B4E");
        assert_eq!(WHITE.hex(), "FFFFFF");
    }

    #[test]
    fn test_page_size_in_emu() {
        assert_eq!(PAGE_WIDTH_EMU, 7_560_000);
        assert_eq!(PAGE_HEIGHT_EMU, 10_692_000);
    }
}
