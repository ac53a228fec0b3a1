//! Branded résumé renderer.
//!
//! `build_document` runs the section builders in a fixed order over one fresh
//! [`Document`]; nothing is shared between two renders. Floating-object ids
//! come from a single [`DrawingIds`] counter threaded through the builders, so
//! the same record and options always give the same bytes.

pub mod experience;
pub mod floating;
pub mod footer;
pub mod header;
pub mod sections;
pub mod skills;
pub mod style;
pub mod theme;

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::docx::{write_docx, BaseFont, Document, DocxError, PageSetup, Paragraph};
use crate::models::cv::CvRecord;
use crate::render::floating::DrawingIds;

pub const LOGO_FILE: &str = "logo_maltem.png";
pub const DECO_TOP_LEFT_FILE: &str = "deco_top_left_white.png";
pub const DECO_BOTTOM_RIGHT_FILE: &str = "deco_bottom_right_white.png";

/// Image assets of the template. Any of them may be missing; the renderer
/// degrades instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    pub logo: PathBuf,
    pub deco_top_left: PathBuf,
    pub deco_bottom_right: PathBuf,
}

impl AssetPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            logo: dir.join(LOGO_FILE),
            deco_top_left: dir.join(DECO_TOP_LEFT_FILE),
            deco_bottom_right: dir.join(DECO_BOTTOM_RIGHT_FILE),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub assets: AssetPaths,
    /// First `wp:docPr` id handed out.
    pub first_drawing_id: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            assets: AssetPaths::in_dir(Path::new("assets")),
            first_drawing_id: 1,
        }
    }
}

/// Builds the in-memory document for `cv`.
pub fn build_document(cv: &CvRecord, options: &RenderOptions) -> Document {
    let mut doc = Document::new(
        PageSetup::a4(theme::PAGE_MARGIN_CM, theme::FOOTER_DISTANCE_CM),
        BaseFont {
            family: theme::FONT.to_string(),
            size_pt: theme::BASE_SIZE_PT,
        },
    );
    let mut ids = DrawingIds::starting_at(options.first_drawing_id);

    header::build_header(&mut doc, cv, &options.assets, &mut ids);
    sections::build_about(&mut doc, &cv.about);
    skills::build_skills(&mut doc, &cv.skills);
    sections::build_education(&mut doc, &cv.education);
    sections::build_certifications(&mut doc, &cv.certifications);
    sections::build_languages(&mut doc, &cv.languages);
    sections::build_other_references(&mut doc, &cv.other_references);
    sections::build_notable_projects(&mut doc, &cv.notable_projects);

    if !cv.experiences.is_empty() {
        doc.push_paragraph(Paragraph::page_break());
        experience::build_experiences(&mut doc, &cv.experiences, &mut ids);
    }

    footer::build_footer(&mut doc, &options.assets, &mut ids);

    debug!(
        "Document built: {} body blocks, drawing ids {}..{}",
        doc.body().blocks().len(),
        options.first_drawing_id,
        ids.peek()
    );
    doc
}

/// Renders `cv` to DOCX bytes.
pub fn render_cv(cv: &CvRecord, options: &RenderOptions) -> Result<Vec<u8>, DocxError> {
    let doc = build_document(cv, options);
    let bytes = write_docx(&doc)?;
    info!(
        "Rendered CV for '{}': {} experience(s), {} bytes",
        cv.full_name,
        cv.experiences.len(),
        bytes.len()
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::models::cv::{Education, Experience, Reference, SkillCategory, TextOrLines};
    use crate::render::floating::tests::png_bytes;

    const TITLES: [&str; 8] = [
        "À PROPOS",
        "COMPÉTENCES",
        "FORMATION",
        "CERTIFICATIONS",
        "LANGUES",
        "AUTRES RÉFÉRENCES",
        "PROJETS MARQUANTS",
        "EXPÉRIENCES PROFESSIONNELLES",
    ];

    fn options_with_assets(dir: &Path) -> RenderOptions {
        let assets = AssetPaths::in_dir(dir);
        std::fs::write(&assets.logo, png_bytes(80, 20)).unwrap();
        std::fs::write(&assets.deco_top_left, png_bytes(10, 23)).unwrap();
        std::fs::write(&assets.deco_bottom_right, png_bytes(10, 23)).unwrap();
        RenderOptions {
            assets,
            first_drawing_id: 1,
        }
    }

    fn full_cv() -> CvRecord {
        let experience = |period: &str, employer: &str| Experience {
            period: period.into(),
            employer: employer.into(),
            job_title: "Consultant".into(),
            achievements: vec!["Livraison : 3 projets".into()],
            ..Default::default()
        };
        CvRecord {
            full_name: "Awa Diop".into(),
            job_title: "Data Engineer".into(),
            years_of_experience: "7 ans".into(),
            about: TextOrLines::from("Ingénieure data."),
            skills: vec![SkillCategory {
                category: "Cloud".into(),
                items: vec!["AWS".into()],
            }],
            certifications: vec!["AWS SAA".into()],
            education: vec![Education {
                year: "2016".into(),
                degree: "Master".into(),
                institution: "UCAD".into(),
            }],
            languages: vec!["Français".into()],
            experiences: vec![experience("2021", "Orange"), experience("2019", "Sonatel")],
            other_references: vec![Reference {
                employer: "BICIS".into(),
                job_title: "Analyste".into(),
            }],
            notable_projects: vec!["Data lake".into()],
        }
    }

    fn body_texts(doc: &Document) -> Vec<String> {
        doc.body().paragraphs().map(Paragraph::text).collect()
    }

    fn title_positions(doc: &Document) -> Vec<usize> {
        let texts = body_texts(doc);
        TITLES
            .iter()
            .filter_map(|t| texts.iter().position(|x| x == t))
            .collect()
    }

    #[test]
    fn test_sections_render_in_fixed_order() {
        let dir = tempfile::tempdir().unwrap();
        let doc = build_document(&full_cv(), &options_with_assets(dir.path()));
        let positions = title_positions(&doc);
        assert_eq!(positions.len(), TITLES.len());
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_record_has_no_section_titles() {
        let dir = tempfile::tempdir().unwrap();
        let doc = build_document(&CvRecord::default(), &options_with_assets(dir.path()));
        assert!(title_positions(&doc).is_empty());
        assert!(doc.body().tables().next().is_none());
        assert!(!doc.body().paragraphs().any(Paragraph::has_page_break));
    }

    #[test]
    fn test_each_omitted_field_drops_its_title() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_assets(dir.path());
        let clears: [(&str, fn(&mut CvRecord)); 8] = [
            ("À PROPOS", |cv| cv.about = TextOrLines::default()),
            ("COMPÉTENCES", |cv| cv.skills.clear()),
            ("FORMATION", |cv| cv.education.clear()),
            ("CERTIFICATIONS", |cv| cv.certifications.clear()),
            ("LANGUES", |cv| cv.languages.clear()),
            ("AUTRES RÉFÉRENCES", |cv| cv.other_references.clear()),
            ("PROJETS MARQUANTS", |cv| cv.notable_projects.clear()),
            ("EXPÉRIENCES PROFESSIONNELLES", |cv| cv.experiences.clear()),
        ];
        for (title, clear) in clears {
            let mut cv = full_cv();
            clear(&mut cv);
            let texts = body_texts(&build_document(&cv, &options));
            assert!(!texts.iter().any(|t| t == title), "{title} still rendered");
            assert_eq!(
                TITLES.iter().filter(|t| texts.iter().any(|x| x == *t)).count(),
                TITLES.len() - 1
            );
        }
    }

    #[test]
    fn test_page_break_directly_precedes_experiences() {
        let dir = tempfile::tempdir().unwrap();
        let doc = build_document(&full_cv(), &options_with_assets(dir.path()));
        let paragraphs: Vec<&Paragraph> = doc.body().paragraphs().collect();
        let breaks: Vec<usize> = paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.has_page_break())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(breaks.len(), 1);
        let title = paragraphs
            .iter()
            .position(|p| p.text() == "EXPÉRIENCES PROFESSIONNELLES")
            .unwrap();
        // Break, top rule, title.
        assert_eq!(title, breaks[0] + 2);
    }

    #[test]
    fn test_three_skills_and_no_experiences() {
        let dir = tempfile::tempdir().unwrap();
        let category = |name: &str| SkillCategory {
            category: name.into(),
            items: vec!["x".into()],
        };
        let cv = CvRecord {
            skills: vec![category("A"), category("B"), category("C")],
            ..Default::default()
        };
        let doc = build_document(&cv, &options_with_assets(dir.path()));

        let table = doc.body().tables().next().unwrap();
        let cells = table.rows()[0].cells();
        let labels = |i: usize| -> Vec<String> {
            cells[i]
                .paragraphs()
                .iter()
                .map(Paragraph::text)
                .filter(|t| !t.starts_with('-'))
                .collect()
        };
        assert_eq!(labels(0), vec!["A", "B"]);
        assert_eq!(labels(2), vec!["C"]);
        assert!(!body_texts(&doc).iter().any(|t| t.starts_with("EXPÉRIENCES")));
        assert!(!doc.body().paragraphs().any(Paragraph::has_page_break));
    }

    #[test]
    fn test_drawing_ids_are_unique_across_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = build_document(&full_cv(), &options_with_assets(dir.path()));
        let ids = doc.drawing_ids();
        // Top bar, logo, deco, two badges, two footer decorations.
        assert_eq!(ids.len(), 7);
        let unique: HashSet<u32> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_missions_fallback_in_full_document() {
        let dir = tempfile::tempdir().unwrap();
        let cv = CvRecord {
            experiences: vec![Experience {
                missions: vec!["A".into(), "B".into()],
                ..Default::default()
            }],
            ..Default::default()
        };
        let texts = body_texts(&build_document(&cv, &options_with_assets(dir.path())));
        let at = texts.iter().position(|t| t == "Réalisations").unwrap();
        assert_eq!(texts[at + 1..at + 3], ["- A", "- B"]);
    }

    #[test]
    fn test_render_is_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_assets(dir.path());
        let first = render_cv(&full_cv(), &options).unwrap();
        let second = render_cv(&full_cv(), &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_start_id_only_shifts_ids() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_assets(dir.path());
        let shifted = RenderOptions {
            first_drawing_id: 101,
            ..options.clone()
        };
        let a = build_document(&full_cv(), &options).drawing_ids();
        let b = build_document(&full_cv(), &shifted).drawing_ids();
        let expected: Vec<u32> = a.iter().map(|id| id + 100).collect();
        assert_eq!(b, expected);
    }

    #[test]
    fn test_missing_assets_still_render() {
        let dir = tempfile::tempdir().unwrap();
        let options = RenderOptions {
            assets: AssetPaths::in_dir(dir.path()),
            first_drawing_id: 1,
        };
        let bytes = render_cv(&full_cv(), &options).unwrap();
        assert!(!bytes.is_empty());
        let doc = build_document(&full_cv(), &options);
        assert!(doc.media().is_empty());
        assert_eq!(body_texts(&doc)[0], theme::BRAND);
    }
}
