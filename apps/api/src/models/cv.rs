//! The structured résumé record, sole input of the renderer.
//!
//! JSON keys are the French field names the structuring prompts ask for.
//! Every field is optional: a missing key or an explicit `null` decodes to the
//! empty value, which the renderer treats as "omit this section".

use serde::{Deserialize, Deserializer, Serialize};

/// Free text or a list of lines, as returned by the structuring call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TextOrLines {
    Text(String),
    Lines(Vec<String>),
}

impl Default for TextOrLines {
    fn default() -> Self {
        TextOrLines::Text(String::new())
    }
}

impl TextOrLines {
    /// True when there is nothing but whitespace to render.
    pub fn is_blank(&self) -> bool {
        self.lines().is_empty()
    }

    /// Non-blank, trimmed lines. A single text yields at most one line.
    pub fn lines(&self) -> Vec<&str> {
        match self {
            TextOrLines::Text(text) => {
                let text = text.trim();
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![text]
                }
            }
            TextOrLines::Lines(lines) => lines
                .iter()
                .map(|l| l.trim())
                .filter(|l| !l.is_empty())
                .collect(),
        }
    }
}

impl From<&str> for TextOrLines {
    fn from(text: &str) -> Self {
        TextOrLines::Text(text.to_string())
    }
}

impl From<Vec<&str>> for TextOrLines {
    fn from(lines: Vec<&str>) -> Self {
        TextOrLines::Lines(lines.into_iter().map(String::from).collect())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkillCategory {
    #[serde(rename = "categorie", deserialize_with = "nullable")]
    pub category: String,
    #[serde(deserialize_with = "nullable")]
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Education {
    #[serde(rename = "annee", deserialize_with = "string_or_number")]
    pub year: String,
    #[serde(rename = "diplome", deserialize_with = "nullable")]
    pub degree: String,
    #[serde(rename = "etablissement", deserialize_with = "nullable")]
    pub institution: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Experience {
    #[serde(rename = "periode", deserialize_with = "nullable")]
    pub period: String,
    #[serde(rename = "entreprise", deserialize_with = "nullable")]
    pub employer: String,
    #[serde(rename = "poste", deserialize_with = "nullable")]
    pub job_title: String,
    #[serde(rename = "direction", deserialize_with = "nullable")]
    pub department: String,
    #[serde(rename = "contexte", deserialize_with = "nullable")]
    pub context: TextOrLines,
    #[serde(rename = "objectifs", deserialize_with = "nullable")]
    pub objectives: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub missions: Vec<String>,
    #[serde(rename = "realisations", deserialize_with = "nullable")]
    pub achievements: Vec<String>,
    #[serde(rename = "resultats", deserialize_with = "nullable")]
    pub results: Vec<String>,
    #[serde(rename = "environnement", deserialize_with = "nullable")]
    pub environment: TextOrLines,
}

impl Experience {
    /// Items shown under the achievements label: achievements, or missions when
    /// no non-blank achievement was extracted.
    pub fn achievement_items(&self) -> &[String] {
        if self.achievements.iter().all(|a| a.trim().is_empty()) {
            &self.missions
        } else {
            &self.achievements
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Reference {
    #[serde(rename = "entreprise", deserialize_with = "nullable")]
    pub employer: String,
    #[serde(rename = "poste", deserialize_with = "nullable")]
    pub job_title: String,
}

/// Full structured résumé. List order is rendering order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CvRecord {
    #[serde(rename = "nom_prenom", deserialize_with = "nullable")]
    pub full_name: String,
    #[serde(rename = "titre_poste", deserialize_with = "nullable")]
    pub job_title: String,
    #[serde(rename = "annees_experience", deserialize_with = "nullable")]
    pub years_of_experience: String,
    #[serde(rename = "a_propos", deserialize_with = "nullable")]
    pub about: TextOrLines,
    #[serde(rename = "competences", deserialize_with = "nullable")]
    pub skills: Vec<SkillCategory>,
    #[serde(deserialize_with = "nullable")]
    pub certifications: Vec<String>,
    #[serde(rename = "formations", deserialize_with = "nullable")]
    pub education: Vec<Education>,
    #[serde(rename = "langues", deserialize_with = "nullable")]
    pub languages: Vec<String>,
    #[serde(deserialize_with = "nullable")]
    pub experiences: Vec<Experience>,
    #[serde(rename = "autres_references", deserialize_with = "nullable")]
    pub other_references: Vec<Reference>,
    #[serde(rename = "projets_marquants", deserialize_with = "nullable")]
    pub notable_projects: Vec<String>,
}

/// `null` → `T::default()`.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `"2020"`, `2020` or `null`.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Int(n)) => n.to_string(),
        Some(Raw::Float(f)) => f.to_string(),
        None => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_record_deserializes() {
        let json = r#"{
            "nom_prenom": "Awa Diop",
            "titre_poste": "Data Engineer",
            "annees_experience": "7 ans d'expérience",
            "a_propos": "Ingénieure data.",
            "competences": [{"categorie": "Cloud", "items": ["AWS", "GCP"]}],
            "certifications": ["AWS SAA"],
            "langues": ["Français", "Anglais"],
            "formations": [{"annee": 2016, "diplome": "Master", "etablissement": "UCAD"}],
            "experiences": [{
                "periode": "2021 – 2024",
                "entreprise": "Orange",
                "poste": "Lead",
                "contexte": ["Migration", "Cloud"],
                "missions": ["A", "B"],
                "environnement": "Spark, Airflow"
            }],
            "autres_references": [{"entreprise": "Sonatel", "poste": "Consultante"}],
            "projets_marquants": ["Data lake"]
        }"#;
        let cv: CvRecord = serde_json::from_str(json).unwrap();
        assert_eq!(cv.full_name, "Awa Diop");
        assert_eq!(cv.skills[0].items, vec!["AWS", "GCP"]);
        assert_eq!(cv.education[0].year, "2016");
        assert_eq!(
            cv.experiences[0].context,
            TextOrLines::Lines(vec!["Migration".into(), "Cloud".into()])
        );
        assert_eq!(
            cv.experiences[0].environment,
            TextOrLines::Text("Spark, Airflow".into())
        );
        assert_eq!(cv.other_references[0].employer, "Sonatel");
        assert_eq!(cv.notable_projects, vec!["Data lake"]);
    }

    #[test]
    fn test_missing_and_null_fields_are_empty() {
        let json = r#"{"nom_prenom": null, "experiences": [{"periode": null, "realisations": null}]}"#;
        let cv: CvRecord = serde_json::from_str(json).unwrap();
        assert!(cv.full_name.is_empty());
        assert!(cv.about.is_blank());
        assert!(cv.skills.is_empty());
        assert_eq!(cv.experiences.len(), 1);
        assert!(cv.experiences[0].achievements.is_empty());
    }

    #[test]
    fn test_empty_object_is_default_record() {
        let cv: CvRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(cv, CvRecord::default());
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        let result = serde_json::from_str::<CvRecord>(r#"{"competences": "Rust"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_text_or_lines_blankness() {
        assert!(TextOrLines::from("   ").is_blank());
        assert!(TextOrLines::from(vec!["", "  "]).is_blank());
        assert_eq!(TextOrLines::from(vec![" a ", "", "b"]).lines(), vec!["a", "b"]);
        assert_eq!(TextOrLines::from(" x ").lines(), vec!["x"]);
    }

    #[test]
    fn test_achievement_items_fall_back_to_missions() {
        let mut exp = Experience {
            missions: vec!["A".into(), "B".into()],
            ..Default::default()
        };
        assert_eq!(exp.achievement_items(), ["A", "B"]);
        exp.achievements = vec!["".into(), "  ".into()];
        assert_eq!(exp.achievement_items(), ["A", "B"]);
        exp.achievements = vec!["C".into()];
        assert_eq!(exp.achievement_items(), ["C"]);
    }

    #[test]
    fn test_serializes_with_french_keys() {
        let cv = CvRecord {
            full_name: "Awa".into(),
            ..Default::default()
        };
        let value = serde_json::to_value(&cv).unwrap();
        assert_eq!(value["nom_prenom"], "Awa");
        assert!(value.get("projets_marquants").is_some());
    }
}
