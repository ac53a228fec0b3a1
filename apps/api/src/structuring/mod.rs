//! Structuring: turns raw résumé text into a [`CvRecord`].
//!
//! `AppState` holds an `Arc<dyn CvStructurer>`. The production backend is
//! [`LlmStructurer`]; tests supply their own implementations.

pub mod prompts;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};

use crate::llm_client::prompts::{with_cv_text, JSON_ONLY_SYSTEM};
use crate::llm_client::{LlmClient, LlmError, LlmSettings};
use crate::models::cv::CvRecord;

#[derive(Debug, Error)]
pub enum StructureError {
    #[error("Structuring is not configured: {0}")]
    Configuration(String),

    #[error("Structuring service failed: {0}")]
    Upstream(String),

    #[error("Structuring service returned malformed data: {0}")]
    MalformedResponse(String),
}

impl From<LlmError> for StructureError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::Http(_) | LlmError::Api { .. } | LlmError::RateLimited { .. } => {
                StructureError::Upstream(e.to_string())
            }
            LlmError::Parse(_) | LlmError::EmptyContent => {
                StructureError::MalformedResponse(e.to_string())
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Text in, structured record out. Any failure aborts the conversion; there
/// is no partial record.
#[async_trait]
pub trait CvStructurer: Send + Sync {
    async fn structure(&self, text: &str) -> Result<CvRecord, StructureError>;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmStructurer
// ────────────────────────────────────────────────────────────────────────────

/// How much of the text a stage sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Head,
    Full,
}

struct Stage {
    name: &'static str,
    prompt: &'static str,
    scope: Scope,
}

const STAGES: [Stage; 3] = [
    Stage {
        name: "identity",
        prompt: prompts::IDENTITY_PROMPT,
        scope: Scope::Head,
    },
    Stage {
        name: "experiences",
        prompt: prompts::EXPERIENCES_PROMPT,
        scope: Scope::Full,
    },
    Stage {
        name: "education",
        prompt: prompts::EDUCATION_PROMPT,
        scope: Scope::Head,
    },
];

/// Prefix lengths, in characters, of the text sent to each kind of stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub head_chars: usize,
    pub full_chars: usize,
}

impl Default for Truncation {
    fn default() -> Self {
        Self {
            head_chars: 4000,
            full_chars: 8000,
        }
    }
}

/// Three chat calls (identity, experiences, education) merged into one record.
pub struct LlmStructurer {
    client: Option<LlmClient>,
    truncation: Truncation,
}

impl LlmStructurer {
    /// A missing `api_key` is accepted here and reported on first use.
    pub fn new(
        api_key: Option<String>,
        settings: LlmSettings,
        truncation: Truncation,
    ) -> Result<Self, StructureError> {
        let client = api_key
            .filter(|k| !k.trim().is_empty())
            .map(|key| LlmClient::new(key, settings))
            .transpose()
            .map_err(|e| StructureError::Configuration(e.to_string()))?;
        Ok(Self { client, truncation })
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    async fn run_stage(
        &self,
        client: &LlmClient,
        stage: &Stage,
        text: &str,
    ) -> Result<Map<String, Value>, StructureError> {
        let limit = match stage.scope {
            Scope::Head => self.truncation.head_chars,
            Scope::Full => self.truncation.full_chars,
        };
        let chunk = truncate_chars(text, limit);
        debug!(
            "Structuring stage '{}' on {} characters",
            stage.name,
            chunk.chars().count()
        );

        let value: Value = client
            .call_json(&with_cv_text(stage.prompt, chunk), JSON_ONLY_SYSTEM)
            .await?;
        match value {
            Value::Object(map) => Ok(map),
            other => Err(StructureError::MalformedResponse(format!(
                "stage '{}' returned {} instead of an object",
                stage.name,
                json_kind(&other)
            ))),
        }
    }
}

#[async_trait]
impl CvStructurer for LlmStructurer {
    async fn structure(&self, text: &str) -> Result<CvRecord, StructureError> {
        let client = self.client.as_ref().ok_or_else(|| {
            StructureError::Configuration("NVIDIA_API_KEY is not set".to_string())
        })?;

        let mut merged = Map::new();
        for stage in &STAGES {
            let part = self.run_stage(client, stage, text).await?;
            merged.extend(part);
        }

        let record = decode_record(merged)?;
        info!(
            "Structured CV for '{}' with model {}: {} experience(s), {} skill categories",
            record.full_name,
            client.model(),
            record.experiences.len(),
            record.skills.len()
        );
        Ok(record)
    }
}

/// Decodes merged stage output. Unknown keys are ignored.
pub fn decode_record(merged: Map<String, Value>) -> Result<CvRecord, StructureError> {
    serde_json::from_value(Value::Object(merged))
        .map_err(|e| StructureError::MalformedResponse(e.to_string()))
}

/// The first `limit` characters of `text`, never splitting a character.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((index, _)) => &text[..index],
        None => text,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{routing::post, Json, Router};
    use serde_json::json;

    use super::*;
    use crate::llm_client::tests::{completion, fast_settings, serve};

    /// Answers each stage by matching its prompt, recording the user messages.
    async fn stage_server(answers: [&'static str; 3]) -> (String, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |Json(body): Json<Value>| {
                let log = log.clone();
                async move {
                    let user = body["messages"][1]["content"].as_str().unwrap().to_string();
                    let answer = if user.starts_with(prompts::IDENTITY_PROMPT) {
                        answers[0]
                    } else if user.starts_with(prompts::EXPERIENCES_PROMPT) {
                        answers[1]
                    } else {
                        answers[2]
                    };
                    log.lock().unwrap().push(user);
                    Json(completion(answer))
                }
            }),
        );
        (serve(router).await, seen)
    }

    fn structurer(url: String, truncation: Truncation) -> LlmStructurer {
        LlmStructurer::new(Some("key".into()), fast_settings(url), truncation).unwrap()
    }

    #[test]
    fn test_truncate_chars_counts_characters() {
        assert_eq!(truncate_chars("élève", 3), "élè");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_llm_errors_map_to_structure_errors() {
        let api = LlmError::Api {
            status: 500,
            message: "down".into(),
        };
        assert!(matches!(StructureError::from(api), StructureError::Upstream(_)));
        assert!(matches!(
            StructureError::from(LlmError::EmptyContent),
            StructureError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn test_missing_key_is_configuration_error_at_call_time() {
        let structurer =
            LlmStructurer::new(None, LlmSettings::default(), Truncation::default()).unwrap();
        assert!(!structurer.is_configured());
        let err = structurer.structure("CV").await.unwrap_err();
        assert!(matches!(err, StructureError::Configuration(_)));

        let blank = LlmStructurer::new(Some("  ".into()), LlmSettings::default(), Truncation::default())
            .unwrap();
        assert!(!blank.is_configured());
    }

    #[tokio::test]
    async fn test_three_stages_are_merged() {
        let (url, seen) = stage_server([
            r#"{"nom_prenom": "Awa Diop", "langues": ["Wolof"]}"#,
            "```json\n{\"experiences\": [{\"entreprise\": \"Orange\", \"missions\": [\"A\"]}]}\n```",
            r#"{"formations": [{"annee": 2016, "diplome": "Master"}], "projets_marquants": null}"#,
        ])
        .await;
        let record = structurer(url, Truncation::default())
            .structure("Awa Diop\nData Engineer")
            .await
            .unwrap();

        assert_eq!(record.full_name, "Awa Diop");
        assert_eq!(record.languages, vec!["Wolof"]);
        assert_eq!(record.experiences[0].employer, "Orange");
        assert_eq!(record.education[0].year, "2016");
        assert!(record.notable_projects.is_empty());
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_stages_see_their_prefix_only() {
        let (url, seen) = stage_server(["{}", "{}", "{}"]).await;
        let truncation = Truncation {
            head_chars: 3,
            full_chars: 6,
        };
        structurer(url, truncation)
            .structure("abcdéfghij")
            .await
            .unwrap();

        let seen = seen.lock().unwrap();
        let texts: Vec<&str> = seen
            .iter()
            .map(|m| m.rsplit("CV:\n").next().unwrap())
            .collect();
        assert_eq!(texts, vec!["abc", "abcdéf", "abc"]);
    }

    #[tokio::test]
    async fn test_non_object_stage_is_malformed() {
        let (url, _) = stage_server(["{}", "[1, 2]", "{}"]).await;
        let err = structurer(url, Truncation::default())
            .structure("CV")
            .await
            .unwrap_err();
        assert!(matches!(err, StructureError::MalformedResponse(m) if m.contains("an array")));
    }

    #[tokio::test]
    async fn test_invalid_json_is_malformed() {
        let (url, _) = stage_server(["Désolé, je ne peux pas.", "{}", "{}"]).await;
        let err = structurer(url, Truncation::default())
            .structure("CV")
            .await
            .unwrap_err();
        assert!(matches!(err, StructureError::MalformedResponse(_)));
    }

    #[test]
    fn test_decode_rejects_wrong_shapes() {
        let mut map = Map::new();
        map.insert("competences".into(), json!("Rust"));
        assert!(matches!(
            decode_record(map),
            Err(StructureError::MalformedResponse(_))
        ));
    }
}
