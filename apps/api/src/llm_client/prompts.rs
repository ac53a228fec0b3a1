// Cross-cutting prompt fragments. Each caller keeps its task prompts in its
// own prompts.rs.

/// System prompt enforcing JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "Tu es un expert en extraction de données de CV. \
    Retourne UNIQUEMENT du JSON valide, sans markdown, sans explication.";

/// Separator placed between a task prompt and the résumé text.
pub const CV_TEXT_HEADER: &str = "\n\nCV:\n";

/// Builds the user message for one task over one slice of résumé text.
pub fn with_cv_text(task: &str, cv_text: &str) -> String {
    format!("{task}{CV_TEXT_HEADER}{cv_text}")
}
