pub mod gemini;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::{info, warn};

use crate::error::ClassifyError;
use crate::model::{Analysis, AnalysisMap, RawCompanyRecord};
use gemini::GeminiClient;

pub const FALLBACK_CATEGORY: &str = "Uncategorized (No API Key)";

static AI_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)ai|model").unwrap());

pub const SYSTEM_INSTRUCTION: &str = "\
You are an expert venture capital analyst specializing in Artificial Intelligence.
Your task is to analyze a list of YC startups.
For each startup, determine:
1. Is it AI Native? (True/False)
2. Primary Category (e.g., Infrastructure, Healthcare, Sales & Marketing, Legal & Finance, Creative & Media, Developer Tools, Other)
3. Sub-Category (Specific niche, e.g., Vector DB, Agent, GenAI Video)
4. A concise 1-sentence summary of their innovation.
5. 3 key tags.

Return a JSON object with a `results` array holding one entry per company, each carrying the company ID.";

/// Turns a batch of raw records into analyses keyed by id.
///
/// Ids missing from the result are unanalyzed, not failed. One call carries
/// the whole batch and implementations never retry.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, records: &[RawCompanyRecord]) -> Result<AnalysisMap, ClassifyError>;
}

/// Classifier backed by the text-generation service, degrading to the
/// keyword heuristic when no API key is configured.
pub struct ModelClassifier {
    client: Option<GeminiClient>,
}

impl ModelClassifier {
    pub fn new(client: Option<GeminiClient>) -> Self {
        ModelClassifier { client }
    }
}

#[async_trait]
impl Classifier for ModelClassifier {
    async fn classify(&self, records: &[RawCompanyRecord]) -> Result<AnalysisMap, ClassifyError> {
        if records.is_empty() {
            return Ok(AnalysisMap::new());
        }
        let Some(client) = &self.client else {
            warn!(
                source = "fallback",
                reason = "missing_api_key",
                companies = records.len(),
                "No API key configured, using keyword heuristic"
            );
            return Ok(fallback_analyses(records));
        };

        let prompt = build_prompt(records);
        let analyses = client.generate(&prompt).await?;
        info!(
            source = "model",
            requested = records.len(),
            returned = analyses.len(),
            "Classification complete"
        );
        Ok(analyses)
    }
}

/// User prompt enumerating every record.
pub fn build_prompt(records: &[RawCompanyRecord]) -> String {
    let listing = records
        .iter()
        .map(|r| format!("ID: {}\nName: {}\nDescription: {}", r.id, r.name, r.raw_description))
        .collect::<Vec<_>>()
        .join("\n---\n");
    format!("Analyze these companies:\n\n{}", listing)
}

/// Deterministic stand-in used when the service cannot be called.
pub fn fallback_analyses(records: &[RawCompanyRecord]) -> AnalysisMap {
    records
        .iter()
        .map(|r| {
            let analysis = Analysis {
                is_ai_native: looks_ai_native(&r.raw_description),
                category: FALLBACK_CATEGORY.to_string(),
                sub_category: "General".to_string(),
                summary: "API Key missing. Cannot analyze.".to_string(),
                tags: vec!["No Key".to_string()],
            };
            (r.id.clone(), analysis)
        })
        .collect()
}

/// Substring match, so "maintain" counts as well.
fn looks_ai_native(description: &str) -> bool {
    AI_KEYWORD_RE.is_match(description)
}
