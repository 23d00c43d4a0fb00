use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::SYSTEM_INSTRUCTION;
use crate::error::{ClassifyError, DataError};
use crate::model::{Analysis, AnalysisMap};
use crate::settings::Settings;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Thin client for the `generateContent` endpoint with a structured-output schema.
pub struct GeminiClient {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: &str, model: &str, endpoint: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::with_http(http, api_key, model, endpoint))
    }

    pub fn with_http(http: reqwest::Client, api_key: &str, model: &str, endpoint: &str) -> Self {
        GeminiClient {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }

    /// `None` when no API key is configured.
    pub fn from_settings(settings: &Settings) -> Result<Option<Self>> {
        settings
            .api_key
            .as_deref()
            .map(|key| {
                Self::new(
                    key,
                    &settings.model,
                    &settings.endpoint,
                    settings.timeout(),
                )
            })
            .transpose()
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }

    /// Single request, no retries.
    pub async fn generate(&self, prompt: &str) -> Result<AnalysisMap, ClassifyError> {
        let url = self.url();
        debug!(%url, prompt_chars = prompt.len(), "Sending classification request");

        let response = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClassifyError::Status { status, body });
        }

        let text = response_text(&body)?;
        let decoded = decode_results(&text)?;
        if !decoded.rejected.is_empty() {
            warn!(
                rejected = decoded.rejected.len(),
                "Skipped malformed entries in classification response"
            );
        }
        Ok(decoded.analyses)
    }
}

fn request_body(prompt: &str) -> Value {
    json!({
        "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        }
    })
}

/// Structured-output schema: `{ results: [ {id, isAiNative, ...} ] }`.
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "description": "Analysis results keyed by company ID",
        "properties": {
            "results": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "id": { "type": "STRING" },
                        "isAiNative": { "type": "BOOLEAN" },
                        "category": { "type": "STRING" },
                        "subCategory": { "type": "STRING" },
                        "summary": { "type": "STRING" },
                        "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
                    },
                    "required": ["id", "isAiNative", "category", "subCategory", "summary", "tags"]
                }
            }
        },
        "required": ["results"]
    })
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

/// Concatenated text parts of the first candidate.
fn response_text(body: &str) -> Result<String, ClassifyError> {
    let envelope: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| ClassifyError::Malformed(format!("response envelope: {}", e)))?;
    let text: String = envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(ClassifyError::EmptyResponse);
    }
    Ok(text)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ResultEntry {
    id: String,
    is_ai_native: bool,
    category: String,
    sub_category: String,
    summary: String,
    tags: Vec<String>,
}

#[derive(Debug)]
pub struct Decoded {
    pub analyses: AnalysisMap,
    pub rejected: Vec<DataError>,
}

/// Decode the model's JSON document.
///
/// The document itself must parse and carry a `results` array, otherwise the
/// whole call fails. Individual entries that miss a field, carry an unknown
/// one or have an empty id are rejected and skipped. A repeated id overwrites
/// the earlier entry.
pub fn decode_results(text: &str) -> Result<Decoded, ClassifyError> {
    let doc: Value = serde_json::from_str(text)
        .map_err(|e| ClassifyError::Malformed(format!("results document: {}", e)))?;
    let entries = doc
        .get("results")
        .and_then(Value::as_array)
        .ok_or_else(|| ClassifyError::Malformed("missing `results` array".to_string()))?;

    let mut analyses = AnalysisMap::with_capacity(entries.len());
    let mut rejected = Vec::new();

    for (index, entry) in entries.iter().enumerate() {
        let parsed = match ResultEntry::deserialize(entry) {
            Ok(e) if e.id.trim().is_empty() => Err("empty id".to_string()),
            Ok(e) => Ok(e),
            Err(e) => Err(e.to_string()),
        };
        let entry = match parsed {
            Ok(e) => e,
            Err(reason) => {
                let err = DataError::InvalidEntry { index, reason };
                warn!("{}", err);
                rejected.push(err);
                continue;
            }
        };

        let analysis = Analysis {
            is_ai_native: entry.is_ai_native,
            category: entry.category,
            sub_category: entry.sub_category,
            summary: entry.summary,
            tags: entry.tags,
        };
        if analyses.insert(entry.id.clone(), analysis).is_some() {
            debug!(id = %entry.id, "Duplicate id in response, keeping later entry");
        }
    }

    Ok(Decoded { analyses, rejected })
}
