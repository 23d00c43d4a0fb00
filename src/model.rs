use std::collections::HashMap;

use serde::Serialize;

/// One company as delivered by the scraper. Never mutated after ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCompanyRecord {
    pub id: String,
    pub name: String,
    pub batch: String,
    pub raw_description: String,
    pub website: String,
}

/// Classification output for a single company.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub is_ai_native: bool,
    pub category: String,
    pub sub_category: String,
    pub summary: String,
    pub tags: Vec<String>,
}

/// Analyses keyed by company id.
pub type AnalysisMap = HashMap<String, Analysis>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CompanyStatus {
    New,
    Pending,
    Analyzed,
}

impl CompanyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            CompanyStatus::New => "new",
            CompanyStatus::Pending => "pending",
            CompanyStatus::Analyzed => "analyzed",
        }
    }
}

/// A raw record joined with its (optional) analysis.
///
/// Built only through the constructors below so that `status` is
/// `Analyzed` exactly when `analysis` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    #[serde(flatten)]
    pub record: RawCompanyRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<Analysis>,
    status: CompanyStatus,
}

impl Company {
    pub fn analyzed(record: RawCompanyRecord, analysis: Analysis) -> Self {
        Company {
            record,
            analysis: Some(analysis),
            status: CompanyStatus::Analyzed,
        }
    }

    /// Record that came back from a sync without an analysis.
    pub fn unanalyzed(record: RawCompanyRecord) -> Self {
        Company {
            record,
            analysis: None,
            status: CompanyStatus::New,
        }
    }

    /// Record queued for classification but not yet sent.
    pub fn pending(record: RawCompanyRecord) -> Self {
        Company {
            record,
            analysis: None,
            status: CompanyStatus::Pending,
        }
    }

    pub fn id(&self) -> &str {
        &self.record.id
    }

    pub fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn status(&self) -> CompanyStatus {
        self.status
    }

    pub fn is_ai_native(&self) -> bool {
        self.analysis.as_ref().is_some_and(|a| a.is_ai_native)
    }
}
