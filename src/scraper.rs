use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tracing::info;

use crate::model::RawCompanyRecord;

/// Supplies the raw records for one sync. Ids must be unique and stable
/// for the lifetime of the process.
#[async_trait]
pub trait RecordSource: Send + Sync {
    async fn fetch(&self) -> Result<Vec<RawCompanyRecord>>;
}

/// Stand-in for a live scraper: serves a fixed record set after a delay.
pub struct FixtureScraper {
    records: Vec<RawCompanyRecord>,
    delay: Duration,
}

impl FixtureScraper {
    pub fn new(records: Vec<RawCompanyRecord>, delay: Duration) -> Self {
        FixtureScraper { records, delay }
    }

    /// The bundled eight-company batch.
    pub fn bundled(delay: Duration) -> Self {
        Self::new(bundled_records(), delay)
    }
}

#[async_trait]
impl RecordSource for FixtureScraper {
    async fn fetch(&self) -> Result<Vec<RawCompanyRecord>> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        info!("Scraped {} company records", self.records.len());
        Ok(self.records.clone())
    }
}

const BUNDLED: &[(&str, &str, &str, &str, &str)] = &[
    (
        "c1",
        "LegalMind",
        "W24",
        "legalmind.ai",
        "We help law firms automate contract review using large language models. Our system catches 95% of errors that junior associates miss.",
    ),
    (
        "c2",
        "BioFold",
        "W24",
        "biofold.bio",
        "Generative protein design for novel therapeutics. We use diffusion models to create new drug candidates in minutes.",
    ),
    (
        "c3",
        "SalesAgent.io",
        "W24",
        "salesagent.io",
        "Autonomous voice agents for outbound sales calls. It sounds exactly like a human and can handle objections in real-time.",
    ),
    (
        "c4",
        "DevFlow",
        "S23",
        "devflow.dev",
        "An internal developer portal that organizes microservices. Not AI-based, purely for orchestration.",
    ),
    (
        "c5",
        "VideoGen X",
        "W24",
        "videogenx.com",
        "Text-to-video generation for marketing teams. Create high-quality social media ads from a simple prompt.",
    ),
    (
        "c6",
        "VectorScale",
        "S23",
        "vectorscale.db",
        "The fastest vector database for RAG applications. Optimized for low latency retrieval at billion-scale.",
    ),
    (
        "c7",
        "FinPilot",
        "W24",
        "finpilot.com",
        "An AI copilot for investment bankers. It automates financial modeling and slide deck creation.",
    ),
    (
        "c8",
        "GreenEnergy",
        "S23",
        "greenenergy.co",
        "Next generation solar panels with 5% higher efficiency. Hardware startup focused on renewable materials.",
    ),
];

pub fn bundled_records() -> Vec<RawCompanyRecord> {
    BUNDLED
        .iter()
        .map(|&(id, name, batch, website, description)| RawCompanyRecord {
            id: id.to_string(),
            name: name.to_string(),
            batch: batch.to_string(),
            raw_description: description.to_string(),
            website: website.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bundled_ids_unique() {
        let records = bundled_records();
        assert_eq!(records.len(), 8);
        let ids: HashSet<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids.len(), records.len());
    }

    #[tokio::test]
    async fn fixture_serves_records_in_order() {
        let scraper = FixtureScraper::bundled(Duration::ZERO);
        let records = scraper.fetch().await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names.first(), Some(&"LegalMind"));
        assert_eq!(names.last(), Some(&"GreenEnergy"));
    }

    #[tokio::test(start_paused = true)]
    async fn fixture_waits_for_delay() {
        let scraper = FixtureScraper::new(Vec::new(), Duration::from_millis(1500));
        let start = tokio::time::Instant::now();
        let records = scraper.fetch().await.unwrap();
        assert!(records.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(1500));
    }
}
