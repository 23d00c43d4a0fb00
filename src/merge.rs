use std::collections::HashSet;

use tracing::warn;

use crate::error::DataError;
use crate::model::{AnalysisMap, Company, RawCompanyRecord};

#[derive(Debug)]
pub struct Merged {
    pub companies: Vec<Company>,
    pub rejected: Vec<DataError>,
}

/// Join raw records with their analyses, preserving input order.
///
/// A record whose id was already seen is rejected; the first occurrence
/// stays. Records without an analysis come out unanalyzed.
pub fn merge(records: &[RawCompanyRecord], analyses: &AnalysisMap) -> Merged {
    let mut seen = HashSet::with_capacity(records.len());
    let mut companies = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        if !seen.insert(record.id.as_str()) {
            let err = DataError::DuplicateRecordId(record.id.clone());
            warn!("{}", err);
            rejected.push(err);
            continue;
        }
        let company = match analyses.get(&record.id) {
            Some(analysis) => Company::analyzed(record.clone(), analysis.clone()),
            None => Company::unanalyzed(record.clone()),
        };
        companies.push(company);
    }

    Merged {
        companies,
        rejected,
    }
}
