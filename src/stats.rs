use std::collections::HashMap;

use serde::Serialize;

use crate::model::Company;

/// Landscape key for companies without an analysis.
pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Serialize)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub companies: Vec<&'a Company>,
}

/// Partition companies by category.
///
/// Groups appear in order of first appearance and keep input order inside.
pub fn group_by_category(companies: &[Company]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for company in companies {
        let category = company
            .analysis()
            .map(|a| a.category.as_str())
            .unwrap_or(UNCATEGORIZED);
        let slot = *index.entry(category).or_insert_with(|| {
            groups.push(CategoryGroup {
                category,
                companies: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].companies.push(company);
    }

    groups
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub name: String,
    pub value: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendStats {
    /// AI-native companies per category, highest count first. Equal counts
    /// keep the order in which the category first appeared.
    pub category_distribution: Vec<Count>,
    /// AI-native companies per batch, in order of first appearance.
    pub batch_distribution: Vec<Count>,
    pub total_ai_native: usize,
    pub total: usize,
}

impl TrendStats {
    /// Share of AI-native companies, rounded half up. 0 for an empty set.
    pub fn penetration_percent(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        ((self.total_ai_native * 200 + self.total) / (self.total * 2)) as u32
    }

    pub fn top_category(&self) -> Option<&str> {
        self.category_distribution.first().map(|c| c.name.as_str())
    }
}

pub fn compute_stats(companies: &[Company]) -> TrendStats {
    let ai_native: Vec<&Company> = companies.iter().filter(|c| c.is_ai_native()).collect();

    let mut category_distribution = count_in_order(
        ai_native
            .iter()
            .filter_map(|c| c.analysis())
            .map(|a| a.category.as_str()),
    );
    // stable: ties stay in first-appearance order
    category_distribution.sort_by(|a, b| b.value.cmp(&a.value));

    let batch_distribution = count_in_order(ai_native.iter().map(|c| c.record.batch.as_str()));

    TrendStats {
        category_distribution,
        batch_distribution,
        total_ai_native: ai_native.len(),
        total: companies.len(),
    }
}

fn count_in_order<'a>(names: impl Iterator<Item = &'a str>) -> Vec<Count> {
    let mut counts: Vec<Count> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for name in names {
        match index.get(name) {
            Some(&i) => counts[i].value += 1,
            None => {
                index.insert(name, counts.len());
                counts.push(Count {
                    name: name.to_string(),
                    value: 1,
                });
            }
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{analysis, record};
    use std::collections::HashSet;

    fn company(id: &str, batch: &str, category: Option<(&str, bool)>) -> Company {
        let r = record(id, batch, "");
        match category {
            Some((cat, ai)) => Company::analyzed(r, analysis(cat, ai)),
            None => Company::unanalyzed(r),
        }
    }

    fn names(counts: &[Count]) -> Vec<(&str, usize)> {
        counts.iter().map(|c| (c.name.as_str(), c.value)).collect()
    }

    #[test]
    fn grouping_is_a_partition() {
        let companies = vec![
            company("c1", "W24", Some(("Healthcare", true))),
            company("c2", "W24", None),
            company("c3", "S23", Some(("Infrastructure", false))),
            company("c4", "S23", Some(("Healthcare", false))),
            company("c5", "W24", None),
        ];
        let groups = group_by_category(&companies);

        let mut seen = Vec::new();
        for g in &groups {
            seen.extend(g.companies.iter().map(|c| c.id()));
        }
        assert_eq!(seen.len(), companies.len());
        let unique: HashSet<_> = seen.iter().collect();
        assert_eq!(unique.len(), companies.len());

        let keys: Vec<&str> = groups.iter().map(|g| g.category).collect();
        assert_eq!(keys, vec!["Healthcare", UNCATEGORIZED, "Infrastructure"]);
        let health: Vec<&str> = groups[0].companies.iter().map(|c| c.id()).collect();
        assert_eq!(health, vec!["c1", "c4"]);
        let uncategorized: Vec<&str> = groups[1].companies.iter().map(|c| c.id()).collect();
        assert_eq!(uncategorized, vec!["c2", "c5"]);
    }

    #[test]
    fn grouping_keeps_novel_categories() {
        let companies = vec![company("c1", "W24", Some(("Space & Defense", true)))];
        let groups = group_by_category(&companies);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, "Space & Defense");
    }

    #[test]
    fn grouping_empty() {
        assert!(group_by_category(&[]).is_empty());
    }

    #[test]
    fn stats_empty() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total, 0);
        assert_eq!(stats.total_ai_native, 0);
        assert!(stats.category_distribution.is_empty());
        assert!(stats.batch_distribution.is_empty());
        assert_eq!(stats.penetration_percent(), 0);
        assert_eq!(stats.top_category(), None);
    }

    #[test]
    fn stats_only_count_ai_native() {
        let companies = vec![
            company("c1", "W24", Some(("Healthcare", true))),
            company("c2", "S23", Some(("Healthcare", false))),
            company("c3", "S23", None),
            company("c4", "S23", Some(("Infrastructure", true))),
        ];
        let stats = compute_stats(&companies);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.total_ai_native, 2);
        assert_eq!(stats.penetration_percent(), 50);
        assert_eq!(
            names(&stats.category_distribution),
            vec![("Healthcare", 1), ("Infrastructure", 1)]
        );
        assert_eq!(names(&stats.batch_distribution), vec![("W24", 1), ("S23", 1)]);
    }

    #[test]
    fn category_ties_keep_first_appearance() {
        let companies = vec![
            company("c1", "W24", Some(("Other", true))),
            company("c2", "W24", Some(("Healthcare", true))),
            company("c3", "W24", Some(("Infrastructure", true))),
            company("c4", "W24", Some(("Healthcare", true))),
            company("c5", "W24", Some(("Infrastructure", true))),
        ];
        let stats = compute_stats(&companies);
        assert_eq!(
            names(&stats.category_distribution),
            vec![("Healthcare", 2), ("Infrastructure", 2), ("Other", 1)]
        );
        assert_eq!(stats.top_category(), Some("Healthcare"));
    }

    #[test]
    fn batches_in_first_appearance_order() {
        let companies = vec![
            company("c1", "S23", Some(("A", true))),
            company("c2", "W24", Some(("A", true))),
            company("c3", "W24", Some(("A", true))),
            company("c4", "S22", Some(("A", false))),
        ];
        let stats = compute_stats(&companies);
        assert_eq!(names(&stats.batch_distribution), vec![("S23", 1), ("W24", 2)]);
    }

    #[test]
    fn penetration_rounds_half_up() {
        let mk = |ai: usize, total: usize| TrendStats {
            category_distribution: Vec::new(),
            batch_distribution: Vec::new(),
            total_ai_native: ai,
            total,
        };
        assert_eq!(mk(1, 3).penetration_percent(), 33);
        assert_eq!(mk(2, 3).penetration_percent(), 67);
        assert_eq!(mk(1, 8).penetration_percent(), 13);
        assert_eq!(mk(5, 8).penetration_percent(), 63);
        assert_eq!(mk(8, 8).penetration_percent(), 100);
        assert_eq!(mk(0, 8).penetration_percent(), 0);
    }
}
