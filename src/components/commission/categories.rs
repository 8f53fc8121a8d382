use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::environment::types::{CommissionPlan, CommissionSheet};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Category {
    Individual,
    Professional,
    Business,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

/// Keyword rules mapping free-text sheet labels to a [`Category`].
///
/// Rules are checked in order, so more specific buckets come first:
/// "Self Employed Professional" contains both `selfemployed` and, inside
/// "employed", `pl`.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CategoryTable {
    pub version: u32,
    pub rules: Vec<CategoryRule>,
    pub fallback: Category,
}

lazy_static::lazy_static! {
    pub static ref DEFAULT_TABLE: CategoryTable = CategoryTable::default();
}

fn rule(category: Category, keywords: &[&str]) -> CategoryRule {
    CategoryRule {
        category,
        keywords: keywords.iter().map(|k| k.to_string()).collect(),
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self {
            version: 1,
            rules: vec![
                rule(Category::Professional, &["professional", "sep"]),
                rule(Category::Individual, &["individual", "personal", "pl", "consumer"]),
                rule(
                    Category::Business,
                    &[
                        "business",
                        "selfemployed",
                        "sme",
                        "msme",
                        "bl",
                        "od",
                        "currentaccount",
                        "workingcapital",
                    ],
                ),
            ],
            fallback: Category::Business,
        }
    }
}

/// Lowercase and drop everything that is not a letter or digit.
fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

impl CategoryTable {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// `None` when no rule matches.
    pub fn try_classify(&self, label: &str) -> Option<Category> {
        let normalized = normalize(label);
        self.rules
            .iter()
            .find(|rule| {
                rule.keywords
                    .iter()
                    .any(|keyword| normalized.contains(keyword.as_str()))
            })
            .map(|rule| rule.category)
    }

    pub fn classify(&self, label: &str) -> Category {
        self.try_classify(label).unwrap_or_else(|| {
            log::debug!("Unmatched sheet type {label:?}, using {}", self.fallback);
            self.fallback
        })
    }
}

pub fn category_of(label: &str) -> Category {
    DEFAULT_TABLE.classify(label)
}

/// A plan's sheets split into the three buckets, keeping sheet order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategorizedPlan {
    pub individual: Vec<CommissionSheet>,
    pub professional: Vec<CommissionSheet>,
    pub business: Vec<CommissionSheet>,
}

impl CategorizedPlan {
    pub fn sheets(&self, category: Category) -> &[CommissionSheet] {
        match category {
            Category::Individual => &self.individual,
            Category::Professional => &self.professional,
            Category::Business => &self.business,
        }
    }
}

pub fn categorize_plan(plan: &CommissionPlan, table: &CategoryTable) -> CategorizedPlan {
    let mut grouped = plan
        .sheets
        .iter()
        .cloned()
        .into_group_map_by(|sheet| table.classify(&sheet.sheet_type));
    CategorizedPlan {
        individual: grouped.remove(&Category::Individual).unwrap_or_default(),
        professional: grouped.remove(&Category::Professional).unwrap_or_default(),
        business: grouped.remove(&Category::Business).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_labels() {
        assert_eq!(category_of("Self Employed Professional"), Category::Professional);
        assert_eq!(category_of("PL Term Loan"), Category::Individual);
        assert_eq!(category_of("XYZ"), Category::Business);
        assert_eq!(category_of("MSME Working Capital"), Category::Business);
        assert_eq!(category_of("Working Capital / OD"), Category::Business);
        assert_eq!(category_of("Consumer Durable"), Category::Individual);
        assert_eq!(category_of("SEP - Doctors"), Category::Professional);
    }

    #[test]
    fn strict_lookup_surfaces_unmatched_labels() {
        assert_eq!(DEFAULT_TABLE.try_classify("XYZ"), None);
        assert_eq!(
            DEFAULT_TABLE.try_classify("Personal Loan"),
            Some(Category::Individual)
        );
    }

    #[test]
    fn table_can_be_loaded_from_config() {
        let json = r#"{
            "version": 2,
            "rules": [{ "category": "individual", "keywords": ["salaried"] }],
            "fallback": "professional"
        }"#;
        let table = CategoryTable::from_json(json).unwrap();
        assert_eq!(table.version, 2);
        assert_eq!(table.classify("Salaried PL"), Category::Individual);
        assert_eq!(table.classify("Business Loan"), Category::Professional);
    }

    #[test]
    fn plan_sheets_are_grouped_in_order() {
        let sheet = |name: &str| CommissionSheet {
            sheet_type: name.to_string(),
            entries: Vec::new(),
        };
        let plan = CommissionPlan {
            commission_type: Some("standard".into()),
            sheets: vec![
                sheet("Business Loan"),
                sheet("Personal Loan"),
                sheet("Unknown"),
                sheet("Professional Loan"),
            ],
        };
        let categorized = categorize_plan(&plan, &DEFAULT_TABLE);
        assert_eq!(categorized.individual, vec![sheet("Personal Loan")]);
        assert_eq!(categorized.professional, vec![sheet("Professional Loan")]);
        assert_eq!(
            categorized.sheets(Category::Business),
            &[sheet("Business Loan"), sheet("Unknown")]
        );
    }
}
