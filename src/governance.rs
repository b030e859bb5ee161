//! Governance annotation
//!
//! Pure scans over catalog records that raise advisory flags when an answer
//! touched sensitive or deprecated objects. Flags accumulate additively
//! across every tool execution in a conversation turn and are attached to
//! the final answer; they never block retrieval.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::catalog::{CertificationStatus, ColumnInfo, TableDetail};

/// Advisory flag attached to an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GovernanceFlag {
    Pii,
    Phi,
    Financial,
    Deprecated,
}

impl GovernanceFlag {
    /// Human-readable caption for rendering alongside an answer
    pub fn caption(&self) -> &'static str {
        match self {
            GovernanceFlag::Pii => "contains personally identifiable information",
            GovernanceFlag::Phi => "contains protected health information",
            GovernanceFlag::Financial => "contains financial data",
            GovernanceFlag::Deprecated => "references a deprecated object",
        }
    }
}

/// Deduplicated, ordered set of flags raised during one answer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GovernanceFlags(BTreeSet<GovernanceFlag>);

impl GovernanceFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, flag: GovernanceFlag) {
        self.0.insert(flag);
    }

    pub fn merge(&mut self, other: &GovernanceFlags) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn contains(&self, flag: GovernanceFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GovernanceFlag> {
        self.0.iter()
    }
}

/// Scan column tags for sensitivity markers. Matching is substring-based on
/// the uppercased tag, so "pii_email" and "Customer-PII" both raise `Pii`.
pub fn scan_columns(columns: &[ColumnInfo]) -> GovernanceFlags {
    let mut flags = GovernanceFlags::new();
    for column in columns {
        for tag in &column.classifications {
            let upper = tag.to_uppercase();
            if upper.contains("PII") {
                flags.insert(GovernanceFlag::Pii);
            }
            if upper.contains("PHI") {
                flags.insert(GovernanceFlag::Phi);
            }
            if upper.contains("FINANCIAL") {
                flags.insert(GovernanceFlag::Financial);
            }
        }
    }
    flags
}

/// Scan table trust metadata. Only a deprecated certification raises a flag;
/// certified, pending and unknown statuses pass through silently.
pub fn scan_table(table: &TableDetail) -> GovernanceFlags {
    let mut flags = GovernanceFlags::new();
    if table.certification == CertificationStatus::Deprecated {
        flags.insert(GovernanceFlag::Deprecated);
    }
    flags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column_with_flags(flags: Vec<&str>) -> ColumnInfo {
        ColumnInfo {
            name: Some("email".to_string()),
            data_type: None,
            description: None,
            nullable: None,
            classifications: flags.into_iter().map(String::from).collect(),
        }
    }

    fn table_with_certification(certification: CertificationStatus) -> TableDetail {
        TableDetail {
            name: Some("customers".to_string()),
            description: None,
            owner: None,
            steward: None,
            certification,
            trust_status: None,
            last_updated: None,
            sample_queries: Vec::new(),
        }
    }

    #[test]
    fn test_scan_columns_substring_match() {
        let columns = vec![
            column_with_flags(vec!["pii_email"]),
            column_with_flags(vec!["Customer-PHI"]),
        ];
        let flags = scan_columns(&columns);
        assert!(flags.contains(GovernanceFlag::Pii));
        assert!(flags.contains(GovernanceFlag::Phi));
        assert!(!flags.contains(GovernanceFlag::Financial));
    }

    #[test]
    fn test_scan_columns_no_tags_no_flags() {
        let columns = vec![column_with_flags(vec![]), column_with_flags(vec!["endorsed"])];
        assert!(scan_columns(&columns).is_empty());
    }

    #[test]
    fn test_scan_columns_one_tag_multiple_markers() {
        let columns = vec![column_with_flags(vec!["pii_financial_combined"])];
        let flags = scan_columns(&columns);
        assert!(flags.contains(GovernanceFlag::Pii));
        assert!(flags.contains(GovernanceFlag::Financial));
    }

    #[test]
    fn test_scan_table_deprecated_only() {
        let deprecated = table_with_certification(CertificationStatus::Deprecated);
        assert!(scan_table(&deprecated).contains(GovernanceFlag::Deprecated));

        assert!(scan_table(&table_with_certification(CertificationStatus::Certified)).is_empty());
        assert!(scan_table(&table_with_certification(CertificationStatus::Pending)).is_empty());
        assert!(scan_table(&table_with_certification(CertificationStatus::Unknown)).is_empty());
    }

    #[test]
    fn test_merge_deduplicates() {
        let mut a = GovernanceFlags::new();
        a.insert(GovernanceFlag::Pii);

        let mut b = GovernanceFlags::new();
        b.insert(GovernanceFlag::Pii);
        b.insert(GovernanceFlag::Deprecated);

        a.merge(&b);
        assert_eq!(a.iter().count(), 2);
    }

    #[test]
    fn test_flags_serialize_as_sequence() {
        let mut flags = GovernanceFlags::new();
        flags.insert(GovernanceFlag::Deprecated);
        flags.insert(GovernanceFlag::Pii);

        let value = serde_json::to_value(&flags).unwrap();
        // BTreeSet ordering: enum declaration order
        assert_eq!(value, serde_json::json!(["pii", "deprecated"]));
    }
}
