use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Deserialize;

/// Severity bucket a finding is filed under.
///
/// The declaration order is the display order of the report, so iterating a
/// [`RiskGroupedFindings`] visits categories High, Medium, Gas, QA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Risk {
    /// Critical/high severity, code `"3"`.
    High,
    /// Medium severity, code `"2"`.
    Medium,
    /// Gas optimisation, code `"G"`.
    Gas,
    /// Quality assurance, code `"Q"`.
    Qa,
}

impl Risk {
    /// All categories in display order.
    pub const ALL: [Risk; 4] = [Risk::High, Risk::Medium, Risk::Gas, Risk::Qa];

    /// Parses the short code used in finding data files. Unknown codes yield `None`.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "3" => Some(Risk::High),
            "2" => Some(Risk::Medium),
            "G" | "g" => Some(Risk::Gas),
            "Q" | "q" => Some(Risk::Qa),
            _ => None,
        }
    }

    /// Sheet name used in the report.
    pub const fn label(self) -> &'static str {
        match self {
            Risk::High => "High",
            Risk::Medium => "Medium",
            Risk::Gas => "Gas",
            Risk::Qa => "QA",
        }
    }
}

impl fmt::Display for Risk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One audit finding attributed to a participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindingRecord {
    pub handle: String,
    pub issue_url: String,
    pub issue_id: u64,
    pub risk: Risk,
}

/// On-disk/remote shape of a finding data file.
///
/// `handle` is only present in local exports; files fetched from GitHub carry
/// the author in their file name instead.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FindingFile {
    #[serde(default)]
    pub handle: Option<String>,
    pub risk: String,
    pub issue_url: String,
    pub issue_id: u64,
}

/// Total historical award per handle, as reported by the leaderboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AwardTable {
    totals: HashMap<String, f64>,
}

impl AwardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the total for a handle, replacing any earlier value.
    pub fn insert(&mut self, handle: impl Into<String>, total: f64) {
        self.totals.insert(handle.into(), total);
    }

    /// Award for `handle`; handles missing from the leaderboard count as zero.
    pub fn award(&self, handle: &str) -> f64 {
        self.totals.get(handle).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

impl FromIterator<(String, f64)> for AwardTable {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        let mut table = AwardTable::new();
        for (handle, total) in iter {
            table.insert(handle, total);
        }
        table
    }
}

/// Findings bucketed by risk. Categories without findings have no entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiskGroupedFindings {
    groups: BTreeMap<Risk, Vec<FindingRecord>>,
}

impl RiskGroupedFindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record to the sequence of its risk category.
    pub fn push(&mut self, record: FindingRecord) {
        self.groups.entry(record.risk).or_default().push(record);
    }

    pub fn get(&self, risk: Risk) -> Option<&[FindingRecord]> {
        self.groups.get(&risk).map(Vec::as_slice)
    }

    /// Iterates non-empty categories in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Risk, &[FindingRecord])> {
        self.groups
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(risk, records)| (*risk, records.as_slice()))
    }

    pub(crate) fn groups_mut(&mut self) -> impl Iterator<Item = (&Risk, &mut Vec<FindingRecord>)> {
        self.groups.iter_mut()
    }

    /// Total number of findings across all categories.
    pub fn len(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<FindingRecord> for RiskGroupedFindings {
    fn from_iter<I: IntoIterator<Item = FindingRecord>>(iter: I) -> Self {
        let mut grouped = RiskGroupedFindings::new();
        for record in iter {
            grouped.push(record);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(handle: &str, risk: Risk) -> FindingRecord {
        FindingRecord {
            handle: handle.to_string(),
            issue_url: format!("https://example.com/{handle}"),
            issue_id: 1,
            risk,
        }
    }

    #[test]
    fn risk_codes_map_to_labels() {
        assert_eq!(Risk::from_code("3"), Some(Risk::High));
        assert_eq!(Risk::from_code("2"), Some(Risk::Medium));
        assert_eq!(Risk::from_code("G"), Some(Risk::Gas));
        assert_eq!(Risk::from_code("Q"), Some(Risk::Qa));
        assert_eq!(Risk::from_code("1"), None);
        assert_eq!(Risk::Qa.label(), "QA");
    }

    #[test]
    fn missing_handle_has_zero_award() {
        let mut awards = AwardTable::new();
        awards.insert("alice", 10.0);
        awards.insert("alice", 25.5);
        assert_eq!(awards.award("alice"), 25.5);
        assert_eq!(awards.award("nobody"), 0.0);
        assert_eq!(awards.len(), 1);
    }

    #[test]
    fn grouping_keeps_insertion_order_and_display_order() {
        let grouped: RiskGroupedFindings = vec![
            record("carol", Risk::Qa),
            record("alice", Risk::High),
            record("bob", Risk::High),
        ]
        .into_iter()
        .collect();

        let risks: Vec<Risk> = grouped.iter().map(|(risk, _)| risk).collect();
        assert_eq!(risks, vec![Risk::High, Risk::Qa]);

        let high: Vec<&str> = grouped
            .get(Risk::High)
            .unwrap()
            .iter()
            .map(|r| r.handle.as_str())
            .collect();
        assert_eq!(high, vec!["alice", "bob"]);
        assert!(grouped.get(Risk::Medium).is_none());
        assert_eq!(grouped.len(), 3);
    }
}
