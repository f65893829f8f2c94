use log::debug;

use crate::models::{Finding, Placement, StagedFinding};

/// Ordered, append-mostly sink of findings consumed by the report renderer.
///
/// Two placements deviate from plain appending: `AfterFirst` keeps a
/// single finding of its category directly after the first entry, and
/// `Before(category)` slots a finding in front of an existing anchor.
#[derive(Debug, Default, Clone)]
pub struct FindingAggregator {
    findings: Vec<Finding>,
}

impl FindingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    pub fn place(&mut self, staged: StagedFinding) {
        let StagedFinding { finding, placement } = staged;
        match placement {
            Placement::Append => self.push(finding),
            Placement::AfterFirst => self.insert_after_first(finding),
            Placement::Before(anchor) => self.insert_before(&anchor, finding),
        }
    }

    /// At most one finding per category lives after the first entry;
    /// a repeat replaces the earlier payload in place.
    fn insert_after_first(&mut self, finding: Finding) {
        if let Some(existing) = self.findings.iter_mut().find(|f| f.category == finding.category) {
            debug!("Replacing existing {} finding", finding.category);
            existing.payload = finding.payload;
            return;
        }
        let index = self.findings.len().min(1);
        self.findings.insert(index, finding);
    }

    fn insert_before(&mut self, anchor: &str, finding: Finding) {
        match self.position(anchor) {
            Some(index) => self.findings.insert(index, finding),
            None => self.findings.push(finding),
        }
    }

    pub fn position(&self, category: &str) -> Option<usize> {
        self.findings.iter().position(|f| f.category == category)
    }

    pub fn contains(&self, category: &str) -> bool {
        self.position(category).is_some()
    }

    pub fn get(&self, category: &str) -> Option<&Finding> {
        self.findings.iter().find(|f| f.category == category)
    }

    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    pub fn into_findings(self) -> Vec<Finding> {
        self.findings
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }
}
