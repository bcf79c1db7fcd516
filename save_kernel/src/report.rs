//! Rectification report: what the rectifier changed and why.

use serde_json::Value;

/// Outcome of the version gate.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// Save matched the current version and was kept.
    Current,
    /// Save was discarded for the buy-out state. `found` is the version
    /// value the save carried.
    BoughtOut { found: Value },
    /// Save passed the gate but the repaired object still failed to become
    /// a typed state, so it was discarded for the buy-out state.
    Unconvertible { error: String },
}

/// Structured record of a single rectification.
#[derive(Debug, Clone, PartialEq)]
pub struct RectifyReport {
    pub verdict: Verdict,
    /// Schema fields absent on the raw object, left at blank defaults.
    pub defaulted: Vec<&'static str>,
    /// Schema fields present with an unacceptable value, reset to default.
    pub rejected: Vec<&'static str>,
    /// Keys not in the schema and not consumed by any rule.
    pub ignored: Vec<String>,
    /// Descriptions of compatibility rules that changed something.
    pub applied_rules: Vec<String>,
}

impl RectifyReport {
    pub(crate) fn new() -> Self {
        Self {
            verdict: Verdict::Current,
            defaulted: Vec::new(),
            rejected: Vec::new(),
            ignored: Vec::new(),
            applied_rules: Vec::new(),
        }
    }

    pub fn is_bought_out(&self) -> bool {
        matches!(
            self.verdict,
            Verdict::BoughtOut { .. } | Verdict::Unconvertible { .. }
        )
    }

    /// True when the raw object was already a complete, current save.
    pub fn is_clean(&self) -> bool {
        !self.is_bought_out()
            && self.defaulted.is_empty()
            && self.rejected.is_empty()
            && self.ignored.is_empty()
            && self.applied_rules.is_empty()
    }

    /// One-line summary for logs.
    pub fn summary(&self) -> String {
        match &self.verdict {
            Verdict::BoughtOut { found } => format!("bought out (found version {})", found),
            Verdict::Unconvertible { error } => format!("bought out (unconvertible: {})", error),
            Verdict::Current if self.is_clean() => "clean".to_string(),
            Verdict::Current => format!(
                "defaulted={} rejected={} ignored={} rules={}",
                self.defaulted.len(),
                self.rejected.len(),
                self.ignored.len(),
                self.applied_rules.len()
            ),
        }
    }
}
