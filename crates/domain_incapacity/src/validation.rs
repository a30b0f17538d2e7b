//! Documentation completeness check

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::DocumentRuleset;
use crate::document::DocumentKind;

/// Outcome of checking a claim's documents against its ruleset
///
/// Stored on the incapacity so reviewers see the latest evaluation without
/// re-running it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletenessReport {
    /// True when every mandatory document is attached
    pub complete: bool,
    /// Mandatory kinds still missing, in ruleset order
    pub missing: Vec<DocumentKind>,
    /// When the check ran
    pub evaluated_at: DateTime<Utc>,
}

impl CompletenessReport {
    /// Compares the ruleset against the kinds attached so far
    pub fn evaluate(
        ruleset: &DocumentRuleset,
        attached: &[DocumentKind],
        evaluated_at: DateTime<Utc>,
    ) -> Self {
        let missing: Vec<DocumentKind> = ruleset
            .mandatory
            .iter()
            .filter(|kind| !attached.contains(kind))
            .copied()
            .collect();

        Self {
            complete: missing.is_empty(),
            missing,
            evaluated_at,
        }
    }
}
