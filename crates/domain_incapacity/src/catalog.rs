//! Required-document rules per leave type

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::error;

use core_kernel::DomainPort;

use crate::document::DocumentKind;
use crate::incapacity::LeaveType;

/// Documents a claim of a given type and duration must carry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRuleset {
    /// Kinds the claim cannot be validated without
    pub mandatory: Vec<DocumentKind>,
    /// Kinds worth attaching but not blocking
    pub optional: Vec<DocumentKind>,
}

/// Result of a catalog lookup
///
/// `used_fallback` is true when the leave type had no configured rules and
/// the minimal certificate-only ruleset was substituted. Callers surface
/// that to an operator; the lookup itself never fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementsOutcome {
    pub ruleset: DocumentRuleset,
    pub used_fallback: bool,
}

/// A document required only when the claim exceeds a duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalRule {
    pub kind: DocumentKind,
    /// Rule applies when `duration_days` is strictly greater than this
    pub min_duration_days: i64,
}

/// Rule set configured for one leave type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveRules {
    pub mandatory: Vec<DocumentKind>,
    pub conditional: Vec<ConditionalRule>,
}

/// Source of document requirements, pure and side-effect free
pub trait RequiredDocumentsCatalog: DomainPort {
    /// Resolves the ruleset for a claim
    fn lookup(&self, leave_type: LeaveType, duration_days: i64) -> RequirementsOutcome;
}

/// Catalog backed by the fixed in-code rule table
#[derive(Debug, Clone)]
pub struct StandardCatalog {
    rules: HashMap<LeaveType, LeaveRules>,
}

impl StandardCatalog {
    /// Builds the catalog with rules for every leave type
    pub fn new() -> Self {
        use DocumentKind::*;

        let mut rules = HashMap::new();
        rules.insert(
            LeaveType::GeneralIllness,
            LeaveRules {
                mandatory: vec![MedicalCertificate],
                conditional: vec![ConditionalRule {
                    kind: Epicrisis,
                    min_duration_days: 2,
                }],
            },
        );
        rules.insert(
            LeaveType::WorkplaceAccident,
            LeaveRules {
                mandatory: vec![MedicalCertificate, Epicrisis],
                conditional: vec![],
            },
        );
        rules.insert(
            LeaveType::TrafficAccident,
            LeaveRules {
                mandatory: vec![MedicalCertificate, Epicrisis, Furips],
                conditional: vec![],
            },
        );
        let birth_documents = LeaveRules {
            mandatory: vec![
                MedicalCertificate,
                Epicrisis,
                LiveBirthCertificate,
                CivilRegistry,
                MotherIdentityDocument,
            ],
            conditional: vec![],
        };
        rules.insert(LeaveType::MaternityLeave, birth_documents.clone());
        rules.insert(LeaveType::PaternityLeave, birth_documents);

        Self { rules }
    }

    /// Builds a catalog from an explicit rule table
    ///
    /// Leave types absent from the table take the fallback path on lookup.
    pub fn with_rules(rules: HashMap<LeaveType, LeaveRules>) -> Self {
        Self { rules }
    }
}

impl Default for StandardCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPort for StandardCatalog {}

impl RequiredDocumentsCatalog for StandardCatalog {
    fn lookup(&self, leave_type: LeaveType, duration_days: i64) -> RequirementsOutcome {
        let Some(rules) = self.rules.get(&leave_type) else {
            error!(
                leave_type = %leave_type,
                "no document rules configured, applying certificate-only fallback"
            );
            return RequirementsOutcome {
                ruleset: DocumentRuleset {
                    mandatory: vec![DocumentKind::MedicalCertificate],
                    optional: vec![],
                },
                used_fallback: true,
            };
        };

        let mut mandatory = rules.mandatory.clone();
        let mut optional = Vec::new();
        for rule in &rules.conditional {
            if duration_days > rule.min_duration_days {
                mandatory.push(rule.kind);
            } else {
                optional.push(rule.kind);
            }
        }

        RequirementsOutcome {
            ruleset: DocumentRuleset { mandatory, optional },
            used_fallback: false,
        }
    }
}
