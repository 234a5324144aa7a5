//! Access-control policy for published items.
//!
//! The policy is an ordered list of exact-suffix rules evaluated first
//! match wins; a document matching no rule gets the default `everyone`
//! grant. Rules are data (built from `[[acl_rules]]` config tables), so
//! adding a per-document override is a config change, not a code change.

use searchbridge_shared::{AclEntry, AclRuleConfig};

/// One override: grants applied to documents whose relative path ends with
/// `suffix`.
#[derive(Debug, Clone)]
pub struct AclRule {
    pub suffix: String,
    pub grants: Vec<AclEntry>,
}

/// Ordered rule table mapping a relative path to its access grants.
#[derive(Debug, Clone, Default)]
pub struct AclPolicy {
    rules: Vec<AclRule>,
}

impl AclPolicy {
    /// Build a policy from an ordered rule list.
    pub fn new(rules: Vec<AclRule>) -> Self {
        Self { rules }
    }

    /// Build a policy from the config's `[[acl_rules]]` tables.
    pub fn from_config(rules: &[AclRuleConfig]) -> Self {
        let rules = rules
            .iter()
            .map(|rule| AclRule {
                suffix: rule.suffix.clone(),
                grants: rule
                    .grants
                    .iter()
                    .map(|g| match g.principal_type {
                        searchbridge_shared::PrincipalType::Everyone => AclEntry::everyone(),
                        searchbridge_shared::PrincipalType::User => AclEntry::user(&g.value),
                        searchbridge_shared::PrincipalType::Group => AclEntry::group(&g.value),
                    })
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Grants for a document. First matching rule wins; no match falls
    /// through to the default `everyone` grant. A rule with no grants
    /// cannot satisfy the one-grant minimum and is skipped.
    pub fn grants_for(&self, relative_path: &str) -> Vec<AclEntry> {
        for rule in &self.rules {
            if relative_path.ends_with(&rule.suffix) && !rule.grants.is_empty() {
                return rule.grants.clone();
            }
        }
        vec![AclEntry::everyone()]
    }
}
