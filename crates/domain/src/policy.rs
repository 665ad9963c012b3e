use std::collections::{BTreeSet, HashSet};
use std::str::FromStr;

use fieldward_core::AppError;
use serde::{Deserialize, Serialize};

use crate::schema::normalize_field_name;

/// Strictness applied when a requested field is not allowed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationMode {
    /// Reject the whole call on the first disallowed field.
    #[default]
    AllOrNone,
    /// Silently drop disallowed fields.
    BestEffort,
}

impl OperationMode {
    /// Returns a stable transport value for this mode.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllOrNone => "all_or_none",
            Self::BestEffort => "best_effort",
        }
    }

    /// Parses a transport value into a mode.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl std::fmt::Display for OperationMode {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for OperationMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "all_or_none" => Ok(Self::AllOrNone),
            "best_effort" => Ok(Self::BestEffort),
            "" => Err(AppError::Configuration(
                "operation mode is required".to_owned(),
            )),
            other => Err(AppError::Configuration(format!(
                "unknown operation mode '{other}'"
            ))),
        }
    }
}

/// Outcome of filtering a requested field list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Normalized fields to apply, in request order without duplicates.
    Approved(Vec<String>),
    /// First requested field (request order) that is not allowed.
    Rejected {
        /// Normalized name of the rejected field.
        field: String,
    },
}

/// Field filter driven by an [`OperationMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionPolicy {
    mode: OperationMode,
}

impl PermissionPolicy {
    /// Creates a policy for the given mode.
    #[must_use]
    pub fn new(mode: OperationMode) -> Self {
        Self { mode }
    }

    /// Returns the configured mode.
    #[must_use]
    pub fn mode(&self) -> OperationMode {
        self.mode
    }

    /// Filters `requested` against `allowed`.
    ///
    /// Iterates in the caller's order so that an all-or-none rejection always
    /// names the same field for the same request.
    pub fn apply<S: AsRef<str>>(
        &self,
        requested: &[S],
        allowed: &BTreeSet<String>,
    ) -> PolicyDecision {
        let mut seen = HashSet::new();
        let mut approved = Vec::with_capacity(requested.len());

        for name in requested {
            let name = normalize_field_name(name.as_ref());
            if !seen.insert(name.clone()) {
                continue;
            }

            if allowed.contains(name.as_str()) {
                approved.push(name);
                continue;
            }

            if self.mode == OperationMode::AllOrNone {
                return PolicyDecision::Rejected { field: name };
            }
        }

        PolicyDecision::Approved(approved)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use fieldward_core::AppError;
    use proptest::prelude::*;

    use super::{OperationMode, PermissionPolicy, PolicyDecision};

    fn allowed(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| (*name).to_owned()).collect()
    }

    #[test]
    fn all_or_none_rejects_first_disallowed_in_request_order() {
        let policy = PermissionPolicy::new(OperationMode::AllOrNone);
        let decision = policy.apply(&["a", "z", "b"], &allowed(&["a"]));

        assert_eq!(
            decision,
            PolicyDecision::Rejected {
                field: "z".to_owned()
            }
        );
    }

    #[test]
    fn best_effort_keeps_request_order() {
        let policy = PermissionPolicy::new(OperationMode::BestEffort);
        let decision = policy.apply(&["C", "x", "a", "c"], &allowed(&["a", "c"]));

        assert_eq!(
            decision,
            PolicyDecision::Approved(vec!["c".to_owned(), "a".to_owned()])
        );
    }

    #[test]
    fn best_effort_with_nothing_allowed_approves_empty_set() {
        let policy = PermissionPolicy::new(OperationMode::BestEffort);
        let decision = policy.apply(&["a", "b"], &BTreeSet::new());

        assert_eq!(decision, PolicyDecision::Approved(Vec::new()));
    }

    #[test]
    fn unknown_mode_is_a_configuration_error() {
        let parsed = OperationMode::from_transport("strict");
        assert!(matches!(parsed, Err(AppError::Configuration(_))));
    }

    fn field_names() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-f]", 0..8)
    }

    proptest! {
        #[test]
        fn best_effort_is_exactly_the_intersection(
            requested in field_names(),
            allowed_names in field_names(),
        ) {
            let allowed: BTreeSet<String> = allowed_names.into_iter().collect();
            let policy = PermissionPolicy::new(OperationMode::BestEffort);

            let PolicyDecision::Approved(approved) = policy.apply(&requested, &allowed) else {
                return Err(TestCaseError::fail("best effort never rejects"));
            };

            let approved: BTreeSet<String> = approved.into_iter().collect();
            let expected: BTreeSet<String> = requested
                .iter()
                .filter(|name| allowed.contains(name.as_str()))
                .cloned()
                .collect();
            prop_assert_eq!(approved, expected);
        }

        #[test]
        fn best_effort_ignores_request_order(
            requested in field_names(),
            allowed_names in field_names(),
        ) {
            let allowed: BTreeSet<String> = allowed_names.into_iter().collect();
            let policy = PermissionPolicy::new(OperationMode::BestEffort);
            let mut reversed = requested.clone();
            reversed.reverse();

            let as_set = |decision: PolicyDecision| match decision {
                PolicyDecision::Approved(names) => names.into_iter().collect::<BTreeSet<_>>(),
                PolicyDecision::Rejected { .. } => BTreeSet::new(),
            };
            prop_assert_eq!(
                as_set(policy.apply(&requested, &allowed)),
                as_set(policy.apply(&reversed, &allowed))
            );
        }

        #[test]
        fn all_or_none_applies_subsets_and_rejects_the_rest(
            requested in field_names(),
            allowed_names in field_names(),
        ) {
            let allowed: BTreeSet<String> = allowed_names.into_iter().collect();
            let policy = PermissionPolicy::new(OperationMode::AllOrNone);
            let first_disallowed = requested
                .iter()
                .find(|name| !allowed.contains(name.as_str()))
                .cloned();

            match (policy.apply(&requested, &allowed), first_disallowed) {
                (PolicyDecision::Approved(approved), None) => {
                    let approved: BTreeSet<String> = approved.into_iter().collect();
                    let requested: BTreeSet<String> = requested.into_iter().collect();
                    prop_assert_eq!(approved, requested);
                }
                (PolicyDecision::Rejected { field }, Some(expected)) => {
                    prop_assert_eq!(field, expected);
                }
                (decision, expected) => {
                    return Err(TestCaseError::fail(format!(
                        "unexpected decision {decision:?} for first disallowed {expected:?}"
                    )));
                }
            }
        }
    }
}
