use std::str::FromStr;

use fieldward_core::AppError;
use serde::{Deserialize, Serialize};

/// Row-visibility rule set a storage call executes under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisibilityScope {
    /// Only rows the actor is entitled to see.
    Restricted,
    /// Every row regardless of actor.
    Unrestricted,
    /// Whatever rule the calling context already runs under.
    Inherited,
}

impl VisibilityScope {
    /// Returns a stable transport value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Restricted => "restricted",
            Self::Unrestricted => "unrestricted",
            Self::Inherited => "inherited",
        }
    }

    /// Returns all known scopes.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[VisibilityScope] = &[
            VisibilityScope::Restricted,
            VisibilityScope::Unrestricted,
            VisibilityScope::Inherited,
        ];

        ALL
    }

    /// Parses a transport value into a scope.
    pub fn from_transport(value: &str) -> Result<Self, AppError> {
        Self::from_str(value)
    }
}

impl std::fmt::Display for VisibilityScope {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for VisibilityScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "restricted" => Ok(Self::Restricted),
            "unrestricted" => Ok(Self::Unrestricted),
            "inherited" => Ok(Self::Inherited),
            "" => Err(AppError::Configuration(
                "visibility scope is required".to_owned(),
            )),
            other => Err(AppError::Configuration(format!(
                "unknown visibility scope '{other}'"
            ))),
        }
    }
}
