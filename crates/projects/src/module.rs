use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use projtrack_core::{DomainError, DomainResult, UserId};

/// Stable module identifier, unique within its project.
///
/// Allocated from the project's own counter and never reused, so a module keeps
/// its identity while positions shift around it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleId(pub u64);

impl core::fmt::Display for ModuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// A named sub-task embedded in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub id: ModuleId,
    pub name: String,
    #[serde(default)]
    pub done: bool,
    pub assigned_by: UserId,
    pub assigned_at: DateTime<Utc>,
}

/// A module name that is non-empty after trimming.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ModuleName(String);

impl ModuleName {
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(DomainError::invalid_input("module name required"));
        }
        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl core::fmt::Display for ModuleName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(ModuleName::parse("  Design DB\t").unwrap().as_str(), "Design DB");
    }

    #[test]
    fn blank_name_is_rejected() {
        for raw in ["", "   ", "\n\t"] {
            assert!(matches!(ModuleName::parse(raw), Err(DomainError::InvalidInput(_))));
        }
    }
}
