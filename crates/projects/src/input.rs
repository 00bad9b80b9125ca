//! Coercion of caller-supplied project fields.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use projtrack_core::{DomainError, DomainResult};

/// Raw project fields as a client submits them.
///
/// Every value is optional text; blank strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub external_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub module_count: Option<String>,
}

/// Typed, editable project fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFields {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub module_count: u32,
}

/// Validated input for project creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProject {
    pub external_id: String,
    pub fields: ProjectFields,
}

impl ProjectInput {
    /// Fields for an update. Only dates are validated; the name is taken as given.
    pub fn into_fields(self) -> DomainResult<ProjectFields> {
        Ok(ProjectFields {
            name: self.name.map(|n| n.trim().to_string()).unwrap_or_default(),
            description: non_blank(self.description),
            start_date: parse_date("start_date", self.start_date)?,
            end_date: parse_date("end_date", self.end_date)?,
            module_count: coerce_module_count(self.module_count.as_deref()),
        })
    }

    /// Fields for creation: external id and name are required.
    pub fn into_new_project(mut self) -> DomainResult<NewProject> {
        let external_id = non_blank(self.external_id.take())
            .ok_or_else(|| DomainError::invalid_input("project id is required"))?;
        let fields = self.into_fields()?;
        if fields.name.is_empty() {
            return Err(DomainError::invalid_input("project name is required"));
        }
        Ok(NewProject {
            external_id,
            fields,
        })
    }
}

/// Coerce a free-form module count to a non-negative integer.
///
/// Anything that isn't a finite, non-negative number becomes 0; fractions are
/// truncated.
pub fn coerce_module_count(raw: Option<&str>) -> u32 {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return 0;
    };
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() && n >= 0.0 => n.trunc().min(f64::from(u32::MAX)) as u32,
        _ => 0,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_date(field: &str, value: Option<String>) -> DomainResult<Option<NaiveDate>> {
    match non_blank(value) {
        None => Ok(None),
        Some(v) => NaiveDate::parse_from_str(&v, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| DomainError::invalid_input(format!("{field} must be YYYY-MM-DD, got '{v}'"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> ProjectInput {
        ProjectInput {
            external_id: Some(" Pro1001 ".to_string()),
            name: Some("Billing revamp".to_string()),
            description: Some("   ".to_string()),
            start_date: Some("2024-03-01".to_string()),
            end_date: Some(String::new()),
            module_count: Some("4".to_string()),
        }
    }

    #[test]
    fn module_count_coercion() {
        assert_eq!(coerce_module_count(None), 0);
        assert_eq!(coerce_module_count(Some("")), 0);
        assert_eq!(coerce_module_count(Some("7")), 7);
        assert_eq!(coerce_module_count(Some(" 3.9 ")), 3);
        assert_eq!(coerce_module_count(Some("-2")), 0);
        assert_eq!(coerce_module_count(Some("abc")), 0);
        assert_eq!(coerce_module_count(Some("NaN")), 0);
        assert_eq!(coerce_module_count(Some("inf")), 0);
    }

    #[test]
    fn new_project_trims_and_normalizes_blanks() {
        let new = input().into_new_project().unwrap();
        assert_eq!(new.external_id, "Pro1001");
        assert_eq!(new.fields.description, None);
        assert_eq!(new.fields.start_date, NaiveDate::from_ymd_opt(2024, 3, 1));
        assert_eq!(new.fields.end_date, None);
        assert_eq!(new.fields.module_count, 4);
    }

    #[test]
    fn new_project_requires_external_id_and_name() {
        let mut missing_id = input();
        missing_id.external_id = Some("  ".to_string());
        assert!(matches!(
            missing_id.into_new_project(),
            Err(DomainError::InvalidInput(_))
        ));

        let mut missing_name = input();
        missing_name.name = None;
        assert!(matches!(
            missing_name.into_new_project(),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn malformed_date_is_invalid_input() {
        let mut bad = input();
        bad.end_date = Some("31/12/2024".to_string());
        let err = bad.into_fields().unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput(msg) if msg.contains("end_date")));
    }

    #[test]
    fn update_fields_accept_blank_name() {
        let fields = ProjectInput::default().into_fields().unwrap();
        assert_eq!(fields, ProjectFields::default());
    }
}
