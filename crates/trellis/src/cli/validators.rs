//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::domain::{ScenarioChange, ScenarioField};
use chrono::NaiveDate;

/// Maximum length of an initiative or edge id accepted on the command line
pub const MAX_ID_LENGTH: usize = 128;

/// Validate a project id.
///
/// Delegates to the domain validator in `commands::init` to maintain
/// a single source of truth for validation rules.
pub fn validate_project_id(s: &str) -> Result<String, String> {
    use crate::commands::init;

    let trimmed = s.trim();
    init::validate_project_id(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate an initiative or edge id.
///
/// Ids are opaque, so only the obvious mistakes are rejected: empty input,
/// embedded whitespace, and runaway length.
pub fn validate_record_id(s: &str) -> Result<String, String> {
    let s = s.trim();

    if s.is_empty() {
        return Err("Id cannot be empty".to_string());
    }

    if s.len() > MAX_ID_LENGTH {
        return Err(format!("Id cannot exceed {MAX_ID_LENGTH} characters"));
    }

    if s.chars().any(char::is_whitespace) {
        return Err(format!("Id '{s}' cannot contain whitespace"));
    }

    Ok(s.to_string())
}

/// Parse a scenario change of the form `<initiative>:<start|end>=<YYYY-MM-DD>`.
///
/// The field also accepts its stored spelling (`plannedStartDate`,
/// `plannedEndDate`).
pub fn parse_change(s: &str) -> Result<ScenarioChange, String> {
    let s = s.trim();
    let format_hint = "expected <initiative>:<start|end>=<YYYY-MM-DD>";

    let (target, date) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("Invalid change '{s}': {format_hint}"))?;
    let (id, field) = target
        .rsplit_once(':')
        .ok_or_else(|| format!("Invalid change '{s}': {format_hint}"))?;

    let id = validate_record_id(id)?;

    let field = match field.trim() {
        "start" | "plannedStartDate" => ScenarioField::PlannedStartDate,
        "end" | "plannedEndDate" => ScenarioField::PlannedEndDate,
        other => {
            return Err(format!(
                "Invalid field '{other}' in change '{s}': use 'start' or 'end'"
            ));
        }
    };

    let new_value = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|e| format!("Invalid date '{}' in change '{s}': {e}", date.trim()))?;

    Ok(ScenarioChange {
        initiative_id: id.into(),
        field,
        new_value,
    })
}
