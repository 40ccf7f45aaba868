//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green   (completed, LOW risk, valid scenarios)
//!   - Warning/Active: yellow  (in progress, MEDIUM risk, slack)
//!   - Error/Blocked:  red     (at risk, HIGH risk, conflicts, breaks)
//!   - Info/Reference: cyan    (initiative and edge ids)
//!   - Muted:          dimmed  (field labels, draft/cancelled)
//!   - Emphasis:       bold    (section headers)

use crate::domain::InitiativeStatus;
use crate::schedule::RiskLevel;
use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Apply color to status text based on initiative status.
pub(crate) fn colorize_status(status: InitiativeStatus, config: &OutputConfig) -> String {
    let text = status.to_string();
    if !config.use_colors {
        return text;
    }
    match status {
        InitiativeStatus::Draft | InitiativeStatus::Cancelled => text.dimmed().to_string(),
        InitiativeStatus::Planned => text.white().to_string(),
        InitiativeStatus::InProgress | InitiativeStatus::OnHold => text.yellow().to_string(),
        InitiativeStatus::AtRisk => text.red().to_string(),
        InitiativeStatus::Completed => text.green().to_string(),
    }
}

/// Apply color to a risk level.
pub(crate) fn colorize_risk(level: RiskLevel, config: &OutputConfig) -> String {
    let text = level.to_string();
    if !config.use_colors {
        return text;
    }
    match level {
        RiskLevel::Low => text.green().to_string(),
        RiskLevel::Medium => text.yellow().to_string(),
        RiskLevel::High => text.red().bold().to_string(),
    }
}

/// Colorize an initiative or edge id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    info(id, config)
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}
