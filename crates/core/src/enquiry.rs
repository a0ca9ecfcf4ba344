//! Enquiry numbering and the enquiry-to-project conversion plan.

use serde::Serialize;

use crate::billing::{line_cost, round_currency};
use crate::error::CoreError;

pub const STATUS_ON_HOLD: &str = "on hold";
pub const STATUS_IN_PROGRESS: &str = "in progress";
pub const STATUS_QUOTED: &str = "quoted";
pub const STATUS_CANCELLED: &str = "cancelled";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_MOVED_TO_PROJECTS: &str = "moved to projects";

/// Status given to every new enquiry.
pub const INITIAL_STATUS: &str = STATUS_ON_HOLD;

/// Statuses from which an enquiry can no longer be converted.
pub const TERMINAL_STATUSES: &[&str] = &[STATUS_MOVED_TO_PROJECTS, STATUS_CANCELLED, STATUS_REJECTED];

/// Enquiry numbers are free-form but must be non-empty and free of whitespace.
pub fn validate_enquiry_number(number: &str) -> Result<(), CoreError> {
    if number.is_empty() || number.chars().any(char::is_whitespace) {
        return Err(CoreError::Validation(format!(
            "Enquiry number '{number}' must be non-empty and contain no whitespace"
        )));
    }
    Ok(())
}

/// Display id of an enquiry, e.g. `E-1042`.
pub fn enquiry_code(number: &str) -> String {
    format!("E-{number}")
}

/// Display id of the project an enquiry converts into, e.g. `P-1042`.
pub fn project_code(number: &str) -> String {
    format!("P-{number}")
}

/// Statuses are free text; this only trims and lowercases them.
pub fn normalize_status(status: &str) -> String {
    status.trim().to_lowercase()
}

pub fn is_terminal(status: &str) -> bool {
    let status = normalize_status(status);
    TERMINAL_STATUSES.contains(&status.as_str())
}

/// Cost of one deliverable.
pub fn deliverable_total(hours: Option<f64>, cost_per_hour: Option<f64>) -> f64 {
    line_cost(hours, cost_per_hour)
}

/// A deliverable as entered on the enquiry.
#[derive(Debug, Clone)]
pub struct DeliverableLine {
    pub name: String,
    pub description: Option<String>,
    pub hours: Option<f64>,
    pub cost_per_hour: Option<f64>,
}

/// A root task to create on conversion.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedTask {
    pub name: String,
    pub description: String,
    pub hours: f64,
    pub cost_per_hour: f64,
    pub total: f64,
}

/// What converting an enquiry will create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionPlan {
    pub project_number: String,
    pub project_code: String,
    pub total_amount: f64,
    pub root_tasks: Vec<PlannedTask>,
}

/// Plan the project and root tasks for an enquiry.
///
/// Every deliverable becomes one root task; the project total is the sum of
/// their costs. Enquiries in a terminal status are rejected with a conflict.
pub fn plan_conversion(
    enquiry_number: &str,
    status: &str,
    deliverables: Vec<DeliverableLine>,
) -> Result<ConversionPlan, CoreError> {
    if is_terminal(status) {
        return Err(CoreError::Conflict(format!(
            "Enquiry {} cannot be converted from status '{status}'",
            enquiry_code(enquiry_number)
        )));
    }

    let root_tasks: Vec<PlannedTask> = deliverables
        .into_iter()
        .map(|d| PlannedTask {
            total: deliverable_total(d.hours, d.cost_per_hour),
            hours: d.hours.unwrap_or(0.0),
            cost_per_hour: d.cost_per_hour.unwrap_or(0.0),
            description: d.description.unwrap_or_default(),
            name: d.name,
        })
        .collect();
    let total_amount = round_currency(root_tasks.iter().map(|t| t.total).sum());

    Ok(ConversionPlan {
        project_number: enquiry_number.to_string(),
        project_code: project_code(enquiry_number),
        total_amount,
        root_tasks,
    })
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn line(name: &str, hours: Option<f64>, rate: Option<f64>) -> DeliverableLine {
        DeliverableLine {
            name: name.into(),
            description: None,
            hours,
            cost_per_hour: rate,
        }
    }

    #[test]
    fn codes_share_the_enquiry_number() {
        assert_eq!(enquiry_code("1042"), "E-1042");
        assert_eq!(project_code("1042"), "P-1042");
    }

    #[test]
    fn enquiry_number_rejects_blank_values() {
        assert!(validate_enquiry_number("2024-07").is_ok());
        assert!(validate_enquiry_number("").is_err());
        assert!(validate_enquiry_number("12 3").is_err());
    }

    #[test]
    fn plan_creates_one_root_task_per_deliverable() {
        let plan = plan_conversion(
            "77",
            STATUS_ON_HOLD,
            vec![
                line("Design", Some(10.0), Some(50.0)),
                line("Review", Some(2.5), Some(40.0)),
                line("Misc", None, Some(40.0)),
            ],
        )
        .unwrap();

        assert_eq!(plan.project_code, "P-77");
        assert_eq!(plan.root_tasks.len(), 3);
        assert_eq!(plan.root_tasks[0].total, 500.0);
        assert_eq!(plan.root_tasks[2].hours, 0.0);
        assert_eq!(plan.root_tasks[2].total, 0.0);
        assert_eq!(plan.total_amount, 600.0);
    }

    #[test]
    fn converted_enquiries_cannot_convert_again() {
        assert_matches!(
            plan_conversion("1", "Moved To Projects", vec![]),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            plan_conversion("1", STATUS_CANCELLED, vec![]),
            Err(CoreError::Conflict(_))
        );
        assert!(plan_conversion("1", STATUS_QUOTED, vec![]).is_ok());
    }
}
