//! Task cost arithmetic and project totals.

/// Something with billable hours at an hourly rate.
pub trait Billable {
    fn hours(&self) -> Option<f64>;
    fn cost_per_hour(&self) -> Option<f64>;
    /// Only top-level lines contribute to a project total.
    fn is_root(&self) -> bool;
}

/// Round to cents.
pub fn round_currency(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `hours * cost_per_hour`, treating missing values as zero.
pub fn line_cost(hours: Option<f64>, cost_per_hour: Option<f64>) -> f64 {
    round_currency(hours.unwrap_or(0.0) * cost_per_hour.unwrap_or(0.0))
}

/// Sum of root line costs. Subtasks are breakdowns of their parent and are not billed again.
pub fn project_total<T: Billable>(lines: &[T]) -> f64 {
    round_currency(
        lines
            .iter()
            .filter(|l| l.is_root())
            .map(|l| line_cost(l.hours(), l.cost_per_hour()))
            .sum(),
    )
}
