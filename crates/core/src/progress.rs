//! Completion percentages aggregated over a task tree.
//!
//! Each task carries an optional `percentage`: the share of its parent's work
//! it represents. A missing or zero share counts as 100 for the task itself
//! and as 0 when weighing it against its siblings.

use serde::Serialize;

use crate::error::CoreError;
use crate::task_tree::TaskTree;
use crate::types::Day;

/// Fields the progress calculation reads from a task.
pub trait ProgressNode {
    fn is_completed(&self) -> bool;
    fn percentage(&self) -> Option<f64>;
    fn deadline(&self) -> Option<Day> {
        None
    }
}

fn own_weight<T: ProgressNode>(node: &T) -> f64 {
    match node.percentage() {
        Some(p) if p > 0.0 => p,
        _ => 100.0,
    }
}

fn sibling_weight<T: ProgressNode>(node: &T) -> f64 {
    node.percentage().unwrap_or(0.0)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Completed share of a task, on the scale of its own weight.
///
/// A leaf contributes its full weight when completed. An inner node
/// contributes the rounded completed fraction of its children's weight,
/// scaled by its own weight and rounded to one decimal.
pub fn completed_percentage<T: ProgressNode>(tree: &TaskTree<T>) -> f64 {
    if tree.children.is_empty() {
        return if tree.node.is_completed() {
            own_weight(&tree.node)
        } else {
            0.0
        };
    }

    let assigned: f64 = tree.children.iter().map(|c| sibling_weight(&c.node)).sum();
    if assigned == 0.0 {
        return 0.0;
    }
    let done: f64 = tree
        .children
        .iter()
        .filter(|c| c.node.is_completed())
        .map(|c| sibling_weight(&c.node))
        .sum();

    let fraction = (done / assigned * 100.0).round();
    round_to(fraction * own_weight(&tree.node) / 100.0, 1)
}

/// Project completion: the sum of every root task's completed share.
pub fn project_completion<T: ProgressNode>(roots: &[TaskTree<T>]) -> f64 {
    round_to(roots.iter().map(completed_percentage).sum(), 1)
}

/// Sum of the percentages of completed children, rounded to a whole number.
pub fn children_progress<T: ProgressNode>(children: &[T]) -> f64 {
    children
        .iter()
        .filter(|c| c.is_completed())
        .map(sibling_weight)
        .sum::<f64>()
        .round()
}

/// Reject a sibling allocation outside 0..=100 each or above 100 in total.
pub fn validate_allocation(percentages: &[f64]) -> Result<(), CoreError> {
    if let Some(bad) = percentages
        .iter()
        .find(|p| !p.is_finite() || **p < 0.0 || **p > 100.0)
    {
        return Err(CoreError::Validation(format!(
            "Percentage {bad} must be between 0 and 100"
        )));
    }
    let total: f64 = percentages.iter().sum();
    if total > 100.0 + f64::EPSILON {
        return Err(CoreError::Validation(format!(
            "Percentages add up to {total}, which exceeds 100"
        )));
    }
    Ok(())
}

/// Share still unallocated among siblings, never negative.
pub fn remaining_allocation(percentages: &[f64]) -> f64 {
    (100.0 - percentages.iter().sum::<f64>()).max(0.0)
}

/// Headline counters shown on a project overview.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressSummary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub incomplete_tasks: usize,
    pub overdue_tasks: usize,
    pub completion: f64,
}

/// Counters over the root tasks plus overall completion.
///
/// A task is overdue when its deadline is before `today` and it is not completed.
pub fn summarize<T: ProgressNode>(roots: &[TaskTree<T>], today: Day) -> ProgressSummary {
    let total_tasks = roots.len();
    let completed_tasks = roots.iter().filter(|t| t.node.is_completed()).count();
    let overdue_tasks = roots
        .iter()
        .filter(|t| !t.node.is_completed() && t.node.deadline().is_some_and(|d| d < today))
        .count();

    ProgressSummary {
        total_tasks,
        completed_tasks,
        incomplete_tasks: total_tasks - completed_tasks,
        overdue_tasks,
        completion: project_completion(roots),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    #[derive(Debug, Clone)]
    struct T {
        done: bool,
        pct: Option<f64>,
        deadline: Option<Day>,
    }

    impl ProgressNode for T {
        fn is_completed(&self) -> bool {
            self.done
        }
        fn percentage(&self) -> Option<f64> {
            self.pct
        }
        fn deadline(&self) -> Option<Day> {
            self.deadline
        }
    }

    fn task(done: bool, pct: Option<f64>) -> T {
        T {
            done,
            pct,
            deadline: None,
        }
    }

    fn leaf(done: bool, pct: Option<f64>) -> TaskTree<T> {
        TaskTree {
            node: task(done, pct),
            children: vec![],
        }
    }

    fn inner(pct: Option<f64>, children: Vec<TaskTree<T>>) -> TaskTree<T> {
        TaskTree {
            node: task(false, pct),
            children,
        }
    }

    #[test]
    fn completed_leaf_without_share_counts_as_full() {
        assert_eq!(completed_percentage(&leaf(true, None)), 100.0);
        assert_eq!(completed_percentage(&leaf(true, Some(0.0))), 100.0);
        assert_eq!(completed_percentage(&leaf(true, Some(30.0))), 30.0);
        assert_eq!(completed_percentage(&leaf(false, Some(30.0))), 0.0);
    }

    #[test]
    fn inner_node_scales_child_fraction_by_own_share() {
        let tree = inner(
            Some(50.0),
            vec![leaf(true, Some(25.0)), leaf(false, Some(75.0))],
        );
        // 25 / 100 -> 25%, scaled by 50 -> 12.5
        assert_eq!(completed_percentage(&tree), 12.5);
    }

    #[test]
    fn fraction_is_rounded_before_scaling() {
        let tree = inner(
            Some(10.0),
            vec![
                leaf(true, Some(1.0)),
                leaf(false, Some(1.0)),
                leaf(false, Some(1.0)),
            ],
        );
        // round(33.33) = 33, * 10 / 100 = 3.3
        assert_eq!(completed_percentage(&tree), 3.3);
    }

    #[test]
    fn children_without_weight_yield_zero() {
        let tree = inner(None, vec![leaf(true, None), leaf(true, None)]);
        assert_eq!(completed_percentage(&tree), 0.0);
    }

    #[test]
    fn project_completion_sums_roots() {
        let roots = vec![
            leaf(true, Some(40.0)),
            inner(Some(60.0), vec![leaf(true, Some(50.0)), leaf(false, Some(50.0))]),
        ];
        assert_eq!(project_completion(&roots), 70.0);
    }

    #[test]
    fn children_progress_sums_completed_shares() {
        let children = vec![
            task(true, Some(33.4)),
            task(true, Some(20.0)),
            task(false, Some(40.0)),
            task(true, None),
        ];
        assert_eq!(children_progress(&children), 53.0);
        assert_eq!(children_progress::<T>(&[]), 0.0);
    }

    #[test]
    fn allocation_must_fit_in_one_hundred() {
        assert!(validate_allocation(&[50.0, 50.0]).is_ok());
        assert!(validate_allocation(&[]).is_ok());
        assert_matches!(
            validate_allocation(&[60.0, 50.0]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_allocation(&[-1.0]),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_allocation(&[101.0]),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn remaining_allocation_is_clamped() {
        assert_eq!(remaining_allocation(&[30.0, 20.0]), 50.0);
        assert_eq!(remaining_allocation(&[80.0, 40.0]), 0.0);
    }

    #[test]
    fn summary_counts_overdue_incomplete_roots() {
        let today = NaiveDate::from_ymd_opt(2024, 5, 10).unwrap();
        let past = NaiveDate::from_ymd_opt(2024, 5, 1);
        let roots = vec![
            TaskTree {
                node: T {
                    done: false,
                    pct: Some(50.0),
                    deadline: past,
                },
                children: vec![],
            },
            TaskTree {
                node: T {
                    done: true,
                    pct: Some(50.0),
                    deadline: past,
                },
                children: vec![],
            },
        ];

        let summary = summarize(&roots, today);
        assert_eq!(summary.total_tasks, 2);
        assert_eq!(summary.completed_tasks, 1);
        assert_eq!(summary.incomplete_tasks, 1);
        assert_eq!(summary.overdue_tasks, 1);
        assert_eq!(summary.completion, 50.0);
    }
}
