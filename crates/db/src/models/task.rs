//! Task entity model, assignees, timers and DTOs.

use pms_core::billing::Billable;
use pms_core::progress::ProgressNode;
use pms_core::task_tree::TreeNode;
use pms_core::time_tracking::TimerState;
use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table. `parent_id = NULL` marks a root task.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub description: Option<String>,
    pub hours: Option<f64>,
    pub cost_per_hour: Option<f64>,
    /// Share of the parent's work, 0-100.
    pub percentage: Option<f64>,
    pub completed: bool,
    pub deadline: Option<Day>,
    pub outsource_team_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TreeNode for Task {
    fn node_id(&self) -> DbId {
        self.id
    }

    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }
}

impl ProgressNode for Task {
    fn is_completed(&self) -> bool {
        self.completed
    }

    fn percentage(&self) -> Option<f64> {
        self.percentage
    }

    fn deadline(&self) -> Option<Day> {
        self.deadline
    }
}

impl Billable for Task {
    fn hours(&self) -> Option<f64> {
        self.hours
    }

    fn cost_per_hour(&self) -> Option<f64> {
        self.cost_per_hour
    }

    fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

/// DTO for creating a task under a project.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateTask {
    pub parent_id: Option<DbId>,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub hours: Option<f64>,
    #[validate(range(min = 0.0))]
    pub cost_per_hour: Option<f64>,
    #[validate(range(min = 0.0, max = 100.0))]
    pub percentage: Option<f64>,
    pub deadline: Option<Day>,
    pub outsource_team_id: Option<DbId>,
    #[serde(default)]
    pub assignee_ids: Vec<DbId>,
}

/// DTO for updating a task. All fields are optional; moving a task uses [`MoveTask`].
///
/// `percentage`, `deadline` and `outsource_team_id` can be cleared by sending
/// `null`. The percentage range is checked against the siblings by the caller.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub hours: Option<f64>,
    #[validate(range(min = 0.0))]
    pub cost_per_hour: Option<f64>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub percentage: Option<Option<f64>>,
    pub completed: Option<bool>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub deadline: Option<Option<Day>>,
    #[serde(default, deserialize_with = "super::nullable")]
    pub outsource_team_id: Option<Option<DbId>>,
}

/// Re-parent a task. `None` promotes it to a root task.
#[derive(Debug, Clone, Deserialize)]
pub struct MoveTask {
    pub parent_id: Option<DbId>,
}

/// One entry of a sibling percentage allocation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PercentageEntry {
    pub task_id: DbId,
    pub percentage: f64,
}

/// A user assigned to a task, joined with their profile.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TaskAssignee {
    pub task_id: DbId,
    pub user_id: DbId,
    pub full_name: String,
    pub email: String,
    pub assigned_at: Timestamp,
}

/// A row from the `task_time_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub task_id: DbId,
    pub user_id: DbId,
    pub started_at: Timestamp,
    pub duration_minutes: i64,
    pub is_running: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimeEntry {
    pub fn timer_state(&self) -> TimerState {
        TimerState {
            started_at: self.started_at,
            duration_minutes: self.duration_minutes,
            is_running: self.is_running,
        }
    }
}

/// A task with everything the task detail view shows.
#[derive(Debug, Clone, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    /// Root-first ids, e.g. `"4/9/12"`.
    pub path: String,
    pub assignees: Vec<TaskAssignee>,
    pub time_entries: Vec<TimeEntry>,
    pub total_minutes: i64,
}
