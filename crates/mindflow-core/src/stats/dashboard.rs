use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Counters shown at the top of the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Incomplete tasks.
    pub active_tasks: u32,
    /// Tasks completed since midnight UTC.
    pub completed_today: u32,
    /// Score of the latest productivity record, 0 without one.
    pub focus_score: u8,
    /// Today's session time in whole minutes.
    pub mindfulness_minutes: u32,
}

/// Completion of one category's tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryProgress {
    pub category: Category,
    pub completed_tasks: u32,
    pub total_tasks: u32,
    pub percentage: u8,
}

impl CategoryProgress {
    pub fn new(category: Category, completed_tasks: u32, total_tasks: u32) -> Self {
        Self {
            category,
            completed_tasks,
            total_tasks,
            percentage: completion_percentage(completed_tasks, total_tasks),
        }
    }
}

/// `round(completed / total * 100)`, or 0 for an empty category.
pub fn completion_percentage(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (f64::from(completed) / f64::from(total) * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}
