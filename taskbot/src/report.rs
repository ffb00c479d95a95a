//! Aggregate statistics over the task store.
//!
//! Backs the `taskchart` command and the daily digest. A report counts
//! done and pending tasks plus priority buckets, optionally restricted to
//! a trailing time window: done tasks are dated by `completed_at`,
//! everything else by `created_at`.

use chrono::{DateTime, Duration, Utc};

use taskbot_core::command::Timeframe;
use taskbot_core::task::{Priority, TaskRecord};

/// Summary counts over (a window of) the task store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskReport {
    /// Window the report covers, `None` for all time.
    pub timeframe: Option<Timeframe>,
    /// Completed tasks in the window.
    pub done: usize,
    /// Open tasks in the window.
    pub pending: usize,
    /// High-priority tasks in the window.
    pub high: usize,
    /// Medium-priority tasks in the window.
    pub medium: usize,
    /// Low-priority tasks in the window.
    pub low: usize,
}

impl TaskReport {
    /// Total tasks covered by the report.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.done + self.pending
    }
}

/// Whether a task falls inside the trailing window ending at `now`.
///
/// Done tasks are dated by completion so a year-old task finished this
/// week still shows up in a weekly report; pending tasks are dated by
/// creation.
fn in_window(task: &TaskRecord, cutoff: DateTime<Utc>) -> bool {
    if task.done {
        task.completed_at.is_some_and(|t| t >= cutoff)
    } else {
        task.created_at >= cutoff
    }
}

/// Builds a report over `tasks`, optionally restricted to `timeframe`.
#[must_use]
pub fn build(tasks: &[TaskRecord], timeframe: Option<Timeframe>, now: DateTime<Utc>) -> TaskReport {
    let cutoff = timeframe.map(|tf| now - Duration::days(tf.days()));

    let mut report = TaskReport {
        timeframe,
        ..TaskReport::default()
    };
    for task in tasks {
        if let Some(cutoff) = cutoff {
            if !in_window(task, cutoff) {
                continue;
            }
        }
        if task.done {
            report.done += 1;
        } else {
            report.pending += 1;
        }
        match task.priority {
            Priority::High => report.high += 1,
            Priority::Medium => report.medium += 1,
            Priority::Low => report.low += 1,
        }
    }
    report
}
