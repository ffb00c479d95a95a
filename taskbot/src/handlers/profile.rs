//! The `profile` command: read-only aggregation over both stores.

use taskbot_core::ids::UserId;
use taskbot_core::task::TaskRecord;

use crate::render;
use crate::store::Stores;

use super::{CommandContext, CommandError, Reply};

/// How many recently created tasks a profile shows.
const RECENT_TASKS: usize = 3;

/// Derived view of one user's standing across tasks and teams.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Number of tasks currently assigned to the user.
    pub assigned: usize,
    /// Number of those tasks that are done.
    pub completed: usize,
    /// Completion percentage, 0 when the user has no tasks.
    pub completion_pct: u32,
    /// Names of teams where the user is a member.
    pub member_of: Vec<String>,
    /// Names of teams where the user is the leader.
    pub leader_of: Vec<String>,
    /// The most recently created assigned tasks, newest first.
    pub recent: Vec<TaskRecord>,
}

/// Builds a profile for `user`. Purely derived, no side effects.
#[must_use]
pub fn build(stores: &Stores, user: &UserId) -> UserProfile {
    let assigned_tasks: Vec<&TaskRecord> = stores
        .tasks
        .all()
        .iter()
        .filter(|t| &t.assigned_to == user)
        .collect();

    let assigned = assigned_tasks.len();
    let completed = assigned_tasks.iter().filter(|t| t.done).count();
    // Guard the zero-task case; a profile must never divide by zero.
    let completion_pct = if assigned == 0 {
        0
    } else {
        u32::try_from(completed * 100 / assigned).unwrap_or(100)
    };

    let member_of: Vec<String> = stores
        .teams
        .iter()
        .filter(|(_, team)| team.is_member(user))
        .map(|(name, _)| name.clone())
        .collect();
    let leader_of: Vec<String> = stores
        .teams
        .iter()
        .filter(|(_, team)| &team.leader == user)
        .map(|(name, _)| name.clone())
        .collect();

    // Stable sort: ties on created_at keep original store order.
    let mut recent: Vec<&TaskRecord> = assigned_tasks;
    recent.sort_by_key(|t| std::cmp::Reverse(t.created_at));
    let recent = recent
        .into_iter()
        .take(RECENT_TASKS)
        .cloned()
        .collect::<Vec<_>>();

    UserProfile {
        assigned,
        completed,
        completion_pct,
        member_of,
        leader_of,
        recent,
    }
}

/// Handles `profile [user]`.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the handler signature uniform.
pub fn profile(stores: &Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let target = ctx
        .target_user(raw.split_whitespace().next())
        .unwrap_or_else(|| ctx.invoker.clone());
    let profile = build(stores, &target);
    Ok(Reply::text(render::profile(&target, &profile)))
}
