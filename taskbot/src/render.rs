//! Text rendering of records into chat-ready display blocks.
//!
//! The hosting platform turns these into whatever rich display it supports;
//! the bot itself only produces plain text with mention tokens.

use taskbot_core::ids::UserId;
use taskbot_core::task::TaskRecord;
use taskbot_core::team::TeamRecord;

use crate::handlers::profile::UserProfile;
use crate::report::TaskReport;

/// Multi-line card for a single task.
#[must_use]
pub fn task_card(task: &TaskRecord) -> String {
    let status = if task.done { "done" } else { "pending" };
    let mut lines = vec![
        format!("Task #{} — {}", task.id, task.name),
        format!("  status: {status}   priority: {}", task.priority),
        format!("  assigned to: {}", task.assigned_to.mention()),
    ];
    if let Some(desc) = &task.description {
        lines.push(format!("  description: {desc}"));
    }
    if let Some(deadline) = &task.deadline {
        lines.push(format!("  deadline: {deadline}"));
    }
    if let Some(team) = &task.team {
        lines.push(format!("  team: {team}"));
    }
    lines.join("\n")
}

/// One-line summary for task listings.
#[must_use]
pub fn task_line(task: &TaskRecord) -> String {
    let status = if task.done { "x" } else { " " };
    let mut line = format!(
        "#{} [{}] {} ({}) — {}",
        task.id,
        status,
        task.name,
        task.priority,
        task.assigned_to.mention()
    );
    if let Some(team) = &task.team {
        line.push_str(&format!(" [{team}]"));
    }
    line
}

/// Listing of matched tasks, or a placeholder when nothing matched.
#[must_use]
pub fn task_list(tasks: &[&TaskRecord]) -> String {
    if tasks.is_empty() {
        return "no tasks match".to_string();
    }
    tasks
        .iter()
        .map(|t| task_line(t))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Info block for a single team.
#[must_use]
pub fn team_info(name: &str, team: &TeamRecord) -> String {
    let members = team
        .members
        .iter()
        .map(UserId::mention)
        .collect::<Vec<_>>()
        .join(", ");
    let mut lines = vec![
        format!("Team {name}"),
        format!("  leader: {}", team.leader.mention()),
        format!("  members ({}): {members}", team.members.len()),
    ];
    if let Some(desc) = &team.description {
        lines.push(format!("  description: {desc}"));
    }
    lines.push(format!(
        "  created {} by {}",
        team.created_at.format("%Y-%m-%d"),
        team.created_by.mention()
    ));
    lines.join("\n")
}

/// One line per team, or a placeholder when there are none.
#[must_use]
pub fn team_list<'a>(teams: impl Iterator<Item = (&'a String, &'a TeamRecord)>) -> String {
    let lines: Vec<String> = teams
        .map(|(name, team)| {
            format!(
                "{name} — leader {}, {} member(s)",
                team.leader.mention(),
                team.members.len()
            )
        })
        .collect();
    if lines.is_empty() {
        "no teams yet".to_string()
    } else {
        lines.join("\n")
    }
}

/// Profile block for a user.
#[must_use]
pub fn profile(user: &UserId, profile: &UserProfile) -> String {
    let mut lines = vec![
        format!("Profile for {}", user.mention()),
        format!(
            "  tasks: {} assigned, {} done ({}%)",
            profile.assigned, profile.completed, profile.completion_pct
        ),
    ];
    if !profile.member_of.is_empty() {
        lines.push(format!("  member of: {}", profile.member_of.join(", ")));
    }
    if !profile.leader_of.is_empty() {
        lines.push(format!("  leads: {}", profile.leader_of.join(", ")));
    }
    if !profile.recent.is_empty() {
        lines.push("  recent tasks:".to_string());
        for task in &profile.recent {
            lines.push(format!("    {}", task_line(task)));
        }
    }
    lines.join("\n")
}

/// Report block for `taskchart` and the daily digest.
#[must_use]
pub fn report(report: &TaskReport) -> String {
    let window = report
        .timeframe
        .map_or_else(|| "all time".to_string(), |tf| format!("past {tf}"));
    format!(
        "Task report ({window}): {} total — {} done, {} pending\n  priority: {} high / {} medium / {} low",
        report.total(),
        report.done,
        report.pending,
        report.high,
        report.medium,
        report.low
    )
}

/// Prompt sent before a team deletion goes through.
#[must_use]
pub fn team_delete_prompt(name: &str) -> String {
    format!(
        "delete team '{name}'? tasks keep their history but lose the team label. reply 'yes' to confirm (anything else cancels)"
    )
}

/// Usage text for `taskhelp`, optionally narrowed to one command.
#[must_use]
pub fn help(topic: Option<&str>) -> String {
    let detail = topic.map(|t| t.trim().to_lowercase());
    match detail.as_deref() {
        Some("taskcreate") => {
            "taskcreate <name> --desc <text> [--priority high|medium|low] [--deadline <text>] [--team <name>]\n  creates a task assigned to you".to_string()
        }
        Some("tasklist") => {
            "tasklist [all|done|pending|team:<name>|<search>]\n  lists your tasks by default".to_string()
        }
        Some("taskdone") => "taskdone <id>\n  marks a task done".to_string(),
        Some("taskassign") => "taskassign <id> <user>\n  reassigns a task".to_string(),
        Some("taskdelete") => "taskdelete <id>\n  deletes a task".to_string(),
        Some("taskupdate") => {
            "taskupdate <id> --name|--desc|--priority|--deadline|--team <value>\n  edits task fields".to_string()
        }
        Some("taskchart") => "taskchart [week|month|year]\n  summarizes task counts".to_string(),
        Some("teamcreate") => "teamcreate <name> [description]".to_string(),
        Some("teamadd") => "teamadd <team> <user>".to_string(),
        Some("teamremove") => "teamremove <team> <user>".to_string(),
        Some("teamleader") => "teamleader <team> <user>\n  transfers leadership".to_string(),
        Some("teamdelete") => "teamdelete <team>\n  asks for confirmation first".to_string(),
        Some("teaminfo") => "teaminfo <team>".to_string(),
        Some("teamlist") => "teamlist".to_string(),
        Some("profile") => "profile [user]".to_string(),
        _ => [
            "commands:",
            "  taskcreate <name> --desc <text> [--priority p] [--deadline d] [--team t]",
            "  tasklist [all|done|pending|team:<name>|<search>]",
            "  taskdone <id> | taskassign <id> <user> | taskdelete <id>",
            "  taskupdate <id> --field value...",
            "  taskchart [week|month|year]",
            "  teamcreate | teamadd | teamremove | teamleader | teamdelete | teaminfo | teamlist",
            "  profile [user]",
            "say 'taskhelp <command>' for details",
        ]
        .join("\n"),
    }
}
