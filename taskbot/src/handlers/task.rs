//! Task command handlers: create, list, done, assign, delete, update, chart.

use chrono::Utc;

use taskbot_core::command::{CommandArgs, ListFilter, Timeframe};
use taskbot_core::ids::UserId;
use taskbot_core::task::{Priority, TaskRecord};

use crate::render;
use crate::report;
use crate::store::Stores;

use super::{CommandContext, CommandError, Reply};

/// Parses the leading task id token.
fn parse_task_id(raw: &str, usage: &str) -> Result<u64, CommandError> {
    raw.split_whitespace()
        .next()
        .and_then(|token| token.parse::<u64>().ok())
        .ok_or_else(|| CommandError::Validation(format!("usage: {usage}")))
}

/// Ownership check shared by done/assign/update: the current assignee,
/// the creator, or an administrator may act on a task.
fn ensure_can_modify(ctx: &CommandContext, task: &TaskRecord) -> Result<(), CommandError> {
    if ctx.is_admin || ctx.invoker == task.assigned_to || ctx.invoker == task.creator {
        Ok(())
    } else {
        Err(CommandError::Permission(format!(
            "only the assignee, the creator, or an admin can modify task #{}",
            task.id
        )))
    }
}

/// Handles `taskcreate <name> --desc <text> [--priority p] [--deadline d] [--team t]`.
///
/// The new task gets a fresh id (`max + 1`), is assigned to its creator,
/// and starts pending. An unrecognized priority token silently coerces to
/// medium.
///
/// # Errors
///
/// `Validation` if the name or description is missing; `Storage` if the
/// save fails.
pub fn create(stores: &mut Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let args = CommandArgs::parse(raw);
    let name = args
        .title()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| {
            CommandError::Validation(
                "a task needs a name — usage: taskcreate <name> --desc <description>".to_string(),
            )
        })?
        .to_string();
    let description = args
        .flag("desc")
        .or_else(|| args.flag("description"))
        .filter(|d| !d.is_empty())
        .ok_or_else(|| {
            CommandError::Validation("a description is required (--desc <text>)".to_string())
        })?
        .to_string();

    let task = TaskRecord {
        id: stores.tasks.next_id(),
        name,
        description: Some(description),
        assigned_to: ctx.invoker.clone(),
        done: false,
        priority: args
            .flag("priority")
            .and_then(Priority::parse)
            .unwrap_or_default(),
        creator: ctx.invoker.clone(),
        created_at: Utc::now(),
        completed_at: None,
        updated_at: None,
        deadline: args.flag("deadline").map(ToString::to_string),
        team: args.flag("team").map(ToString::to_string),
    };

    let card = render::task_card(&task);
    let id = task.id;
    stores.tasks.push(task);
    stores.tasks.save()?;

    Ok(
        Reply::text(format!("created task #{id}\n{card}")).with_notification(
            ctx.invoker.clone(),
            format!("you created a new task:\n{card}"),
        ),
    )
}

/// Lazily selects tasks matching a filter, on behalf of `invoker`.
pub fn filter_tasks<'a>(
    tasks: &'a [TaskRecord],
    filter: &'a ListFilter,
    invoker: &'a UserId,
) -> impl Iterator<Item = &'a TaskRecord> {
    tasks.iter().filter(move |task| match filter {
        ListFilter::Own => &task.assigned_to == invoker,
        ListFilter::All => true,
        ListFilter::Done => task.done,
        ListFilter::Pending => !task.done,
        ListFilter::Team(name) => task.team.as_deref() == Some(name.as_str()),
        ListFilter::Search(needle) => task.name.to_lowercase().contains(&needle.to_lowercase()),
    })
}

/// Handles `tasklist [filter]`. An empty match is a placeholder reply,
/// never an error.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the handler signature uniform.
pub fn list(stores: &Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let filter = ListFilter::parse(raw);
    let matched: Vec<&TaskRecord> = filter_tasks(stores.tasks.all(), &filter, &ctx.invoker).collect();
    Ok(Reply::text(render::task_list(&matched)))
}

/// Handles `taskdone <id>`: marks the task done and stamps `completed_at`.
/// The creator is notified when someone else completes their task.
///
/// # Errors
///
/// `Validation` on a malformed id, `NotFound` if the id is absent,
/// `Permission` if the invoker is neither assignee, creator, nor admin,
/// `Storage` if the save fails.
pub fn done(stores: &mut Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let id = parse_task_id(raw, "taskdone <id>")?;
    let task = stores
        .tasks
        .get(id)
        .ok_or_else(|| CommandError::NotFound(format!("no task with id {id}")))?;
    ensure_can_modify(ctx, task)?;

    // Checks passed; now mutate.
    let task = stores
        .tasks
        .get_mut(id)
        .ok_or_else(|| CommandError::NotFound(format!("no task with id {id}")))?;
    task.done = true;
    task.completed_at = Some(Utc::now());
    let creator = task.creator.clone();
    let card = render::task_card(task);
    stores.tasks.save()?;

    let mut reply = Reply::text(format!("task #{id} marked done\n{card}"));
    if creator != ctx.invoker {
        reply = reply.with_notification(
            creator,
            format!("your task was completed by {}:\n{card}", ctx.invoker_name),
        );
    }
    Ok(reply)
}

/// Handles `taskassign <id> <user>`: reassigns the task and notifies the
/// new assignee.
///
/// # Errors
///
/// `Validation` on malformed arguments, `NotFound` if the id is absent,
/// `Permission` if the invoker is none of assignee/creator/admin,
/// `Storage` if the save fails.
pub fn assign(stores: &mut Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let id = parse_task_id(raw, "taskassign <id> <user>")?;
    let target = ctx
        .target_user(raw.split_whitespace().nth(1))
        .ok_or_else(|| {
            CommandError::Validation("usage: taskassign <id> <user>".to_string())
        })?;

    let task = stores
        .tasks
        .get(id)
        .ok_or_else(|| CommandError::NotFound(format!("no task with id {id}")))?;
    ensure_can_modify(ctx, task)?;

    let task = stores
        .tasks
        .get_mut(id)
        .ok_or_else(|| CommandError::NotFound(format!("no task with id {id}")))?;
    task.assigned_to = target.clone();
    let card = render::task_card(task);
    stores.tasks.save()?;

    Ok(
        Reply::text(format!("task #{id} assigned to {}", target.mention())).with_notification(
            target,
            format!("a task was assigned to you:\n{card}"),
        ),
    )
}

/// Handles `taskdelete <id>`: removes the record from the store.
///
/// # Errors
///
/// `Validation` on a malformed id, `NotFound` if the id is absent,
/// `Permission` if the invoker is neither creator nor admin, `Storage`
/// if the save fails.
pub fn delete(stores: &mut Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let id = parse_task_id(raw, "taskdelete <id>")?;
    let task = stores
        .tasks
        .get(id)
        .ok_or_else(|| CommandError::NotFound(format!("no task with id {id}")))?;
    if !ctx.is_admin && ctx.invoker != task.creator {
        return Err(CommandError::Permission(format!(
            "only the creator or an admin can delete task #{id}"
        )));
    }

    stores.tasks.remove(id);
    stores.tasks.save()?;
    Ok(Reply::text(format!("task #{id} deleted")))
}

/// Field names `taskupdate` recognizes.
const UPDATE_FIELDS: [&str; 6] = ["name", "desc", "description", "priority", "deadline", "team"];

/// Handles `taskupdate <id> --field value...`.
///
/// Applies only the recognized fields present in the argument string and
/// stamps `updated_at`. Unknown flags are ignored; an unrecognized
/// priority value leaves the field unchanged.
///
/// # Errors
///
/// `Validation` on a malformed id or when no recognized field is given,
/// `NotFound` if the id is absent, `Permission` as in done/assign,
/// `Storage` if the save fails.
pub fn update(stores: &mut Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let args = CommandArgs::parse(raw);
    let id = args
        .title()
        .and_then(|t| t.split_whitespace().next())
        .and_then(|t| t.parse::<u64>().ok())
        .ok_or_else(|| {
            CommandError::Validation("usage: taskupdate <id> --field value...".to_string())
        })?;

    if !args.flags().any(|(key, _)| UPDATE_FIELDS.contains(&key)) {
        return Err(CommandError::Validation(format!(
            "nothing to update — recognized fields: {}",
            UPDATE_FIELDS.join(", ")
        )));
    }

    let task = stores
        .tasks
        .get(id)
        .ok_or_else(|| CommandError::NotFound(format!("no task with id {id}")))?;
    ensure_can_modify(ctx, task)?;

    let task = stores
        .tasks
        .get_mut(id)
        .ok_or_else(|| CommandError::NotFound(format!("no task with id {id}")))?;
    if let Some(name) = args.flag("name").filter(|n| !n.is_empty()) {
        task.name = name.to_string();
    }
    if let Some(desc) = args.flag("desc").or_else(|| args.flag("description")) {
        task.description = Some(desc.to_string());
    }
    if let Some(priority) = args.flag("priority").and_then(Priority::parse) {
        task.priority = priority;
    }
    if let Some(deadline) = args.flag("deadline") {
        task.deadline = Some(deadline.to_string());
    }
    if let Some(team) = args.flag("team") {
        task.team = Some(team.to_string());
    }
    task.updated_at = Some(Utc::now());
    let card = render::task_card(task);
    stores.tasks.save()?;

    Ok(Reply::text(format!("task #{id} updated\n{card}")))
}

/// Handles `taskchart [timeframe]`: aggregate counts as a text report.
///
/// # Errors
///
/// `Validation` on an unrecognized timeframe token.
pub fn chart(stores: &Stores, raw: &str) -> Result<Reply, CommandError> {
    let timeframe =
        Timeframe::parse(raw).map_err(|e| CommandError::Validation(e.to_string()))?;
    let report = report::build(stores.tasks.all(), timeframe, Utc::now());
    Ok(Reply::text(render::report(&report)))
}
