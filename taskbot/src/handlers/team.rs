//! Team command handlers: create, membership, leadership, deletion, info.
//!
//! Team deletion is the one two-phase command: [`delete_request`] validates
//! and names the team, the dispatcher runs the confirmation wait, and
//! [`delete_confirmed`] performs the cascade once the invoker says yes.

use chrono::Utc;

use taskbot_core::ids::UserId;
use taskbot_core::team::TeamRecord;

use crate::render;
use crate::store::Stores;

use super::{CommandContext, CommandError, Reply};

/// Splits `raw` into the leading team-name token and the remainder.
fn team_name_and_rest<'a>(raw: &'a str, usage: &str) -> Result<(&'a str, &'a str), CommandError> {
    let raw = raw.trim();
    let name = raw
        .split_whitespace()
        .next()
        .ok_or_else(|| CommandError::Validation(format!("usage: {usage}")))?;
    let rest = raw[name.len()..].trim();
    Ok((name, rest))
}

/// Leadership check shared by membership commands: the team leader or an
/// administrator.
fn ensure_leads(ctx: &CommandContext, name: &str, team: &TeamRecord) -> Result<(), CommandError> {
    if ctx.is_admin || ctx.invoker == team.leader {
        Ok(())
    } else {
        Err(CommandError::Permission(format!(
            "only the leader of '{name}' or an admin can do that"
        )))
    }
}

/// Looks up a team or fails with `NotFound`.
fn get_team<'a>(stores: &'a Stores, name: &str) -> Result<&'a TeamRecord, CommandError> {
    stores
        .teams
        .get(name)
        .ok_or_else(|| CommandError::NotFound(format!("no team named '{name}'")))
}

/// Handles `teamcreate <name> [description]`.
///
/// # Errors
///
/// `Validation` without a name, `Conflict` if the name is taken,
/// `Storage` if the save fails.
pub fn create(stores: &mut Stores, ctx: &CommandContext, raw: &str) -> Result<Reply, CommandError> {
    let (name, rest) = team_name_and_rest(raw, "teamcreate <name> [description]")?;
    if stores.teams.contains(name) {
        return Err(CommandError::Conflict(format!(
            "a team named '{name}' already exists"
        )));
    }

    let description = (!rest.is_empty()).then(|| rest.to_string());
    let team = TeamRecord::new(ctx.invoker.clone(), description, Utc::now());
    let info = render::team_info(name, &team);
    stores.teams.insert(name.to_string(), team);
    stores.teams.save()?;

    Ok(Reply::text(format!("team created\n{info}")))
}

/// Handles `teamadd <team> <user>`.
///
/// # Errors
///
/// `NotFound` for an unknown team, `Permission` unless the invoker leads
/// the team or is admin, `Conflict` if the target is already a member,
/// `Validation` without a target, `Storage` if the save fails.
pub fn add_member(
    stores: &mut Stores,
    ctx: &CommandContext,
    raw: &str,
) -> Result<Reply, CommandError> {
    let (name, rest) = team_name_and_rest(raw, "teamadd <team> <user>")?;
    let target = ctx
        .target_user(rest.split_whitespace().next())
        .ok_or_else(|| CommandError::Validation("usage: teamadd <team> <user>".to_string()))?;

    let team = get_team(stores, name)?;
    ensure_leads(ctx, name, team)?;

    let team = stores
        .teams
        .get_mut(name)
        .ok_or_else(|| CommandError::NotFound(format!("no team named '{name}'")))?;
    if !team.add_member(target.clone()) {
        return Err(CommandError::Conflict(format!(
            "{} is already a member of '{name}'",
            target.mention()
        )));
    }
    stores.teams.save()?;

    Ok(
        Reply::text(format!("{} added to '{name}'", target.mention())).with_notification(
            target,
            format!("you were added to team '{name}'"),
        ),
    )
}

/// Handles `teamremove <team> <user>`.
///
/// Removing the current leader is always rejected, whatever the invoker's
/// privilege — leadership must be transferred first.
///
/// # Errors
///
/// `NotFound` for an unknown team or non-member target, `Permission`
/// unless leader/admin, `Conflict` when the target is the leader,
/// `Validation` without a target, `Storage` if the save fails.
pub fn remove_member(
    stores: &mut Stores,
    ctx: &CommandContext,
    raw: &str,
) -> Result<Reply, CommandError> {
    let (name, rest) = team_name_and_rest(raw, "teamremove <team> <user>")?;
    let target = ctx
        .target_user(rest.split_whitespace().next())
        .ok_or_else(|| CommandError::Validation("usage: teamremove <team> <user>".to_string()))?;

    let team = get_team(stores, name)?;
    ensure_leads(ctx, name, team)?;
    if target == team.leader {
        return Err(CommandError::Conflict(format!(
            "{} leads '{name}' — transfer leadership first (teamleader)",
            target.mention()
        )));
    }
    if !team.is_member(&target) {
        return Err(CommandError::NotFound(format!(
            "{} is not a member of '{name}'",
            target.mention()
        )));
    }

    let team = stores
        .teams
        .get_mut(name)
        .ok_or_else(|| CommandError::NotFound(format!("no team named '{name}'")))?;
    team.remove_member(&target);
    stores.teams.save()?;

    Ok(
        Reply::text(format!("{} removed from '{name}'", target.mention())).with_notification(
            target,
            format!("you were removed from team '{name}'"),
        ),
    )
}

/// Handles `teamleader <team> <user>`: transfers leadership.
///
/// The new leader must already be a member; the old leader stays a member
/// unless separately removed.
///
/// # Errors
///
/// `NotFound` for an unknown team, `Permission` unless current leader or
/// admin, `Validation` when the target is not a member or missing,
/// `Storage` if the save fails.
pub fn transfer_leadership(
    stores: &mut Stores,
    ctx: &CommandContext,
    raw: &str,
) -> Result<Reply, CommandError> {
    let (name, rest) = team_name_and_rest(raw, "teamleader <team> <user>")?;
    let target = ctx
        .target_user(rest.split_whitespace().next())
        .ok_or_else(|| CommandError::Validation("usage: teamleader <team> <user>".to_string()))?;

    let team = get_team(stores, name)?;
    ensure_leads(ctx, name, team)?;
    if !team.is_member(&target) {
        return Err(CommandError::Validation(format!(
            "{} must join '{name}' before leading it",
            target.mention()
        )));
    }

    let team = stores
        .teams
        .get_mut(name)
        .ok_or_else(|| CommandError::NotFound(format!("no team named '{name}'")))?;
    team.leader = target.clone();
    stores.teams.save()?;

    Ok(
        Reply::text(format!("{} now leads '{name}'", target.mention())).with_notification(
            target,
            format!("you are now the leader of team '{name}'"),
        ),
    )
}

/// Phase one of `teamdelete <team>`: validates existence and permission,
/// returning the team name for the confirmation wait. No state changes.
///
/// # Errors
///
/// `Validation` without a name, `NotFound` for an unknown team,
/// `Permission` unless leader/admin.
pub fn delete_request(
    stores: &Stores,
    ctx: &CommandContext,
    raw: &str,
) -> Result<String, CommandError> {
    let (name, _) = team_name_and_rest(raw, "teamdelete <team>")?;
    let team = get_team(stores, name)?;
    ensure_leads(ctx, name, team)?;
    Ok(name.to_string())
}

/// Phase two of `teamdelete`: removes the record and nulls the `team`
/// reference on every task that pointed at it. No task is deleted.
///
/// # Errors
///
/// `NotFound` if the team vanished between phases, `Storage` if either
/// save fails.
pub fn delete_confirmed(stores: &mut Stores, name: &str) -> Result<Reply, CommandError> {
    if stores.teams.remove(name).is_none() {
        return Err(CommandError::NotFound(format!("no team named '{name}'")));
    }

    let mut detached = 0usize;
    for task in stores.tasks.iter_mut() {
        if task.team.as_deref() == Some(name) {
            task.team = None;
            detached += 1;
        }
    }
    stores.teams.save()?;
    stores.tasks.save()?;

    Ok(Reply::text(format!(
        "team '{name}' deleted; {detached} task(s) detached"
    )))
}

/// Handles `teaminfo <team>`.
///
/// # Errors
///
/// `Validation` without a name, `NotFound` for an unknown team.
pub fn info(stores: &Stores, raw: &str) -> Result<Reply, CommandError> {
    let (name, _) = team_name_and_rest(raw, "teaminfo <team>")?;
    let team = get_team(stores, name)?;
    Ok(Reply::text(render::team_info(name, team)))
}

/// Handles `teamlist`.
///
/// # Errors
///
/// Never fails today; the `Result` keeps the handler signature uniform.
pub fn list(stores: &Stores) -> Result<Reply, CommandError> {
    Ok(Reply::text(render::team_list(stores.teams.iter())))
}
