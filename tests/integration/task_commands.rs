//! Integration tests for the task command surface.
//!
//! Drives the full dispatcher (prefix matching, handlers, store writes,
//! notifications) through a recording gateway against a temp data dir.
//!
//! Verification command: `cargo test --test task_commands`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Duration;

use taskbot::dispatch::{Dispatcher, Inbound};
use taskbot::gateway::RecordingGateway;
use taskbot::store::Stores;
use taskbot_core::ids::{ChannelId, UserId};

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    dispatcher: Dispatcher<RecordingGateway>,
    gateway: Arc<RecordingGateway>,
    _dir: tempfile::TempDir,
}

fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let stores = Arc::new(Mutex::new(Stores::open(dir.path()).unwrap()));
    let gateway = Arc::new(RecordingGateway::new());
    let dispatcher = Dispatcher::new(
        Arc::clone(&stores),
        Arc::clone(&gateway),
        vec!["!".to_string(), String::new()],
        Duration::from_secs(30),
    );
    Harness {
        dispatcher,
        gateway,
        _dir: dir,
    }
}

fn user_msg(user: &str, content: &str) -> Inbound {
    Inbound::from_text(UserId::new(user), ChannelId::new("general"), false, content)
}

fn admin_msg(user: &str, content: &str) -> Inbound {
    Inbound::from_text(UserId::new(user), ChannelId::new("general"), true, content)
}

async fn say(h: &Harness, user: &str, content: &str) -> String {
    h.dispatcher.dispatch(&user_msg(user, content)).await;
    h.gateway
        .channel_texts()
        .await
        .last()
        .cloned()
        .unwrap_or_default()
}

// =============================================================================
// Create / list
// =============================================================================

#[tokio::test]
async fn create_assigns_sequential_ids_and_self() {
    let h = harness();

    let first = say(&h, "alice", "taskcreate ship release --desc cut the tag").await;
    let second = say(&h, "alice", "!taskcreate fix docs --desc typos").await;

    assert!(first.contains("task #1"), "{first}");
    assert!(first.contains("<@alice>"), "{first}");
    assert!(second.contains("task #2"), "{second}");
}

#[tokio::test]
async fn create_without_description_is_rejected() {
    let h = harness();
    let reply = say(&h, "alice", "taskcreate lonely title").await;
    assert!(reply.contains("--desc"), "{reply}");
}

#[tokio::test]
async fn unknown_priority_coerces_to_medium() {
    let h = harness();
    say(&h, "alice", "taskcreate t --desc d --priority urgent!!").await;
    let listing = say(&h, "alice", "tasklist").await;
    assert!(listing.contains("(medium)"), "{listing}");
}

#[tokio::test]
async fn tasklist_defaults_to_own_tasks() {
    let h = harness();
    say(&h, "alice", "taskcreate mine --desc d").await;
    say(&h, "bob", "taskcreate theirs --desc d").await;

    let listing = say(&h, "alice", "tasklist").await;
    assert!(listing.contains("mine"), "{listing}");
    assert!(!listing.contains("theirs"), "{listing}");

    let everything = say(&h, "alice", "tasklist all").await;
    assert!(everything.contains("mine") && everything.contains("theirs"));
}

#[tokio::test]
async fn tasklist_filters_by_status_team_and_search() {
    let h = harness();
    say(&h, "alice", "taskcreate deploy api --desc d --team infra").await;
    say(&h, "alice", "taskcreate write blog --desc d").await;
    say(&h, "alice", "taskdone 2").await;

    let done = say(&h, "alice", "tasklist done").await;
    assert!(done.contains("write blog") && !done.contains("deploy api"));

    let pending = say(&h, "alice", "tasklist pending").await;
    assert!(pending.contains("deploy api") && !pending.contains("write blog"));

    let by_team = say(&h, "alice", "tasklist team:infra").await;
    assert!(by_team.contains("deploy api") && !by_team.contains("write blog"));

    let search = say(&h, "alice", "tasklist blog").await;
    assert!(search.contains("write blog") && !search.contains("deploy api"));
}

#[tokio::test]
async fn empty_listing_is_a_placeholder_not_an_error() {
    let h = harness();
    let listing = say(&h, "alice", "tasklist").await;
    assert_eq!(listing, "no tasks match");
}

// =============================================================================
// Done / assign / delete permissions
// =============================================================================

#[tokio::test]
async fn stranger_cannot_complete_someone_elses_task() {
    let h = harness();
    say(&h, "alice", "taskcreate t --desc d").await;

    let denied = say(&h, "mallory", "taskdone 1").await;
    assert!(denied.contains("only the assignee"), "{denied}");

    let listing = say(&h, "alice", "tasklist pending").await;
    assert!(listing.contains("#1"), "task must still be pending");
}

#[tokio::test]
async fn assignee_creator_and_admin_can_complete() {
    let h = harness();
    say(&h, "alice", "taskcreate a --desc d").await;
    say(&h, "alice", "taskcreate b --desc d").await;
    say(&h, "alice", "taskcreate c --desc d").await;
    say(&h, "alice", "taskassign 2 <@bob>").await;
    say(&h, "alice", "taskassign 3 <@bob>").await;

    // assignee
    assert!(say(&h, "alice", "taskdone 1").await.contains("done"));
    // creator of a task now assigned elsewhere
    assert!(say(&h, "alice", "taskdone 2").await.contains("done"));
    // admin
    h.dispatcher.dispatch(&admin_msg("root", "taskdone 3")).await;
    let last = h.gateway.channel_texts().await.last().cloned().unwrap();
    assert!(last.contains("done"), "{last}");
}

#[tokio::test]
async fn assign_notifies_the_new_assignee() {
    let h = harness();
    say(&h, "alice", "taskcreate t --desc d").await;
    say(&h, "alice", "taskassign 1 <@bob>").await;

    let dms = h.gateway.direct_texts_to(&UserId::new("bob")).await;
    assert_eq!(dms.len(), 1);
    assert!(dms[0].contains("#1"), "{}", dms[0]);
}

#[tokio::test]
async fn completing_anothers_task_notifies_the_creator() {
    let h = harness();
    say(&h, "alice", "taskcreate t --desc d").await;
    say(&h, "alice", "taskassign 1 <@bob>").await;
    say(&h, "bob", "taskdone 1").await;

    let dms = h.gateway.direct_texts_to(&UserId::new("alice")).await;
    assert!(
        dms.iter().any(|m| m.contains("done") || m.contains("completed")),
        "{dms:?}"
    );
}

#[tokio::test]
async fn only_creator_or_admin_can_delete() {
    let h = harness();
    say(&h, "alice", "taskcreate t --desc d").await;
    say(&h, "alice", "taskassign 1 <@bob>").await;

    // Even the assignee may not delete.
    let denied = say(&h, "bob", "taskdelete 1").await;
    assert!(denied.contains("permission") || denied.contains("creator"), "{denied}");

    let ok = say(&h, "alice", "taskdelete 1").await;
    assert!(ok.contains("deleted"), "{ok}");
    assert_eq!(say(&h, "alice", "tasklist all").await, "no tasks match");
}

#[tokio::test]
async fn deleting_the_newest_task_reissues_its_id() {
    let h = harness();
    say(&h, "alice", "taskcreate one --desc d").await;
    say(&h, "alice", "taskcreate two --desc d").await;
    say(&h, "alice", "taskdelete 2").await;

    let reply = say(&h, "alice", "taskcreate three --desc d").await;
    assert!(reply.contains("task #2"), "{reply}");
}

// =============================================================================
// Update
// =============================================================================

#[tokio::test]
async fn update_edits_recognized_fields() {
    let h = harness();
    say(&h, "alice", "taskcreate old name --desc d").await;
    let reply = say(
        &h,
        "alice",
        "taskupdate 1 --name new name --priority high --deadline friday",
    )
    .await;
    assert!(reply.contains("updated"), "{reply}");

    let listing = say(&h, "alice", "tasklist").await;
    assert!(listing.contains("new name") && listing.contains("(high)"), "{listing}");
}

#[tokio::test]
async fn update_with_no_recognized_field_is_rejected() {
    let h = harness();
    say(&h, "alice", "taskcreate t --desc d").await;
    let reply = say(&h, "alice", "taskupdate 1 --color blue").await;
    assert!(reply.contains("nothing to update") || reply.contains("usage"), "{reply}");
}

#[tokio::test]
async fn update_ignores_invalid_priority_value() {
    let h = harness();
    say(&h, "alice", "taskcreate t --desc d --priority high").await;
    say(&h, "alice", "taskupdate 1 --priority bananas").await;

    let listing = say(&h, "alice", "tasklist").await;
    assert!(listing.contains("(high)"), "priority must be unchanged: {listing}");
}

#[tokio::test]
async fn nonexistent_task_id_is_reported() {
    let h = harness();
    for cmd in ["taskdone 9", "taskdelete 9", "taskassign 9 <@bob>", "taskupdate 9 --name x"] {
        let reply = say(&h, "alice", cmd).await;
        assert!(reply.contains("no task with id 9"), "{cmd}: {reply}");
    }
}

#[tokio::test]
async fn malformed_task_id_is_a_usage_error() {
    let h = harness();
    let reply = say(&h, "alice", "taskdone soon").await;
    assert!(reply.contains("taskdone <id>"), "{reply}");
}
