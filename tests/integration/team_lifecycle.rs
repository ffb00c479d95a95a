//! Integration tests for team commands and the deletion confirmation flow.
//!
//! Covers membership and leadership rules end to end, plus all three
//! terminal outcomes of the `teamdelete` confirmation wait (yes, anything
//! else, silence).
//!
//! Verification command: `cargo test --test team_lifecycle`

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::time::Duration;

use taskbot::dispatch::{Dispatcher, Inbound};
use taskbot::gateway::RecordingGateway;
use taskbot::store::{SharedStores, Stores};
use taskbot_core::ids::{ChannelId, UserId};

// =============================================================================
// Helpers
// =============================================================================

struct Harness {
    dispatcher: Dispatcher<RecordingGateway>,
    gateway: Arc<RecordingGateway>,
    stores: SharedStores,
    _dir: tempfile::TempDir,
}

fn harness_with_timeout(confirm: Duration) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let stores = Arc::new(Mutex::new(Stores::open(dir.path()).unwrap()));
    let gateway = Arc::new(RecordingGateway::new());
    let dispatcher = Dispatcher::new(
        Arc::clone(&stores),
        Arc::clone(&gateway),
        vec![String::new()],
        confirm,
    );
    Harness {
        dispatcher,
        gateway,
        stores,
        _dir: dir,
    }
}

fn harness() -> Harness {
    harness_with_timeout(Duration::from_secs(30))
}

fn user_msg(user: &str, content: &str) -> Inbound {
    Inbound::from_text(UserId::new(user), ChannelId::new("general"), false, content)
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

/// Polls the gateway until a channel message containing `needle` shows up.
/// The confirmation outcome is sent from a background task, so tests wait
/// for it instead of racing it.
async fn wait_for_reply(h: &Harness, needle: &str) -> String {
    for _ in 0..200 {
        if let Some(text) = h
            .gateway
            .channel_texts()
            .await
            .iter()
            .find(|t| t.contains(needle))
        {
            return text.clone();
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("no channel message containing {needle:?} arrived");
}

// =============================================================================
// Membership and leadership
// =============================================================================

#[tokio::test]
async fn create_add_and_info_round_trip() {
    let h = harness();
    let created = say(&h, "lead", "teamcreate crew the night shift").await;
    assert!(created.contains("team created"), "{created}");

    say(&h, "lead", "teamadd crew <@bob>").await;
    let info = say(&h, "lead", "teaminfo crew").await;
    assert!(info.contains("<@lead>") && info.contains("<@bob>"), "{info}");
    assert!(info.contains("the night shift"), "{info}");

    // The new member got a DM.
    assert_eq!(
        h.gateway.direct_texts_to(&UserId::new("bob")).await.len(),
        1
    );
}

#[tokio::test]
async fn only_the_leader_manages_membership() {
    let h = harness();
    say(&h, "lead", "teamcreate crew").await;

    let denied = say(&h, "rando", "teamadd crew <@rando>").await;
    assert!(denied.contains("only the leader"), "{denied}");

    let info = say(&h, "lead", "teaminfo crew").await;
    assert!(!info.contains("<@rando>"), "{info}");
}

#[tokio::test]
async fn leader_cannot_be_removed_until_transfer() {
    let h = harness();
    say(&h, "lead", "teamcreate crew").await;
    say(&h, "lead", "teamadd crew <@bob>").await;

    let rejected = say(&h, "lead", "teamremove crew <@lead>").await;
    assert!(rejected.contains("transfer leadership first"), "{rejected}");

    say(&h, "lead", "teamleader crew <@bob>").await;
    let removed = say(&h, "bob", "teamremove crew <@lead>").await;
    assert!(removed.contains("removed from"), "{removed}");
}

#[tokio::test]
async fn leadership_transfer_requires_membership() {
    let h = harness();
    say(&h, "lead", "teamcreate crew").await;

    let rejected = say(&h, "lead", "teamleader crew <@stranger>").await;
    assert!(rejected.contains("must join"), "{rejected}");

    let info = say(&h, "lead", "teaminfo crew").await;
    assert!(info.contains("leader: <@lead>"), "{info}");
}

#[tokio::test]
async fn duplicate_team_name_is_a_conflict() {
    let h = harness();
    say(&h, "a", "teamcreate crew").await;
    let reply = say(&h, "b", "teamcreate crew").await;
    assert!(reply.contains("already exists"), "{reply}");
}

#[tokio::test]
async fn teamlist_shows_every_team() {
    let h = harness();
    assert_eq!(say(&h, "a", "teamlist").await, "no teams yet");
    say(&h, "a", "teamcreate alpha").await;
    say(&h, "b", "teamcreate beta").await;
    let listing = say(&h, "a", "teamlist").await;
    assert!(listing.contains("alpha") && listing.contains("beta"), "{listing}");
}

// =============================================================================
// Deletion confirmation flow
// =============================================================================

#[tokio::test]
async fn affirmative_reply_deletes_and_detaches_tasks() {
    let h = harness();
    say(&h, "lead", "teamcreate crew").await;
    say(&h, "lead", "taskcreate wired --desc d --team crew").await;

    let prompt = say(&h, "lead", "teamdelete crew").await;
    assert!(prompt.contains("reply 'yes' to confirm"), "{prompt}");

    h.dispatcher.dispatch(&user_msg("lead", "yes")).await;
    let result = wait_for_reply(&h, "deleted").await;
    assert!(result.contains("1 task(s) detached"), "{result}");

    let stores = h.stores.lock().await;
    assert!(stores.teams.is_empty());
    assert_eq!(stores.tasks.get(1).unwrap().team, None);
}

#[tokio::test]
async fn any_other_reply_cancels() {
    let h = harness();
    say(&h, "lead", "teamcreate crew").await;
    say(&h, "lead", "teamdelete crew").await;

    h.dispatcher.dispatch(&user_msg("lead", "hmm wait")).await;
    wait_for_reply(&h, "was not deleted").await;

    assert!(h.stores.lock().await.teams.contains("crew"));
}

#[tokio::test]
async fn the_confirming_reply_is_not_dispatched_as_a_command() {
    let h = harness();
    say(&h, "lead", "teamcreate crew").await;
    say(&h, "lead", "teamdelete crew").await;

    // A reply that happens to look like a command is consumed by the wait.
    h.dispatcher.dispatch(&user_msg("lead", "teamlist")).await;
    wait_for_reply(&h, "was not deleted").await;

    let texts = h.gateway.channel_texts().await;
    assert!(
        !texts.iter().any(|t| t.contains("no teams yet") || t.contains("crew — leader")),
        "{texts:?}"
    );
}

#[tokio::test]
async fn silence_times_out_and_preserves_the_team() {
    let h = harness_with_timeout(Duration::from_millis(100));
    say(&h, "lead", "teamcreate crew").await;
    say(&h, "lead", "teamdelete crew").await;

    let result = wait_for_reply(&h, "no confirmation").await;
    assert!(result.contains("was not deleted"), "{result}");
    assert!(h.stores.lock().await.teams.contains("crew"));

    // After the timeout the same text is a command again.
    let listing = say(&h, "lead", "teamlist").await;
    assert!(listing.contains("crew"), "{listing}");
}

#[tokio::test]
async fn someone_elses_message_does_not_confirm() {
    let h = harness();
    say(&h, "lead", "teamcreate crew").await;
    say(&h, "lead", "teamdelete crew").await;

    // A bystander saying yes changes nothing.
    h.dispatcher.dispatch(&user_msg("bystander", "yes")).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(h.stores.lock().await.teams.contains("crew"));

    // The invoker's yes still goes through.
    h.dispatcher.dispatch(&user_msg("lead", "yes")).await;
    wait_for_reply(&h, "deleted").await;
    assert!(h.stores.lock().await.teams.is_empty());
}

#[tokio::test]
async fn delete_of_unknown_team_fails_fast_without_prompt() {
    let h = harness();
    let reply = say(&h, "lead", "teamdelete ghosts").await;
    assert!(reply.contains("no team named"), "{reply}");
}
