//! Team records: named groups of users with exactly one leader.
//!
//! Teams are keyed by name in the team store (the name IS the identity).
//! The leader is a member by construction but is not automatically
//! re-added if removed — removal of the leader is rejected by the
//! handlers until leadership has been transferred.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A named group of users with exactly one leader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRecord {
    /// The single current leader. Always also present in `members`.
    pub leader: UserId,
    /// Member accounts, in join order. Set semantics: no duplicates.
    pub members: Vec<UserId>,
    /// Optional free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the team was created. Immutable.
    pub created_at: DateTime<Utc>,
    /// Account that created the team. Immutable.
    pub created_by: UserId,
}

impl TeamRecord {
    /// Creates a team with the creator as leader and sole initial member.
    #[must_use]
    pub fn new(creator: UserId, description: Option<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            leader: creator.clone(),
            members: vec![creator.clone()],
            description,
            created_at,
            created_by: creator,
        }
    }

    /// Whether the given user is currently a member.
    #[must_use]
    pub fn is_member(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }

    /// Adds a member, returning `false` if they already belong to the team.
    pub fn add_member(&mut self, user: UserId) -> bool {
        if self.is_member(&user) {
            return false;
        }
        self.members.push(user);
        true
    }

    /// Removes a member, returning `false` if they were not a member.
    ///
    /// Callers must reject removal of the current leader before calling
    /// this; the record itself does not enforce that invariant.
    pub fn remove_member(&mut self, user: &UserId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| m != user);
        self.members.len() < before
    }
}
