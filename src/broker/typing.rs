use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::{ConversationId, UserId};

/// A user currently typing in a conversation, as sent to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Typer {
    pub user_id: UserId,
    pub is_student: bool,
}

#[derive(Debug, Clone)]
struct TypingEntry {
    is_student: bool,
    updated_at: Instant,
}

/// Per-namespace ephemeral set of currently-typing users.
///
/// Entries self-heal: an entry older than the expiry window is treated as
/// "not typing" even if the client never sent a stop event (e.g. it
/// disconnected mid-keystroke). Expiry is evaluated lazily at read time;
/// there is no background sweep.
#[derive(Debug)]
pub struct TypingTracker {
    expiry: Duration,
    conversations: HashMap<ConversationId, HashMap<UserId, TypingEntry>>,
}

impl TypingTracker {
    pub fn new(expiry: Duration) -> Self {
        Self {
            expiry,
            conversations: HashMap::new(),
        }
    }

    /// Upsert the typing flag for a user. `is_typing = true` refreshes the
    /// timestamp (one entry per user per conversation); `is_typing = false`
    /// removes the entry immediately. Returns the refreshed non-expired set.
    ///
    /// Expired entries for the conversation are pruned here, so entries
    /// abandoned without a stop event do not accumulate.
    pub fn set_typing(
        &mut self,
        conversation_id: ConversationId,
        user_id: UserId,
        is_student: bool,
        is_typing: bool,
    ) -> Vec<Typer> {
        self.prune_expired(conversation_id);
        if is_typing {
            self.conversations
                .entry(conversation_id)
                .or_default()
                .insert(
                    user_id,
                    TypingEntry {
                        is_student,
                        updated_at: Instant::now(),
                    },
                );
        } else {
            self.clear_user(conversation_id, user_id);
        }
        self.current_typers(conversation_id)
    }

    /// The non-expired typing set for a conversation. Read-only; expired
    /// entries are filtered out here but only pruned on the next mutation.
    pub fn current_typers(&self, conversation_id: ConversationId) -> Vec<Typer> {
        let now = Instant::now();
        self.conversations
            .get(&conversation_id)
            .map(|users| {
                users
                    .iter()
                    .filter(|(_, entry)| now.duration_since(entry.updated_at) < self.expiry)
                    .map(|(user_id, entry)| Typer {
                        user_id: *user_id,
                        is_student: entry.is_student,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    fn prune_expired(&mut self, conversation_id: ConversationId) {
        let now = Instant::now();
        if let Some(users) = self.conversations.get_mut(&conversation_id) {
            users.retain(|_, entry| now.duration_since(entry.updated_at) < self.expiry);
            if users.is_empty() {
                self.conversations.remove(&conversation_id);
            }
        }
    }

    /// Drop the typing entry for one user, if any. Used on explicit stop
    /// events and on disconnect cleanup.
    pub fn clear_user(&mut self, conversation_id: ConversationId, user_id: UserId) {
        if let Some(users) = self.conversations.get_mut(&conversation_id) {
            users.remove(&user_id);
            if users.is_empty() {
                self.conversations.remove(&conversation_id);
            }
        }
    }

    /// Number of non-expired typing entries across all conversations.
    pub fn active_count(&self) -> usize {
        let now = Instant::now();
        self.conversations
            .values()
            .flat_map(|users| users.values())
            .filter(|entry| now.duration_since(entry.updated_at) < self.expiry)
            .count()
    }
}

#[cfg(test)]
impl TypingTracker {
    /// Entries actually held in the map, expired ones included.
    fn stored_count(&self) -> usize {
        self.conversations.values().map(|users| users.len()).sum()
    }
}
