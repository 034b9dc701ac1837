//! Recording [`Platform`] used by service and dispatcher tests.
//!
//! Every side effect is appended to a call log. Member roles are kept in memory so that
//! grants and revokes are visible to later `member_role_ids` calls within the same test.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex,
    },
};

use chrono::{DateTime, Utc};
use serenity::async_trait;

use crate::server::{
    bot::platform::{
        GuildSummary, InteractionRef, NewTextChannel, OutgoingMessage, Platform, Reply,
    },
    error::AppError,
};

pub const GUILD_NAME: &str = "Rustaceans";

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    SendMessage {
        channel_id: u64,
        message: OutgoingMessage,
    },
    EditMessage {
        channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    },
    DeleteMessage {
        channel_id: u64,
        message_id: u64,
    },
    DirectMessage {
        user_id: u64,
        message: OutgoingMessage,
    },
    AddReaction {
        channel_id: u64,
        message_id: u64,
        emoji: String,
    },
    EnsureCategory {
        guild_id: u64,
        name: String,
    },
    CreateChannel {
        guild_id: u64,
        channel: NewTextChannel,
    },
    CreateRole {
        guild_id: u64,
        name: String,
        color: u32,
    },
    ArchiveChannel {
        channel_id: u64,
        category_id: Option<u64>,
    },
    AddRole {
        user_id: u64,
        role_id: u64,
    },
    RemoveRole {
        user_id: u64,
        role_id: u64,
    },
    Kick {
        user_id: u64,
    },
    Ban {
        user_id: u64,
        delete_message_days: u8,
    },
    Unban {
        user_id: u64,
    },
    Timeout {
        user_id: u64,
        until: Option<DateTime<Utc>>,
    },
    Purge {
        channel_id: u64,
        amount: u8,
    },
    Slowmode {
        channel_id: u64,
        seconds: u16,
    },
    Respond {
        reply: Reply,
    },
    Defer {
        ephemeral: bool,
    },
    EditResponse {
        reply: Reply,
    },
    DeleteResponse,
    FollowUp {
        reply: Reply,
    },
}

pub struct FakePlatform {
    calls: Mutex<Vec<Call>>,
    next_id: AtomicU64,
    owner_id: u64,
    members: Mutex<HashMap<(u64, u64), Vec<u64>>>,
    positions: Mutex<HashMap<u64, u16>>,
    closed_dms: Mutex<HashSet<u64>>,
    failing_sends: Mutex<HashSet<u64>>,
    guild_roles: Mutex<HashMap<(u64, String), u64>>,
    transcript: Vec<String>,
}

impl Default for FakePlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl FakePlatform {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(900_000),
            owner_id: 1,
            members: Mutex::new(HashMap::new()),
            positions: Mutex::new(HashMap::new()),
            closed_dms: Mutex::new(HashSet::new()),
            failing_sends: Mutex::new(HashSet::new()),
            guild_roles: Mutex::new(HashMap::new()),
            transcript: vec!["opener: help please".to_string(), "staff: on it".to_string()],
        }
    }

    pub fn with_owner(mut self, owner_id: u64) -> Self {
        self.owner_id = owner_id;
        self
    }

    /// Adds `user_id` to `guild_id` holding `roles`.
    pub fn with_member(self, guild_id: u64, user_id: u64, roles: &[u64]) -> Self {
        self.members
            .lock()
            .unwrap()
            .insert((guild_id, user_id), roles.to_vec());
        self
    }

    /// Sets the position of the member's highest role.
    pub fn with_position(self, user_id: u64, position: u16) -> Self {
        self.positions.lock().unwrap().insert(user_id, position);
        self
    }

    /// Makes direct messages to `user_id` fail, as when a user has DMs disabled.
    pub fn with_closed_dms(self, user_id: u64) -> Self {
        self.closed_dms.lock().unwrap().insert(user_id);
        self
    }

    /// Makes the next message posted to `channel_id` fail. Later messages go through.
    pub fn with_failing_send(self, channel_id: u64) -> Self {
        self.failing_sends.lock().unwrap().insert(channel_id);
        self
    }

    /// Registers an existing guild role so `ensure_role` finds it by name.
    pub fn with_guild_role(self, guild_id: u64, name: &str, role_id: u64) -> Self {
        self.guild_roles
            .lock()
            .unwrap()
            .insert((guild_id, name.to_string()), role_id);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn roles_of(&self, guild_id: u64, user_id: u64) -> Vec<u64> {
        self.members
            .lock()
            .unwrap()
            .get(&(guild_id, user_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Answers delivered to the user, whether direct, through a deferred response or as a
    /// follow-up.
    pub fn replies(&self) -> Vec<Reply> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Respond { reply }
                | Call::EditResponse { reply }
                | Call::FollowUp { reply } => Some(reply),
                _ => None,
            })
            .collect()
    }

    pub fn last_reply(&self) -> Option<Reply> {
        self.replies().pop()
    }

    pub fn messages_to(&self, channel_id: u64) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::SendMessage {
                    channel_id: id,
                    message,
                } if id == channel_id => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn direct_messages_to(&self, user_id: u64) -> Vec<OutgoingMessage> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::DirectMessage {
                    user_id: id,
                    message,
                } if id == user_id => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    /// Id of the last channel created through `create_text_channel`.
    pub fn last_created_channel(&self) -> Option<NewTextChannel> {
        self.calls().into_iter().rev().find_map(|call| match call {
            Call::CreateChannel { channel, .. } => Some(channel),
            _ => None,
        })
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn send_message(
        &self,
        channel_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError> {
        if self.failing_sends.lock().unwrap().remove(&channel_id) {
            return Err(AppError::Upstream("Missing Access".to_string()));
        }
        self.record(Call::SendMessage {
            channel_id,
            message,
        });
        Ok(self.id())
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    ) -> Result<(), AppError> {
        self.record(Call::EditMessage {
            channel_id,
            message_id,
            message,
        });
        Ok(())
    }

    async fn delete_message(&self, channel_id: u64, message_id: u64) -> Result<(), AppError> {
        self.record(Call::DeleteMessage {
            channel_id,
            message_id,
        });
        Ok(())
    }

    async fn send_direct_message(
        &self,
        user_id: u64,
        message: OutgoingMessage,
    ) -> Result<u64, AppError> {
        if self.closed_dms.lock().unwrap().contains(&user_id) {
            return Err(AppError::Upstream("Cannot send messages to this user".to_string()));
        }
        self.record(Call::DirectMessage { user_id, message });
        Ok(self.id())
    }

    async fn add_reaction(
        &self,
        channel_id: u64,
        message_id: u64,
        emoji: &str,
    ) -> Result<(), AppError> {
        self.record(Call::AddReaction {
            channel_id,
            message_id,
            emoji: emoji.to_string(),
        });
        Ok(())
    }

    async fn ensure_category(&self, guild_id: u64, name: &str) -> Result<u64, AppError> {
        self.record(Call::EnsureCategory {
            guild_id,
            name: name.to_string(),
        });
        Ok(self.id())
    }

    async fn create_text_channel(
        &self,
        guild_id: u64,
        channel: NewTextChannel,
    ) -> Result<u64, AppError> {
        self.record(Call::CreateChannel { guild_id, channel });
        Ok(self.id())
    }

    async fn ensure_role(&self, guild_id: u64, name: &str, color: u32) -> Result<u64, AppError> {
        let key = (guild_id, name.to_string());
        if let Some(existing) = self.guild_roles.lock().unwrap().get(&key) {
            return Ok(*existing);
        }

        let role_id = self.id();
        self.guild_roles.lock().unwrap().insert(key, role_id);
        self.record(Call::CreateRole {
            guild_id,
            name: name.to_string(),
            color,
        });
        Ok(role_id)
    }

    async fn archive_channel(
        &self,
        channel_id: u64,
        category_id: Option<u64>,
    ) -> Result<(), AppError> {
        self.record(Call::ArchiveChannel {
            channel_id,
            category_id,
        });
        Ok(())
    }

    async fn channel_transcript(
        &self,
        _channel_id: u64,
        _limit: u8,
    ) -> Result<Vec<String>, AppError> {
        Ok(self.transcript.clone())
    }

    async fn guild_summary(&self, _guild_id: u64) -> Result<GuildSummary, AppError> {
        Ok(GuildSummary {
            name: GUILD_NAME.to_string(),
            owner_id: self.owner_id,
            member_count: self.members.lock().unwrap().len() as u64,
        })
    }

    async fn member_role_ids(
        &self,
        guild_id: u64,
        user_id: u64,
    ) -> Result<Option<Vec<u64>>, AppError> {
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&(guild_id, user_id))
            .cloned())
    }

    async fn top_role_position(&self, _guild_id: u64, user_id: u64) -> Result<u16, AppError> {
        Ok(self
            .positions
            .lock()
            .unwrap()
            .get(&user_id)
            .copied()
            .unwrap_or(0))
    }

    async fn add_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        _reason: &str,
    ) -> Result<(), AppError> {
        self.members
            .lock()
            .unwrap()
            .entry((guild_id, user_id))
            .or_default()
            .push(role_id);
        self.record(Call::AddRole { user_id, role_id });
        Ok(())
    }

    async fn remove_role(
        &self,
        guild_id: u64,
        user_id: u64,
        role_id: u64,
        _reason: &str,
    ) -> Result<(), AppError> {
        if let Some(roles) = self.members.lock().unwrap().get_mut(&(guild_id, user_id)) {
            roles.retain(|r| *r != role_id);
        }
        self.record(Call::RemoveRole { user_id, role_id });
        Ok(())
    }

    async fn kick(&self, guild_id: u64, user_id: u64, _reason: &str) -> Result<(), AppError> {
        self.members.lock().unwrap().remove(&(guild_id, user_id));
        self.record(Call::Kick { user_id });
        Ok(())
    }

    async fn ban(
        &self,
        guild_id: u64,
        user_id: u64,
        delete_message_days: u8,
        _reason: &str,
    ) -> Result<(), AppError> {
        self.members.lock().unwrap().remove(&(guild_id, user_id));
        self.record(Call::Ban {
            user_id,
            delete_message_days,
        });
        Ok(())
    }

    async fn unban(&self, _guild_id: u64, user_id: u64, _reason: &str) -> Result<(), AppError> {
        self.record(Call::Unban { user_id });
        Ok(())
    }

    async fn timeout(
        &self,
        _guild_id: u64,
        user_id: u64,
        until: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        self.record(Call::Timeout { user_id, until });
        Ok(())
    }

    async fn purge(&self, channel_id: u64, amount: u8) -> Result<usize, AppError> {
        self.record(Call::Purge { channel_id, amount });
        Ok(amount as usize)
    }

    async fn set_slowmode(&self, channel_id: u64, seconds: u16) -> Result<(), AppError> {
        self.record(Call::Slowmode {
            channel_id,
            seconds,
        });
        Ok(())
    }

    async fn respond(&self, _interaction: &InteractionRef, reply: Reply) -> Result<(), AppError> {
        self.record(Call::Respond { reply });
        Ok(())
    }

    async fn defer(&self, _interaction: &InteractionRef, ephemeral: bool) -> Result<(), AppError> {
        self.record(Call::Defer { ephemeral });
        Ok(())
    }

    async fn edit_response(
        &self,
        _interaction: &InteractionRef,
        reply: Reply,
    ) -> Result<(), AppError> {
        self.record(Call::EditResponse { reply });
        Ok(())
    }

    async fn delete_response(&self, _interaction: &InteractionRef) -> Result<(), AppError> {
        self.record(Call::DeleteResponse);
        Ok(())
    }

    async fn follow_up(&self, _interaction: &InteractionRef, reply: Reply) -> Result<(), AppError> {
        self.record(Call::FollowUp { reply });
        Ok(())
    }
}
