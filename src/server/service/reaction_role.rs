use sea_orm::DatabaseConnection;

use crate::server::{
    bot::{event::ReactionEvent, platform::Platform},
    data::reaction_role::ReactionRoleRepository,
    error::AppError,
    model::reaction_role::{display_emoji, normalize_emoji, ReactionRoleBinding},
};

const GRANT_REASON: &str = "Reaction role";

pub struct ReactionRoleService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ReactionRoleService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Reacts with the emoji on the target message, then stores the binding.
    ///
    /// Reacting first proves that the message exists in the channel and that the bot can
    /// use the emoji. An existing binding for the same (message, emoji) is rebound. The binding
    /// is stored under the emoji's normalised key.
    pub async fn add(
        &self,
        platform: &dyn Platform,
        binding: ReactionRoleBinding,
    ) -> Result<ReactionRoleBinding, AppError> {
        let emoji = normalize_emoji(&binding.emoji);
        if emoji.is_empty() {
            return Err(AppError::InvalidArgument("An emoji is required.".to_string()));
        }

        match platform
            .add_reaction(binding.channel_id, binding.message_id, binding.emoji.trim())
            .await
        {
            Ok(()) => {}
            Err(AppError::NotFound(msg)) => return Err(AppError::NotFound(msg)),
            Err(AppError::DiscordErr(e)) => {
                tracing::debug!("Reaction-role validation failed: {}", e);
                return Err(AppError::InvalidArgument(format!(
                    "Could not react with {} on message {} in <#{}>.",
                    binding.emoji.trim(),
                    binding.message_id,
                    binding.channel_id
                )));
            }
            Err(e) => return Err(e),
        }

        let binding = ReactionRoleRepository::new(self.db)
            .upsert(ReactionRoleBinding { emoji, ..binding })
            .await?;

        tracing::info!(
            "Bound {} on message {} to role {} in guild {}",
            binding.emoji,
            binding.message_id,
            binding.role_id,
            binding.guild_id
        );

        Ok(binding)
    }

    pub async fn remove(&self, guild_id: u64, message_id: u64, emoji: &str) -> Result<(), AppError> {
        let emoji = normalize_emoji(emoji);

        if !ReactionRoleRepository::new(self.db)
            .delete(guild_id, message_id, &emoji)
            .await?
        {
            return Err(AppError::NotFound(format!(
                "No reaction role is bound to {} on message {}.",
                display_emoji(&emoji),
                message_id
            )));
        }

        Ok(())
    }

    pub async fn list(&self, guild_id: u64) -> Result<Vec<ReactionRoleBinding>, AppError> {
        Ok(ReactionRoleRepository::new(self.db).list(guild_id).await?)
    }

    /// Grants the bound role unless the member already holds it.
    ///
    /// # Returns
    /// - `Ok(true)` - The role was granted
    /// - `Ok(false)` - No binding, or the member already had the role
    pub async fn on_reaction_add(
        &self,
        platform: &dyn Platform,
        reaction: &ReactionEvent,
    ) -> Result<bool, AppError> {
        let Some(binding) = self.binding_for(reaction).await? else {
            return Ok(false);
        };

        let roles = platform
            .member_role_ids(reaction.guild_id, reaction.user_id)
            .await?
            .unwrap_or_default();
        if roles.contains(&binding.role_id) {
            return Ok(false);
        }

        platform
            .add_role(reaction.guild_id, reaction.user_id, binding.role_id, GRANT_REASON)
            .await?;

        Ok(true)
    }

    /// Revokes the bound role if the member holds it.
    pub async fn on_reaction_remove(
        &self,
        platform: &dyn Platform,
        reaction: &ReactionEvent,
    ) -> Result<bool, AppError> {
        let Some(binding) = self.binding_for(reaction).await? else {
            return Ok(false);
        };

        let Some(roles) = platform
            .member_role_ids(reaction.guild_id, reaction.user_id)
            .await?
        else {
            return Ok(false);
        };
        if !roles.contains(&binding.role_id) {
            return Ok(false);
        }

        platform
            .remove_role(reaction.guild_id, reaction.user_id, binding.role_id, GRANT_REASON)
            .await?;

        Ok(true)
    }

    async fn binding_for(
        &self,
        reaction: &ReactionEvent,
    ) -> Result<Option<ReactionRoleBinding>, AppError> {
        let binding = ReactionRoleRepository::new(self.db)
            .find(reaction.message_id, &normalize_emoji(&reaction.emoji))
            .await?;

        // A binding only applies inside the guild that created it.
        Ok(binding.filter(|b| b.guild_id == reaction.guild_id))
    }
}
