use sea_orm::DatabaseConnection;

use crate::server::{
    bot::{
        event::InboundMessage,
        platform::{color, EmbedSpec, OutgoingMessage, Platform},
    },
    data::{custom_command::CustomCommandRepository, is_unique_violation},
    error::AppError,
    model::custom_command::{
        CreateCustomCommandParams, CustomCommand, UpdateCustomCommandParams, MAX_NAME_LEN,
        MAX_RESPONSE_LEN,
    },
    util::template::{needs_guild_summary, render, TemplateContext},
};

pub struct CustomCommandService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> CustomCommandService<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a command after normalising its name.
    ///
    /// # Returns
    /// - `Ok(CustomCommand)` - Stored command
    /// - `Err(AppError::InvalidArgument)` - Bad name or empty response
    /// - `Err(AppError::Conflict)` - A command with that name already exists
    pub async fn create(
        &self,
        mut params: CreateCustomCommandParams,
    ) -> Result<CustomCommand, AppError> {
        params.name = normalize_name(&params.name)?;
        params.response = validate_response(&params.response)?;

        let repo = CustomCommandRepository::new(self.db);
        if repo.find(params.guild_id, &params.name).await?.is_some() {
            return Err(duplicate(&params.name));
        }

        let name = params.name.clone();
        match repo.create(params).await {
            Ok(command) => Ok(command),
            Err(e) if is_unique_violation(&e) => Err(duplicate(&name)),
            Err(e) => Err(e.into()),
        }
    }

    /// Changes the response and/or embed flag of an existing command.
    pub async fn update(
        &self,
        mut params: UpdateCustomCommandParams,
    ) -> Result<CustomCommand, AppError> {
        if params.response.is_none() && params.embed.is_none() {
            return Err(AppError::InvalidArgument(
                "Provide a new response or embed setting.".to_string(),
            ));
        }
        params.name = normalize_name(&params.name)?;
        params.response = params
            .response
            .as_deref()
            .map(validate_response)
            .transpose()?;

        let name = params.name.clone();
        CustomCommandRepository::new(self.db)
            .update(params)
            .await?
            .ok_or_else(|| not_found(&name))
    }

    pub async fn delete(&self, guild_id: u64, name: &str) -> Result<(), AppError> {
        let name = normalize_name(name)?;

        if !CustomCommandRepository::new(self.db)
            .delete(guild_id, &name)
            .await?
        {
            return Err(not_found(&name));
        }

        Ok(())
    }

    pub async fn get(&self, guild_id: u64, name: &str) -> Result<CustomCommand, AppError> {
        let name = normalize_name(name)?;

        CustomCommandRepository::new(self.db)
            .find(guild_id, &name)
            .await?
            .ok_or_else(|| not_found(&name))
    }

    pub async fn list(&self, guild_id: u64) -> Result<Vec<CustomCommand>, AppError> {
        Ok(CustomCommandRepository::new(self.db).list(guild_id).await?)
    }

    /// Answers a prefixed guild message with the matching custom command, if any.
    ///
    /// # Arguments
    /// - `platform` - Discord side effects
    /// - `message` - The guild message
    /// - `guild_id` - Guild the message was posted in
    /// - `prefix` - The guild's configured prefix
    ///
    /// # Returns
    /// - `Ok(true)` - A command matched and its response was sent
    /// - `Ok(false)` - No prefix or no such command
    pub async fn respond(
        &self,
        platform: &dyn Platform,
        message: &InboundMessage,
        guild_id: u64,
        prefix: &str,
    ) -> Result<bool, AppError> {
        let Some(name) = trigger_name(&message.content, prefix) else {
            return Ok(false);
        };

        let Some(command) = CustomCommandRepository::new(self.db)
            .find(guild_id, &name)
            .await?
        else {
            return Ok(false);
        };

        let (server_name, member_count) = if needs_guild_summary(&command.response) {
            let summary = platform.guild_summary(guild_id).await?;
            (summary.name, summary.member_count)
        } else {
            (String::new(), 0)
        };

        let text = render(
            &command.response,
            &TemplateContext {
                user_id: message.author.id,
                user_name: &message.author.name,
                server_name: &server_name,
                channel_id: Some(message.channel_id),
                member_count,
            },
        );

        let outgoing = if command.embed {
            OutgoingMessage::embed(EmbedSpec::new().description(text).color(color::INFO))
        } else {
            OutgoingMessage::text(text)
        };
        platform.send_message(message.channel_id, outgoing).await?;

        tracing::debug!("Answered custom command '{}' in guild {}", name, guild_id);

        Ok(true)
    }
}

/// Lowercased first token after the prefix, when the message starts with the prefix.
fn trigger_name(content: &str, prefix: &str) -> Option<String> {
    let rest = content.strip_prefix(prefix)?;
    let token = rest.split_whitespace().next()?;

    // The token must follow the prefix directly: "! hello" is not a command.
    if !rest.starts_with(token) {
        return None;
    }

    Some(token.to_lowercase())
}

/// Trims and lowercases a command name and checks it against `[a-z0-9_-]{1,32}`.
pub fn normalize_name(name: &str) -> Result<String, AppError> {
    let name = name.trim().to_lowercase();

    let valid = !name.is_empty()
        && name.chars().count() <= MAX_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(AppError::InvalidArgument(format!(
            "Command names are 1 to {} characters of letters, digits, `_` and `-`.",
            MAX_NAME_LEN
        )));
    }

    Ok(name)
}

fn validate_response(response: &str) -> Result<String, AppError> {
    let response = response.trim();

    if response.is_empty() {
        return Err(AppError::InvalidArgument(
            "The response cannot be empty.".to_string(),
        ));
    }
    if response.chars().count() > MAX_RESPONSE_LEN {
        return Err(AppError::InvalidArgument(format!(
            "The response cannot be longer than {} characters.",
            MAX_RESPONSE_LEN
        )));
    }

    Ok(response.to_string())
}

fn duplicate(name: &str) -> AppError {
    AppError::Conflict(format!("A command named `{}` already exists.", name))
}

fn not_found(name: &str) -> AppError {
    AppError::NotFound(format!("No command named `{}` exists.", name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::bot::{
        event::Actor,
        fake::{Call, FakePlatform, GUILD_NAME},
    };
    use test_utils::{builder::TestBuilder, factory::custom_command::CustomCommandFactory};

    fn message(content: &str) -> InboundMessage {
        InboundMessage {
            id: 1,
            channel_id: 55,
            guild_id: Some(10),
            author: Actor {
                id: 42,
                name: "ferris".to_string(),
                bot: false,
            },
            content: content.to_string(),
        }
    }

    fn create_params(name: &str, response: &str) -> CreateCustomCommandParams {
        CreateCustomCommandParams {
            guild_id: 10,
            name: name.to_string(),
            response: response.to_string(),
            embed: false,
            created_by: 1,
        }
    }

    #[test]
    fn trigger_requires_prefix_directly_before_name() {
        assert_eq!(trigger_name("!Hello there", "!"), Some("hello".to_string()));
        assert_eq!(trigger_name("! hello", "!"), None);
        assert_eq!(trigger_name("hello", "!"), None);
        assert_eq!(trigger_name("??rules", "??"), Some("rules".to_string()));
    }

    /// Tests that a created command can be fetched back and that a deleted one is gone.
    ///
    /// Expected: same response and embed flag after create, NotFound after delete
    #[tokio::test]
    async fn create_get_delete_lifecycle() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::CustomCommand)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let service = CustomCommandService::new(db);

        let mut params = create_params("Rules", "Be kind");
        params.embed = true;
        service.create(params).await?;

        let fetched = service.get(10, "rules").await?;
        assert_eq!(fetched.response, "Be kind");
        assert!(fetched.embed);

        service.delete(10, "rules").await?;
        assert!(matches!(
            service.get(10, "rules").await,
            Err(AppError::NotFound(_))
        ));

        Ok(())
    }

    /// Tests that creating a second command with the same name is a conflict.
    ///
    /// Expected: Err(Conflict)
    #[tokio::test]
    async fn duplicate_name_is_conflict() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::CustomCommand)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let service = CustomCommandService::new(db);

        service.create(create_params("hello", "Hi")).await?;
        let result = service.create(create_params("HELLO", "Hi again")).await;

        assert!(matches!(result, Err(AppError::Conflict(_))));

        Ok(())
    }

    /// Tests validation of names, responses and empty edits.
    ///
    /// Expected: Err(InvalidArgument) for each bad input
    #[tokio::test]
    async fn rejects_invalid_input() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::CustomCommand)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let service = CustomCommandService::new(db);

        let bad_name = service.create(create_params("two words", "x")).await;
        let empty = service.create(create_params("ok", "   ")).await;
        let nothing = service
            .update(UpdateCustomCommandParams {
                guild_id: 10,
                name: "ok".to_string(),
                response: None,
                embed: None,
            })
            .await;

        assert!(matches!(bad_name, Err(AppError::InvalidArgument(_))));
        assert!(matches!(empty, Err(AppError::InvalidArgument(_))));
        assert!(matches!(nothing, Err(AppError::InvalidArgument(_))));

        Ok(())
    }

    /// Tests that a prefixed message renders placeholders into the stored response.
    ///
    /// Expected: one text message in the originating channel with substitutions applied
    #[tokio::test]
    async fn responds_with_rendered_template() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::CustomCommand)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        CustomCommandFactory::new(db, "10", "hello")
            .response("Hi {user}, welcome to {server} in {channel}! {unknown}")
            .build()
            .await?;
        let platform = FakePlatform::new();

        let answered = CustomCommandService::new(db)
            .respond(&platform, &message("!hello everyone"), 10, "!")
            .await?;

        assert!(answered);
        let sent = platform.messages_to(55);
        assert_eq!(sent.len(), 1);
        assert_eq!(
            sent[0].content.as_deref(),
            Some(format!("Hi <@42>, welcome to {} in <#55>! {{unknown}}", GUILD_NAME).as_str())
        );

        Ok(())
    }

    /// Tests that unknown commands and unprefixed messages are ignored.
    ///
    /// Expected: Ok(false) and no side effects
    #[tokio::test]
    async fn ignores_unknown_commands() -> Result<(), AppError> {
        let test = TestBuilder::new()
            .with_table(entity::prelude::CustomCommand)
            .build()
            .await
            .unwrap();
        let db = test.db.as_ref().unwrap();
        let platform = FakePlatform::new();
        let service = CustomCommandService::new(db);

        assert!(!service.respond(&platform, &message("!nope"), 10, "!").await?);
        assert!(!service.respond(&platform, &message("hello"), 10, "!").await?);
        assert_eq!(platform.count(|c| matches!(c, Call::SendMessage { .. })), 0);

        Ok(())
    }
}
