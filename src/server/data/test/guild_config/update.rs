use super::*;

fn params(guild_id: u64) -> UpdateGuildConfigParams {
    UpdateGuildConfigParams {
        guild_id,
        prefix: "$".to_string(),
        modlog_channel_id: Some(1),
        welcome_channel_id: None,
        welcome_message: None,
        leave_message: Some("Bye {user}".to_string()),
        auto_role_id: None,
        modmail_enabled: true,
    }
}

/// Tests replacing the whole configuration of an existing guild.
///
/// Expected: Ok with every field replaced
#[tokio::test]
async fn replaces_existing_configuration() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::guild_config::GuildConfigFactory::new(db)
        .auto_role_id("77")
        .build()
        .await?;
    let guild_id: u64 = stored.guild_id.parse().unwrap();

    let repo = GuildConfigRepository::new(db);
    let config = repo.update(params(guild_id)).await?;

    assert_eq!(config.prefix, "$");
    assert_eq!(config.modlog_channel_id, Some(1));
    assert!(config.auto_role_id.is_none());
    assert!(config.modmail_enabled);
    assert_eq!(repo.modmail_guild_ids().await?, vec![guild_id]);

    Ok(())
}

/// Tests that updating an unknown guild inserts it.
///
/// Expected: Ok with one row holding the submitted values
#[tokio::test]
async fn inserts_when_missing() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    let config = repo.update(params(31)).await?;

    assert_eq!(config.guild_id, 31);
    assert_eq!(config.leave_message.as_deref(), Some("Bye {user}"));
    assert_eq!(GuildConfig::find().count(db).await?, 1);

    Ok(())
}
