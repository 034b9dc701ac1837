use super::*;

/// Tests that applying one setting leaves the others alone.
///
/// Expected: Ok with the new modlog channel and the original prefix
#[tokio::test]
async fn changes_single_setting() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::guild_config::GuildConfigFactory::new(db)
        .prefix(">")
        .build()
        .await?;
    let guild_id: u64 = stored.guild_id.parse().unwrap();

    let repo = GuildConfigRepository::new(db);
    let config = repo
        .apply(guild_id, GuildSetting::ModlogChannel(555))
        .await?;

    assert_eq!(config.modlog_channel_id, Some(555));
    assert_eq!(config.prefix, ">");

    Ok(())
}

/// Tests that applying a setting to an unknown guild creates its row first.
///
/// Expected: Ok with welcome settings stored on a fresh default row
#[tokio::test]
async fn creates_row_when_missing() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    let config = repo
        .apply(
            7,
            GuildSetting::Welcome {
                channel_id: 70,
                message: "Hi {user}".to_string(),
            },
        )
        .await?;

    assert_eq!(config.welcome_channel_id, Some(70));
    assert_eq!(config.welcome_message.as_deref(), Some("Hi {user}"));
    assert_eq!(config.prefix, DEFAULT_PREFIX);

    Ok(())
}

/// Tests that clearing the auto-role stores NULL.
///
/// Expected: Ok with `auto_role_id` None after being set
#[tokio::test]
async fn clears_auto_role() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    repo.apply(9, GuildSetting::AutoRole(Some(900))).await?;
    let config = repo.apply(9, GuildSetting::AutoRole(None)).await?;

    assert!(config.auto_role_id.is_none());

    Ok(())
}
