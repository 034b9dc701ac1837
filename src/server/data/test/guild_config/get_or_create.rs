use super::*;

/// Tests that a guild without configuration receives the defaults.
///
/// Expected: Ok with prefix `!`, nothing configured, one row stored
#[tokio::test]
async fn creates_default_row() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GuildConfigRepository::new(db);
    let config = repo.get_or_create(42).await?;

    assert_eq!(config.guild_id, 42);
    assert_eq!(config.prefix, DEFAULT_PREFIX);
    assert!(config.modlog_channel_id.is_none());
    assert!(!config.modmail_enabled);
    assert_eq!(GuildConfig::find().count(db).await?, 1);

    Ok(())
}

/// Tests that an existing row is returned untouched.
///
/// Expected: Ok with the stored prefix and still a single row
#[tokio::test]
async fn returns_existing_row() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(GuildConfig)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::guild_config::GuildConfigFactory::new(db)
        .prefix("?")
        .build()
        .await?;

    let repo = GuildConfigRepository::new(db);
    let config = repo
        .get_or_create(stored.guild_id.parse().unwrap())
        .await?;
    let again = repo
        .get_or_create(stored.guild_id.parse().unwrap())
        .await?;

    assert_eq!(config.prefix, "?");
    assert_eq!(again.prefix, "?");
    assert_eq!(GuildConfig::find().count(db).await?, 1);

    Ok(())
}
