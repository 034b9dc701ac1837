use super::*;

fn guild(guild_id: u64, permissions: Permissions) -> OperatorGuild {
    OperatorGuild {
        guild_id,
        name: format!("Guild {}", guild_id),
        permissions,
    }
}

/// Tests that logging in again replaces the guild snapshot.
///
/// Expected: Ok with only the guilds from the latest login
#[tokio::test]
async fn replaces_guild_snapshot() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let operator = factory::operator::OperatorFactory::new(db)
        .discord_id("50")
        .build()
        .await?;
    factory::operator::add_operator_guild(db, operator.discord_id, "1", 0x8).await?;

    let repo = OperatorRepository::new(db);
    let updated = repo
        .upsert(UpsertOperatorParams {
            discord_id: 50,
            name: "Renamed".to_string(),
            guilds: vec![
                guild(2, Permissions::MANAGE_GUILD),
                guild(3, Permissions::SEND_MESSAGES),
            ],
        })
        .await?;

    assert_eq!(updated.name, "Renamed");
    assert!(repo.find_guild(50, 1).await?.is_none());
    assert!(repo.find_guild(50, 2).await?.unwrap().can_manage());
    assert!(!repo.find_guild(50, 3).await?.unwrap().can_manage());
    assert_eq!(repo.guilds(50).await?.len(), 2);

    Ok(())
}

/// Tests a first login with no guilds.
///
/// Expected: Ok with the operator stored and an empty snapshot
#[tokio::test]
async fn stores_operator_without_guilds() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = OperatorRepository::new(db);
    repo.upsert(UpsertOperatorParams {
        discord_id: 60,
        name: "New".to_string(),
        guilds: Vec::new(),
    })
    .await?;

    assert!(repo.find(60).await?.is_some());
    assert!(repo.guilds(60).await?.is_empty());

    Ok(())
}
