use super::*;

fn binding(role_id: u64) -> ReactionRoleBinding {
    ReactionRoleBinding {
        guild_id: 1,
        channel_id: 2,
        message_id: 3,
        emoji: "✅".to_string(),
        role_id,
    }
}

/// Tests that binding the same message and emoji twice replaces the role.
///
/// Expected: Ok with a single row pointing at the second role
#[tokio::test]
async fn replaces_role_for_same_message_and_emoji() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(ReactionRole)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ReactionRoleRepository::new(db);
    repo.upsert(binding(10)).await?;
    repo.upsert(binding(20)).await?;

    let found = repo.find(3, "✅").await?.unwrap();
    assert_eq!(found.role_id, 20);
    assert_eq!(ReactionRole::find().count(db).await?, 1);

    Ok(())
}

/// Tests deleting a binding scoped to its guild.
///
/// Expected: deleting from another guild returns false; the owning guild returns true
#[tokio::test]
async fn deletes_only_within_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(ReactionRole)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::reaction_role::create_binding(db, "1", "3", "🔥", "10").await?;

    let repo = ReactionRoleRepository::new(db);
    assert!(!repo.delete(2, 3, "🔥").await?);
    assert!(repo.delete(1, 3, "🔥").await?);
    assert!(repo.list(1).await?.is_empty());

    Ok(())
}
