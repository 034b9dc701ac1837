use super::*;

fn params(guild_id: u64, name: &str) -> CreateCustomCommandParams {
    CreateCustomCommandParams {
        guild_id,
        name: name.to_string(),
        response: "Hello {user}!".to_string(),
        embed: false,
        created_by: 5,
    }
}

/// Tests creating a command and fetching it back by name.
///
/// Expected: Ok with the stored response returned by `find`
#[tokio::test]
async fn creates_and_finds_command() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(CustomCommand)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = CustomCommandRepository::new(db);
    repo.create(params(1, "hello")).await?;

    let found = repo.find(1, "hello").await?.unwrap();
    assert_eq!(found.response, "Hello {user}!");
    assert_eq!(found.created_by, 5);

    Ok(())
}

/// Tests that a second command with the same name in the same guild is rejected.
///
/// Expected: Err with a unique constraint violation
#[tokio::test]
async fn rejects_duplicate_name_in_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(CustomCommand)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = CustomCommandRepository::new(db);
    repo.create(params(1, "rules")).await?;
    let result = repo.create(params(1, "rules")).await;

    assert!(result.is_err());
    assert!(is_unique_violation(&result.unwrap_err()));

    Ok(())
}

/// Tests that the same name may exist in two guilds.
///
/// Expected: Ok for both inserts and separate listings
#[tokio::test]
async fn allows_same_name_in_other_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(CustomCommand)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = CustomCommandRepository::new(db);
    repo.create(params(1, "rules")).await?;
    repo.create(params(2, "rules")).await?;

    assert_eq!(repo.list(1).await?.len(), 1);
    assert_eq!(repo.list(2).await?.len(), 1);

    Ok(())
}
