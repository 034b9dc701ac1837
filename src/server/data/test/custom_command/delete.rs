use super::*;

/// Tests deleting a command and looking it up afterwards.
///
/// Expected: first delete returns true, lookup returns None, second delete returns false
#[tokio::test]
async fn deletes_command() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(CustomCommand)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::create_custom_command(db, "3", "ping").await?;

    let repo = CustomCommandRepository::new(db);
    assert!(repo.delete(3, "ping").await?);
    assert!(repo.find(3, "ping").await?.is_none());
    assert!(!repo.delete(3, "ping").await?);

    Ok(())
}
