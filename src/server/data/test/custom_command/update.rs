use super::*;

/// Tests that only the provided fields change.
///
/// Expected: Ok(Some) with new response and unchanged embed flag
#[tokio::test]
async fn updates_provided_fields() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(CustomCommand)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::custom_command::CustomCommandFactory::new(db, "1", "faq")
        .embed(true)
        .build()
        .await?;

    let repo = CustomCommandRepository::new(db);
    let updated = repo
        .update(UpdateCustomCommandParams {
            guild_id: 1,
            name: "faq".to_string(),
            response: Some("See #faq".to_string()),
            embed: None,
        })
        .await?
        .unwrap();

    assert_eq!(updated.response, "See #faq");
    assert!(updated.embed);

    Ok(())
}

/// Tests updating a command that does not exist.
///
/// Expected: Ok(None)
#[tokio::test]
async fn returns_none_for_unknown_command() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(CustomCommand)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = CustomCommandRepository::new(db);
    let result = repo
        .update(UpdateCustomCommandParams {
            guild_id: 1,
            name: "missing".to_string(),
            response: Some("x".to_string()),
            embed: None,
        })
        .await?;

    assert!(result.is_none());

    Ok(())
}
