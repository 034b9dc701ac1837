use super::*;

/// Tests that clearing removes every warning of the member and only theirs.
///
/// Expected: Ok(3) removed, count 0 afterwards, other member untouched
#[tokio::test]
async fn clears_all_warnings_of_member() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(Warning)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = WarningRepository::new(db);
    for i in 0..3 {
        repo.create(CreateWarningParams {
            guild_id: 1,
            user_id: 10,
            moderator_id: 2,
            reason: format!("reason {}", i),
        })
        .await?;
    }
    factory::warning::create_warning(db, "1", "11").await?;

    assert_eq!(repo.count(1, 10).await?, 3);
    assert_eq!(repo.clear(1, 10).await?, 3);
    assert_eq!(repo.count(1, 10).await?, 0);
    assert_eq!(repo.count(1, 11).await?, 1);

    Ok(())
}

/// Tests clearing a member without warnings.
///
/// Expected: Ok(0)
#[tokio::test]
async fn clearing_nothing_returns_zero() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(Warning)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = WarningRepository::new(db);
    assert_eq!(repo.clear(1, 10).await?, 0);

    Ok(())
}
