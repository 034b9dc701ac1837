use super::*;

/// Tests paging through a guild's warnings, newest first.
///
/// Expected: Ok with page sizes 2, 2, 1 and total 5
#[tokio::test]
async fn pages_guild_warnings() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(Warning)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    for _ in 0..5 {
        factory::warning::create_warning(db, "1", "10").await?;
    }
    factory::warning::create_warning(db, "2", "10").await?;

    let repo = WarningRepository::new(db);
    let (first, total) = repo.get_paginated(1, None, 0, 2).await?;
    let (last, _) = repo.get_paginated(1, None, 2, 2).await?;

    assert_eq!(total, 5);
    assert_eq!(first.len(), 2);
    assert!(first[0].id > first[1].id);
    assert_eq!(last.len(), 1);

    Ok(())
}

/// Tests filtering by member.
///
/// Expected: Ok with only the member's warnings counted
#[tokio::test]
async fn filters_by_user() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_table(Warning)
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::warning::create_warning(db, "1", "10").await?;
    factory::warning::create_warning(db, "1", "20").await?;
    factory::warning::create_warning(db, "1", "20").await?;

    let repo = WarningRepository::new(db);
    let (warnings, total) = repo.get_paginated(1, Some(20), 0, 10).await?;

    assert_eq!(total, 2);
    assert!(warnings.iter().all(|w| w.user_id == 20));

    Ok(())
}
