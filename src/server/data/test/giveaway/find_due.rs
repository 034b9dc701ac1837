use super::*;

/// Tests which giveaways the scheduler picks up.
///
/// Expected: only the active giveaway whose end time has passed
#[tokio::test]
async fn returns_active_past_end_time() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let past = Utc::now() - Duration::minutes(5);
    let due = factory::giveaway::GiveawayFactory::new(db, "1")
        .ends_at(past)
        .build()
        .await?;
    factory::giveaway::GiveawayFactory::new(db, "1")
        .ends_at(past)
        .ended()
        .build()
        .await?;
    factory::giveaway::GiveawayFactory::new(db, "1")
        .ends_at(past)
        .resolving(past, &[])
        .build()
        .await?;
    factory::create_giveaway(db, "1").await?;

    let repo = GiveawayRepository::new(db);
    let found = repo.find_due(Utc::now()).await?;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, due.id);

    Ok(())
}

/// Tests which resolving giveaways count as stalled.
///
/// Expected: only the claim made before the cutoff
#[tokio::test]
async fn returns_claims_older_than_cutoff() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    let stalled = factory::giveaway::GiveawayFactory::new(db, "1")
        .resolving(now - Duration::minutes(10), &[1])
        .build()
        .await?;
    factory::giveaway::GiveawayFactory::new(db, "1")
        .resolving(now, &[1])
        .build()
        .await?;

    let found = GiveawayRepository::new(db)
        .find_stalled(now - Duration::minutes(2))
        .await?;

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, stalled.id);
    assert_eq!(found[0].winners, Some(vec![1]));

    Ok(())
}
