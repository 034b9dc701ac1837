use super::*;

/// Tests that a giveaway is claimed exactly once and ends only when finished.
///
/// Expected: first claim true, second false, resolving until finished, then ended
#[tokio::test]
async fn resolves_once() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::create_giveaway(db, "1").await?;

    let repo = GiveawayRepository::new(db);
    let giveaway = repo.find_by_id(stored.id).await?.unwrap();
    let now = Utc::now();
    assert!(repo.claim_resolution(&giveaway, now).await?);
    assert!(!repo.claim_resolution(&giveaway, now).await?);

    repo.record_winners(stored.id, &[11, 12]).await?;

    let claimed = repo.find_by_id(stored.id).await?.unwrap();
    assert_eq!(claimed.status, GiveawayStatus::Resolving);
    assert_eq!(claimed.resolution_attempts, 1);
    assert_eq!(claimed.winners, Some(vec![11, 12]));

    assert!(repo.finish_resolution(stored.id, 1, now).await?);
    let ended = repo.find_by_id(stored.id).await?.unwrap();
    assert_eq!(ended.status, GiveawayStatus::Ended);
    assert!(ended.ended_at.is_some());

    Ok(())
}

/// Tests claiming a giveaway that was already ended.
///
/// Expected: Ok(false)
#[tokio::test]
async fn ended_giveaway_is_not_claimed() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let stored = factory::giveaway::GiveawayFactory::new(db, "1")
        .ended()
        .build()
        .await?;

    let repo = GiveawayRepository::new(db);
    let giveaway = repo.find_by_id(stored.id).await?.unwrap();
    assert!(!repo.claim_resolution(&giveaway, Utc::now()).await?);

    Ok(())
}

/// Tests taking over a stalled resolution.
///
/// Expected: a claim newer than the cutoff is kept; an older one is taken over once and the
/// previous holder can no longer finish
#[tokio::test]
async fn reclaims_only_lapsed_claims() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let now = Utc::now();
    let claimed_at = now - Duration::minutes(5);
    let stored = factory::giveaway::GiveawayFactory::new(db, "1")
        .resolving(claimed_at, &[7])
        .build()
        .await?;

    let repo = GiveawayRepository::new(db);
    let giveaway = repo.find_by_id(stored.id).await?.unwrap();

    assert!(!repo
        .reclaim_resolution(&giveaway, claimed_at - Duration::minutes(1), now)
        .await?);
    assert!(repo.reclaim_resolution(&giveaway, now, now).await?);
    assert!(!repo.reclaim_resolution(&giveaway, now, now).await?);

    assert!(!repo.finish_resolution(stored.id, 1, now).await?);
    assert!(repo.finish_resolution(stored.id, 2, now).await?);

    Ok(())
}
