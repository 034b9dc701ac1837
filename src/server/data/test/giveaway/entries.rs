use super::*;

/// Tests entering and withdrawing from a giveaway.
///
/// Expected: duplicate entry false, entrants listed once, removal true then false
#[tokio::test]
async fn enters_and_withdraws() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_giveaway_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = GiveawayRepository::new(db);
    let giveaway = repo
        .create(CreateGiveawayParams {
            guild_id: 1,
            channel_id: 2,
            message_id: 3,
            prize: "Nitro".to_string(),
            description: None,
            winner_count: 1,
            ends_at: Utc::now() + Duration::hours(1),
            created_by: 4,
        })
        .await?;
    assert_eq!(repo.find_by_message(3).await?.unwrap().id, giveaway.id);

    assert!(repo.add_entry(giveaway.id, 10).await?);
    assert!(!repo.add_entry(giveaway.id, 10).await?);
    factory::giveaway::add_entry(db, giveaway.id, "20").await?;

    let mut entrants = repo.entrants(giveaway.id).await?;
    entrants.sort();
    assert_eq!(entrants, vec![10, 20]);

    assert!(repo.remove_entry(giveaway.id, 10).await?);
    assert!(!repo.remove_entry(giveaway.id, 10).await?);
    assert_eq!(repo.entrants(giveaway.id).await?, vec![20]);

    Ok(())
}
