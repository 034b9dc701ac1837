use super::*;

/// Tests claiming a thread for a user without one.
///
/// Expected: Ok(Some) open thread without a channel, findable by user once the channel is set
#[tokio::test]
async fn claims_new_thread() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_modmail_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ModmailRepository::new(db);
    let thread = repo.claim_thread(1, 10).await?.unwrap();
    assert_eq!(thread.status, ThreadStatus::Open);
    assert!(thread.channel_id.is_none());

    repo.set_channel(thread.id, 99).await?;

    let by_user = repo.find_open_by_user(10).await?.unwrap();
    let by_channel = repo.find_open_by_channel(99).await?.unwrap();
    assert_eq!(by_user.id, thread.id);
    assert_eq!(by_channel.id, thread.id);

    Ok(())
}

/// Tests that a user with an open thread cannot claim a second one.
///
/// Expected: Ok(None), even when the second claim targets another guild
#[tokio::test]
async fn refuses_second_open_thread() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_modmail_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::modmail::create_open_thread(db, "1", "10").await?;

    let repo = ModmailRepository::new(db);
    assert!(repo.claim_thread(1, 10).await?.is_none());
    assert!(repo.claim_thread(2, 10).await?.is_none());

    Ok(())
}

/// Tests that closed threads do not block a new claim.
///
/// Expected: Ok(Some) with a new id distinct from the closed thread
#[tokio::test]
async fn claims_again_after_close() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_modmail_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ModmailRepository::new(db);
    let first = repo.claim_thread(1, 10).await?.unwrap();
    assert!(repo.close(first.id, 2).await?);

    let second = repo.claim_thread(1, 10).await?.unwrap();
    assert_ne!(first.id, second.id);

    Ok(())
}

/// Tests discarding a claim whose channel could not be created.
///
/// Expected: the user may claim again immediately
#[tokio::test]
async fn discard_releases_claim() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_modmail_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = ModmailRepository::new(db);
    let thread = repo.claim_thread(1, 10).await?.unwrap();
    repo.discard(thread.id).await?;

    assert!(repo.find_by_id(thread.id).await?.is_none());
    assert!(repo.claim_thread(1, 10).await?.is_some());

    Ok(())
}
