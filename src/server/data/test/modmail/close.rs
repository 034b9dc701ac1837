use super::*;

/// Tests that a thread closes exactly once.
///
/// Expected: first close true, second false, thread no longer findable as open
#[tokio::test]
async fn closes_once() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_modmail_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let thread = factory::modmail::ModmailThreadFactory::new(db, "1", "10")
        .channel_id("500")
        .build()
        .await?;

    let repo = ModmailRepository::new(db);
    assert!(repo.close(thread.id, 3).await?);
    assert!(!repo.close(thread.id, 3).await?);

    assert!(repo.find_open_by_channel(500).await?.is_none());
    assert!(repo.find_open_by_user(10).await?.is_none());

    let closed = repo.find_by_id(thread.id).await?.unwrap();
    assert_eq!(closed.status, ThreadStatus::Closed);
    assert_eq!(closed.closed_by, Some(3));
    assert!(closed.closed_at.is_some());

    let latest = repo.find_latest_by_channel(500).await?.unwrap();
    assert_eq!(latest.id, thread.id);

    Ok(())
}

/// Tests that the message log keeps order and the staff flag.
///
/// Expected: two messages, oldest first
#[tokio::test]
async fn keeps_message_history() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_modmail_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let thread = factory::modmail::create_open_thread(db, "1", "10").await?;

    let repo = ModmailRepository::new(db);
    repo.append_message(AppendModmailMessageParams {
        thread_id: thread.id,
        author_id: 10,
        content: "help".to_string(),
        is_staff: false,
    })
    .await?;
    repo.append_message(AppendModmailMessageParams {
        thread_id: thread.id,
        author_id: 2,
        content: "on it".to_string(),
        is_staff: true,
    })
    .await?;

    let messages = repo.messages(thread.id).await?;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].content, "help");
    assert!(messages[1].is_staff);

    Ok(())
}
