use super::*;

/// Tests that a member holds at most one open ticket per guild.
///
/// Expected: second claim in the same guild is None, a claim in another guild succeeds
#[tokio::test]
async fn one_open_ticket_per_member_and_guild() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticket_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);
    let ticket = repo.claim(1, 10, Some("refund".to_string())).await?.unwrap();
    assert!(ticket.open);

    assert!(repo.claim(1, 10, None).await?.is_none());
    assert!(repo.claim(2, 10, None).await?.is_some());

    Ok(())
}

/// Tests closing a ticket with its transcript.
///
/// Expected: first close true and transcript stored, second close false, new claim allowed
#[tokio::test]
async fn closes_with_transcript() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticket_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    let repo = TicketRepository::new(db);
    let ticket = repo.claim(1, 10, None).await?.unwrap();
    repo.set_channel(ticket.id, 77).await?;
    assert_eq!(repo.find_open_by_channel(77).await?.unwrap().id, ticket.id);

    assert!(repo.close(ticket.id, 4, "a: hi".to_string()).await?);
    assert!(!repo.close(ticket.id, 4, String::new()).await?);
    assert!(repo.find_open_by_channel(77).await?.is_none());
    assert!(repo.find_open_by_opener(1, 10).await?.is_none());

    let (tickets, total) = repo.get_paginated(1, 0, 10).await?;
    assert_eq!(total, 1);
    assert_eq!(tickets[0].transcript.as_deref(), Some("a: hi"));
    assert_eq!(tickets[0].closed_by, Some(4));

    assert!(repo.claim(1, 10, None).await?.is_some());

    Ok(())
}
