use super::*;

/// Tests replacing a guild's ticket configuration.
///
/// Expected: Ok with the new staff role and log channel
#[tokio::test]
async fn upserts_config() -> Result<(), DbErr> {
    let test = TestBuilder::new()
        .with_ticket_tables()
        .build()
        .await
        .unwrap();
    let db = test.db.as_ref().unwrap();

    factory::ticket::create_ticket_config(db, "1").await?;

    let repo = TicketRepository::new(db);
    repo.upsert_config(TicketConfig {
        guild_id: 1,
        category_id: 10,
        staff_role_id: 20,
        log_channel_id: Some(30),
    })
    .await?;

    let config = repo.find_config(1).await?.unwrap();
    assert_eq!(config.staff_role_id, 20);
    assert_eq!(config.log_channel_id, Some(30));
    assert!(repo.find_config(2).await?.is_none());

    Ok(())
}
