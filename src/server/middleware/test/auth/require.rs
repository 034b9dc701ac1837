use super::*;

const MANAGE_GUILD: i64 = 0x20;
const ADMINISTRATOR: i64 = 0x8;
const SEND_MESSAGES: i64 = 0x800;

/// Tests that manage-guild in the snapshot grants access to that guild.
///
/// Expected: Ok(Operator) with the session's operator
#[tokio::test]
async fn grants_access_with_manage_guild() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let operator = factory::operator::create_operator_with_guild(db, "100", MANAGE_GUILD).await?;
    let operator_id: u64 = operator.discord_id.parse().unwrap();
    AuthSession::new(session).set_operator_id(operator_id).await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::ManageGuild(100)])
        .await?;

    assert_eq!(result.discord_id, operator_id);

    Ok(())
}

/// Tests that administrator also counts as a guild manager.
///
/// Expected: Ok(Operator)
#[tokio::test]
async fn grants_access_to_administrator() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let operator = factory::operator::create_operator_with_guild(db, "100", ADMINISTRATOR).await?;
    AuthSession::new(session)
        .set_operator_id(operator.discord_id.parse().unwrap())
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::ManageGuild(100)])
        .await;

    assert!(result.is_ok());

    Ok(())
}

/// Tests that a member without manage-guild is denied.
///
/// Expected: Err(AppError::PermissionDenied)
#[tokio::test]
async fn denies_member_without_manage_guild() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let operator = factory::operator::create_operator_with_guild(db, "100", SEND_MESSAGES).await?;
    AuthSession::new(session)
        .set_operator_id(operator.discord_id.parse().unwrap())
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::ManageGuild(100)])
        .await;

    assert!(matches!(result, Err(AppError::PermissionDenied(_))));

    Ok(())
}

/// Tests that a guild missing from the snapshot is denied.
///
/// Expected: Err(AppError::PermissionDenied)
#[tokio::test]
async fn denies_guild_outside_snapshot() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let operator = factory::operator::create_operator_with_guild(db, "100", MANAGE_GUILD).await?;
    AuthSession::new(session)
        .set_operator_id(operator.discord_id.parse().unwrap())
        .await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::ManageGuild(200)])
        .await;

    assert!(matches!(result, Err(AppError::PermissionDenied(_))));

    Ok(())
}

/// Tests that a stale permission snapshot expires the session.
///
/// Expected: Err(AuthError::SessionExpired)
#[tokio::test]
async fn expires_stale_snapshot() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let operator = factory::operator::OperatorFactory::new(db)
        .discord_id("55")
        .guilds_synced_at(Utc::now() - Duration::minutes(31))
        .build()
        .await?;
    factory::operator::add_operator_guild(db, operator.discord_id.clone(), "100", MANAGE_GUILD)
        .await?;
    AuthSession::new(session).set_operator_id(55).await?;

    let result = AuthGuard::new(db, session)
        .require(&[Permission::ManageGuild(100)])
        .await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::SessionExpired(55)))
    ));

    Ok(())
}

/// Tests that a request without a logged-in operator is rejected.
///
/// Expected: Err(AuthError::UserNotInSession)
#[tokio::test]
async fn denies_access_when_not_authenticated() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    let result = AuthGuard::new(db, session).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::UserNotInSession))
    ));

    Ok(())
}

/// Tests that a session pointing at a deleted operator is rejected.
///
/// Expected: Err(AuthError::UserNotInDatabase)
#[tokio::test]
async fn denies_unknown_operator() -> Result<(), AppError> {
    let mut test = TestBuilder::new()
        .with_operator_tables()
        .build()
        .await
        .unwrap();
    let (db, session) = test.db_and_session().await.unwrap();

    AuthSession::new(session).set_operator_id(999).await?;

    let result = AuthGuard::new(db, session).require(&[]).await;

    assert!(matches!(
        result,
        Err(AppError::AuthErr(AuthError::UserNotInDatabase(999)))
    ));

    Ok(())
}
