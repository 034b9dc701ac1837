//! Dashboard operator lookups.

use sea_orm::DatabaseConnection;

use crate::{
    model::operator::OperatorDto,
    server::{data::operator::OperatorRepository, error::AppError},
};

pub struct OperatorService<'a> {
    pub db: &'a DatabaseConnection,
}

impl<'a> OperatorService<'a> {
    /// Creates a new OperatorService instance.
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Retrieves an operator with the guilds they may manage.
    ///
    /// Guilds where the snapshot lacks administrator and manage-guild are left out, since
    /// the dashboard cannot act on them.
    ///
    /// # Arguments
    /// - `discord_id` - Operator's Discord user id
    ///
    /// # Returns
    /// - `Ok(Some(OperatorDto))` - Operator and manageable guilds
    /// - `Ok(None)` - No operator with that id has logged in
    /// - `Err(AppError::DbErr)` - Database error during query
    pub async fn get_operator(&self, discord_id: u64) -> Result<Option<OperatorDto>, AppError> {
        let repo = OperatorRepository::new(self.db);

        let Some(operator) = repo.find(discord_id).await? else {
            return Ok(None);
        };
        let guilds = repo.guilds(discord_id).await?;

        Ok(Some(operator.into_dto(guilds)))
    }
}
