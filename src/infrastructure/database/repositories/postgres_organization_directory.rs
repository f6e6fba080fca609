use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::application::ports::{OrganizationDirectory, organization_directory::DirectoryError};
use crate::domain::entities::{AgentProfile, ChannelIntegration, Organization};
use crate::domain::value_objects::Channel;
use crate::infrastructure::database::models::{AgentModel, ChannelIntegrationModel, OrganizationModel};
use crate::infrastructure::database::schema::{agents, channel_integrations, organizations};
use crate::infrastructure::database::{DatabaseError, DbPool, with_connection};

impl From<DatabaseError> for DirectoryError {
    fn from(error: DatabaseError) -> Self {
        DirectoryError::DatabaseError(error.to_string())
    }
}

impl From<diesel::result::Error> for DirectoryError {
    fn from(error: diesel::result::Error) -> Self {
        DirectoryError::DatabaseError(error.to_string())
    }
}

fn to_integration(model: ChannelIntegrationModel) -> Result<ChannelIntegration, DirectoryError> {
    ChannelIntegration::try_from(model).map_err(DirectoryError::DatabaseError)
}

/// Reads organizations, agents and channel integrations from the shared
/// account tables.
pub struct PostgresOrganizationDirectory {
    pool: DbPool,
}

impl PostgresOrganizationDirectory {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrganizationDirectory for PostgresOrganizationDirectory {
    async fn get_organization(&self, id: Uuid) -> Result<Organization, DirectoryError> {
        with_connection(&self.pool, move |conn| {
            let model = organizations::table
                .find(id)
                .select(OrganizationModel::as_select())
                .first(conn)
                .optional()?
                .ok_or(DirectoryError::OrganizationNotFound(id))?;

            Organization::try_from(model).map_err(DirectoryError::DatabaseError)
        })
        .await
    }

    async fn get_agent(&self, id: Uuid) -> Result<AgentProfile, DirectoryError> {
        with_connection(&self.pool, move |conn| {
            let model = agents::table
                .find(id)
                .select(AgentModel::as_select())
                .first(conn)
                .optional()?
                .ok_or(DirectoryError::AgentNotFound(id))?;

            Ok(AgentProfile::from(model))
        })
        .await
    }

    async fn find_integration(
        &self,
        channel: Channel,
        account_id: &str,
    ) -> Result<Option<ChannelIntegration>, DirectoryError> {
        let account_id = account_id.to_string();

        with_connection(&self.pool, move |conn| {
            channel_integrations::table
                .filter(channel_integrations::channel.eq(channel.as_str()))
                .filter(channel_integrations::account_id.eq(account_id))
                .select(ChannelIntegrationModel::as_select())
                .first(conn)
                .optional()?
                .map(to_integration)
                .transpose()
        })
        .await
    }

    async fn find_integration_by_id(&self, id: Uuid) -> Result<Option<ChannelIntegration>, DirectoryError> {
        with_connection(&self.pool, move |conn| {
            channel_integrations::table
                .find(id)
                .select(ChannelIntegrationModel::as_select())
                .first(conn)
                .optional()?
                .map(to_integration)
                .transpose()
        })
        .await
    }

    async fn verify_token_matches(&self, channel: Channel, token: &str) -> Result<bool, DirectoryError> {
        let token = token.to_string();

        with_connection(&self.pool, move |conn| {
            let matches: i64 = channel_integrations::table
                .filter(channel_integrations::channel.eq(channel.as_str()))
                .filter(channel_integrations::active.eq(true))
                .filter(channel_integrations::verify_token.eq(token))
                .count()
                .get_result(conn)?;
            Ok(matches > 0)
        })
        .await
    }

    async fn record_usage(&self, organization_id: Uuid, messages: i64) -> Result<(), DirectoryError> {
        with_connection(&self.pool, move |conn| {
            let updated = diesel::update(organizations::table.find(organization_id))
                .set(organizations::messages_used.eq(organizations::messages_used + messages))
                .execute(conn)?;

            if updated == 0 {
                return Err(DirectoryError::OrganizationNotFound(organization_id));
            }
            Ok(())
        })
        .await
    }
}
