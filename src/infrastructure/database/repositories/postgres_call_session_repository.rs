use async_trait::async_trait;
use diesel::prelude::*;

use crate::domain::entities::CallSession;
use crate::domain::repositories::{CallSessionRepository, call_session_repository::CallSessionRepositoryError};
use crate::infrastructure::database::models::CallSessionModel;
use crate::infrastructure::database::schema::call_sessions::dsl::*;
use crate::infrastructure::database::{DatabaseError, DbPool, with_connection};

impl From<DatabaseError> for CallSessionRepositoryError {
    fn from(error: DatabaseError) -> Self {
        CallSessionRepositoryError::DatabaseError(error.to_string())
    }
}

pub struct PostgresCallSessionRepository {
    pool: DbPool,
}

impl PostgresCallSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CallSessionRepository for PostgresCallSessionRepository {
    async fn save(&self, session: &CallSession) -> Result<(), CallSessionRepositoryError> {
        let model = CallSessionModel::from(session);

        with_connection(&self.pool, move |conn| {
            // Providers may retry the call-start webhook
            diesel::insert_into(call_sessions)
                .values(&model)
                .on_conflict(call_sid)
                .do_nothing()
                .execute(conn)
                .map_err(|e| CallSessionRepositoryError::DatabaseError(e.to_string()))?;
            Ok(())
        })
        .await
    }

    async fn find_by_call_sid(&self, sid: &str) -> Result<Option<CallSession>, CallSessionRepositoryError> {
        let sid = sid.to_string();

        with_connection(&self.pool, move |conn| {
            let result = call_sessions
                .filter(call_sid.eq(sid))
                .select(CallSessionModel::as_select())
                .first(conn)
                .optional()
                .map_err(|e| CallSessionRepositoryError::DatabaseError(e.to_string()))?;

            result
                .map(|model| CallSession::try_from(model).map_err(CallSessionRepositoryError::ValidationError))
                .transpose()
        })
        .await
    }

    async fn update(&self, session: &CallSession) -> Result<(), CallSessionRepositoryError> {
        let model = CallSessionModel::from(session);

        with_connection(&self.pool, move |conn| {
            let updated = diesel::update(call_sessions.filter(call_sid.eq(&model.call_sid)))
                .set(&model)
                .execute(conn)
                .map_err(|e| CallSessionRepositoryError::DatabaseError(e.to_string()))?;

            if updated == 0 {
                return Err(CallSessionRepositoryError::NotFound(model.call_sid.clone()));
            }
            Ok(())
        })
        .await
    }
}
