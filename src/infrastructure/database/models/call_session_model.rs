use chrono::{DateTime, Utc};
use diesel::prelude::*;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::entities::{CallSession as DomainCallSession, CallState};
use crate::infrastructure::database::schema::call_sessions;

#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset, Identifiable)]
#[diesel(table_name = call_sessions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub struct CallSessionModel {
    pub id: Uuid,
    pub call_sid: String,
    pub organization_id: Uuid,
    pub from_number: String,
    pub to_number: String,
    pub state: String,
    pub input_attempts: i32,
    pub no_input_count: i32,
    pub conversation_id: Option<Uuid>,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
}

impl From<&DomainCallSession> for CallSessionModel {
    fn from(session: &DomainCallSession) -> Self {
        Self {
            id: session.id(),
            call_sid: session.call_sid().to_string(),
            organization_id: session.organization_id(),
            from_number: session.from_number().to_string(),
            to_number: session.to_number().to_string(),
            state: session.state().as_str().to_string(),
            input_attempts: session.input_attempts(),
            no_input_count: session.no_input_count(),
            conversation_id: session.conversation_id(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            duration_seconds: session.duration_seconds(),
        }
    }
}

impl TryFrom<CallSessionModel> for DomainCallSession {
    type Error = String;

    fn try_from(model: CallSessionModel) -> Result<Self, Self::Error> {
        Ok(DomainCallSession::restore(
            model.id,
            model.call_sid,
            model.organization_id,
            model.from_number,
            model.to_number,
            CallState::from_str(&model.state)?,
            model.input_attempts,
            model.no_input_count,
            model.conversation_id,
            model.started_at,
            model.ended_at,
            model.duration_seconds,
        ))
    }
}
