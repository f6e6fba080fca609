use async_trait::async_trait;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::entities::{Conversation, Message};
use crate::domain::repositories::{
    ConversationRepository,
    conversation_repository::{ConversationRepositoryError, TurnRecord},
};
use crate::domain::value_objects::{Channel, ConversationStatus};
use crate::infrastructure::database::models::{
    ConversationModel, ConversationStateChangeset, MessageModel, NewConversationModel, NewMessageModel,
};
use crate::infrastructure::database::schema::{agents, conversations, messages};
use crate::infrastructure::database::{DatabaseError, DbConnection, DbPool, with_connection};

impl From<DatabaseError> for ConversationRepositoryError {
    fn from(error: DatabaseError) -> Self {
        ConversationRepositoryError::DatabaseError(error.to_string())
    }
}

impl From<diesel::result::Error> for ConversationRepositoryError {
    fn from(error: diesel::result::Error) -> Self {
        ConversationRepositoryError::DatabaseError(error.to_string())
    }
}

fn to_domain(model: ConversationModel) -> Result<Conversation, ConversationRepositoryError> {
    Conversation::try_from(model).map_err(ConversationRepositoryError::ValidationError)
}

fn to_messages(models: Vec<MessageModel>) -> Result<Vec<Message>, ConversationRepositoryError> {
    models
        .into_iter()
        .map(|m| Message::try_from(m).map_err(ConversationRepositoryError::ValidationError))
        .collect()
}

fn load_open_thread(
    conn: &mut DbConnection,
    org_id: Uuid,
    channel: Channel,
    thread_id: &str,
) -> Result<Option<Conversation>, ConversationRepositoryError> {
    conversations::table
        .filter(conversations::organization_id.eq(org_id))
        .filter(conversations::channel.eq(channel.as_str()))
        .filter(conversations::external_thread_id.eq(thread_id))
        .filter(conversations::status.ne(ConversationStatus::Completed.as_str()))
        .select(ConversationModel::as_select())
        .first(conn)
        .optional()?
        .map(to_domain)
        .transpose()
}

/// Writes the escalation state of `conversation` if its version is still
/// current; the stored row then carries the next version.
fn write_versioned(
    conn: &mut DbConnection,
    conversation: &Conversation,
) -> Result<Conversation, ConversationRepositoryError> {
    let conversation_id = conversation.id();
    let changes = ConversationStateChangeset::next_version(conversation);

    let updated = diesel::update(
        conversations::table
            .filter(conversations::id.eq(conversation_id))
            .filter(conversations::version.eq(conversation.version())),
    )
    .set(&changes)
    .returning(ConversationModel::as_returning())
    .get_result(conn)
    .optional()?;

    match updated {
        Some(model) => to_domain(model),
        None => {
            let exists: i64 = conversations::table
                .filter(conversations::id.eq(conversation_id))
                .count()
                .get_result(conn)?;
            if exists == 0 {
                Err(ConversationRepositoryError::NotFound(conversation_id))
            } else {
                Err(ConversationRepositoryError::Conflict(conversation_id))
            }
        }
    }
}

pub struct PostgresConversationRepository {
    pool: DbPool,
}

impl PostgresConversationRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConversationRepository for PostgresConversationRepository {
    async fn find_by_id(&self, conversation_id: Uuid) -> Result<Option<Conversation>, ConversationRepositoryError> {
        with_connection(&self.pool, move |conn| {
            conversations::table
                .find(conversation_id)
                .select(ConversationModel::as_select())
                .first(conn)
                .optional()?
                .map(to_domain)
                .transpose()
        })
        .await
    }

    async fn find_open_thread(
        &self,
        organization_id: Uuid,
        channel: Channel,
        external_thread_id: &str,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        let thread_id = external_thread_id.to_string();
        with_connection(&self.pool, move |conn| {
            load_open_thread(conn, organization_id, channel, &thread_id)
        })
        .await
    }

    async fn create(&self, conversation: &Conversation) -> Result<Conversation, ConversationRepositoryError> {
        let new_conversation = NewConversationModel::from(conversation);
        let created = conversation.clone();

        with_connection(&self.pool, move |conn| {
            conn.transaction::<_, ConversationRepositoryError, _>(|conn| {
                // A concurrent first message may have opened the thread already;
                // the partial unique index turns that into a no-op insert.
                let inserted = diesel::insert_into(conversations::table)
                    .values(&new_conversation)
                    .on_conflict_do_nothing()
                    .execute(conn)?;

                if inserted == 0 {
                    return load_open_thread(
                        conn,
                        created.organization_id(),
                        created.channel(),
                        created.external_thread_id(),
                    )?
                    .ok_or(ConversationRepositoryError::Conflict(created.id()));
                }

                diesel::update(agents::table.find(created.agent_id()))
                    .set(agents::total_conversations.eq(agents::total_conversations + 1))
                    .execute(conn)?;

                Ok(created)
            })
        })
        .await
    }

    async fn record_turn(&self, turn: TurnRecord<'_>) -> Result<Conversation, ConversationRepositoryError> {
        let conversation = turn.conversation.clone();
        let new_messages: Vec<NewMessageModel> = turn.messages.iter().map(NewMessageModel::from).collect();

        with_connection(&self.pool, move |conn| {
            conn.transaction::<_, ConversationRepositoryError, _>(|conn| {
                let saved = write_versioned(conn, &conversation)?;

                if !new_messages.is_empty() {
                    diesel::insert_into(messages::table)
                        .values(&new_messages)
                        .execute(conn)?;

                    diesel::update(agents::table.find(conversation.agent_id()))
                        .set(agents::total_messages.eq(agents::total_messages + new_messages.len() as i64))
                        .execute(conn)?;
                }

                Ok(saved)
            })
        })
        .await
    }

    async fn update_status(&self, conversation: &Conversation) -> Result<Conversation, ConversationRepositoryError> {
        let conversation = conversation.clone();
        with_connection(&self.pool, move |conn| write_versioned(conn, &conversation)).await
    }

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, ConversationRepositoryError> {
        with_connection(&self.pool, move |conn| {
            let models = messages::table
                .filter(messages::conversation_id.eq(conversation_id))
                .order(messages::seq.asc())
                .select(MessageModel::as_select())
                .load(conn)?;
            to_messages(models)
        })
        .await
    }

    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ConversationRepositoryError> {
        with_connection(&self.pool, move |conn| {
            let mut models = messages::table
                .filter(messages::conversation_id.eq(conversation_id))
                .order(messages::seq.desc())
                .limit(limit)
                .select(MessageModel::as_select())
                .load(conn)?;
            models.reverse();
            to_messages(models)
        })
        .await
    }
}
