//! In-memory ports and repositories for service tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pgvector::Vector;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use uuid::Uuid;

use crate::application::ports::{
    BusinessDataSource, ChannelAdapter, DocumentExtractor, EmbeddingProvider, FileStorage, JobQueue,
    LanguageModel, OrganizationDirectory,
    business_data::BusinessDataError,
    channel_adapter::{ChannelError, InboundEvent},
    document_extractor::{DocumentExtractionError, ExtractedContent},
    embedding_provider::EmbeddingError,
    file_storage::{FileStorageError, StoredFile},
    job_queue::{IngestionJob, JobQueueError},
    language_model::{CompletionRequest, CompletionResponse, LanguageModelError},
    organization_directory::DirectoryError,
};
use crate::application::services::ConversationService;
use crate::application::services::conversation_service::ThreadKey;
use crate::application::services::response_generator::{GenerationSettings, ResponseGenerator};
use crate::application::services::RetrievalService;
use crate::domain::entities::{
    AgentProfile, CallSession, ChannelIntegration, Conversation, Document, DocumentChunk, Message,
    Organization, UsageLimits,
};
use crate::domain::repositories::{
    CallSessionRepository, ChunkRepository, ConversationRepository, DocumentRepository,
    call_session_repository::CallSessionRepositoryError,
    chunk_repository::ChunkRepositoryError,
    conversation_repository::{ConversationRepositoryError, TurnRecord},
    document_repository::DocumentRepositoryError,
};
use crate::domain::value_objects::{Channel, ConversationStatus, EscalationPolicy, Intent, Language};

pub const VERIFY_TOKEN: &str = "verify-me";

pub fn agent_profile(organization_id: Uuid) -> AgentProfile {
    AgentProfile {
        id: Uuid::new_v4(),
        organization_id,
        name: "Mitu".to_string(),
        persona: "You are Mitu, the support assistant of a Dhaka clothing shop.".to_string(),
        max_tokens: 300,
        temperature: 0.3,
        total_conversations: 0,
        total_messages: 0,
    }
}

pub fn account_id_for(channel: Channel) -> &'static str {
    match channel {
        Channel::Web => "widget-1",
        Channel::WhatsApp => "phone-200",
        Channel::Facebook => "page-100",
        Channel::Instagram => "ig-300",
        Channel::Ivr => "+8809600000000",
    }
}

// ---- embeddings, extraction, generation ----

pub struct StubEmbeddingProvider {
    vector: Vec<f32>,
}

impl StubEmbeddingProvider {
    pub fn fixed(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

impl Default for StubEmbeddingProvider {
    fn default() -> Self {
        Self::fixed(vec![1.0, 0.0, 0.0])
    }
}

#[async_trait]
impl EmbeddingProvider for StubEmbeddingProvider {
    async fn embed_query(&self, _text: &str) -> Result<Vector, EmbeddingError> {
        Ok(Vector::from(self.vector.clone()))
    }

    async fn embed_passages(&self, passages: &[String]) -> Result<Vec<Vector>, EmbeddingError> {
        Ok(passages.iter().map(|_| Vector::from(self.vector.clone())).collect())
    }
}

pub struct StaticExtractor {
    result: Result<ExtractedContent, DocumentExtractionError>,
}

impl StaticExtractor {
    pub fn text(text: &str) -> Self {
        Self {
            result: Ok(ExtractedContent {
                text: text.to_string(),
                page_count: Some(1),
            }),
        }
    }

    pub fn failing(error: DocumentExtractionError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl DocumentExtractor for StaticExtractor {
    async fn extract_text(
        &self,
        _file_path: &Path,
        _mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        self.result.clone()
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["text/plain".to_string()]
    }
}

/// Takes its time before returning a short text.
pub struct SlowExtractor(pub Duration);

#[async_trait]
impl DocumentExtractor for SlowExtractor {
    async fn extract_text(
        &self,
        _file_path: &Path,
        _mime_type: &str,
    ) -> Result<ExtractedContent, DocumentExtractionError> {
        tokio::time::sleep(self.0).await;
        Ok(ExtractedContent {
            text: "Slow but complete content".to_string(),
            page_count: Some(1),
        })
    }

    fn supported_formats(&self) -> Vec<String> {
        vec!["text/plain".to_string()]
    }
}

pub struct ScriptedLanguageModel {
    reply: Option<String>,
    calls: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedLanguageModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Some(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            reply: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LanguageModel for ScriptedLanguageModel {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LanguageModelError> {
        self.calls.lock().unwrap().push(request);
        match &self.reply {
            Some(text) => Ok(CompletionResponse { text: text.clone() }),
            None => Err(LanguageModelError::ApiError {
                status: 503,
                message: "overloaded".to_string(),
            }),
        }
    }
}

pub struct StubBusinessData {
    result: Result<Option<String>, BusinessDataError>,
}

impl StubBusinessData {
    pub fn returning(data: &str) -> Self {
        Self {
            result: Ok(Some(data.to_string())),
        }
    }

    pub fn failing(error: BusinessDataError) -> Self {
        Self { result: Err(error) }
    }
}

#[async_trait]
impl BusinessDataSource for StubBusinessData {
    async fn lookup(
        &self,
        _organization_id: Uuid,
        _intent: Intent,
        _user_text: &str,
    ) -> Result<Option<String>, BusinessDataError> {
        self.result.clone()
    }
}

// ---- organization directory ----

pub struct InMemoryDirectory {
    organization: Mutex<Organization>,
    agent: Mutex<AgentProfile>,
    integrations: Vec<ChannelIntegration>,
}

impl Default for InMemoryDirectory {
    fn default() -> Self {
        let organization_id = Uuid::new_v4();
        let agent = agent_profile(organization_id);
        let integrations = [
            Channel::Web,
            Channel::WhatsApp,
            Channel::Facebook,
            Channel::Instagram,
            Channel::Ivr,
        ]
        .into_iter()
        .map(|channel| ChannelIntegration {
            id: Uuid::new_v4(),
            organization_id,
            agent_id: agent.id,
            channel,
            account_id: account_id_for(channel).to_string(),
            access_token: Some("page-token".to_string()),
            verify_token: Some(VERIFY_TOKEN.to_string()),
            active: true,
        })
        .collect();

        Self {
            organization: Mutex::new(Organization {
                id: organization_id,
                name: "Dhaka Threads".to_string(),
                language: Language::English,
                limits: UsageLimits {
                    monthly_message_limit: Some(1000),
                    messages_used: 0,
                },
            }),
            agent: Mutex::new(agent),
            integrations,
        }
    }
}

impl InMemoryDirectory {
    pub fn organization_id(&self) -> Uuid {
        self.organization.lock().unwrap().id
    }

    pub fn language(&self) -> Language {
        self.organization.lock().unwrap().language
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent.lock().unwrap().id
    }

    pub fn integration(&self, channel: Channel) -> ChannelIntegration {
        self.integrations
            .iter()
            .find(|i| i.channel == channel)
            .cloned()
            .unwrap()
    }

    pub fn set_quota(&self, limit: Option<i64>) {
        self.organization.lock().unwrap().limits.monthly_message_limit = limit;
    }

    pub fn messages_used(&self) -> i64 {
        self.organization.lock().unwrap().limits.messages_used
    }

    pub fn agent_conversations(&self) -> i64 {
        self.agent.lock().unwrap().total_conversations
    }

    pub fn agent_messages(&self) -> i64 {
        self.agent.lock().unwrap().total_messages
    }

    fn bump_agent(&self, conversations: i64, messages: i64) {
        let mut agent = self.agent.lock().unwrap();
        agent.total_conversations += conversations;
        agent.total_messages += messages;
    }
}

#[async_trait]
impl OrganizationDirectory for InMemoryDirectory {
    async fn get_organization(&self, id: Uuid) -> Result<Organization, DirectoryError> {
        let organization = self.organization.lock().unwrap().clone();
        if organization.id == id {
            Ok(organization)
        } else {
            Err(DirectoryError::OrganizationNotFound(id))
        }
    }

    async fn get_agent(&self, id: Uuid) -> Result<AgentProfile, DirectoryError> {
        let agent = self.agent.lock().unwrap().clone();
        if agent.id == id {
            Ok(agent)
        } else {
            Err(DirectoryError::AgentNotFound(id))
        }
    }

    async fn find_integration(
        &self,
        channel: Channel,
        account_id: &str,
    ) -> Result<Option<ChannelIntegration>, DirectoryError> {
        Ok(self
            .integrations
            .iter()
            .find(|i| i.channel == channel && i.account_id == account_id)
            .cloned())
    }

    async fn find_integration_by_id(&self, id: Uuid) -> Result<Option<ChannelIntegration>, DirectoryError> {
        Ok(self.integrations.iter().find(|i| i.id == id).cloned())
    }

    async fn verify_token_matches(&self, channel: Channel, token: &str) -> Result<bool, DirectoryError> {
        Ok(self
            .integrations
            .iter()
            .any(|i| i.channel == channel && i.verify_token.as_deref() == Some(token)))
    }

    async fn record_usage(&self, organization_id: Uuid, messages: i64) -> Result<(), DirectoryError> {
        let mut organization = self.organization.lock().unwrap();
        if organization.id != organization_id {
            return Err(DirectoryError::OrganizationNotFound(organization_id));
        }
        organization.limits.messages_used += messages;
        Ok(())
    }
}

// ---- repositories ----

#[derive(Default)]
pub struct InMemoryChunkRepository {
    chunks: Mutex<Vec<DocumentChunk>>,
}

impl InMemoryChunkRepository {
    pub fn insert(&self, chunk: DocumentChunk) {
        self.chunks.lock().unwrap().push(chunk);
    }

    pub fn chunks_for(&self, document_id: Uuid) -> Vec<DocumentChunk> {
        self.chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.document_id() == document_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ChunkRepository for InMemoryChunkRepository {
    async fn replace_for_document(
        &self,
        document_id: Uuid,
        chunks: &[DocumentChunk],
    ) -> Result<usize, ChunkRepositoryError> {
        let mut stored = self.chunks.lock().unwrap();
        stored.retain(|c| c.document_id() != document_id);
        stored.extend(chunks.iter().cloned());
        Ok(chunks.len())
    }

    async fn find_by_organization(
        &self,
        organization_id: Uuid,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError> {
        Ok(self
            .chunks
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.organization_id() == organization_id)
            .cloned()
            .collect())
    }

    async fn find_by_document_paginated(
        &self,
        document_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<DocumentChunk>, ChunkRepositoryError> {
        Ok(self
            .chunks_for(document_id)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_by_document(&self, document_id: Uuid) -> Result<i64, ChunkRepositoryError> {
        Ok(self.chunks_for(document_id).len() as i64)
    }
}

#[derive(Default)]
pub struct InMemoryDocumentRepository {
    documents: Mutex<Vec<Document>>,
    fail_saves: bool,
}

impl InMemoryDocumentRepository {
    pub fn failing_saves() -> Self {
        Self {
            fail_saves: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, document: Document) {
        self.documents.lock().unwrap().push(document);
    }

    pub fn get(&self, id: Uuid) -> Option<Document> {
        self.documents.lock().unwrap().iter().find(|d| d.id() == id).cloned()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn save(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        if self.fail_saves {
            return Err(DocumentRepositoryError::DatabaseError("connection reset".to_string()));
        }
        self.insert(document.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Document>, DocumentRepositoryError> {
        Ok(self.get(id))
    }

    async fn find_by_hash(
        &self,
        organization_id: Uuid,
        hash: &str,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.organization_id() == organization_id && d.content_hash().as_str() == hash)
            .cloned())
    }

    async fn find_by_organization(
        &self,
        organization_id: Uuid,
        skip: i64,
        limit: i64,
    ) -> Result<Vec<Document>, DocumentRepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.organization_id() == organization_id)
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn count_by_organization(&self, organization_id: Uuid) -> Result<i64, DocumentRepositoryError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.organization_id() == organization_id)
            .count() as i64)
    }

    async fn update(&self, document: &Document) -> Result<(), DocumentRepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let slot = documents
            .iter_mut()
            .find(|d| d.id() == document.id())
            .ok_or(DocumentRepositoryError::NotFound(document.id()))?;
        *slot = document.clone();
        Ok(())
    }

    async fn claim_for_processing(
        &self,
        id: Uuid,
        stale_before: DateTime<Utc>,
    ) -> Result<Option<Document>, DocumentRepositoryError> {
        let mut documents = self.documents.lock().unwrap();
        let Some(document) = documents.iter_mut().find(|d| d.id() == id) else {
            return Ok(None);
        };
        if document.claim_processing(stale_before).is_err() {
            return Ok(None);
        }
        Ok(Some(document.clone()))
    }
}

/// Mirrors the Postgres repository: optimistic version check, agent
/// counters bumped with each write.
pub struct InMemoryConversationRepository {
    directory: Arc<InMemoryDirectory>,
    conversations: Mutex<HashMap<Uuid, Conversation>>,
    messages: Mutex<Vec<Message>>,
}

impl InMemoryConversationRepository {
    pub fn new(directory: Arc<InMemoryDirectory>) -> Self {
        Self {
            directory,
            conversations: Mutex::new(HashMap::new()),
            messages: Mutex::new(Vec::new()),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<Conversation> {
        self.conversations.lock().unwrap().get(&id).cloned()
    }

    pub fn message_count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }

    fn write_versioned(&self, conversation: &Conversation) -> Result<Conversation, ConversationRepositoryError> {
        let mut conversations = self.conversations.lock().unwrap();
        let stored = conversations
            .get_mut(&conversation.id())
            .ok_or(ConversationRepositoryError::NotFound(conversation.id()))?;
        if stored.version() != conversation.version() {
            return Err(ConversationRepositoryError::Conflict(conversation.id()));
        }
        let mut next = conversation.clone();
        next.bump_version();
        *stored = next.clone();
        Ok(next)
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Conversation>, ConversationRepositoryError> {
        Ok(self.get(id))
    }

    async fn find_open_thread(
        &self,
        organization_id: Uuid,
        channel: Channel,
        external_thread_id: &str,
    ) -> Result<Option<Conversation>, ConversationRepositoryError> {
        Ok(self
            .conversations
            .lock()
            .unwrap()
            .values()
            .find(|c| {
                c.organization_id() == organization_id
                    && c.channel() == channel
                    && c.external_thread_id() == external_thread_id
                    && c.status() != ConversationStatus::Completed
            })
            .cloned())
    }

    async fn create(&self, conversation: &Conversation) -> Result<Conversation, ConversationRepositoryError> {
        if let Some(existing) = self
            .find_open_thread(
                conversation.organization_id(),
                conversation.channel(),
                conversation.external_thread_id(),
            )
            .await?
        {
            return Ok(existing);
        }
        self.conversations
            .lock()
            .unwrap()
            .insert(conversation.id(), conversation.clone());
        self.directory.bump_agent(1, 0);
        Ok(conversation.clone())
    }

    async fn record_turn(&self, turn: TurnRecord<'_>) -> Result<Conversation, ConversationRepositoryError> {
        let saved = self.write_versioned(turn.conversation)?;
        self.messages.lock().unwrap().extend(turn.messages.iter().cloned());
        self.directory.bump_agent(0, turn.messages.len() as i64);
        Ok(saved)
    }

    async fn update_status(&self, conversation: &Conversation) -> Result<Conversation, ConversationRepositoryError> {
        self.write_versioned(conversation)
    }

    async fn messages(&self, conversation_id: Uuid) -> Result<Vec<Message>, ConversationRepositoryError> {
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.conversation_id() == conversation_id)
            .cloned()
            .collect())
    }

    async fn recent_messages(
        &self,
        conversation_id: Uuid,
        limit: i64,
    ) -> Result<Vec<Message>, ConversationRepositoryError> {
        let all = self.messages(conversation_id).await?;
        let skip = all.len().saturating_sub(limit.max(0) as usize);
        Ok(all.into_iter().skip(skip).collect())
    }
}

#[derive(Default)]
pub struct InMemoryCallSessionRepository {
    sessions: Mutex<HashMap<String, CallSession>>,
}

impl InMemoryCallSessionRepository {
    pub fn get(&self, call_sid: &str) -> Option<CallSession> {
        self.sessions.lock().unwrap().get(call_sid).cloned()
    }
}

#[async_trait]
impl CallSessionRepository for InMemoryCallSessionRepository {
    async fn save(&self, session: &CallSession) -> Result<(), CallSessionRepositoryError> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.call_sid().to_string(), session.clone());
        Ok(())
    }

    async fn find_by_call_sid(&self, call_sid: &str) -> Result<Option<CallSession>, CallSessionRepositoryError> {
        Ok(self.get(call_sid))
    }

    async fn update(&self, session: &CallSession) -> Result<(), CallSessionRepositoryError> {
        let mut sessions = self.sessions.lock().unwrap();
        if !sessions.contains_key(session.call_sid()) {
            return Err(CallSessionRepositoryError::NotFound(session.call_sid().to_string()));
        }
        sessions.insert(session.call_sid().to_string(), session.clone());
        Ok(())
    }
}

// ---- storage, queue, channels ----

#[derive(Default)]
pub struct MemoryFileStorage {
    files: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFileStorage {
    pub fn paths(&self) -> Vec<String> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn store_file(&self, data: &[u8], file_name: &str) -> Result<StoredFile, FileStorageError> {
        let path = format!("memory://{}/{}", Uuid::new_v4(), file_name);
        self.files.lock().unwrap().insert(path.clone(), data.to_vec());
        Ok(StoredFile { path })
    }

    async fn delete_file(&self, path: &str) -> Result<bool, FileStorageError> {
        Ok(self.files.lock().unwrap().remove(path).is_some())
    }
}

#[derive(Default)]
pub struct RecordingJobQueue {
    jobs: Mutex<Vec<IngestionJob>>,
}

impl RecordingJobQueue {
    pub fn jobs(&self) -> Vec<IngestionJob> {
        self.jobs.lock().unwrap().clone()
    }
}

#[async_trait]
impl JobQueue for RecordingJobQueue {
    async fn enqueue(&self, job: IngestionJob) -> Result<(), JobQueueError> {
        self.jobs.lock().unwrap().push(job);
        Ok(())
    }

    async fn pending(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }
}

/// Chat adapter returning queued events and recording every send.
pub struct RecordingAdapter {
    channel: Channel,
    events: Mutex<VecDeque<Vec<InboundEvent>>>,
    sent: Mutex<Vec<(String, String)>>,
    attempts: Mutex<usize>,
    reject_signatures: bool,
    fail_sends: bool,
}

impl RecordingAdapter {
    pub fn new(channel: Channel) -> Self {
        Self {
            channel,
            events: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            attempts: Mutex::new(0),
            reject_signatures: false,
            fail_sends: false,
        }
    }

    pub fn rejecting_signatures(mut self) -> Self {
        self.reject_signatures = true;
        self
    }

    pub fn failing_sends(mut self) -> Self {
        self.fail_sends = true;
        self
    }

    pub fn queue_events(&self, events: Vec<InboundEvent>) {
        self.events.lock().unwrap().push_back(events);
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl ChannelAdapter for RecordingAdapter {
    fn channel(&self) -> Channel {
        self.channel
    }

    fn verify_signature(&self, _signature: Option<&str>, _body: &[u8]) -> Result<(), ChannelError> {
        if self.reject_signatures {
            Err(ChannelError::SignatureInvalid)
        } else {
            Ok(())
        }
    }

    fn parse_events(&self, _body: &[u8]) -> Result<Vec<InboundEvent>, ChannelError> {
        Ok(self.events.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn send(
        &self,
        _integration: &ChannelIntegration,
        recipient_id: &str,
        text: &str,
    ) -> Result<(), ChannelError> {
        *self.attempts.lock().unwrap() += 1;
        if self.fail_sends {
            return Err(ChannelError::SendFailed("HTTP 500".to_string()));
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient_id.to_string(), text.to_string()));
        Ok(())
    }
}

// ---- wiring ----

/// Conversation stack wired over in-memory collaborators.
pub struct Harness {
    pub directory: Arc<InMemoryDirectory>,
    pub conversations: Arc<InMemoryConversationRepository>,
    pub call_sessions: Arc<InMemoryCallSessionRepository>,
    pub chunks: Arc<InMemoryChunkRepository>,
    pub model: Arc<ScriptedLanguageModel>,
    pub retrieval: Arc<RetrievalService>,
    pub conversation_service: Arc<ConversationService>,
}

impl Harness {
    pub fn new(model: ScriptedLanguageModel) -> Self {
        let directory = Arc::new(InMemoryDirectory::default());
        let conversations = Arc::new(InMemoryConversationRepository::new(directory.clone()));
        let chunks = Arc::new(InMemoryChunkRepository::default());
        let model = Arc::new(model);

        let retrieval = Arc::new(RetrievalService::new(
            Arc::new(StubEmbeddingProvider::fixed(vec![1.0, 0.0])),
            chunks.clone(),
        ));
        let generator = Arc::new(ResponseGenerator::new(
            retrieval.clone(),
            model.clone(),
            None,
            GenerationSettings::default(),
        ));
        let conversation_service = Arc::new(ConversationService::new(
            conversations.clone(),
            directory.clone(),
            generator,
            EscalationPolicy::default(),
            6,
        ));

        Self {
            directory,
            conversations,
            call_sessions: Arc::new(InMemoryCallSessionRepository::default()),
            chunks,
            model,
            retrieval,
            conversation_service,
        }
    }

    pub fn language(&self) -> Language {
        self.directory.language()
    }

    pub fn integration(&self, channel: Channel) -> ChannelIntegration {
        self.directory.integration(channel)
    }

    pub fn thread_key(&self, channel: Channel, thread_id: &str) -> ThreadKey {
        ThreadKey {
            organization_id: self.directory.organization_id(),
            agent_id: self.directory.agent_id(),
            channel,
            external_thread_id: thread_id.to_string(),
            customer_name: None,
        }
    }

    pub fn seed_chunk(&self, text: &str, embedding: Vec<f32>) {
        let index = self.chunks.chunks.lock().unwrap().len() as i32;
        self.chunks.insert(DocumentChunk::new(
            Uuid::new_v4(),
            self.directory.organization_id(),
            index,
            text.to_string(),
            Vector::from(embedding),
        ));
    }
}
