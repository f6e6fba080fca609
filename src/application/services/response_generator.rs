use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::application::ports::{
    BusinessDataSource, LanguageModel,
    language_model::{ChatMessage, ChatRole, CompletionRequest},
};
use crate::application::services::retrieval_service::{RetrievalService, RetrievedChunk};
use crate::domain::entities::{AgentProfile, Message};
use crate::domain::value_objects::{Intent, Language, SenderType, similarity::grounding_confidence};

const NO_TRAINING_DATA_INSTRUCTION: &str = "No business documents have been provided to you yet. \
Tell the customer politely that you do not have this information yet and that a team member \
can help them. Do not invent prices, policies or order details.";

const GROUNDED_INSTRUCTION: &str = "Answer only from the business information below. If the \
answer is not in it, say that you are not sure instead of guessing.";

#[derive(Debug, Clone)]
pub struct GenerationSettings {
    pub top_k: usize,
    pub timeout: Duration,
    pub enrichment_timeout: Duration,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            top_k: 3,
            timeout: Duration::from_secs(30),
            enrichment_timeout: Duration::from_secs(5),
        }
    }
}

/// Everything the generator needs to know about the turn being answered.
#[derive(Debug, Clone, Copy)]
pub struct GenerationContext<'a> {
    pub organization_id: Uuid,
    pub language: Language,
    pub agent: &'a AgentProfile,
    pub history: &'a [Message],
    pub intent: Option<Intent>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReply {
    pub text: String,
    pub confidence: f32,
    /// Chunks the reply was grounded on.
    pub sources: Vec<Uuid>,
    /// True when the reply is the fixed apology.
    pub fallback: bool,
}

impl GeneratedReply {
    fn apology(language: Language) -> Self {
        Self {
            text: language.apology_notice().to_string(),
            confidence: 0.0,
            sources: Vec::new(),
            fallback: true,
        }
    }
}

/// Grounded reply generation. Never fails: every error becomes the
/// apology with confidence `0.0`.
pub struct ResponseGenerator {
    retrieval: Arc<RetrievalService>,
    language_model: Arc<dyn LanguageModel>,
    business_data: Option<Arc<dyn BusinessDataSource>>,
    settings: GenerationSettings,
}

impl ResponseGenerator {
    pub fn new(
        retrieval: Arc<RetrievalService>,
        language_model: Arc<dyn LanguageModel>,
        business_data: Option<Arc<dyn BusinessDataSource>>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            retrieval,
            language_model,
            business_data,
            settings,
        }
    }

    /// Retrieval, enrichment and the model call share one deadline; when it
    /// passes the turn gets the apology.
    pub async fn generate(&self, context: GenerationContext<'_>, user_text: &str) -> GeneratedReply {
        match tokio::time::timeout(self.settings.timeout, self.grounded_reply(&context, user_text)).await {
            Ok(reply) => reply,
            Err(_) => {
                warn!(
                    organization_id = %context.organization_id,
                    timeout_ms = self.settings.timeout.as_millis() as u64,
                    "Generation timed out"
                );
                GeneratedReply::apology(context.language)
            }
        }
    }

    async fn grounded_reply(&self, context: &GenerationContext<'_>, user_text: &str) -> GeneratedReply {
        let chunks = match self
            .retrieval
            .search(user_text, context.organization_id, self.settings.top_k)
            .await
        {
            Ok(chunks) => chunks,
            Err(e) => {
                warn!(organization_id = %context.organization_id, error = %e, "Retrieval failed");
                return GeneratedReply::apology(context.language);
            }
        };

        let enrichment = self.enrich(context, user_text).await;
        let request = CompletionRequest {
            system_prompt: build_system_prompt(
                context.agent,
                context.language,
                &chunks,
                enrichment.as_deref(),
            ),
            history: history_messages(context.history),
            user_text: user_text.to_string(),
            max_tokens: context.agent.max_tokens.max(1) as u32,
            temperature: context.agent.temperature,
        };

        let completion = match self.language_model.complete(request).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(organization_id = %context.organization_id, error = %e, "Language model call failed");
                return GeneratedReply::apology(context.language);
            }
        };

        let text = completion.text.trim().to_string();
        if text.is_empty() {
            warn!(organization_id = %context.organization_id, "Language model returned empty text");
            return GeneratedReply::apology(context.language);
        }

        let similarities: Vec<f32> = chunks.iter().map(|c| c.similarity).collect();
        let confidence = grounding_confidence(&similarities, self.settings.top_k);
        debug!(
            organization_id = %context.organization_id,
            chunks = chunks.len(),
            confidence,
            "Generated reply"
        );

        GeneratedReply {
            text,
            confidence,
            sources: chunks.iter().map(|c| c.chunk_id).collect(),
            fallback: false,
        }
    }

    /// Enrich or skip: any failure or timeout just drops the extra context.
    async fn enrich(&self, context: &GenerationContext<'_>, user_text: &str) -> Option<String> {
        let source = self.business_data.as_ref()?;
        let intent = context.intent?;

        let lookup = source.lookup(context.organization_id, intent, user_text);
        match tokio::time::timeout(self.settings.enrichment_timeout, lookup).await {
            Ok(Ok(data)) => data.filter(|d| !d.trim().is_empty()),
            Ok(Err(e)) => {
                warn!(intent = intent.as_str(), error = %e, "Business data lookup failed");
                None
            }
            Err(_) => {
                warn!(intent = intent.as_str(), "Business data lookup timed out");
                None
            }
        }
    }
}

fn build_system_prompt(
    agent: &AgentProfile,
    language: Language,
    chunks: &[RetrievedChunk],
    enrichment: Option<&str>,
) -> String {
    let mut prompt = if agent.persona.trim().is_empty() {
        format!("You are {}, a friendly customer support assistant.", agent.name)
    } else {
        agent.persona.trim().to_string()
    };

    prompt.push_str("\n\n");
    prompt.push_str(language.policy_instruction());
    prompt.push_str("\n\n");

    if chunks.is_empty() {
        prompt.push_str(NO_TRAINING_DATA_INSTRUCTION);
    } else {
        prompt.push_str(GROUNDED_INSTRUCTION);
        prompt.push_str("\n\nBusiness information:\n");
        let context: Vec<&str> = chunks.iter().map(|c| c.chunk_text.as_str()).collect();
        prompt.push_str(&context.join("\n---\n"));
    }

    if let Some(data) = enrichment {
        prompt.push_str("\n\nLive business data:\n");
        prompt.push_str(data.trim());
    }

    prompt
}

fn history_messages(history: &[Message]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|message| {
            let role = match message.sender_type() {
                SenderType::User => ChatRole::User,
                SenderType::Agent | SenderType::Human => ChatRole::Assistant,
            };
            ChatMessage::new(role, message.content())
        })
        .collect()
}
