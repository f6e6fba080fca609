use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::application::ports::{OrganizationDirectory, organization_directory::DirectoryError};
use crate::application::services::conversation_service::{
    ConversationService, ConversationServiceError, ThreadKey,
};
use crate::application::services::keyed_locks::KeyedLocks;
use crate::domain::entities::{CallSession, CallState, InputOutcome};
use crate::domain::repositories::{
    CallSessionRepository, call_session_repository::CallSessionRepositoryError,
};
use crate::domain::value_objects::{Channel, IvrMenu, Language};

pub const GATHER_ACTION: &str = "/ivr/gather";

#[derive(Debug, thiserror::Error)]
pub enum IvrError {
    #[error("Repository error: {0}")]
    Repository(#[from] CallSessionRepositoryError),
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Conversation(#[from] ConversationServiceError),
}

/// One instruction of a voice response document.
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceVerb {
    Say { text: String, language: Language },
    /// Collects speech or DTMF, speaking `prompt` while waiting.
    Gather {
        action: String,
        timeout_secs: u32,
        language: Language,
        prompt: String,
    },
    Redirect(String),
    Dial(String),
    Hangup,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoiceResponse {
    pub verbs: Vec<VoiceVerb>,
}

impl VoiceResponse {
    fn say(mut self, text: &str, language: Language) -> Self {
        self.verbs.push(VoiceVerb::Say {
            text: text.to_string(),
            language,
        });
        self
    }

    /// Gather followed by a redirect back to the gather handler, so
    /// silence reaches the engine as empty input.
    fn gather(mut self, prompt: &str, timeout_secs: u32, language: Language) -> Self {
        self.verbs.push(VoiceVerb::Gather {
            action: GATHER_ACTION.to_string(),
            timeout_secs,
            language,
            prompt: prompt.to_string(),
        });
        self.verbs.push(VoiceVerb::Redirect(GATHER_ACTION.to_string()));
        self
    }

    fn menu(self, menu: IvrMenu, language: Language) -> Self {
        let definition = menu.definition();
        self.gather(definition.prompt(language), definition.timeout_secs, language)
    }

    fn push(mut self, verb: VoiceVerb) -> Self {
        self.verbs.push(verb);
        self
    }
}

/// Caller input from one telephony callback.
#[derive(Debug, Clone, Default)]
pub struct CallInput {
    pub digits: Option<String>,
    pub speech: Option<String>,
}

/// Voice menu front end over the conversation loop.
pub struct IvrEngine {
    sessions: Arc<dyn CallSessionRepository>,
    directory: Arc<dyn OrganizationDirectory>,
    conversations: Arc<ConversationService>,
    support_number: Option<String>,
    locks: KeyedLocks<String>,
}

impl IvrEngine {
    pub fn new(
        sessions: Arc<dyn CallSessionRepository>,
        directory: Arc<dyn OrganizationDirectory>,
        conversations: Arc<ConversationService>,
        support_number: Option<String>,
    ) -> Self {
        Self {
            sessions,
            directory,
            conversations,
            support_number,
            locks: KeyedLocks::new(),
        }
    }

    /// New call: opens the session and its conversation, plays the main menu.
    pub async fn start_call(&self, call_sid: &str, from: &str, to: &str) -> Result<VoiceResponse, IvrError> {
        let _guard = self.locks.lock(call_sid.to_string()).await;

        if let Some(session) = self.sessions.find_by_call_sid(call_sid).await? {
            let language = self.language_of(&session).await?;
            return Ok(self.replay(&session, language));
        }

        let Some(integration) = self.directory.find_integration(Channel::Ivr, to).await? else {
            warn!(call_sid, to, "Call to a number without an IVR integration");
            return Ok(VoiceResponse::default()
                .say(Language::default().apology_notice(), Language::default())
                .push(VoiceVerb::Hangup));
        };

        let conversation = self
            .conversations
            .resolve_conversation(ThreadKey {
                organization_id: integration.organization_id,
                agent_id: integration.agent_id,
                channel: Channel::Ivr,
                external_thread_id: call_sid.to_string(),
                customer_name: None,
            })
            .await?;

        let session = CallSession::new(
            call_sid.to_string(),
            integration.organization_id,
            from.to_string(),
            to.to_string(),
            Some(conversation.id()),
        );
        self.sessions.save(&session).await?;
        info!(call_sid, conversation_id = %conversation.id(), "Call started");

        let language = self.language_of(&session).await?;
        Ok(VoiceResponse::default().menu(IvrMenu::Main, language))
    }

    /// Applies one round of caller input.
    pub async fn handle_input(&self, call_sid: &str, input: CallInput) -> Result<VoiceResponse, IvrError> {
        let _guard = self.locks.lock(call_sid.to_string()).await;

        let Some(mut session) = self.sessions.find_by_call_sid(call_sid).await? else {
            warn!(call_sid, "Input for unknown call");
            return Ok(VoiceResponse::default().push(VoiceVerb::Hangup));
        };
        let language = self.language_of(&session).await?;

        if session.state().is_terminal() {
            return Ok(self.replay(&session, language));
        }

        let outcome = session.apply_input(input.digits.as_deref(), input.speech.as_deref());
        let response = match outcome {
            InputOutcome::NoInput { escalate: true } | InputOutcome::NoMatch { escalate: true } => {
                info!(call_sid, ?outcome, "Escalating call");
                self.escalate_conversation(&session).await;
                self.transfer(language)
            }
            InputOutcome::NoInput { escalate: false } => {
                let menu = session.current_menu().unwrap_or(IvrMenu::Main);
                VoiceResponse::default()
                    .say(language.no_input_notice(), language)
                    .menu(menu, language)
            }
            InputOutcome::NoMatch { escalate: false } => {
                let menu = session.current_menu().unwrap_or(IvrMenu::Main);
                VoiceResponse::default()
                    .say(language.no_match_notice(), language)
                    .menu(menu, language)
            }
            InputOutcome::Navigated(menu) => VoiceResponse::default().menu(menu, language),
            InputOutcome::Conversational => self.converse(&mut session, &input, language).await?,
        };

        self.sessions.update(&session).await?;
        Ok(response)
    }

    /// Call status callback. Terminal statuses close the session.
    pub async fn end_call(&self, call_sid: &str, call_status: &str) -> Result<Option<CallSession>, IvrError> {
        if !matches!(call_status, "completed" | "busy" | "failed" | "no-answer" | "canceled") {
            return Ok(None);
        }

        let _guard = self.locks.lock(call_sid.to_string()).await;
        let Some(mut session) = self.sessions.find_by_call_sid(call_sid).await? else {
            return Ok(None);
        };
        if session.ended_at().is_some() {
            return Ok(Some(session));
        }

        session.end(Utc::now());
        self.sessions.update(&session).await?;

        if session.state() == CallState::Completed {
            if let Some(conversation_id) = session.conversation_id() {
                if let Err(e) = self.conversations.complete(conversation_id).await {
                    warn!(call_sid, error = %e, "Could not complete call conversation");
                }
            }
        }

        info!(
            call_sid,
            state = session.state().as_str(),
            duration_seconds = session.duration_seconds().unwrap_or(0),
            "Call ended"
        );
        Ok(Some(session))
    }

    async fn converse(
        &self,
        session: &mut CallSession,
        input: &CallInput,
        language: Language,
    ) -> Result<VoiceResponse, IvrError> {
        let text = input
            .speech
            .as_deref()
            .or(input.digits.as_deref())
            .map(str::trim)
            .unwrap_or_default();

        let Some(conversation_id) = session.conversation_id() else {
            session.escalate();
            return Ok(self.transfer(language));
        };

        let outcome = self.conversations.handle_turn(conversation_id, text).await?;
        if outcome.is_escalated() {
            session.escalate();
            info!(call_sid = session.call_sid(), "Conversation escalated, transferring call");
            return Ok(self.transfer(language));
        }

        let menu = session.current_menu().unwrap_or(IvrMenu::Main);
        let mut response = VoiceResponse::default();
        if let Some(reply) = outcome.reply() {
            response = response.say(reply, language);
        }
        Ok(response.gather(language.follow_up_prompt(), menu.definition().timeout_secs, language))
    }

    fn transfer(&self, language: Language) -> VoiceResponse {
        let response = VoiceResponse::default().say(language.transfer_notice(), language);
        match &self.support_number {
            Some(number) => response.push(VoiceVerb::Dial(number.clone())),
            None => response
                .say(language.goodbye_notice(), language)
                .push(VoiceVerb::Hangup),
        }
    }

    fn replay(&self, session: &CallSession, language: Language) -> VoiceResponse {
        match session.state() {
            CallState::Menu(menu) => VoiceResponse::default().menu(menu, language),
            CallState::Escalated => self.transfer(language),
            CallState::Completed => VoiceResponse::default()
                .say(language.goodbye_notice(), language)
                .push(VoiceVerb::Hangup),
        }
    }

    async fn escalate_conversation(&self, session: &CallSession) {
        let Some(conversation_id) = session.conversation_id() else {
            return;
        };
        if let Err(e) = self.conversations.escalate(conversation_id).await {
            warn!(call_sid = session.call_sid(), error = %e, "Could not escalate call conversation");
        }
    }

    async fn language_of(&self, session: &CallSession) -> Result<Language, IvrError> {
        Ok(self
            .directory
            .get_organization(session.organization_id())
            .await?
            .language)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::ConversationStatus;
    use crate::testing::{Harness, ScriptedLanguageModel};

    fn engine(harness: &Harness, support_number: Option<&str>) -> IvrEngine {
        IvrEngine::new(
            harness.call_sessions.clone(),
            harness.directory.clone(),
            harness.conversation_service.clone(),
            support_number.map(str::to_string),
        )
    }

    fn ivr_number(harness: &Harness) -> String {
        harness.integration(Channel::Ivr).account_id
    }

    fn silence() -> CallInput {
        CallInput::default()
    }

    fn digits(d: &str) -> CallInput {
        CallInput {
            digits: Some(d.to_string()),
            speech: None,
        }
    }

    fn speech(s: &str) -> CallInput {
        CallInput {
            digits: None,
            speech: Some(s.to_string()),
        }
    }

    #[tokio::test]
    async fn test_start_plays_main_menu() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let engine = engine(&harness, None);

        let response = engine.start_call("CA1", "+880171", &ivr_number(&harness)).await.unwrap();

        let language = harness.language();
        assert_eq!(
            response.verbs[0],
            VoiceVerb::Gather {
                action: GATHER_ACTION.to_string(),
                timeout_secs: 5,
                language,
                prompt: IvrMenu::Main.definition().prompt(language).to_string(),
            }
        );
        assert_eq!(response.verbs[1], VoiceVerb::Redirect(GATHER_ACTION.to_string()));
    }

    #[tokio::test]
    async fn test_two_silent_inputs_escalate_call() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let engine = engine(&harness, Some("+8809611000000"));
        engine.start_call("CA2", "+880171", &ivr_number(&harness)).await.unwrap();

        let first = engine.handle_input("CA2", silence()).await.unwrap();
        assert!(matches!(&first.verbs[0], VoiceVerb::Say { text, .. } if text == harness.language().no_input_notice()));

        let second = engine.handle_input("CA2", silence()).await.unwrap();
        assert_eq!(second.verbs.last(), Some(&VoiceVerb::Dial("+8809611000000".to_string())));

        let session = harness.call_sessions.get("CA2").unwrap();
        assert_eq!(session.state(), CallState::Escalated);
        let conversation = harness.conversations.get(session.conversation_id().unwrap()).unwrap();
        assert_eq!(conversation.status(), ConversationStatus::Escalated);
    }

    #[tokio::test]
    async fn test_menu_navigation_then_conversation() {
        let harness = Harness::new(ScriptedLanguageModel::replying("Your order ships today."));
        harness.seed_chunk("Orders ship within a day.", vec![1.0, 0.0]);
        harness.seed_chunk("Orders can be tracked online.", vec![1.0, 0.0]);
        harness.seed_chunk("Orders over 1000 taka ship free.", vec![1.0, 0.0]);
        let engine = engine(&harness, None);
        engine.start_call("CA3", "+880171", &ivr_number(&harness)).await.unwrap();

        let navigated = engine.handle_input("CA3", digits("1")).await.unwrap();
        let language = harness.language();
        assert!(matches!(
            &navigated.verbs[0],
            VoiceVerb::Gather { prompt, .. } if prompt == IvrMenu::Order.definition().prompt(language)
        ));

        let answered = engine.handle_input("CA3", speech("when will it arrive")).await.unwrap();
        assert_eq!(
            answered.verbs[0],
            VoiceVerb::Say {
                text: "Your order ships today.".to_string(),
                language
            }
        );
        assert!(matches!(
            &answered.verbs[1],
            VoiceVerb::Gather { prompt, .. } if prompt == language.follow_up_prompt()
        ));
    }

    #[tokio::test]
    async fn test_low_confidence_answers_escalate_call() {
        let harness = Harness::new(ScriptedLanguageModel::replying("Not sure."));
        let engine = engine(&harness, None);
        engine.start_call("CA4", "+880171", &ivr_number(&harness)).await.unwrap();
        engine.handle_input("CA4", digits("3")).await.unwrap();

        engine.handle_input("CA4", speech("my parcel is broken")).await.unwrap();
        let transferred = engine.handle_input("CA4", speech("it is damaged")).await.unwrap();

        assert_eq!(transferred.verbs.last(), Some(&VoiceVerb::Hangup));
        assert_eq!(harness.call_sessions.get("CA4").unwrap().state(), CallState::Escalated);
    }

    #[tokio::test]
    async fn test_end_call_completes_conversation() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let engine = engine(&harness, None);
        engine.start_call("CA5", "+880171", &ivr_number(&harness)).await.unwrap();

        assert!(engine.end_call("CA5", "in-progress").await.unwrap().is_none());
        let ended = engine.end_call("CA5", "completed").await.unwrap().unwrap();

        assert_eq!(ended.state(), CallState::Completed);
        assert!(ended.duration_seconds().unwrap() >= 0);
        let conversation = harness.conversations.get(ended.conversation_id().unwrap()).unwrap();
        assert_eq!(conversation.status(), ConversationStatus::Completed);
    }

    #[tokio::test]
    async fn test_unknown_number_hangs_up() {
        let harness = Harness::new(ScriptedLanguageModel::replying("unused"));
        let engine = engine(&harness, None);

        let response = engine.start_call("CA6", "+880171", "+10000000000").await.unwrap();
        assert_eq!(response.verbs.last(), Some(&VoiceVerb::Hangup));
    }
}
