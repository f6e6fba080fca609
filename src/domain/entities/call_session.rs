use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::value_objects::IvrMenu;

/// Where a call currently sits in the voice menu tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "menu")]
pub enum CallState {
    Menu(IvrMenu),
    Escalated,
    Completed,
}

impl CallState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CallState::Menu(menu) => menu.as_str(),
            CallState::Escalated => "escalated",
            CallState::Completed => "completed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, CallState::Menu(_))
    }
}

impl FromStr for CallState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "escalated" => Ok(CallState::Escalated),
            "completed" => Ok(CallState::Completed),
            other => IvrMenu::from_str(other)
                .map(CallState::Menu)
                .map_err(|_| format!("Invalid call state: {}", other)),
        }
    }
}

/// What the dialog engine decided for one piece of caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// Nothing was said or pressed.
    NoInput { escalate: bool },
    /// Input matched nothing in the current menu.
    NoMatch { escalate: bool },
    Navigated(IvrMenu),
    /// Free speech to be answered by the assistant.
    Conversational,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallSession {
    id: Uuid,
    call_sid: String,
    organization_id: Uuid,
    from_number: String,
    to_number: String,
    state: CallState,
    input_attempts: i32,
    no_input_count: i32,
    conversation_id: Option<Uuid>,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    duration_seconds: Option<i64>,
}

pub const MAX_NO_INPUT: i32 = 2;

impl CallSession {
    pub fn new(
        call_sid: String,
        organization_id: Uuid,
        from_number: String,
        to_number: String,
        conversation_id: Option<Uuid>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            call_sid,
            organization_id,
            from_number,
            to_number,
            state: CallState::Menu(IvrMenu::Main),
            input_attempts: 0,
            no_input_count: 0,
            conversation_id,
            started_at: Utc::now(),
            ended_at: None,
            duration_seconds: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        call_sid: String,
        organization_id: Uuid,
        from_number: String,
        to_number: String,
        state: CallState,
        input_attempts: i32,
        no_input_count: i32,
        conversation_id: Option<Uuid>,
        started_at: DateTime<Utc>,
        ended_at: Option<DateTime<Utc>>,
        duration_seconds: Option<i64>,
    ) -> Self {
        Self {
            id,
            call_sid,
            organization_id,
            from_number,
            to_number,
            state,
            input_attempts,
            no_input_count,
            conversation_id,
            started_at,
            ended_at,
            duration_seconds,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn call_sid(&self) -> &str {
        &self.call_sid
    }

    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub fn from_number(&self) -> &str {
        &self.from_number
    }

    pub fn to_number(&self) -> &str {
        &self.to_number
    }

    pub fn state(&self) -> CallState {
        self.state
    }

    pub fn input_attempts(&self) -> i32 {
        self.input_attempts
    }

    pub fn no_input_count(&self) -> i32 {
        self.no_input_count
    }

    pub fn conversation_id(&self) -> Option<Uuid> {
        self.conversation_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn duration_seconds(&self) -> Option<i64> {
        self.duration_seconds
    }

    pub fn current_menu(&self) -> Option<IvrMenu> {
        match self.state {
            CallState::Menu(menu) => Some(menu),
            _ => None,
        }
    }

    pub fn link_conversation(&mut self, conversation_id: Uuid) {
        self.conversation_id = Some(conversation_id);
    }

    /// Runs the menu transition rules for one callback's input. Terminal
    /// calls ignore input and report `NoMatch` without escalation.
    pub fn apply_input(&mut self, digits: Option<&str>, transcript: Option<&str>) -> InputOutcome {
        let Some(menu) = self.current_menu() else {
            return InputOutcome::NoMatch { escalate: false };
        };

        self.input_attempts += 1;

        let digits = digits.map(str::trim).filter(|d| !d.is_empty());
        let transcript = transcript.map(str::trim).filter(|t| !t.is_empty());

        if digits.is_none() && transcript.is_none() {
            self.no_input_count += 1;
            let escalate = self.no_input_count >= MAX_NO_INPUT;
            if escalate {
                self.escalate();
            }
            return InputOutcome::NoInput { escalate };
        }
        self.no_input_count = 0;

        let definition = menu.definition();
        if let Some(target) = definition.match_input(digits, transcript) {
            self.navigate(target);
            return InputOutcome::Navigated(target);
        }

        if definition.conversational {
            return InputOutcome::Conversational;
        }

        let escalate = self.input_attempts >= definition.max_attempts;
        if escalate {
            self.escalate();
        }
        InputOutcome::NoMatch { escalate }
    }

    pub fn escalate(&mut self) {
        if self.state != CallState::Completed {
            self.state = CallState::Escalated;
        }
    }

    /// Closes the call, keeping `escalated` as the final state if it was reached.
    pub fn end(&mut self, ended_at: DateTime<Utc>) {
        if self.ended_at.is_some() {
            return;
        }
        if self.state != CallState::Escalated {
            self.state = CallState::Completed;
        }
        let duration = (ended_at - self.started_at).num_seconds().max(0);
        self.ended_at = Some(ended_at);
        self.duration_seconds = Some(duration);
    }

    fn navigate(&mut self, target: IvrMenu) {
        self.state = CallState::Menu(target);
        self.input_attempts = 0;
        self.no_input_count = 0;
    }
}
