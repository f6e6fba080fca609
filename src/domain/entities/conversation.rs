use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::value_objects::{Channel, ConversationStatus, EscalationPolicy};

/// Result of scoring one automated turn against the escalation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnVerdict {
    Confident,
    LowConfidence { unsuccessful_responses: i32 },
    /// This turn pushed the conversation over the limit.
    Escalated,
}

impl TurnVerdict {
    pub fn is_escalated(&self) -> bool {
        matches!(self, TurnVerdict::Escalated)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    id: Uuid,
    organization_id: Uuid,
    agent_id: Uuid,
    channel: Channel,
    external_thread_id: String,
    customer_name: Option<String>,
    status: ConversationStatus,
    unsuccessful_responses: i32,
    escalated_to_human: bool,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(
        organization_id: Uuid,
        agent_id: Uuid,
        channel: Channel,
        external_thread_id: String,
        customer_name: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            organization_id,
            agent_id,
            channel,
            external_thread_id,
            customer_name,
            status: ConversationStatus::Active,
            unsuccessful_responses: 0,
            escalated_to_human: false,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuilds a persisted conversation, refusing rows that break the
    /// escalation invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn restore(
        id: Uuid,
        organization_id: Uuid,
        agent_id: Uuid,
        channel: Channel,
        external_thread_id: String,
        customer_name: Option<String>,
        status: ConversationStatus,
        unsuccessful_responses: i32,
        escalated_to_human: bool,
        version: i32,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Result<Self, String> {
        if escalated_to_human && status != ConversationStatus::Escalated {
            return Err(format!(
                "Conversation {} is escalated to a human but has status {}",
                id, status
            ));
        }
        if unsuccessful_responses < 0 {
            return Err(format!(
                "Conversation {} has a negative unsuccessful response count",
                id
            ));
        }

        Ok(Self {
            id,
            organization_id,
            agent_id,
            channel,
            external_thread_id,
            customer_name,
            status,
            unsuccessful_responses,
            escalated_to_human,
            version,
            created_at,
            updated_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn organization_id(&self) -> Uuid {
        self.organization_id
    }

    pub fn agent_id(&self) -> Uuid {
        self.agent_id
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn external_thread_id(&self) -> &str {
        &self.external_thread_id
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name.as_deref()
    }

    pub fn status(&self) -> ConversationStatus {
        self.status
    }

    pub fn unsuccessful_responses(&self) -> i32 {
        self.unsuccessful_responses
    }

    pub fn is_escalated_to_human(&self) -> bool {
        self.escalated_to_human
    }

    pub fn version(&self) -> i32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.status == ConversationStatus::Active
    }

    /// Applies the escalation rule for one automated reply.
    pub fn record_agent_turn(&mut self, confidence: f32, policy: &EscalationPolicy) -> TurnVerdict {
        self.updated_at = Utc::now();

        if policy.is_successful(confidence) {
            if self.unsuccessful_responses > 0 {
                self.unsuccessful_responses = 0;
            }
            return TurnVerdict::Confident;
        }

        self.unsuccessful_responses = self.unsuccessful_responses.saturating_add(1);

        if self.unsuccessful_responses >= policy.max_unsuccessful && !self.escalated_to_human {
            self.mark_escalated();
            return TurnVerdict::Escalated;
        }

        TurnVerdict::LowConfidence {
            unsuccessful_responses: self.unsuccessful_responses,
        }
    }

    /// Hands the conversation to a human outside the confidence rule,
    /// e.g. when a caller stops responding on the phone.
    pub fn escalate(&mut self) -> Result<(), String> {
        if self.escalated_to_human {
            return Ok(());
        }
        if !self.status.can_transition_to(ConversationStatus::Escalated) {
            return Err(format!(
                "Conversation {} cannot be escalated from {}",
                self.id, self.status
            ));
        }
        self.mark_escalated();
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), String> {
        if !self.status.can_transition_to(ConversationStatus::Completed) {
            return Err(format!(
                "Conversation {} cannot be completed from {}",
                self.id, self.status
            ));
        }
        self.status = ConversationStatus::Completed;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Called by the repository after a successful optimistic write.
    pub fn bump_version(&mut self) {
        self.version += 1;
    }

    fn mark_escalated(&mut self) {
        self.escalated_to_human = true;
        self.status = ConversationStatus::Escalated;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn conversation() -> Conversation {
        Conversation::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Channel::WhatsApp,
            "8801700000000".to_string(),
            None,
        )
    }

    #[test]
    fn test_two_low_confidence_turns_escalate() {
        let policy = EscalationPolicy::default();
        let mut conversation = conversation();

        assert_eq!(
            conversation.record_agent_turn(0.2, &policy),
            TurnVerdict::LowConfidence {
                unsuccessful_responses: 1
            }
        );
        assert_eq!(conversation.record_agent_turn(0.0, &policy), TurnVerdict::Escalated);
        assert!(conversation.is_escalated_to_human());
        assert_eq!(conversation.status(), ConversationStatus::Escalated);
    }

    #[test]
    fn test_confident_turn_resets_counter() {
        let policy = EscalationPolicy::new(0.5, 5).unwrap();
        let mut conversation = conversation();

        for _ in 0..3 {
            conversation.record_agent_turn(0.1, &policy);
        }
        assert_eq!(conversation.unsuccessful_responses(), 3);

        assert_eq!(conversation.record_agent_turn(0.5, &policy), TurnVerdict::Confident);
        assert_eq!(conversation.unsuccessful_responses(), 0);
    }

    #[test]
    fn test_nan_counts_as_failure() {
        let policy = EscalationPolicy::default();
        let mut conversation = conversation();

        conversation.record_agent_turn(f32::NAN, &policy);
        assert_eq!(conversation.unsuccessful_responses(), 1);
    }

    #[test]
    fn test_escalation_happens_once() {
        let policy = EscalationPolicy::default();
        let mut conversation = conversation();

        conversation.record_agent_turn(0.1, &policy);
        assert!(conversation.record_agent_turn(0.1, &policy).is_escalated());
        assert!(!conversation.record_agent_turn(0.1, &policy).is_escalated());
        assert_eq!(conversation.unsuccessful_responses(), 3);
    }

    #[test]
    fn test_complete_only_from_active() {
        let mut conversation = conversation();
        conversation.escalate().unwrap();
        assert!(conversation.complete().is_err());

        let mut conversation = self::conversation();
        conversation.complete().unwrap();
        assert!(conversation.escalate().is_err());
    }

    #[test]
    fn test_restore_rejects_inconsistent_row() {
        let now = Utc::now();
        let restored = Conversation::restore(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            Channel::Web,
            "session".to_string(),
            None,
            ConversationStatus::Active,
            0,
            true,
            0,
            now,
            now,
        );
        assert!(restored.is_err());
    }

    proptest! {
        #[test]
        fn escalation_invariants_hold(
            confidences in prop::collection::vec(prop_oneof![0.0f32..1.0, Just(f32::NAN)], 0..40),
            threshold in 0.0f32..=1.0,
            max_unsuccessful in 1i32..5,
        ) {
            let policy = EscalationPolicy::new(threshold, max_unsuccessful).unwrap();
            let mut conversation = conversation();
            let mut low_streak = 0;

            for confidence in confidences {
                let before = conversation.unsuccessful_responses();
                let was_escalated = conversation.is_escalated_to_human();
                conversation.record_agent_turn(confidence, &policy);
                let after = conversation.unsuccessful_responses();

                prop_assert!(after >= 0);
                prop_assert!(after == 0 || after >= before);
                prop_assert!(!conversation.is_escalated_to_human()
                    || conversation.status() == ConversationStatus::Escalated);
                prop_assert!(!was_escalated || conversation.is_escalated_to_human());

                if policy.is_successful(confidence) {
                    low_streak = 0;
                    prop_assert_eq!(after, 0);
                } else {
                    low_streak += 1;
                }
                if low_streak >= max_unsuccessful {
                    prop_assert!(conversation.is_escalated_to_human());
                }
            }
        }
    }
}
