use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    Active,
    Escalated,
    Completed,
}

impl ConversationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationStatus::Active => "active",
            ConversationStatus::Escalated => "escalated",
            ConversationStatus::Completed => "completed",
        }
    }

    pub fn can_transition_to(&self, next: ConversationStatus) -> bool {
        matches!(
            (self, next),
            (ConversationStatus::Active, ConversationStatus::Escalated)
                | (ConversationStatus::Active, ConversationStatus::Completed)
        )
    }
}

impl FromStr for ConversationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(ConversationStatus::Active),
            "escalated" => Ok(ConversationStatus::Escalated),
            "completed" => Ok(ConversationStatus::Completed),
            other => Err(format!("Invalid conversation status: {}", other)),
        }
    }
}

impl std::fmt::Display for ConversationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SenderType {
    User,
    Agent,
    Human,
}

impl SenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SenderType::User => "user",
            SenderType::Agent => "agent",
            SenderType::Human => "human",
        }
    }
}

impl FromStr for SenderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(SenderType::User),
            "agent" => Ok(SenderType::Agent),
            "human" => Ok(SenderType::Human),
            other => Err(format!("Invalid sender type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_active_conversations_move() {
        use ConversationStatus::*;

        assert!(Active.can_transition_to(Escalated));
        assert!(Active.can_transition_to(Completed));
        assert!(!Escalated.can_transition_to(Active));
        assert!(!Escalated.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Active));
    }

    #[test]
    fn test_parse() {
        assert_eq!("escalated".parse::<ConversationStatus>(), Ok(ConversationStatus::Escalated));
        assert_eq!("human".parse::<SenderType>(), Ok(SenderType::Human));
        assert!("bot".parse::<SenderType>().is_err());
    }
}
