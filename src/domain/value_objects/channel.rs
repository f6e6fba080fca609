use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Origin channel of a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Web,
    WhatsApp,
    Facebook,
    Instagram,
    Ivr,
}

impl Channel {
    pub const CHAT_CHANNELS: [Channel; 4] = [
        Channel::Web,
        Channel::WhatsApp,
        Channel::Facebook,
        Channel::Instagram,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Web => "web",
            Channel::WhatsApp => "whatsapp",
            Channel::Facebook => "facebook",
            Channel::Instagram => "instagram",
            Channel::Ivr => "ivr",
        }
    }

    pub fn is_voice(&self) -> bool {
        matches!(self, Channel::Ivr)
    }

    /// Channels whose inbound events arrive through the Meta webhook format.
    pub fn uses_meta_webhooks(&self) -> bool {
        matches!(
            self,
            Channel::WhatsApp | Channel::Facebook | Channel::Instagram
        )
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "web" => Ok(Channel::Web),
            "whatsapp" => Ok(Channel::WhatsApp),
            "facebook" | "messenger" => Ok(Channel::Facebook),
            "instagram" => Ok(Channel::Instagram),
            "ivr" | "voice" => Ok(Channel::Ivr),
            other => Err(format!("Unknown channel: {}", other)),
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
