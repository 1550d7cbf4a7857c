use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Character,
    System,
}

/// One rendered transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub speaker: Speaker,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    pub fn character(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Character,
            text: text.into(),
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::System,
            text: text.into(),
        }
    }

    /// Role used when replaying the transcript to a chat-completion backend.
    /// System notices are local only.
    pub fn chat_role(&self) -> Option<&'static str> {
        match self.speaker {
            Speaker::User => Some("user"),
            Speaker::Character => Some("assistant"),
            Speaker::System => None,
        }
    }
}
