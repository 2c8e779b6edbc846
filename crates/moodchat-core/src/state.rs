//! UI-agnostic conversation state types
//!
//! These records are the durable form of the conversation. Surfaces never
//! persist what they draw; they replay the transcript through
//! [`crate::render::project`] whenever they need nodes.

use serde::{Deserialize, Serialize};

/// The sender of a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

/// Lifecycle of a single message bubble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    /// Placeholder waiting for the reply endpoint
    Loading,
    /// Reply text is being revealed word by word
    Revealing,
    Rendered,
    Error,
}

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
    pub state: MessageState,
}

impl Message {
    pub fn outgoing(text: &str) -> Self {
        Self {
            role: Role::User,
            text: text.to_string(),
            emotion: None,
            state: MessageState::Rendered,
        }
    }

    pub fn incoming_placeholder() -> Self {
        Self {
            role: Role::Bot,
            text: String::new(),
            emotion: None,
            state: MessageState::Loading,
        }
    }

    /// Whether the bubble has reached a state that may be persisted
    pub fn is_settled(&self) -> bool {
        matches!(self.state, MessageState::Rendered | MessageState::Error)
    }
}

/// Ordered record of every message in the conversation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Message> {
        self.messages.get_mut(index)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Mood labels the reply endpoint may attach to a reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Happy,
    Sad,
    Neutral,
    Angry,
    Fear,
    Surprise,
    Disgust,
}

/// Glyph shown for labels outside the known set
pub const UNKNOWN_EMOTION_EMOJI: &str = "🤖";

impl Emotion {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "happy" => Some(Emotion::Happy),
            "sad" => Some(Emotion::Sad),
            "neutral" => Some(Emotion::Neutral),
            "angry" => Some(Emotion::Angry),
            "fear" => Some(Emotion::Fear),
            "surprise" => Some(Emotion::Surprise),
            "disgust" => Some(Emotion::Disgust),
            _ => None,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Emotion::Happy => "😊",
            Emotion::Sad => "😔",
            Emotion::Neutral => "😐",
            Emotion::Angry => "😠",
            Emotion::Fear => "😨",
            Emotion::Surprise => "😲",
            Emotion::Disgust => "🤢",
        }
    }
}

pub fn emoji_for_label(label: &str) -> &'static str {
    Emotion::from_label(label)
        .map(|e| e.emoji())
        .unwrap_or(UNKNOWN_EMOTION_EMOJI)
}

/// Text of the emotion badge appended to a completed bot reply
pub fn badge_text(label: &str) -> String {
    format!("🧠 AI Perception: Detected {} {}", label, emoji_for_label(label))
}
