pub mod config;
pub mod controller;
pub mod render;
pub mod reply;
pub mod reveal;
pub mod state;
pub mod store;
pub mod theme;
pub mod turn;

// Re-export main types for convenience
pub use config::Config;
pub use controller::{Controller, CLEAR_PROMPT};
pub use render::{MessageNode, Scroll};
pub use reply::{Reply, ReplyClient, ReplyError, ReplySource};
pub use reveal::{Reveal, RevealPhase};
pub use state::{Emotion, Message, MessageState, Role, Transcript};
pub use store::{FileStore, KeyValueStore, MemoryStore, Persistence};
pub use theme::Theme;
pub use turn::{ChatEvent, RevealStart, Timing, TurnId, TurnRequest, TurnRunner};
