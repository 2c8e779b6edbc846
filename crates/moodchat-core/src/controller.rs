//! The chat controller
//!
//! Owns every piece of mutable widget state: the transcript, the active turn
//! (whose presence is the "response in progress" flag), the last submitted
//! message, the theme, header visibility and the container scroll. A surface
//! feeds it user actions and [`ChatEvent`]s from a single event loop.

use crate::render::{self, MessageNode, Scroll};
use crate::reply::{Reply, ReplyError};
use crate::reveal::{Reveal, RevealPhase};
use crate::state::{Message, MessageState, Role, Transcript};
use crate::store::{KeyValueStore, Persistence};
use crate::theme::Theme;
use crate::turn::{ChatEvent, RevealStart, TurnId, TurnRequest};

pub const CLEAR_PROMPT: &str = "Delete all chats?";

#[derive(Debug)]
struct ActiveTurn {
    turn: TurnId,
    /// Index of the loading bubble once it has been shown
    placeholder: Option<usize>,
    reveal: Option<Reveal>,
    emotion: Option<String>,
}

pub struct Controller<S> {
    persistence: Persistence<S>,
    transcript: Transcript,
    theme: Theme,
    header_hidden: bool,
    scroll: Scroll,
    last_message: Option<String>,
    active: Option<ActiveTurn>,
    next_turn: TurnId,

    /// Text typed into the input box
    pub input: String,
}

impl<S: KeyValueStore> Controller<S> {
    pub fn new(store: S) -> Self {
        let mut controller = Self {
            persistence: Persistence::new(store),
            transcript: Transcript::new(),
            theme: Theme::default(),
            header_hidden: false,
            scroll: Scroll::Bottom,
            last_message: None,
            active: None,
            next_turn: 1,
            input: String::new(),
        };
        controller.load();
        controller
    }

    /// Restore the saved transcript and theme
    pub fn load(&mut self) {
        let snapshot = self.persistence.load();
        self.theme = snapshot.theme;
        self.transcript = snapshot.transcript;
        self.header_hidden = !self.transcript.is_empty();
        self.scroll_to_bottom();
        tracing::info!(
            messages = self.transcript.len(),
            theme = self.theme.as_str(),
            "Loaded chat state"
        );
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn nodes(&self) -> Vec<MessageNode> {
        render::project_all(&self.transcript)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn toggle_label(&self) -> &'static str {
        self.theme.toggle_label()
    }

    pub fn header_hidden(&self) -> bool {
        self.header_hidden
    }

    pub fn scroll(&self) -> Scroll {
        self.scroll
    }

    pub fn set_scroll(&mut self, scroll: Scroll) {
        self.scroll = scroll;
    }

    pub fn is_generating(&self) -> bool {
        self.active.is_some()
    }

    pub fn store(&self) -> &S {
        self.persistence.store()
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = Scroll::Bottom;
    }

    pub fn render_outgoing(&mut self, text: &str) -> usize {
        let index = self.transcript.push(Message::outgoing(text));
        self.scroll_to_bottom();
        index
    }

    pub fn render_incoming_placeholder(&mut self) -> usize {
        let index = self.transcript.push(Message::incoming_placeholder());
        self.scroll_to_bottom();
        index
    }

    pub fn submit_input(&mut self) -> Option<TurnRequest> {
        let input = self.input.clone();
        self.submit_turn(&input)
    }

    pub fn click_suggestion(&mut self, label: &str) -> Option<TurnRequest> {
        self.submit_turn(label)
    }

    /// Start a turn, or do nothing if one is already running.
    ///
    /// Blank text re-sends the last message. The returned request must be
    /// handed to a [`crate::turn::TurnRunner`].
    pub fn submit_turn(&mut self, text: &str) -> Option<TurnRequest> {
        let trimmed = text.trim();
        let message = if trimmed.is_empty() {
            self.last_message.clone()?
        } else {
            trimmed.to_string()
        };

        if let Some(active) = &self.active {
            tracing::debug!(turn = active.turn, "Ignoring submission while a response is generating");
            return None;
        }

        let turn = self.next_turn;
        self.next_turn += 1;
        self.active = Some(ActiveTurn {
            turn,
            placeholder: None,
            reveal: None,
            emotion: None,
        });
        self.last_message = Some(message.clone());

        self.render_outgoing(&message);
        self.input.clear();
        self.header_hidden = true;
        tracing::info!(turn, "Turn started");

        Some(TurnRequest { turn, message })
    }

    /// Apply a scheduler event. Returns a reveal for the scheduler to tick.
    pub fn handle_event(&mut self, event: ChatEvent) -> Option<RevealStart> {
        match event {
            ChatEvent::ShowLoading { turn } => {
                self.show_loading(turn);
                None
            }
            ChatEvent::Reply { turn, result } => self.apply_reply(turn, result),
            ChatEvent::RevealTick { turn } => {
                self.reveal_tick(turn);
                None
            }
        }
    }

    fn is_active(&self, turn: TurnId) -> bool {
        self.active.as_ref().is_some_and(|a| a.turn == turn)
    }

    fn show_loading(&mut self, turn: TurnId) {
        let already_shown = self.active.as_ref().is_some_and(|a| a.placeholder.is_some());
        if !self.is_active(turn) || already_shown {
            tracing::debug!(turn, "Dropping stale loading event");
            return;
        }

        let index = self.render_incoming_placeholder();
        if let Some(active) = self.active.as_mut() {
            active.placeholder = Some(index);
        }
    }

    fn apply_reply(&mut self, turn: TurnId, result: Result<Reply, ReplyError>) -> Option<RevealStart> {
        let Some(active) = self.active.as_mut().filter(|a| a.turn == turn) else {
            tracing::debug!(turn, "Dropping reply for an inactive turn");
            return None;
        };
        let index = active.placeholder?;

        match result {
            Ok(reply) => {
                let reveal = Reveal::new(&reply.reply);
                let ticks = reveal.ticks();
                active.reveal = Some(reveal);
                active.emotion = reply.emotion;

                if let Some(message) = self.transcript.get_mut(index) {
                    message.state = MessageState::Revealing;
                    message.text.clear();
                }
                Some(RevealStart { turn, ticks })
            }
            Err(e) => {
                if let Some(message) = self.transcript.get_mut(index) {
                    message.text = format!("Error: {}", e);
                    message.state = MessageState::Error;
                }
                self.active = None;
                self.persist();
                None
            }
        }
    }

    fn reveal_tick(&mut self, turn: TurnId) {
        let Some(active) = self.active.as_mut().filter(|a| a.turn == turn) else {
            return;
        };
        let (Some(index), Some(reveal)) = (active.placeholder, active.reveal.as_mut()) else {
            return;
        };

        let phase = reveal.tick();
        let text = reveal.text().to_string();
        let done = phase == RevealPhase::Done;
        let emotion = if done { active.emotion.take() } else { None };

        if let Some(message) = self.transcript.get_mut(index) {
            message.text = text;
            if done {
                message.state = MessageState::Rendered;
                message.emotion = emotion;
            }
        }
        self.scroll_to_bottom();

        if done {
            self.active = None;
            tracing::info!(turn, "Reply revealed");
            self.persist();
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.persistence.save(&self.transcript) {
            tracing::warn!("Failed to save transcript: {}", e);
        }
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        if let Err(e) = self.persistence.save_theme(self.theme) {
            tracing::warn!("Failed to save theme: {}", e);
        }
        self.theme
    }

    /// Ask `confirm` before wiping the conversation; returns whether it was wiped.
    ///
    /// A turn still in flight is abandoned and its late events are dropped.
    pub fn clear_all<F>(&mut self, confirm: F) -> bool
    where
        F: FnOnce(&str) -> bool,
    {
        if !confirm(CLEAR_PROMPT) {
            return false;
        }

        if let Err(e) = self.persistence.clear() {
            tracing::warn!("Failed to clear saved transcript: {}", e);
        }
        if let Some(active) = self.active.take() {
            tracing::info!(turn = active.turn, "Abandoned in-flight turn");
        }
        self.load();
        true
    }

    /// Text behind a bot message's copy icon, if the icon is showing
    pub fn copy_text(&self, index: usize) -> Option<&str> {
        let message = self.transcript.get(index)?;
        let copyable = message.role == Role::Bot
            && message.state != MessageState::Revealing
            && !message.text.is_empty();
        copyable.then_some(message.text.as_str())
    }
}
