use moodchat_core::{
    ChatEvent, Config, Controller, KeyValueStore, Role, Scroll, TurnRunner,
};

use crate::clipboard::copy_to_clipboard;
use crate::tui::AppEvent;

pub type Store = Box<dyn KeyValueStore + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub input_cursor: usize, // cursor position in controller.input, in chars

    pub controller: Controller<Store>,
    pub runner: TurnRunner<AppEvent>,
    pub suggestions: Vec<String>,

    /// Bot message the copy key acts on
    pub selected: Option<usize>,
    pub show_confirm: bool,
    pub status: Option<String>,

    // Animation state
    pub animation_frame: u8,

    // Chat area geometry, updated during render for scroll calculations
    pub chat_height: u16,
    pub total_chat_lines: u16,
}

impl App {
    pub fn new(config: &Config, store: Store, runner: TurnRunner<AppEvent>) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            input_cursor: 0,
            controller: Controller::new(store),
            runner,
            suggestions: config.suggestions.clone(),
            selected: None,
            show_confirm: false,
            status: None,
            animation_frame: 0,
            chat_height: 0,
            total_chat_lines: 0,
        }
    }

    pub fn submit(&mut self) {
        if let Some(request) = self.controller.submit_input() {
            self.input_cursor = 0;
            self.selected = None;
            self.status = None;
            self.runner.start(request);
        }
    }

    /// Suggestions are only clickable while the header banner is showing
    pub fn click_suggestion(&mut self, index: usize) {
        if self.controller.header_hidden() {
            return;
        }
        let Some(label) = self.suggestions.get(index).cloned() else {
            return;
        };
        if let Some(request) = self.controller.click_suggestion(&label) {
            self.input_cursor = 0;
            self.runner.start(request);
        }
    }

    pub fn handle_chat(&mut self, event: ChatEvent) {
        if let Some(reveal) = self.controller.handle_event(event) {
            self.runner.reveal(reveal);
        }
    }

    pub fn tick_animation(&mut self) {
        if self.controller.is_generating() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.controller.toggle_theme();
        self.status = Some(format!("{} theme", theme.display_name()));
    }

    pub fn request_clear(&mut self) {
        self.show_confirm = true;
    }

    pub fn answer_clear(&mut self, accepted: bool) {
        self.show_confirm = false;
        if self.controller.clear_all(|_| accepted) {
            self.selected = None;
            self.status = Some("All chats deleted".to_string());
        }
    }

    fn bot_indices(&self) -> Vec<usize> {
        self.controller
            .transcript()
            .messages()
            .iter()
            .enumerate()
            .filter(|(_, m)| m.role == Role::Bot)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn select_prev(&mut self) {
        let bots = self.bot_indices();
        self.selected = match self.selected {
            None => bots.last().copied(),
            Some(current) => bots
                .iter()
                .rev()
                .find(|&&i| i < current)
                .copied()
                .or(Some(current)),
        };
    }

    pub fn select_next(&mut self) {
        let bots = self.bot_indices();
        self.selected = match self.selected {
            None => bots.last().copied(),
            Some(current) => bots.iter().find(|&&i| i > current).copied().or(Some(current)),
        };
    }

    pub fn copy_selected(&mut self) {
        let index = self.selected.or_else(|| self.bot_indices().last().copied());
        let Some(text) = index.and_then(|i| self.controller.copy_text(i)) else {
            return;
        };

        self.status = Some(if copy_to_clipboard(text) {
            "Copied to clipboard".to_string()
        } else {
            "Clipboard unavailable".to_string()
        });
    }

    fn current_offset(&self) -> u16 {
        match self.controller.scroll() {
            Scroll::Bottom => self.total_chat_lines.saturating_sub(self.chat_height),
            Scroll::Offset(offset) => offset,
        }
    }

    pub fn scroll_up(&mut self, lines: u16) {
        let offset = self.current_offset().saturating_sub(lines);
        self.controller.set_scroll(Scroll::Offset(offset));
    }

    pub fn scroll_down(&mut self, lines: u16) {
        let bottom = self.total_chat_lines.saturating_sub(self.chat_height);
        let offset = self.current_offset().saturating_add(lines);
        if offset >= bottom {
            self.controller.set_scroll(Scroll::Bottom);
        } else {
            self.controller.set_scroll(Scroll::Offset(offset));
        }
    }

    pub fn scroll_to_bottom(&mut self) {
        self.controller.set_scroll(Scroll::Bottom);
    }
}
