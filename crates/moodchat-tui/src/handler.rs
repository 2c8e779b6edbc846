use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
        AppEvent::Chat(chat) => app.handle_chat(chat),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_confirm {
        handle_confirm(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_confirm(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.answer_clear(true),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.answer_clear(false),
        _ => {}
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Back to the input box
        KeyCode::Char('i') | KeyCode::Char('/') | KeyCode::Enter => {
            app.input_mode = InputMode::Editing;
        }

        KeyCode::Char('t') => app.toggle_theme(),
        KeyCode::Char('D') => app.request_clear(),

        // Message selection and copy
        KeyCode::Char('k') | KeyCode::Up => app.select_prev(),
        KeyCode::Char('j') | KeyCode::Down => app.select_next(),
        KeyCode::Char('c') => app.copy_selected(),

        // Suggestion chips
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            app.click_suggestion(index);
        }

        // Scrolling
        KeyCode::PageUp => app.scroll_up(app.chat_height / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height / 2),
        KeyCode::Char('G') | KeyCode::End => app.scroll_to_bottom(),

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Enter => app.submit(),
        KeyCode::Char(c) => {
            let byte_idx = char_to_byte_index(&app.controller.input, app.input_cursor);
            app.controller.input.insert(byte_idx, c);
            app.input_cursor += 1;
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_idx = char_to_byte_index(&app.controller.input, app.input_cursor);
                app.controller.input.remove(byte_idx);
            }
        }
        KeyCode::Delete => {
            if app.input_cursor < app.controller.input.chars().count() {
                let byte_idx = char_to_byte_index(&app.controller.input, app.input_cursor);
                app.controller.input.remove(byte_idx);
            }
        }
        KeyCode::Left => app.input_cursor = app.input_cursor.saturating_sub(1),
        KeyCode::Right => {
            app.input_cursor = (app.input_cursor + 1).min(app.controller.input.chars().count());
        }
        KeyCode::Home => app.input_cursor = 0,
        KeyCode::End => app.input_cursor = app.controller.input.chars().count(),
        KeyCode::PageUp => app.scroll_up(app.chat_height / 2),
        KeyCode::PageDown => app.scroll_down(app.chat_height / 2),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollUp => app.scroll_up(3),
        MouseEventKind::ScrollDown => app.scroll_down(3),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::Store;
    use moodchat_core::store::TRANSCRIPT_KEY;
    use moodchat_core::{Config, KeyValueStore, MemoryStore, ReplyClient, Timing, TurnRunner};
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn test_app(store: MemoryStore) -> App {
        let (tx, _rx) = mpsc::unbounded_channel();
        let source = Arc::new(ReplyClient::new("http://127.0.0.1:9/chat"));
        let runner = TurnRunner::new(source, Timing::default(), tx);
        let store: Store = Box::new(store);
        App::new(&Config::new(), store, runner)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_char_to_byte_index() {
        assert_eq!(char_to_byte_index("héllo", 2), 3);
        assert_eq!(char_to_byte_index("abc", 10), 3);
    }

    #[tokio::test]
    async fn test_typing_and_enter_submits() {
        let mut app = test_app(MemoryStore::new());
        type_text(&mut app, "héllx");
        handle_event(&mut app, key(KeyCode::Backspace));
        type_text(&mut app, "o");
        assert_eq!(app.controller.input, "héllo");

        handle_event(&mut app, key(KeyCode::Enter));
        assert_eq!(app.controller.transcript().len(), 1);
        assert!(app.controller.input.is_empty());
        assert_eq!(app.input_cursor, 0);
        assert!(app.controller.is_generating());
    }

    #[tokio::test]
    async fn test_suggestion_key_submits_its_label() {
        let mut app = test_app(MemoryStore::new());
        handle_event(&mut app, key(KeyCode::Esc));

        handle_event(&mut app, key(KeyCode::Char('2')));
        assert_eq!(
            app.controller.transcript().get(0).unwrap().text,
            Config::new().suggestions[1]
        );
        assert!(app.controller.header_hidden());
    }

    #[test]
    fn test_clear_needs_confirmation() {
        let mut store = MemoryStore::new();
        store
            .set(TRANSCRIPT_KEY, r#"[{"role":"user","text":"hi","state":"rendered"}]"#)
            .unwrap();
        let mut app = test_app(store);
        app.input_mode = InputMode::Normal;

        handle_event(&mut app, key(KeyCode::Char('D')));
        assert!(app.show_confirm);
        handle_event(&mut app, key(KeyCode::Char('n')));
        assert!(!app.show_confirm);
        assert_eq!(app.controller.transcript().len(), 1);

        handle_event(&mut app, key(KeyCode::Char('D')));
        handle_event(&mut app, key(KeyCode::Char('y')));
        assert!(app.controller.transcript().is_empty());
        assert_eq!(app.controller.store().get(TRANSCRIPT_KEY), None);
    }

    #[test]
    fn test_theme_key_toggles() {
        let mut app = test_app(MemoryStore::new());
        app.input_mode = InputMode::Normal;

        handle_event(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.controller.toggle_label(), "dark_mode");
        handle_event(&mut app, key(KeyCode::Char('t')));
        assert_eq!(app.controller.toggle_label(), "light_mode");
    }

    #[test]
    fn test_resize_leaves_input_alone() {
        let mut app = test_app(MemoryStore::new());
        type_text(&mut app, "hi");

        handle_event(&mut app, AppEvent::Resize);
        assert_eq!(app.controller.input, "hi");
        assert_eq!(app.input_cursor, 2);
    }
}
