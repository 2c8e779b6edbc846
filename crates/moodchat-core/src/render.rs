//! Projection of the transcript into message nodes
//!
//! A [`MessageNode`] is the drawable form of one bubble: its classes, avatar,
//! text slot, loading bars, copy affordance and emotion badge. Nodes are
//! rebuilt from the transcript on demand, so any surface can replay a saved
//! conversation. [`MessageNode::to_markup`] renders the same node as HTML.

use maud::{html, Markup, PreEscaped, DOCTYPE};

use crate::state::{Message, MessageState, Role, Transcript, badge_text};
use crate::theme::Theme;

pub const USER_AVATAR_URL: &str = "https://i.postimg.cc/L8hd043C/images.png";
pub const BOT_AVATAR_URL: &str =
    "https://i.postimg.cc/hP2WrQTQ/Gemini-August-Release-SS-width-1300.jpg";
pub const LOADING_BARS: usize = 3;

/// Where the chat container is scrolled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scroll {
    #[default]
    Bottom,
    /// Lines from the top, set when the reader scrolls back
    Offset(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Avatar {
    pub src: &'static str,
    pub alt: &'static str,
}

impl Avatar {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::User => Avatar { src: USER_AVATAR_URL, alt: "User" },
            Role::Bot => Avatar { src: BOT_AVATAR_URL, alt: "Bot" },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyIcon {
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageNode {
    pub classes: Vec<&'static str>,
    pub avatar: Avatar,
    pub text: String,
    pub loading_bars: usize,
    pub copy_icon: Option<CopyIcon>,
    pub badge: Option<String>,
}

impl MessageNode {
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| *c == class)
    }

    pub fn markup(&self) -> Markup {
        let icon_class = |icon: CopyIcon| {
            if icon.hidden {
                "icon material-symbols-rounded hide"
            } else {
                "icon material-symbols-rounded"
            }
        };

        html! {
            div class=(self.classes.join(" ")) {
                div class="message-content" {
                    img class="avatar" src=(self.avatar.src) alt=(self.avatar.alt);
                    p class="text" {
                        (self.text)
                        @if let Some(badge) = &self.badge {
                            span class="emotion-badge" { (badge) }
                        }
                    }
                    @if self.loading_bars > 0 {
                        div class="loading-indicator" {
                            @for _ in 0..self.loading_bars {
                                div class="loading-bar" {}
                            }
                        }
                    }
                }
                @if let Some(icon) = self.copy_icon {
                    span class=(icon_class(icon)) { "content_copy" }
                }
            }
        }
    }

    pub fn to_markup(&self) -> String {
        self.markup().into_string()
    }
}

pub fn project(message: &Message) -> MessageNode {
    let mut classes = vec!["message"];
    match message.role {
        Role::User => classes.push("outgoing"),
        Role::Bot => classes.push("incoming"),
    }
    match message.state {
        MessageState::Loading => classes.push("loading"),
        MessageState::Error => classes.push("error"),
        MessageState::Revealing | MessageState::Rendered => {}
    }

    let copy_icon = match message.role {
        Role::Bot => Some(CopyIcon {
            hidden: message.state == MessageState::Revealing,
        }),
        Role::User => None,
    };

    // The badge only belongs to a finished reveal
    let badge = match (message.state, &message.emotion) {
        (MessageState::Rendered, Some(label)) => Some(badge_text(label)),
        _ => None,
    };

    MessageNode {
        classes,
        avatar: Avatar::for_role(message.role),
        text: message.text.clone(),
        loading_bars: if message.state == MessageState::Loading { LOADING_BARS } else { 0 },
        copy_icon,
        badge,
    }
}

pub fn project_all(transcript: &Transcript) -> Vec<MessageNode> {
    transcript.messages().iter().map(project).collect()
}

const PAGE_STYLE: &str = "\
body { background: #131314; color: #e3e3e3; font-family: sans-serif; }
body.light_mode { background: #ffffff; color: #222222; }
.chat-list { max-width: 980px; margin: 24px auto; padding: 0 16px; }
.message { display: flex; align-items: flex-start; gap: 12px; margin: 18px 0; }
.message-content { display: flex; gap: 12px; align-items: flex-start; }
.avatar { width: 40px; height: 40px; border-radius: 50%; object-fit: cover; }
.text { white-space: pre-wrap; margin: 0; }
.error .text { color: #e55865; }
.emotion-badge { display: block; margin-top: 15px; padding-top: 10px; border-top: 1px solid rgba(255,255,255,0.2); font-size: 0.85rem; opacity: 0.9; }
.icon { cursor: pointer; opacity: 0.6; }
.icon.hide { visibility: hidden; }
";

/// Standalone HTML page of the whole conversation
pub fn render_page(transcript: &Transcript, theme: Theme) -> String {
    let body_class = match theme {
        Theme::Light => Some(theme.as_str()),
        Theme::Dark => None,
    };

    let page = html! {
        (DOCTYPE)
        html {
            head {
                meta charset="utf-8";
                title { "moodchat transcript" }
                style { (PreEscaped(PAGE_STYLE)) }
            }
            body class=[body_class] {
                div class="chat-list" {
                    @for node in project_all(transcript) {
                        (node.markup())
                    }
                }
            }
        }
    };
    page.into_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bot(text: &str, state: MessageState, emotion: Option<&str>) -> Message {
        Message {
            role: Role::Bot,
            text: text.to_string(),
            emotion: emotion.map(str::to_string),
            state,
        }
    }

    #[test]
    fn test_outgoing_node() {
        let node = project(&Message::outgoing("hi there"));

        assert_eq!(node.classes, vec!["message", "outgoing"]);
        assert_eq!(node.avatar.alt, "User");
        assert_eq!(node.text, "hi there");
        assert!(node.copy_icon.is_none());
        assert_eq!(node.loading_bars, 0);
    }

    #[test]
    fn test_placeholder_node() {
        let node = project(&Message::incoming_placeholder());

        assert_eq!(node.classes, vec!["message", "incoming", "loading"]);
        assert_eq!(node.text, "");
        assert_eq!(node.loading_bars, 3);
        assert_eq!(node.copy_icon, Some(CopyIcon { hidden: false }));
    }

    #[test]
    fn test_copy_icon_hidden_while_revealing() {
        let node = project(&bot("hello", MessageState::Revealing, Some("happy")));

        assert_eq!(node.copy_icon, Some(CopyIcon { hidden: true }));
        assert!(!node.has_class("loading"));
        assert!(node.badge.is_none());
    }

    #[test]
    fn test_badge_on_rendered_reply() {
        let node = project(&bot("hello", MessageState::Rendered, Some("happy")));
        assert!(node.badge.as_deref().unwrap().contains("😊"));

        let node = project(&bot("hello", MessageState::Rendered, Some("confused")));
        assert!(node.badge.as_deref().unwrap().contains("🤖"));

        let node = project(&bot("hello", MessageState::Rendered, None));
        assert!(node.badge.is_none());
    }

    #[test]
    fn test_error_node() {
        let node = project(&bot("Error: Invalid response", MessageState::Error, None));
        assert!(node.has_class("error"));
        assert!(node.badge.is_none());
    }

    #[test]
    fn test_markup_escapes_user_text() {
        let markup = project(&Message::outgoing("<script>alert('x')</script>")).to_markup();

        assert!(markup.contains("&lt;script&gt;alert('x')&lt;/script&gt;"));
        assert!(!markup.contains("<script>"));
    }

    #[test]
    fn test_placeholder_markup() {
        let markup = project(&Message::incoming_placeholder()).to_markup();

        assert!(markup.starts_with("<div class=\"message incoming loading\">"));
        assert_eq!(markup.matches("class=\"loading-bar\"").count(), 3);
        assert!(markup.contains("content_copy"));
    }

    #[test]
    fn test_page_carries_theme() {
        let mut transcript = Transcript::new();
        transcript.push(Message::outgoing("hello"));

        let page = render_page(&transcript, Theme::Light);
        assert!(page.contains("<body class=\"light_mode\">"));
        assert!(page.contains("<p class=\"text\">hello</p>"));

        let page = render_page(&transcript, Theme::Dark);
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("<body>"));
    }

    #[test]
    fn test_markup_escapes_badge_and_quotes() {
        let node = project(&bot("say \"hi\" & <b>bye</b>", MessageState::Rendered, Some("<happy>")));
        let markup = node.to_markup();

        assert!(markup.contains("say &quot;hi&quot; &amp; &lt;b&gt;bye&lt;/b&gt;"));
        assert!(markup.contains("<span class=\"emotion-badge\">"));
        assert!(markup.contains("&lt;happy&gt;"));
        assert!(markup.contains("<span class=\"icon material-symbols-rounded\">content_copy</span>"));
    }
}
