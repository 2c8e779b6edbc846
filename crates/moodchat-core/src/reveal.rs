//! Word-by-word reveal of a bot reply
//!
//! A [`Reveal`] owns no timer. Whoever drives it calls [`Reveal::tick`] once
//! per period; the tick that appends the final word finishes the reveal.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    Pending,
    Revealing,
    Done,
}

/// Append one word to the revealed prefix
pub fn step(prefix: &str, word: &str) -> String {
    if prefix.is_empty() {
        word.to_string()
    } else {
        format!("{} {}", prefix, word)
    }
}

#[derive(Debug, Clone)]
pub struct Reveal {
    words: Vec<String>,
    next: usize,
    text: String,
    phase: RevealPhase,
}

impl Reveal {
    pub fn new(full_text: &str) -> Self {
        Self {
            words: full_text.split_whitespace().map(str::to_string).collect(),
            next: 0,
            text: String::new(),
            phase: RevealPhase::Pending,
        }
    }

    /// Number of ticks needed to reach [`RevealPhase::Done`]
    pub fn ticks(&self) -> usize {
        self.words.len().max(1)
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn is_done(&self) -> bool {
        self.phase == RevealPhase::Done
    }

    /// The revealed prefix
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tick(&mut self) -> RevealPhase {
        if self.phase == RevealPhase::Done {
            return self.phase;
        }

        if let Some(word) = self.words.get(self.next) {
            self.text = step(&self.text, word);
            self.next += 1;
        }

        self.phase = if self.next >= self.words.len() {
            RevealPhase::Done
        } else {
            RevealPhase::Revealing
        };
        self.phase
    }
}
