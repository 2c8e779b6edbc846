//! Timers and the network call behind a turn
//!
//! Nothing here touches the transcript. Spawned tasks only report back through
//! [`ChatEvent`]s, and the surface's event loop hands those to
//! [`crate::controller::Controller::handle_event`].

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

use crate::reply::{Reply, ReplyError, ReplySource};

pub type TurnId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    pub loading_delay: Duration,
    pub reveal_tick: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            loading_delay: Duration::from_millis(400),
            reveal_tick: Duration::from_millis(50),
        }
    }
}

/// An accepted submission, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub turn: TurnId,
    pub message: String,
}

/// A reply that started revealing and needs `ticks` timer events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealStart {
    pub turn: TurnId,
    pub ticks: usize,
}

#[derive(Debug)]
pub enum ChatEvent {
    ShowLoading { turn: TurnId },
    Reply { turn: TurnId, result: Result<Reply, ReplyError> },
    RevealTick { turn: TurnId },
}

pub struct TurnRunner<E> {
    source: Arc<dyn ReplySource>,
    timing: Timing,
    tx: UnboundedSender<E>,
}

impl<E> TurnRunner<E>
where
    E: From<ChatEvent> + Send + 'static,
{
    pub fn new(source: Arc<dyn ReplySource>, timing: Timing, tx: UnboundedSender<E>) -> Self {
        Self { source, timing, tx }
    }

    /// Wait out the loading delay, show the placeholder, then fetch the reply
    pub fn start(&self, request: TurnRequest) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let delay = self.timing.loading_delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send(ChatEvent::ShowLoading { turn: request.turn }.into()).is_err() {
                return;
            }

            tracing::debug!(turn = request.turn, "Requesting reply");
            let result = source.send(&request.message).await;
            if let Err(e) = &result {
                tracing::warn!(turn = request.turn, "Reply failed: {}", e);
            }
            let _ = tx.send(ChatEvent::Reply { turn: request.turn, result }.into());
        });
    }

    /// Emit one tick per period until the reveal has had all of its ticks
    pub fn reveal(&self, start: RevealStart) {
        let tx = self.tx.clone();
        // tokio intervals reject a zero period
        let period = self.timing.reveal_tick.max(Duration::from_millis(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            // The first tick of an interval fires immediately
            interval.tick().await;
            for _ in 0..start.ticks {
                interval.tick().await;
                if tx.send(ChatEvent::RevealTick { turn: start.turn }.into()).is_err() {
                    break;
                }
            }
        });
    }
}
