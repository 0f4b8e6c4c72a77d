use crate::chat::TurnId;
use crate::event::AppEvent;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::mpsc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Revocable handle to a scheduled task. Dropping it cancels the task.
#[derive(Debug)]
pub struct TaskHandle {
    token: CancellationToken,
}

impl TaskHandle {
    pub fn new() -> (Self, CancellationToken) {
        let token = CancellationToken::new();
        (
            Self {
                token: token.clone(),
            },
            token,
        )
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }
}

impl Drop for TaskHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Per-character delay source for the typing animation.
#[derive(Debug, Clone)]
pub struct TypingPace {
    min: Duration,
    max: Duration,
    rng: StdRng,
}

impl TypingPace {
    pub fn new(min_ms: u64, max_ms: u64, seed: Option<u64>) -> Self {
        let (min_ms, max_ms) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            min: Duration::from_millis(min_ms),
            max: Duration::from_millis(max_ms),
            rng,
        }
    }

    pub fn instant() -> Self {
        Self::new(0, 0, Some(0))
    }

    pub fn next_delay(&mut self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let millis = self
            .rng
            .random_range(self.min.as_millis() as u64..=self.max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

/// Sends `text` one character at a time as [`AppEvent::StreamDelta`], then
/// [`AppEvent::StreamEnd`]. Stops silently once `cancel` fires.
pub async fn type_out(
    turn: TurnId,
    text: String,
    mut pace: TypingPace,
    cancel: CancellationToken,
    tx: mpsc::Sender<AppEvent>,
) {
    for ch in text.chars() {
        let delay = pace.next_delay();
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(%turn, "typing cancelled");
                return;
            }
            _ = tokio::time::sleep(delay) => {}
        }

        if tx
            .send(AppEvent::StreamDelta {
                turn,
                text: ch.to_string(),
            })
            .is_err()
        {
            return;
        }
    }

    if !cancel.is_cancelled() {
        let _ = tx.send(AppEvent::StreamEnd { turn });
    }
}
