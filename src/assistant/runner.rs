use crate::assistant::typing::{type_out, TaskHandle, TypingPace};
use crate::assistant::{Responder, ResponderError};
use crate::chat::TurnId;
use crate::config::AssistantConfig;
use crate::event::AppEvent;
use crate::project::FileStore;
use rand::Rng;
use std::sync::{mpsc, Arc};
use std::time::Duration;
use tokio::runtime::Handle;
use tracing::{debug, info, warn};

/// Schedules simulated requests and typing animations on the tokio runtime.
///
/// Results come back to the UI thread as [`AppEvent`]s; every task is tied to
/// the [`TaskHandle`] returned to the caller.
#[derive(Clone)]
pub struct AssistantRunner {
    responder: Arc<dyn Responder>,
    config: AssistantConfig,
    tx: mpsc::Sender<AppEvent>,
    runtime_handle: Handle,
}

impl AssistantRunner {
    pub fn new(
        responder: Arc<dyn Responder>,
        config: AssistantConfig,
        tx: mpsc::Sender<AppEvent>,
        runtime_handle: Handle,
    ) -> Self {
        Self {
            responder,
            config,
            tx,
            runtime_handle,
        }
    }

    pub fn responder_name(&self) -> &'static str {
        self.responder.name()
    }

    pub fn request(&self, turn: TurnId, message: String, files: FileStore) -> TaskHandle {
        let (handle, cancel) = TaskHandle::new();
        let responder = Arc::clone(&self.responder);
        let tx = self.tx.clone();
        let delay = Duration::from_millis(self.config.response_delay_ms);
        let failure_rate = self.config.failure_rate;

        self.runtime_handle.spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!(%turn, "request cancelled before reply");
                    return;
                }
                _ = tokio::time::sleep(delay) => {}
            }

            let outcome = if roll_failure(failure_rate) {
                Err(ResponderError::Rejected("simulated request failure".to_string()))
            } else {
                responder.respond(&message, &files)
            };

            let event = match outcome {
                Ok(reply) => {
                    info!(%turn, responder = responder.name(), "reply ready");
                    AppEvent::ResponseReady { turn, reply }
                }
                Err(err) => {
                    warn!(%turn, error = %err, "reply failed");
                    AppEvent::ResponseFailed {
                        turn,
                        message: err.to_string(),
                    }
                }
            };
            if !cancel.is_cancelled() {
                let _ = tx.send(event);
            }
        });

        handle
    }

    pub fn type_reply(&self, turn: TurnId, text: String) -> TaskHandle {
        let (handle, cancel) = TaskHandle::new();
        let pace = TypingPace::new(
            self.config.typing_min_delay_ms,
            self.config.typing_max_delay_ms,
            self.config.seed.map(|seed| seed.wrapping_add(turn.0)),
        );
        self.runtime_handle
            .spawn(type_out(turn, text, pace, cancel, self.tx.clone()));
        handle
    }
}

fn roll_failure(rate: f64) -> bool {
    if rate <= 0.0 {
        return false;
    }
    rand::rng().random_bool(rate.min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::KeywordResponder;

    fn runner(config: AssistantConfig, tx: mpsc::Sender<AppEvent>) -> AssistantRunner {
        AssistantRunner::new(
            Arc::new(KeywordResponder::new()),
            config,
            tx,
            Handle::current(),
        )
    }

    fn quick_config() -> AssistantConfig {
        AssistantConfig {
            response_delay_ms: 0,
            failure_rate: 0.0,
            typing_min_delay_ms: 0,
            typing_max_delay_ms: 0,
            seed: Some(1),
        }
    }

    async fn next_event(rx: &mpsc::Receiver<AppEvent>) -> AppEvent {
        for _ in 0..200 {
            if let Ok(event) = rx.try_recv() {
                return event;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("no event arrived");
    }

    #[tokio::test]
    async fn request_delivers_reply_for_turn() {
        let (tx, rx) = mpsc::channel();
        let runner = runner(quick_config(), tx);
        let _handle = runner.request(TurnId(9), "add a header".to_string(), FileStore::starter());

        match next_event(&rx).await {
            AppEvent::ResponseReady { turn, reply } => {
                assert_eq!(turn, TurnId(9));
                assert!(reply.files.get("index.html").expect("index").contains("site-header"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn certain_failure_reports_rejection() {
        let (tx, rx) = mpsc::channel();
        let config = AssistantConfig {
            failure_rate: 1.0,
            ..quick_config()
        };
        let _handle = runner(config, tx).request(TurnId(2), "hi".to_string(), FileStore::starter());

        assert!(matches!(
            next_event(&rx).await,
            AppEvent::ResponseFailed { turn, .. } if turn == TurnId(2)
        ));
    }

    #[tokio::test]
    async fn cancelled_request_never_reports() {
        let (tx, rx) = mpsc::channel();
        let config = AssistantConfig {
            response_delay_ms: 50,
            ..quick_config()
        };
        let handle = runner(config, tx).request(TurnId(3), "hi".to_string(), FileStore::starter());
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(rx.try_recv().is_err());
    }
}
